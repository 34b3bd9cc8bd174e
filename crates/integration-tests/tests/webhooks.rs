//! Integration tests for the webhook receiver.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};

use thanks_admin::db::{SessionStore, ShopStore};
use thanks_admin::models::offline_session_id;
use thanks_integration_tests::{TestApp, bearer, location, session_token, shop, sign_webhook};

const SHOP: &str = "demo.myshopify.com";

fn webhook(topic: &str, shop_domain: &str, body: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/webhooks")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Shopify-Topic", topic)
        .header("X-Shopify-Shop-Domain", shop_domain);
    if let Some(signature) = signature {
        builder = builder.header("X-Shopify-Hmac-Sha256", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_app_uninstalled_removes_shop_and_sessions() {
    let app = TestApp::new().await;
    app.install(SHOP).await;
    app.install("other.myshopify.com").await;

    let body = r#"{"id":1,"domain":"demo.myshopify.com"}"#;
    let signature = sign_webhook(body.as_bytes());
    let response = app
        .send(webhook("app/uninstalled", SHOP, body, Some(&signature)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(app.shops.get_shop(&shop(SHOP)).await.unwrap().is_none());
    assert!(
        app.sessions
            .load_session(&offline_session_id(&shop(SHOP)))
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        app.shops
            .get_shop(&shop("other.myshopify.com"))
            .await
            .unwrap()
            .is_some()
    );

    // Settings now send the merchant back through OAuth
    let response = app
        .send(
            Request::builder()
                .uri("/settings")
                .header(header::AUTHORIZATION, bearer(&session_token(SHOP)))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth?shop=demo.myshopify.com");
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let app = TestApp::new().await;
    app.install(SHOP).await;

    let body = r#"{"id":1}"#;
    let forged = sign_webhook(b"something else");

    let response = app
        .send(webhook("app/uninstalled", SHOP, body, Some(&forged)))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(webhook("app/uninstalled", SHOP, body, None))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert!(app.shops.get_shop(&shop(SHOP)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_unknown_topic_is_acknowledged() {
    let app = TestApp::new().await;
    app.install(SHOP).await;

    let body = r#"{"id":7}"#;
    let signature = sign_webhook(body.as_bytes());
    let response = app
        .send(webhook("products/update", SHOP, body, Some(&signature)))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.shops.get_shop(&shop(SHOP)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_uninstall_for_unknown_shop_is_acknowledged() {
    let app = TestApp::new().await;

    let body = r#"{"id":1}"#;
    let signature = sign_webhook(body.as_bytes());
    let response = app
        .send(webhook(
            "app/uninstalled",
            "never-installed.myshopify.com",
            body,
            Some(&signature),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}
