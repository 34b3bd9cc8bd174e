//! Integration tests for Thanks Product.
//!
//! Tests drive the full axum router in-process with
//! `tower::ServiceExt::oneshot`. Shopify is replaced by a `wiremock` server
//! that the app's Admin client is pointed at.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p thanks-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use secrecy::SecretString;
use tower::ServiceExt;
use wiremock::MockServer;

use thanks_admin::config::{AppConfig, ShopifyAppConfig};
use thanks_admin::db::{MemorySessionStore, MemoryShopStore, SessionStore, ShopStore};
use thanks_admin::models::ShopSession;
use thanks_admin::routes;
use thanks_admin::shopify::{AdminClient, SessionTokenClaims, hmac};
use thanks_admin::state::{AppState, Backends};
use thanks_core::ShopDomain;

/// App API key used by every test.
pub const API_KEY: &str = "test-api-key";

/// App API secret used by every test.
pub const API_SECRET: &str = "k7Qm2vX9pL4sR8tW1zN6";

/// Public URL the app believes it is served from.
pub const BASE_URL: &str = "http://thanks.test";

/// Access token the test shop is installed with.
pub const ACCESS_TOKEN: &str = "shpat_test_token";

/// Build the configuration used in tests.
#[must_use]
pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: BASE_URL.to_string(),
        shopify: ShopifyAppConfig {
            api_key: API_KEY.to_string(),
            api_secret: SecretString::from(API_SECRET),
            scopes: vec!["read_products".to_string()],
            api_version: "2021-01".to_string(),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Parse a shop domain.
#[must_use]
pub fn shop(domain: &str) -> ShopDomain {
    ShopDomain::parse(domain).unwrap()
}

/// A running app wired to in-memory stores and a mock Shopify.
pub struct TestApp {
    /// Router with its cookie session layer; clone it per request so the
    /// session store is shared.
    pub router: Router,
    pub shops: Arc<MemoryShopStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub shopify: MockServer,
}

impl TestApp {
    /// Start a mock Shopify and build the app against it.
    pub async fn new() -> Self {
        let shopify = MockServer::start().await;
        let config = test_config();

        let shops = Arc::new(MemoryShopStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let client = AdminClient::with_origin(&config.shopify, shopify.uri());

        let state = AppState::with_backends(
            config,
            Backends {
                shops: shops.clone(),
                sessions: sessions.clone(),
                shopify: client.clone(),
                catalog: Arc::new(client),
            },
        );

        Self {
            router: routes::app(state),
            shops,
            sessions,
            shopify,
        }
    }

    /// Record a shop as installed, as the OAuth callback would.
    pub async fn install(&self, domain: &str) {
        let shop = shop(domain);
        self.sessions
            .store_session(ShopSession::offline(
                shop.clone(),
                SecretString::from(ACCESS_TOKEN),
                "read_products".to_string(),
            ))
            .await
            .unwrap();
        self.shops.upsert_shop(&shop, "read_products").await.unwrap();
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Issue a session token for `domain` signed with `secret`.
#[must_use]
pub fn session_token_with(domain: &str, secret: &str, aud: &str, ttl_secs: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();
    let exp = now.saturating_add_signed(ttl_secs);
    let claims = SessionTokenClaims {
        iss: format!("https://{domain}/admin"),
        dest: format!("https://{domain}"),
        aud: aud.to_string(),
        sub: Some("1".to_string()),
        exp,
        nbf: Some(now.saturating_sub(5)),
        iat: Some(now.saturating_sub(5)),
        jti: Some(format!("jti-{now}")),
        sid: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Issue a valid session token for `domain`.
#[must_use]
pub fn session_token(domain: &str) -> String {
    session_token_with(domain, API_SECRET, API_KEY, 60)
}

/// `Authorization` header value for a token.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Sign OAuth callback parameters the way Shopify does and return the query
/// string.
#[must_use]
pub fn signed_callback_query(params: &[(&str, &str)]) -> String {
    let mut map: BTreeMap<String, String> = params
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    let signature = hmac::sign_oauth_params(&map, API_SECRET);
    map.insert("hmac".to_string(), signature);

    map.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Sign a webhook body with the app secret.
#[must_use]
pub fn sign_webhook(body: &[u8]) -> String {
    hmac::sign_webhook_body(body, API_SECRET)
}

/// Read a response body as a string.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

/// The `name=value` part of the response's `Set-Cookie` header.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}
