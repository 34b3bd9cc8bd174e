//! Shopify webhook receiver.
//!
//! Every delivery is signed with the app secret. Unsigned or mis-signed
//! deliveries are rejected; anything that fails after verification is logged
//! and acknowledged so Shopify does not retry it.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use secrecy::ExposeSecret;
use tracing::instrument;

use thanks_core::ShopDomain;

use crate::error::AppError;
use crate::shopify::{
    hmac::{WEBHOOK_HMAC_HEADER, verify_webhook_hmac},
    topics,
};
use crate::state::AppState;

/// Header carrying the webhook topic.
pub const TOPIC_HEADER: &str = "X-Shopify-Topic";

/// Header carrying the shop the webhook is about.
pub const SHOP_DOMAIN_HEADER: &str = "X-Shopify-Shop-Domain";

/// POST /webhooks - Receive a webhook.
#[instrument(skip(state, headers, body))]
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let signature = header_str(&headers, WEBHOOK_HMAC_HEADER)
        .ok_or_else(|| AppError::Unauthorized("missing webhook signature".to_string()))?;

    if !verify_webhook_hmac(
        &body,
        signature,
        state.config().shopify.api_secret.expose_secret(),
    ) {
        tracing::warn!("Invalid webhook signature");
        return Err(AppError::Unauthorized(
            "invalid webhook signature".to_string(),
        ));
    }

    let topic = header_str(&headers, TOPIC_HEADER).unwrap_or_default();
    let shop = header_str(&headers, SHOP_DOMAIN_HEADER).unwrap_or_default();

    match topic {
        topics::APP_UNINSTALLED => match ShopDomain::parse(shop) {
            Ok(shop) => handle_app_uninstalled(&state, &shop).await,
            Err(e) => tracing::warn!(shop, error = %e, "Uninstall webhook for invalid shop"),
        },
        _ => tracing::info!(topic, shop, "Unhandled webhook topic"),
    }

    Ok(StatusCode::OK)
}

/// Forget an uninstalled shop and its sessions.
async fn handle_app_uninstalled(state: &AppState, shop: &ShopDomain) {
    match state.shops().remove_shop(shop).await {
        Ok(true) => tracing::info!(shop = %shop, "Shop uninstalled"),
        Ok(false) => tracing::info!(shop = %shop, "Uninstall webhook for unknown shop"),
        Err(e) => tracing::error!(shop = %shop, error = %e, "Failed to remove shop"),
    }

    match state.sessions().delete_shop_sessions(shop).await {
        Ok(count) => tracing::debug!(shop = %shop, count, "Deleted shop sessions"),
        Err(e) => tracing::error!(shop = %shop, error = %e, "Failed to delete shop sessions"),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
