//! Shopify OAuth install routes.
//!
//! `/auth` starts the authorization code grant for a shop and `/auth/callback`
//! completes it: the offline token is stored, the shop record created, and
//! the uninstall webhook registered.

use std::collections::BTreeMap;

use askama::Template;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use thanks_core::ShopDomain;

use super::render;
use crate::error::AppError;
use crate::middleware::reauth_path;
use crate::models::{ShopSession, session_keys};
use crate::shopify::{hmac::verify_oauth_hmac, topics};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Page that breaks out of the admin iframe before OAuth.
#[derive(Template)]
#[template(path = "exit_iframe.html")]
pub struct ExitIframeTemplate {
    pub redirect_url: String,
}

// =============================================================================
// Query Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct BeginParams {
    pub shop: Option<String>,
    pub embedded: Option<String>,
}

// =============================================================================
// Route Handlers
// =============================================================================

/// GET /auth - Start OAuth flow.
///
/// Inside the admin iframe the page first sends the top window back here,
/// since Shopify's authorize page cannot be framed.
#[instrument(skip(state, session, headers))]
pub async fn begin(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Query(params): Query<BeginParams>,
) -> Result<Response, AppError> {
    let shop = ShopDomain::parse(params.shop.as_deref().unwrap_or_default())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let framed = params.embedded.as_deref() == Some("1")
        || headers
            .get("Sec-Fetch-Dest")
            .is_some_and(|v| v.as_bytes() == b"iframe");
    if framed {
        let template = ExitIframeTemplate {
            redirect_url: format!("{}{}", state.config().base_url, reauth_path(shop.as_str())),
        };
        return Ok(render(&template)?.into_response());
    }

    // Random state parameter for CSRF protection
    let oauth_state = uuid::Uuid::new_v4().to_string();

    session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store OAuth state: {e}")))?;
    session
        .insert(session_keys::OAUTH_SHOP, shop.as_str())
        .await
        .map_err(|e| AppError::Internal(format!("failed to store OAuth shop: {e}")))?;

    let auth_url = state.shopify().authorization_url(
        &shop,
        &state.config().oauth_redirect_uri(),
        &state.config().shopify.scopes,
        &oauth_state,
    );

    tracing::info!(shop = %shop, "Redirecting to Shopify OAuth");
    Ok(Redirect::to(&auth_url).into_response())
}

/// GET /auth/callback - Handle OAuth callback.
#[instrument(skip(state, session, params))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Response, AppError> {
    // Check for errors from Shopify
    if let Some(error) = params.get("error") {
        let description = params
            .get("error_description")
            .map(String::as_str)
            .unwrap_or_default();
        tracing::warn!("Shopify OAuth error: {} - {}", error, description);
        return Err(AppError::BadRequest(
            "OAuth authorization was denied".to_string(),
        ));
    }

    // Verify HMAC signature from Shopify
    if !verify_oauth_hmac(&params, state.config().shopify.api_secret.expose_secret()) {
        tracing::warn!("Invalid HMAC signature in OAuth callback");
        return Err(AppError::BadRequest(
            "Request origin could not be verified".to_string(),
        ));
    }

    let shop = ShopDomain::parse(params.get("shop").map(String::as_str).unwrap_or_default())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let Some(code) = params.get("code") else {
        return Err(AppError::BadRequest(
            "Missing authorization code".to_string(),
        ));
    };

    // Verify state and shop match what we stored
    let stored_state: Option<String> = session
        .remove(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();
    let stored_shop: Option<String> = session
        .remove(session_keys::OAUTH_SHOP)
        .await
        .ok()
        .flatten();

    if stored_state.is_none() || stored_state.as_ref() != params.get("state") {
        tracing::warn!(shop = %shop, "OAuth state mismatch");
        return Err(AppError::BadRequest("OAuth state mismatch".to_string()));
    }
    if stored_shop.as_deref() != Some(shop.as_str()) {
        tracing::warn!(shop = %shop, "OAuth shop mismatch");
        return Err(AppError::BadRequest("OAuth shop mismatch".to_string()));
    }

    // Exchange code for token
    let token = state.shopify().exchange_code(&shop, code).await?;

    state
        .sessions()
        .store_session(ShopSession::offline(
            shop.clone(),
            token.access_token.clone(),
            token.scope.clone(),
        ))
        .await?;
    state.shops().upsert_shop(&shop, &token.scope).await?;

    if let Err(e) = state
        .shopify()
        .register_webhook(
            &shop,
            &token.access_token,
            topics::APP_UNINSTALLED,
            &state.config().webhook_address(),
        )
        .await
    {
        tracing::warn!(shop = %shop, error = %e, "Failed to register uninstall webhook");
    }

    tracing::info!(shop = %shop, scope = %token.scope, "Shop installed");

    let host = params.get("host").map(String::as_str).unwrap_or_default();
    Ok(Redirect::to(&format!(
        "/?shop={}&host={}",
        urlencoding::encode(shop.as_str()),
        urlencoding::encode(host)
    ))
    .into_response())
}
