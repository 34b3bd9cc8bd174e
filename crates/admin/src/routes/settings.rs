//! Settings API used by the embedded page.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireShopSession;
use crate::services::SettingsResponse;
use crate::state::AppState;

/// GET /settings - The shop's selected product.
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn show(
    State(state): State<AppState>,
    RequireShopSession(session): RequireShopSession,
) -> Result<Json<SettingsResponse>, AppError> {
    let response = state.settings().get_settings(&session).await?;
    Ok(Json(response))
}

/// POST /settings - Select a product.
///
/// The body is parsed as JSON whatever its content type; the page posts it
/// as `text/plain`.
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn update(
    State(state): State<AppState>,
    RequireShopSession(session): RequireShopSession,
    body: String,
) -> Result<Json<SettingsResponse>, AppError> {
    let response = state.settings().set_settings(&session, &body).await?;
    Ok(Json(response))
}
