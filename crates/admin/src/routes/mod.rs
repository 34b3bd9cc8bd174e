//! HTTP route handlers for the app.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # OAuth
//! GET  /auth                   - Start OAuth for ?shop=
//! GET  /auth/callback          - Handle OAuth callback
//!
//! # Settings (session token required)
//! GET  /settings               - Selected product, enriched
//! POST /settings               - Select a product
//!
//! # Webhooks (HMAC verified)
//! POST /webhooks               - Shopify webhook receiver
//!
//! # UI
//! GET  /static/*               - Static assets
//! GET  *                       - Embedded app page
//! ```

pub mod app;
pub mod auth;
pub mod settings;
pub mod webhooks;

use askama::Template;
use axum::{
    Router,
    response::Html,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::error::AppError;
use crate::middleware::create_session_layer;
use crate::state::AppState;

/// Directory static assets are served from.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Create the OAuth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::begin))
        .route("/callback", get(auth::callback))
}

/// Create all routes for the app.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes())
        .route("/settings", get(settings::show).post(settings::update))
        .route("/webhooks", post(webhooks::receive))
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(app::page)
}

/// Build the complete application with state and the cookie session layer.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    routes().layer(session_layer).with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Render a template to HTML.
fn render(template: &impl Template) -> Result<Html<String>, AppError> {
    template.render().map(Html).map_err(|e| {
        tracing::error!("Template render error: {}", e);
        AppError::Internal(format!("template render failed: {e}"))
    })
}
