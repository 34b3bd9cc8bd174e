//! Cookie session configuration for the OAuth handshake.
//!
//! The cookie session only carries the OAuth `state` nonce between
//! `/auth` and `/auth/callback`. Embedded API calls authenticate with
//! session tokens instead (see [`super::auth`]).

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "thanks_oauth_session";

/// Session expiry time in seconds (10 minutes, enough to approve the install).
const SESSION_EXPIRY_SECONDS: i64 = 10 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        // Lax so the cookie survives the top-level redirect back from Shopify
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
