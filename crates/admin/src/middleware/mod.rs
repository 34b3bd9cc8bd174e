//! HTTP middleware for the app.
//!
//! - `auth` - session token gate and the [`RequireShopSession`] extractor
//! - `session` - cookie session layer carrying the OAuth `state` nonce

pub mod auth;
pub mod session;

pub use auth::{AuthGate, AuthRejection, GateOutcome, RequireShopSession, query_param, reauth_path};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
