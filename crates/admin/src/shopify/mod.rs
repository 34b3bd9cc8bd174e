//! Shopify Admin API access for installed shops.
//!
//! # Security
//!
//! Every call made here uses a shop's offline access token, obtained through
//! OAuth and kept in the [`SessionStore`](crate::db::SessionStore). Tokens are
//! wrapped in `SecretString` and never logged.
//!
//! # Architecture
//!
//! - [`AdminClient`] - OAuth code exchange, product lookup, webhook registration (REST)
//! - [`hmac`] - OAuth callback and webhook signature verification
//! - [`session_token`] - embedded app session token (JWT) verification
//!
//! # Example
//!
//! ```rust,ignore
//! use thanks_admin::shopify::AdminClient;
//!
//! let client = AdminClient::new(&config.shopify);
//!
//! let token = client.exchange_code(&shop, &code).await?;
//! let product = client.get_product(&shop, &token.access_token, &product_id).await?;
//! ```

mod client;
pub mod hmac;
pub mod session_token;
pub mod types;

pub use client::AdminClient;
pub use session_token::{SessionTokenClaims, SessionTokenError, SessionTokenVerifier};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// OAuth code exchange failed.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Any other non-success response.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopify_error_display() {
        let err = ShopifyError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ShopifyError::RateLimited(2);
        assert_eq!(err.to_string(), "Rate limited, retry after 2 seconds");
    }

    #[test]
    fn test_api_error() {
        let err = ShopifyError::Api {
            status: 500,
            body: "oops".to_string(),
        };
        assert_eq!(err.to_string(), "API error (500): oops");
    }
}
