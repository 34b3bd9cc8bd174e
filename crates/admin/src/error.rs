//! Unified error handling for the app.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use thanks_core::ShopDomain;

use crate::db::RepositoryError;
use crate::middleware::reauth_path;
use crate::services::SettingsError;
use crate::shopify::ShopifyError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// The shop must go through OAuth again.
    #[error("Authentication required for {0}")]
    AuthenticationRequired(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request signature did not verify.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Re-authentication error for a shop.
    #[must_use]
    pub fn reauthenticate(shop: &ShopDomain) -> Self {
        Self::AuthenticationRequired(shop.to_string())
    }
}

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::AuthenticationRequired { shop } => Self::reauthenticate(&shop),
            SettingsError::MalformedInput(message) => Self::BadRequest(message),
            SettingsError::Upstream(e) => Self::Shopify(e),
            SettingsError::Store(e) => Self::Repository(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Repository(_) | Self::Internal(_) | Self::Shopify(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::AuthenticationRequired(shop) => {
                return Redirect::to(&reauth_path(shop)).into_response();
            }
            Self::Repository(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Repository(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Shopify(_) => "External service error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::LOCATION;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("/nope".to_string());
        assert_eq!(err.to_string(), "Not found: /nope");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Repository(RepositoryError::Backend(
                "down".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::NotFound("x".to_string()))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_authentication_required_redirects() {
        let shop = ShopDomain::parse("demo.myshopify.com").unwrap();
        let response = AppError::reauthenticate(&shop).into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/auth?shop=demo.myshopify.com"
        );
    }

    #[test]
    fn test_settings_error_mapping() {
        let err = AppError::from(SettingsError::MalformedInput("bad id".to_string()));
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "bad id"));

        let err = AppError::from(SettingsError::Upstream(ShopifyError::RateLimited(1)));
        assert!(matches!(err, AppError::Shopify(_)));

        let err = AppError::from(SettingsError::Store(RepositoryError::NotFound));
        assert!(matches!(err, AppError::Repository(_)));
    }
}
