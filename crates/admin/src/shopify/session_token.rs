//! Embedded app session tokens.
//!
//! The Shopify admin hands the embedded page a short-lived HS256 JWT signed
//! with the app's API secret. The page sends it back as
//! `Authorization: Bearer <token>` on every API call.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use thanks_core::{ShopDomain, ShopDomainError};

use crate::config::ShopifyAppConfig;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokenClaims {
    /// Shop admin URL, `https://{shop}/admin`.
    pub iss: String,
    /// Shop URL, `https://{shop}`.
    pub dest: String,
    /// App API key.
    pub aud: String,
    /// Staff user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiry (unix seconds).
    pub exp: u64,
    /// Not before (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    /// Issued at (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Token id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Admin session id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

impl SessionTokenClaims {
    /// The shop named by `dest`.
    ///
    /// # Errors
    ///
    /// Returns `ShopDomainError` if `dest` is not a myshopify URL.
    pub fn shop(&self) -> Result<ShopDomain, ShopDomainError> {
        ShopDomain::parse(&self.dest)
    }
}

/// Errors that can occur when verifying a session token.
#[derive(Debug, Error)]
pub enum SessionTokenError {
    /// Signature, expiry or audience check failed, or the token is malformed.
    #[error("invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// `dest` does not name a shop.
    #[error("invalid shop in session token: {0}")]
    InvalidShop(#[from] ShopDomainError),

    /// `iss` and `dest` point at different shops.
    #[error("session token issuer does not match destination")]
    IssuerMismatch,
}

/// Verifies session tokens against the app's API key and secret.
#[derive(Clone)]
pub struct SessionTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionTokenVerifier {
    /// Create a verifier for the app.
    #[must_use]
    pub fn new(config: &ShopifyAppConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.api_key.as_str()]);
        validation.validate_nbf = true;

        Self {
            key: DecodingKey::from_secret(config.api_secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `SessionTokenError` if any check fails.
    pub fn verify(&self, token: &str) -> Result<SessionTokenClaims, SessionTokenError> {
        let claims = decode::<SessionTokenClaims>(token, &self.key, &self.validation)?.claims;

        let shop = claims.shop()?;
        let issuer = ShopDomain::parse(claims.iss.trim_end_matches("/admin"))?;
        if issuer != shop {
            return Err(SessionTokenError::IssuerMismatch);
        }

        Ok(claims)
    }
}

/// Read the shop named by a token without verifying it.
///
/// Only used to pick the shop for a re-authentication redirect. Nothing read
/// here is trusted for access.
#[must_use]
pub fn peek_shop(token: &str) -> Option<ShopDomain> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<SessionTokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.shop().ok())
}

/// Extract the bearer token from the `Authorization` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
