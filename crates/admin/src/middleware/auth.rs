//! Authentication gate and extractor for embedded API calls.
//!
//! Requests from the embedded page carry a session token. The gate verifies
//! it, loads the shop's offline session and checks the shop is still
//! installed. Anything else sends the merchant back through OAuth.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

use crate::db::{RepositoryError, SessionStore, ShopStore};
use crate::error::AppError;
use crate::models::{ShopSession, offline_session_id};
use crate::shopify::SessionTokenVerifier;
use crate::shopify::session_token::{bearer_token, peek_shop};
use crate::state::AppState;

/// Result of the authentication gate.
#[derive(Debug, Clone)]
pub enum GateOutcome {
    /// The request belongs to an installed shop.
    Proceed(ShopSession),
    /// The merchant must re-authenticate; the target path.
    Redirect(String),
}

/// Path that starts OAuth for `shop`.
#[must_use]
pub fn reauth_path(shop: &str) -> String {
    format!("/auth?shop={}", urlencoding::encode(shop))
}

/// Decides whether a request may proceed.
#[derive(Clone)]
pub struct AuthGate {
    verifier: SessionTokenVerifier,
    sessions: Arc<dyn SessionStore>,
    shops: Arc<dyn ShopStore>,
}

impl AuthGate {
    /// Create a new gate.
    #[must_use]
    pub fn new(
        verifier: SessionTokenVerifier,
        sessions: Arc<dyn SessionStore>,
        shops: Arc<dyn ShopStore>,
    ) -> Self {
        Self {
            verifier,
            sessions,
            shops,
        }
    }

    /// Resolve the request's session.
    ///
    /// The redirect names the shop from the session token when it can be
    /// read, else `query_shop`, else nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a store fails.
    pub async fn check(
        &self,
        headers: &HeaderMap,
        query_shop: Option<&str>,
    ) -> Result<GateOutcome, RepositoryError> {
        let token = bearer_token(headers);
        let redirect = || {
            let shop = token
                .and_then(peek_shop)
                .map(String::from)
                .or_else(|| query_shop.map(String::from))
                .unwrap_or_default();
            GateOutcome::Redirect(reauth_path(&shop))
        };

        let Some(token) = token else {
            tracing::debug!("No session token");
            return Ok(redirect());
        };

        let claims = match self.verifier.verify(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Session token rejected");
                return Ok(redirect());
            }
        };
        let Ok(shop) = claims.shop() else {
            return Ok(redirect());
        };

        let Some(session) = self
            .sessions
            .load_session(&offline_session_id(&shop))
            .await?
        else {
            tracing::debug!(shop = %shop, "No offline session");
            return Ok(redirect());
        };

        if self.shops.get_shop(&shop).await?.is_none() {
            tracing::debug!(shop = %shop, "Shop not installed");
            return Ok(redirect());
        }

        Ok(GateOutcome::Proceed(session))
    }
}

/// Extractor that requires an authenticated shop.
///
/// Runs the [`AuthGate`]; requests that do not pass are answered with a
/// redirect to `/auth?shop=`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireShopSession(session): RequireShopSession) -> impl IntoResponse {
///     format!("Hello, {}!", session.shop)
/// }
/// ```
pub struct RequireShopSession(pub ShopSession);

/// Error returned when the gate does not let a request through.
pub enum AuthRejection {
    /// Send the merchant to the given path to re-authenticate.
    Reauthenticate(String),
    /// A store failed while checking.
    Store(RepositoryError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Reauthenticate(target) => Redirect::to(&target).into_response(),
            Self::Store(e) => AppError::from(e).into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireShopSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let query_shop = query_param(parts, "shop");

        match state
            .gate()
            .check(&parts.headers, query_shop.as_deref())
            .await
            .map_err(AuthRejection::Store)?
        {
            GateOutcome::Proceed(session) => Ok(Self(session)),
            GateOutcome::Redirect(target) => Err(AuthRejection::Reauthenticate(target)),
        }
    }
}

/// Read a query parameter from the request URI.
#[must_use]
pub fn query_param(parts: &Parts, name: &str) -> Option<String> {
    let query = parts.uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use axum::http::{HeaderValue, header::AUTHORIZATION};
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use secrecy::SecretString;

    use thanks_core::ShopDomain;

    use super::*;
    use crate::config::ShopifyAppConfig;
    use crate::db::{MemorySessionStore, MemoryShopStore};
    use crate::shopify::SessionTokenClaims;

    const SECRET: &str = "gate-test-secret";

    fn config() -> ShopifyAppConfig {
        ShopifyAppConfig {
            api_key: "api-key".to_string(),
            api_secret: SecretString::from(SECRET),
            scopes: vec!["read_products".to_string()],
            api_version: "2021-01".to_string(),
        }
    }

    fn shop() -> ShopDomain {
        ShopDomain::parse("demo.myshopify.com").unwrap()
    }

    fn token_for(shop: &str, secret: &str) -> HeaderMap {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = SessionTokenClaims {
            iss: format!("https://{shop}/admin"),
            dest: format!("https://{shop}"),
            aud: "api-key".to_string(),
            sub: None,
            exp: now + 60,
            nbf: None,
            iat: Some(now),
            jti: None,
            sid: None,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    struct Fixture {
        gate: AuthGate,
        sessions: Arc<MemorySessionStore>,
        shops: Arc<MemoryShopStore>,
    }

    fn fixture() -> Fixture {
        let sessions = Arc::new(MemorySessionStore::new());
        let shops = Arc::new(MemoryShopStore::new());
        let gate = AuthGate::new(
            SessionTokenVerifier::new(&config()),
            sessions.clone(),
            shops.clone(),
        );
        Fixture {
            gate,
            sessions,
            shops,
        }
    }

    async fn install(f: &Fixture) {
        f.sessions
            .store_session(ShopSession::offline(
                shop(),
                SecretString::from("shpat_abc"),
                "read_products".to_string(),
            ))
            .await
            .unwrap();
        f.shops.upsert_shop(&shop(), "read_products").await.unwrap();
    }

    fn redirect_target(outcome: GateOutcome) -> String {
        match outcome {
            GateOutcome::Redirect(target) => target,
            GateOutcome::Proceed(_) => panic!("expected redirect"),
        }
    }

    #[test]
    fn test_reauth_path_encodes_shop() {
        assert_eq!(
            reauth_path("demo.myshopify.com"),
            "/auth?shop=demo.myshopify.com"
        );
        assert_eq!(reauth_path("a&b"), "/auth?shop=a%26b");
        assert_eq!(reauth_path(""), "/auth?shop=");
    }

    #[tokio::test]
    async fn test_no_token_redirects_with_query_shop() {
        let f = fixture();
        let outcome = f
            .gate
            .check(&HeaderMap::new(), Some("demo.myshopify.com"))
            .await
            .unwrap();
        assert_eq!(redirect_target(outcome), "/auth?shop=demo.myshopify.com");

        let outcome = f.gate.check(&HeaderMap::new(), None).await.unwrap();
        assert_eq!(redirect_target(outcome), "/auth?shop=");
    }

    #[tokio::test]
    async fn test_bad_signature_redirects_to_token_shop() {
        let f = fixture();
        install(&f).await;
        let headers = token_for("demo.myshopify.com", "wrong-secret");

        let outcome = f
            .gate
            .check(&headers, Some("other.myshopify.com"))
            .await
            .unwrap();
        assert_eq!(redirect_target(outcome), "/auth?shop=demo.myshopify.com");
    }

    #[tokio::test]
    async fn test_valid_token_without_session_redirects() {
        let f = fixture();
        f.shops.upsert_shop(&shop(), "read_products").await.unwrap();
        let headers = token_for("demo.myshopify.com", SECRET);

        let outcome = f.gate.check(&headers, None).await.unwrap();
        assert_eq!(redirect_target(outcome), "/auth?shop=demo.myshopify.com");
    }

    #[tokio::test]
    async fn test_valid_session_unknown_shop_redirects() {
        let f = fixture();
        install(&f).await;
        f.shops.remove_shop(&shop()).await.unwrap();
        let headers = token_for("demo.myshopify.com", SECRET);

        let outcome = f.gate.check(&headers, None).await.unwrap();
        assert_eq!(redirect_target(outcome), "/auth?shop=demo.myshopify.com");
    }

    #[tokio::test]
    async fn test_installed_shop_proceeds() {
        let f = fixture();
        install(&f).await;
        let headers = token_for("demo.myshopify.com", SECRET);

        match f.gate.check(&headers, None).await.unwrap() {
            GateOutcome::Proceed(session) => assert_eq!(session.shop, shop()),
            GateOutcome::Redirect(target) => panic!("unexpected redirect to {target}"),
        }
    }
}
