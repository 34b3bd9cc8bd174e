//! Shopify Admin REST client with OAuth code exchange.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use thanks_core::{ProductId, ShopDomain};

use super::{
    ShopifyError,
    types::{
        OAuthToken, OAuthTokenResponse, Product, ProductEnvelope, WebhookEnvelope,
        WebhookSubscription,
    },
};
use crate::config::ShopifyAppConfig;

/// Seconds to wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// Shopify Admin API client.
///
/// One client serves every installed shop; the shop and its access token are
/// passed per call.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    api_key: String,
    api_secret: SecretString,
    api_version: String,
    /// Replaces `https://{shop}` for server-to-server calls (tests, proxies).
    origin_override: Option<String>,
}

impl AdminClient {
    /// Create a new Admin API client.
    #[must_use]
    pub fn new(config: &ShopifyAppConfig) -> Self {
        Self::build(config, None)
    }

    /// Create a client that sends every API call to `origin` instead of the
    /// shop's own hostname.
    #[must_use]
    pub fn with_origin(config: &ShopifyAppConfig, origin: impl Into<String>) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        Self::build(config, Some(origin))
    }

    fn build(config: &ShopifyAppConfig, origin_override: Option<String>) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                client: reqwest::Client::new(),
                api_key: config.api_key.clone(),
                api_secret: config.api_secret.clone(),
                api_version: config.api_version.clone(),
                origin_override,
            }),
        }
    }

    fn origin(&self, shop: &ShopDomain) -> String {
        self.inner
            .origin_override
            .clone()
            .unwrap_or_else(|| format!("https://{shop}"))
    }

    fn api_url(&self, shop: &ShopDomain, path: &str) -> String {
        format!(
            "{}/admin/api/{}/{path}",
            self.origin(shop),
            self.inner.api_version
        )
    }

    // =========================================================================
    // OAuth Flow
    // =========================================================================

    /// Generate the OAuth authorization URL for a shop.
    ///
    /// The merchant's browser is sent here, so it always points at the shop's
    /// own hostname.
    #[must_use]
    pub fn authorization_url(
        &self,
        shop: &ShopDomain,
        redirect_uri: &str,
        scopes: &[String],
        state: &str,
    ) -> String {
        let scope = scopes.join(",");
        format!(
            "https://{shop}/admin/oauth/authorize?client_id={}&scope={}&redirect_uri={}&state={}",
            urlencoding::encode(&self.inner.api_key),
            urlencoding::encode(&scope),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for an offline access token.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::OAuth` if Shopify rejects the exchange.
    /// Returns `ShopifyError::Http` if the HTTP request fails.
    #[instrument(skip(self, code), fields(shop = %shop))]
    pub async fn exchange_code(
        &self,
        shop: &ShopDomain,
        code: &str,
    ) -> Result<OAuthToken, ShopifyError> {
        let url = format!("{}/admin/oauth/access_token", self.origin(shop));

        let params = [
            ("client_id", self.inner.api_key.as_str()),
            ("client_secret", self.inner.api_secret.expose_secret()),
            ("code", code),
        ];

        let response = self.inner.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ShopifyError::OAuth(format!("Token exchange failed: {text}")));
        }

        let token_response: OAuthTokenResponse = response.json().await?;

        Ok(OAuthToken {
            shop: shop.clone(),
            access_token: SecretString::from(token_response.access_token),
            scope: token_response.scope,
        })
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Get a product by its numeric ID.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::NotFound` if the product does not exist, or
    /// another `ShopifyError` if the request fails.
    #[instrument(skip(self, access_token), fields(shop = %shop, product_id = %id))]
    pub async fn get_product(
        &self,
        shop: &ShopDomain,
        access_token: &SecretString,
        id: &ProductId,
    ) -> Result<Product, ShopifyError> {
        let url = self.api_url(shop, &format!("products/{id}.json"));

        let response = self
            .inner
            .client
            .get(&url)
            .header("X-Shopify-Access-Token", access_token.expose_secret())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ShopifyError::NotFound(format!("product {id}")));
        }
        let response = check_status(response).await?;

        let body = response.text().await?;
        let envelope: ProductEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.product)
    }

    // =========================================================================
    // Webhooks
    // =========================================================================

    /// Subscribe the shop to a webhook topic.
    ///
    /// A subscription that already exists for the same address counts as
    /// success.
    ///
    /// # Errors
    ///
    /// Returns a `ShopifyError` if Shopify rejects the subscription.
    #[instrument(skip(self, access_token), fields(shop = %shop))]
    pub async fn register_webhook(
        &self,
        shop: &ShopDomain,
        access_token: &SecretString,
        topic: &str,
        address: &str,
    ) -> Result<(), ShopifyError> {
        let url = self.api_url(shop, "webhooks.json");
        let body = WebhookEnvelope {
            webhook: WebhookSubscription {
                topic,
                address,
                format: "json",
            },
        };

        let response = self
            .inner
            .client
            .post(&url)
            .header("X-Shopify-Access-Token", access_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            let text = response.text().await.unwrap_or_default();
            if text.contains("already been taken") {
                tracing::debug!(topic, "Webhook already registered");
                return Ok(());
            }
            return Err(ShopifyError::Api {
                status: StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                body: text,
            });
        }

        check_status(response).await?;
        Ok(())
    }
}

/// Map non-success responses to `ShopifyError`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ShopifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<f64>().ok())
            .map_or(DEFAULT_RETRY_AFTER_SECS, |secs| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let whole = secs.ceil().max(0.0) as u64;
                whole
            });
        return Err(ShopifyError::RateLimited(retry_after));
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ShopifyError::Unauthorized(
            "Invalid or expired access token".to_string(),
        ));
    }

    let body = response.text().await.unwrap_or_default();
    Err(ShopifyError::Api {
        status: status.as_u16(),
        body,
    })
}
