//! Per-shop settings: the selected product.
//!
//! Settings are read and written through [`ShopStore`]; the stored product
//! reference is always enriched with live data from the [`ProductCatalog`]
//! before it is returned.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use thanks_core::{ProductId, SettingsStatus, ShopDomain};

use super::ProductCatalog;
use crate::db::{RepositoryError, ShopStore};
use crate::models::ShopSession;
use crate::shopify::{Product, ShopifyError};

/// Errors that can occur in settings operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The shop has no record; it must go through OAuth again.
    #[error("authentication required for {shop}")]
    AuthenticationRequired {
        /// Shop to re-authenticate.
        shop: ShopDomain,
    },

    /// The submitted product reference could not be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The product lookup failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] ShopifyError),

    /// The shop store failed.
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

/// Settings as returned to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsResponse {
    /// Whether a product has been selected.
    pub status: SettingsStatus,
    /// The selected product, enriched with catalog data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Product>,
}

impl SettingsResponse {
    fn empty() -> Self {
        Self {
            status: SettingsStatus::Empty,
            data: None,
        }
    }

    fn ok(product: Product) -> Self {
        Self {
            status: SettingsStatus::Ok,
            data: Some(product),
        }
    }
}

/// Body of `POST /settings`.
#[derive(Debug, Deserialize)]
struct SetSettingsRequest {
    #[serde(rename = "productId")]
    product_id: serde_json::Value,
}

/// Reads and writes shop settings.
#[derive(Clone)]
pub struct SettingsService {
    shops: Arc<dyn ShopStore>,
    catalog: Arc<dyn ProductCatalog>,
}

impl SettingsService {
    /// Create a new settings service.
    #[must_use]
    pub fn new(shops: Arc<dyn ShopStore>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { shops, catalog }
    }

    /// Get the shop's settings.
    ///
    /// # Errors
    ///
    /// - `AuthenticationRequired` if the shop is unknown
    /// - `Upstream` if the product lookup fails
    /// - `Store` if the shop store fails
    #[instrument(skip(self, session), fields(shop = %session.shop))]
    pub async fn get_settings(
        &self,
        session: &ShopSession,
    ) -> Result<SettingsResponse, SettingsError> {
        let record = self
            .shops
            .get_shop(&session.shop)
            .await?
            .ok_or_else(|| SettingsError::AuthenticationRequired {
                shop: session.shop.clone(),
            })?;

        let Some(product_id) = record.settings.product_id else {
            return Ok(SettingsResponse::empty());
        };

        let product = self.catalog.get_product(session, &product_id).await?;
        Ok(SettingsResponse::ok(product))
    }

    /// Store the product referenced by `body` and return it enriched.
    ///
    /// `body` is the raw request body, `{"productId": "<reference>"}`, where
    /// the reference is a numeric id or a product GID. The selection is kept
    /// even if the lookup afterwards fails.
    ///
    /// # Errors
    ///
    /// - `AuthenticationRequired` if the shop is unknown
    /// - `MalformedInput` if the body or the reference cannot be parsed
    /// - `Upstream` if the product lookup fails
    /// - `Store` if the shop store fails
    #[instrument(skip(self, session, body), fields(shop = %session.shop))]
    pub async fn set_settings(
        &self,
        session: &ShopSession,
        body: &str,
    ) -> Result<SettingsResponse, SettingsError> {
        if self.shops.get_shop(&session.shop).await?.is_none() {
            return Err(SettingsError::AuthenticationRequired {
                shop: session.shop.clone(),
            });
        }

        let product_id = parse_product_reference(body)?;

        match self
            .shops
            .set_product_id(&session.shop, product_id.clone())
            .await
        {
            Ok(()) => {}
            // Uninstalled between the check and the write
            Err(RepositoryError::NotFound) => {
                return Err(SettingsError::AuthenticationRequired {
                    shop: session.shop.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(product_id = %product_id, "Settings updated");

        let product = self.catalog.get_product(session, &product_id).await?;
        Ok(SettingsResponse::ok(product))
    }
}

/// Parse `{"productId": ...}` into a [`ProductId`].
fn parse_product_reference(body: &str) -> Result<ProductId, SettingsError> {
    let request: SetSettingsRequest = serde_json::from_str(body)
        .map_err(|e| SettingsError::MalformedInput(format!("invalid request body: {e}")))?;

    let raw = match request.product_id {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        other => {
            return Err(SettingsError::MalformedInput(format!(
                "productId must be a string, got {other}"
            )));
        }
    };

    ProductId::parse(&raw).map_err(|e| SettingsError::MalformedInput(e.to_string()))
}
