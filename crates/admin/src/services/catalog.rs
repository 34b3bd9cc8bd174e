//! Product lookup used to enrich stored settings.

use async_trait::async_trait;

use thanks_core::ProductId;

use crate::models::ShopSession;
use crate::shopify::{AdminClient, Product, ShopifyError};

/// Source of live product data for a shop.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch a product on behalf of an authenticated shop.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the lookup fails.
    async fn get_product(
        &self,
        session: &ShopSession,
        product_id: &ProductId,
    ) -> Result<Product, ShopifyError>;
}

#[async_trait]
impl ProductCatalog for AdminClient {
    async fn get_product(
        &self,
        session: &ShopSession,
        product_id: &ProductId,
    ) -> Result<Product, ShopifyError> {
        Self::get_product(self, &session.shop, &session.access_token, product_id).await
    }
}
