//! Shop store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use thanks_core::{ProductId, ShopDomain};

use super::RepositoryError;
use crate::models::ShopRecord;

/// Mapping from shop to its granted scope and settings.
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// Create or replace the record for a shop, with empty settings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the store fails.
    async fn upsert_shop(&self, shop: &ShopDomain, scope: &str) -> Result<(), RepositoryError>;

    /// Get the record for a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the store fails.
    async fn get_shop(&self, shop: &ShopDomain) -> Result<Option<ShopRecord>, RepositoryError>;

    /// Overwrite the selected product of a known shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop is unknown.
    async fn set_product_id(
        &self,
        shop: &ShopDomain,
        product_id: ProductId,
    ) -> Result<(), RepositoryError>;

    /// Remove a shop. Returns `true` if a record was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the store fails.
    async fn remove_shop(&self, shop: &ShopDomain) -> Result<bool, RepositoryError>;
}

/// Process-lifetime [`ShopStore`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryShopStore {
    shops: RwLock<HashMap<ShopDomain, ShopRecord>>,
}

impl MemoryShopStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShopStore for MemoryShopStore {
    async fn upsert_shop(&self, shop: &ShopDomain, scope: &str) -> Result<(), RepositoryError> {
        self.shops
            .write()
            .await
            .insert(shop.clone(), ShopRecord::new(shop.clone(), scope));
        Ok(())
    }

    async fn get_shop(&self, shop: &ShopDomain) -> Result<Option<ShopRecord>, RepositoryError> {
        Ok(self.shops.read().await.get(shop).cloned())
    }

    async fn set_product_id(
        &self,
        shop: &ShopDomain,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let mut shops = self.shops.write().await;
        let record = shops.get_mut(shop).ok_or(RepositoryError::NotFound)?;
        record.settings.product_id = Some(product_id);
        Ok(())
    }

    async fn remove_shop(&self, shop: &ShopDomain) -> Result<bool, RepositoryError> {
        Ok(self.shops.write().await.remove(shop).is_some())
    }
}
