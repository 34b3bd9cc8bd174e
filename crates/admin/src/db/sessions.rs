//! Session store for OAuth access tokens.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use thanks_core::ShopDomain;

use super::RepositoryError;
use crate::models::ShopSession;

/// Mapping from session id to an authenticated shop session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Save a session, replacing any session with the same id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the store fails.
    async fn store_session(&self, session: ShopSession) -> Result<(), RepositoryError>;

    /// Load a session by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the store fails.
    async fn load_session(&self, id: &str) -> Result<Option<ShopSession>, RepositoryError>;

    /// Delete every session belonging to a shop. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Backend` if the store fails.
    async fn delete_shop_sessions(&self, shop: &ShopDomain) -> Result<usize, RepositoryError>;
}

/// Process-lifetime [`SessionStore`] backed by a `HashMap`.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, ShopSession>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn store_session(&self, session: ShopSession) -> Result<(), RepositoryError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session);
        Ok(())
    }

    async fn load_session(&self, id: &str) -> Result<Option<ShopSession>, RepositoryError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn delete_shop_sessions(&self, shop: &ShopDomain) -> Result<usize, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| &session.shop != shop);
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::{ExposeSecret, SecretString};

    use super::*;

    fn session(name: &str, token: &str) -> ShopSession {
        let shop = ShopDomain::parse(&format!("{name}.myshopify.com")).unwrap();
        ShopSession::offline(shop, SecretString::from(token), "read_products".to_string())
    }

    #[tokio::test]
    async fn test_store_and_load() {
        let store = MemorySessionStore::new();
        store.store_session(session("a", "tok_a")).await.unwrap();

        let loaded = store
            .load_session("offline_a.myshopify.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.access_token.expose_secret(), "tok_a");
        assert!(store.load_session("offline_b.myshopify.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_replaces_same_id() {
        let store = MemorySessionStore::new();
        store.store_session(session("a", "old")).await.unwrap();
        store.store_session(session("a", "new")).await.unwrap();

        let loaded = store
            .load_session("offline_a.myshopify.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.access_token.expose_secret(), "new");
    }

    #[tokio::test]
    async fn test_delete_shop_sessions() {
        let store = MemorySessionStore::new();
        store.store_session(session("a", "tok_a")).await.unwrap();
        store.store_session(session("b", "tok_b")).await.unwrap();

        let shop_a = ShopDomain::parse("a.myshopify.com").unwrap();
        assert_eq!(store.delete_shop_sessions(&shop_a).await.unwrap(), 1);
        assert_eq!(store.delete_shop_sessions(&shop_a).await.unwrap(), 0);
        assert!(store.load_session("offline_b.myshopify.com").await.unwrap().is_some());
    }
}
