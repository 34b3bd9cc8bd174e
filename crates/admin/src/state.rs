//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{MemorySessionStore, MemoryShopStore, SessionStore, ShopStore};
use crate::middleware::AuthGate;
use crate::services::{ProductCatalog, SettingsService};
use crate::shopify::{AdminClient, SessionTokenVerifier};

/// Stores and collaborators the app is assembled from.
#[derive(Clone)]
pub struct Backends {
    /// Shop records and settings.
    pub shops: Arc<dyn ShopStore>,
    /// OAuth sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// Shopify client used for OAuth and webhook registration.
    pub shopify: AdminClient,
    /// Product lookup used to enrich settings.
    pub catalog: Arc<dyn ProductCatalog>,
}

impl Backends {
    /// In-memory stores and the live Shopify client.
    #[must_use]
    pub fn in_memory(config: &AppConfig) -> Self {
        let shopify = AdminClient::new(&config.shopify);
        Self {
            shops: Arc::new(MemoryShopStore::new()),
            sessions: Arc::new(MemorySessionStore::new()),
            catalog: Arc::new(shopify.clone()),
            shopify,
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    shops: Arc<dyn ShopStore>,
    sessions: Arc<dyn SessionStore>,
    shopify: AdminClient,
    settings: SettingsService,
    gate: AuthGate,
}

impl AppState {
    /// Create the application state with in-memory stores.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let backends = Backends::in_memory(&config);
        Self::with_backends(config, backends)
    }

    /// Create the application state from explicit backends.
    #[must_use]
    pub fn with_backends(config: AppConfig, backends: Backends) -> Self {
        let Backends {
            shops,
            sessions,
            shopify,
            catalog,
        } = backends;

        let settings = SettingsService::new(shops.clone(), catalog);
        let gate = AuthGate::new(
            SessionTokenVerifier::new(&config.shopify),
            sessions.clone(),
            shops.clone(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                shops,
                sessions,
                shopify,
                settings,
                gate,
            }),
        }
    }

    /// Get a reference to the app configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the shop store.
    #[must_use]
    pub fn shops(&self) -> &Arc<dyn ShopStore> {
        &self.inner.shops
    }

    /// Get the session store.
    #[must_use]
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.inner.sessions
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> &AdminClient {
        &self.inner.shopify
    }

    /// Get the settings service.
    #[must_use]
    pub fn settings(&self) -> &SettingsService {
        &self.inner.settings
    }

    /// Get the authentication gate.
    #[must_use]
    pub fn gate(&self) -> &AuthGate {
        &self.inner.gate
    }
}
