//! Installed shops and their settings.

use serde::{Deserialize, Serialize};

use thanks_core::{ProductId, ShopDomain};

/// A shop that completed OAuth, with its settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopRecord {
    /// Shop domain (unique key).
    pub shop: ShopDomain,
    /// Scopes granted during OAuth, comma separated.
    pub scope: String,
    /// The shop's settings.
    pub settings: ShopSettings,
}

impl ShopRecord {
    /// A freshly installed shop with empty settings.
    #[must_use]
    pub fn new(shop: ShopDomain, scope: impl Into<String>) -> Self {
        Self {
            shop,
            scope: scope.into(),
            settings: ShopSettings::default(),
        }
    }
}

/// Per-shop settings: the product chosen in the picker.
///
/// `product_id` being `None` is the empty state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSettings {
    /// Selected product.
    pub product_id: Option<ProductId>,
}
