//! Admin REST API payload types.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use thanks_core::ShopDomain;

/// Offline access token obtained through OAuth.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct OAuthToken {
    /// Shop the token grants access to.
    pub shop: ShopDomain,
    /// The access token for API calls.
    pub access_token: SecretString,
    /// Granted scopes, comma separated.
    pub scope: String,
}

impl std::fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthToken")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

/// A product as returned by `GET /products/{id}.json`.
///
/// The fields the settings page displays are typed; everything else the
/// API returns is kept in `extra` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Numeric product ID.
    pub id: u64,
    /// Product title.
    pub title: String,
    /// URL handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// Product status (active, draft, archived).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Featured image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ProductImage>,
    /// Remaining fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Image URL.
    pub src: String,
    /// Alt text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Remaining fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Envelope around a single product.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductEnvelope {
    pub product: Product,
}

/// OAuth token response from Shopify.
#[derive(Debug, Deserialize)]
pub(crate) struct OAuthTokenResponse {
    pub access_token: String,
    pub scope: String,
}

/// Webhook subscription request body.
#[derive(Debug, Serialize)]
pub(crate) struct WebhookEnvelope<'a> {
    pub webhook: WebhookSubscription<'a>,
}

/// A webhook subscription.
#[derive(Debug, Serialize)]
pub(crate) struct WebhookSubscription<'a> {
    pub topic: &'a str,
    pub address: &'a str,
    pub format: &'a str,
}

/// Webhook topics the app subscribes to or handles.
pub mod topics {
    /// Sent when a merchant uninstalls the app.
    pub const APP_UNINSTALLED: &str = "app/uninstalled";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_keeps_unknown_fields() {
        let raw = json!({
            "id": 123,
            "title": "Thank-you socks",
            "handle": "thank-you-socks",
            "image": { "src": "https://cdn.shopify.com/socks.png", "width": 600 },
            "vendor": "Acme",
            "admin_graphql_api_id": "gid://shopify/Product/123"
        });

        let product: Product = serde_json::from_value(raw).unwrap();
        assert_eq!(product.id, 123);
        assert_eq!(product.title, "Thank-you socks");
        assert_eq!(product.extra["vendor"], "Acme");

        let back = serde_json::to_value(&product).unwrap();
        assert_eq!(back["image"]["src"], "https://cdn.shopify.com/socks.png");
        assert_eq!(back["image"]["width"], 600);
        assert_eq!(back["admin_graphql_api_id"], "gid://shopify/Product/123");
        assert!(back.get("status").is_none());
    }

    #[test]
    fn test_product_without_image() {
        let product: Product =
            serde_json::from_value(json!({ "id": 1, "title": "Plain", "image": null })).unwrap();
        assert!(product.image.is_none());
    }

    #[test]
    fn test_oauth_token_debug_redacts() {
        let token = OAuthToken {
            shop: ShopDomain::parse("demo.myshopify.com").unwrap(),
            access_token: SecretString::from("shpat_secret_value"),
            scope: "read_products".to_string(),
        };
        let debug_output = format!("{token:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpat_secret_value"));
    }
}
