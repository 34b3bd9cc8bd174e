//! Authenticated shop sessions and cookie-session keys.

use secrecy::SecretString;

use thanks_core::ShopDomain;

/// An authenticated session for a shop.
///
/// Created by the OAuth callback and looked up for every settings request.
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopSession {
    /// Session identifier (`offline_{shop}` for offline sessions).
    pub id: String,
    /// Shop the session belongs to.
    pub shop: ShopDomain,
    /// Admin API access token (redacted in debug output).
    pub access_token: SecretString,
    /// Scopes granted with the token, comma separated.
    pub scope: String,
}

impl ShopSession {
    /// Build the offline session for a shop.
    #[must_use]
    pub fn offline(shop: ShopDomain, access_token: SecretString, scope: String) -> Self {
        Self {
            id: offline_session_id(&shop),
            shop,
            access_token,
            scope,
        }
    }
}

impl std::fmt::Debug for ShopSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopSession")
            .field("id", &self.id)
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Session id under which a shop's offline token is stored.
#[must_use]
pub fn offline_session_id(shop: &ShopDomain) -> String {
    format!("offline_{shop}")
}

/// Cookie-session keys used during the OAuth handshake.
pub mod keys {
    /// Key for the OAuth `state` nonce.
    pub const OAUTH_STATE: &str = "shopify_oauth_state";

    /// Key for the shop the OAuth flow was started for.
    pub const OAUTH_SHOP: &str = "shopify_oauth_shop";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_session_id() {
        let shop = ShopDomain::parse("demo.myshopify.com").unwrap();
        let session = ShopSession::offline(
            shop,
            SecretString::from("shpat_token"),
            "read_products".to_string(),
        );
        assert_eq!(session.id, "offline_demo.myshopify.com");
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let shop = ShopDomain::parse("demo.myshopify.com").unwrap();
        let session = ShopSession::offline(
            shop,
            SecretString::from("shpat_super_secret"),
            "read_products".to_string(),
        );

        let debug_output = format!("{session:?}");
        assert!(debug_output.contains("demo.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpat_super_secret"));
    }
}
