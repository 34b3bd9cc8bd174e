//! Shopify request signature verification.
//!
//! Shopify signs two kinds of requests with the app's API secret:
//!
//! - OAuth redirects carry a hex `hmac` query parameter over the remaining
//!   parameters, sorted by key and joined as `k=v&k=v`.
//! - Webhooks carry a base64 `X-Shopify-Hmac-Sha256` header over the raw body.

use std::collections::BTreeMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook body signature.
pub const WEBHOOK_HMAC_HEADER: &str = "X-Shopify-Hmac-Sha256";

/// Verify the `hmac` parameter of an OAuth redirect.
///
/// Every parameter except `hmac` and `signature` takes part in the message.
#[must_use]
pub fn verify_oauth_hmac(params: &BTreeMap<String, String>, secret: &str) -> bool {
    let Some(provided) = params.get("hmac") else {
        return false;
    };
    let Ok(provided) = hex::decode(provided) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(oauth_message(params).as_bytes());

    // Constant-time comparison
    mac.verify_slice(&provided).is_ok()
}

/// Build the signed message: parameters sorted by key, `hmac` and
/// `signature` excluded.
fn oauth_message(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(k, _)| k.as_str() != "hmac" && k.as_str() != "signature")
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Verify a webhook body against its base64 signature header.
#[must_use]
pub fn verify_webhook_hmac(body: &[u8], signature: &str, secret: &str) -> bool {
    let Ok(provided) = STANDARD.decode(signature.trim()) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);

    mac.verify_slice(&provided).is_ok()
}

/// Compute the hex signature of an OAuth parameter set.
///
/// Used to build signed redirects in tests.
#[must_use]
pub fn sign_oauth_params(params: &BTreeMap<String, String>, secret: &str) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(oauth_message(params).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Compute the base64 signature of a webhook body.
#[must_use]
pub fn sign_webhook_body(body: &[u8], secret: &str) -> String {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}
