//! App configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_API_KEY` - Shopify app API key (OAuth client ID)
//! - `SHOPIFY_API_SECRET` - Shopify app API secret (signs OAuth callbacks, webhooks and session tokens)
//! - `SCOPES` - Comma-separated access scopes requested during OAuth (e.g., `read_products`)
//! - `HOST` - Public URL of the app (e.g., <https://thanks.example.com>)
//!
//! ## Optional
//! - `BIND_HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 8081)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2021-01)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 2.5;
const DEFAULT_API_VERSION: &str = "2021-01";
const DEFAULT_PORT: &str = "8081";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the app, without a trailing slash
    pub base_url: String,
    /// Shopify app credentials
    pub shopify: ShopifyAppConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify app credentials and API settings.
///
/// Implements `Debug` manually to redact the API secret.
#[derive(Clone)]
pub struct ShopifyAppConfig {
    /// App API key (OAuth client ID, also the session token audience)
    pub api_key: String,
    /// App API secret
    pub api_secret: SecretString,
    /// Scopes requested during OAuth
    pub scopes: Vec<String>,
    /// Admin API version (e.g., 2021-01)
    pub api_version: String,
}

impl std::fmt::Debug for ShopifyAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAppConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("BIND_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BIND_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let base_url = parse_base_url(&get_required_env("HOST")?)?;

        let shopify = ShopifyAppConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            shopify,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the app is served over HTTPS (controls secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// OAuth redirect URI registered with Shopify.
    #[must_use]
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/auth/callback", self.base_url)
    }

    /// Address Shopify delivers webhooks to.
    #[must_use]
    pub fn webhook_address(&self) -> String {
        format!("{}/webhooks", self.base_url)
    }
}

impl ShopifyAppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_required_env("SHOPIFY_API_KEY")?,
            api_secret: get_validated_secret("SHOPIFY_API_SECRET")?,
            scopes: parse_scopes(&get_required_env("SCOPES")?)?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Split the `SCOPES` list, dropping blanks.
fn parse_scopes(raw: &str) -> Result<Vec<String>, ConfigError> {
    let scopes: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if scopes.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "SCOPES".to_string(),
            "at least one scope is required".to_string(),
        ));
    }

    Ok(scopes)
}

/// Validate the public base URL and strip any trailing slash.
///
/// Shopify only talks to `https://` apps; plain `http://` is accepted for
/// loopback hosts so the app can run locally.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = url::Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;

    let Some(host) = url.host_str() else {
        return Err(ConfigError::InvalidEnvVar(
            "HOST".to_string(),
            "must be an absolute https URL".to_string(),
        ));
    };

    let loopback = matches!(host, "localhost" | "127.0.0.1" | "[::1]");
    match url.scheme() {
        "https" => {}
        "http" if loopback => {}
        _ => {
            return Err(ConfigError::InvalidEnvVar(
                "HOST".to_string(),
                "must be an https URL (http is only allowed for localhost)".to_string(),
            ));
        }
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret from the Partner Dashboard."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> AppConfig {
        AppConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 8081,
            base_url: base_url.to_string(),
            shopify: ShopifyAppConfig {
                api_key: "test_api_key".to_string(),
                api_secret: SecretString::from("test_api_secret"),
                scopes: vec!["read_products".to_string()],
                api_version: DEFAULT_API_VERSION.to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-secret-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_hex_secret() {
        // Shopify app secrets are 32 hex chars
        let result = validate_secret_strength("3f9a1c7be4d2086f5a1b9c3e7d4f2a60", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_secret_strength_repetitive_hex_secret() {
        // A genuine random draw with many repeated digits (3.29 bits/char)
        let secret = "b48852ba4888bc8e04487626d74ec622";
        assert!(shannon_entropy(secret) < 3.3);
        assert!(validate_secret_strength(secret, "SHOPIFY_API_SECRET").is_ok());
    }

    #[test]
    fn test_parse_scopes() {
        let scopes = parse_scopes("read_products, write_products,,").unwrap();
        assert_eq!(scopes, vec!["read_products", "write_products"]);
    }

    #[test]
    fn test_parse_scopes_empty() {
        assert!(matches!(
            parse_scopes(" , "),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_parse_base_url() {
        assert_eq!(
            parse_base_url("https://thanks.example.com/").unwrap(),
            "https://thanks.example.com"
        );
        assert!(parse_base_url("thanks.example.com").is_err());
        assert!(parse_base_url("ftp://thanks.example.com").is_err());
    }

    #[test]
    fn test_parse_base_url_requires_https() {
        assert!(matches!(
            parse_base_url("http://thanks.example.com"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert_eq!(
            parse_base_url("http://localhost:8081").unwrap(),
            "http://localhost:8081"
        );
        assert!(parse_base_url("http://127.0.0.1:8081/").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config("https://thanks.example.com");
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8081);
    }

    #[test]
    fn test_derived_urls() {
        let config = test_config("https://thanks.example.com");
        assert!(config.is_secure());
        assert_eq!(
            config.oauth_redirect_uri(),
            "https://thanks.example.com/auth/callback"
        );
        assert_eq!(
            config.webhook_address(),
            "https://thanks.example.com/webhooks"
        );

        let local = test_config("http://localhost:8081");
        assert!(!local.is_secure());
    }

    #[test]
    fn test_shopify_config_debug_redacts_secret() {
        let config = ShopifyAppConfig {
            api_key: "public_key".to_string(),
            api_secret: SecretString::from("super_secret_api_secret"),
            scopes: vec!["read_products".to_string()],
            api_version: "2021-01".to_string(),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("public_key"));
        assert!(debug_output.contains("2021-01"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_secret"));
    }
}
