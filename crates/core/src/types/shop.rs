//! Shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("shop domain must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The domain is not a `myshopify.com` subdomain.
    #[error("shop domain must end with {suffix}")]
    WrongSuffix {
        /// Required suffix.
        suffix: &'static str,
    },
    /// The shop name contains characters outside `[a-z0-9-]` or starts with `-`.
    #[error("invalid shop name: {0}")]
    InvalidName(String),
}

/// A merchant's shop, identified by its `myshopify.com` hostname.
///
/// Parsing normalizes the input so that the same shop always maps to the
/// same key: surrounding whitespace, a leading `https://` or `http://`
/// and a trailing `/` are stripped, and the result is lowercased.
///
/// ## Constraints
///
/// - Length: 1-255 characters after normalization
/// - Must end with `.myshopify.com`
/// - The shop name must start with an ASCII letter or digit and contain only
///   ASCII letters, digits and `-`
///
/// ## Examples
///
/// ```
/// use thanks_core::ShopDomain;
///
/// let shop = ShopDomain::parse("https://Thanks-Demo.myshopify.com/").unwrap();
/// assert_eq!(shop.as_str(), "thanks-demo.myshopify.com");
///
/// assert!(ShopDomain::parse("").is_err());
/// assert!(ShopDomain::parse("evil.example.com").is_err());
/// assert!(ShopDomain::parse("-bad.myshopify.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Maximum length of a hostname.
    pub const MAX_LENGTH: usize = 255;

    /// Suffix every shop hostname carries.
    pub const SUFFIX: &'static str = ".myshopify.com";

    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized input:
    /// - Is empty
    /// - Is longer than 255 characters
    /// - Does not end with `.myshopify.com`
    /// - Has an invalid shop name
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        let lowered = s.trim().to_ascii_lowercase();
        let without_scheme = lowered
            .strip_prefix("https://")
            .or_else(|| lowered.strip_prefix("http://"))
            .unwrap_or(&lowered);
        let normalized = without_scheme.trim_end_matches('/').to_owned();

        if normalized.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        if normalized.len() > Self::MAX_LENGTH {
            return Err(ShopDomainError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let name = normalized
            .strip_suffix(Self::SUFFIX)
            .ok_or(ShopDomainError::WrongSuffix {
                suffix: Self::SUFFIX,
            })?;

        let valid_name = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid_name {
            return Err(ShopDomainError::InvalidName(name.to_owned()));
        }

        Ok(Self(normalized))
    }

    /// Returns the shop domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ShopDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShopDomain> for String {
    fn from(shop: ShopDomain) -> Self {
        shop.0
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_domains() {
        assert!(ShopDomain::parse("thanks-demo.myshopify.com").is_ok());
        assert!(ShopDomain::parse("a.myshopify.com").is_ok());
        assert!(ShopDomain::parse("shop123.myshopify.com").is_ok());
    }

    #[test]
    fn test_parse_normalizes() {
        let shop = ShopDomain::parse("  HTTPS://My-Shop.MyShopify.com/ ").unwrap();
        assert_eq!(shop.as_str(), "my-shop.myshopify.com");

        let shop = ShopDomain::parse("http://my-shop.myshopify.com").unwrap();
        assert_eq!(shop.as_str(), "my-shop.myshopify.com");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ShopDomain::parse(""), Err(ShopDomainError::Empty));
        assert_eq!(ShopDomain::parse("https://"), Err(ShopDomainError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}.myshopify.com", "a".repeat(250));
        assert!(matches!(
            ShopDomain::parse(&long),
            Err(ShopDomainError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_wrong_suffix() {
        assert!(matches!(
            ShopDomain::parse("shop.example.com"),
            Err(ShopDomainError::WrongSuffix { .. })
        ));
        assert!(matches!(
            ShopDomain::parse("myshopify.com.evil.io"),
            Err(ShopDomainError::WrongSuffix { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_name() {
        assert!(matches!(
            ShopDomain::parse(".myshopify.com"),
            Err(ShopDomainError::InvalidName(_))
        ));
        assert!(matches!(
            ShopDomain::parse("-shop.myshopify.com"),
            Err(ShopDomainError::InvalidName(_))
        ));
        assert!(matches!(
            ShopDomain::parse("evil.com/x.myshopify.com"),
            Err(ShopDomainError::InvalidName(_))
        ));
        assert!(matches!(
            ShopDomain::parse("sub.shop.myshopify.com"),
            Err(ShopDomainError::InvalidName(_))
        ));
    }

    #[test]
    fn test_parse_uppercase_scheme() {
        let shop = ShopDomain::parse("HTTP://Demo.MYSHOPIFY.COM").unwrap();
        assert_eq!(shop.as_str(), "demo.myshopify.com");

        assert_eq!(ShopDomain::parse("HTTPS:///"), Err(ShopDomainError::Empty));
    }

    #[test]
    fn test_serde_validates() {
        let shop: ShopDomain = serde_json::from_str("\"demo.myshopify.com\"").unwrap();
        assert_eq!(shop.as_str(), "demo.myshopify.com");
        assert_eq!(serde_json::to_string(&shop).unwrap(), "\"demo.myshopify.com\"");

        assert!(serde_json::from_str::<ShopDomain>("\"demo.example.com\"").is_err());
    }
}
