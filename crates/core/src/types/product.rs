//! Product reference type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The input string is empty.
    #[error("product reference cannot be empty")]
    Empty,
    /// The final path segment is empty (e.g. `gid://shopify/Product/`).
    #[error("product reference has no id segment: {0}")]
    MissingId(String),
    /// The final path segment is not a decimal number.
    #[error("product id must be numeric, got {0:?}")]
    NotNumeric(String),
}

/// The numeric id of a Shopify product.
///
/// The resource picker hands out global ids such as
/// `gid://shopify/Product/123`; only the final path segment identifies the
/// product for the REST API. A bare `123` is accepted as well.
///
/// ## Examples
///
/// ```
/// use thanks_core::ProductId;
///
/// let id = ProductId::parse("gid://shopify/Product/123").unwrap();
/// assert_eq!(id.as_str(), "123");
///
/// assert!(ProductId::parse("gid://shopify/Product/").is_err());
/// assert!(ProductId::parse("gid://shopify/Product/abc").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    /// Parse a `ProductId` from a bare id or a slash-delimited global id.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, ends with `/`, or its final
    /// segment contains anything other than ASCII digits.
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ProductIdError::Empty);
        }

        let segment = s.rsplit('/').next().unwrap_or_default();
        if segment.is_empty() {
            return Err(ProductIdError::MissingId(s.to_owned()));
        }

        if !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProductIdError::NotNumeric(segment.to_owned()));
        }

        Ok(Self(segment.to_owned()))
    }

    /// Returns the numeric id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProductId {
    type Error = ProductIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}
