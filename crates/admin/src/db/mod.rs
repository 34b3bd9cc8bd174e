//! Storage for installed shops and their sessions.
//!
//! # Stores
//!
//! - [`ShopStore`] - shop → granted scope and settings
//! - [`SessionStore`] - session id → OAuth access token
//!
//! Both are traits so a durable backend can be swapped in. The in-memory
//! implementations are the default: everything is lost on restart and
//! merchants go through OAuth again.

pub mod sessions;
pub mod shops;

use thiserror::Error;

pub use sessions::{MemorySessionStore, SessionStore};
pub use shops::{MemoryShopStore, ShopStore};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store failed.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}
