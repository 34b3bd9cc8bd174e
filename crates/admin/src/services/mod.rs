//! Business logic services for the app.
//!
//! # Services
//!
//! - `catalog` - product lookup used to enrich settings
//! - `settings` - read and write the shop's selected product

pub mod catalog;
pub mod settings;

#[cfg(test)]
pub use catalog::MockProductCatalog;
pub use catalog::ProductCatalog;
pub use settings::{SettingsError, SettingsResponse, SettingsService};
