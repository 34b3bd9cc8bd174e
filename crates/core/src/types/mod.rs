//! Core types for Thanks Product.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod product;
pub mod shop;
pub mod status;

pub use product::{ProductId, ProductIdError};
pub use shop::{ShopDomain, ShopDomainError};
pub use status::SettingsStatus;
