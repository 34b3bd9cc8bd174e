//! Thanks Product Core - Shared types library.
//!
//! This crate provides the domain types used by the Thanks Product app:
//! - `admin` - Embedded Shopify admin app (OAuth, settings API, webhooks)
//! - `integration-tests` - End-to-end router tests
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no
//! HTTP clients, no storage. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated shop domains, product references and settings statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
