//! Thanks Product admin app library.
//!
//! This crate provides the embedded Shopify app as a library, allowing it to
//! be tested and reused.
//!
//! # Security
//!
//! This crate holds each installed shop's offline Admin API token. Tokens
//! and the app secret are kept in `SecretString` and redacted from logs.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
