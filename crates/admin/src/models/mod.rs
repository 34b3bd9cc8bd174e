//! Domain models for the app.

pub mod session;
pub mod shop;

pub use session::{ShopSession, keys as session_keys, offline_session_id};
pub use shop::{ShopRecord, ShopSettings};
