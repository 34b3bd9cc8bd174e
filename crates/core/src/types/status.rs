//! Status enums shared between the settings API and its clients.

use serde::{Deserialize, Serialize};

/// Outcome of reading or writing a shop's settings.
///
/// Serialized as `EMPTY_SETTINGS` / `OK_SETTINGS`, the values the settings
/// page switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingsStatus {
    /// The shop has not picked a product yet.
    #[serde(rename = "EMPTY_SETTINGS")]
    Empty,
    /// A product is selected; the response carries its live details.
    #[serde(rename = "OK_SETTINGS")]
    Ok,
}

impl std::fmt::Display for SettingsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "EMPTY_SETTINGS"),
            Self::Ok => write!(f, "OK_SETTINGS"),
        }
    }
}
