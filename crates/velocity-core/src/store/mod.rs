//! Settings/Locations Store
//!
//! The dashboard's flat key-value backend: user settings, saved locations,
//! the recent-destination history and live-tracking sessions. Two backends
//! carry the same entity semantics: an HTTP client against the hosted worker
//! and an in-memory store for tests and demo mode.

pub mod client;
pub mod memory;
pub mod types;

use thiserror::Error;

pub use client::HttpBackend;
pub use memory::{MemoryBackend, RECENT_HISTORY_CAP};
pub use types::{
    LocationCategory, MapProvider, MapTheme, NewLocation, SavedLocation, SettingsPatch, Theme,
    TrackingState, UserSettings,
};

/// Errors from the settings/locations backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure talking to the backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with `success: false`
    #[error("backend rejected request: {0}")]
    Rejected(String),

    /// The entity does not exist (or the tracking session ended)
    #[error("not found")]
    NotFound,

    /// The response body did not match the expected envelope
    #[error("malformed response: {0}")]
    Decode(String),
}
