//! In-memory backend
//!
//! Carries the same entity semantics as the hosted worker: shallow settings
//! merge, location create validation, recent-history upsert with a cap, and
//! last-write-wins tracking entities stamped with server time. Used by tests
//! and demo mode.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::geo::{is_valid_latitude, is_valid_longitude};
use crate::nav::session::RecentHistory;
use crate::share::relay::{LiveShareTick, TickSink};
use crate::share::viewer::TrackingFeed;

use super::types::{NewLocation, SavedLocation, SettingsPatch, TrackingState, UserSettings};
use super::StoreError;

/// Maximum entries kept in the recent-destination history
pub const RECENT_HISTORY_CAP: usize = 10;

#[derive(Default)]
struct Inner {
    settings: Option<UserSettings>,
    locations: Vec<SavedLocation>,
    recent: Vec<SavedLocation>,
    tracking: HashMap<String, TrackingState>,
}

/// Cheap-clone in-memory key-value backend
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBackend {
    /// Create an empty backend with default settings
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Fetch the singleton settings entity
    pub fn settings(&self) -> UserSettings {
        self.lock().settings.clone().unwrap_or_default()
    }

    /// Shallow-merge a patch into the settings; the id is forced to
    /// `"default"`
    pub fn update_settings(&self, patch: &SettingsPatch) -> UserSettings {
        let mut inner = self.lock();
        let current = inner.settings.clone().unwrap_or_default();
        let merged = patch.apply(&current);
        inner.settings = Some(merged.clone());
        merged
    }

    /// All saved locations
    pub fn locations(&self) -> Vec<SavedLocation> {
        self.lock().locations.clone()
    }

    /// Create a saved location; the backend assigns the id
    ///
    /// Rejected unless the label is non-empty and the coordinate is inside
    /// valid lat/lon ranges.
    pub fn add_location(&self, loc: NewLocation) -> Result<SavedLocation, StoreError> {
        if loc.label.trim().is_empty()
            || !is_valid_latitude(loc.lat)
            || !is_valid_longitude(loc.lon)
        {
            return Err(StoreError::Rejected("invalid location data".to_string()));
        }
        let saved = SavedLocation {
            id: Uuid::new_v4().to_string(),
            label: loc.label,
            address: loc.address,
            lat: loc.lat,
            lon: loc.lon,
            category: loc.category,
            last_used_at: None,
        };
        self.lock().locations.push(saved.clone());
        Ok(saved)
    }

    /// Delete a saved location; returns whether anything was removed
    pub fn remove_location(&self, id: &str) -> bool {
        let mut inner = self.lock();
        let before = inner.locations.len();
        inner.locations.retain(|l| l.id != id);
        inner.locations.len() != before
    }

    /// Recent destinations, most recent first
    pub fn recent_locations(&self) -> Vec<SavedLocation> {
        self.lock().recent.clone()
    }

    /// Upsert a destination into the recent history
    ///
    /// An existing entry with the same id moves to the front; the list is
    /// capped at [`RECENT_HISTORY_CAP`], evicting the oldest.
    pub fn log_recent(&self, mut loc: SavedLocation) {
        loc.last_used_at = Some(Utc::now().timestamp_millis());
        let mut inner = self.lock();
        inner.recent.retain(|l| l.id != loc.id);
        inner.recent.insert(0, loc);
        inner.recent.truncate(RECENT_HISTORY_CAP);
    }

    /// Clear the recent history
    pub fn clear_recent(&self) {
        self.lock().recent.clear();
    }

    /// Last known state for a tracking session
    pub fn tracking(&self, tracking_id: &str) -> Result<TrackingState, StoreError> {
        self.lock()
            .tracking
            .get(tracking_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    /// Upsert a tracking entity, stamping `lastUpdate` with server time
    pub fn push_tracking(&self, tracking_id: &str, tick: &LiveShareTick) {
        let state = TrackingState {
            lat: tick.lat,
            lon: tick.lon,
            speed: tick.speed,
            heading: tick.heading,
            last_update: Utc::now().timestamp_millis(),
        };
        self.lock().tracking.insert(tracking_id.to_string(), state);
    }

    /// Remove a tracking session (the share ended)
    pub fn end_tracking(&self, tracking_id: &str) {
        self.lock().tracking.remove(tracking_id);
    }

    /// Clear settings, locations and history (system reset)
    pub fn reset(&self) {
        *self.lock() = Inner::default();
    }
}

impl RecentHistory for MemoryBackend {
    fn record_recent(
        &self,
        loc: SavedLocation,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.log_recent(loc);
        async { Ok(()) }
    }
}

impl TickSink for MemoryBackend {
    fn push_tick(
        &self,
        tracking_id: &str,
        tick: LiveShareTick,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.push_tracking(tracking_id, &tick);
        async { Ok(()) }
    }
}

impl TrackingFeed for MemoryBackend {
    fn fetch_tracking(
        &self,
        tracking_id: &str,
    ) -> impl Future<Output = Result<TrackingState, StoreError>> + Send {
        let result = self.tracking(tracking_id);
        async move { result }
    }
}
