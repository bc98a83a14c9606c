//! Backend wire types
//!
//! Entity shapes shared with the key-value worker. Field names are camelCase
//! on the wire.

use serde::{Deserialize, Serialize};

use crate::geo::LatLon;
use crate::position::follow::MapPerspective;
use crate::units::SpeedUnit;

/// External navigation app used for hand-off links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MapProvider {
    /// Google Maps driving directions
    #[default]
    Google,
    /// Waze turn-by-turn navigation
    Waze,
}

/// Map tile theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MapTheme {
    /// Standard light tiles
    Light,
    /// Standard dark tiles
    Dark,
    /// High-saturation tiles
    Vibrant,
    /// Road-emphasis tiles tuned for driving
    #[default]
    Highway,
}

/// Overall UI theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark chrome (night driving default)
    #[default]
    Dark,
    /// Light chrome
    Light,
}

/// Singleton user settings entity, id `"default"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// Always `"default"`; there is one settings row
    pub id: String,
    /// Speedometer unit
    pub units: SpeedUnit,
    /// App opened by navigation hand-off links
    pub map_provider: MapProvider,
    /// Map tile theme
    pub map_theme: MapTheme,
    /// Overall UI theme
    pub theme: Theme,
    /// Switch the UI theme with sunrise/sunset
    pub auto_theme: bool,
    /// Camera angle preset
    #[serde(default)]
    pub map_perspective: MapPerspective,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            units: SpeedUnit::default(),
            map_provider: MapProvider::default(),
            map_theme: MapTheme::default(),
            theme: Theme::default(),
            auto_theme: true,
            map_perspective: MapPerspective::default(),
        }
    }
}

/// Partial settings update; unset fields keep their current value
/// (shallow merge on the backend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// New speedometer unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<SpeedUnit>,
    /// New hand-off provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_provider: Option<MapProvider>,
    /// New map tile theme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_theme: Option<MapTheme>,
    /// New UI theme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    /// New auto-theme flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_theme: Option<bool>,
    /// New camera angle preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_perspective: Option<MapPerspective>,
}

impl SettingsPatch {
    /// Apply the patch over `current`, forcing the singleton id
    pub fn apply(&self, current: &UserSettings) -> UserSettings {
        UserSettings {
            id: "default".to_string(),
            units: self.units.unwrap_or(current.units),
            map_provider: self.map_provider.unwrap_or(current.map_provider),
            map_theme: self.map_theme.unwrap_or(current.map_theme),
            theme: self.theme.unwrap_or(current.theme),
            auto_theme: self.auto_theme.unwrap_or(current.auto_theme),
            map_perspective: self.map_perspective.unwrap_or(current.map_perspective),
        }
    }
}

/// Category of a saved destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationCategory {
    /// The user's home
    Home,
    /// The user's workplace
    Work,
    /// Pinned favourite
    #[default]
    Favorite,
    /// Entry of the recent-destination history
    Recent,
}

/// A saved destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLocation {
    /// Backend-assigned id
    pub id: String,
    /// Display name
    pub label: String,
    /// Street address as entered
    pub address: String,
    /// Destination latitude
    pub lat: f64,
    /// Destination longitude
    pub lon: f64,
    /// Home/work/favourite/recent bucket
    pub category: LocationCategory,
    /// Unix milliseconds of the last time this destination was navigated to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<i64>,
}

impl SavedLocation {
    /// Coordinate of the destination
    pub fn pos(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

/// Input for creating a location; the backend assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocation {
    /// Display name; must be non-empty
    pub label: String,
    /// Street address as entered
    pub address: String,
    /// Destination latitude
    pub lat: f64,
    /// Destination longitude
    pub lon: f64,
    /// Home/work/favourite/recent bucket
    pub category: LocationCategory,
}

/// Live-tracking entity: last known vehicle state for a session id,
/// last-write-wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrackingState {
    /// Last reported latitude
    pub lat: f64,
    /// Last reported longitude
    pub lon: f64,
    /// Raw speed in m/s as sent by the relay
    pub speed: f64,
    /// Heading in degrees; 0 when unknown
    pub heading: f64,
    /// Server-stamped Unix milliseconds of the last ping
    pub last_update: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_settings_patch_is_shallow_merge() {
        let current = UserSettings::default();
        let patch = SettingsPatch {
            units: Some(SpeedUnit::Kph),
            theme: Some(Theme::Light),
            ..Default::default()
        };
        let merged = patch.apply(&current);
        assert_eq!(merged.units, SpeedUnit::Kph);
        assert_eq!(merged.theme, Theme::Light);
        // untouched fields carried over
        assert_eq!(merged.map_provider, current.map_provider);
        assert_eq!(merged.map_theme, current.map_theme);
        assert_eq!(merged.id, "default");
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let settings = UserSettings::default();
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["mapProvider"], "google");
        assert_eq!(json["mapTheme"], "highway");
        assert_eq!(json["autoTheme"], true);
        assert_eq!(json["mapPerspective"], "driving");

        let loc = SavedLocation {
            id: "1".into(),
            label: "Home".into(),
            address: "1 Main St".into(),
            lat: 40.7,
            lon: -74.0,
            category: LocationCategory::Home,
            last_used_at: Some(1_700_000_000_000),
        };
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["lastUsedAt"], 1_700_000_000_000i64);
        assert_eq!(json["category"], "home");
    }

    #[test]
    fn test_tracking_state_round_trip() {
        let state = TrackingState {
            lat: 40.7,
            lon: -74.0,
            speed: 12.5,
            heading: 90.0,
            last_update: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"lastUpdate\""));
        let back: TrackingState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
