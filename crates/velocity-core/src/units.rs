//! Speed Unit Conversion
//!
//! Converts the raw meters-per-second estimate into the rounded value the
//! speedometer shows, in either mph or km/h.

use serde::{Deserialize, Serialize};

/// Display unit for vehicle speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    /// Miles per hour
    #[default]
    Mph,
    /// Kilometres per hour
    Kph,
}

impl SpeedUnit {
    /// Short label as shown next to the readout
    pub fn label(&self) -> &'static str {
        match self {
            SpeedUnit::Mph => "mph",
            SpeedUnit::Kph => "kph",
        }
    }
}

/// Convert meters per second to km/h
pub fn mps_to_kph(mps: f64) -> f64 {
    mps * 3.6
}

/// Convert km/h to mph
pub fn kph_to_mph(kph: f64) -> f64 {
    kph * 0.621371
}

/// Format a raw speed for display: unit-converted and rounded
///
/// `None` (the platform reported no speed) displays as 0. Negative inputs
/// clamp to 0; the speedometer never shows a negative number.
pub fn format_speed(mps: Option<f64>, unit: SpeedUnit) -> u32 {
    let mps = mps.unwrap_or(0.0).max(0.0);
    let kph = mps_to_kph(mps);
    let value = match unit {
        SpeedUnit::Mph => kph_to_mph(kph),
        SpeedUnit::Kph => kph,
    };
    value.round() as u32
}
