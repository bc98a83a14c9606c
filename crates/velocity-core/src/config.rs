//! Runtime configuration
//!
//! A small JSON config file under the platform config directory. Every field
//! has a default, so a missing or partial file always yields a usable config.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::units::SpeedUnit;

/// Runtime configuration for the dashboard core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Base URL of the settings/locations backend
    pub backend_url: String,
    /// Base URL of the routing service
    pub router_url: String,
    /// Live-share relay cadence in seconds
    pub relay_interval_secs: u64,
    /// Tracking viewer poll cadence in seconds
    pub poll_interval_secs: u64,
    /// Seconds of map inactivity before follow mode resumes
    pub follow_timeout_secs: u64,
    /// Speed unit shown on the dash
    pub units: SpeedUnit,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8787".to_string(),
            router_url: crate::nav::route::OSRM_BASE_URL.to_string(),
            relay_interval_secs: 10,
            poll_interval_secs: 10,
            follow_timeout_secs: 15,
            units: SpeedUnit::default(),
        }
    }
}

impl RuntimeConfig {
    /// Path of the config file (`<config dir>/velocityos/config.json`)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("velocityos").join("config.json"))
    }

    /// Load the config from disk; a missing file yields the defaults
    pub fn load() -> io::Result<Self> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save the config to disk, creating the directory if needed
    pub fn save(&self) -> io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no config directory on this platform",
            ));
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, content)
    }

    /// Relay cadence as a [`Duration`]
    pub fn relay_interval(&self) -> Duration {
        Duration::from_secs(self.relay_interval_secs)
    }

    /// Viewer poll cadence as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Follow-resume timeout as a [`Duration`]
    pub fn follow_timeout(&self) -> Duration {
        Duration::from_secs(self.follow_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.relay_interval(), Duration::from_secs(10));
        assert_eq!(config.follow_timeout(), Duration::from_secs(15));
        assert_eq!(config.units, SpeedUnit::Mph);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: RuntimeConfig =
            serde_json::from_str(r#"{"units": "kph", "relayIntervalSecs": 5}"#).unwrap();
        assert_eq!(config.units, SpeedUnit::Kph);
        assert_eq!(config.relay_interval_secs, 5);
        assert_eq!(config.follow_timeout_secs, 15);
        assert_eq!(config.backend_url, "http://127.0.0.1:8787");
    }

    #[test]
    fn test_round_trip() {
        let mut config = RuntimeConfig::default();
        config.units = SpeedUnit::Kph;
        let json = serde_json::to_string(&config).unwrap();
        let back: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
