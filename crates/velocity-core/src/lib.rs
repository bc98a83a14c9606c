//! # VelocityOS Core Library
//!
//! Core functionality for the VelocityOS car dashboard.
//!
//! This library provides:
//! - GPS sampling with visibility-aware pause/resume
//! - Fused speed estimation (device speed blended with haversine distance)
//! - Map follow / free-look state machine with inactivity resume
//! - Navigation sessions with route computation and rerouting
//! - Live location sharing (relay and viewer)
//! - A typed client for the settings/locations backend
//!
//! ## Example
//!
//! ```rust,ignore
//! use velocity_core::prelude::*;
//!
//! let store = MemoryBackend::new();
//! let mut session = NavigationSession::new(DirectRouteProvider, store.clone());
//!
//! session.handle_gps(GpsEvent::Fix(sample)).await;
//! println!("{} mph", session.display_speed(SpeedUnit::Mph));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod demo;
pub mod geo;
pub mod nav;
pub mod position;
pub mod share;
pub mod store;
pub mod task;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::RuntimeConfig;
    pub use crate::demo::{DirectRouteProvider, DriveSimulator, SimulatedGps};
    pub use crate::geo::{GeoBounds, LatLon};
    pub use crate::nav::route::{OsrmRouteClient, RouteData, RouteProvider};
    pub use crate::nav::session::{NavigationSession, RecentHistory, VehicleSnapshot};
    pub use crate::position::sampler::{GpsWatch, PositionStream};
    pub use crate::position::{GpsEvent, GpsStatus, PositionSample, Visibility};
    pub use crate::share::relay::{LiveShareRelay, LiveShareTick, TickSink};
    pub use crate::share::viewer::{TrackingFeed, TrackingViewer, ViewerStatus};
    pub use crate::store::{
        HttpBackend, MemoryBackend, NewLocation, SavedLocation, SettingsPatch, StoreError,
        UserSettings,
    };
    pub use crate::units::SpeedUnit;
}

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
