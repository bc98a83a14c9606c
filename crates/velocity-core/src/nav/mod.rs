//! Navigation
//!
//! Route computation, the navigation session orchestrator, ETA math and
//! hand-off links to external navigation apps.

pub mod eta;
pub mod route;
pub mod session;

pub use eta::{arrival_time, format_eta};
pub use route::{OsrmRouteClient, RouteData, RouteProvider};
pub use session::{NavigationSession, RecentHistory, VehicleSnapshot, REROUTE_THRESHOLD_M};

use crate::geo::LatLon;
use crate::store::types::MapProvider;

/// Deep link that opens turn-by-turn navigation in Waze
pub fn waze_link(dest: LatLon) -> String {
    format!(
        "https://www.waze.com/ul?ll={},{}&navigate=yes",
        dest.lat, dest.lon
    )
}

/// Deep link that opens driving directions in Google Maps
pub fn google_maps_link(dest: LatLon) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination={},{}&travelmode=driving",
        dest.lat, dest.lon
    )
}

/// Hand-off link for the user's configured map provider
pub fn handoff_link(provider: MapProvider, dest: LatLon) -> String {
    match provider {
        MapProvider::Waze => waze_link(dest),
        MapProvider::Google => google_maps_link(dest),
    }
}
