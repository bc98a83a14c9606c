//! Route service client
//!
//! Requests a driving route from an external routing API. The provider is a
//! single async black-box call: origin and destination in, polyline plus
//! distance/duration out, `None` on any failure.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::geo::LatLon;

/// Default public OSRM instance
pub const OSRM_BASE_URL: &str = "https://router.project-osrm.org";

/// A computed driving route
///
/// Treated as a cache keyed on (origin, destination): any input change means
/// a full recompute, never a partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteData {
    /// Route polyline, lat/lon order
    pub coordinates: Vec<LatLon>,
    /// Total driving distance
    pub distance_meters: f64,
    /// Estimated driving time
    pub duration_seconds: f64,
}

/// External routing provider seam
pub trait RouteProvider: Send + Sync {
    /// Request a driving route; `None` on network failure or when the
    /// provider finds no route
    fn fetch_route(
        &self,
        start: LatLon,
        end: LatLon,
    ) -> impl Future<Output = Option<RouteData>> + Send;
}

/// Errors from the OSRM client, collapsed to `None` at the provider boundary
#[derive(Debug, Error)]
pub enum RouteError {
    /// Transport-level failure reaching the routing service
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("routing service returned status {0}")]
    Status(u16),

    /// The service answered but found no route
    #[error("no route found: {0}")]
    NoRoute(String),
}

/// OSRM response envelope
#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// GeoJSON order: lon first
    coordinates: Vec<[f64; 2]>,
}

/// Routing client against an OSRM-compatible endpoint
pub struct OsrmRouteClient {
    client: reqwest::Client,
    base_url: String,
}

impl OsrmRouteClient {
    /// Client against the public OSRM instance
    pub fn new() -> Self {
        Self::with_base_url(OSRM_BASE_URL)
    }

    /// Client against a custom OSRM-compatible base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("VelocityOS/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn request(&self, start: LatLon, end: LatLon) -> Result<RouteData, RouteError> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url, start.lon, start.lat, end.lon, end.lat
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RouteError::Status(response.status().as_u16()));
        }

        let body: OsrmResponse = response.json().await?;
        if body.code != "Ok" {
            return Err(RouteError::NoRoute(body.code));
        }
        let route = body
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RouteError::NoRoute("empty route list".to_string()))?;

        Ok(RouteData {
            coordinates: route
                .geometry
                .coordinates
                .iter()
                .map(|c| LatLon::new(c[1], c[0]))
                .collect(),
            distance_meters: route.distance,
            duration_seconds: route.duration,
        })
    }
}

impl Default for OsrmRouteClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteProvider for OsrmRouteClient {
    fn fetch_route(
        &self,
        start: LatLon,
        end: LatLon,
    ) -> impl Future<Output = Option<RouteData>> + Send {
        async move {
            match self.request(start, end).await {
                Ok(route) => Some(route),
                Err(err) => {
                    // Route misses are non-fatal; the map degrades to markers.
                    warn!("route request failed: {err}");
                    None
                }
            }
        }
    }
}
