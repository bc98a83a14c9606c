//! Geographic primitives
//!
//! Coordinate type, range validation, great-circle distance and the bounding
//! box used by the map camera's fit-bounds operation.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, used by the haversine formula
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees, positive north
    pub lat: f64,
    /// Longitude in degrees, positive east
    pub lon: f64,
}

impl LatLon {
    /// Create a coordinate pair without validation
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check that both components are inside their valid ranges
    pub fn is_valid(&self) -> bool {
        is_valid_latitude(self.lat) && is_valid_longitude(self.lon)
    }
}

/// Check a latitude is within [-90, 90]
pub fn is_valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

/// Check a longitude is within [-180, 180]
pub fn is_valid_longitude(lon: f64) -> bool {
    lon.is_finite() && (-180.0..=180.0).contains(&lon)
}

/// Great-circle distance between two points in meters (haversine formula)
pub fn haversine_distance(a: LatLon, b: LatLon) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Axis-aligned bounding box over a set of coordinates
///
/// Used by the camera to frame a route with padding. Longitude handling is
/// naive min/max; routes crossing the antimeridian are not a supported input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    /// Minimum-latitude, minimum-longitude corner
    pub south_west: LatLon,
    /// Maximum-latitude, maximum-longitude corner
    pub north_east: LatLon,
}

impl GeoBounds {
    /// Compute the bounds of a coordinate list, or `None` when empty
    pub fn from_coords(coords: &[LatLon]) -> Option<Self> {
        let first = coords.first()?;
        let mut min_lat = first.lat;
        let mut max_lat = first.lat;
        let mut min_lon = first.lon;
        let mut max_lon = first.lon;

        for c in &coords[1..] {
            min_lat = min_lat.min(c.lat);
            max_lat = max_lat.max(c.lat);
            min_lon = min_lon.min(c.lon);
            max_lon = max_lon.max(c.lon);
        }

        Some(Self {
            south_west: LatLon::new(min_lat, min_lon),
            north_east: LatLon::new(max_lat, max_lon),
        })
    }

    /// Center point of the bounds
    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lon + self.north_east.lon) / 2.0,
        )
    }

    /// Check whether a point lies inside the bounds (inclusive)
    pub fn contains(&self, p: LatLon) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lon >= self.south_west.lon
            && p.lon <= self.north_east.lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NYC: LatLon = LatLon {
        lat: 40.7128,
        lon: -74.0060,
    };
    const LONDON: LatLon = LatLon {
        lat: 51.5074,
        lon: -0.1278,
    };

    #[test]
    fn test_haversine_symmetric() {
        let d1 = haversine_distance(NYC, LONDON);
        let d2 = haversine_distance(LONDON, NYC);
        assert!((d1 - d2).abs() < 1e-6);
    }

    #[test]
    fn test_haversine_zero_at_same_point() {
        assert_eq!(haversine_distance(NYC, NYC), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // NYC to London is roughly 5570 km
        let d = haversine_distance(NYC, LONDON);
        assert!(d > 5_500_000.0 && d < 5_600_000.0, "distance was {d}");
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(is_valid_latitude(0.0));
        assert!(is_valid_latitude(-90.0));
        assert!(is_valid_latitude(90.0));
        assert!(!is_valid_latitude(90.01));
        assert!(!is_valid_latitude(f64::NAN));

        assert!(is_valid_longitude(-180.0));
        assert!(is_valid_longitude(180.0));
        assert!(!is_valid_longitude(180.5));

        assert!(LatLon::new(40.7, -74.0).is_valid());
        assert!(!LatLon::new(91.0, 0.0).is_valid());
    }

    #[test]
    fn test_bounds_from_coords() {
        let coords = vec![
            LatLon::new(40.7128, -74.006),
            LatLon::new(40.73, -74.0),
            LatLon::new(40.72, -74.01),
        ];
        let bounds = GeoBounds::from_coords(&coords).unwrap();
        assert_eq!(bounds.south_west, LatLon::new(40.7128, -74.01));
        assert_eq!(bounds.north_east, LatLon::new(40.73, -74.0));
        assert!(bounds.contains(LatLon::new(40.72, -74.005)));
        assert!(!bounds.contains(LatLon::new(41.0, -74.005)));
    }

    #[test]
    fn test_bounds_empty() {
        assert!(GeoBounds::from_coords(&[]).is_none());
    }
}
