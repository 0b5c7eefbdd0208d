//! Geographic primitives: coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate in decimal degrees.
///
/// # Examples
///
/// ```
/// use lastmile::geo::GeoPoint;
///
/// let paris = GeoPoint::new(48.8566, 2.3522);
/// let lyon = GeoPoint::new(45.7640, 4.8357);
/// let d = paris.distance_km(lyon);
/// assert!(d > 390.0 && d < 400.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine distance to another point, in kilometers.
    pub fn distance_km(&self, other: GeoPoint) -> f64 {
        haversine(*self, other)
    }
}

/// Spherical-earth distance between two points in kilometers.
pub fn haversine(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let x = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * x.sqrt().atan2((1.0 - x).sqrt());

    EARTH_RADIUS_KM * c
}
