//! Road-network oracle: travel matrices, single legs, and route geometry.
//!
//! - [`TravelOracle`] — the seam the routing stages are written against
//! - [`OsrmOracle`] — HTTP client for an OSRM-style service
//! - [`SpeedEstimator`] — deterministic haversine/speed fallback

mod estimate;
mod osrm;

pub use estimate::SpeedEstimator;
pub use osrm::OsrmOracle;

use crate::error::Result;
use crate::geo::GeoPoint;
use crate::matrix::TravelMatrix;

/// One measured leg between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    /// Kilometers.
    pub distance_km: f64,
    /// Minutes.
    pub duration_min: f64,
}

/// A multi-stop route with its displayable geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteShape {
    /// Kilometers over the whole route.
    pub distance_km: f64,
    /// Minutes over the whole route.
    pub duration_min: f64,
    /// Polyline vertices of the road geometry.
    pub geometry: Vec<GeoPoint>,
}

/// Provider of travel measurements between coordinates.
///
/// Implementations are expected to be deterministic for a fixed road network
/// so repeated runs with the same seed reproduce the same result.
pub trait TravelOracle: Send + Sync {
    /// Pairwise distance (km) and duration (min) matrix over `points`.
    ///
    /// Callers keep `points` under ~120 entries per call.
    fn table(&self, points: &[GeoPoint]) -> Result<TravelMatrix>;

    /// Measures a single leg between two points.
    fn leg(&self, from: GeoPoint, to: GeoPoint) -> Result<Leg>;

    /// Full route through `points` with displayable geometry.
    ///
    /// Fewer than two points yield an empty zero-length shape.
    fn shape(&self, points: &[GeoPoint]) -> Result<RouteShape>;
}
