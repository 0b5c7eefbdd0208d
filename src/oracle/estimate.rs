//! Haversine/speed travel estimates, used when the road network is out of
//! reach and as the deterministic oracle in tests.

use super::{Leg, RouteShape, TravelOracle};
use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::matrix::TravelMatrix;

/// Estimates travel as straight-line haversine distance at a constant
/// average speed.
///
/// # Examples
///
/// ```
/// use lastmile::geo::GeoPoint;
/// use lastmile::oracle::{SpeedEstimator, TravelOracle};
///
/// let oracle = SpeedEstimator::new(30.0).unwrap();
/// let leg = oracle
///     .leg(GeoPoint::new(48.8566, 2.3522), GeoPoint::new(48.86, 2.35))
///     .unwrap();
/// assert!((leg.duration_min - leg.distance_km / 30.0 * 60.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct SpeedEstimator {
    speed_kmh: f64,
}

impl SpeedEstimator {
    /// Creates an estimator. Fails if the speed is not strictly positive.
    pub fn new(speed_kmh: f64) -> Result<Self> {
        if speed_kmh <= 0.0 || !speed_kmh.is_finite() {
            return Err(Error::InvalidInput(format!(
                "average speed must be positive, got {speed_kmh}"
            )));
        }
        Ok(Self { speed_kmh })
    }

    /// Average speed in km/h.
    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }
}

impl TravelOracle for SpeedEstimator {
    fn table(&self, points: &[GeoPoint]) -> Result<TravelMatrix> {
        Ok(TravelMatrix::from_speed(points, self.speed_kmh))
    }

    fn leg(&self, from: GeoPoint, to: GeoPoint) -> Result<Leg> {
        let distance_km = from.distance_km(to);
        Ok(Leg {
            distance_km,
            duration_min: distance_km / self.speed_kmh * 60.0,
        })
    }

    fn shape(&self, points: &[GeoPoint]) -> Result<RouteShape> {
        if points.len() < 2 {
            return Ok(RouteShape {
                distance_km: 0.0,
                duration_min: 0.0,
                geometry: Vec::new(),
            });
        }
        let distance_km: f64 = points
            .windows(2)
            .map(|w| w[0].distance_km(w[1]))
            .sum();
        Ok(RouteShape {
            distance_km,
            duration_min: distance_km / self.speed_kmh * 60.0,
            geometry: points.to_vec(),
        })
    }
}
