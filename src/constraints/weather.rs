//! Weather admissibility as a pluggable predicate.
//!
//! Production deployments wire a real provider behind [`WeatherCheck`]; the
//! crate ships a pass-through default and a deterministic zone-based
//! implementation for planning around known bad areas.

use crate::geo::GeoPoint;

/// Per-location weather admissibility.
///
/// Implementations must be deterministic within one optimization run so
/// solver results are reproducible.
pub trait WeatherCheck: Send + Sync {
    /// Returns `true` iff no point is flagged as dangerous, with a reason
    /// naming the offending points otherwise.
    fn admissible(&self, points: &[GeoPoint]) -> (bool, String);
}

/// Default check: every location is admissible.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearSkies;

impl WeatherCheck for ClearSkies {
    fn admissible(&self, _points: &[GeoPoint]) -> (bool, String) {
        (true, String::new())
    }
}

/// Flags locations inside any of a set of circular danger zones.
///
/// # Examples
///
/// ```
/// use lastmile::constraints::{StormZones, WeatherCheck};
/// use lastmile::geo::GeoPoint;
///
/// let zones = StormZones::new(vec![(GeoPoint::new(48.86, 2.35), 2.0)]);
/// let (ok, _) = zones.admissible(&[GeoPoint::new(48.8601, 2.3501)]);
/// assert!(!ok);
/// let (ok, _) = zones.admissible(&[GeoPoint::new(48.95, 2.50)]);
/// assert!(ok);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StormZones {
    zones: Vec<(GeoPoint, f64)>,
}

impl StormZones {
    /// Creates a check from `(center, radius_km)` danger zones.
    pub fn new(zones: Vec<(GeoPoint, f64)>) -> Self {
        Self { zones }
    }
}

impl WeatherCheck for StormZones {
    fn admissible(&self, points: &[GeoPoint]) -> (bool, String) {
        let mut flagged = Vec::new();
        for (idx, point) in points.iter().enumerate() {
            let dangerous = self
                .zones
                .iter()
                .any(|(center, radius_km)| point.distance_km(*center) <= *radius_km);
            if dangerous {
                flagged.push(format!("point {idx}"));
            }
        }

        if flagged.is_empty() {
            (true, String::new())
        } else {
            (
                false,
                format!("Conditions météo dangereuses: {}", flagged.join(", ")),
            )
        }
    }
}
