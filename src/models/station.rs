//! Recharge station catalogue entry.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A static recharge station, loaded once from configuration.
///
/// The JSON shape is flat: `{"id": "R001", "lat": 31.62, "lon": -7.99,
/// "name": "...", "type": "Rapide", "power_kw": 50, "operator": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RechargeStation {
    /// Opaque unique identifier.
    pub id: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Charger type label, e.g. "Rapide".
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Charging power in kilowatts.
    #[serde(default)]
    pub power_kw: Option<f64>,
    /// Operating company.
    #[serde(default)]
    pub operator: Option<String>,
}

impl RechargeStation {
    /// Station coordinates as a [`GeoPoint`].
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Returns the station nearest to `from` by haversine distance, or `None`
/// when the catalogue is empty. Ties resolve to the earliest entry.
pub fn nearest_station<'a>(
    stations: &'a [RechargeStation],
    from: GeoPoint,
) -> Option<&'a RechargeStation> {
    let mut best: Option<(&RechargeStation, f64)> = None;
    for station in stations {
        let d = from.distance_km(station.location());
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((station, d)),
        }
    }
    best.map(|(s, _)| s)
}
