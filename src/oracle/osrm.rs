//! Blocking HTTP client for an OSRM-style routing service.
//!
//! The service is queried with `lon,lat;lon,lat;…` path segments on the
//! driving profile. Distances come back in meters and durations in seconds;
//! both are converted at this boundary (km, minutes). A response whose
//! `code` is not `"Ok"` becomes [`Error::Oracle`] carrying the service's
//! message.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use super::{Leg, RouteShape, TravelOracle};
use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::matrix::TravelMatrix;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Thin client over the `/table` and `/route` endpoints.
///
/// # Examples
///
/// ```no_run
/// use lastmile::geo::GeoPoint;
/// use lastmile::oracle::{OsrmOracle, TravelOracle};
///
/// let oracle = OsrmOracle::new("http://localhost:5001", None).unwrap();
/// let leg = oracle
///     .leg(GeoPoint::new(48.8566, 2.3522), GeoPoint::new(48.86, 2.35))
///     .unwrap();
/// assert!(leg.distance_km > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct OsrmOracle {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct TableResponse {
    code: String,
    message: Option<String>,
    distances: Option<Vec<Vec<Option<f64>>>>,
    durations: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Deserialize)]
struct RouteResponse {
    code: String,
    message: Option<String>,
    routes: Option<Vec<OsrmRoute>>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: Option<OsrmGeometry>,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl OsrmOracle {
    /// Creates a client for the given endpoint (e.g. `http://localhost:5001`).
    ///
    /// `timeout` bounds every request; `None` uses [`DEFAULT_TIMEOUT`].
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| Error::Oracle(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn coord_segment(points: &[GeoPoint]) -> String {
        points
            .iter()
            .map(|p| format!("{},{}", p.lon, p.lat))
            .collect::<Vec<_>>()
            .join(";")
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::Oracle(format!("request failed: {e}")))?;
        response
            .json()
            .map_err(|e| Error::Oracle(format!("malformed response: {e}")))
    }

    fn route(&self, points: &[GeoPoint], full_geometry: bool) -> Result<RouteShape> {
        if points.len() < 2 {
            return Ok(RouteShape {
                distance_km: 0.0,
                duration_min: 0.0,
                geometry: Vec::new(),
            });
        }

        let overview = if full_geometry {
            "overview=full&geometries=geojson"
        } else {
            "overview=false"
        };
        let url = format!(
            "{}/route/v1/driving/{}?{}",
            self.base_url,
            Self::coord_segment(points),
            overview
        );

        let parsed: RouteResponse = self.get_json(&url)?;
        if parsed.code != "Ok" {
            return Err(Error::Oracle(
                parsed.message.unwrap_or(parsed.code),
            ));
        }

        let route = parsed
            .routes
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| Error::Oracle("response contained no routes".into()))?;

        let geometry = route
            .geometry
            .map(|g| {
                g.coordinates
                    .into_iter()
                    .map(|[lon, lat]| GeoPoint::new(lat, lon))
                    .collect()
            })
            .unwrap_or_default();

        Ok(RouteShape {
            distance_km: route.distance / 1000.0,
            duration_min: route.duration / 60.0,
            geometry,
        })
    }
}

impl TravelOracle for OsrmOracle {
    fn table(&self, points: &[GeoPoint]) -> Result<TravelMatrix> {
        let n = points.len();
        if n == 0 {
            return Ok(TravelMatrix::new(0));
        }

        let url = format!(
            "{}/table/v1/driving/{}?annotations=distance,duration",
            self.base_url,
            Self::coord_segment(points)
        );

        let parsed: TableResponse = self.get_json(&url)?;
        if parsed.code != "Ok" {
            return Err(Error::Oracle(
                parsed.message.unwrap_or(parsed.code),
            ));
        }

        let distances = parsed
            .distances
            .ok_or_else(|| Error::Oracle("table response missing distances".into()))?;
        let durations = parsed
            .durations
            .ok_or_else(|| Error::Oracle("table response missing durations".into()))?;
        if distances.len() != n || durations.len() != n {
            return Err(Error::Oracle(format!(
                "table response has {} rows, expected {n}",
                distances.len()
            )));
        }

        let mut matrix = TravelMatrix::new(n);
        for (i, (drow, trow)) in distances.iter().zip(durations.iter()).enumerate() {
            if drow.len() != n || trow.len() != n {
                return Err(Error::Oracle(format!(
                    "table row {i} has {} columns, expected {n}",
                    drow.len()
                )));
            }
            for j in 0..n {
                // Unroutable pairs come back as null; treat them as zero.
                let meters = drow[j].unwrap_or(0.0);
                let seconds = trow[j].unwrap_or(0.0);
                matrix.set(i, j, meters / 1000.0, seconds / 60.0);
            }
        }
        Ok(matrix)
    }

    fn leg(&self, from: GeoPoint, to: GeoPoint) -> Result<Leg> {
        let shape = self.route(&[from, to], false)?;
        Ok(Leg {
            distance_km: shape.distance_km,
            duration_min: shape.duration_min,
        })
    }

    fn shape(&self, points: &[GeoPoint]) -> Result<RouteShape> {
        self.route(points, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_segment_is_lon_lat() {
        let points = vec![GeoPoint::new(48.8566, 2.3522), GeoPoint::new(48.86, 2.35)];
        let seg = OsrmOracle::coord_segment(&points);
        assert_eq!(seg, "2.3522,48.8566;2.35,48.86");
    }

    #[test]
    fn test_table_response_nulls_become_zero() {
        let json = r#"{
            "code": "Ok",
            "distances": [[0.0, null], [1500.0, 0.0]],
            "durations": [[0.0, 120.0], [null, 0.0]]
        }"#;
        let parsed: TableResponse = serde_json::from_str(json).expect("valid");
        assert_eq!(parsed.code, "Ok");
        assert_eq!(parsed.distances.as_ref().unwrap()[0][1], None);
        assert_eq!(parsed.distances.as_ref().unwrap()[1][0], Some(1500.0));
    }

    #[test]
    fn test_route_response_parses_geojson() {
        let json = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 2500.0,
                "duration": 300.0,
                "geometry": {"coordinates": [[2.3522, 48.8566], [2.35, 48.86]]}
            }]
        }"#;
        let parsed: RouteResponse = serde_json::from_str(json).expect("valid");
        let route = &parsed.routes.unwrap()[0];
        let coords = &route.geometry.as_ref().unwrap().coordinates;
        // GeoJSON order is [lon, lat].
        assert_eq!(coords[0], [2.3522, 48.8566]);
    }

    #[test]
    fn test_short_input_shapes() {
        let oracle = OsrmOracle::new("http://localhost:5001", None).expect("builds");
        let shape = oracle.route(&[], true).expect("no request for empty input");
        assert_eq!(shape.distance_km, 0.0);
        assert!(shape.geometry.is_empty());

        let one = oracle
            .route(&[GeoPoint::new(48.0, 2.0)], false)
            .expect("no request for single point");
        assert_eq!(one.duration_min, 0.0);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let oracle = OsrmOracle::new("http://localhost:5001/", None).expect("builds");
        assert_eq!(oracle.base_url, "http://localhost:5001");
    }
}
