//! Optimizer configuration and the recharge-station catalogue.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::RechargeStation;
use crate::tsp::GaParams;

/// Startup configuration for the optimization service.
///
/// Every field has a default, so a partial JSON file works:
///
/// ```json
/// { "solver": "zone_seeded", "seed": 7, "oracle_url": "http://osrm:5000" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Assignment strategy: `branch_and_bound`, `clustered_greedy`,
    /// `multi_criteria`, or `zone_seeded`.
    pub solver: String,
    /// PRNG seed for k-means and the genetic stage.
    pub seed: u64,
    /// K-means iteration cap.
    pub kmeans_iters: usize,
    /// Genetic-algorithm parameters.
    pub ga: GaParams,
    /// Branch-and-bound deadline in seconds.
    pub bb_deadline_secs: u64,
    /// Retry with the multi-criteria greedy when branch-and-bound times out.
    pub bb_fallback: bool,
    /// Road-network oracle base URL.
    pub oracle_url: String,
    /// Oracle request timeout in seconds.
    pub oracle_timeout_secs: u64,
    /// Let the executor substitute haversine/speed estimates for failed
    /// oracle legs.
    pub allow_estimates: bool,
    /// Zone radius for the zone-seeded solver, kilometers.
    pub zone_radius_km: f64,
    /// Path to the recharge-station JSON catalogue.
    pub stations_path: Option<String>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            solver: "multi_criteria".to_string(),
            seed: 42,
            kmeans_iters: 10,
            ga: GaParams::default(),
            bb_deadline_secs: 10,
            bb_fallback: true,
            oracle_url: "http://localhost:5001".to_string(),
            oracle_timeout_secs: 15,
            allow_estimates: false,
            zone_radius_km: 5.0,
            stations_path: None,
        }
    }
}

impl OptimizerConfig {
    /// Loads configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::InvalidInput(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::InvalidInput(format!("malformed config {}: {e}", path.display())))
    }
}

/// Loads the recharge-station catalogue from a JSON array file.
///
/// The file must contain a list; entries missing `lat`/`lon` are rejected.
pub fn load_stations(path: impl AsRef<Path>) -> Result<Vec<RechargeStation>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::InvalidInput(format!("cannot read {}: {e}", path.display())))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| Error::InvalidInput(format!("malformed JSON {}: {e}", path.display())))?;
    if !value.is_array() {
        return Err(Error::InvalidInput(format!(
            "{} must contain a list of stations",
            path.display()
        )));
    }
    serde_json::from_value(value)
        .map_err(|e| Error::InvalidInput(format!("malformed station in {}: {e}", path.display())))
}
