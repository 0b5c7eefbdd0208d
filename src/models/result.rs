//! Realized routes and the aggregated optimization result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assign::Scenario;
use crate::geo::GeoPoint;
use crate::models::{Assignment, Order};

/// One recharge stop inserted by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RechargeEvent {
    /// Station identifier.
    pub station_id: String,
    /// Station display name, if the catalogue has one.
    pub station_name: Option<String>,
    /// Station coordinates.
    pub location: GeoPoint,
    /// Minutes spent plugged in.
    pub recharge_minutes: f64,
}

/// The executed tour of a single courier: what was actually driven once
/// battery detours and the workday cutoff are accounted for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealizedRoute {
    /// Courier that drove the tour.
    pub courier_id: String,
    /// Order ids dropped off, in delivery order.
    pub delivered: Vec<String>,
    /// Order ids pushed past the workday end, in planned order.
    pub deferred: Vec<String>,
    /// Kilometers actually driven, detours included.
    pub distance_km: f64,
    /// Minutes of driving plus recharging.
    pub duration_min: f64,
    /// `distance_km` times the courier's per-km cost.
    pub cost: f64,
    /// Points traversed: depot, inserted stations, delivery points.
    pub gps: Vec<GeoPoint>,
    /// Recharge stops, in the order they happened.
    pub recharges: Vec<RechargeEvent>,
    /// Clock time at the end of the tour, minutes since midnight.
    pub end_minutes: f64,
    /// Road geometry of the whole tour; empty when the oracle call for the
    /// displayable shape failed (diagnostic only).
    pub shape: Vec<GeoPoint>,
}

/// Diagnostic record for one refinement stage, priced against the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaSolution {
    /// Stage label: "nearest", "2opt", "3opt", or "genetic".
    pub algo: String,
    /// Open-path distance from the travel matrix, in kilometers.
    pub estimated_distance: f64,
    /// Road distance of the stage's tour, in kilometers.
    pub osrm_distance_km: f64,
    /// Road duration of the stage's tour, in minutes.
    pub osrm_duration_min: f64,
    /// Road distance times the courier's per-km cost.
    pub cost: f64,
    /// Road geometry of the stage's tour.
    pub geometry: Vec<GeoPoint>,
    /// Order ids in the stage's visiting order.
    pub ordered_ids: Vec<String>,
}

/// Aggregate metrics over all realized routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Σ realized distance, kilometers.
    pub total_distance_km: f64,
    /// Σ realized duration, minutes.
    pub total_duration_min: f64,
    /// Σ realized monetary cost.
    pub total_cost: f64,
    /// Number of non-empty tours.
    pub tours: usize,
    /// `1 / (1 + estimated assignment distance)`, a comparable scalar.
    pub global_score: f64,
}

/// Everything one `optimize()` call produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Workload scenario the run was planned for.
    pub scenario: Scenario,
    /// Courier → order ids plus the unassigned set.
    pub assignment: Assignment,
    /// Courier → executed tour, couriers with no orders omitted.
    pub routes: BTreeMap<String, RealizedRoute>,
    /// Snapshot of the orders no courier could take.
    pub unassigned: Vec<Order>,
    /// Aggregates over `routes`.
    pub metrics: RunMetrics,
    /// Courier → per-stage diagnostics, informational only.
    pub meta: BTreeMap<String, Vec<MetaSolution>>,
}
