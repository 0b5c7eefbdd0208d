//! Assignment stage: partition the order set across couriers.
//!
//! Four interchangeable strategies implement [`AssignmentSolver`]; the
//! orchestrator selects one by configuration name through
//! [`solver_from_name`]. They trade off optimality, throughput, and
//! fairness differently:
//!
//! - [`BranchAndBoundSolver`] — exact one-order-per-courier matching under a
//!   deadline
//! - [`ClusteredGreedySolver`] — k-means clusters filled through virtual
//!   courier slots
//! - [`MultiCriteriaSolver`] — priority-ordered greedy over a weighted cost
//! - [`ZoneSeededSolver`] — cluster seeds bound by branch-and-bound, then
//!   zone-restricted greedy rounds

mod branch_bound;
mod clustered;
mod multi_criteria;
mod zone;

pub use branch_bound::{BranchAndBoundSolver, CostMatrixSolver};
pub use clustered::ClusteredGreedySolver;
pub use multi_criteria::MultiCriteriaSolver;
pub use zone::ZoneSeededSolver;

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::OptimizerConfig;
use crate::constraints::{CapacityRule, WeatherCheck};
use crate::error::{Error, Result};
use crate::models::{Assignment, Courier, Order};

/// Workload modifier scaling the priority penalty in assignment costs and
/// the lateness penalty in the tour fitness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Regular day.
    Normal,
    /// Demand peak.
    Peak,
    /// Degraded operations (weather, breakdowns).
    Incident,
}

impl Scenario {
    /// Multiplier applied to priority and lateness penalties.
    pub fn priority_coeff(&self) -> f64 {
        match self {
            Scenario::Normal => 1.0,
            Scenario::Peak => 1.3,
            Scenario::Incident => 1.7,
        }
    }
}

impl FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(Scenario::Normal),
            "peak" => Ok(Scenario::Peak),
            "incident" => Ok(Scenario::Incident),
            other => Err(Error::InvalidInput(format!("unknown scenario {other:?}"))),
        }
    }
}

/// What a solver produced: courier → orders, the leftovers, and an
/// estimated total travel distance for cross-solver comparison.
#[derive(Debug, Clone, Default)]
pub struct SolverOutcome {
    /// Courier id → orders, in planned pickup order.
    pub assignments: BTreeMap<String, Vec<Order>>,
    /// Orders no courier could take (capacity/availability/weather).
    pub unassigned: Vec<Order>,
    /// Haversine estimate of the total travel the assignment implies.
    pub total_cost: f64,
}

impl SolverOutcome {
    /// Reduces the outcome to id form.
    pub fn to_assignment(&self) -> Assignment {
        let mut assignment = Assignment::new();
        for (courier_id, orders) in &self.assignments {
            for order in orders {
                assignment.push_order(courier_id.clone(), order.id());
            }
        }
        for order in &self.unassigned {
            assignment.push_unassigned(order.id());
        }
        assignment
    }
}

/// One interchangeable assignment strategy.
pub trait AssignmentSolver: Send + Sync {
    /// Partitions `orders` across `couriers` under capacity, availability,
    /// and weather constraints.
    fn assign(
        &self,
        couriers: &[Courier],
        orders: &[Order],
        scenario: Scenario,
    ) -> Result<SolverOutcome>;

    /// Configuration name of this strategy.
    fn name(&self) -> &'static str;
}

/// Builds the solver selected by configuration.
///
/// Known names: `branch_and_bound`, `clustered_greedy`, `multi_criteria`,
/// `zone_seeded`. Anything else fails with [`Error::InvalidInput`].
pub fn solver_from_name(
    name: &str,
    config: &OptimizerConfig,
    weather: Arc<dyn WeatherCheck>,
) -> Result<Box<dyn AssignmentSolver>> {
    match name {
        "branch_and_bound" => Ok(Box::new(BranchAndBoundSolver::new(Duration::from_secs(
            config.bb_deadline_secs,
        )))),
        "clustered_greedy" => Ok(Box::new(ClusteredGreedySolver::new(
            config.seed,
            config.kmeans_iters,
            weather,
        ))),
        "multi_criteria" => Ok(Box::new(MultiCriteriaSolver::new(weather))),
        "zone_seeded" => Ok(Box::new(ZoneSeededSolver::new(
            config.seed,
            config.kmeans_iters,
            config.zone_radius_km,
            Duration::from_secs(config.bb_deadline_secs),
        ))),
        other => Err(Error::InvalidInput(format!("unknown solver {other:?}"))),
    }
}

/// Scores a courier/order pairing for the matching solvers. Higher is
/// better; zero means the pairing is infeasible (courier unavailable or
/// the order does not fit on top of `carried`).
///
/// Blends proximity to the depot with urgency:
/// `0.6 · 1/(1+d) + 0.4 · (4 − priority)/3`.
pub fn match_score(courier: &Courier, order: &Order, carried: &[Order]) -> f64 {
    if !courier.is_available() {
        return 0.0;
    }
    let (fits, _) = CapacityRule.can_add(courier, carried, order);
    if !fits {
        return 0.0;
    }

    let d = courier.depot().distance_km(order.location());
    let score_distance = 1.0 / (1.0 + d);
    let score_priority = (4 - order.priority().level()) as f64 / 3.0;

    0.6 * score_distance + 0.4 * score_priority
}

/// Haversine estimate of the travel an assignment implies: depot to first
/// order, then order to order, per courier.
pub fn estimated_total_distance(
    couriers: &[Courier],
    assignments: &BTreeMap<String, Vec<Order>>,
) -> f64 {
    let mut total = 0.0;
    for courier in couriers {
        let Some(orders) = assignments.get(courier.id()) else {
            continue;
        };
        let Some(first) = orders.first() else {
            continue;
        };
        total += courier.depot().distance_km(first.location());
        total += orders
            .windows(2)
            .map(|w| w[0].location().distance_km(w[1].location()))
            .sum::<f64>();
    }
    total
}
