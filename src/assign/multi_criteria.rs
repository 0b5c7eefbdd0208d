//! Multi-criteria greedy assignment.
//!
//! Orders are served urgent-first (priority ascending, then weight
//! descending so bulky parcels claim space early). Each order goes to the
//! feasible courier with the lowest weighted cost:
//!
//! ```text
//! (haversine(depot, order) + 1.2·priority_penalty
//!     + 5.0·weight/(capacity + 1)) · scenario_coeff
//! ```
//!
//! Feasibility is capacity, schedule, and weather; an order with no
//! feasible courier lands in the unassigned set.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{estimated_total_distance, AssignmentSolver, Scenario, SolverOutcome};
use crate::constraints::{CapacityRule, ScheduleRule, WeatherCheck};
use crate::error::Result;
use crate::models::{Courier, Order};

/// Weight of the priority penalty in the cost blend.
const PRIORITY_WEIGHT: f64 = 1.2;
/// Weight of the load-ratio term in the cost blend.
const LOAD_WEIGHT: f64 = 5.0;

/// Greedy solver balancing distance, urgency, and courier load headroom.
pub struct MultiCriteriaSolver {
    weather: Arc<dyn WeatherCheck>,
}

impl MultiCriteriaSolver {
    /// Creates the solver with the given weather predicate.
    pub fn new(weather: Arc<dyn WeatherCheck>) -> Self {
        Self { weather }
    }
}

impl AssignmentSolver for MultiCriteriaSolver {
    fn assign(
        &self,
        couriers: &[Courier],
        orders: &[Order],
        scenario: Scenario,
    ) -> Result<SolverOutcome> {
        let mut outcome = SolverOutcome::default();
        if couriers.is_empty() {
            outcome.unassigned = orders.to_vec();
            return Ok(outcome);
        }

        let mut queue: Vec<&Order> = orders.iter().collect();
        queue.sort_by(|a, b| {
            a.priority()
                .level()
                .cmp(&b.priority().level())
                .then(b.weight_kg().total_cmp(&a.weight_kg()))
        });

        let mut loads: BTreeMap<String, Vec<Order>> = BTreeMap::new();
        let coeff = scenario.priority_coeff();

        for order in queue {
            let (admissible, reason) = self.weather.admissible(&[order.location()]);
            if !admissible {
                tracing::debug!(order = order.id(), %reason, "excluded by weather");
                outcome.unassigned.push(order.clone());
                continue;
            }

            let mut best: Option<(usize, f64)> = None;
            for (idx, courier) in couriers.iter().enumerate() {
                let (available, _) = ScheduleRule.is_available(courier, courier.work_start());
                if !available {
                    continue;
                }
                let carried = loads.get(courier.id()).map(Vec::as_slice).unwrap_or(&[]);
                let (fits, _) = CapacityRule.can_add(courier, carried, order);
                if !fits {
                    continue;
                }

                let cost = (courier.depot().distance_km(order.location())
                    + PRIORITY_WEIGHT * order.priority().penalty()
                    + LOAD_WEIGHT * order.weight_kg() / (courier.capacity_kg() + 1.0))
                    * coeff;
                // Strict comparison keeps the first courier on ties.
                if best.map_or(true, |(_, c)| cost < c) {
                    best = Some((idx, cost));
                }
            }

            match best {
                Some((idx, _)) => loads
                    .entry(couriers[idx].id().to_string())
                    .or_default()
                    .push(order.clone()),
                None => outcome.unassigned.push(order.clone()),
            }
        }

        outcome.total_cost = estimated_total_distance(couriers, &loads);
        outcome.assignments = loads;
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "multi_criteria"
    }
}
