//! Clustered greedy assignment.
//!
//! # Algorithm
//!
//! 1. K-means the orders into `min(max(1, n/8 + 1), |couriers|)` geographic
//!    clusters.
//! 2. Within each cluster, give every courier `min(6, ⌈|cluster|/|couriers|⌉)`
//!    identical virtual slots.
//! 3. Price every (slot, order) pair as
//!    `haversine(depot, order) + priority_penalty · scenario_coeff`.
//! 4. Walk the pairs cheapest-first, claiming each order for the first
//!    feasible slot (capacity, availability, weather).
//! 5. Merge each courier's slots back together; orders that no longer fit
//!    the real capacity on merge fall into the unassigned set.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{estimated_total_distance, AssignmentSolver, Scenario, SolverOutcome};
use crate::cluster::kmeans;
use crate::constraints::{CapacityRule, ScheduleRule, WeatherCheck};
use crate::error::Result;
use crate::models::{Courier, Order};

/// Maximum virtual slots per courier within one cluster.
const MAX_SLOTS_PER_COURIER: usize = 6;

/// Greedy solver that spreads geographic clusters across courier slots.
pub struct ClusteredGreedySolver {
    seed: u64,
    kmeans_iters: usize,
    weather: Arc<dyn WeatherCheck>,
}

impl ClusteredGreedySolver {
    /// Creates the solver. `seed` drives cluster seeding so runs reproduce.
    pub fn new(seed: u64, kmeans_iters: usize, weather: Arc<dyn WeatherCheck>) -> Self {
        Self {
            seed,
            kmeans_iters,
            weather,
        }
    }
}

impl AssignmentSolver for ClusteredGreedySolver {
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
        if orders.is_empty() {
            return Ok(outcome);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let k = (orders.len() / 8 + 1).max(1).min(couriers.len());
        let points: Vec<_> = orders.iter().map(Order::location).collect();
        let clusters = kmeans(&points, k, self.kmeans_iters, &mut rng);

        // Slot loads in claim order, merged per courier afterwards.
        let mut slot_loads: Vec<(usize, Vec<Order>)> = Vec::new();
        let mut claimed = vec![false; orders.len()];
        let coeff = scenario.priority_coeff();

        for cluster in &clusters {
            let slots_per_courier =
                (cluster.len() as f64 / couriers.len() as f64).ceil() as usize;
            let slots_per_courier = slots_per_courier.clamp(1, MAX_SLOTS_PER_COURIER);

            let first_slot = slot_loads.len();
            for courier_idx in 0..couriers.len() {
                for _ in 0..slots_per_courier {
                    slot_loads.push((courier_idx, Vec::new()));
                }
            }

            // All (slot, order) pairs for this cluster, cheapest first.
            let mut pairs: Vec<(f64, usize, usize)> = Vec::new();
            for slot_idx in first_slot..slot_loads.len() {
                let courier = &couriers[slot_loads[slot_idx].0];
                for &order_idx in cluster {
                    let order = &orders[order_idx];
                    let cost = courier.depot().distance_km(order.location())
                        + order.priority().penalty() * coeff;
                    pairs.push((cost, slot_idx, order_idx));
                }
            }
            pairs.sort_by(|a, b| {
                a.0.total_cmp(&b.0)
                    .then(a.1.cmp(&b.1))
                    .then(a.2.cmp(&b.2))
            });

            for (_, slot_idx, order_idx) in pairs {
                if claimed[order_idx] {
                    continue;
                }
                let order = &orders[order_idx];
                let courier = &couriers[slot_loads[slot_idx].0];

                let (available, _) = ScheduleRule.is_available(courier, courier.work_start());
                if !available {
                    continue;
                }
                let (fits, _) = CapacityRule.can_add(courier, &slot_loads[slot_idx].1, order);
                if !fits {
                    continue;
                }
                let (admissible, _) = self.weather.admissible(&[order.location()]);
                if !admissible {
                    continue;
                }

                slot_loads[slot_idx].1.push(order.clone());
                claimed[order_idx] = true;
            }
        }

        // Merge slots back onto their couriers under the real capacity.
        let mut merged: BTreeMap<String, Vec<Order>> = BTreeMap::new();
        for (courier_idx, load) in slot_loads {
            let courier = &couriers[courier_idx];
            for order in load {
                let carried = merged.entry(courier.id().to_string()).or_default();
                let (fits, reason) = CapacityRule.can_add(courier, carried, &order);
                if fits {
                    carried.push(order);
                } else {
                    tracing::debug!(order = order.id(), %reason, "rejected on slot merge");
                    outcome.unassigned.push(order);
                }
            }
        }
        merged.retain(|_, load| !load.is_empty());

        for (order, taken) in orders.iter().zip(&claimed) {
            if !taken {
                outcome.unassigned.push(order.clone());
            }
        }

        outcome.total_cost = estimated_total_distance(couriers, &merged);
        outcome.assignments = merged;
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "clustered_greedy"
    }
}
