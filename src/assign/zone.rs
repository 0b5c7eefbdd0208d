//! Zone-seeded greedy assignment.
//!
//! # Algorithm
//!
//! 1. K-means with k = |couriers|; each cluster's member nearest its
//!    centroid becomes a seed order.
//! 2. A small branch-and-bound binds each courier to at most one seed
//!    (seeds that don't fit a courier are priced as blocked).
//! 3. Every bound seed opens a zone of configurable radius. Remaining
//!    orders are tagged with the nearest seed's zone when inside the
//!    radius, or left zone-free and visible to every courier.
//! 4. Couriers then take turns picking the visible order minimizing
//!    `0.7·haversine(position, order) + 0.3·priority`, capacity permitting,
//!    advancing their position to each pick, until nobody can pick.

use std::collections::BTreeMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::branch_bound::CostMatrixSolver;
use super::{estimated_total_distance, match_score, AssignmentSolver, Scenario, SolverOutcome};
use crate::cluster::{centroid_of, kmeans};
use crate::constraints::CapacityRule;
use crate::error::Result;
use crate::geo::GeoPoint;
use crate::models::{Courier, Order};

const BLOCKED: f64 = 9999.0;
const DUMMY: f64 = 1.2;

/// Greedy solver that anchors each courier to a geographic zone.
pub struct ZoneSeededSolver {
    seed: u64,
    kmeans_iters: usize,
    zone_radius_km: f64,
    bb_deadline: Duration,
}

impl ZoneSeededSolver {
    /// Creates the solver.
    pub fn new(
        seed: u64,
        kmeans_iters: usize,
        zone_radius_km: f64,
        bb_deadline: Duration,
    ) -> Self {
        Self {
            seed,
            kmeans_iters,
            zone_radius_km,
            bb_deadline,
        }
    }

    /// Picks one seed order per cluster: the member nearest the centroid.
    fn pick_seeds(&self, orders: &[Order], clusters: &[Vec<usize>]) -> Vec<usize> {
        let points: Vec<GeoPoint> = orders.iter().map(Order::location).collect();
        clusters
            .iter()
            .filter_map(|cluster| {
                let centroid = centroid_of(&points, cluster)?;
                cluster.iter().copied().min_by(|&a, &b| {
                    points[a]
                        .distance_km(centroid)
                        .total_cmp(&points[b].distance_km(centroid))
                })
            })
            .collect()
    }
}

impl AssignmentSolver for ZoneSeededSolver {
    fn assign(
        &self,
        couriers: &[Courier],
        orders: &[Order],
        _scenario: Scenario,
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
        let points: Vec<GeoPoint> = orders.iter().map(Order::location).collect();
        let clusters = kmeans(&points, couriers.len(), self.kmeans_iters, &mut rng);
        let seeds = self.pick_seeds(orders, &clusters);

        // Bind couriers to seeds with a small branch-and-bound.
        let n_cols = couriers.len().max(seeds.len()) + 3;
        let cost: Vec<Vec<f64>> = couriers
            .iter()
            .map(|courier| {
                (0..n_cols)
                    .map(|j| match seeds.get(j) {
                        Some(&order_idx) => {
                            let score = match_score(courier, &orders[order_idx], &[]);
                            if score > 0.0 {
                                1.0 - score
                            } else {
                                BLOCKED
                            }
                        }
                        None => DUMMY,
                    })
                    .collect()
            })
            .collect();
        let (bound, _) = CostMatrixSolver::new(cost)?
            .with_deadline(self.bb_deadline)
            .solve()?;

        let mut claimed = vec![false; orders.len()];
        let mut loads: Vec<Vec<Order>> = vec![Vec::new(); couriers.len()];
        let mut positions: Vec<GeoPoint> = couriers.iter().map(Courier::depot).collect();
        // Seed order index → the courier anchored there.
        let mut seed_owner: BTreeMap<usize, usize> = BTreeMap::new();

        for (courier_idx, col) in bound.iter().enumerate() {
            let Some(col) = col else { continue };
            let Some(&order_idx) = seeds.get(*col) else { continue };
            if match_score(&couriers[courier_idx], &orders[order_idx], &[]) <= 0.0 {
                continue;
            }
            claimed[order_idx] = true;
            loads[courier_idx].push(orders[order_idx].clone());
            positions[courier_idx] = orders[order_idx].location();
            seed_owner.insert(order_idx, courier_idx);
        }

        // Tag remaining orders with the nearest owned seed's zone.
        let zone: Vec<Option<usize>> = orders
            .iter()
            .enumerate()
            .map(|(idx, order)| {
                if claimed[idx] {
                    return None;
                }
                let nearest = seed_owner
                    .iter()
                    .min_by(|(&a, _), (&b, _)| {
                        order
                            .location()
                            .distance_km(points[a])
                            .total_cmp(&order.location().distance_km(points[b]))
                    })
                    .map(|(&seed_idx, &courier_idx)| (seed_idx, courier_idx))?;
                let (seed_idx, courier_idx) = nearest;
                if order.location().distance_km(points[seed_idx]) <= self.zone_radius_km {
                    Some(courier_idx)
                } else {
                    None
                }
            })
            .collect();

        // Round-robin picking until no courier can take anything.
        let mut progress = true;
        while progress {
            progress = false;
            for (courier_idx, courier) in couriers.iter().enumerate() {
                if !courier.is_available() {
                    continue;
                }
                let position = positions[courier_idx];
                let pick = orders
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| {
                        !claimed[*idx]
                            && match zone[*idx] {
                                Some(owner) => owner == courier_idx,
                                None => true,
                            }
                    })
                    .filter(|&(_, order)| {
                        CapacityRule.can_add(courier, &loads[courier_idx], order).0
                    })
                    .min_by(|(_, a), (_, b)| {
                        let cost_a = 0.7 * position.distance_km(a.location())
                            + 0.3 * a.priority().level() as f64;
                        let cost_b = 0.7 * position.distance_km(b.location())
                            + 0.3 * b.priority().level() as f64;
                        cost_a.total_cmp(&cost_b)
                    })
                    .map(|(idx, _)| idx);

                if let Some(idx) = pick {
                    claimed[idx] = true;
                    loads[courier_idx].push(orders[idx].clone());
                    positions[courier_idx] = orders[idx].location();
                    progress = true;
                }
            }
        }

        for (courier, load) in couriers.iter().zip(loads) {
            if !load.is_empty() {
                outcome.assignments.insert(courier.id().to_string(), load);
            }
        }
        for (order, taken) in orders.iter().zip(claimed) {
            if !taken {
                outcome.unassigned.push(order.clone());
            }
        }
        outcome.total_cost = estimated_total_distance(couriers, &outcome.assignments);
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "zone_seeded"
    }
}
