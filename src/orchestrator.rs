//! Optimization orchestrator: the single entry point of the core.
//!
//! One [`Optimizer::optimize`] call loads snapshots through the store,
//! runs the configured assignment solver, refines and executes one tour
//! per courier, aggregates metrics, writes assignment statuses back, and
//! caches the result for diagnostic readers.
//!
//! Partial progress is preserved: when one courier's refinement or
//! execution fails, that courier's orders return to the unassigned set and
//! every other courier's tour is still emitted.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assign::{solver_from_name, AssignmentSolver, MultiCriteriaSolver, Scenario, SolverOutcome};
use crate::config::OptimizerConfig;
use crate::constraints::{ClearSkies, WeatherCheck};
use crate::error::{Error, Result};
use crate::executor::RouteExecutor;
use crate::geo::GeoPoint;
use crate::models::{
    Assignment, Courier, MetaSolution, OptimizationResult, Order, RealizedRoute, RechargeStation,
    RunMetrics,
};
use crate::oracle::TravelOracle;
use crate::store::DeliveryStore;
use crate::tsp::{refine_tour, TourContext, TourPipeline};

/// Owns the collaborators of the optimization pipeline.
///
/// Concurrency: `optimize` takes `&self` and keeps no mutable state besides
/// the last-run cache, a single-writer/multi-reader slot with
/// last-writer-wins semantics. Independent optimizers can run side by side
/// since each call works on its own snapshots.
pub struct Optimizer {
    store: Arc<dyn DeliveryStore>,
    oracle: Arc<dyn TravelOracle>,
    weather: Arc<dyn WeatherCheck>,
    stations: Vec<RechargeStation>,
    config: OptimizerConfig,
    last: RwLock<Option<OptimizationResult>>,
}

impl Optimizer {
    /// Creates an optimizer with pass-through weather and no stations.
    pub fn new(
        store: Arc<dyn DeliveryStore>,
        oracle: Arc<dyn TravelOracle>,
        config: OptimizerConfig,
    ) -> Self {
        Self {
            store,
            oracle,
            weather: Arc::new(ClearSkies),
            stations: Vec::new(),
            config,
            last: RwLock::new(None),
        }
    }

    /// Sets the recharge-station catalogue.
    pub fn with_stations(mut self, stations: Vec<RechargeStation>) -> Self {
        self.stations = stations;
        self
    }

    /// Sets the weather predicate consumed by the solvers.
    pub fn with_weather(mut self, weather: Arc<dyn WeatherCheck>) -> Self {
        self.weather = weather;
        self
    }

    /// Last finished run, if any.
    pub fn last_result(&self) -> Option<OptimizationResult> {
        self.last.read().expect("cache lock").clone()
    }

    /// Runs the full pipeline for one scenario.
    ///
    /// Fails with [`Error::InsufficientData`] when no courier is available
    /// or no order is pending. A solver deadline is retried with the
    /// multi-criteria greedy unless `bb_fallback` is off.
    pub fn optimize(&self, scenario: Scenario) -> Result<OptimizationResult> {
        let couriers = self.store.list_available_couriers()?;
        let orders = self.store.list_pending_orders()?;
        if couriers.is_empty() {
            return Err(Error::InsufficientData("no available couriers".into()));
        }
        if orders.is_empty() {
            return Err(Error::InsufficientData("no pending orders".into()));
        }
        tracing::info!(
            couriers = couriers.len(),
            orders = orders.len(),
            solver = %self.config.solver,
            ?scenario,
            "optimization started"
        );

        let outcome = self.run_assignment(&couriers, &orders, scenario)?;

        let mut routes: BTreeMap<String, RealizedRoute> = BTreeMap::new();
        let mut meta: BTreeMap<String, Vec<MetaSolution>> = BTreeMap::new();
        let mut unassigned = outcome.unassigned.clone();
        let mut assignment = Assignment::new();
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        for (courier_id, assigned) in &outcome.assignments {
            if assigned.is_empty() {
                continue;
            }
            let courier = couriers
                .iter()
                .find(|c| c.id() == courier_id.as_str())
                .ok_or_else(|| Error::InvalidInput(format!("unknown courier {courier_id:?}")))?;

            match self.plan_courier(courier, assigned, scenario, &mut rng) {
                Ok((realized, stages)) => {
                    for order in assigned {
                        assignment.push_order(courier_id.clone(), order.id());
                    }
                    routes.insert(courier_id.clone(), realized);
                    meta.insert(courier_id.clone(), stages);
                }
                Err(err) => {
                    tracing::warn!(
                        courier = courier_id.as_str(),
                        %err,
                        "courier pipeline failed, returning its orders to unassigned"
                    );
                    unassigned.extend(assigned.iter().cloned());
                }
            }
        }

        for order in &unassigned {
            assignment.push_unassigned(order.id());
        }

        let metrics = RunMetrics {
            total_distance_km: routes.values().map(|r| r.distance_km).sum(),
            total_duration_min: routes.values().map(|r| r.duration_min).sum(),
            total_cost: routes.values().map(|r| r.cost).sum(),
            tours: routes.len(),
            global_score: 1.0 / (1.0 + outcome.total_cost),
        };

        for (courier_id, realized) in &routes {
            if !realized.delivered.is_empty() {
                self.store.assign_orders(courier_id, &realized.delivered)?;
            }
        }

        let result = OptimizationResult {
            scenario,
            assignment,
            routes,
            unassigned,
            metrics,
            meta,
        };
        tracing::info!(
            tours = result.metrics.tours,
            total_km = result.metrics.total_distance_km,
            unassigned = result.unassigned.len(),
            "optimization finished"
        );
        *self.last.write().expect("cache lock") = Some(result.clone());
        Ok(result)
    }

    fn run_assignment(
        &self,
        couriers: &[Courier],
        orders: &[Order],
        scenario: Scenario,
    ) -> Result<SolverOutcome> {
        let solver = solver_from_name(&self.config.solver, &self.config, self.weather.clone())?;
        match solver.assign(couriers, orders, scenario) {
            Err(Error::SolverTimeout { deadline_secs }) if self.config.bb_fallback => {
                tracing::warn!(
                    solver = solver.name(),
                    deadline_secs,
                    "solver deadline hit, falling back to multi-criteria greedy"
                );
                MultiCriteriaSolver::new(self.weather.clone()).assign(couriers, orders, scenario)
            }
            other => other,
        }
    }

    /// Refines and executes one courier's tour, returning the realized
    /// route and the per-stage diagnostics.
    fn plan_courier(
        &self,
        courier: &Courier,
        assigned: &[Order],
        scenario: Scenario,
        rng: &mut StdRng,
    ) -> Result<(RealizedRoute, Vec<MetaSolution>)> {
        let mut points = vec![courier.depot()];
        points.extend(assigned.iter().map(Order::location));
        let matrix = self.oracle.table(&points)?;

        let ctx = TourContext {
            courier,
            orders: assigned,
            matrix: &matrix,
            stations: &self.stations,
            scenario,
        };
        let pipeline = refine_tour(&ctx, &self.config.ga, rng);

        let executor = RouteExecutor::new(self.oracle.as_ref(), &self.stations)
            .with_estimate_fallback(self.config.allow_estimates);
        let realized = executor.execute(courier, assigned, pipeline.final_route())?;

        let stages = self.stage_diagnostics(courier, assigned, &points, &pipeline);
        Ok((realized, stages))
    }

    fn stage_diagnostics(
        &self,
        courier: &Courier,
        assigned: &[Order],
        points: &[GeoPoint],
        pipeline: &TourPipeline,
    ) -> Vec<MetaSolution> {
        let mut stages = Vec::new();
        for (algo, stage) in pipeline.stages() {
            let coords: Vec<GeoPoint> = stage.route.iter().map(|&i| points[i]).collect();
            let shape = match self.oracle.shape(&coords) {
                Ok(shape) => shape,
                Err(err) => {
                    tracing::warn!(algo, %err, "stage geometry unavailable");
                    continue;
                }
            };
            stages.push(MetaSolution {
                algo: algo.to_string(),
                estimated_distance: stage.distance,
                osrm_distance_km: shape.distance_km,
                osrm_duration_min: shape.duration_min,
                cost: shape.distance_km * courier.cost_per_km(),
                geometry: shape.geometry,
                ordered_ids: stage
                    .route
                    .iter()
                    .filter(|&&i| i >= 1)
                    .map(|&i| assigned[i - 1].id().to_string())
                    .collect(),
            });
        }
        stages
    }
}
