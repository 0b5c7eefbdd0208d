//! Post-hoc validation of a finished optimization run.
//!
//! Replays an [`OptimizationResult`] against the rules and reports what a
//! correct run must satisfy: capacity per courier, the delivered/deferred
//! split, workday bounds, no duplicate assignments, full order coverage.
//! Diagnostic only — `optimize()` never gates on this.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::constraints::CapacityRule;
use crate::models::{Courier, Order, OptimizationResult};
use crate::time::minutes_to_hhmm;

/// Outcome of replaying a run against the rules.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// `true` when no violations were found (warnings allowed).
    pub valid: bool,
    /// Hard rule breaches.
    pub violations: Vec<String>,
    /// Soft findings, e.g. unassigned orders.
    pub warnings: Vec<String>,
    /// Couriers whose tours passed every check.
    pub valid_couriers: Vec<String>,
    /// Couriers with at least one violation.
    pub invalid_couriers: Vec<String>,
}

/// Replays `result` against the capacity, partition, and workday rules.
pub fn validate_run(
    couriers: &[Courier],
    orders: &[Order],
    result: &OptimizationResult,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    let courier_index: BTreeMap<&str, &Courier> =
        couriers.iter().map(|c| (c.id(), c)).collect();
    let order_index: BTreeMap<&str, &Order> = orders.iter().map(|o| (o.id(), o)).collect();

    let mut seen: BTreeSet<&str> = BTreeSet::new();

    for (courier_id, order_ids) in result.assignment.routes() {
        let mut courier_violations = Vec::new();

        let Some(&courier) = courier_index.get(courier_id.as_str()) else {
            report
                .violations
                .push(format!("Livreur {courier_id} introuvable"));
            report.invalid_couriers.push(courier_id.clone());
            continue;
        };

        // Each order belongs to at most one courier.
        for id in order_ids {
            if !seen.insert(id.as_str()) {
                courier_violations.push(format!("Commande {id} affectée plusieurs fois"));
            }
        }

        let load: Vec<Order> = order_ids
            .iter()
            .filter_map(|id| order_index.get(id.as_str()).map(|o| (*o).clone()))
            .collect();
        if load.len() != order_ids.len() {
            courier_violations.push(format!(
                "Livreur {courier_id}: commandes inconnues dans l'affectation"
            ));
        }

        let (ok, reason) = CapacityRule.fits(courier, &load);
        if !ok {
            courier_violations.push(reason);
        }

        if let Some(route) = result.routes.get(courier_id) {
            // Delivered and deferred must partition the assignment.
            let mut walked: Vec<&str> = route
                .delivered
                .iter()
                .chain(route.deferred.iter())
                .map(String::as_str)
                .collect();
            walked.sort_unstable();
            let mut expected: Vec<&str> = order_ids.iter().map(String::as_str).collect();
            expected.sort_unstable();
            if walked != expected {
                courier_violations.push(format!(
                    "Livreur {courier_id}: livrées + reportées ≠ affectation"
                ));
            }
            if route.delivered.iter().any(|id| route.deferred.contains(id)) {
                courier_violations.push(format!(
                    "Livreur {courier_id}: commande à la fois livrée et reportée"
                ));
            }

            if route.end_minutes > courier.work_end() as f64 + 1e-9 {
                courier_violations.push(format!(
                    "Livreur {courier_id}: retour tardif {} > {}",
                    minutes_to_hhmm(route.end_minutes as u32),
                    minutes_to_hhmm(courier.work_end())
                ));
            }
        }

        if courier_violations.is_empty() {
            report.valid_couriers.push(courier_id.clone());
        } else {
            report.invalid_couriers.push(courier_id.clone());
            report.violations.extend(courier_violations);
        }
    }

    // Coverage: every input order is assigned or reported unassigned.
    let unassigned: BTreeSet<&str> = result
        .assignment
        .unassigned()
        .iter()
        .map(String::as_str)
        .collect();
    let missing: Vec<&str> = orders
        .iter()
        .map(Order::id)
        .filter(|id| !seen.contains(id) && !unassigned.contains(id))
        .collect();
    if !missing.is_empty() {
        report.warnings.push(format!(
            "{} commandes hors du résultat: {}",
            missing.len(),
            missing.join(", ")
        ));
    }
    if !unassigned.is_empty() {
        report
            .warnings
            .push(format!("{} commandes non affectées", unassigned.len()));
    }

    report.valid = report.violations.is_empty();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::Scenario;
    use crate::geo::GeoPoint;
    use crate::models::{Assignment, Priority, RealizedRoute, RunMetrics};

    fn courier(id: &str, capacity: f64) -> Courier {
        Courier::new(id, GeoPoint::new(48.85, 2.35), capacity)
            .with_work_window("08:00", "18:00")
            .unwrap()
    }

    fn order(id: &str, weight: f64) -> Order {
        Order::new(id, GeoPoint::new(48.86, 2.35), weight, Priority::Standard)
    }

    fn route(courier_id: &str, delivered: &[&str], deferred: &[&str], end: f64) -> RealizedRoute {
        RealizedRoute {
            courier_id: courier_id.into(),
            delivered: delivered.iter().map(|s| s.to_string()).collect(),
            deferred: deferred.iter().map(|s| s.to_string()).collect(),
            distance_km: 1.0,
            duration_min: 10.0,
            cost: 0.5,
            gps: Vec::new(),
            recharges: Vec::new(),
            end_minutes: end,
            shape: Vec::new(),
        }
    }

    fn result_with(assignment: Assignment, routes: Vec<RealizedRoute>) -> OptimizationResult {
        OptimizationResult {
            scenario: Scenario::Normal,
            routes: routes
                .into_iter()
                .map(|r| (r.courier_id.clone(), r))
                .collect(),
            assignment,
            unassigned: Vec::new(),
            metrics: RunMetrics::default(),
            meta: BTreeMap::new(),
        }
    }

    #[test]
    fn test_clean_run_is_valid() {
        let couriers = vec![courier("L1", 100.0)];
        let orders = vec![order("C1", 10.0)];
        let mut a = Assignment::new();
        a.push_order("L1", "C1");
        let result = result_with(a, vec![route("L1", &["C1"], &[], 540.0)]);

        let report = validate_run(&couriers, &orders, &result);
        assert!(report.valid, "violations: {:?}", report.violations);
        assert_eq!(report.valid_couriers, vec!["L1"]);
    }

    #[test]
    fn test_overweight_assignment_flagged() {
        let couriers = vec![courier("L1", 50.0)];
        let orders = vec![order("C1", 30.0), order("C2", 40.0)];
        let mut a = Assignment::new();
        a.push_order("L1", "C1");
        a.push_order("L1", "C2");
        let result = result_with(a, vec![route("L1", &["C1", "C2"], &[], 540.0)]);

        let report = validate_run(&couriers, &orders, &result);
        assert!(!report.valid);
        assert!(report.violations.iter().any(|v| v.contains("Poids dépassé")));
    }

    #[test]
    fn test_duplicate_assignment_flagged() {
        let couriers = vec![courier("L1", 100.0), courier("L2", 100.0)];
        let orders = vec![order("C1", 10.0)];
        let mut a = Assignment::new();
        a.push_order("L1", "C1");
        a.push_order("L2", "C1");
        let result = result_with(a, vec![]);

        let report = validate_run(&couriers, &orders, &result);
        assert!(report
            .violations
            .iter()
            .any(|v| v.contains("plusieurs fois")));
    }

    #[test]
    fn test_late_return_flagged() {
        let couriers = vec![courier("L1", 100.0)];
        let orders = vec![order("C1", 10.0)];
        let mut a = Assignment::new();
        a.push_order("L1", "C1");
        let result = result_with(a, vec![route("L1", &["C1"], &[], 1090.0)]);

        let report = validate_run(&couriers, &orders, &result);
        assert!(report.violations.iter().any(|v| v.contains("retour tardif")));
    }

    #[test]
    fn test_unassigned_is_warning_not_violation() {
        let couriers = vec![courier("L1", 100.0)];
        let orders = vec![order("C1", 10.0)];
        let mut a = Assignment::new();
        a.push_unassigned("C1");
        let result = result_with(a, vec![]);

        let report = validate_run(&couriers, &orders, &result);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
    }
}
