//! End-to-end scenarios over the public API, plus randomized properties of
//! the tour operators.

use std::sync::Arc;

use proptest::prelude::*;

use lastmile::assign::{CostMatrixSolver, Scenario};
use lastmile::config::OptimizerConfig;
use lastmile::constraints::CapacityRule;
use lastmile::geo::{haversine, GeoPoint};
use lastmile::matrix::TravelMatrix;
use lastmile::models::{Battery, Courier, Order, Priority, RechargeStation};
use lastmile::oracle::SpeedEstimator;
use lastmile::store::InMemoryStore;
use lastmile::time::TimeWindow;
use lastmile::tsp::{
    path_distance, simulate_tour, three_opt_improve, two_opt_improve, TourContext,
};
use lastmile::Optimizer;

fn optimizer(couriers: Vec<Courier>, orders: Vec<Order>) -> Optimizer {
    let store = Arc::new(InMemoryStore::new(couriers, orders));
    let oracle = Arc::new(SpeedEstimator::new(30.0).unwrap());
    Optimizer::new(store, oracle, OptimizerConfig::default())
}

fn paris_courier() -> Courier {
    Courier::new("L1", GeoPoint::new(48.8566, 2.3522), 100.0)
        .with_work_window("08:00", "18:00")
        .unwrap()
        .with_speed(30.0)
        .with_cost_per_km(0.5)
}

#[test]
fn minimal_feasible_delivery() {
    let orders = vec![Order::new(
        "C1",
        GeoPoint::new(48.86, 2.35),
        10.0,
        Priority::Urgent,
    )];
    let result = optimizer(vec![paris_courier()], orders)
        .optimize(Scenario::Normal)
        .unwrap();

    assert_eq!(result.assignment.orders_for("L1"), &["C1".to_string()]);
    assert!(result.assignment.unassigned().is_empty());
    let route = &result.routes["L1"];
    assert_eq!(route.delivered, vec!["C1"]);
    assert!(route.deferred.is_empty());
    assert!(route.distance_km > 0.0);
}

#[test]
fn capacity_overflow_leaves_second_order_unassigned() {
    // A (50 kg, urgent) is served before B (60 kg, standard); B no longer
    // fits the 100 kg capacity.
    let orders = vec![
        Order::new("A", GeoPoint::new(48.86, 2.35), 50.0, Priority::Urgent),
        Order::new("B", GeoPoint::new(48.861, 2.351), 60.0, Priority::Standard),
    ];
    let courier = paris_courier();
    let result = optimizer(vec![courier.clone()], orders.clone())
        .optimize(Scenario::Normal)
        .unwrap();

    assert_eq!(result.assignment.orders_for("L1"), &["A".to_string()]);
    assert_eq!(result.assignment.unassigned(), &["B".to_string()]);

    // And the capacity rule explains why both cannot ride together.
    let (ok, reason) = CapacityRule.can_add(&courier, &orders[..1], &orders[1]);
    assert!(!ok);
    assert!(reason.contains("Poids dépassé"), "reason was {reason:?}");
}

#[test]
fn lateness_penalty_matches_hand_computation() {
    // Arrival at 13:00 against a 09:00–12:00 window at priority 1 costs
    // (13:00 − 12:00) · 6 = 360 before the scenario multiplier.
    let courier = paris_courier();
    let orders = vec![Order::new(
        "C1",
        GeoPoint::new(48.86, 2.35),
        10.0,
        Priority::Urgent,
    )
    .with_window(TimeWindow::from_hhmm("09:00", "12:00").unwrap())
    .with_service_minutes(0.0)];
    let matrix =
        TravelMatrix::from_parts(2, vec![0.0, 10.0, 10.0, 0.0], vec![0.0, 300.0, 300.0, 0.0])
            .unwrap();
    let ctx = TourContext {
        courier: &courier,
        orders: &orders,
        matrix: &matrix,
        stations: &[],
        scenario: Scenario::Normal,
    };
    let parts = simulate_tour(&ctx, &[0, 1]);
    assert!((parts.lateness - 360.0).abs() < 1e-9);
}

#[test]
fn branch_and_bound_matches_hand_optimal_two_by_two() {
    let solver = CostMatrixSolver::new(vec![vec![0.1, 0.5], vec![0.4, 0.2]]).unwrap();
    let (assignment, cost) = solver.solve().unwrap();
    assert_eq!(assignment, vec![Some(0), Some(1)]);
    assert!((cost - 0.3).abs() < 1e-10);
}

#[test]
fn workday_truncation_defers_the_suffix() {
    let courier = paris_courier().with_work_window("08:00", "08:30").unwrap();
    // Ten orders chained north, each leg ~5.6 km ≈ 11 minutes.
    let orders: Vec<Order> = (0..10)
        .map(|i| {
            Order::new(
                format!("C{i}"),
                GeoPoint::new(48.8566 + 0.05 * (i + 1) as f64, 2.3522),
                5.0,
                Priority::Standard,
            )
        })
        .collect();
    let result = optimizer(vec![courier], orders)
        .optimize(Scenario::Normal)
        .unwrap();

    let route = &result.routes["L1"];
    assert!(!route.delivered.is_empty(), "no deliveries fit the half hour");
    assert!(!route.deferred.is_empty(), "everything fit, chain too short");
    assert_eq!(route.delivered.len() + route.deferred.len(), 10);
    assert!(route.end_minutes <= (8 * 60 + 30) as f64);
}

#[test]
fn battery_detour_recharges_to_full() {
    let courier = paris_courier().with_battery(Battery::new(90.0, 10.0, 1.5));
    let station = RechargeStation {
        id: "R1".into(),
        lat: 48.859,
        lon: 2.3522,
        name: Some("Borne Centre".into()),
        kind: Some("Rapide".into()),
        power_kw: Some(50.0),
        operator: None,
    };
    // One order ~10 km out: a ~20-minute leg against 10 minutes of battery.
    let orders = vec![Order::new(
        "C1",
        GeoPoint::new(48.9466, 2.3522),
        5.0,
        Priority::Standard,
    )];
    let store = Arc::new(InMemoryStore::new(vec![courier.clone()], orders));
    let oracle = Arc::new(SpeedEstimator::new(30.0).unwrap());
    let result = Optimizer::new(store, oracle, OptimizerConfig::default())
        .with_stations(vec![station.clone()])
        .optimize(Scenario::Normal)
        .unwrap();

    let route = &result.routes["L1"];
    assert_eq!(route.recharges.len(), 1);
    let event = &route.recharges[0];
    let detour_min = haversine(courier.depot(), station.location()) / 30.0 * 60.0;
    let expected = (90.0 - (10.0 - detour_min)) / 1.5;
    assert!((event.recharge_minutes - expected).abs() < 1e-9);
    assert_eq!(route.delivered, vec!["C1"]);
}

#[test]
fn rerun_on_identical_snapshot_is_byte_identical() {
    let build = || {
        let couriers = vec![
            paris_courier(),
            Courier::new("L2", GeoPoint::new(48.84, 2.37), 80.0)
                .with_work_window("09:00", "17:00")
                .unwrap(),
        ];
        let orders: Vec<Order> = (0..8)
            .map(|i| {
                Order::new(
                    format!("C{i}"),
                    GeoPoint::new(48.82 + 0.012 * ((i * 5) % 7) as f64, 2.31 + 0.01 * i as f64),
                    9.0,
                    Priority::from_level((i % 3 + 1) as u8).unwrap(),
                )
            })
            .collect();
        optimizer(couriers, orders)
    };
    let a = build().optimize(Scenario::Incident).unwrap();
    let b = build().optimize(Scenario::Incident).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

fn route_strategy() -> impl Strategy<Value = (Vec<GeoPoint>, Vec<usize>)> {
    (5usize..10).prop_flat_map(|n| {
        (
            prop::collection::vec((48.0f64..49.0, 2.0f64..3.0), n),
            Just((1..n).collect::<Vec<usize>>()).prop_shuffle(),
        )
            .prop_map(|(coords, suffix)| {
                let points: Vec<GeoPoint> = coords
                    .into_iter()
                    .map(|(lat, lon)| GeoPoint::new(lat, lon))
                    .collect();
                let mut route = vec![0];
                route.extend(suffix);
                (points, route)
            })
    })
}

proptest! {
    #[test]
    fn prop_two_opt_monotone_and_permutation((points, route) in route_strategy()) {
        let matrix = TravelMatrix::from_speed(&points, 30.0);
        let before = path_distance(&route, &matrix);
        let (improved, after) = two_opt_improve(&route, &matrix);
        prop_assert!(after <= before + 1e-9);
        prop_assert_eq!(improved[0], 0);
        let mut sorted = improved;
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..points.len()).collect::<Vec<_>>());
    }

    #[test]
    fn prop_three_opt_monotone_and_permutation((points, route) in route_strategy()) {
        let matrix = TravelMatrix::from_speed(&points, 30.0);
        let before = path_distance(&route, &matrix);
        let (improved, after) = three_opt_improve(&route, &matrix);
        prop_assert!(after <= before + 1e-9);
        prop_assert_eq!(improved[0], 0);
        let mut sorted = improved;
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..points.len()).collect::<Vec<_>>());
    }

    #[test]
    fn prop_reported_distance_matches_route((points, route) in route_strategy()) {
        let matrix = TravelMatrix::from_speed(&points, 30.0);
        let (improved, dist) = two_opt_improve(&route, &matrix);
        prop_assert!((dist - path_distance(&improved, &matrix)).abs() < 1e-9);
    }
}
