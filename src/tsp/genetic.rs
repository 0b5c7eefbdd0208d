//! Constraint-aware genetic refinement of a courier tour.
//!
//! Individuals are depot-rooted permutations. Fitness is not bare distance:
//! each candidate tour is simulated against the travel matrix, the
//! courier's workday and battery, and every order's delivery window, then
//! scored as a weighted blend of distance, time, lateness, battery
//! penalties, and overtime.
//!
//! # Operators
//!
//! - **Selection**: k-way tournament
//! - **Crossover**: ordered crossover (OX) on the non-depot suffix
//! - **Mutation**: swap or segment-reverse, equal odds
//! - **Elitism** plus a slice of random immigrants each generation

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::assign::Scenario;
use crate::geo::haversine;
use crate::matrix::TravelMatrix;
use crate::models::{nearest_station, Courier, Order, RechargeStation};

/// Genetic-algorithm tuning knobs, loadable from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaParams {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generations to run.
    pub generations: usize,
    /// Probability that a child is mutated.
    pub mutation_rate: f64,
    /// Tournament size for parent selection.
    pub tournament_k: usize,
    /// Share of the population copied unchanged into the next generation.
    pub elite_ratio: f64,
    /// Share of the next generation replaced by fresh random tours.
    pub immigrant_ratio: f64,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            population_size: 80,
            generations: 200,
            mutation_rate: 0.18,
            tournament_k: 4,
            elite_ratio: 0.10,
            immigrant_ratio: 0.06,
        }
    }
}

/// Everything the fitness simulation reads about one courier's tour.
pub struct TourContext<'a> {
    /// The courier driving the tour.
    pub courier: &'a Courier,
    /// Orders in matrix order: position `i + 1` is `orders[i]`.
    pub orders: &'a [Order],
    /// Travel matrix over `[depot, orders...]`.
    pub matrix: &'a TravelMatrix,
    /// Recharge stations available for virtual detours.
    pub stations: &'a [RechargeStation],
    /// Scenario scaling the lateness penalty.
    pub scenario: Scenario,
}

/// Component breakdown of one simulated tour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FitnessParts {
    /// Kilometers including virtual recharge detours.
    pub distance_km: f64,
    /// Minutes from workday start to the last departure.
    pub duration_min: f64,
    /// Σ lateness · priority weight · scenario coefficient.
    pub lateness: f64,
    /// Recharge detour penalties, soft and hard.
    pub battery: f64,
    /// Workday overrun penalty.
    pub overtime: f64,
}

impl FitnessParts {
    /// The scalar the GA minimizes.
    pub fn total(&self) -> f64 {
        self.distance_km
            + 0.30 * self.duration_min
            + 1.20 * self.lateness
            + self.battery
            + 1.5 * self.overtime
    }
}

/// Simulates a tour and returns its fitness components.
///
/// The clock starts at the courier's workday start. Per segment: when the
/// remaining battery cannot cover the segment's minutes, a virtual detour
/// to the haversine-nearest station is inserted (soft penalty
/// `25 + 0.5·recharge_minutes`; hard penalty `5000 + 100·overshoot` when
/// even the detour exceeds the battery). Per order: wait when early, add
/// `lateness · priority_weight · scenario_coeff` when late, then add the
/// service time.
pub fn simulate_tour(ctx: &TourContext<'_>, route: &[usize]) -> FitnessParts {
    let battery_cfg = ctx.courier.battery();
    let speed = ctx.courier.speed_kmh().max(1.0);
    let work_start = ctx.courier.work_start() as f64;
    let work_end = ctx.courier.work_end() as f64;

    let mut parts = FitnessParts::default();
    let mut elapsed = work_start;
    let mut battery = battery_cfg.remaining_minutes();
    let mut position = ctx.courier.depot();

    for pair in route.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let seg_min = ctx.matrix.duration(from, to);

        if battery < seg_min {
            match nearest_station(ctx.stations, position) {
                Some(station) => {
                    let detour_km = haversine(position, station.location());
                    let detour_min = detour_km / speed * 60.0;
                    if detour_min > battery {
                        parts.battery += 5000.0 + 100.0 * (detour_min - battery);
                        battery = 0.0;
                    } else {
                        battery -= detour_min;
                    }
                    parts.distance_km += detour_km;
                    elapsed += detour_min;

                    let recharge_min = if battery_cfg.recharge_rate() > 0.0 {
                        (battery_cfg.max_minutes() - battery) / battery_cfg.recharge_rate()
                    } else {
                        0.0
                    };
                    parts.battery += 25.0 + 0.5 * recharge_min;
                    elapsed += recharge_min;
                    battery = battery_cfg.max_minutes();
                    position = station.location();
                }
                None => {
                    // Nowhere to plug in: price it like an unreachable detour.
                    parts.battery += 5000.0 + 100.0 * (seg_min - battery);
                    battery = battery_cfg.max_minutes();
                }
            }
        }

        parts.distance_km += ctx.matrix.distance(from, to);
        elapsed += seg_min;
        battery = (battery - seg_min).max(0.0);

        if to >= 1 {
            let order = &ctx.orders[to - 1];
            position = order.location();
            let window = order.window();
            elapsed += window.waiting_time(elapsed);
            let late = window.lateness(elapsed);
            if late > 0.0 {
                parts.lateness +=
                    late * order.priority().lateness_weight() * ctx.scenario.priority_coeff();
            }
            elapsed += order.service_minutes();
        }
    }

    parts.duration_min = elapsed - work_start;
    if elapsed > work_end {
        parts.overtime = 2000.0 + 25.0 * (elapsed - work_end);
    }
    parts
}

/// Fitness of a tour: lower is better.
pub fn tour_fitness(ctx: &TourContext<'_>, route: &[usize]) -> f64 {
    simulate_tour(ctx, route).total()
}

/// Runs the GA from a seed tour and returns the best tour seen with its
/// fitness. The seed enters the initial population verbatim, so the result
/// is never worse than the seed.
pub fn genetic_refine(
    ctx: &TourContext<'_>,
    seed_route: &[usize],
    params: &GaParams,
    rng: &mut StdRng,
) -> (Vec<usize>, f64) {
    let n = ctx.matrix.size().saturating_sub(1);
    if n < 2 {
        return (seed_route.to_vec(), tour_fitness(ctx, seed_route));
    }

    let pop_size = params.population_size.max(4);
    let mut population: Vec<Vec<usize>> = Vec::with_capacity(pop_size);
    population.push(seed_route.to_vec());
    while population.len() < pop_size {
        population.push(random_tour(n, rng));
    }

    let mut scored = score(ctx, population);
    let mut best = scored[0].clone();

    let elite_count = ((params.elite_ratio * pop_size as f64).round() as usize).clamp(1, pop_size);
    let immigrant_count = ((params.immigrant_ratio * pop_size as f64).round() as usize)
        .min(pop_size - elite_count);

    for _ in 0..params.generations {
        let mut next: Vec<Vec<usize>> =
            scored[..elite_count].iter().map(|(_, r)| r.clone()).collect();

        while next.len() < pop_size - immigrant_count {
            let p1 = tournament(&scored, params.tournament_k, rng);
            let p2 = tournament(&scored, params.tournament_k, rng);
            let (mut c1, mut c2) = order_crossover(p1, p2, rng);
            for child in [&mut c1, &mut c2] {
                if rng.random::<f64>() < params.mutation_rate {
                    mutate(child, rng);
                }
            }
            next.push(c1);
            if next.len() < pop_size - immigrant_count {
                next.push(c2);
            }
        }
        for _ in 0..immigrant_count {
            next.push(random_tour(n, rng));
        }

        scored = score(ctx, next);
        if scored[0].0 < best.0 {
            best = scored[0].clone();
        }
    }

    let (fitness, route) = best;
    (route, fitness)
}

/// Evaluates and sorts a population best-first.
fn score(ctx: &TourContext<'_>, population: Vec<Vec<usize>>) -> Vec<(f64, Vec<usize>)> {
    let mut scored: Vec<(f64, Vec<usize>)> = population
        .into_iter()
        .map(|route| (tour_fitness(ctx, &route), route))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored
}

/// Depot-rooted tour with a shuffled suffix.
fn random_tour(n: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut route: Vec<usize> = (0..=n).collect();
    for i in (2..route.len()).rev() {
        let j = rng.random_range(1..=i);
        route.swap(i, j);
    }
    route
}

/// K-way tournament: best of k uniform draws.
fn tournament<'a>(
    scored: &'a [(f64, Vec<usize>)],
    k: usize,
    rng: &mut StdRng,
) -> &'a [usize] {
    let mut winner = rng.random_range(0..scored.len());
    for _ in 1..k.max(1) {
        let challenger = rng.random_range(0..scored.len());
        // Lower index is better: the population is sorted best-first.
        if challenger < winner {
            winner = challenger;
        }
    }
    &scored[winner].1
}

/// Ordered crossover on the non-depot suffix, preserving the leading 0.
fn order_crossover(p1: &[usize], p2: &[usize], rng: &mut StdRng) -> (Vec<usize>, Vec<usize>) {
    let len = p1.len() - 1;
    let mut a = rng.random_range(0..len);
    let mut b = rng.random_range(0..len);
    if a > b {
        std::mem::swap(&mut a, &mut b);
    }
    (
        ox_child(&p1[1..], &p2[1..], a, b),
        ox_child(&p2[1..], &p1[1..], a, b),
    )
}

/// OX child: keep `donor[a..=b]` in place, fill the rest from `filler` in
/// order, skipping already-used stops.
fn ox_child(donor: &[usize], filler: &[usize], a: usize, b: usize) -> Vec<usize> {
    let len = donor.len();
    let max_stop = donor.iter().chain(filler).copied().max().unwrap_or(0);
    let mut used = vec![false; max_stop + 1];
    let mut suffix = vec![0usize; len];

    for i in a..=b {
        suffix[i] = donor[i];
        used[donor[i]] = true;
    }
    let mut fill = filler.iter().copied().filter(|&s| !used[s]);
    for slot in suffix.iter_mut().take(a) {
        *slot = fill.next().expect("filler covers remaining stops");
    }
    for slot in suffix.iter_mut().skip(b + 1) {
        *slot = fill.next().expect("filler covers remaining stops");
    }

    let mut child = Vec::with_capacity(len + 1);
    child.push(0);
    child.extend(suffix);
    child
}

/// Swap two suffix positions or reverse a suffix segment, equal odds.
fn mutate(route: &mut [usize], rng: &mut StdRng) {
    let len = route.len();
    if len < 3 {
        return;
    }
    let i = rng.random_range(1..len);
    let j = rng.random_range(1..len);
    if rng.random::<f64>() < 0.5 {
        route.swap(i, j);
    } else {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        route[lo..=hi].reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::models::{Battery, Priority};
    use crate::time::TimeWindow;
    use rand::SeedableRng;

    fn courier() -> Courier {
        Courier::new("L1", GeoPoint::new(48.8566, 2.3522), 100.0)
            .with_work_window("08:00", "18:00")
            .unwrap()
    }

    fn line_orders(n: usize) -> Vec<Order> {
        (0..n)
            .map(|i| {
                Order::new(
                    format!("C{i}"),
                    GeoPoint::new(48.86 + 0.01 * i as f64, 2.35),
                    5.0,
                    Priority::Standard,
                )
            })
            .collect()
    }

    fn matrix_for(courier: &Courier, orders: &[Order]) -> TravelMatrix {
        let mut points = vec![courier.depot()];
        points.extend(orders.iter().map(Order::location));
        TravelMatrix::from_speed(&points, courier.speed_kmh())
    }

    #[test]
    fn test_lateness_penalty_arithmetic() {
        // Arrival at 13:00 against a 09:00–12:00 window, priority 1:
        // 60 minutes late × weight 6 = 360 before the scenario multiplier.
        let courier = courier();
        let orders = vec![Order::new(
            "C1",
            GeoPoint::new(48.86, 2.35),
            5.0,
            Priority::Urgent,
        )
        .with_window(TimeWindow::from_hhmm("09:00", "12:00").unwrap())
        .with_service_minutes(0.0)];
        // Depot → order takes 300 minutes: 08:00 departure, 13:00 arrival.
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
        assert!((parts.lateness - 360.0).abs() < 1e-9, "got {}", parts.lateness);

        let peak = TourContext {
            scenario: Scenario::Peak,
            ..ctx
        };
        let parts = simulate_tour(&peak, &[0, 1]);
        assert!((parts.lateness - 360.0 * 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_waiting_when_early() {
        let courier = courier();
        let orders = vec![Order::new(
            "C1",
            GeoPoint::new(48.86, 2.35),
            5.0,
            Priority::Standard,
        )
        .with_window(TimeWindow::from_hhmm("10:00", "12:00").unwrap())
        .with_service_minutes(5.0)];
        // Ten-minute leg: arrival 08:10, wait until 10:00, serve 5 minutes.
        let matrix =
            TravelMatrix::from_parts(2, vec![0.0, 5.0, 5.0, 0.0], vec![0.0, 10.0, 10.0, 0.0])
                .unwrap();
        let ctx = TourContext {
            courier: &courier,
            orders: &orders,
            matrix: &matrix,
            stations: &[],
            scenario: Scenario::Normal,
        };
        let parts = simulate_tour(&ctx, &[0, 1]);
        assert_eq!(parts.lateness, 0.0);
        // 08:00 + 10 travel + 110 wait + 5 service = 125 minutes elapsed.
        assert!((parts.duration_min - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_overtime_penalty() {
        let courier = courier();
        let orders = line_orders(1);
        // A leg longer than the whole workday.
        let matrix =
            TravelMatrix::from_parts(2, vec![0.0, 400.0, 400.0, 0.0], vec![0.0, 700.0, 700.0, 0.0])
                .unwrap();
        let ctx = TourContext {
            courier: &courier,
            orders: &orders,
            matrix: &matrix,
            stations: &[],
            scenario: Scenario::Normal,
        };
        let parts = simulate_tour(&ctx, &[0, 1]);
        // 480 + 700 + 5 service = 1185 > 1080: overshoot 105.
        assert!((parts.overtime - (2000.0 + 25.0 * 105.0)).abs() < 1e-9);
    }

    #[test]
    fn test_battery_detour_inserted() {
        let courier = courier().with_battery(Battery::new(90.0, 10.0, 1.5));
        let orders = line_orders(1);
        let stations = vec![RechargeStation {
            id: "R1".into(),
            lat: 48.8566,
            lon: 2.3530,
            name: None,
            kind: None,
            power_kw: None,
            operator: None,
        }];
        // Segment needs 20 minutes of battery; only 10 remain.
        let matrix =
            TravelMatrix::from_parts(2, vec![0.0, 10.0, 10.0, 0.0], vec![0.0, 20.0, 20.0, 0.0])
                .unwrap();
        let ctx = TourContext {
            courier: &courier,
            orders: &orders,
            matrix: &matrix,
            stations: &stations,
            scenario: Scenario::Normal,
        };
        let parts = simulate_tour(&ctx, &[0, 1]);
        // Soft penalty only: 25 + 0.5·recharge, no 5000 hard penalty.
        assert!(parts.battery > 25.0 && parts.battery < 100.0, "got {}", parts.battery);
        // Detour distance joined the total.
        assert!(parts.distance_km > 10.0);
    }

    #[test]
    fn test_battery_hard_penalty_without_stations() {
        let courier = courier().with_battery(Battery::new(90.0, 5.0, 1.5));
        let orders = line_orders(1);
        let matrix =
            TravelMatrix::from_parts(2, vec![0.0, 10.0, 10.0, 0.0], vec![0.0, 20.0, 20.0, 0.0])
                .unwrap();
        let ctx = TourContext {
            courier: &courier,
            orders: &orders,
            matrix: &matrix,
            stations: &[],
            scenario: Scenario::Normal,
        };
        let parts = simulate_tour(&ctx, &[0, 1]);
        assert!(parts.battery >= 5000.0);
    }

    #[test]
    fn test_fitness_blend() {
        let parts = FitnessParts {
            distance_km: 10.0,
            duration_min: 100.0,
            lateness: 50.0,
            battery: 30.0,
            overtime: 0.0,
        };
        assert!((parts.total() - (10.0 + 30.0 + 60.0 + 30.0)).abs() < 1e-12);
    }

    #[test]
    fn test_ox_child_is_permutation() {
        let p1 = vec![0, 1, 2, 3, 4, 5];
        let p2 = vec![0, 5, 4, 3, 2, 1];
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let (c1, c2) = order_crossover(&p1, &p2, &mut rng);
            for child in [c1, c2] {
                assert_eq!(child[0], 0);
                let mut sorted = child.clone();
                sorted.sort_unstable();
                assert_eq!(sorted, vec![0, 1, 2, 3, 4, 5]);
            }
        }
    }

    #[test]
    fn test_mutate_preserves_stops() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut route = vec![0, 1, 2, 3, 4];
            mutate(&mut route, &mut rng);
            assert_eq!(route[0], 0);
            route.sort_unstable();
            assert_eq!(route, vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_refine_never_worse_than_seed() {
        let courier = courier();
        let orders = line_orders(6);
        let matrix = matrix_for(&courier, &orders);
        let ctx = TourContext {
            courier: &courier,
            orders: &orders,
            matrix: &matrix,
            stations: &[],
            scenario: Scenario::Normal,
        };
        let seed_route = vec![0, 4, 1, 6, 2, 5, 3];
        let seed_fitness = tour_fitness(&ctx, &seed_route);

        let params = GaParams {
            population_size: 30,
            generations: 40,
            ..GaParams::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let (best_route, best_fitness) = genetic_refine(&ctx, &seed_route, &params, &mut rng);
        assert!(best_fitness <= seed_fitness + 1e-9);
        assert_eq!(best_route[0], 0);
        let mut sorted = best_route.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..=6).collect::<Vec<_>>());
    }

    #[test]
    fn test_refine_deterministic_for_seed() {
        let courier = courier();
        let orders = line_orders(5);
        let matrix = matrix_for(&courier, &orders);
        let ctx = TourContext {
            courier: &courier,
            orders: &orders,
            matrix: &matrix,
            stations: &[],
            scenario: Scenario::Normal,
        };
        let seed_route: Vec<usize> = (0..=5).collect();
        let params = GaParams {
            population_size: 20,
            generations: 15,
            ..GaParams::default()
        };
        let a = genetic_refine(&ctx, &seed_route, &params, &mut StdRng::seed_from_u64(7));
        let b = genetic_refine(&ctx, &seed_route, &params, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_refine_single_order_passthrough() {
        let courier = courier();
        let orders = line_orders(1);
        let matrix = matrix_for(&courier, &orders);
        let ctx = TourContext {
            courier: &courier,
            orders: &orders,
            matrix: &matrix,
            stations: &[],
            scenario: Scenario::Normal,
        };
        let mut rng = StdRng::seed_from_u64(42);
        let (route, _) = genetic_refine(&ctx, &[0, 1], &GaParams::default(), &mut rng);
        assert_eq!(route, vec![0, 1]);
    }
}
