//! Tour refinement pipeline for a single courier.
//!
//! Four stages, each consuming the previous stage's route:
//! nearest-neighbor seed → 2-opt → 3-opt → constraint-aware genetic
//! refinement. Every stage's output is retained for the diagnostic
//! meta-solutions block; the genetic result is the canonical tour.

mod genetic;
mod nearest;
mod three_opt;
mod two_opt;

pub use genetic::{
    genetic_refine, simulate_tour, tour_fitness, FitnessParts, GaParams, TourContext,
};
pub use nearest::nearest_neighbor_tour;
pub use three_opt::three_opt_improve;
pub use two_opt::two_opt_improve;

use rand::rngs::StdRng;

use crate::matrix::TravelMatrix;

/// Open-path distance of a route: consecutive legs, no return to depot.
pub fn path_distance(route: &[usize], matrix: &TravelMatrix) -> f64 {
    route
        .windows(2)
        .map(|pair| matrix.distance(pair[0], pair[1]))
        .sum()
}

/// One stage's output: the route and its open-path distance.
#[derive(Debug, Clone, PartialEq)]
pub struct StageResult {
    /// Depot-rooted permutation.
    pub route: Vec<usize>,
    /// Open-path distance in kilometers.
    pub distance: f64,
}

/// All four stage outputs of one refinement run.
#[derive(Debug, Clone, PartialEq)]
pub struct TourPipeline {
    /// Nearest-neighbor seed.
    pub nearest: StageResult,
    /// After 2-opt descent.
    pub two_opt: StageResult,
    /// After 3-opt descent.
    pub three_opt: StageResult,
    /// Genetic result, the canonical tour.
    pub genetic: StageResult,
    /// Fitness of the genetic result (distance plus penalty terms).
    pub genetic_fitness: f64,
}

impl TourPipeline {
    /// The tour the executor should drive.
    pub fn final_route(&self) -> &[usize] {
        &self.genetic.route
    }

    /// Stage outputs labeled for the diagnostics block.
    pub fn stages(&self) -> [(&'static str, &StageResult); 4] {
        [
            ("nearest", &self.nearest),
            ("2opt", &self.two_opt),
            ("3opt", &self.three_opt),
            ("genetic", &self.genetic),
        ]
    }
}

/// Runs the whole pipeline over the context's travel matrix.
///
/// The local-search stages are monotone in open-path distance; the genetic
/// stage optimizes the constraint-aware fitness instead, seeded with the
/// 3-opt result so it never loses ground on that metric.
pub fn refine_tour(ctx: &TourContext<'_>, params: &GaParams, rng: &mut StdRng) -> TourPipeline {
    let seed = nearest_neighbor_tour(ctx.matrix);
    let nearest = StageResult {
        distance: path_distance(&seed, ctx.matrix),
        route: seed,
    };

    let (route, distance) = two_opt_improve(&nearest.route, ctx.matrix);
    let two_opt = StageResult { route, distance };

    let (route, distance) = three_opt_improve(&two_opt.route, ctx.matrix);
    let three_opt = StageResult { route, distance };

    let (route, genetic_fitness) = genetic_refine(ctx, &three_opt.route, params, rng);
    let genetic = StageResult {
        distance: path_distance(&route, ctx.matrix),
        route,
    };

    TourPipeline {
        nearest,
        two_opt,
        three_opt,
        genetic,
        genetic_fitness,
    }
}
