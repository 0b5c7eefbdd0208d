//! Intra-route 3-opt improvement.
//!
//! # Algorithm
//!
//! Cuts the route into four segments `A|B|C|D` at positions (i, j, k) and
//! evaluates the seven non-identity reconnections: B and/or C reversed,
//! and B/C swapped with either reversed. The first reconnection that
//! shortens the open path beyond the improvement threshold is accepted and
//! the scan restarts; the search stops when a full scan accepts nothing.
//!
//! # Complexity
//!
//! O(n³) triples per scan, each rescored in O(n).
//!
//! # Reference
//!
//! Lin, S. (1965). "Computer Solutions of the Traveling Salesman Problem",
//! *Bell System Technical Journal* 44(10), 2245-2269.

use super::path_distance;
use super::two_opt::MIN_IMPROVEMENT;
use crate::matrix::TravelMatrix;

/// Applies 3-opt to a depot-rooted route (position 0 stays fixed).
///
/// Returns the improved route and its open-path distance.
///
/// # Examples
///
/// ```
/// use lastmile::matrix::TravelMatrix;
/// use lastmile::tsp::{path_distance, three_opt_improve};
/// use lastmile::geo::GeoPoint;
///
/// let points: Vec<GeoPoint> = (0..6)
///     .map(|i| GeoPoint::new(48.85 + 0.01 * i as f64, 2.35))
///     .collect();
/// let m = TravelMatrix::from_speed(&points, 30.0);
/// let scrambled = [0, 3, 1, 5, 2, 4];
/// let (_, dist) = three_opt_improve(&scrambled, &m);
/// assert!(dist <= path_distance(&scrambled, &m) + 1e-10);
/// ```
pub fn three_opt_improve(route: &[usize], matrix: &TravelMatrix) -> (Vec<usize>, f64) {
    let mut best = route.to_vec();
    let mut best_dist = path_distance(&best, matrix);
    let len = best.len();
    // Three cuts with two-element middle segments need six positions.
    if len < 6 {
        return (best, best_dist);
    }

    let mut improved = true;
    while improved {
        improved = false;
        'scan: for i in 1..len - 4 {
            for j in i + 2..len - 2 {
                for k in j + 2..len {
                    for candidate in reconnections(&best, i, j, k) {
                        let dist = path_distance(&candidate, matrix);
                        if dist < best_dist - MIN_IMPROVEMENT {
                            best = candidate;
                            best_dist = dist;
                            improved = true;
                            break 'scan;
                        }
                    }
                }
            }
        }
    }

    (best, best_dist)
}

/// The seven non-identity reconnections of `A|B|C|D` cut at (i, j, k).
fn reconnections(route: &[usize], i: usize, j: usize, k: usize) -> [Vec<usize>; 7] {
    let a = &route[..i];
    let b = &route[i..j];
    let c = &route[j..k];
    let d = &route[k..];

    let build = |second: &dyn Fn(&mut Vec<usize>), third: &dyn Fn(&mut Vec<usize>)| {
        let mut out = Vec::with_capacity(route.len());
        out.extend_from_slice(a);
        second(&mut out);
        third(&mut out);
        out.extend_from_slice(d);
        out
    };

    let fwd_b = |out: &mut Vec<usize>| out.extend_from_slice(b);
    let rev_b = |out: &mut Vec<usize>| out.extend(b.iter().rev());
    let fwd_c = |out: &mut Vec<usize>| out.extend_from_slice(c);
    let rev_c = |out: &mut Vec<usize>| out.extend(c.iter().rev());

    [
        build(&rev_b, &fwd_c), // A B' C D
        build(&fwd_b, &rev_c), // A B C' D
        build(&rev_b, &rev_c), // A B' C' D
        build(&fwd_c, &fwd_b), // A C B D
        build(&rev_c, &fwd_b), // A C' B D
        build(&fwd_c, &rev_b), // A C B' D
        build(&rev_c, &rev_b), // A C' B' D
    ]
}
