//! Intra-route 2-opt improvement.
//!
//! # Algorithm
//!
//! For every pair of positions (i, j) with `1 ≤ i`, `j − i > 1`, and
//! `j ≤ len − 2`, reverse the segment `[i, j)` and keep the result when it
//! shortens the open path (depot fixed at position 0, no return leg) by
//! more than the improvement threshold. The scan restarts after every
//! accepted move and stops when a full pass finds nothing.
//!
//! # Complexity
//!
//! O(n²) candidate pairs per pass with an O(n) rescore each; convergence
//! is bounded in practice by the few dozen stops a courier carries.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use super::path_distance;
use crate::matrix::TravelMatrix;

/// Strict-improvement threshold guarding against float churn.
pub(super) const MIN_IMPROVEMENT: f64 = 1e-6;

/// Applies 2-opt to a depot-rooted route (position 0 stays fixed).
///
/// Returns the improved route and its open-path distance.
///
/// # Examples
///
/// ```
/// use lastmile::matrix::TravelMatrix;
/// use lastmile::tsp::{path_distance, two_opt_improve};
///
/// let m = TravelMatrix::from_parts(
///     5,
///     vec![
///         0.0, 1.0, 2.0, 3.0, 4.0,
///         1.0, 0.0, 1.0, 2.0, 3.0,
///         2.0, 1.0, 0.0, 1.0, 2.0,
///         3.0, 2.0, 1.0, 0.0, 1.0,
///         4.0, 3.0, 2.0, 1.0, 0.0,
///     ],
///     vec![0.0; 25],
/// ).unwrap();
/// let (route, dist) = two_opt_improve(&[0, 2, 1, 3, 4], &m);
/// assert_eq!(route, vec![0, 1, 2, 3, 4]);
/// assert!(dist < path_distance(&[0, 2, 1, 3, 4], &m));
/// ```
pub fn two_opt_improve(route: &[usize], matrix: &TravelMatrix) -> (Vec<usize>, f64) {
    let mut best = route.to_vec();
    let mut best_dist = path_distance(&best, matrix);
    let len = best.len();
    // The smallest route with a valid (i, j) pair has five positions.
    if len < 5 {
        return (best, best_dist);
    }

    let mut improved = true;
    while improved {
        improved = false;
        'scan: for i in 1..len - 2 {
            for j in i + 2..len - 1 {
                let mut candidate = best.clone();
                candidate[i..j].reverse();
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

    (best, best_dist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    fn line_matrix(n: usize) -> TravelMatrix {
        let points: Vec<GeoPoint> = (0..n)
            .map(|i| GeoPoint::new(48.85 + 0.01 * i as f64, 2.35))
            .collect();
        TravelMatrix::from_speed(&points, 30.0)
    }

    #[test]
    fn test_already_optimal_unchanged() {
        let m = line_matrix(5);
        let (route, dist) = two_opt_improve(&[0, 1, 2, 3, 4], &m);
        assert_eq!(route, vec![0, 1, 2, 3, 4]);
        assert!((dist - path_distance(&[0, 1, 2, 3, 4], &m)).abs() < 1e-10);
    }

    #[test]
    fn test_unscrambles_line() {
        let m = line_matrix(5);
        let (route, dist) = two_opt_improve(&[0, 2, 1, 3, 4], &m);
        assert_eq!(route, vec![0, 1, 2, 3, 4]);
        assert!(dist < path_distance(&[0, 2, 1, 3, 4], &m));
    }

    #[test]
    fn test_never_worsens() {
        let points: Vec<GeoPoint> = (0..8)
            .map(|i| GeoPoint::new(48.8 + 0.017 * (i * 3 % 7) as f64, 2.3 + 0.011 * i as f64))
            .collect();
        let m = TravelMatrix::from_speed(&points, 30.0);
        let initial = vec![0, 5, 2, 7, 1, 4, 6, 3];
        let before = path_distance(&initial, &m);
        let (_, after) = two_opt_improve(&initial, &m);
        assert!(after <= before + 1e-10);
    }

    #[test]
    fn test_depot_stays_first() {
        let m = line_matrix(6);
        let (route, _) = two_opt_improve(&[0, 3, 1, 4, 2, 5], &m);
        assert_eq!(route[0], 0);
    }

    #[test]
    fn test_short_routes_pass_through() {
        let m = line_matrix(5);
        let (route, dist) = two_opt_improve(&[0], &m);
        assert_eq!(route, vec![0]);
        assert_eq!(dist, 0.0);

        let (route, _) = two_opt_improve(&[0, 2], &m);
        assert_eq!(route, vec![0, 2]);

        let (route, _) = two_opt_improve(&[0, 2, 1, 3], &m);
        assert_eq!(route, vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_preserves_all_stops() {
        let points: Vec<GeoPoint> = (0..6)
            .map(|i| GeoPoint::new(48.8 + 0.01 * (i * 2 % 5) as f64, 2.3 + 0.02 * i as f64))
            .collect();
        let m = TravelMatrix::from_speed(&points, 30.0);
        let (mut route, _) = two_opt_improve(&[0, 4, 2, 5, 1, 3], &m);
        route.sort_unstable();
        assert_eq!(route, (0..6).collect::<Vec<_>>());
    }
}
