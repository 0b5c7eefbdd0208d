//! Nearest-neighbor tour construction.
//!
//! Seeds the refinement pipeline: starting at the depot (index 0), always
//! travel to the closest unvisited location. Ties resolve to the lowest
//! index. Solution quality is a rough baseline; the later stages repair it.

use crate::matrix::TravelMatrix;

/// Builds a tour over all matrix locations, starting at index 0.
///
/// # Examples
///
/// ```
/// use lastmile::matrix::TravelMatrix;
/// use lastmile::tsp::nearest_neighbor_tour;
///
/// let m = TravelMatrix::from_parts(
///     3,
///     vec![0.0, 2.0, 1.0, 2.0, 0.0, 3.0, 1.0, 3.0, 0.0],
///     vec![0.0; 9],
/// ).unwrap();
/// assert_eq!(nearest_neighbor_tour(&m), vec![0, 2, 1]);
/// ```
pub fn nearest_neighbor_tour(matrix: &TravelMatrix) -> Vec<usize> {
    let n = matrix.size();
    if n == 0 {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    visited[0] = true;
    let mut route = Vec::with_capacity(n);
    route.push(0);

    while route.len() < n {
        let last = *route.last().expect("route starts non-empty");
        let mut best: Option<(usize, f64)> = None;
        for j in 0..n {
            if visited[j] {
                continue;
            }
            let d = matrix.distance(last, j);
            // Strict comparison keeps the lowest index on ties.
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        let (next, _) = best.expect("unvisited location exists");
        visited[next] = true;
        route.push(next);
    }

    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    #[test]
    fn test_empty_and_singleton() {
        assert!(nearest_neighbor_tour(&TravelMatrix::new(0)).is_empty());
        assert_eq!(nearest_neighbor_tour(&TravelMatrix::new(1)), vec![0]);
    }

    #[test]
    fn test_follows_chain() {
        // Points on a line: greedy from the start walks the line.
        let points = vec![
            GeoPoint::new(48.85, 2.35),
            GeoPoint::new(48.86, 2.35),
            GeoPoint::new(48.87, 2.35),
            GeoPoint::new(48.88, 2.35),
        ];
        let m = TravelMatrix::from_speed(&points, 30.0);
        assert_eq!(nearest_neighbor_tour(&m), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_tie_breaks_to_lowest_index() {
        // Equidistant candidates from the depot.
        let m = TravelMatrix::from_parts(
            3,
            vec![0.0, 1.0, 1.0, 1.0, 0.0, 5.0, 1.0, 5.0, 0.0],
            vec![0.0; 9],
        )
        .unwrap();
        assert_eq!(nearest_neighbor_tour(&m), vec![0, 1, 2]);
    }

    #[test]
    fn test_is_permutation() {
        let points: Vec<GeoPoint> = (0..7)
            .map(|i| GeoPoint::new(48.8 + 0.013 * (i * i % 5) as f64, 2.3 + 0.01 * i as f64))
            .collect();
        let m = TravelMatrix::from_speed(&points, 30.0);
        let mut route = nearest_neighbor_tour(&m);
        assert_eq!(route[0], 0);
        route.sort_unstable();
        assert_eq!(route, (0..7).collect::<Vec<_>>());
    }
}
