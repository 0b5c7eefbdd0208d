//! Geographic clustering: Lloyd's k-means over (lat, lon) with the
//! haversine metric.
//!
//! # Algorithm
//!
//! Centroids are seeded from k distinct input points drawn uniformly at
//! random (caller-supplied RNG, so runs are reproducible). Each iteration
//! assigns every point to its nearest centroid — ties resolve to the lowest
//! centroid index — then recomputes each centroid as the arithmetic mean of
//! its members' coordinates. A cluster that loses all members re-seeds from
//! a random input point. Iteration stops after `max_iters` passes.

use rand::Rng;

use crate::geo::GeoPoint;

/// Partitions `points` into at most `k` geographic clusters.
///
/// Returns the non-empty clusters as lists of indices into `points`
/// (ordering between clusters carries no meaning).
///
/// Edge cases: `k == 0` or empty input yields no clusters; when there are
/// no more points than clusters, every point gets its own cluster.
///
/// # Examples
///
/// ```
/// use lastmile::cluster::kmeans;
/// use lastmile::geo::GeoPoint;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let points = vec![
///     GeoPoint::new(48.85, 2.35),
///     GeoPoint::new(48.86, 2.36),
///     GeoPoint::new(31.63, -7.99),
///     GeoPoint::new(31.64, -7.98),
/// ];
/// let mut rng = StdRng::seed_from_u64(42);
/// let clusters = kmeans(&points, 2, 10, &mut rng);
/// assert_eq!(clusters.len(), 2);
/// let total: usize = clusters.iter().map(Vec::len).sum();
/// assert_eq!(total, 4);
/// ```
pub fn kmeans<R: Rng>(
    points: &[GeoPoint],
    k: usize,
    max_iters: usize,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    let n = points.len();
    if k == 0 || n == 0 {
        return Vec::new();
    }
    if n <= k {
        return (0..n).map(|i| vec![i]).collect();
    }

    // Seed centroids from k distinct points (partial Fisher-Yates).
    let mut indices: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = rng.random_range(i..n);
        indices.swap(i, j);
    }
    let mut centroids: Vec<GeoPoint> = indices[..k].iter().map(|&i| points[i]).collect();

    for _ in 0..max_iters {
        let clusters = assign_to_centroids(points, &centroids);

        for (centroid, members) in centroids.iter_mut().zip(clusters.iter()) {
            if members.is_empty() {
                *centroid = points[rng.random_range(0..n)];
            } else {
                let lat = members.iter().map(|&i| points[i].lat).sum::<f64>() / members.len() as f64;
                let lon = members.iter().map(|&i| points[i].lon).sum::<f64>() / members.len() as f64;
                *centroid = GeoPoint::new(lat, lon);
            }
        }
    }

    assign_to_centroids(points, &centroids)
        .into_iter()
        .filter(|c| !c.is_empty())
        .collect()
}

/// Arithmetic mean of a cluster's coordinates.
///
/// Returns `None` for an empty cluster.
pub fn centroid_of(points: &[GeoPoint], members: &[usize]) -> Option<GeoPoint> {
    if members.is_empty() {
        return None;
    }
    let lat = members.iter().map(|&i| points[i].lat).sum::<f64>() / members.len() as f64;
    let lon = members.iter().map(|&i| points[i].lon).sum::<f64>() / members.len() as f64;
    Some(GeoPoint::new(lat, lon))
}

fn assign_to_centroids(points: &[GeoPoint], centroids: &[GeoPoint]) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); centroids.len()];
    for (i, point) in points.iter().enumerate() {
        let mut best = 0;
        let mut best_d = point.distance_km(centroids[0]);
        for (c, centroid) in centroids.iter().enumerate().skip(1) {
            let d = point.distance_km(*centroid);
            // Strict comparison keeps the lowest index on ties.
            if d < best_d {
                best = c;
                best_d = d;
            }
        }
        clusters[best].push(i);
    }
    clusters
}
