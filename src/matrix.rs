//! Dense travel matrix pairing distance and duration.

use crate::geo::GeoPoint;

/// A dense n×n travel matrix stored in row-major order, carrying both
/// kilometers and minutes for every ordered pair of locations.
///
/// Built either from an oracle table response or from haversine distances at
/// a constant speed (the estimate fallback and the test path).
///
/// # Examples
///
/// ```
/// use lastmile::geo::GeoPoint;
/// use lastmile::matrix::TravelMatrix;
///
/// let points = vec![
///     GeoPoint::new(48.8566, 2.3522),
///     GeoPoint::new(48.86, 2.35),
/// ];
/// let m = TravelMatrix::from_speed(&points, 30.0);
/// assert_eq!(m.size(), 2);
/// assert!(m.distance(0, 1) > 0.0);
/// assert!((m.duration(0, 1) - m.distance(0, 1) / 30.0 * 60.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct TravelMatrix {
    distances: Vec<f64>,
    durations: Vec<f64>,
    size: usize,
}

impl TravelMatrix {
    /// Creates a matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            distances: vec![0.0; size * size],
            durations: vec![0.0; size * size],
            size,
        }
    }

    /// Creates a matrix from explicit n×n grids of kilometers and minutes.
    ///
    /// Returns `None` if either grid length doesn't match `size * size`.
    pub fn from_parts(size: usize, distances: Vec<f64>, durations: Vec<f64>) -> Option<Self> {
        if distances.len() != size * size || durations.len() != size * size {
            return None;
        }
        Some(Self {
            distances,
            durations,
            size,
        })
    }

    /// Computes a symmetric matrix from haversine distances at a constant
    /// average speed in km/h.
    pub fn from_speed(points: &[GeoPoint], speed_kmh: f64) -> Self {
        let n = points.len();
        let mut m = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].distance_km(points[j]);
                let t = if speed_kmh > 0.0 {
                    d / speed_kmh * 60.0
                } else {
                    0.0
                };
                m.set(i, j, d, t);
                m.set(j, i, d, t);
            }
        }
        m
    }

    /// Distance in kilometers from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances[from * self.size + to]
    }

    /// Travel time in minutes from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn duration(&self, from: usize, to: usize) -> f64 {
        self.durations[from * self.size + to]
    }

    /// Sets both channels for the ordered pair `(from, to)`.
    pub fn set(&mut self, from: usize, to: usize, distance_km: f64, duration_min: f64) {
        self.distances[from * self.size + to] = distance_km;
        self.durations[from * self.size + to] = duration_min;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(48.8566, 2.3522),
            GeoPoint::new(48.86, 2.35),
            GeoPoint::new(48.87, 2.36),
        ]
    }

    #[test]
    fn test_from_speed() {
        let m = TravelMatrix::from_speed(&sample_points(), 30.0);
        assert_eq!(m.size(), 3);
        assert!(m.distance(0, 1) > 0.0);
        assert_eq!(m.distance(0, 0), 0.0);
        // Symmetric by construction.
        assert_eq!(m.distance(0, 2), m.distance(2, 0));
        assert_eq!(m.duration(1, 2), m.duration(2, 1));
    }

    #[test]
    fn test_from_speed_zero_speed() {
        let m = TravelMatrix::from_speed(&sample_points(), 0.0);
        assert!(m.distance(0, 1) > 0.0);
        assert_eq!(m.duration(0, 1), 0.0);
    }

    #[test]
    fn test_from_parts() {
        let m = TravelMatrix::from_parts(2, vec![0.0, 5.0, 5.0, 0.0], vec![0.0, 10.0, 10.0, 0.0])
            .expect("valid");
        assert_eq!(m.distance(0, 1), 5.0);
        assert_eq!(m.duration(1, 0), 10.0);
    }

    #[test]
    fn test_from_parts_invalid() {
        assert!(TravelMatrix::from_parts(2, vec![0.0; 3], vec![0.0; 4]).is_none());
        assert!(TravelMatrix::from_parts(2, vec![0.0; 4], vec![0.0; 3]).is_none());
    }

    #[test]
    fn test_set_get() {
        let mut m = TravelMatrix::new(3);
        m.set(0, 2, 7.5, 15.0);
        assert_eq!(m.distance(0, 2), 7.5);
        assert_eq!(m.duration(0, 2), 15.0);
        assert_eq!(m.distance(2, 0), 0.0);
    }
}
