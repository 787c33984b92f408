//! Infinite plane in Hessian normal form.

use serde::{Deserialize, Serialize};

use super::Cartesian3;

/// Segments closer to parallel than this never intersect the plane.
const PARALLEL_EPSILON: f64 = 1e-6;

/// A plane `normal · p + distance = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal.
    pub normal: Cartesian3,
    /// Signed distance from the origin along the normal.
    pub distance: f64,
}

impl Plane {
    pub const fn new(normal: Cartesian3, distance: f64) -> Self {
        Self { normal, distance }
    }

    /// Plane through `point` with the given unit `normal`.
    pub fn from_point_normal(point: Cartesian3, normal: Cartesian3) -> Self {
        Self { normal, distance: -normal.dot(point) }
    }

    /// Intersection of the segment `p0 → p1` with the plane.
    ///
    /// `None` when the segment is parallel to the plane (within tolerance)
    /// or the solved parameter falls outside `[0, 1]`.
    pub fn intersect_segment(&self, p0: Cartesian3, p1: Cartesian3) -> Option<Cartesian3> {
        let difference = p1 - p0;
        let n_dot_diff = self.normal.dot(difference);

        if n_dot_diff.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = -(self.distance + self.normal.dot(p0)) / n_dot_diff;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        Some(p0 + difference.multiply_by_scalar(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_crosses_plane() {
        // Plane z = 0, segment from below to above: midpoint intersection.
        let plane = Plane::new(Cartesian3::new(0.0, 0.0, 1.0), 0.0);
        let hit = plane
            .intersect_segment(
                Cartesian3::new(0.0, 0.0, -1.0),
                Cartesian3::new(0.0, 0.0, 1.0),
            )
            .unwrap();
        assert_eq!(hit, Cartesian3::ZERO);
    }

    #[test]
    fn test_segment_on_one_side() {
        let plane = Plane::new(Cartesian3::new(0.0, 0.0, 1.0), 0.0);
        let hit = plane.intersect_segment(
            Cartesian3::new(0.0, 0.0, 1.0),
            Cartesian3::new(0.0, 0.0, 3.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_parallel_segment() {
        let plane = Plane::new(Cartesian3::new(0.0, 0.0, 1.0), 0.0);
        let hit = plane.intersect_segment(
            Cartesian3::new(0.0, 0.0, 1.0),
            Cartesian3::new(5.0, 5.0, 1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_from_point_normal() {
        let normal = Cartesian3::new(0.0, 0.0, 1.0);
        let plane = Plane::from_point_normal(Cartesian3::new(0.0, 0.0, 4.0), normal);
        assert_eq!(plane.distance, -4.0);
    }
}
