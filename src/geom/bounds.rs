//! Bounding volumes: axis-aligned box and sphere.

use serde::{Deserialize, Serialize};

use super::Cartesian3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Cartesian3,
    pub max: Cartesian3,
}

impl BoundingBox {
    pub const fn new(min: Cartesian3, max: Cartesian3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Cartesian3 {
        self.min.midpoint(self.max)
    }

    pub fn dimensions(&self) -> Cartesian3 {
        self.max - self.min
    }

    /// Sphere overlap test via the closest point in the box to the sphere
    /// center. Touching exactly at the radius counts as disjoint.
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        let closest = Cartesian3::clamp(sphere.center, self.min, self.max);
        (closest - sphere.center).magnitude() < sphere.radius
    }
}

/// Bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: Cartesian3,
    pub radius: f64,
}

impl BoundingSphere {
    pub const fn new(center: Cartesian3, radius: f64) -> Self {
        Self { center, radius }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(Cartesian3::ZERO, Cartesian3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_sphere_inside_box() {
        let sphere = BoundingSphere::new(Cartesian3::new(0.5, 0.5, 0.5), 0.1);
        assert!(unit_box().intersects_sphere(&sphere));
    }

    #[test]
    fn test_sphere_overlapping_face() {
        let sphere = BoundingSphere::new(Cartesian3::new(1.5, 0.5, 0.5), 0.6);
        assert!(unit_box().intersects_sphere(&sphere));
    }

    #[test]
    fn test_sphere_disjoint() {
        let sphere = BoundingSphere::new(Cartesian3::new(3.0, 3.0, 3.0), 1.0);
        assert!(!unit_box().intersects_sphere(&sphere));
    }

    #[test]
    fn test_sphere_touching_counts_as_disjoint() {
        let sphere = BoundingSphere::new(Cartesian3::new(2.0, 0.5, 0.5), 1.0);
        assert!(!unit_box().intersects_sphere(&sphere));
    }

    #[test]
    fn test_inverted_region_is_disjoint() {
        // An index built over zero points carries min > max; the overlap
        // test must reject it instead of panicking.
        let empty = BoundingBox::new(
            Cartesian3::new(f64::MAX, f64::MAX, f64::MAX),
            Cartesian3::new(-f64::MAX, -f64::MAX, -f64::MAX),
        );
        let sphere = BoundingSphere::new(Cartesian3::ZERO, 1e9);
        assert!(!empty.intersects_sphere(&sphere));
    }
}
