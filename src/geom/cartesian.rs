//! 3-D Cartesian point/vector type.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// WGS84 ellipsoid radii, squared (6378137² on every axis).
const WGS84_RADII_SQUARED: Cartesian3 = Cartesian3 {
    x: 6378137.0 * 6378137.0,
    y: 6378137.0 * 6378137.0,
    z: 6378137.0 * 6378137.0,
};

/// A point or direction in a 3-D Cartesian frame.
///
/// Immutable value type. Equality is exact component equality — two points
/// converted from identical geodetic inputs compare equal bit-for-bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cartesian3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Cartesian3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn multiply_by_scalar(&self, scalar: f64) -> Self {
        Self { x: self.x * scalar, y: self.y * scalar, z: self.z * scalar }
    }

    pub fn divide_by_scalar(&self, scalar: f64) -> Self {
        Self { x: self.x / scalar, y: self.y / scalar, z: self.z / scalar }
    }

    /// Component-wise product.
    pub fn multiply_components(&self, other: Self) -> Self {
        Self { x: self.x * other.x, y: self.y * other.y, z: self.z * other.z }
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Unit vector in the same direction.
    ///
    /// Divides by the magnitude. A zero vector produces NaN components;
    /// callers must guard — this is the one unchecked numerical edge case
    /// of the kernel and is deliberately not special-cased.
    pub fn normalize(&self) -> Self {
        self.divide_by_scalar(self.magnitude())
    }

    /// Midpoint of the segment between `self` and `other`.
    pub fn midpoint(&self, other: Self) -> Self {
        (*self + other).divide_by_scalar(2.0)
    }

    /// Clamp each component into `[min, max]`.
    ///
    /// Total for any bounds ordering: an inverted region (`min > max`, the
    /// shape of an index built over zero points) clamps to `max` then `min`
    /// where `f64::clamp` would panic.
    pub fn clamp(point: Self, min: Self, max: Self) -> Self {
        Self {
            x: point.x.min(max.x).max(min.x),
            y: point.y.min(max.y).max(min.y),
            z: point.z.min(max.z).max(min.z),
        }
    }

    /// Geodetic (radians, meters) to Cartesian on the WGS84 ellipsoid.
    ///
    /// Standard surface-normal / curvature-radius construction: the surface
    /// normal is scaled by the ellipsoid radii², normalized by the curvature
    /// term, then offset along the normal by `height`.
    pub fn from_radians(longitude: f64, latitude: f64, height: f64) -> Self {
        let cos_latitude = latitude.cos();
        let normal = Self {
            x: cos_latitude * longitude.cos(),
            y: cos_latitude * longitude.sin(),
            z: latitude.sin(),
        }
        .normalize();

        let k = WGS84_RADII_SQUARED.multiply_components(normal);
        let gamma = normal.dot(k).sqrt();

        k.divide_by_scalar(gamma) + normal.multiply_by_scalar(height)
    }

    /// Geodetic (degrees, meters) to Cartesian on the WGS84 ellipsoid.
    pub fn from_degrees(longitude: f64, latitude: f64, height: f64) -> Self {
        Self::from_radians(longitude.to_radians(), latitude.to_radians(), height)
    }
}

impl Add for Cartesian3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self { x: self.x + other.x, y: self.y + other.y, z: self.z + other.z }
    }
}

impl Sub for Cartesian3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self { x: self.x - other.x, y: self.y - other.y, z: self.z - other.z }
    }
}

impl Mul<f64> for Cartesian3 {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        self.multiply_by_scalar(scalar)
    }
}

impl Neg for Cartesian3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}
