//! Orthographic camera used to set up profile-cut frames.
//!
//! The longitudinal profile query places a camera along the cut line and
//! uses its view matrix as the local frame of the profile box. Only the
//! orthographic path is needed; there is no perspective frustum.

use serde::{Deserialize, Serialize};

use super::{Cartesian3, Matrix4};

/// Orthographic view volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for Frustum {
    fn default() -> Self {
        Self {
            left: -1.0,
            right: 1.0,
            top: 1.0,
            bottom: -1.0,
            near: 1.0,
            far: 50_000_000.0,
        }
    }
}

impl Frustum {
    pub fn projection_matrix(&self) -> Matrix4 {
        Matrix4::orthographic_off_center(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}

/// A camera frame: position plus an orthonormal basis.
///
/// Callers are responsible for handing in an orthonormal
/// (direction, up, right) triple; the camera does not re-orthogonalize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Cartesian3,
    pub direction: Cartesian3,
    pub up: Cartesian3,
    pub right: Cartesian3,
    pub frustum: Frustum,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Cartesian3::ZERO,
            direction: Cartesian3::ZERO,
            up: Cartesian3::ZERO,
            right: Cartesian3::ZERO,
            frustum: Frustum::default(),
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Matrix4 {
        Matrix4::view(self.position, self.direction, self.up, self.right)
    }

    pub fn projection_matrix(&self) -> Matrix4 {
        self.frustum.projection_matrix()
    }
}
