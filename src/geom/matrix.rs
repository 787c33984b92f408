//! Column-major 4×4 matrix.

use serde::{Deserialize, Serialize};

use super::Cartesian3;

/// A 4×4 matrix stored column-major: element (row r, column c) lives at
/// index `c * 4 + r`, matching GPU upload order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix4(pub [f64; 16]);

impl Default for Matrix4 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Matrix4 {
    pub const ZERO: Self = Self([0.0; 16]);

    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// View matrix from a camera frame.
    ///
    /// The third row is the negated direction: the view frame is
    /// right-handed with the camera looking down −Z. The translation column
    /// moves the camera position to the origin.
    pub fn view(
        position: Cartesian3,
        direction: Cartesian3,
        up: Cartesian3,
        right: Cartesian3,
    ) -> Self {
        let mut m = [0.0; 16];

        m[0] = right.x;
        m[1] = up.x;
        m[2] = -direction.x;
        m[3] = 0.0;
        m[4] = right.y;
        m[5] = up.y;
        m[6] = -direction.y;
        m[7] = 0.0;
        m[8] = right.z;
        m[9] = up.z;
        m[10] = -direction.z;
        m[11] = 0.0;
        m[12] = -right.dot(position);
        m[13] = -up.dot(position);
        m[14] = direction.dot(position);
        m[15] = 1.0;

        Self(m)
    }

    /// Off-center orthographic projection mapping the box
    /// `[left,right] × [bottom,top] × [near,far]` into clip space.
    pub fn orthographic_off_center(
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
        near: f64,
        far: f64,
    ) -> Self {
        let mut a = 1.0 / (right - left);
        let mut b = 1.0 / (top - bottom);
        let mut c = 1.0 / (far - near);

        let tx = -(right + left) * a;
        let ty = -(top + bottom) * b;
        let tz = -(far + near) * c;

        a *= 2.0;
        b *= 2.0;
        c *= 2.0;

        let mut m = [0.0; 16];
        m[0] = a;
        m[5] = b;
        m[10] = c;
        m[12] = tx;
        m[13] = ty;
        m[14] = tz;
        m[15] = 1.0;

        Self(m)
    }

    /// Affine transform of a point (w = 1, projection row ignored).
    pub fn multiply_by_point(&self, p: Cartesian3) -> Cartesian3 {
        let m = &self.0;
        Cartesian3 {
            x: m[0] * p.x + m[4] * p.y + m[8] * p.z + m[12],
            y: m[1] * p.x + m[5] * p.y + m[9] * p.z + m[13],
            z: m[2] * p.x + m[6] * p.y + m[10] * p.z + m[14],
        }
    }

    /// Full 4×4 product `self × right`.
    pub fn multiply(&self, right: &Self) -> Self {
        let a = &self.0;
        let b = &right.0;
        let mut m = [0.0; 16];

        for col in 0..4 {
            for row in 0..4 {
                m[col * 4 + row] = a[row] * b[col * 4]
                    + a[4 + row] * b[col * 4 + 1]
                    + a[8 + row] * b[col * 4 + 2]
                    + a[12 + row] * b[col * 4 + 3];
            }
        }

        Self(m)
    }
}
