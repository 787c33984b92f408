//! Minimum distance between two 3-D segments.

use serde::{Deserialize, Serialize};

use crate::geom::Cartesian3;

/// Denominators below this are treated as parallel/degenerate.
const SMALL_NUM: f64 = 1e-7;

/// Result of a segment-segment closest-point query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentClosestPoints {
    /// Parameter of the closest point on P, in `[0, 1]`.
    pub s: f64,
    /// Parameter of the closest point on Q, in `[0, 1]`.
    pub t: f64,
    /// Euclidean distance between the two closest points.
    pub distance: f64,
    /// The closest point pair: `closest[0]` on P, `closest[1]` on Q.
    pub closest: [Cartesian3; 2],
}

/// Closest points between segments `p0 → p1` and `q0 → q1`.
///
/// Solves the 2×2 normal-equations system for the minimizing parameters
/// (sc, tc), clamping both into `[0, 1]` via the standard case analysis.
/// Near-parallel segments (denominator below `1e-7`) fix `sc = 0` and fall
/// back to projecting `p0` onto Q.
pub fn closest_points(
    p0: Cartesian3,
    p1: Cartesian3,
    q0: Cartesian3,
    q1: Cartesian3,
) -> SegmentClosestPoints {
    let u = p1 - p0;
    let v = q1 - q0;
    let w = p0 - q0;

    let a = u.dot(u);
    let b = u.dot(v);
    let c = v.dot(v);
    let d = u.dot(w);
    let e = v.dot(w);
    let big_d = a * c - b * b;

    let mut sn;
    let mut sd = big_d;
    let mut tn;
    let mut td = big_d;

    if big_d < SMALL_NUM {
        // Segments are (nearly) parallel: pin s to p0, project onto Q.
        sn = 0.0;
        sd = 1.0;
        tn = e;
        td = c;
    } else {
        sn = b * e - c * d;
        tn = a * e - b * d;
        if sn < 0.0 {
            sn = 0.0;
            tn = e;
            td = c;
        } else if sn > sd {
            sn = sd;
            tn = e + b;
            td = c;
        }
    }

    if tn < 0.0 {
        tn = 0.0;
        if -d < 0.0 {
            sn = 0.0;
        } else if -d > a {
            sn = sd;
        } else {
            sn = -d;
            sd = a;
        }
    } else if tn > td {
        tn = td;
        if (-d + b) < 0.0 {
            sn = 0.0;
        } else if (-d + b) > a {
            sn = sd;
        } else {
            sn = -d + b;
            sd = a;
        }
    }

    let sc = if sn.abs() < SMALL_NUM { 0.0 } else { sn / sd };
    let tc = if tn.abs() < SMALL_NUM { 0.0 } else { tn / td };

    let closest = [
        p0.multiply_by_scalar(1.0 - sc) + p1.multiply_by_scalar(sc),
        q0.multiply_by_scalar(1.0 - tc) + q1.multiply_by_scalar(tc),
    ];
    let distance = (closest[0] - closest[1]).magnitude();

    SegmentClosestPoints { s: sc, t: tc, distance, closest }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_unit_segments_offset_one() {
        let r = closest_points(
            Cartesian3::new(0.0, 0.0, 0.0),
            Cartesian3::new(1.0, 0.0, 0.0),
            Cartesian3::new(0.0, 0.0, 1.0),
            Cartesian3::new(1.0, 0.0, 1.0),
        );
        assert!((r.distance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_intersecting_segments() {
        let r = closest_points(
            Cartesian3::new(-1.0, 0.0, 0.0),
            Cartesian3::new(1.0, 0.0, 0.0),
            Cartesian3::new(0.0, -1.0, 0.0),
            Cartesian3::new(0.0, 1.0, 0.0),
        );
        assert!(r.distance < 1e-12);
        assert!((0.0..=1.0).contains(&r.s));
        assert!((0.0..=1.0).contains(&r.t));
        assert!((r.s - 0.5).abs() < 1e-12);
        assert!((r.t - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_closest_at_endpoints() {
        // Collinear, disjoint: closest pair is (p1, q0).
        let r = closest_points(
            Cartesian3::new(0.0, 0.0, 0.0),
            Cartesian3::new(1.0, 0.0, 0.0),
            Cartesian3::new(3.0, 0.0, 0.0),
            Cartesian3::new(4.0, 0.0, 0.0),
        );
        assert!((r.distance - 2.0).abs() < 1e-12);
        assert_eq!(r.closest[0], Cartesian3::new(1.0, 0.0, 0.0));
        assert_eq!(r.closest[1], Cartesian3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_skew_segments() {
        // Perpendicular skew lines one unit apart.
        let r = closest_points(
            Cartesian3::new(-1.0, 0.0, 0.0),
            Cartesian3::new(1.0, 0.0, 0.0),
            Cartesian3::new(0.0, -1.0, 1.0),
            Cartesian3::new(0.0, 1.0, 1.0),
        );
        assert!((r.distance - 1.0).abs() < 1e-12);
    }
}
