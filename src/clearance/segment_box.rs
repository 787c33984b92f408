//! Segment-vs-axis-aligned-box clipping.
//!
//! The box is taken in centered form (extents only). The infinite line
//! through the segment is clipped against the six slab planes, then the
//! surviving parameter interval is intersected with the segment's own
//! interval `[-half_length, +half_length]`.

use serde::{Deserialize, Serialize};

use crate::geom::Cartesian3;

/// Result of clipping a segment against a centered box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxClip {
    pub intersect: bool,
    /// Line parameters of the surviving interval: empty, one (tangent
    /// point), or two (entry/exit).
    pub parameters: Vec<f64>,
    /// The intersection points, `origin + t · direction` for each parameter.
    pub points: Vec<Cartesian3>,
}

/// One Liang–Barsky clip step: narrow `[t0, t1]` against the half-space
/// `numer ≤ denom · t`. Returns false when the interval empties out.
fn clip(denom: f64, numer: f64, t0: &mut f64, t1: &mut f64) -> bool {
    if denom > 0.0 {
        if numer > denom * *t1 {
            return false;
        }
        if numer > denom * *t0 {
            *t0 = numer / denom;
        }
        true
    } else if denom < 0.0 {
        if numer > denom * *t0 {
            return false;
        }
        if numer > denom * *t1 {
            *t1 = numer / denom;
        }
        true
    } else {
        // Line runs parallel to this slab: inside iff the offset is on the
        // correct side.
        numer <= 0.0
    }
}

/// Clip the infinite line `origin + t · direction` against the six faces of
/// a centered box. Returns the surviving `[t0, t1]`, or `None`.
fn clip_line(
    origin: Cartesian3,
    direction: Cartesian3,
    box_extents: Cartesian3,
) -> Option<(f64, f64)> {
    let mut t0 = -f64::MAX;
    let mut t1 = f64::MAX;

    let ok = clip(direction.x, -origin.x - box_extents.x, &mut t0, &mut t1)
        && clip(-direction.x, origin.x - box_extents.x, &mut t0, &mut t1)
        && clip(direction.y, -origin.y - box_extents.y, &mut t0, &mut t1)
        && clip(-direction.y, origin.y - box_extents.y, &mut t0, &mut t1)
        && clip(direction.z, -origin.z - box_extents.z, &mut t0, &mut t1)
        && clip(-direction.z, origin.z - box_extents.z, &mut t0, &mut t1);

    ok.then_some((t0, t1))
}

/// Overlap of two closed intervals. Returns 0, 1 (touching), or 2
/// endpoints of the shared sub-interval.
fn overlap_interval(a: [f64; 2], b: [f64; 2]) -> (usize, [f64; 2]) {
    if a[1] < b[0] || a[0] > b[1] {
        (0, [f64::MAX, -f64::MAX])
    } else if a[1] > b[0] {
        if a[0] < b[1] {
            let lo = a[0].max(b[0]);
            let hi = a[1].min(b[1]);
            if lo == hi {
                (1, [lo, hi])
            } else {
                (2, [lo, hi])
            }
        } else {
            // a[0] == b[1]
            (1, [a[0], a[0]])
        }
    } else {
        // a[1] == b[0]
        (1, [a[1], a[1]])
    }
}

/// Clip the segment centered at `origin` with unit `direction` and
/// parameter interval `[-half_length, +half_length]` against a box of the
/// given `box_extents` centered at the origin of the same frame.
pub fn clip_segment_to_box(
    origin: Cartesian3,
    direction: Cartesian3,
    half_length: f64,
    box_extents: Cartesian3,
) -> BoxClip {
    let mut result = BoxClip::default();

    let Some((t0, t1)) = clip_line(origin, direction, box_extents) else {
        return result;
    };

    let line_interval = if t1 > t0 { [t0, t1] } else { [t0, t0] };
    let (count, overlap) = overlap_interval(line_interval, [-half_length, half_length]);
    if count == 0 {
        return result;
    }

    result.intersect = true;
    result.parameters = overlap[..count].to_vec();
    result.points = result
        .parameters
        .iter()
        .map(|&t| origin + direction.multiply_by_scalar(t))
        .collect();

    result
}

/// Half-extent containment test: is `p` strictly inside the centered box
/// of half-width `width`, half-height `height`, half-depth `depth`?
pub fn is_in_box(p: Cartesian3, width: f64, height: f64, depth: f64) -> bool {
    p.x > -width && p.x < width && p.y > -height && p.y < height && p.z > -depth && p.z < depth
}
