//! # Spatial Octree Index
//!
//! A point-keyed octree over a bounding volume. Each pipe network inserts
//! the midpoint of every segment with the segment record as payload; spatial
//! queries cull leaf octants against a bounding sphere and inspect the
//! surviving payloads.
//!
//! Octants own their children outright — a split replaces the leaf storage
//! with eight freshly allocated child regions, so there are no shared or
//! cyclic references between octants.

use serde::Serialize;
use tracing::warn;

use crate::geom::{BoundingBox, BoundingSphere, Cartesian3};

// ============================================================================
// Octant
// ============================================================================

/// Child region selection: one bit per axis, low half (0) or high half (1).
const SPLIT_PATTERN: [[u8; 3]; 8] = [
    [0, 0, 0],
    [0, 0, 1],
    [0, 1, 0],
    [0, 1, 1],
    [1, 0, 0],
    [1, 0, 1],
    [1, 1, 0],
    [1, 1, 1],
];

/// One region of the octree: a leaf holding (point, payload) pairs, or an
/// internal node holding exactly 8 children.
#[derive(Debug, Clone, Serialize)]
pub struct Octant<T> {
    min: Cartesian3,
    max: Cartesian3,
    children: Vec<Octant<T>>,
    points: Vec<Cartesian3>,
    data: Vec<T>,
}

impl<T> Octant<T> {
    fn new(min: Cartesian3, max: Cartesian3) -> Self {
        Self { min, max, children: Vec::new(), points: Vec::new(), data: Vec::new() }
    }

    pub fn min(&self) -> Cartesian3 {
        self.min
    }

    pub fn max(&self) -> Cartesian3 {
        self.max
    }

    pub fn center(&self) -> Cartesian3 {
        self.min.midpoint(self.max)
    }

    pub fn dimensions(&self) -> Cartesian3 {
        self.max - self.min
    }

    /// Stored points (leaves only; internal octants are always empty).
    pub fn points(&self) -> &[Cartesian3] {
        &self.points
    }

    /// Stored payloads, parallel to [`points`](Self::points).
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Squared distance from `point` to this region's box.
    pub fn distance_to_squared(&self, point: Cartesian3) -> f64 {
        let clamped = Cartesian3::clamp(point, self.min, self.max);
        (clamped - point).magnitude_squared()
    }

    /// Containment test expanded by `bias` on every face.
    pub fn contains(&self, point: Cartesian3, bias: f64) -> bool {
        point.x >= self.min.x - bias
            && point.y >= self.min.y - bias
            && point.z >= self.min.z - bias
            && point.x <= self.max.x + bias
            && point.y <= self.max.y + bias
            && point.z <= self.max.z + bias
    }

    /// Bisect this region into 8 children by the axis midpoints.
    fn split(&mut self) {
        let min = self.min;
        let max = self.max;
        let mid = self.center();

        self.children = SPLIT_PATTERN
            .iter()
            .map(|combination| {
                Octant::new(
                    Cartesian3::new(
                        if combination[0] == 0 { min.x } else { mid.x },
                        if combination[1] == 0 { min.y } else { mid.y },
                        if combination[2] == 0 { min.z } else { mid.z },
                    ),
                    Cartesian3::new(
                        if combination[0] == 0 { mid.x } else { max.x },
                        if combination[1] == 0 { mid.y } else { max.y },
                        if combination[2] == 0 { mid.z } else { max.z },
                    ),
                )
            })
            .collect();
    }

    /// Move stored points down into whichever child contains them.
    ///
    /// A point that fits no child (possible when `bias` let it into this
    /// region but no child claims it) is dropped, keeping the structural
    /// invariant that every stored point satisfies `contains()` on its
    /// owning region.
    fn redistribute(&mut self, bias: f64) {
        if self.children.is_empty() {
            return;
        }

        for (point, entry) in self.points.drain(..).zip(self.data.drain(..)) {
            match self.children.iter_mut().find(|c| c.contains(point, bias)) {
                Some(child) => {
                    child.points.push(point);
                    child.data.push(entry);
                }
                None => warn!(?point, "octree redistribute dropped point outside all children"),
            }
        }
    }
}

// ============================================================================
// PointOctree
// ============================================================================

/// Point-keyed octree with payloads of type `T`.
#[derive(Debug, Clone, Serialize)]
pub struct PointOctree<T> {
    root: Octant<T>,
    bias: f64,
    max_points: usize,
    max_depth: usize,
    point_count: usize,
}

impl<T> PointOctree<T> {
    /// Build an empty octree over `[min, max]`.
    ///
    /// `bias` expands every containment test to absorb floating-point
    /// boundary error; `max_points` is the leaf capacity before a split;
    /// `max_depth` caps subdivision (leaves at `max_depth` grow unbounded
    /// instead of splitting).
    pub fn new(
        min: Cartesian3,
        max: Cartesian3,
        bias: f64,
        max_points: usize,
        max_depth: usize,
    ) -> Self {
        Self {
            root: Octant::new(min, max),
            bias: bias.max(0.0),
            max_points: max_points.max(1),
            max_depth,
            point_count: 0,
        }
    }

    pub fn min(&self) -> Cartesian3 {
        self.root.min
    }

    pub fn max(&self) -> Cartesian3 {
        self.root.max
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Successful insertions so far.
    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Insert `(point, data)` into the leaf whose region contains `point`.
    ///
    /// If an equal point already exists in that leaf its payload is
    /// overwritten. A full leaf below `max_depth` splits into 8 children and
    /// redistributes before the insertion retries against the children.
    ///
    /// Returns `false` — the out-of-bounds condition — when `point` lies
    /// outside the root region even with `bias` tolerance. Never panics.
    pub fn put(&mut self, point: Cartesian3, data: T) -> bool {
        let mut carrier = Some(data);
        let (done, inserted) = Self::put_recursive(
            point,
            &mut carrier,
            &mut self.root,
            0,
            self.bias,
            self.max_points,
            self.max_depth,
        );
        if inserted {
            self.point_count += 1;
        }
        done
    }

    /// Returns (done, newly_inserted): `done` is false only when no octant
    /// on the descent path contained the point. The payload is taken from
    /// `data` exactly when the insertion lands.
    fn put_recursive(
        point: Cartesian3,
        data: &mut Option<T>,
        octant: &mut Octant<T>,
        depth: usize,
        bias: f64,
        max_points: usize,
        max_depth: usize,
    ) -> (bool, bool) {
        if !octant.contains(point, bias) {
            return (false, false);
        }

        if octant.is_leaf() {
            let payload = data.take().expect("octree payload consumed twice");

            if let Some(i) = octant.points.iter().position(|p| *p == point) {
                octant.data[i] = payload;
                return (true, false);
            }

            if octant.points.len() < max_points || depth == max_depth {
                octant.points.push(point);
                octant.data.push(payload);
                return (true, true);
            }

            // Full leaf below the depth cap: subdivide and retry against
            // the children.
            *data = Some(payload);
            octant.split();
            octant.redistribute(bias);
        }

        for child in &mut octant.children {
            let (done, inserted) = Self::put_recursive(
                point,
                data,
                child,
                depth + 1,
                bias,
                max_points,
                max_depth,
            );
            if done {
                return (true, inserted);
            }
        }

        (false, false)
    }

    /// Collect every **leaf** octant whose box overlaps `sphere`. Internal
    /// octants are a pure recursion boundary and never appear in the result.
    pub fn cull(&self, sphere: &BoundingSphere) -> Vec<&Octant<T>> {
        let mut result = Vec::new();
        Self::cull_recursive(&self.root, sphere, &mut result);
        result
    }

    fn cull_recursive<'a>(
        octant: &'a Octant<T>,
        sphere: &BoundingSphere,
        result: &mut Vec<&'a Octant<T>>,
    ) {
        let boundary = BoundingBox::new(octant.min, octant.max);
        if !boundary.intersects_sphere(sphere) {
            return;
        }

        if octant.is_leaf() {
            result.push(octant);
        } else {
            for child in &octant.children {
                Self::cull_recursive(child, sphere, result);
            }
        }
    }

    /// Total stored points across all leaves.
    pub fn count_points(&self) -> usize {
        fn count<T>(octant: &Octant<T>) -> usize {
            if octant.is_leaf() {
                octant.points.len()
            } else {
                octant.children.iter().map(count).sum()
            }
        }
        count(&self.root)
    }

    /// Depth of the deepest octant below the root.
    pub fn depth(&self) -> usize {
        fn depth_of<T>(octant: &Octant<T>) -> usize {
            octant
                .children
                .iter()
                .map(|c| 1 + depth_of(c))
                .max()
                .unwrap_or(0)
        }
        depth_of(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> PointOctree<u32> {
        PointOctree::new(
            Cartesian3::ZERO,
            Cartesian3::new(8.0, 8.0, 8.0),
            0.0,
            2,
            3,
        )
    }

    #[test]
    fn test_put_and_count() {
        let mut tree = small_tree();
        assert!(tree.put(Cartesian3::new(1.0, 1.0, 1.0), 1));
        assert!(tree.put(Cartesian3::new(7.0, 7.0, 7.0), 2));
        assert_eq!(tree.point_count(), 2);
        assert_eq!(tree.count_points(), 2);
    }

    #[test]
    fn test_put_out_of_bounds() {
        let mut tree = small_tree();
        assert!(!tree.put(Cartesian3::new(-1.0, 0.0, 0.0), 1));
        assert!(!tree.put(Cartesian3::new(9.0, 9.0, 9.0), 2));
        assert_eq!(tree.point_count(), 0);
    }

    #[test]
    fn test_equal_point_overwrites_payload() {
        let mut tree = small_tree();
        let p = Cartesian3::new(4.0, 4.0, 4.0);
        assert!(tree.put(p, 1));
        assert!(tree.put(p, 99));
        assert_eq!(tree.point_count(), 1);

        let sphere = BoundingSphere::new(p, 0.5);
        let leaves = tree.cull(&sphere);
        let all: Vec<u32> = leaves.iter().flat_map(|l| l.data().iter().copied()).collect();
        assert_eq!(all, vec![99]);
    }

    #[test]
    fn test_split_keeps_all_points() {
        let mut tree = small_tree();
        // max_points = 2, so the third insert forces a split.
        for (i, p) in [
            Cartesian3::new(1.0, 1.0, 1.0),
            Cartesian3::new(2.0, 2.0, 2.0),
            Cartesian3::new(6.0, 6.0, 6.0),
            Cartesian3::new(7.0, 1.0, 1.0),
        ]
        .into_iter()
        .enumerate()
        {
            assert!(tree.put(p, i as u32));
        }
        assert_eq!(tree.count_points(), 4);
        assert!(tree.depth() >= 1);
        assert!(tree.depth() <= 3);
    }

    #[test]
    fn test_depth_capped() {
        let mut tree = PointOctree::new(
            Cartesian3::ZERO,
            Cartesian3::new(8.0, 8.0, 8.0),
            0.0,
            1,
            2,
        );
        // Identical region pressure: many points in one corner would split
        // forever without the depth cap.
        for i in 0..20 {
            let p = Cartesian3::new(0.1 + i as f64 * 1e-3, 0.1, 0.1);
            assert!(tree.put(p, i));
        }
        assert!(tree.depth() <= 2);
        assert_eq!(tree.count_points(), 20);
    }

    #[test]
    fn test_cull_returns_only_overlapping_leaves() {
        let mut tree = small_tree();
        tree.put(Cartesian3::new(1.0, 1.0, 1.0), 1);
        tree.put(Cartesian3::new(7.0, 7.0, 7.0), 2);
        tree.put(Cartesian3::new(1.5, 1.0, 1.0), 3);

        let sphere = BoundingSphere::new(Cartesian3::new(1.0, 1.0, 1.0), 1.0);
        let leaves = tree.cull(&sphere);
        assert!(!leaves.is_empty());
        for leaf in &leaves {
            assert!(leaf.is_leaf());
            let boundary = BoundingBox::new(leaf.min(), leaf.max());
            assert!(boundary.intersects_sphere(&sphere));
        }

        let found: Vec<u32> = leaves.iter().flat_map(|l| l.data().iter().copied()).collect();
        assert!(found.contains(&1));
        assert!(found.contains(&3));
        assert!(!found.contains(&2));
    }
}
