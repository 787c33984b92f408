//! End-to-end tests for the spatial octree index.
//!
//! Exercises insertion with dynamic splitting, sphere culling, and the
//! structural invariants: stored count never exceeds successful puts, leaf
//! depth never exceeds `max_depth`, and `cull` returns exactly the leaves
//! overlapping the query sphere.

use pipenet::{BoundingBox, BoundingSphere, Cartesian3, PointOctree};
use proptest::prelude::*;

fn unit_cube_tree(max_points: usize, max_depth: usize) -> PointOctree<usize> {
    PointOctree::new(
        Cartesian3::ZERO,
        Cartesian3::new(100.0, 100.0, 100.0),
        0.0,
        max_points,
        max_depth,
    )
}

// ============================================================================
// 1. Insertion and splitting
// ============================================================================

#[test]
fn test_many_inserts_split_and_survive() {
    let mut tree = unit_cube_tree(4, 8);
    // Deterministic scatter: 37, 59, 83 are coprime to 100, so all 100
    // triples are distinct.
    for i in 0..100 {
        let p = Cartesian3::new(
            (i * 37 % 100) as f64 + 0.5,
            (i * 59 % 100) as f64 + 0.25,
            (i * 83 % 100) as f64 + 0.75,
        );
        assert!(tree.put(p, i));
    }

    assert_eq!(tree.point_count(), 100);
    assert_eq!(tree.count_points(), 100);
    assert!(tree.depth() <= 8, "leaf depth {} exceeds the cap", tree.depth());
}

#[test]
fn test_out_of_bounds_put_is_rejected() {
    let mut tree = unit_cube_tree(4, 8);
    assert!(!tree.put(Cartesian3::new(-1.0, 50.0, 50.0), 0));
    assert!(!tree.put(Cartesian3::new(50.0, 101.0, 50.0), 1));
    assert_eq!(tree.point_count(), 0);
}

#[test]
fn test_bias_admits_boundary_points() {
    let mut tree = PointOctree::new(
        Cartesian3::ZERO,
        Cartesian3::new(10.0, 10.0, 10.0),
        0.5,
        4,
        4,
    );
    // Just outside the region but within bias tolerance.
    assert!(tree.put(Cartesian3::new(10.3, 5.0, 5.0), 0));
    assert!(!tree.put(Cartesian3::new(11.0, 5.0, 5.0), 1));
}

// ============================================================================
// 2. Sphere culling
// ============================================================================

#[test]
fn test_cull_finds_payloads_near_query() {
    let mut tree = unit_cube_tree(2, 6);
    let near = [
        Cartesian3::new(10.0, 10.0, 10.0),
        Cartesian3::new(11.0, 10.0, 10.0),
        Cartesian3::new(10.0, 11.5, 10.0),
    ];
    let far = Cartesian3::new(90.0, 90.0, 90.0);

    for (i, p) in near.iter().enumerate() {
        assert!(tree.put(*p, i));
    }
    assert!(tree.put(far, 99));

    let sphere = BoundingSphere::new(Cartesian3::new(10.0, 10.0, 10.0), 3.0);
    let found: Vec<usize> = tree
        .cull(&sphere)
        .iter()
        .flat_map(|leaf| leaf.data().iter().copied())
        .collect();

    for i in 0..near.len() {
        assert!(found.contains(&i), "payload {i} near the query center must be found");
    }
    assert!(!found.contains(&99), "payload far from the query must be culled away");
}

#[test]
fn test_cull_returns_only_overlapping_leaves() {
    let mut tree = unit_cube_tree(1, 6);
    for i in 0..50 {
        let p = Cartesian3::new(
            (i * 13 % 100) as f64,
            (i * 29 % 100) as f64,
            (i * 47 % 100) as f64,
        );
        tree.put(p, i);
    }

    let sphere = BoundingSphere::new(Cartesian3::new(25.0, 25.0, 25.0), 20.0);
    for leaf in tree.cull(&sphere) {
        assert!(leaf.is_leaf());
        let boundary = BoundingBox::new(leaf.min(), leaf.max());
        assert!(
            boundary.intersects_sphere(&sphere),
            "culled leaf {:?}..{:?} does not overlap the sphere",
            leaf.min(),
            leaf.max()
        );
    }
}

// ============================================================================
// 3. Property: structural invariants hold for arbitrary batches
// ============================================================================

proptest! {
    #[test]
    fn prop_count_and_depth_invariants(
        points in prop::collection::vec((0.0f64..100.0, 0.0f64..100.0, 0.0f64..100.0), 1..200)
    ) {
        let mut tree = unit_cube_tree(4, 5);
        let mut accepted = 0usize;
        for (i, (x, y, z)) in points.iter().enumerate() {
            if tree.put(Cartesian3::new(*x, *y, *z), i) {
                accepted += 1;
            }
        }

        // Equal points overwrite, so the stored count never exceeds the
        // number of accepted puts.
        prop_assert!(tree.point_count() <= accepted);
        prop_assert_eq!(tree.count_points(), tree.point_count());
        prop_assert!(tree.depth() <= 5);
    }

    #[test]
    fn prop_culled_payloads_lie_near_their_leaf(
        points in prop::collection::vec((0.0f64..100.0, 0.0f64..100.0, 0.0f64..100.0), 1..100),
        center in (10.0f64..90.0, 10.0f64..90.0, 10.0f64..90.0),
        radius in 1.0f64..40.0,
    ) {
        let mut tree = unit_cube_tree(4, 5);
        for (i, (x, y, z)) in points.iter().enumerate() {
            tree.put(Cartesian3::new(*x, *y, *z), i);
        }

        let sphere = BoundingSphere::new(
            Cartesian3::new(center.0, center.1, center.2),
            radius,
        );
        for leaf in tree.cull(&sphere) {
            // Every returned point lies within its own leaf's region.
            for p in leaf.points() {
                prop_assert!(leaf.contains(*p, tree.bias()));
            }
        }
    }
}
