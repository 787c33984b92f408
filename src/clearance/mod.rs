//! # Clearance Algorithms
//!
//! The computational-geometry routines that refine octree-culled candidate
//! sets: closest points between two 3-D segments, and segment-vs-box
//! clipping in a profile frame. Pure functions over the geometry kernel.

pub mod segment_distance;
pub mod segment_box;

pub use segment_distance::{closest_points, SegmentClosestPoints};
pub use segment_box::{clip_segment_to_box, is_in_box, BoxClip};
