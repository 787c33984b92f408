//! # Geometry Kernel
//!
//! The 3-D vector/matrix foundation everything else builds on.
//! These types are pure data — no I/O, no state, no locking.

pub mod cartesian;
pub mod matrix;
pub mod plane;
pub mod bounds;
pub mod camera;

pub use cartesian::Cartesian3;
pub use matrix::Matrix4;
pub use plane::Plane;
pub use bounds::{BoundingBox, BoundingSphere};
pub use camera::{Camera, Frustum};
