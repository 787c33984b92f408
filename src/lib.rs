//! # pipenet — Underground Utility-Pipe Network Analysis
//!
//! An in-memory analysis engine for underground pipe networks: given raw
//! network data (junction nodes and pipe segments with 3-D coordinates),
//! it answers spatial and topological queries — minimum clearance between
//! two pipes, pairwise collision candidates, cross-sectional and
//! longitudinal profile cuts, upstream/downstream traversal from a pipe
//! point, and shortest-path connectivity between two pipes.
//!
//! ## Design Principles
//!
//! 1. **No global state**: all analysis runs against an [`EngineState`]
//!    handle; a reload builds a fresh state and atomically swaps it in
//! 2. **Clean DTOs**: records, traversal results, and query results are
//!    plain serializable structs that cross every boundary
//! 3. **Generic containers**: the octree and graph carry an arbitrary
//!    payload type; the data model fixes it to pipe records
//! 4. **I/O stays outside**: the crate consumes already-parsed records
//!    and returns serializable results; HTTP routing and file reading are
//!    the caller's concern
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pipenet::{Engine, model::DataSourceRecord};
//!
//! # fn example(sources: Vec<DataSourceRecord>) -> pipenet::Result<()> {
//! let engine = Engine::new();
//! engine.reload(sources)?;
//!
//! let state = engine.state();
//! let down = state.downstream("PLPT_2")?;
//! for node in &down.explored_nodes {
//!     println!("downstream of PLPT_2: {node}");
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod geom;
pub mod clearance;
pub mod octree;
pub mod graph;
pub mod model;
pub mod engine;

// ============================================================================
// Re-exports: Geometry kernel
// ============================================================================

pub use geom::{
    BoundingBox, BoundingSphere, Camera, Cartesian3, Frustum, Matrix4, Plane,
};

// ============================================================================
// Re-exports: Algorithms and containers
// ============================================================================

pub use clearance::{closest_points, SegmentClosestPoints};
pub use octree::PointOctree;
pub use graph::{PipeGraph, ShortestPath, Traversal};

// ============================================================================
// Re-exports: Model and engine
// ============================================================================

pub use model::{DataSource, Network, PipeEdge, PipeNode};
pub use engine::{
    BurstReport, ClearanceReport, CollisionHit, Connectivity, CrossSectionHit, Engine,
    EngineState, Profile, ProfileEntry,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
