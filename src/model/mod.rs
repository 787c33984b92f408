//! # Pipe Network Data Model
//!
//! Concrete record types for pipes and pipe points, the serde shape of the
//! ingest interface, and the per-network containers (octree + graph) built
//! from them. These types cross every boundary: loader ↔ engine ↔ caller.
//!
//! Design rule: records keep their required fields as typed struct members
//! and carry everything else in an open `extra` side-map, so attribute-rich
//! source data survives the round trip without the engine caring.

pub mod record;
pub mod network;
pub mod source;

pub use record::{
    AttrMap, DataSourceRecord, GeoPoint, NetworkRecord, PipeEdge, PipeNetworksDoc, PipeNode,
};
pub use network::Network;
pub use source::DataSource;
