//! Pipe and pipe-point records, and the serde shape of the ingest data.
//!
//! Field renames follow the source data spelling (`SmID`, `PLPT0`, …) so a
//! loader can deserialize the persisted JSON directly. Parsing files is the
//! caller's job; the shape is defined here so every loader targets the same
//! records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geom::Cartesian3;
use crate::graph::{EdgeInfo, VertexInfo};

/// Open side-map for attributes the engine has no schema for.
pub type AttrMap = HashMap<String, serde_json::Value>;

/// One endpoint coordinate in geodetic degrees: `x` = longitude,
/// `y` = latitude, `z` = height in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GeoPoint {
    /// Convert to Cartesian on the WGS84 ellipsoid.
    pub fn to_cartesian(self) -> Cartesian3 {
        Cartesian3::from_degrees(self.x, self.y, self.z)
    }
}

fn default_points() -> [GeoPoint; 2] {
    [GeoPoint::default(), GeoPoint::default()]
}

/// A pipe segment: one directed edge of the network.
///
/// Immutable once loaded. `sm_id` is unique within one network of one data
/// source; `pl_id` is unique across the whole merged system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipeEdge {
    /// Numeric id within the owning network.
    #[serde(rename = "SmID", default)]
    pub sm_id: i64,
    /// Cross-network unique pipe id.
    #[serde(rename = "PLID", default)]
    pub pl_id: String,
    /// Pipe-point identifier of the from-endpoint.
    #[serde(rename = "PLPT0", default)]
    pub plpt0: String,
    /// Pipe-point identifier of the to-endpoint.
    #[serde(rename = "PLPT1", default)]
    pub plpt1: String,
    /// Raw node reference of the from-endpoint (`SmID` of a [`PipeNode`]).
    #[serde(rename = "SMFNode", default)]
    pub sm_from_node: i64,
    /// Raw node reference of the to-endpoint.
    #[serde(rename = "SMTNode", default)]
    pub sm_to_node: i64,
    /// Pipe length, used as the edge weight in shortest-path search.
    #[serde(rename = "SMLength", default)]
    pub length: f64,
    /// Endpoint coordinates in geodetic degrees.
    #[serde(rename = "Points", default = "default_points")]
    pub points: [GeoPoint; 2],
    /// Everything else the source carried.
    #[serde(flatten)]
    pub extra: AttrMap,
}

impl PipeEdge {
    /// Both endpoints converted to Cartesian.
    pub fn endpoints(&self) -> (Cartesian3, Cartesian3) {
        (self.points[0].to_cartesian(), self.points[1].to_cartesian())
    }

    /// Midpoint of the Cartesian segment — the octree key for this pipe.
    pub fn center(&self) -> Cartesian3 {
        let (p0, p1) = self.endpoints();
        p0.midpoint(p1)
    }
}

impl EdgeInfo for PipeEdge {
    fn pipe_id(&self) -> &str {
        &self.pl_id
    }

    fn weight(&self) -> f64 {
        self.length
    }
}

/// A pipe point: a junction or endpoint of the network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipeNode {
    /// Numeric id within the owning network.
    #[serde(rename = "SmID", default)]
    pub sm_id: i64,
    /// Network type tag carried by the source data.
    #[serde(rename = "Type", default)]
    pub node_type: String,
    /// Everything else the source carried.
    #[serde(flatten)]
    pub extra: AttrMap,
}

impl VertexInfo for PipeNode {
    /// Traversal results carry node copies stamped with the pipe-point
    /// identifier they were reached through, under the `PLPTNO` key.
    fn stamp_plpt(&mut self, plpt: &str) {
        self.extra
            .insert("PLPTNO".to_string(), serde_json::Value::String(plpt.to_string()));
    }
}

/// One named network inside a data source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkRecord {
    #[serde(rename = "Edges", default)]
    pub edges: Vec<PipeEdge>,
    #[serde(rename = "Nodes", default)]
    pub nodes: Vec<PipeNode>,
}

/// The top-level shape of one source file: named networks
/// (water-supply, rain-supply, sewer, …) under a `PipeNetWorks` key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipeNetworksDoc {
    #[serde(rename = "PipeNetWorks", default)]
    pub networks: HashMap<String, NetworkRecord>,
}

/// One fully parsed data source, tagged with its batch identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSourceRecord {
    /// Batch identifier this source was ingested under.
    pub batch: String,
    /// Display name (the original uses the file path).
    pub name: String,
    /// Named networks belonging to this source.
    pub networks: HashMap<String, NetworkRecord>,
}

impl DataSourceRecord {
    pub fn new(batch: impl Into<String>, name: impl Into<String>, doc: PipeNetworksDoc) -> Self {
        Self { batch: batch.into(), name: name.into(), networks: doc.networks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_edge_deserializes_source_spelling() {
        let edge: PipeEdge = serde_json::from_str(
            r#"{
                "SmID": 7,
                "PLID": "PL_7",
                "PLPT0": "PLPT_1",
                "PLPT1": "PLPT_2",
                "SMFNode": 1,
                "SMTNode": 2,
                "SMLength": 12.5,
                "Points": [
                    {"x": 116.0, "y": 39.0, "z": -3.0},
                    {"x": 116.001, "y": 39.0, "z": -3.5}
                ],
                "Material": "PVC"
            }"#,
        )
        .unwrap();

        assert_eq!(edge.sm_id, 7);
        assert_eq!(edge.pl_id, "PL_7");
        assert_eq!(edge.plpt0, "PLPT_1");
        assert_eq!(edge.length, 12.5);
        assert_eq!(edge.extra["Material"], serde_json::json!("PVC"));
    }

    #[test]
    fn test_edge_without_points_defaults() {
        // Topology-only fixtures omit coordinates entirely.
        let edge: PipeEdge = serde_json::from_str(
            r#"{"SmID": 1, "PLPT0": "a", "PLPT1": "b", "SMFNode": 1, "SMTNode": 2}"#,
        )
        .unwrap();
        assert_eq!(edge.points, [GeoPoint::default(), GeoPoint::default()]);
        assert_eq!(edge.length, 0.0);
    }

    #[test]
    fn test_doc_shape() {
        let doc: PipeNetworksDoc = serde_json::from_str(
            r#"{"PipeNetWorks": {"WS_NETWORK": {"Edges": [], "Nodes": []}}}"#,
        )
        .unwrap();
        assert!(doc.networks.contains_key("WS_NETWORK"));
    }

    #[test]
    fn test_stamp_plpt() {
        let mut node = PipeNode { sm_id: 3, ..PipeNode::default() };
        node.stamp_plpt("PLPT_9");
        assert_eq!(node.extra["PLPTNO"], serde_json::json!("PLPT_9"));
    }
}
