//! One pipe network: records plus the spatial index and graph built on them.

use hashbrown::HashMap;
use tracing::{info, warn};

use crate::geom::Cartesian3;
use crate::graph::PipeGraph;
use crate::octree::PointOctree;

use super::{NetworkRecord, PipeEdge, PipeNode};

/// Octree tuning: containment tolerance.
const OCTREE_BIAS: f64 = 0.0;
/// Octree tuning: leaf capacity before a split.
const OCTREE_MAX_POINTS: usize = 100;
/// Octree tuning: subdivision depth cap.
const OCTREE_MAX_DEPTH: usize = 8;

/// A named network (water-supply, rain-supply, sewer, …) owning its edge
/// and node records, one octree over the edge midpoints, and one
/// connectivity graph over the pipe-point identifiers.
///
/// Built once per load cycle and replaced wholesale on reload.
#[derive(Debug, Clone)]
pub struct Network {
    pub name: String,
    pub edges: Vec<PipeEdge>,
    pub nodes: Vec<PipeNode>,
    /// Node lookup by per-network numeric id.
    nodes_by_sm_id: HashMap<i64, usize>,
    /// Edge midpoints → edge index into `edges`.
    octree: PointOctree<usize>,
    /// Per-network connectivity graph.
    graph: PipeGraph<PipeNode, PipeEdge>,
}

impl Network {
    /// Build a network from its records: spatial index over the edge
    /// midpoints, then the connectivity graph.
    ///
    /// Malformed records are reported, not fatal: an edge whose endpoint
    /// node references resolve to nothing contributes no vertex or edge to
    /// the graph, and an edge whose midpoint falls outside the computed
    /// bounds (NaN coordinates) is left out of the index.
    pub fn build(name: impl Into<String>, record: NetworkRecord) -> Self {
        let name = name.into();
        let NetworkRecord { edges, nodes } = record;

        let nodes_by_sm_id: HashMap<i64, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n.sm_id, i)).collect();

        let octree = Self::build_spatial_index(&name, &edges);
        let graph = Self::build_connect_graph(&name, &edges, &nodes, &nodes_by_sm_id);

        Self { name, edges, nodes, nodes_by_sm_id, octree, graph }
    }

    /// Octree over the Cartesian midpoints of all edges. The region is the
    /// midpoint bounding box, so every well-formed edge is insertable.
    fn build_spatial_index(name: &str, edges: &[PipeEdge]) -> PointOctree<usize> {
        let mut min = Cartesian3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Cartesian3::new(-f64::MAX, -f64::MAX, -f64::MAX);

        let centers: Vec<Cartesian3> = edges.iter().map(PipeEdge::center).collect();
        for mid in &centers {
            min = Cartesian3::new(min.x.min(mid.x), min.y.min(mid.y), min.z.min(mid.z));
            max = Cartesian3::new(max.x.max(mid.x), max.y.max(mid.y), max.z.max(mid.z));
        }

        let mut octree =
            PointOctree::new(min, max, OCTREE_BIAS, OCTREE_MAX_POINTS, OCTREE_MAX_DEPTH);

        let mut skipped = 0usize;
        for (i, mid) in centers.into_iter().enumerate() {
            if !octree.put(mid, i) {
                skipped += 1;
            }
        }
        if skipped > 0 {
            warn!(network = name, skipped, "edges outside spatial bounds were not indexed");
        }
        info!(network = name, indexed = octree.point_count(), "spatial index built");

        octree
    }

    /// Connectivity graph: one vertex per pipe-point identifier, one edge
    /// per pipe. Vertices first, then edges, so edge insertion never races
    /// its own endpoints.
    fn build_connect_graph(
        name: &str,
        edges: &[PipeEdge],
        nodes: &[PipeNode],
        nodes_by_sm_id: &HashMap<i64, usize>,
    ) -> PipeGraph<PipeNode, PipeEdge> {
        let mut graph = PipeGraph::new();

        let mut unresolved = 0usize;
        for edge in edges {
            let from = nodes_by_sm_id.get(&edge.sm_from_node).map(|&i| &nodes[i]);
            let to = nodes_by_sm_id.get(&edge.sm_to_node).map(|&i| &nodes[i]);

            match (from, to) {
                (Some(from), Some(to)) => {
                    graph.add_vertex(&edge.plpt0, from.clone());
                    graph.add_vertex(&edge.plpt1, to.clone());
                }
                _ => {
                    unresolved += 1;
                    warn!(
                        network = name,
                        pipe = %edge.pl_id,
                        from = edge.sm_from_node,
                        to = edge.sm_to_node,
                        "edge endpoint node unresolved, edge skipped"
                    );
                }
            }
        }

        for edge in edges {
            // add_edge refuses silently when an endpoint was skipped above.
            graph.add_edge(&edge.plpt0, &edge.plpt1, edge.clone());
        }

        if unresolved > 0 {
            warn!(network = name, unresolved, "edges skipped during graph build");
        }

        graph
    }

    pub fn octree(&self) -> &PointOctree<usize> {
        &self.octree
    }

    pub fn graph(&self) -> &PipeGraph<PipeNode, PipeEdge> {
        &self.graph
    }

    /// Edge record by its per-network numeric id.
    pub fn edge_by_sm_id(&self, sm_id: i64) -> Option<&PipeEdge> {
        self.edges.iter().find(|e| e.sm_id == sm_id)
    }

    /// Node record by its per-network numeric id.
    pub fn node_by_sm_id(&self, sm_id: i64) -> Option<&PipeNode> {
        self.nodes_by_sm_id.get(&sm_id).map(|&i| &self.nodes[i])
    }
}
