//! # Analysis Engine
//!
//! [`EngineState`] is one fully built load cycle: every data source, the
//! cross-network merged graph, and the pipe-id edge index. All analysis
//! queries run against it and are read-only.
//!
//! [`Engine`] owns the active state behind a lock. A reload builds the
//! complete replacement state off to the side and swaps a single `Arc`, so
//! in-flight queries observe either the old or the new state, never a mix.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use crate::clearance::{clip_segment_to_box, closest_points, is_in_box, SegmentClosestPoints};
use crate::geom::{BoundingSphere, Camera, Cartesian3, Plane};
use crate::graph::{PipeGraph, Traversal, VertexInfo};
use crate::model::{DataSource, DataSourceRecord, PipeEdge, PipeNode};
use crate::{Error, Result};

/// Across-cut half-extent of the profile box in meters.
const PROFILE_HALF_HEIGHT: f64 = 50.0;
/// Default vertical half-extent of the profile box when the caller gives
/// none.
const PROFILE_DEFAULT_DEPTH: f64 = 50.0;
/// Cull-sphere radius multiplier for the profile query.
const PROFILE_CULL_FACTOR: f64 = 5.0;
/// Cull-sphere radius multiplier for the collision query.
const COLLISION_CULL_FACTOR: f64 = 2.0;

// ============================================================================
// Query result DTOs
// ============================================================================

/// Minimum clearance between two pipes, with both records attached.
#[derive(Debug, Clone, Serialize)]
pub struct ClearanceReport {
    pub clearance: SegmentClosestPoints,
    pub edge0: PipeEdge,
    pub edge1: PipeEdge,
}

/// One pipe pair closer than the collision threshold.
#[derive(Debug, Clone, Serialize)]
pub struct CollisionHit {
    pub distance: f64,
    pub closest: [Cartesian3; 2],
    pub edge0: PipeEdge,
    pub edge1: PipeEdge,
}

/// One pipe crossing the cross-section plane.
#[derive(Debug, Clone, Serialize)]
pub struct CrossSectionHit {
    pub position: Cartesian3,
    pub edge: PipeEdge,
}

/// One pipe inside (or crossing) the longitudinal profile box.
///
/// `positions` are in the profile's local frame: both transformed endpoints
/// when the pipe lies fully inside the box, otherwise the clip points
/// against the box faces.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileEntry {
    pub positions: Vec<Cartesian3>,
    /// Endpoint node records, stamped with their pipe-point identifier.
    pub nodes: Vec<PipeNode>,
    pub edge: PipeEdge,
}

/// Longitudinal profile cut result.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub entries: Vec<ProfileEntry>,
    /// Length of the cut line, the local frame's x extent.
    pub xlength: f64,
}

/// Burst analysis: everything upstream of the pipe's start and everything
/// downstream of its end.
#[derive(Debug, Clone, Serialize)]
pub struct BurstReport {
    pub upstream: Traversal<PipeNode, PipeEdge>,
    pub downstream: Traversal<PipeNode, PipeEdge>,
}

/// Shortest-path connectivity between two pipes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Connectivity {
    pub connected: bool,
    /// Pipe-point identifiers along the path, start to end inclusive.
    pub path: Vec<String>,
    /// Node records along the path, stamped with their identifier.
    pub nodes_info: Vec<PipeNode>,
    /// Pipe records between consecutive path vertices.
    pub edges_info: Vec<PipeEdge>,
}

// ============================================================================
// EngineState
// ============================================================================

/// One immutable load cycle: all data sources, the merged graph, and the
/// pipe-id index. Queries borrow it; reload replaces it wholesale.
#[derive(Debug)]
pub struct EngineState {
    /// Data sources keyed by batch identifier.
    sources: HashMap<String, DataSource>,
    /// Cross-network merged connectivity graph.
    graph: PipeGraph<PipeNode, PipeEdge>,
    /// PLID → pipe record, across every source and network.
    edges_by_plid: HashMap<String, PipeEdge>,
}

impl EngineState {
    /// Build a complete state from parsed source records.
    ///
    /// All sources of the load cycle must be present in `records` — the
    /// merged graph spans every network of every source, so it can only be
    /// built once the full set is known.
    pub fn build(records: Vec<DataSourceRecord>) -> Self {
        let sources: HashMap<String, DataSource> = records
            .into_iter()
            .map(DataSource::build)
            .map(|s| (s.batch.clone(), s))
            .collect();

        let (graph, edges_by_plid) = Self::merge_graphs(&sources);

        info!(
            sources = sources.len(),
            vertices = graph.vertex_count(),
            pipes = edges_by_plid.len(),
            "engine state built"
        );

        Self { sources, graph, edges_by_plid }
    }

    /// Merge every network of every source into one graph. Vertices first
    /// across the whole set, then edges, so a pipe joining two networks
    /// always finds both endpoints.
    fn merge_graphs(
        sources: &HashMap<String, DataSource>,
    ) -> (PipeGraph<PipeNode, PipeEdge>, HashMap<String, PipeEdge>) {
        let mut graph = PipeGraph::new();
        let mut edges_by_plid = HashMap::new();

        for source in sources.values() {
            for network in source.networks() {
                for edge in &network.edges {
                    let from = network.node_by_sm_id(edge.sm_from_node);
                    let to = network.node_by_sm_id(edge.sm_to_node);
                    match (from, to) {
                        (Some(from), Some(to)) => {
                            graph.add_vertex(&edge.plpt0, from.clone());
                            graph.add_vertex(&edge.plpt1, to.clone());
                        }
                        _ => warn!(
                            batch = %source.batch,
                            pipe = %edge.pl_id,
                            "edge endpoint unresolved during merge, edge skipped"
                        ),
                    }
                }
            }
        }

        for source in sources.values() {
            for network in source.networks() {
                for edge in &network.edges {
                    graph.add_edge(&edge.plpt0, &edge.plpt1, edge.clone());
                    edges_by_plid.insert(edge.pl_id.clone(), edge.clone());
                }
            }
        }

        (graph, edges_by_plid)
    }

    pub fn graph(&self) -> &PipeGraph<PipeNode, PipeEdge> {
        &self.graph
    }

    pub fn source(&self, batch: &str) -> Option<&DataSource> {
        self.sources.get(batch)
    }

    /// Pipe record by its cross-network id.
    pub fn edge_by_plid(&self, plid: &str) -> Option<&PipeEdge> {
        self.edges_by_plid.get(plid)
    }

    fn require_edge(&self, batch: &str, network: &str, sm_id: i64) -> Result<&PipeEdge> {
        self.source(batch)
            .ok_or_else(|| Error::NotFound(format!("data source batch '{batch}'")))?
            .network(network)
            .ok_or_else(|| Error::NotFound(format!("network '{network}' in batch '{batch}'")))?
            .edge_by_sm_id(sm_id)
            .ok_or_else(|| {
                Error::NotFound(format!("pipe SmID {sm_id} in {batch}/{network}"))
            })
    }

    fn require_plid(&self, plid: &str) -> Result<&PipeEdge> {
        self.edge_by_plid(plid)
            .ok_or_else(|| Error::NotFound(format!("pipe '{plid}'")))
    }

    // ========================================================================
    // Clearance and collision
    // ========================================================================

    /// Minimum clearance between two pipes, each addressed by
    /// (batch, network, SmID).
    pub fn clearance(
        &self,
        batch0: &str,
        network0: &str,
        sm_id0: i64,
        batch1: &str,
        network1: &str,
        sm_id1: i64,
    ) -> Result<ClearanceReport> {
        let edge0 = self.require_edge(batch0, network0, sm_id0)?.clone();
        let edge1 = self.require_edge(batch1, network1, sm_id1)?.clone();

        let (p0, p1) = edge0.endpoints();
        let (q0, q1) = edge1.endpoints();
        let clearance = closest_points(p0, p1, q0, q1);

        Ok(ClearanceReport { clearance, edge0, edge1 })
    }

    /// All pipe pairs between two networks closer than `min_distance`,
    /// keyed by the first network's pipe SmID.
    ///
    /// Each pipe of the first network culls the second network's octree
    /// with a sphere of twice its own length, then the survivors get the
    /// exact segment-distance test.
    pub fn collisions(
        &self,
        batch0: &str,
        network0: &str,
        batch1: &str,
        network1: &str,
        min_distance: f64,
    ) -> Result<HashMap<i64, Vec<CollisionHit>>> {
        let net0 = self
            .source(batch0)
            .ok_or_else(|| Error::NotFound(format!("data source batch '{batch0}'")))?
            .network(network0)
            .ok_or_else(|| Error::NotFound(format!("network '{network0}' in batch '{batch0}'")))?;
        let net1 = self
            .source(batch1)
            .ok_or_else(|| Error::NotFound(format!("data source batch '{batch1}'")))?
            .network(network1)
            .ok_or_else(|| Error::NotFound(format!("network '{network1}' in batch '{batch1}'")))?;

        let mut result: HashMap<i64, Vec<CollisionHit>> = HashMap::new();

        for edge0 in &net0.edges {
            let (p0, p1) = edge0.endpoints();
            // Generous radius so near-miss candidates survive the cull.
            let sphere = BoundingSphere::new(
                p0.midpoint(p1),
                COLLISION_CULL_FACTOR * (p0 - p1).magnitude(),
            );

            for octant in net1.octree().cull(&sphere) {
                for &index in octant.data() {
                    let edge1 = &net1.edges[index];
                    let (q0, q1) = edge1.endpoints();
                    let hit = closest_points(p0, p1, q0, q1);
                    if hit.distance < min_distance {
                        result.entry(edge0.sm_id).or_default().push(CollisionHit {
                            distance: hit.distance,
                            closest: hit.closest,
                            edge0: edge0.clone(),
                            edge1: edge1.clone(),
                        });
                    }
                }
            }
        }

        Ok(result)
    }

    // ========================================================================
    // Section cuts
    // ========================================================================

    /// Cross-section cut: every pipe of every network crossing the plane
    /// through `p0`, `p1`, `p2`, with its intersection point.
    ///
    /// The candidate set is culled with a sphere around the `p0`–`p1`
    /// midpoint at twice that segment's length.
    pub fn cross_section(
        &self,
        p0: Cartesian3,
        p1: Cartesian3,
        p2: Cartesian3,
    ) -> Vec<CrossSectionHit> {
        let normal = (p2 - p0).cross(p1 - p0).normalize();
        let plane = Plane::from_point_normal(p0, normal);
        let sphere = BoundingSphere::new(p0.midpoint(p1), (p1 - p0).magnitude() * 2.0);

        let mut result = Vec::new();
        for source in self.sources.values() {
            for network in source.networks() {
                for octant in network.octree().cull(&sphere) {
                    for &index in octant.data() {
                        let edge = &network.edges[index];
                        let (e0, e1) = edge.endpoints();
                        if let Some(position) = plane.intersect_segment(e0, e1) {
                            result.push(CrossSectionHit { position, edge: edge.clone() });
                        }
                    }
                }
            }
        }

        result
    }

    /// Longitudinal profile cut along the line `p0`–`p1`.
    ///
    /// A downward-looking camera frame is placed at the line's midpoint:
    /// x along the line, y across the cut, z vertical (negative below the
    /// line). Every culled pipe is transformed into that frame; pipes fully
    /// inside the profile box keep both endpoints, pipes crossing a face
    /// keep their clip points, pipes outside are dropped. `depth` is the
    /// box's vertical half-extent (default 50 m).
    pub fn profile(&self, p0: Cartesian3, p1: Cartesian3, depth: Option<f64>) -> Profile {
        let depth = depth.unwrap_or(PROFILE_DEFAULT_DEPTH);
        let xlength = (p1 - p0).magnitude();
        let position = p0.midpoint(p1);

        // Orthonormal frame: right along the cut line, up away from the
        // ellipsoid center, re-orthogonalized.
        let right = (p1 - p0).normalize();
        let mut up = position.normalize();
        let direction = up.cross(right).normalize();
        up = right.cross(direction).normalize();

        // The view matrix serves as the profile's local model frame; the
        // camera looks down, so world vertical lands on the frame's z axis.
        let camera = Camera { position, direction: -up, up: direction, right, ..Camera::default() };
        let view = camera.view_matrix();

        let sphere = BoundingSphere::new(position, xlength * PROFILE_CULL_FACTOR);
        let half_x = xlength / 2.0;
        let box_extents = Cartesian3::new(half_x, PROFILE_HALF_HEIGHT, depth);

        let mut entries = Vec::new();
        for source in self.sources.values() {
            for network in source.networks() {
                for octant in network.octree().cull(&sphere) {
                    for &index in octant.data() {
                        let edge = &network.edges[index];
                        let (e0, e1) = edge.endpoints();
                        let a = view.multiply_by_point(e0);
                        let b = view.multiply_by_point(e1);

                        let positions = if is_in_box(a, half_x, PROFILE_HALF_HEIGHT, depth)
                            && is_in_box(b, half_x, PROFILE_HALF_HEIGHT, depth)
                        {
                            vec![a, b]
                        } else {
                            let origin = a.midpoint(b);
                            let dir = (b - a).normalize();
                            let half_length = (b - a).magnitude() * 0.5;
                            let clip = clip_segment_to_box(origin, dir, half_length, box_extents);
                            if !clip.intersect {
                                continue;
                            }
                            clip.points
                        };

                        let mut nodes = Vec::with_capacity(2);
                        for (sm_id, plpt) in [
                            (edge.sm_from_node, &edge.plpt0),
                            (edge.sm_to_node, &edge.plpt1),
                        ] {
                            match network.node_by_sm_id(sm_id) {
                                Some(node) => {
                                    let mut node = node.clone();
                                    node.stamp_plpt(plpt);
                                    nodes.push(node);
                                }
                                None => warn!(
                                    pipe = %edge.pl_id,
                                    node = sm_id,
                                    "profile endpoint node unresolved"
                                ),
                            }
                        }

                        entries.push(ProfileEntry { positions, nodes, edge: edge.clone() });
                    }
                }
            }
        }

        Profile { entries, xlength }
    }

    // ========================================================================
    // Topology queries
    // ========================================================================

    /// Everything reachable downstream of a pipe point.
    pub fn downstream(&self, plpt: &str) -> Result<Traversal<PipeNode, PipeEdge>> {
        if !self.graph.contains_vertex(plpt) {
            return Err(Error::NotFound(format!("pipe point '{plpt}'")));
        }
        Ok(self.graph.dfs(plpt))
    }

    /// Everything reachable upstream of a pipe point.
    pub fn upstream(&self, plpt: &str) -> Result<Traversal<PipeNode, PipeEdge>> {
        if !self.graph.contains_vertex(plpt) {
            return Err(Error::NotFound(format!("pipe point '{plpt}'")));
        }
        Ok(self.graph.dfs_inv(plpt))
    }

    /// Burst analysis for one pipe: upstream of its start point and
    /// downstream of its end point, the stretch a rupture would affect.
    ///
    /// A pipe whose endpoint nodes were skipped during the merge is indexed
    /// by id but has no graph vertices; it reports `NotFound` like any
    /// other unknown pipe point.
    pub fn burst(&self, plid: &str) -> Result<BurstReport> {
        let edge = self.require_plid(plid)?;
        if !self.graph.contains_vertex(&edge.plpt0) || !self.graph.contains_vertex(&edge.plpt1) {
            return Err(Error::NotFound(format!("endpoints of pipe '{plid}'")));
        }
        Ok(BurstReport {
            upstream: self.graph.dfs_inv(&edge.plpt0),
            downstream: self.graph.dfs(&edge.plpt1),
        })
    }

    /// Shortest-path connectivity between two pipes.
    ///
    /// Tries the first pipe's end to the second pipe's start; when that
    /// direction is not connected, probes the reverse assignment (second
    /// pipe's end to first pipe's start). Two pipes sharing the probed
    /// endpoint are trivially connected with an empty path.
    pub fn connectivity(&self, plid0: &str, plid1: &str) -> Result<Connectivity> {
        let edge0 = self.require_plid(plid0)?;
        let edge1 = self.require_plid(plid1)?;

        let mut start = edge0.plpt1.as_str();
        let mut end = edge1.plpt0.as_str();
        let mut shortest = self.graph.shortest_path(start, end);
        if !shortest.connected {
            start = edge1.plpt1.as_str();
            end = edge0.plpt0.as_str();
            shortest = self.graph.shortest_path(start, end);
        }

        if start == end {
            return Ok(Connectivity { connected: true, ..Connectivity::default() });
        }
        if !shortest.connected {
            return Ok(Connectivity::default());
        }

        let path = shortest.reconstruct(end);

        let mut nodes_info = Vec::with_capacity(path.len());
        for plpt in &path {
            if let Some(node) = self.graph.vertex_info(plpt) {
                let mut node = node.clone();
                node.stamp_plpt(plpt);
                nodes_info.push(node);
            }
        }

        let mut edges_info = Vec::with_capacity(path.len().saturating_sub(1));
        for pair in path.windows(2) {
            if let Some(edge) = self.graph.edge_info(&pair[0], &pair[1]) {
                edges_info.push(edge.clone());
            }
        }

        Ok(Connectivity { connected: true, path, nodes_info, edges_info })
    }
}

// ============================================================================
// Engine
// ============================================================================

/// The active analysis state behind an atomic-swap handle.
#[derive(Debug)]
pub struct Engine {
    state: RwLock<Arc<EngineState>>,
}

impl Engine {
    /// An engine with no data loaded. Every lookup-based query on its
    /// state reports `NotFound` until [`reload`](Self::reload) runs.
    pub fn new() -> Self {
        Self { state: RwLock::new(Arc::new(EngineState::build(Vec::new()))) }
    }

    /// Replace the active state with one built from `records`.
    ///
    /// The new state is built entirely before the swap; the write lock is
    /// held only for the pointer exchange. Queries holding the previous
    /// `Arc` keep a consistent view of the old cycle.
    pub fn reload(&self, records: Vec<DataSourceRecord>) -> Result<()> {
        let next = Arc::new(EngineState::build(records));
        *self.state.write() = next;
        Ok(())
    }

    /// Snapshot of the active state. Cheap; the read lock is held only for
    /// the `Arc` clone.
    pub fn state(&self) -> Arc<EngineState> {
        self.state.read().clone()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
