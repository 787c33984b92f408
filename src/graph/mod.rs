//! # Network Graph Engine
//!
//! A directed graph over pipe-point identifiers with forward and inverse
//! adjacency, per-vertex and per-edge payloads, depth-first reachability
//! traversal (downstream/upstream), and shortest-path search.
//!
//! The graph is rebuilt from scratch on every data reload — there is no
//! incremental deletion. Traversals are read-only.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ============================================================================
// Payload traits
// ============================================================================

/// Vertex payloads are copied into traversal results and stamped with the
/// vertex id they were reached through.
pub trait VertexInfo: Clone {
    /// Record the pipe-point identifier (`PLPTNO`) on this copy.
    fn stamp_plpt(&mut self, plpt: &str);
}

/// Edge payloads expose the identity and weight the traversals need.
pub trait EdgeInfo: Clone {
    /// Cross-network pipe id (`PLID`), used to de-duplicate traversed edges.
    fn pipe_id(&self) -> &str;
    /// Edge weight for shortest-path search (the pipe's length).
    fn weight(&self) -> f64;
}

// ============================================================================
// Result types
// ============================================================================

/// Everything a downstream/upstream traversal discovers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Traversal<V, E> {
    /// Visited vertex ids, in visitation order.
    pub explored_nodes: Vec<String>,
    /// Payload copies for the visited vertices, stamped with their id.
    pub explored_node_info: Vec<V>,
    /// Traversed pipe ids, de-duplicated, in discovery order.
    pub explored_edges: Vec<String>,
    /// Payloads of the traversed pipes, parallel to `explored_edges`.
    pub explored_edge_info: Vec<E>,
    /// Visited vertices with no onward adjacency (branch ends).
    pub end_nodes: Vec<String>,
    /// Payload copies for the branch ends.
    pub end_node_info: Vec<V>,
}

// Hand-written so `V`/`E` need not be `Default` themselves.
impl<V, E> Default for Traversal<V, E> {
    fn default() -> Self {
        Self {
            explored_nodes: Vec::new(),
            explored_node_info: Vec::new(),
            explored_edges: Vec::new(),
            explored_edge_info: Vec::new(),
            end_nodes: Vec::new(),
            end_node_info: Vec::new(),
        }
    }
}

/// Result of a shortest-path search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShortestPath {
    pub connected: bool,
    /// Shortest known distance from the start, per reachable vertex.
    pub distance_from_start: HashMap<String, f64>,
    /// Predecessor on the shortest path, per reachable vertex. The start
    /// vertex (and any vertex never relaxed) has no entry.
    pub previous_vertex: HashMap<String, String>,
}

impl ShortestPath {
    /// Walk predecessors from `end` back to the start and reverse.
    /// Includes `end` itself; empty when `end` was never reached.
    pub fn reconstruct(&self, end: &str) -> Vec<String> {
        if !self.connected {
            return Vec::new();
        }

        let mut path = Vec::new();
        let mut cursor = self.previous_vertex.get(end);
        while let Some(v) = cursor {
            path.push(v.clone());
            cursor = self.previous_vertex.get(v);
        }
        path.reverse();
        path.push(end.to_string());
        path
    }
}

// ============================================================================
// PipeGraph
// ============================================================================

/// Directed graph keyed by pipe-point identifier strings.
///
/// `V` is the vertex payload (pipe-point record), `E` the edge payload
/// (pipe record). Both adjacency directions are maintained so upstream and
/// downstream traversals are symmetric.
#[derive(Debug, Clone)]
pub struct PipeGraph<V, E> {
    /// Forward adjacency: vertex → outgoing neighbor ids.
    adjacency: HashMap<String, SmallVec<[String; 4]>>,
    /// Inverse adjacency: vertex → incoming neighbor ids.
    adjacency_inv: HashMap<String, SmallVec<[String; 4]>>,
    /// Vertex id → payload.
    vertex_info: HashMap<String, V>,
    /// (source, target) → edge payload, forward direction.
    edge_info: HashMap<(String, String), E>,
    /// (target, source) → edge payload, inverse direction.
    edge_info_inv: HashMap<(String, String), E>,
}

impl<V: VertexInfo, E: EdgeInfo> PipeGraph<V, E> {
    pub fn new() -> Self {
        Self {
            adjacency: HashMap::new(),
            adjacency_inv: HashMap::new(),
            vertex_info: HashMap::new(),
            edge_info: HashMap::new(),
            edge_info_inv: HashMap::new(),
        }
    }

    /// Register a vertex with its payload.
    ///
    /// Re-registering an existing id clears its prior adjacency — callers
    /// rebuilding a graph rely on this to start vertices clean.
    pub fn add_vertex(&mut self, vertex: &str, info: V) {
        self.adjacency.insert(vertex.to_string(), SmallVec::new());
        self.adjacency_inv.insert(vertex.to_string(), SmallVec::new());
        self.vertex_info.insert(vertex.to_string(), info);
    }

    pub fn contains_vertex(&self, vertex: &str) -> bool {
        self.adjacency.contains_key(vertex)
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn vertex_info(&self, vertex: &str) -> Option<&V> {
        self.vertex_info.get(vertex)
    }

    /// Edge payload along the forward direction `from → to`.
    pub fn edge_info(&self, from: &str, to: &str) -> Option<&E> {
        self.edge_info.get(&(from.to_string(), to.to_string()))
    }

    /// Outgoing neighbor ids of `vertex`.
    pub fn neighbors(&self, vertex: &str) -> Option<&[String]> {
        self.adjacency.get(vertex).map(|n| n.as_slice())
    }

    /// Add a directed edge `v → w` with payload.
    ///
    /// Returns `false` (and adds nothing) unless both vertices were
    /// registered first.
    pub fn add_edge(&mut self, v: &str, w: &str, info: E) -> bool {
        if !self.contains_vertex(v) || !self.contains_vertex(w) {
            return false;
        }

        if let Some(neighbors) = self.adjacency.get_mut(v) {
            neighbors.push(w.to_string());
        }
        if let Some(neighbors) = self.adjacency_inv.get_mut(w) {
            neighbors.push(v.to_string());
        }
        self.edge_info.insert((v.to_string(), w.to_string()), info.clone());
        self.edge_info_inv.insert((w.to_string(), v.to_string()), info);
        true
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Downstream traversal: depth-first over forward adjacency.
    pub fn dfs(&self, start: &str) -> Traversal<V, E> {
        self.traverse(start, &self.adjacency, &self.edge_info)
    }

    /// Upstream traversal: depth-first over inverse adjacency.
    pub fn dfs_inv(&self, start: &str) -> Traversal<V, E> {
        self.traverse(start, &self.adjacency_inv, &self.edge_info_inv)
    }

    /// Stack-based (LIFO) depth-first walk. Each vertex is visited at most
    /// once; visitation order is the pop order, matching a recursive DFS
    /// that expands neighbors last-first.
    fn traverse(
        &self,
        start: &str,
        adjacency: &HashMap<String, SmallVec<[String; 4]>>,
        edge_info: &HashMap<(String, String), E>,
    ) -> Traversal<V, E> {
        let mut result = Traversal::default();

        let mut stack = vec![start.to_string()];
        let mut explored: HashSet<String> = HashSet::new();
        let mut explored_edges: HashSet<String> = HashSet::new();

        while let Some(v) = stack.pop() {
            if !explored.insert(v.clone()) {
                continue;
            }
            result.explored_nodes.push(v.clone());

            let info = self.vertex_info.get(&v).cloned().map(|mut i| {
                i.stamp_plpt(&v);
                i
            });
            if let Some(info) = info.clone() {
                result.explored_node_info.push(info);
            }

            let Some(neighbors) = adjacency.get(&v) else {
                continue;
            };

            // No onward neighbors: this branch terminates here.
            if neighbors.is_empty() {
                result.end_nodes.push(v.clone());
                if let Some(info) = info {
                    result.end_node_info.push(info);
                }
            }

            for w in neighbors {
                if let Some(edge) = edge_info.get(&(v.clone(), w.clone())) {
                    let plid = edge.pipe_id();
                    if explored_edges.insert(plid.to_string()) {
                        result.explored_edges.push(plid.to_string());
                        result.explored_edge_info.push(edge.clone());
                    }
                }

                if !explored.contains(w) {
                    stack.push(w.clone());
                }
            }
        }

        result
    }

    /// Breadth-first reachability over inverse adjacency.
    pub fn bfs_inv(&self, start: &str) -> Vec<String> {
        let mut queue = std::collections::VecDeque::from([start.to_string()]);
        let mut explored: Vec<String> = vec![start.to_string()];

        while let Some(v) = queue.pop_front() {
            let Some(neighbors) = self.adjacency_inv.get(&v) else {
                continue;
            };
            for w in neighbors {
                if !explored.contains(w) {
                    explored.push(w.clone());
                    queue.push_back(w.clone());
                }
            }
        }

        explored
    }

    // ========================================================================
    // Shortest path
    // ========================================================================

    /// Shortest path by edge length from `start` to `end`.
    ///
    /// A DFS first establishes the forward-reachable set; when `end` is not
    /// in it the result is `connected: false` with empty maps. Otherwise a
    /// stack-based relaxation runs over the reachable set with
    /// **re-opening**: a vertex whose already-finite distance improves is
    /// removed from the finalized set and revisited.
    ///
    /// This is a best-effort substitute for a priority queue, not classical
    /// Dijkstra — it does not guarantee single-pop-per-vertex optimality on
    /// cyclic graphs, but converges on DAG-like pipe networks where each
    /// vertex is re-opened a bounded number of times.
    pub fn shortest_path(&self, start: &str, end: &str) -> ShortestPath {
        let mut result = ShortestPath::default();

        let reachable = self.dfs(start).explored_nodes;
        if !reachable.iter().any(|n| n == end) {
            return result;
        }
        result.connected = true;

        for node in &reachable {
            result.distance_from_start.insert(node.clone(), f64::INFINITY);
        }
        result.distance_from_start.insert(start.to_string(), 0.0);

        let mut stack = vec![start.to_string()];
        let mut explored: HashSet<String> = HashSet::new();

        while let Some(v) = stack.pop() {
            if !explored.insert(v.clone()) {
                continue;
            }

            let Some(neighbors) = self.adjacency.get(&v) else {
                continue;
            };
            let distance_v = result.distance_from_start[&v];

            for w in neighbors {
                let Some(edge) = self.edge_info.get(&(v.clone(), w.clone())) else {
                    continue;
                };
                let candidate = distance_v + edge.weight();

                let distance_w = result.distance_from_start[w.as_str()];
                let first_update = distance_w.is_infinite();

                if candidate < distance_w {
                    result.distance_from_start.insert(w.clone(), candidate);
                    result.previous_vertex.insert(w.clone(), v.clone());

                    // Re-open: an improvement after the vertex was already
                    // finalized forces it back onto the stack so its own
                    // neighbors see the shorter distance.
                    if !first_update {
                        explored.remove(w);
                    }
                }

                if !explored.contains(w) {
                    stack.push(w.clone());
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct TestNode {
        plptno: String,
    }

    impl VertexInfo for TestNode {
        fn stamp_plpt(&mut self, plpt: &str) {
            self.plptno = plpt.to_string();
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct TestEdge {
        plid: String,
        length: f64,
    }

    impl EdgeInfo for TestEdge {
        fn pipe_id(&self) -> &str {
            &self.plid
        }

        fn weight(&self) -> f64 {
            self.length
        }
    }

    fn edge(plid: &str, length: f64) -> TestEdge {
        TestEdge { plid: plid.to_string(), length }
    }

    /// The reference 7-vertex graph:
    /// 0-1(1), 1-3(1), 3-4(2), 4-5(1), 1-2(2), 2-5(5), 2-6(1).
    fn seven_vertex_graph() -> PipeGraph<TestNode, TestEdge> {
        let mut g = PipeGraph::new();
        for v in ["0", "1", "2", "3", "4", "5", "6"] {
            g.add_vertex(v, TestNode::default());
        }
        assert!(g.add_edge("0", "1", edge("e01", 1.0)));
        assert!(g.add_edge("1", "3", edge("e13", 1.0)));
        assert!(g.add_edge("3", "4", edge("e34", 2.0)));
        assert!(g.add_edge("4", "5", edge("e45", 1.0)));
        assert!(g.add_edge("1", "2", edge("e12", 2.0)));
        assert!(g.add_edge("2", "5", edge("e25", 5.0)));
        assert!(g.add_edge("2", "6", edge("e26", 1.0)));
        g
    }

    #[test]
    fn test_add_edge_requires_vertices() {
        let mut g: PipeGraph<TestNode, TestEdge> = PipeGraph::new();
        g.add_vertex("a", TestNode::default());
        assert!(!g.add_edge("a", "missing", edge("x", 1.0)));
        assert!(!g.add_edge("missing", "a", edge("x", 1.0)));
        assert!(g.neighbors("a").unwrap().is_empty());
    }

    #[test]
    fn test_readd_vertex_clears_adjacency() {
        let mut g: PipeGraph<TestNode, TestEdge> = PipeGraph::new();
        g.add_vertex("a", TestNode::default());
        g.add_vertex("b", TestNode::default());
        assert!(g.add_edge("a", "b", edge("ab", 1.0)));
        g.add_vertex("a", TestNode::default());
        assert!(g.neighbors("a").unwrap().is_empty());
    }

    #[test]
    fn test_dfs_visits_each_vertex_once() {
        let g = seven_vertex_graph();
        let t = g.dfs("0");
        assert_eq!(t.explored_nodes.len(), 7);
        let unique: HashSet<&String> = t.explored_nodes.iter().collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn test_dfs_stamps_plptno() {
        let g = seven_vertex_graph();
        let t = g.dfs("0");
        for (id, info) in t.explored_nodes.iter().zip(&t.explored_node_info) {
            assert_eq!(&info.plptno, id);
        }
    }

    #[test]
    fn test_dfs_terminal_vertices() {
        let g = seven_vertex_graph();
        let t = g.dfs("0");
        // 5 and 6 have no outgoing edges.
        let mut ends = t.end_nodes.clone();
        ends.sort();
        assert_eq!(ends, vec!["5", "6"]);
    }

    #[test]
    fn test_dfs_edge_dedup() {
        let g = seven_vertex_graph();
        let t = g.dfs("0");
        assert_eq!(t.explored_edges.len(), 7);
        let unique: HashSet<&String> = t.explored_edges.iter().collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn test_dfs_inv_is_upstream() {
        let g = seven_vertex_graph();
        let t = g.dfs_inv("5");
        let mut nodes = t.explored_nodes.clone();
        nodes.sort();
        // Everything except 6 can reach 5.
        assert_eq!(nodes, vec!["0", "1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_shortest_path_reference_example() {
        let g = seven_vertex_graph();
        let r = g.shortest_path("0", "5");
        assert!(r.connected);
        assert_eq!(r.distance_from_start["5"], 4.0);
        assert_eq!(r.reconstruct("5"), vec!["0", "1", "3", "4", "5"]);
    }

    #[test]
    fn test_shortest_path_unreachable() {
        let g = seven_vertex_graph();
        let r = g.shortest_path("5", "0");
        assert!(!r.connected);
        assert!(r.distance_from_start.is_empty());
    }

    #[test]
    fn test_shortest_path_reopens_improved_vertex() {
        // A cycle-free diamond where the longer edge is relaxed first
        // depending on stack order; the improved path must win regardless.
        let mut g: PipeGraph<TestNode, TestEdge> = PipeGraph::new();
        for v in ["s", "a", "b", "t"] {
            g.add_vertex(v, TestNode::default());
        }
        g.add_edge("s", "a", edge("sa", 10.0));
        g.add_edge("s", "b", edge("sb", 1.0));
        g.add_edge("b", "a", edge("ba", 1.0));
        g.add_edge("a", "t", edge("at", 1.0));

        let r = g.shortest_path("s", "t");
        assert!(r.connected);
        assert_eq!(r.distance_from_start["t"], 3.0);
        assert_eq!(r.reconstruct("t"), vec!["s", "b", "a", "t"]);
    }

    #[test]
    fn test_bfs_inv_reachability() {
        let g = seven_vertex_graph();
        let mut up = g.bfs_inv("5");
        up.sort();
        assert_eq!(up, vec!["0", "1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_idempotent_rebuild() {
        let a = seven_vertex_graph();
        let b = seven_vertex_graph();
        assert_eq!(a.vertex_count(), b.vertex_count());
        for v in ["0", "1", "2", "3", "4", "5", "6"] {
            assert_eq!(a.neighbors(v), b.neighbors(v));
        }
        // Same traversal output as well.
        assert_eq!(a.dfs("0").explored_nodes, b.dfs("0").explored_nodes);
    }
}
