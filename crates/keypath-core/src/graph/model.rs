//! Execution graph - construction, validation, and read-only lookups.
//!
//! [`GraphBuilder`] collects nodes and edges, then [`build()`](GraphBuilder::build)
//! validates that they form exactly one simple path and freezes them into an
//! [`ExecutionGraph`]. The built graph is never mutated; the timeline engine
//! shares it through an `Arc`.

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec, vec::Vec};

use super::edge::{EdgeId, GraphEdge};
use super::node::{GraphNode, NodeId};

/// Errors that can occur while building an execution graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The graph has no nodes.
    EmptyGraph,
    /// The specified node was not found in the graph.
    NodeNotFound(NodeId),
    /// Two nodes share the same key.
    DuplicateNodeKey(String),
    /// Two edges share the same key.
    DuplicateEdgeKey(String),
    /// An edge between these nodes already exists.
    DuplicateEdge(NodeId, NodeId),
    /// A node or edge latency is negative or not finite.
    InvalidLatency {
        /// Key of the offending node or edge.
        key: String,
        /// The rejected value.
        value: f64,
    },
    /// A node has more than one outgoing edge.
    Branching(NodeId),
    /// A node has more than one incoming edge.
    Merging(NodeId),
    /// The graph must have exactly one node without incoming edges.
    InvalidStartCount(usize),
    /// The graph must have exactly one node without outgoing edges.
    InvalidTerminalCount(usize),
    /// The requested start node has incoming edges.
    InvalidStart(NodeId),
    /// The edges contain a cycle, or some nodes are not on the path.
    CycleDetected,
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyGraph => write!(f, "graph has no nodes"),
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::DuplicateNodeKey(key) => write!(f, "duplicate node key '{key}'"),
            Self::DuplicateEdgeKey(key) => write!(f, "duplicate edge key '{key}'"),
            Self::DuplicateEdge(a, b) => write!(f, "edge from {a} to {b} already exists"),
            Self::InvalidLatency { key, value } => {
                write!(f, "latency of '{key}' must be finite and >= 0, got {value}")
            }
            Self::Branching(id) => write!(f, "node {id} has more than one outgoing edge"),
            Self::Merging(id) => write!(f, "node {id} has more than one incoming edge"),
            Self::InvalidStartCount(n) => write!(f, "expected 1 start node, found {n}"),
            Self::InvalidTerminalCount(n) => write!(f, "expected 1 terminal node, found {n}"),
            Self::InvalidStart(id) => write!(f, "start node {id} has incoming edges"),
            Self::CycleDetected => write!(f, "graph contains a cycle"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}

/// Mutable collector for nodes and edges.
///
/// # Usage
///
/// 1. Add nodes with [`add_node()`](Self::add_node)
/// 2. Connect them with [`connect()`](Self::connect)
/// 3. Optionally pin the start with [`set_start()`](Self::set_start)
/// 4. Freeze with [`build()`](Self::build)
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    start: Option<NodeId>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node. Returns its ID.
    ///
    /// Key uniqueness is checked at [`build()`](Self::build).
    pub fn add_node(&mut self, node: GraphNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Returns the ID of the node with the given key, if already added.
    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.key == key)
            .map(|i| NodeId(i as u32))
    }

    /// Connects `from → to` with the default `"<from>-><to>"` edge key.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if either endpoint is unknown, the edge is a
    /// self-loop, or the same pair is already connected.
    pub fn connect(
        &mut self,
        from: NodeId,
        to: NodeId,
        latency_ms: f64,
    ) -> Result<EdgeId, GraphError> {
        let key = match (self.nodes.get(from.slot()), self.nodes.get(to.slot())) {
            (Some(a), Some(b)) => format!("{}->{}", a.key, b.key),
            (None, _) => return Err(GraphError::NodeNotFound(from)),
            (_, None) => return Err(GraphError::NodeNotFound(to)),
        };
        self.connect_keyed(from, to, latency_ms, key)
    }

    /// Connects `from → to` under an explicit edge key.
    ///
    /// # Errors
    ///
    /// Same as [`connect()`](Self::connect).
    pub fn connect_keyed(
        &mut self,
        from: NodeId,
        to: NodeId,
        latency_ms: f64,
        key: impl Into<String>,
    ) -> Result<EdgeId, GraphError> {
        for id in [from, to] {
            if id.slot() >= self.nodes.len() {
                return Err(GraphError::NodeNotFound(id));
            }
        }
        if from == to {
            return Err(GraphError::CycleDetected);
        }
        if self.edges.iter().any(|e| e.from == from && e.to == to) {
            return Err(GraphError::DuplicateEdge(from, to));
        }

        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(GraphEdge {
            key: key.into(),
            from,
            to,
            latency_ms,
        });
        Ok(id)
    }

    /// Pins the start node instead of inferring it from in-degrees.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeNotFound`] for an unknown ID.
    pub fn set_start(&mut self, id: NodeId) -> Result<(), GraphError> {
        if id.slot() >= self.nodes.len() {
            return Err(GraphError::NodeNotFound(id));
        }
        self.start = Some(id);
        Ok(())
    }

    /// Builds a linear chain: every node connected to the next in order.
    ///
    /// `edge_latency(i)` gives the latency of the edge leaving the `i`-th node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if validation fails.
    pub fn linear(
        nodes: impl IntoIterator<Item = GraphNode>,
        mut edge_latency: impl FnMut(usize) -> f64,
    ) -> Result<ExecutionGraph, GraphError> {
        let mut builder = Self::new();
        let ids: Vec<NodeId> = nodes.into_iter().map(|n| builder.add_node(n)).collect();
        for (i, pair) in ids.windows(2).enumerate() {
            builder.connect(pair[0], pair[1], edge_latency(i))?;
        }
        builder.build()
    }

    /// Validates the collected topology and freezes it.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] if:
    /// - The graph is empty
    /// - Node or edge keys repeat
    /// - Any latency is negative or not finite
    /// - Any node branches or merges
    /// - There isn't exactly one start and one terminal node
    /// - The edges contain a cycle
    pub fn build(self) -> Result<ExecutionGraph, GraphError> {
        let n = self.nodes.len();
        if n == 0 {
            return Err(GraphError::EmptyGraph);
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if self.nodes[..i].iter().any(|other| other.key == node.key) {
                return Err(GraphError::DuplicateNodeKey(node.key.clone()));
            }
            check_latency(&node.key, node.base_latency_ms)?;
        }
        for (i, edge) in self.edges.iter().enumerate() {
            if self.edges[..i].iter().any(|other| other.key == edge.key) {
                return Err(GraphError::DuplicateEdgeKey(edge.key.clone()));
            }
            check_latency(&edge.key, edge.latency_ms)?;
        }

        let mut outgoing: Vec<Option<EdgeId>> = vec![None; n];
        let mut incoming: Vec<Option<EdgeId>> = vec![None; n];
        for (i, edge) in self.edges.iter().enumerate() {
            let id = EdgeId(i as u32);
            if outgoing[edge.from.slot()].replace(id).is_some() {
                return Err(GraphError::Branching(edge.from));
            }
            if incoming[edge.to.slot()].replace(id).is_some() {
                return Err(GraphError::Merging(edge.to));
            }
        }

        let starts: Vec<usize> = (0..n).filter(|&i| incoming[i].is_none()).collect();
        let terminals = (0..n).filter(|&i| outgoing[i].is_none()).count();
        if let Some(start) = self.start
            && incoming[start.slot()].is_some()
        {
            return Err(GraphError::InvalidStart(start));
        }
        if starts.len() != 1 {
            return Err(GraphError::InvalidStartCount(starts.len()));
        }
        if terminals != 1 {
            return Err(GraphError::InvalidTerminalCount(terminals));
        }
        let start = NodeId(starts[0] as u32);

        // With in/out degree <= 1 everywhere, any node the walk misses sits on
        // a detached cycle.
        let mut path = Vec::with_capacity(n);
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            if path.len() == n {
                return Err(GraphError::CycleDetected);
            }
            path.push(id);
            cursor = outgoing[id.slot()].map(|e| self.edges[e.slot()].to);
        }
        if path.len() != n {
            return Err(GraphError::CycleDetected);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(nodes = n, edges = self.edges.len(), "graph built");

        Ok(ExecutionGraph {
            nodes: self.nodes,
            edges: self.edges,
            outgoing,
            path,
            start,
        })
    }
}

fn check_latency(key: &str, value: f64) -> Result<(), GraphError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::InvalidLatency {
            key: String::from(key),
            value,
        })
    }
}

/// Immutable, validated execution path.
///
/// Holds every node and edge, the ordered path from start to terminal, and a
/// per-node outgoing-edge index. Built by [`GraphBuilder`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    outgoing: Vec<Option<EdgeId>>,
    path: Vec<NodeId>,
    start: NodeId,
}

impl ExecutionGraph {
    /// Returns a fresh builder.
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Looks up a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.slot())
    }

    /// Looks up a node ID by key.
    pub fn node_by_key(&self, key: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.key == key)
            .map(|i| NodeId(i as u32))
    }

    /// Looks up an edge by ID.
    pub fn edge(&self, id: EdgeId) -> Option<&GraphEdge> {
        self.edges.get(id.slot())
    }

    /// Looks up an edge ID by key.
    pub fn edge_by_key(&self, key: &str) -> Option<EdgeId> {
        self.edges
            .iter()
            .position(|e| e.key == key)
            .map(|i| EdgeId(i as u32))
    }

    /// Returns the edge leaving `id`, or `None` for the terminal node.
    pub fn outgoing(&self, id: NodeId) -> Option<EdgeId> {
        self.outgoing.get(id.slot()).copied().flatten()
    }

    /// Node IDs from start to terminal.
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    /// Edge IDs in path order.
    pub fn path_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.path.iter().filter_map(|&id| self.outgoing(id))
    }

    /// The node with no incoming edges.
    pub fn start(&self) -> NodeId {
        self.start
    }

    /// The node with no outgoing edge.
    pub fn terminal(&self) -> NodeId {
        // build() guarantees a non-empty path.
        self.path[self.path.len() - 1]
    }

    /// Iterates over `(id, node)` in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &GraphNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Iterates over `(id, edge)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &GraphEdge)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, e)| (EdgeId(i as u32), e))
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Sum of every node's nominal op cost.
    pub fn total_ops_cost(&self) -> u64 {
        self.nodes.iter().map(|n| n.ops_cost).sum()
    }

    /// Duration of one full run at speed 1: all node and edge latencies.
    pub fn critical_path_ms(&self) -> f64 {
        let nodes: f64 = self.nodes.iter().map(|n| n.base_latency_ms).sum();
        let edges: f64 = self.edges.iter().map(|e| e.latency_ms).sum();
        nodes + edges
    }

    /// Interpolates a layout position along an edge.
    ///
    /// `progress` is clamped to `[0, 1]`; 0 is the source position and 1 the
    /// destination. Returns `None` for an unknown edge.
    pub fn edge_point(&self, id: EdgeId, progress: f64) -> Option<[f32; 2]> {
        let edge = self.edge(id)?;
        let [x0, y0] = self.node(edge.from)?.position;
        let [x1, y1] = self.node(edge.to)?.position;
        let t = progress.clamp(0.0, 1.0) as f32;
        Some([x0 + (x1 - x0) * t, y0 + (y1 - y0) * t])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    fn node(key: &str) -> GraphNode {
        GraphNode::new(key, NodeKind::Hardware).with_latency(10.0)
    }

    fn abc() -> (GraphBuilder, NodeId, NodeId, NodeId) {
        let mut b = GraphBuilder::new();
        let a = b.add_node(node("a"));
        let bb = b.add_node(node("b"));
        let c = b.add_node(node("c"));
        (b, a, bb, c)
    }

    #[test]
    fn test_linear_path() {
        let (mut b, a, bb, c) = abc();
        b.connect(a, bb, 5.0).unwrap();
        b.connect(bb, c, 5.0).unwrap();
        let graph = b.build().unwrap();

        assert_eq!(graph.path(), &[a, bb, c]);
        assert_eq!(graph.start(), a);
        assert_eq!(graph.terminal(), c);
        assert!(graph.outgoing(c).is_none());
        assert_eq!(graph.edge_by_key("a->b"), graph.outgoing(a));
        assert_eq!(graph.path_edges().count(), 2);
        assert_eq!(graph.critical_path_ms(), 40.0);
    }

    #[test]
    fn test_path_follows_edges_not_insertion_order() {
        let (mut b, a, bb, c) = abc();
        b.connect(c, a, 1.0).unwrap();
        b.connect(a, bb, 1.0).unwrap();
        let graph = b.build().unwrap();
        assert_eq!(graph.path(), &[c, a, bb]);
    }

    #[test]
    fn test_single_node_graph() {
        let mut b = GraphBuilder::new();
        let only = b.add_node(node("only"));
        let graph = b.build().unwrap();
        assert_eq!(graph.start(), only);
        assert_eq!(graph.terminal(), only);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_empty_graph_rejected() {
        assert_eq!(GraphBuilder::new().build(), Err(GraphError::EmptyGraph));
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let (mut b, a, _, _) = abc();
        let ghost = NodeId(99);
        assert_eq!(
            b.connect(a, ghost, 1.0),
            Err(GraphError::NodeNotFound(ghost))
        );
    }

    #[test]
    fn test_self_loop_rejected() {
        let (mut b, a, _, _) = abc();
        assert_eq!(b.connect(a, a, 1.0), Err(GraphError::CycleDetected));
    }

    #[test]
    fn test_duplicate_edge_rejected() {
        let (mut b, a, bb, _) = abc();
        b.connect(a, bb, 1.0).unwrap();
        assert_eq!(
            b.connect(a, bb, 2.0),
            Err(GraphError::DuplicateEdge(a, bb))
        );
    }

    #[test]
    fn test_branching_rejected() {
        let (mut b, a, bb, c) = abc();
        b.connect(a, bb, 1.0).unwrap();
        b.connect(a, c, 1.0).unwrap();
        assert_eq!(b.build(), Err(GraphError::Branching(a)));
    }

    #[test]
    fn test_merging_rejected() {
        let (mut b, a, bb, c) = abc();
        b.connect(a, c, 1.0).unwrap();
        b.connect(bb, c, 1.0).unwrap();
        assert_eq!(b.build(), Err(GraphError::Merging(c)));
    }

    #[test]
    fn test_multiple_starts_rejected() {
        let (mut b, a, bb, _) = abc();
        b.connect(a, bb, 1.0).unwrap();
        assert_eq!(b.build(), Err(GraphError::InvalidStartCount(2)));
    }

    #[test]
    fn test_detached_cycle_rejected() {
        let mut b = GraphBuilder::new();
        let a = b.add_node(node("a"));
        let x = b.add_node(node("x"));
        let y = b.add_node(node("y"));
        let z = b.add_node(node("z"));
        b.connect(a, x, 1.0).unwrap();
        b.connect(y, z, 1.0).unwrap();
        b.connect(z, y, 1.0).unwrap();
        assert_eq!(b.build(), Err(GraphError::CycleDetected));
    }

    #[test]
    fn test_full_cycle_has_no_start() {
        let (mut b, a, bb, c) = abc();
        b.connect(a, bb, 1.0).unwrap();
        b.connect(bb, c, 1.0).unwrap();
        b.connect(c, a, 1.0).unwrap();
        assert_eq!(b.build(), Err(GraphError::InvalidStartCount(0)));
    }

    #[test]
    fn test_pinned_start_with_incoming_rejected() {
        let (mut b, a, bb, c) = abc();
        b.connect(a, bb, 1.0).unwrap();
        b.connect(bb, c, 1.0).unwrap();
        b.set_start(bb).unwrap();
        assert_eq!(b.build(), Err(GraphError::InvalidStart(bb)));
    }

    #[test]
    fn test_duplicate_node_key_rejected() {
        let mut b = GraphBuilder::new();
        let a = b.add_node(node("a"));
        let a2 = b.add_node(node("a"));
        b.connect_keyed(a, a2, 1.0, "e").unwrap();
        assert_eq!(b.build(), Err(GraphError::DuplicateNodeKey("a".into())));
    }

    #[test]
    fn test_invalid_latency_rejected() {
        let mut b = GraphBuilder::new();
        let a = b.add_node(node("a"));
        let c = b.add_node(node("c").with_latency(f64::NAN));
        b.connect(a, c, 1.0).unwrap();
        assert!(matches!(
            b.build(),
            Err(GraphError::InvalidLatency { ref key, .. }) if key == "c"
        ));

        let mut b = GraphBuilder::new();
        let a = b.add_node(node("a"));
        let c = b.add_node(node("c"));
        b.connect(a, c, -1.0).unwrap();
        assert!(matches!(b.build(), Err(GraphError::InvalidLatency { .. })));
    }

    #[test]
    fn test_edge_point_interpolates_positions() {
        let graph = GraphBuilder::linear(
            [
                node("a").with_position(0.0, 0.0),
                node("b").with_position(100.0, 50.0),
            ],
            |_| 5.0,
        )
        .unwrap();
        let edge = graph.outgoing(graph.start()).unwrap();
        assert_eq!(graph.edge_point(edge, 0.5), Some([50.0, 25.0]));
        assert_eq!(graph.edge_point(edge, 2.0), Some([100.0, 50.0]));
        assert_eq!(graph.edge_point(EdgeId(7), 0.5), None);
    }

    #[test]
    fn test_error_display() {
        let msg = GraphError::InvalidStartCount(2).to_string();
        assert_eq!(msg, "expected 1 start node, found 2");
        let msg = GraphError::Branching(NodeId(3)).to_string();
        assert!(msg.contains("NodeId(3)"), "got: {msg}");
    }
}
