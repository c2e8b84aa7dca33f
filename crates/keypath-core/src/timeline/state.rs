//! Observable simulation state.
//!
//! [`SimulationState`] is the only thing renderers read. The engine owns it and
//! hands out shared references or clones; nothing outside the crate can mutate
//! it. Per-node and per-edge status only ever move forward within a run
//! (`idle → queued → active → done`, `idle → flowing → done`) until the next
//! reset.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::graph::{EdgeId, ExecutionGraph, NodeId};

/// Lowest accepted speed multiplier.
pub const MIN_SPEED: f64 = 0.5;
/// Highest accepted speed multiplier.
pub const MAX_SPEED: f64 = 3.0;
/// Speed used on construction and for non-finite input.
pub const DEFAULT_SPEED: f64 = 1.0;

/// Clamps a requested speed to `[MIN_SPEED, MAX_SPEED]`.
///
/// Non-finite input falls back to [`DEFAULT_SPEED`].
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_finite() {
        speed.clamp(MIN_SPEED, MAX_SPEED)
    } else {
        DEFAULT_SPEED
    }
}

/// Per-run status of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeStatus {
    /// Not reached yet.
    #[default]
    Idle,
    /// A signal is travelling towards this node.
    Queued,
    /// Processing.
    Active,
    /// Finished.
    Done,
}

impl NodeStatus {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Queued => "queued",
            Self::Active => "active",
            Self::Done => "done",
        }
    }
}

/// Per-run status of an edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeStatus {
    /// Not traversed yet.
    #[default]
    Idle,
    /// A signal is in flight.
    Flowing,
    /// Traversal finished.
    Done,
}

impl EdgeStatus {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Flowing => "flowing",
            Self::Done => "done",
        }
    }
}

/// An in-progress traversal of one edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeFlow {
    /// When the signal left the source node.
    pub start_at_ms: f64,
    /// How long the traversal takes at the speed in effect when it started.
    pub duration_ms: f64,
}

impl EdgeFlow {
    /// Fraction of the traversal completed at `now_ms`, clamped to `[0, 1]`.
    ///
    /// A zero-length flow reports 1.
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_at_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    /// When the signal reaches the destination node.
    pub fn end_at_ms(&self) -> f64 {
        self.start_at_ms + self.duration_ms
    }
}

/// Snapshot of the engine visible to renderers.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationState {
    pub(crate) running: bool,
    pub(crate) now_ms: f64,
    pub(crate) total_ops: u64,
    pub(crate) speed: f64,
    pub(crate) node_status: Vec<NodeStatus>,
    pub(crate) edge_status: Vec<EdgeStatus>,
    pub(crate) edge_flows: Vec<Option<EdgeFlow>>,
}

impl SimulationState {
    /// Idle state sized for `graph`, at time `now_ms`.
    pub fn for_graph(graph: &ExecutionGraph, now_ms: f64) -> Self {
        Self {
            running: false,
            now_ms,
            total_ops: 0,
            speed: DEFAULT_SPEED,
            node_status: vec![NodeStatus::Idle; graph.node_count()],
            edge_status: vec![EdgeStatus::Idle; graph.edge_count()],
            edge_flows: vec![None; graph.edge_count()],
        }
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time of the last engine update, in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Ops counted so far in this run.
    pub fn total_ops(&self) -> u64 {
        self.total_ops
    }

    /// Current speed multiplier.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Status of one node; `None` for an ID from another graph.
    pub fn node_status(&self, id: NodeId) -> Option<NodeStatus> {
        self.node_status.get(id.slot()).copied()
    }

    /// Status of one edge; `None` for an ID from another graph.
    pub fn edge_status(&self, id: EdgeId) -> Option<EdgeStatus> {
        self.edge_status.get(id.slot()).copied()
    }

    /// The active flow on an edge, if it is currently flowing.
    pub fn edge_flow(&self, id: EdgeId) -> Option<EdgeFlow> {
        self.edge_flows.get(id.slot()).copied().flatten()
    }

    /// Iterates over every node status.
    pub fn node_statuses(&self) -> impl Iterator<Item = (NodeId, NodeStatus)> + '_ {
        self.node_status
            .iter()
            .enumerate()
            .map(|(i, &s)| (NodeId(i as u32), s))
    }

    /// Iterates over every edge status.
    pub fn edge_statuses(&self) -> impl Iterator<Item = (EdgeId, EdgeStatus)> + '_ {
        self.edge_status
            .iter()
            .enumerate()
            .map(|(i, &s)| (EdgeId(i as u32), s))
    }

    /// Iterates over edges that are currently flowing.
    pub fn edge_flows(&self) -> impl Iterator<Item = (EdgeId, EdgeFlow)> + '_ {
        self.edge_flows
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.map(|flow| (EdgeId(i as u32), flow)))
    }

    /// Number of nodes with the given status.
    pub fn count_nodes(&self, status: NodeStatus) -> usize {
        self.node_status.iter().filter(|&&s| s == status).count()
    }

    /// `true` once every node and edge is done and no flow remains.
    pub fn is_complete(&self) -> bool {
        self.node_status.iter().all(|&s| s == NodeStatus::Done)
            && self.edge_status.iter().all(|&s| s == EdgeStatus::Done)
            && self.edge_flows.iter().all(Option::is_none)
    }

    /// Returns all per-run fields to idle and zeroes the ops counter.
    ///
    /// Speed is a user setting and survives.
    pub(crate) fn clear_run(&mut self) {
        self.running = false;
        self.total_ops = 0;
        self.node_status.fill(NodeStatus::Idle);
        self.edge_status.fill(EdgeStatus::Idle);
        self.edge_flows.fill(None);
    }

    /// Moves a node forward. Returns `false` if the ID is unknown.
    ///
    /// A backwards move is ignored.
    pub(crate) fn promote_node(&mut self, id: NodeId, status: NodeStatus) -> bool {
        match self.node_status.get_mut(id.slot()) {
            Some(slot) => {
                debug_assert!(*slot <= status, "node {id} moved back from {slot:?}");
                if *slot < status {
                    *slot = status;
                }
                true
            }
            None => false,
        }
    }

    /// Moves an edge forward. Returns `false` if the ID is unknown.
    pub(crate) fn promote_edge(&mut self, id: EdgeId, status: EdgeStatus) -> bool {
        match self.edge_status.get_mut(id.slot()) {
            Some(slot) => {
                debug_assert!(*slot <= status, "edge {id} moved back from {slot:?}");
                if *slot < status {
                    *slot = status;
                }
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_flow(&mut self, id: EdgeId, flow: Option<EdgeFlow>) {
        if let Some(slot) = self.edge_flows.get_mut(id.slot()) {
            *slot = flow;
        }
    }
}
