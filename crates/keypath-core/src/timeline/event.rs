//! Scheduled state-transition events.

use crate::graph::{EdgeId, NodeId};

/// What a [`ScheduledEvent`] does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Node starts processing: status → `active`, ops counted.
    NodeActivate(NodeId),
    /// Node finishes processing: status → `done`.
    NodeComplete(NodeId),
    /// Signal leaves along an edge: edge → `flowing`, destination → `queued`.
    EdgeFlowStart(EdgeId),
    /// Signal arrives at the edge's destination: edge → `done`.
    EdgeFlowEnd(EdgeId),
}

impl EventKind {
    /// Upper-snake name, matching the transition table.
    pub fn name(self) -> &'static str {
        match self {
            Self::NodeActivate(_) => "NODE_ACTIVATE",
            Self::NodeComplete(_) => "NODE_COMPLETE",
            Self::EdgeFlowStart(_) => "EDGE_FLOW_START",
            Self::EdgeFlowEnd(_) => "EDGE_FLOW_END",
        }
    }

    /// The node this event targets, if any.
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::NodeActivate(id) | Self::NodeComplete(id) => Some(id),
            Self::EdgeFlowStart(_) | Self::EdgeFlowEnd(_) => None,
        }
    }

    /// The edge this event targets, if any.
    pub fn edge(self) -> Option<EdgeId> {
        match self {
            Self::EdgeFlowStart(id) | Self::EdgeFlowEnd(id) => Some(id),
            Self::NodeActivate(_) | Self::NodeComplete(_) => None,
        }
    }
}

/// A future state transition.
///
/// Owned by the [`EventQueue`](super::EventQueue) until popped; never mutated
/// after it is pushed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledEvent {
    /// Time at which the event fires, in milliseconds.
    pub due_at_ms: f64,
    /// The transition to apply.
    pub kind: EventKind,
}

impl ScheduledEvent {
    /// Creates an event firing at `due_at_ms`.
    pub fn new(due_at_ms: f64, kind: EventKind) -> Self {
        Self { due_at_ms, kind }
    }
}
