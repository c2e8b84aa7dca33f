//! Graph edge types for the execution path.
//!
//! A [`GraphEdge`] connects two nodes and carries the time a signal needs to
//! travel between them. The timeline engine turns each traversal into an
//! [`EdgeFlow`](crate::timeline::EdgeFlow) that renderers interpolate.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use super::node::NodeId;

/// Unique identifier for an edge in an [`ExecutionGraph`](super::ExecutionGraph).
///
/// Edge IDs are dense indices assigned in connection order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

/// A directed transition between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    /// Stable string identifier, `"<from>-><to>"` by default.
    pub key: String,
    /// Source node.
    pub from: NodeId,
    /// Destination node.
    pub to: NodeId,
    /// Travel time along the edge in milliseconds at speed 1.
    pub latency_ms: f64,
}
