//! Graph node types for the execution path.
//!
//! Each stage of the keystroke path is a [`GraphNode`] addressed by a
//! [`NodeId`]. Nodes carry the timing and cost constants the timeline engine
//! reads when a node is activated, plus display metadata (label, tooltip,
//! layout position) that the engine never interprets.

#[cfg(not(feature = "std"))]
use alloc::string::String;

/// Unique identifier for a node in an [`ExecutionGraph`](super::ExecutionGraph).
///
/// Node IDs are dense indices assigned in insertion order by
/// [`GraphBuilder`](super::GraphBuilder). They are only meaningful for the graph
/// that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
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

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Category of a stage in the keystroke path.
///
/// The set is closed: renderers map each kind to a colour or panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Physical devices and interrupt lines.
    Hardware,
    /// Kernel code: interrupt service routines, scheduler.
    Kernel,
    /// User-space application logic.
    Application,
    /// CPU pipeline stages (fetch, decode, execute).
    Cpu,
}

impl NodeKind {
    /// All kinds, in pipeline order.
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Hardware,
        NodeKind::Kernel,
        NodeKind::Application,
        NodeKind::Cpu,
    ];

    /// Lowercase name used in graph files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::Kernel => "kernel",
            Self::Application => "application",
            Self::Cpu => "cpu",
        }
    }

    /// Parses a lowercase kind name. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl core::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage of the execution path.
///
/// Immutable once the graph is built.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    /// Stable string identifier (e.g. `"keyboard"`).
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Stage category.
    pub kind: NodeKind,
    /// Explanation shown on hover.
    pub tooltip: String,
    /// Processing time once the node is activated, in milliseconds at speed 1.
    pub base_latency_ms: f64,
    /// Nominal unit-of-work count, for display only.
    pub ops_cost: u64,
    /// Layout hint `[x, y]` for renderers.
    pub position: [f32; 2],
}

impl GraphNode {
    /// Creates a node with empty label and tooltip, zero cost and zero latency.
    ///
    /// The label defaults to the key.
    pub fn new(key: impl Into<String>, kind: NodeKind) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            kind,
            tooltip: String::new(),
            base_latency_ms: 0.0,
            ops_cost: 0,
            position: [0.0, 0.0],
        }
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the tooltip text.
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = tooltip.into();
        self
    }

    /// Sets the processing latency in milliseconds.
    pub fn with_latency(mut self, base_latency_ms: f64) -> Self {
        self.base_latency_ms = base_latency_ms;
        self
    }

    /// Sets the nominal op cost.
    pub fn with_ops(mut self, ops_cost: u64) -> Self {
        self.ops_cost = ops_cost;
        self
    }

    /// Sets the layout position.
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(NodeKind::from_name("gpu"), None);
    }

    #[test]
    fn label_defaults_to_key() {
        let node = GraphNode::new("scheduler", NodeKind::Kernel);
        assert_eq!(node.label, "scheduler");
        assert_eq!(node.ops_cost, 0);
    }
}
