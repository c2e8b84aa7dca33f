//! Static execution graph for the keystroke path.
//!
//! The graph module describes *what* the timeline animates: a fixed list of
//! stages ([`GraphNode`]) joined by transitions ([`GraphEdge`]) into one simple
//! path from a start node to a terminal node.
//!
//! # Lifecycle
//!
//! - [`GraphBuilder`] - mutable. Collects nodes and edges, then
//!   [`build()`](GraphBuilder::build) validates the topology (no branching,
//!   merging, cycles, or stray nodes) and fails fast with [`GraphError`].
//! - [`ExecutionGraph`] - immutable snapshot. Shared with the
//!   [`Timeline`](crate::Timeline) via `Arc` and never mutated afterwards.
//!
//! # Example
//!
//! ```rust
//! use keypath_core::graph::{GraphBuilder, GraphNode, NodeKind};
//!
//! let mut builder = GraphBuilder::new();
//! let key = builder.add_node(GraphNode::new("key", NodeKind::Hardware).with_latency(10.0));
//! let isr = builder.add_node(GraphNode::new("isr", NodeKind::Kernel).with_latency(20.0));
//! builder.connect(key, isr, 5.0)?;
//! let graph = builder.build()?;
//!
//! assert_eq!(graph.path(), &[key, isr]);
//! assert_eq!(graph.critical_path_ms(), 35.0);
//! # Ok::<(), keypath_core::GraphError>(())
//! ```

pub mod edge;
mod model;
pub mod node;

pub use edge::{EdgeId, GraphEdge};
pub use model::{ExecutionGraph, GraphBuilder, GraphError};
pub use node::{GraphNode, NodeId, NodeKind};
