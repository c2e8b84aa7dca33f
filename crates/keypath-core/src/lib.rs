//! Keypath Core - discrete-event timeline for the keystroke path
//!
//! This crate animates a fixed, linear chain of stages (keyboard → controller →
//! interrupt → kernel → scheduler → application → CPU pipeline) over time,
//! independent of any renderer. Renderers read a [`SimulationState`] each
//! frame and draw it however they like.
//!
//! # Core Abstractions
//!
//! ## Graph Model
//!
//! - [`GraphBuilder`] - Collects nodes and edges, validates a single simple path
//! - [`ExecutionGraph`] - Immutable path with per-node latency and op cost
//!
//! ## Timeline
//!
//! - [`EventQueue`] - Min-heap of [`ScheduledEvent`]s by due time
//! - [`Timeline`] - Four-event state machine with `start` / `reset` / `set_speed` / `advance`
//! - [`SimulationState`] - The snapshot renderers consume
//!
//! ## Driving
//!
//! - [`FrameDriver`] - Advances a timeline once per frame, idles when done
//! - [`Clock`] - Time source ([`MonotonicClock`], [`ManualClock`])
//! - [`FrameScheduler`] - Host frame callback ([`PendingFrame`]), keyed by [`FrameToken`]
//! - [`JitterSource`] - Cosmetic ops variance ([`LcgJitter`], [`NoJitter`])
//!
//! # no_std Support
//!
//! The crate is `no_std` compatible with `alloc`. Disable the default `std`
//! feature; [`MonotonicClock`] is then unavailable.
//!
//! ```toml
//! [dependencies]
//! keypath-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use keypath_core::graph::{GraphBuilder, GraphNode, NodeKind};
//! use keypath_core::{NoJitter, NodeStatus, Timeline};
//!
//! let graph = GraphBuilder::linear(
//!     [
//!         GraphNode::new("keyboard", NodeKind::Hardware).with_latency(10.0).with_ops(400),
//!         GraphNode::new("isr", NodeKind::Kernel).with_latency(10.0).with_ops(600),
//!     ],
//!     |_| 5.0,
//! )?;
//! let isr = graph.node_by_key("isr").unwrap();
//!
//! let mut timeline = Timeline::with_jitter(graph, NoJitter, 0.0);
//! timeline.start(0.0);
//! timeline.advance(0.0);
//!
//! // Polled 2ms late: the keyboard completes at 12 rather than 10.
//! assert_eq!(timeline.advance(12.0).node_status(isr), Some(NodeStatus::Queued));
//!
//! while timeline.step().is_some() {}
//! let done = timeline.state();
//! assert!(done.is_complete());
//! assert_eq!(done.now_ms(), 27.0);
//! assert_eq!(done.total_ops(), 1_000);
//! # Ok::<(), keypath_core::GraphError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod clock;
pub mod driver;
pub mod graph;
pub mod jitter;
pub mod timeline;

// Re-export main types at crate root
#[cfg(feature = "std")]
pub use clock::MonotonicClock;
pub use clock::{Clock, ManualClock};
pub use driver::{FrameDriver, FrameOutcome, FrameScheduler, FrameToken, PendingFrame};
pub use graph::{
    EdgeId, ExecutionGraph, GraphBuilder, GraphEdge, GraphError, GraphNode, NodeId, NodeKind,
};
pub use jitter::{JitterSource, LcgJitter, NoJitter};
pub use timeline::{
    DEFAULT_SPEED, EdgeFlow, EdgeStatus, EventKind, EventQueue, EventTiming, MAX_SPEED, MIN_SPEED,
    NodeStatus, ScheduledEvent, SimulationState, Timeline, clamp_speed,
};
