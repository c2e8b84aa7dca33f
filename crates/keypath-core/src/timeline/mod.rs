//! Discrete-event timeline for animating an execution graph.
//!
//! The timeline module turns a static [`ExecutionGraph`](crate::ExecutionGraph)
//! into per-frame status a renderer can draw:
//!
//! - [`EventQueue`] - min-heap of [`ScheduledEvent`]s, ascending due time with
//!   insertion-order ties.
//! - [`Timeline`] - the four-event state machine plus the `start` / `reset` /
//!   `set_speed` / `advance` command surface. [`EventTiming`] picks whether
//!   events apply at the polled time or at their due time.
//! - [`SimulationState`] - the snapshot renderers read: run flag, clock, ops
//!   counter, speed, node and edge status, active [`EdgeFlow`]s.
//!
//! Nothing here reads a clock. Every operation takes the current time in
//! milliseconds; [`FrameDriver`](crate::FrameDriver) supplies it from a
//! [`Clock`](crate::Clock).

mod engine;
pub mod event;
pub mod queue;
pub mod state;

pub use engine::{EventTiming, Timeline};
pub use event::{EventKind, ScheduledEvent};
pub use queue::EventQueue;
pub use state::{
    DEFAULT_SPEED, EdgeFlow, EdgeStatus, MAX_SPEED, MIN_SPEED, NodeStatus, SimulationState,
    clamp_speed,
};
