//! Discrete-event timeline engine.
//!
//! [`Timeline`] drives the per-node and per-edge status of one
//! [`ExecutionGraph`] over time. Each stage advance is split into four events
//! so that edge traversals have an explicit start and end a renderer can
//! interpolate between:
//!
//! | Event | Effect | Emits |
//! |---|---|---|
//! | `NodeActivate(n)` | `n` → active, ops counted | `NodeComplete(n)` after `latency / speed` |
//! | `NodeComplete(n)` | `n` → done | `EdgeFlowStart(e)` now, or stop at the terminal |
//! | `EdgeFlowStart(e)` | `e` → flowing, destination → queued | `EdgeFlowEnd(e)` after `latency / speed` |
//! | `EdgeFlowEnd(e)` | `e` → done, flow cleared | `NodeActivate(destination)` now |
//!
//! "Now" in the table is chosen by [`EventTiming`]. By default an event
//! applies at the time `advance` observed it, so a late poll stretches the
//! run the way a dropped frame would. [`EventTiming::Logical`] applies each
//! event at its own due time instead, which makes the run independent of the
//! polling rate. Speed is read when an event is scheduled; queued events keep
//! their due time.
//!
//! ```rust
//! use keypath_core::graph::{GraphBuilder, GraphNode, NodeKind};
//! use keypath_core::{EventTiming, NodeStatus, Timeline};
//!
//! let graph = GraphBuilder::linear(
//!     ["a", "b"].map(|k| GraphNode::new(k, NodeKind::Cpu).with_latency(10.0)),
//!     |_| 5.0,
//! )?;
//! let b = graph.node_by_key("b").unwrap();
//!
//! let mut timeline = Timeline::new(graph.clone(), 0.0);
//! timeline.start(0.0);
//! timeline.advance(0.0);
//! timeline.advance(10.0);
//! assert_eq!(timeline.advance(15.0).node_status(b), Some(NodeStatus::Active));
//! assert!(!timeline.advance(25.0).is_running());
//!
//! // One late poll: a logical timeline still catches up completely.
//! let mut logical = Timeline::new(graph, 0.0).with_timing(EventTiming::Logical);
//! logical.start(0.0);
//! assert!(logical.advance(25.0).is_complete());
//! # Ok::<(), keypath_core::GraphError>(())
//! ```

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use crate::graph::{EdgeId, ExecutionGraph, NodeId};
use crate::jitter::{JitterSource, LcgJitter};

use super::event::{EventKind, ScheduledEvent};
use super::queue::EventQueue;
use super::state::{EdgeFlow, EdgeStatus, NodeStatus, SimulationState, clamp_speed};

/// Which time an event is applied at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EventTiming {
    /// The time passed to [`Timeline::advance`]. Follow-up events are
    /// scheduled from the observed time, so polling late delays the rest of
    /// the run.
    #[default]
    Poll,
    /// The event's own due time, regardless of when it was polled.
    Logical,
}

/// State machine advancing one execution graph through time.
///
/// Generic over the [`JitterSource`] used for ops accounting; the default
/// [`LcgJitter`] is seedable through [`seeded()`](Timeline::seeded).
pub struct Timeline<J = LcgJitter> {
    graph: Arc<ExecutionGraph>,
    queue: EventQueue,
    state: SimulationState,
    jitter: J,
    timing: EventTiming,
}

impl Timeline<LcgJitter> {
    /// Creates an idle timeline with the default jitter seed.
    pub fn new(graph: impl Into<Arc<ExecutionGraph>>, now_ms: f64) -> Self {
        Self::with_jitter(graph, LcgJitter::default(), now_ms)
    }

    /// Creates an idle timeline whose ops jitter is reproducible from `seed`.
    pub fn seeded(graph: impl Into<Arc<ExecutionGraph>>, seed: u32, now_ms: f64) -> Self {
        Self::with_jitter(graph, LcgJitter::new(seed), now_ms)
    }
}

impl<J: JitterSource> Timeline<J> {
    /// Creates an idle timeline with a custom jitter source.
    pub fn with_jitter(graph: impl Into<Arc<ExecutionGraph>>, jitter: J, now_ms: f64) -> Self {
        let graph = graph.into();
        let state = SimulationState::for_graph(&graph, now_ms);
        Self {
            graph,
            queue: EventQueue::new(),
            state,
            jitter,
            timing: EventTiming::default(),
        }
    }

    /// Builder form of [`set_timing()`](Self::set_timing).
    #[must_use]
    pub fn with_timing(mut self, timing: EventTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Selects the time events are applied at. Affects events processed
    /// after this call.
    pub fn set_timing(&mut self, timing: EventTiming) {
        self.timing = timing;
    }

    /// The time events are applied at.
    pub fn timing(&self) -> EventTiming {
        self.timing
    }

    /// The graph being animated.
    pub fn graph(&self) -> &Arc<ExecutionGraph> {
        &self.graph
    }

    /// Borrow of the current state.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Owned copy of the current state, for readers on another thread.
    pub fn snapshot(&self) -> SimulationState {
        self.state.clone()
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Number of scheduled events not yet processed.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the next scheduled event.
    pub fn next_due_at(&self) -> Option<f64> {
        self.queue.next_due_at()
    }

    /// `true` while the run flag is set or events are still queued.
    ///
    /// Frame drivers keep polling while this holds.
    pub fn has_pending_work(&self) -> bool {
        self.state.running || !self.queue.is_empty()
    }

    /// Starts a fresh run at `now_ms`.
    ///
    /// Returns `false` without touching anything if a run is already in
    /// progress. Otherwise clears the queue and all per-run state, sets the
    /// run flag, and schedules the start node's activation at `now_ms`.
    pub fn start(&mut self, now_ms: f64) -> bool {
        if self.state.running {
            return false;
        }
        self.queue.clear();
        self.state.clear_run();
        self.state.running = true;
        self.state.now_ms = now_ms;
        let start = self.graph.start();
        self.schedule(now_ms, EventKind::NodeActivate(start));

        #[cfg(feature = "tracing")]
        tracing::debug!(at = now_ms, start = %start, "timeline started");
        true
    }

    /// Cancels any run: drops every pending event and returns to idle.
    pub fn reset(&mut self, now_ms: f64) {
        self.queue.clear();
        self.state.clear_run();
        self.state.now_ms = now_ms;

        #[cfg(feature = "tracing")]
        tracing::debug!(at = now_ms, "timeline reset");
    }

    /// Sets the speed multiplier and returns the value actually applied.
    ///
    /// Clamped to `[0.5, 3]`; non-finite input falls back to 1. Only events
    /// scheduled after this call see the new speed.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.state.speed = clamp_speed(speed);
        self.state.speed
    }

    /// Processes every event due at or before `now_ms`, earliest first.
    ///
    /// Events emitted while processing are eligible in the same call when
    /// their due time has already passed. With [`EventTiming::Poll`] that
    /// covers follow-ups scheduled "now"; with [`EventTiming::Logical`] every
    /// stage finishing inside the polling interval completes here. Time never
    /// moves backwards: an earlier `now_ms` than the last update processes
    /// nothing.
    pub fn advance(&mut self, now_ms: f64) -> &SimulationState {
        if now_ms > self.state.now_ms {
            self.state.now_ms = now_ms;
        }
        while let Some(event) = self.queue.pop_due(now_ms) {
            self.process(event);
        }
        &self.state
    }

    /// Jumps to the next scheduled event and processes everything due then.
    ///
    /// Polls exactly on each due time, so both timings give the same run.
    /// Returns the time jumped to, or `None` if the queue is empty.
    pub fn step(&mut self) -> Option<f64> {
        let due = self.queue.next_due_at()?;
        let at = due.max(self.state.now_ms);
        self.advance(at);
        Some(at)
    }

    fn schedule(&mut self, due_at_ms: f64, kind: EventKind) {
        self.queue.push(ScheduledEvent::new(due_at_ms, kind));
    }

    fn process(&mut self, event: ScheduledEvent) {
        let t = match self.timing {
            EventTiming::Poll => self.state.now_ms,
            EventTiming::Logical => event.due_at_ms,
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(at = t, event = event.kind.name(), "timeline event");

        match event.kind {
            EventKind::NodeActivate(id) => self.activate_node(id, t),
            EventKind::NodeComplete(id) => self.complete_node(id, t),
            EventKind::EdgeFlowStart(id) => self.start_flow(id, t),
            EventKind::EdgeFlowEnd(id) => self.end_flow(id, t),
        }
    }

    fn activate_node(&mut self, id: NodeId, t: f64) {
        let Some(node) = self.graph.node(id) else {
            drop_event(EventKind::NodeActivate(id));
            return;
        };
        let ops = node.ops_cost;
        let complete_at = t + node.base_latency_ms / self.state.speed;

        self.state.promote_node(id, NodeStatus::Active);
        let jitter = self.jitter.ops_jitter(ops);
        self.state.total_ops = self
            .state
            .total_ops
            .saturating_add(ops)
            .saturating_add(jitter);
        self.schedule(complete_at, EventKind::NodeComplete(id));
    }

    fn complete_node(&mut self, id: NodeId, t: f64) {
        if !self.state.promote_node(id, NodeStatus::Done) {
            drop_event(EventKind::NodeComplete(id));
            return;
        }
        match self.graph.outgoing(id) {
            Some(edge) => self.schedule(t, EventKind::EdgeFlowStart(edge)),
            None => {
                self.state.running = false;
                #[cfg(feature = "tracing")]
                tracing::debug!(at = t, total_ops = self.state.total_ops, "terminal reached");
            }
        }
    }

    fn start_flow(&mut self, id: EdgeId, t: f64) {
        let Some(edge) = self.graph.edge(id) else {
            drop_event(EventKind::EdgeFlowStart(id));
            return;
        };
        let to = edge.to;
        let flow = EdgeFlow {
            start_at_ms: t,
            duration_ms: edge.latency_ms / self.state.speed,
        };

        self.state.promote_edge(id, EdgeStatus::Flowing);
        self.state.set_flow(id, Some(flow));
        self.state.promote_node(to, NodeStatus::Queued);
        self.schedule(flow.end_at_ms(), EventKind::EdgeFlowEnd(id));
    }

    fn end_flow(&mut self, id: EdgeId, t: f64) {
        let Some(edge) = self.graph.edge(id) else {
            drop_event(EventKind::EdgeFlowEnd(id));
            return;
        };
        let to = edge.to;

        self.state.promote_edge(id, EdgeStatus::Done);
        self.state.set_flow(id, None);
        self.schedule(t, EventKind::NodeActivate(to));
    }
}

/// Drops an event whose node or edge is not in the graph; the run carries on.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn drop_event(kind: EventKind) {
    #[cfg(feature = "tracing")]
    tracing::warn!(
        event = kind.name(),
        node = ?kind.node(),
        edge = ?kind.edge(),
        "dropping event for unknown graph element"
    );
}
