//! Frame driver - polls the timeline once per display frame.
//!
//! [`FrameDriver`] glues a [`Timeline`] to a [`Clock`] and a
//! [`FrameScheduler`]. Every request carries a [`FrameToken`]; the host hands
//! it back to [`on_frame()`](FrameDriver::on_frame) when the callback fires.
//! The driver advances the timeline to the clock's current time and asks for
//! another frame only while work remains. A finished or reset timeline
//! therefore stops costing frames, and [`start()`](FrameDriver::start) wakes
//! the loop again.
//!
//! At most one frame request is outstanding at any time. Only the token of
//! the outstanding request consumes it; a stale or duplicated token still
//! advances the timeline but never issues a second request. Out-of-band
//! updates (input handlers, nested callbacks) use
//! [`refresh()`](FrameDriver::refresh), which leaves requests alone.
//! Mutating methods all take `&mut self`, so `advance` can't re-enter itself;
//! hosts that poll from another thread wrap the driver in a `Mutex`.
//!
//! ```rust
//! use keypath_core::graph::{GraphBuilder, GraphNode, NodeKind};
//! use keypath_core::{FrameDriver, FrameOutcome, ManualClock, PendingFrame, Timeline};
//!
//! let graph = GraphBuilder::linear(
//!     ["key", "isr"].map(|k| GraphNode::new(k, NodeKind::Kernel).with_latency(8.0)),
//!     |_| 4.0,
//! )?;
//! let clock = ManualClock::new(0.0);
//! let mut driver = FrameDriver::new(Timeline::new(graph, 0.0), clock.clone(), PendingFrame::new());
//!
//! driver.start();
//! let mut frames = 0;
//! while let Some(outcome) = driver.poll() {
//!     frames += 1;
//!     if outcome == FrameOutcome::Idle {
//!         break;
//!     }
//!     clock.advance_by(16.0);
//! }
//! assert!(driver.state().is_complete());
//! // key 0..8 seen at 16, flow 16..20 seen at 32, isr 32..40 seen at 48.
//! assert_eq!(frames, 4);
//! # Ok::<(), keypath_core::GraphError>(())
//! ```

use crate::clock::Clock;
use crate::jitter::{JitterSource, LcgJitter};
use crate::timeline::{SimulationState, Timeline};

/// Identifies one frame request.
///
/// Issued by the driver with each request; the host passes it back to
/// [`FrameDriver::on_frame`] when the callback fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

/// Host-side mechanism that calls [`FrameDriver::on_frame`] later.
///
/// Implementations wrap whatever periodic callback the host has: a display
/// refresh callback, a timer, or a sleeping loop.
pub trait FrameScheduler {
    /// Arranges for one future call to [`FrameDriver::on_frame`] with `frame`.
    fn request_frame(&mut self, frame: FrameToken);

    /// Withdraws the request for `frame`, if the host supports it.
    fn cancel_frame(&mut self, _frame: FrameToken) {}
}

/// Flag-based scheduler for hosts that run their own loop.
///
/// The host checks [`take()`](Self::take) each cycle (or uses
/// [`FrameDriver::poll`]) and runs a frame when it returns a token.
#[derive(Clone, Debug, Default)]
pub struct PendingFrame {
    requested: Option<FrameToken>,
    requests: u64,
}

impl PendingFrame {
    /// Creates a scheduler with nothing requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a frame is currently requested.
    pub fn is_requested(&self) -> bool {
        self.requested.is_some()
    }

    /// Consumes the outstanding request.
    pub fn take(&mut self) -> Option<FrameToken> {
        self.requested.take()
    }

    /// Total number of requests received.
    pub fn request_count(&self) -> u64 {
        self.requests
    }
}

impl FrameScheduler for PendingFrame {
    fn request_frame(&mut self, frame: FrameToken) {
        self.requested = Some(frame);
        self.requests += 1;
    }

    fn cancel_frame(&mut self, frame: FrameToken) {
        if self.requested == Some(frame) {
            self.requested = None;
        }
    }
}

/// What the driver wants after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Work remains; another frame was requested.
    Continue,
    /// Nothing left to do; no frame requested.
    Idle,
}

/// Drives a [`Timeline`] from a clock and a frame scheduler.
pub struct FrameDriver<C, S, J = LcgJitter> {
    timeline: Timeline<J>,
    clock: C,
    scheduler: S,
    pending: Option<FrameToken>,
    next_token: u64,
}

impl<C: Clock, S: FrameScheduler, J: JitterSource> FrameDriver<C, S, J> {
    /// Wraps a timeline. No frame is requested until [`start()`](Self::start).
    pub fn new(timeline: Timeline<J>, clock: C, scheduler: S) -> Self {
        Self {
            timeline,
            clock,
            scheduler,
            pending: None,
            next_token: 0,
        }
    }

    /// The driven timeline.
    pub fn timeline(&self) -> &Timeline<J> {
        &self.timeline
    }

    /// Current simulation state.
    pub fn state(&self) -> &SimulationState {
        self.timeline.state()
    }

    /// The clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The frame scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable access to the frame scheduler.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Whether a frame request is outstanding.
    pub fn is_frame_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Token of the outstanding frame request.
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Starts a run at the clock's current time and wakes the frame loop.
    ///
    /// Returns `false` if a run was already in progress (nothing changes).
    pub fn start(&mut self) -> bool {
        let started = self.timeline.start(self.clock.now_ms());
        if self.timeline.has_pending_work() {
            self.request_frame();
        }
        started
    }

    /// Cancels the run and the outstanding frame request.
    pub fn reset(&mut self) {
        self.timeline.reset(self.clock.now_ms());
        self.cancel_frame();
    }

    /// Sets the speed multiplier for events scheduled from now on.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.timeline.set_speed(speed)
    }

    /// Frame callback: advances the timeline to the clock's time.
    ///
    /// `frame` consumes the outstanding request only if it is that request's
    /// token. A new request is issued while the timeline has work and none is
    /// outstanding; once the timeline is idle any outstanding request is
    /// cancelled.
    pub fn on_frame(&mut self, frame: FrameToken) -> FrameOutcome {
        if self.pending == Some(frame) {
            self.pending = None;
        }
        self.refresh()
    }

    /// Advances the timeline to the clock's time outside the frame callback.
    ///
    /// Never consumes the outstanding request, so it can't double-schedule.
    pub fn refresh(&mut self) -> FrameOutcome {
        self.timeline.advance(self.clock.now_ms());
        if self.timeline.has_pending_work() {
            self.request_frame();
            FrameOutcome::Continue
        } else {
            self.cancel_frame();
            FrameOutcome::Idle
        }
    }

    fn request_frame(&mut self) {
        if self.pending.is_none() {
            let frame = FrameToken(self.next_token);
            self.next_token = self.next_token.wrapping_add(1);
            self.pending = Some(frame);
            self.scheduler.request_frame(frame);
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(frame) = self.pending.take() {
            self.scheduler.cancel_frame(frame);
        }
    }
}

impl<C: Clock, J: JitterSource> FrameDriver<C, PendingFrame, J> {
    /// Runs one frame if one is requested.
    ///
    /// Returns `None` when the loop is idle.
    pub fn poll(&mut self) -> Option<FrameOutcome> {
        let frame = self.scheduler.take()?;
        Some(self.on_frame(frame))
    }
}
