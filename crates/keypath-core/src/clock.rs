//! Time sources for the frame driver.
//!
//! The timeline itself is clock-free; a [`Clock`] is only read by
//! [`FrameDriver`](crate::FrameDriver) to stamp commands and frames.
//!
//! - [`MonotonicClock`] - wall time since construction (`std` only).
//! - [`ManualClock`] - a shared, hand-set time for tests and offline runs.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "std")]
use std::sync::Arc;

/// Reader of a monotonic time in milliseconds.
pub trait Clock {
    /// Current time in milliseconds. Must never decrease.
    fn now_ms(&self) -> f64;
}

/// Milliseconds elapsed since the clock was created.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Creates a clock reading zero now.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to a driver.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `start_ms`.
    pub fn new(start_ms: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start_ms.to_bits())),
        }
    }

    /// Sets the time. Earlier values than the current reading are ignored.
    pub fn set(&self, now_ms: f64) {
        if now_ms > self.now_ms() {
            self.bits.store(now_ms.to_bits(), Ordering::SeqCst);
        }
    }

    /// Moves the time forward by `delta_ms`.
    pub fn advance_by(&self, delta_ms: f64) {
        self.set(self.now_ms() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}
