//! Time-ordered event queue.
//!
//! [`EventQueue`] is a min-heap keyed by `(due_at_ms, sequence)`. The sequence
//! number is assigned at push time, so events due at the same instant pop in
//! insertion order. Due times compare with [`f64::total_cmp`].

#[cfg(not(feature = "std"))]
use alloc::{collections::BinaryHeap, vec::Vec};
use core::cmp::Ordering;
#[cfg(feature = "std")]
use std::collections::BinaryHeap;

use super::event::ScheduledEvent;

#[derive(Debug)]
struct Entry {
    seq: u64,
    event: ScheduledEvent,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap, the earliest event must sit on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .event
            .due_at_ms
            .total_cmp(&self.event.due_at_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of future events, delivered in ascending due time.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an event.
    pub fn push(&mut self, event: ScheduledEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { seq, event });
    }

    /// Returns the earliest event without removing it.
    pub fn peek(&self) -> Option<&ScheduledEvent> {
        self.heap.peek().map(|e| &e.event)
    }

    /// Due time of the earliest event.
    pub fn next_due_at(&self) -> Option<f64> {
        self.peek().map(|e| e.due_at_ms)
    }

    /// Removes and returns the earliest event if it is due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<ScheduledEvent> {
        if self.next_due_at()? <= now_ms {
            self.heap.pop().map(|e| e.event)
        } else {
            None
        }
    }

    /// Removes and returns every event due at or before `now_ms`, earliest first.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<ScheduledEvent> {
        let mut due = Vec::new();
        while let Some(event) = self.pop_due(now_ms) {
            due.push(event);
        }
        due
    }

    /// Discards all pending events.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Returns the number of pending events.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
