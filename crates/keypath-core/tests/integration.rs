//! Integration tests for keypath-core.
//!
//! Exercise the graph, timeline, and frame driver together through the public
//! API only.

use std::sync::{Arc, Mutex};

use keypath_core::{
    EdgeStatus, EventKind, EventTiming, ExecutionGraph, FrameDriver, FrameOutcome, FrameScheduler,
    FrameToken, GraphBuilder, GraphNode, ManualClock, NoJitter, NodeKind, NodeStatus,
    PendingFrame, SimulationState, Timeline,
};

/// A→B→C: node latencies 10ms, edge latencies 5ms.
fn abc() -> ExecutionGraph {
    GraphBuilder::linear(
        ["a", "b", "c"].map(|k| {
            GraphNode::new(k, NodeKind::Hardware)
                .with_latency(10.0)
                .with_ops(100)
        }),
        |_| 5.0,
    )
    .expect("valid path")
}

fn node(state: &SimulationState, graph: &ExecutionGraph, key: &str) -> NodeStatus {
    state
        .node_status(graph.node_by_key(key).unwrap())
        .unwrap()
}

fn edge(state: &SimulationState, graph: &ExecutionGraph, key: &str) -> EdgeStatus {
    state
        .edge_status(graph.edge_by_key(key).unwrap())
        .unwrap()
}

#[test]
fn test_abc_walkthrough_millisecond_polling() {
    let graph = Arc::new(abc());
    let mut timeline = Timeline::with_jitter(Arc::clone(&graph), NoJitter, 0.0);
    timeline.start(0.0);

    let mut log = Vec::new();
    let mut prev = timeline.snapshot();
    for t in 0..=45 {
        let state = timeline.advance(f64::from(t)).clone();
        for ((id, before), (_, after)) in prev.node_statuses().zip(state.node_statuses()) {
            if before != after {
                log.push((t, graph.node(id).unwrap().key.clone(), after));
            }
        }
        prev = state;
    }

    let expected = [
        (0, "a", NodeStatus::Active),
        (10, "a", NodeStatus::Done),
        (10, "b", NodeStatus::Queued),
        (15, "b", NodeStatus::Active),
        (25, "b", NodeStatus::Done),
        (25, "c", NodeStatus::Queued),
        (30, "c", NodeStatus::Active),
        (40, "c", NodeStatus::Done),
    ];
    let log: Vec<(i32, &str, NodeStatus)> =
        log.iter().map(|(t, k, s)| (*t, k.as_str(), *s)).collect();
    assert_eq!(log, expected);
    assert!(!prev.is_running());
}

#[test]
fn test_abc_edges_and_stop() {
    let graph = abc();
    let mut timeline = Timeline::with_jitter(graph.clone(), NoJitter, 0.0);
    timeline.start(0.0);
    timeline.advance(0.0);

    let s = timeline.advance(10.0).clone();
    assert_eq!(edge(&s, &graph, "a->b"), EdgeStatus::Flowing);
    assert_eq!(edge(&s, &graph, "b->c"), EdgeStatus::Idle);

    timeline.advance(15.0);
    let s = timeline.advance(25.0).clone();
    assert_eq!(edge(&s, &graph, "a->b"), EdgeStatus::Done);
    assert_eq!(edge(&s, &graph, "b->c"), EdgeStatus::Flowing);
    assert_eq!(node(&s, &graph, "c"), NodeStatus::Queued);

    timeline.advance(30.0);
    let s = timeline.advance(39.0).clone();
    assert!(s.is_running());
    assert_eq!(node(&s, &graph, "c"), NodeStatus::Active);

    let s = timeline.advance(40.0).clone();
    assert!(!s.is_running());
    assert!(s.is_complete());
    assert_eq!(s.total_ops(), 300);
}

#[test]
fn test_speed_change_leaves_queued_events_alone() {
    let graph = abc();
    let mut timeline = Timeline::with_jitter(graph, NoJitter, 0.0);
    timeline.start(0.0);
    timeline.advance(0.0);
    timeline.advance(10.0);
    // A→B flow already scheduled to end at 15.
    assert_eq!(timeline.next_due_at(), Some(15.0));

    timeline.set_speed(2.0);
    assert_eq!(timeline.next_due_at(), Some(15.0));

    // B now takes 5ms, the B→C flow 2.5ms, C 5ms.
    timeline.advance(15.0);
    assert_eq!(timeline.next_due_at(), Some(20.0));
    timeline.advance(20.0);
    timeline.advance(22.5);
    assert!(timeline.advance(27.4).is_running());
    assert!(!timeline.advance(27.5).is_running());
}

#[test]
fn test_flow_progress_tracks_time() {
    let graph = abc();
    let ab = graph.edge_by_key("a->b").unwrap();
    let mut timeline = Timeline::with_jitter(graph, NoJitter, 0.0);
    timeline.start(0.0);
    timeline.advance(0.0);
    timeline.advance(10.0);

    let s = timeline.advance(12.5);
    let flow = s.edge_flow(ab).expect("a->b is flowing");
    assert_eq!(flow.progress(s.now_ms()), 0.5);
}

#[test]
fn test_coarse_polling_stretches_run() {
    let run = |timing: EventTiming| {
        let mut timeline = Timeline::with_jitter(abc(), NoJitter, 0.0).with_timing(timing);
        timeline.start(0.0);
        let mut now = 0.0;
        while timeline.has_pending_work() {
            timeline.advance(now);
            now += 16.0;
        }
        timeline.state().now_ms()
    };
    // Each stage and flow waits for the next 16ms poll.
    assert_eq!(run(EventTiming::Poll), 80.0);
    // Due-time application finishes on the first poll after 40ms.
    assert_eq!(run(EventTiming::Logical), 48.0);
}

#[test]
fn test_start_twice_keeps_run() {
    let graph = abc();
    let mut timeline = Timeline::with_jitter(graph.clone(), NoJitter, 0.0);
    timeline.start(0.0);
    for t in [0.0, 10.0, 15.0, 20.0] {
        timeline.advance(t);
    }

    assert!(!timeline.start(20.0));
    let s = timeline.advance(20.0);
    assert_eq!(node(s, &graph, "a"), NodeStatus::Done);
    assert_eq!(node(s, &graph, "b"), NodeStatus::Active);
    assert_eq!(s.total_ops(), 200);
}

#[test]
fn test_event_kind_accessors() {
    let graph = abc();
    let a = graph.start();
    let ab = graph.outgoing(a).unwrap();
    assert_eq!(EventKind::NodeActivate(a).name(), "NODE_ACTIVATE");
    assert_eq!(EventKind::NodeComplete(a).node(), Some(a));
    assert_eq!(EventKind::EdgeFlowStart(ab).edge(), Some(ab));
    assert_eq!(EventKind::EdgeFlowEnd(ab).node(), None);
}

/// Scheduler that keeps live callbacks in a shared registry, as a host
/// callback list would.
#[derive(Clone, Default)]
struct CountingScheduler {
    outstanding: Arc<Mutex<Vec<FrameToken>>>,
}

impl CountingScheduler {
    fn count(&self) -> usize {
        self.outstanding.lock().unwrap().len()
    }

    /// Removes the oldest live callback, as the host does when firing it.
    fn fire(&self) -> FrameToken {
        self.outstanding.lock().unwrap().remove(0)
    }
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self, frame: FrameToken) {
        self.outstanding.lock().unwrap().push(frame);
    }

    fn cancel_frame(&mut self, frame: FrameToken) {
        self.outstanding.lock().unwrap().retain(|&f| f != frame);
    }
}

fn counting_driver(
    clock: &ManualClock,
) -> (FrameDriver<ManualClock, CountingScheduler, NoJitter>, CountingScheduler) {
    let scheduler = CountingScheduler::default();
    let driver = FrameDriver::new(
        Timeline::with_jitter(abc(), NoJitter, 0.0),
        clock.clone(),
        scheduler.clone(),
    );
    (driver, scheduler)
}

#[test]
fn test_driver_with_host_scheduler() {
    let clock = ManualClock::new(0.0);
    let (mut driver, host) = counting_driver(&clock);

    driver.start();
    assert_eq!(host.count(), 1);

    // Host fires the callback: one request consumed, at most one issued.
    let mut frames = 0;
    loop {
        let frame = host.fire();
        frames += 1;
        match driver.on_frame(frame) {
            FrameOutcome::Continue => assert_eq!(host.count(), 1),
            FrameOutcome::Idle => {
                assert_eq!(host.count(), 0);
                break;
            }
        }
        clock.advance_by(7.0);
    }
    assert!(driver.state().is_complete());
    // Each stage and flow is picked up on the next 7ms frame; C ends at 56.
    assert_eq!(frames, 9);

    // Restart after idle resumes polling; reset cancels it.
    assert!(driver.start());
    assert_eq!(host.count(), 1);
    driver.reset();
    assert_eq!(host.count(), 0);
}

#[test]
fn test_reentrant_frame_calls_keep_one_callback() {
    let clock = ManualClock::new(0.0);
    let (mut driver, host) = counting_driver(&clock);

    driver.start();
    let first = host.fire();
    driver.on_frame(first);
    assert_eq!(host.count(), 1);

    // A nested callback replays the consumed token and an input handler
    // refreshes, both while the next frame is still outstanding.
    clock.advance_by(3.0);
    driver.on_frame(first);
    driver.refresh();
    assert_eq!(host.count(), 1);

    // A second start while running schedules nothing either.
    assert!(!driver.start());
    assert_eq!(host.count(), 1);

    let mut frames = 0;
    while host.count() > 0 {
        assert_eq!(host.count(), 1);
        let frame = host.fire();
        driver.on_frame(frame);
        clock.advance_by(5.0);
        frames += 1;
    }
    assert!(driver.state().is_complete());
    assert!(frames > 0);
}

#[test]
fn test_finishing_outside_callback_cancels_request() {
    let clock = ManualClock::new(0.0);
    let (mut driver, host) = counting_driver(&clock);

    driver.start();
    while driver.timeline().has_pending_work() {
        driver.refresh();
        clock.advance_by(5.0);
    }
    assert_eq!(host.count(), 0);
    assert!(!driver.is_frame_pending());
}

#[test]
fn test_driver_shared_across_threads() {
    let clock = ManualClock::new(0.0);
    let driver = Arc::new(Mutex::new(FrameDriver::new(
        Timeline::new(abc(), 0.0),
        clock.clone(),
        PendingFrame::new(),
    )));
    driver.lock().unwrap().start();

    let worker = {
        let driver = Arc::clone(&driver);
        let clock = clock.clone();
        std::thread::spawn(move || {
            loop {
                let outcome = driver.lock().unwrap().poll();
                match outcome {
                    Some(FrameOutcome::Idle) | None => break,
                    Some(FrameOutcome::Continue) => clock.advance_by(5.0),
                }
            }
        })
    };
    worker.join().unwrap();

    let snapshot = driver.lock().unwrap().state().clone();
    assert!(snapshot.is_complete());
}
