//! Property-based tests for the keypath timeline.
//!
//! Generates random linear graphs, speeds, and polling schedules and checks
//! completion, monotonic status progress, ops bounds, and reset behaviour.

use proptest::prelude::*;
use keypath_core::{
    EdgeStatus, EventTiming, ExecutionGraph, GraphBuilder, GraphNode, LcgJitter, NodeKind,
    NoJitter, NodeStatus, SimulationState, Timeline, clamp_speed,
};

/// `(base_latency_ms, ops_cost)` per node plus one latency per edge.
fn graph_strategy() -> impl Strategy<Value = (Vec<(f64, u64)>, Vec<f64>)> {
    prop::collection::vec((0.0f64..200.0, 0u64..5_000), 1..12).prop_flat_map(|nodes| {
        let edges = nodes.len() - 1;
        (
            Just(nodes),
            prop::collection::vec(0.0f64..300.0, edges..=edges),
        )
    })
}

fn build(nodes: &[(f64, u64)], edges: &[f64]) -> ExecutionGraph {
    GraphBuilder::linear(
        nodes.iter().enumerate().map(|(i, &(latency, ops))| {
            GraphNode::new(format!("n{i}"), NodeKind::ALL[i % 4])
                .with_latency(latency)
                .with_ops(ops)
        }),
        |i| edges[i],
    )
    .expect("generated graph is a valid path")
}

fn assert_not_regressed(
    prev: &SimulationState,
    next: &SimulationState,
) -> Result<(), TestCaseError> {
    for ((id, a), (_, b)) in prev.node_statuses().zip(next.node_statuses()) {
        prop_assert!(a <= b, "node {} went from {:?} to {:?}", id, a, b);
    }
    for ((id, a), (_, b)) in prev.edge_statuses().zip(next.edge_statuses()) {
        prop_assert!(a <= b, "edge {} went from {:?} to {:?}", id, a, b);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Polling at random intervals always reaches a complete, stopped state
    /// and statuses never move backwards along the way.
    #[test]
    fn run_completes_monotonically(
        (nodes, edges) in graph_strategy(),
        speed in 0.0f64..5.0,
        seed in any::<u32>(),
        steps in prop::collection::vec(0.0f64..80.0, 1..64),
    ) {
        let graph = build(&nodes, &edges);
        let mut timeline = Timeline::seeded(graph, seed, 0.0);
        timeline.set_speed(speed);
        prop_assert!(timeline.start(0.0));

        let mut now = 0.0;
        let mut prev = timeline.snapshot();
        for dt in steps {
            now += dt;
            let next = timeline.advance(now).clone();
            assert_not_regressed(&prev, &next)?;
            for (edge, flow) in next.edge_flows() {
                prop_assert_eq!(next.edge_status(edge), Some(EdgeStatus::Flowing));
                prop_assert!(flow.duration_ms >= 0.0);
            }
            prev = next;
        }

        let end = timeline.advance(f64::MAX);
        prop_assert!(!end.is_running());
        prop_assert!(end.is_complete());
        prop_assert_eq!(end.edge_flows().count(), 0);
        prop_assert!(!timeline.has_pending_work());
    }

    /// Total ops land in `[Σ ops, Σ ops · 1.3)` (exactly Σ when every cost
    /// is too small to jitter).
    #[test]
    fn total_ops_within_jitter_bounds(
        (nodes, edges) in graph_strategy(),
        seed in any::<u32>(),
    ) {
        let graph = build(&nodes, &edges);
        let sum = graph.total_ops_cost();
        let mut timeline = Timeline::seeded(graph, seed, 0.0);
        timeline.start(0.0);
        let total = timeline.advance(f64::MAX).total_ops();

        prop_assert!(total >= sum);
        let jitter_cap: u64 = nodes
            .iter()
            .map(|&(_, ops)| ((ops as f64 * 0.3).max(1.0).ceil()) as u64)
            .sum();
        prop_assert!(total < sum + jitter_cap.max(1), "total {} sum {}", total, sum);
        if sum > 0 {
            prop_assert!((total as f64) < sum as f64 * 1.3 + nodes.len() as f64);
        }
    }

    /// Reset from any point yields the idle state.
    #[test]
    fn reset_from_anywhere_is_idle(
        (nodes, edges) in graph_strategy(),
        at in 0.0f64..2_000.0,
    ) {
        let graph = build(&nodes, &edges);
        let mut timeline = Timeline::with_jitter(graph, LcgJitter::default(), 0.0);
        timeline.start(0.0);
        timeline.advance(at);
        timeline.reset(at);

        let s = timeline.state();
        prop_assert!(!s.is_running());
        prop_assert_eq!(s.total_ops(), 0);
        prop_assert!(s.node_statuses().all(|(_, st)| st == NodeStatus::Idle));
        prop_assert!(s.edge_statuses().all(|(_, st)| st == EdgeStatus::Idle));
        prop_assert_eq!(s.edge_flows().count(), 0);
        prop_assert_eq!(timeline.pending_events(), 0);
    }

    /// Speeds are always clamped into `[0.5, 3]`, and anything at or above 3
    /// schedules identically to 3.
    #[test]
    fn speed_clamping(value in prop::num::f64::ANY) {
        let applied = clamp_speed(value);
        prop_assert!((0.5..=3.0).contains(&applied));
        if value.is_finite() && value >= 3.0 {
            prop_assert_eq!(applied, 3.0);
        }
    }

    /// Run duration equals the critical path divided by speed.
    #[test]
    fn run_duration_scales_with_speed(
        (nodes, edges) in graph_strategy(),
        speed in 0.5f64..3.0,
    ) {
        let graph = build(&nodes, &edges);
        let expected = graph.critical_path_ms() / speed;
        let mut timeline = Timeline::new(graph, 0.0);
        timeline.set_speed(speed);
        timeline.start(0.0);

        let mut last = 0.0;
        while let Some(at) = timeline.step() {
            last = at;
        }
        prop_assert!(
            (last - expected).abs() < 1e-6 * expected.max(1.0),
            "ended at {} expected {}",
            last,
            expected
        );
        prop_assert!(timeline.state().is_complete());
    }

    /// Polling late never completes a run earlier than due-time application,
    /// which in turn never completes before the critical path.
    #[test]
    fn late_polls_only_delay(
        (nodes, edges) in graph_strategy(),
        steps in prop::collection::vec(0.1f64..80.0, 1..64),
    ) {
        let graph = build(&nodes, &edges);
        let critical = graph.critical_path_ms();
        let tolerance = 1e-9 * critical.max(1.0);

        // First time the run is seen complete: random polls, then event steps.
        let completed_at = |timing: EventTiming| {
            let mut timeline =
                Timeline::with_jitter(graph.clone(), NoJitter, 0.0).with_timing(timing);
            timeline.start(0.0);
            let mut now = 0.0;
            for dt in &steps {
                if timeline.advance(now).is_complete() {
                    return now;
                }
                now += dt;
            }
            while let Some(at) = timeline.step() {
                if timeline.state().is_complete() {
                    return at;
                }
            }
            timeline.state().now_ms()
        };

        let logical = completed_at(EventTiming::Logical);
        let polled = completed_at(EventTiming::Poll);
        prop_assert!(logical + tolerance >= critical, "logical {} critical {}", logical, critical);
        prop_assert!(polled + tolerance >= logical, "polled {} logical {}", polled, logical);
    }
}
