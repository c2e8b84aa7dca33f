//! Offline trace command: a deterministic run on a manual clock.

use super::common::{self, GraphArgs, LoadedGraph};
use crate::render::{self, Snapshot};
use clap::Args;
use keypath_core::{
    EventTiming, FrameDriver, FrameOutcome, ManualClock, PendingFrame, SimulationState,
};
use std::io::Write;

#[derive(Args)]
pub struct TraceArgs {
    #[command(flatten)]
    graph: GraphArgs,

    /// Poll every N ms like a renderer instead of jumping between events
    #[arg(long)]
    step_ms: Option<f64>,

    /// With --step-ms, apply events at their due time instead of the frame time
    #[arg(long, requires = "step_ms")]
    logical_time: bool,

    /// Emit one JSON snapshot per line
    #[arg(long)]
    json: bool,
}

pub fn run(args: TraceArgs) -> anyhow::Result<()> {
    let loaded = common::load(&args.graph)?;
    let (initial, states) = match args.step_ms {
        None => by_event(&loaded),
        Some(step) => {
            let timing = if args.logical_time {
                EventTiming::Logical
            } else {
                EventTiming::Poll
            };
            by_frame(&loaded, step, timing)?
        }
    };

    let graph = &loaded.graph;
    let mut out = std::io::stdout().lock();

    if args.json {
        for state in &states {
            writeln!(out, "{}", serde_json::to_string(&Snapshot::capture(graph, state))?)?;
        }
        return Ok(());
    }

    writeln!(
        out,
        "# {} at {:.1}x, seed {}",
        loaded.file.name, loaded.speed, loaded.seed
    )?;
    let mut prev = &initial;
    for state in &states {
        for transition in render::transitions(graph, prev, state) {
            writeln!(out, "{}", transition.line())?;
        }
        prev = state;
    }
    writeln!(
        out,
        "completed at {:.1} ms, {} ops",
        prev.now_ms(),
        prev.total_ops()
    )?;

    Ok(())
}

/// Jumps from one event time to the next, one snapshot per distinct time.
fn by_event(loaded: &LoadedGraph) -> (SimulationState, Vec<SimulationState>) {
    let mut timeline = loaded.timeline(0.0);
    let initial = timeline.snapshot();
    timeline.start(0.0);

    let mut states = Vec::new();
    while timeline.step().is_some() {
        states.push(timeline.snapshot());
    }
    (initial, states)
}

/// Polls a frame driver on a manual clock every `step_ms`.
fn by_frame(
    loaded: &LoadedGraph,
    step_ms: f64,
    timing: EventTiming,
) -> anyhow::Result<(SimulationState, Vec<SimulationState>)> {
    if !step_ms.is_finite() || step_ms <= 0.0 {
        anyhow::bail!("--step-ms must be a positive number, got {}", step_ms);
    }

    let clock = ManualClock::new(0.0);
    let timeline = loaded.timeline(0.0).with_timing(timing);
    let mut driver = FrameDriver::new(timeline, clock.clone(), PendingFrame::new());
    let initial = driver.state().clone();
    driver.start();

    let mut states = Vec::new();
    while let Some(outcome) = driver.poll() {
        states.push(driver.state().clone());
        if outcome == FrameOutcome::Idle {
            break;
        }
        clock.advance_by(step_ms);
    }
    Ok((initial, states))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enter_key() -> LoadedGraph {
        common::load(&GraphArgs {
            graph: "enter_key".to_string(),
            speed: None,
            seed: Some(9),
        })
        .unwrap()
    }

    #[test]
    fn test_by_event_ends_at_critical_path() {
        let loaded = enter_key();
        let (initial, states) = by_event(&loaded);
        assert!(!initial.is_running());
        let last = states.last().unwrap();
        assert!(last.is_complete());
        assert_eq!(last.now_ms(), loaded.graph.critical_path_ms());
    }

    #[test]
    fn test_by_frame_polls_on_grid() {
        let loaded = enter_key();
        let (_, states) = by_frame(&loaded, 100.0, EventTiming::Logical).unwrap();
        assert!(states.iter().all(|s| s.now_ms() % 100.0 == 0.0));
        let last = states.last().unwrap();
        assert!(last.is_complete());
        // 3250 ms path, first frame at 0: done on the frame at 3300.
        assert_eq!(states.len(), 34);
    }

    #[test]
    fn test_by_frame_poll_timing_waits_for_frames() {
        let loaded = enter_key();
        let (_, states) = by_frame(&loaded, 100.0, EventTiming::Poll).unwrap();
        assert!(states.iter().all(|s| s.now_ms() % 100.0 == 0.0));
        let last = states.last().unwrap();
        assert!(last.is_complete());
        assert!(last.now_ms() > loaded.graph.critical_path_ms());
        assert_eq!(states.len() as f64, last.now_ms() / 100.0 + 1.0);
    }

    #[test]
    fn test_runs_are_reproducible() {
        let a = by_event(&enter_key()).1;
        let b = by_event(&enter_key()).1;
        assert_eq!(a.last().unwrap().total_ops(), b.last().unwrap().total_ops());
    }

    #[test]
    fn test_rejects_bad_step() {
        assert!(by_frame(&enter_key(), 0.0, EventTiming::Poll).is_err());
        assert!(by_frame(&enter_key(), f64::NAN, EventTiming::Poll).is_err());
    }
}
