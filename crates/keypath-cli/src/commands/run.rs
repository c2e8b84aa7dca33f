//! Real-time run command.

use super::common::{self, GraphArgs};
use crate::render;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use keypath_core::{Clock, FrameDriver, FrameOutcome, MonotonicClock, NodeStatus, PendingFrame};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    graph: GraphArgs,

    /// Frames per second
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Print status changes only, without a progress bar
    #[arg(long)]
    plain: bool,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let loaded = common::load(&args.graph)?;
    let graph = Arc::clone(&loaded.graph);

    println!("{}", loaded.file.name);
    if let Some(desc) = &loaded.file.description {
        println!("{}", desc);
    }
    println!(
        "{} stages, {:.0} ms at 1x, running at {:.1}x (seed {})",
        graph.node_count(),
        graph.critical_path_ms(),
        loaded.speed,
        loaded.seed
    );
    println!("\nPress Ctrl+C to reset...\n");

    // Set up Ctrl+C handler
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })?;

    let clock = MonotonicClock::new();
    let started_at = clock.now_ms();
    let mut driver = FrameDriver::new(loaded.timeline(started_at), clock, PendingFrame::new());

    let pb = if args.plain {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(graph.node_count() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    let emit = |line: String| {
        if args.plain {
            println!("{}", line);
        } else {
            pb.println(line);
        }
    };

    let frame = Duration::from_secs_f64(1.0 / f64::from(args.fps));
    let mut prev = driver.state().clone();
    driver.start();

    while let Some(outcome) = driver.poll() {
        let state = driver.state();
        for transition in render::transitions(&graph, &prev, state) {
            emit(transition.line());
        }
        pb.set_position(state.count_nodes(NodeStatus::Done) as u64);
        pb.set_message(render::activity(&graph, state));
        prev = state.clone();

        if interrupted.load(Ordering::SeqCst) {
            driver.reset();
            pb.abandon_with_message("reset");
            tracing::info!(at = prev.now_ms() - started_at, "interrupted");
            println!("\nInterrupted; timeline reset.");
            return Ok(());
        }
        if outcome == FrameOutcome::Idle {
            break;
        }
        std::thread::sleep(frame);
    }

    pb.finish_with_message("done");
    let state = driver.state();
    println!(
        "\nCompleted in {:.1} ms (expected {:.1} ms), {} ops",
        state.now_ms() - started_at,
        graph.critical_path_ms() / state.speed(),
        state.total_ops()
    );

    Ok(())
}
