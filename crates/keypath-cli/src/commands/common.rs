//! Shared CLI helpers used across multiple commands.

use clap::Args;
use keypath_config::{GraphFile, load_graph};
use keypath_core::{ExecutionGraph, LcgJitter, Timeline, clamp_speed};
use std::sync::Arc;

/// Graph selection and run settings shared by `run` and `trace`.
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Built-in graph name, user graph name, or path to a TOML file
    #[arg(short, long, default_value = "enter_key")]
    pub graph: String,

    /// Speed multiplier (clamped to 0.5..=3); defaults to the graph's setting
    #[arg(short, long)]
    pub speed: Option<f64>,

    /// Jitter seed; defaults to the graph's setting
    #[arg(long)]
    pub seed: Option<u32>,
}

/// A graph ready to run, with settings resolved.
pub struct LoadedGraph {
    pub file: GraphFile,
    pub graph: Arc<ExecutionGraph>,
    pub speed: f64,
    pub seed: u32,
}

impl LoadedGraph {
    /// Creates an idle timeline at `now_ms` with the resolved speed and seed.
    pub fn timeline(&self, now_ms: f64) -> Timeline {
        let mut timeline = Timeline::seeded(Arc::clone(&self.graph), self.seed, now_ms);
        timeline.set_speed(self.speed);
        timeline
    }
}

/// Loads and builds the selected graph.
///
/// Command-line values override the file's `[simulation]` table.
pub fn load(args: &GraphArgs) -> anyhow::Result<LoadedGraph> {
    let file = load_graph(&args.graph)
        .map_err(|e| anyhow::anyhow!("{e}. Use 'keypath graphs' to see available graphs."))?;
    let graph = file.to_graph()?;

    let requested = args.speed.unwrap_or(file.simulation.speed);
    let speed = clamp_speed(requested);
    if speed != requested {
        tracing::warn!(requested, applied = speed, "speed out of range");
    }
    let seed = args
        .seed
        .or(file.simulation.seed)
        .unwrap_or(LcgJitter::DEFAULT_SEED);

    tracing::info!(
        graph = %file.name,
        stages = graph.node_count(),
        speed,
        seed,
        "graph loaded"
    );

    Ok(LoadedGraph {
        file,
        graph: Arc::new(graph),
        speed,
        seed,
    })
}
