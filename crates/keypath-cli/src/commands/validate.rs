//! Graph file validation command.

use clap::Args;
use keypath_config::GraphFile;
use std::path::PathBuf;

#[derive(Args)]
pub struct ValidateArgs {
    /// Graph files to check
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let mut failures = 0;

    for path in &args.paths {
        let result = GraphFile::load(path).and_then(|file| {
            let graph = file.to_graph()?;
            Ok((file, graph))
        });
        match result {
            Ok((file, graph)) => println!(
                "ok     {}: {} ({} stages, {:.0} ms)",
                path.display(),
                file.name,
                graph.node_count(),
                graph.critical_path_ms()
            ),
            Err(e) => {
                failures += 1;
                tracing::debug!(path = %path.display(), error = ?e, "validation failed");
                println!("error  {}: {}", path.display(), e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} graph files invalid", failures, args.paths.len());
    }
    Ok(())
}
