//! Graph export command.

use clap::Args;
use keypath_config::{ensure_user_graphs_dir, graph_name_from_path, load_graph};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ExportArgs {
    /// Graph to export (name or path)
    name: String,

    /// Output file; prints to stdout when omitted
    #[arg(short, long, conflicts_with = "user")]
    output: Option<PathBuf>,

    /// Save into the user graphs directory as <name>.toml
    #[arg(long)]
    user: bool,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ExportArgs) -> anyhow::Result<()> {
    let file = load_graph(&args.name)?;

    let output = if args.user {
        let stem = graph_name_from_path(Path::new(&args.name)).unwrap_or_else(|| args.name.clone());
        Some(ensure_user_graphs_dir()?.join(format!("{}.toml", stem)))
    } else {
        args.output
    };

    let Some(path) = output else {
        print!("{}", file.to_toml()?);
        return Ok(());
    };

    if path.exists() && !args.force {
        anyhow::bail!(
            "'{}' already exists. Use --force to overwrite.",
            path.display()
        );
    }
    file.save(&path)?;
    println!("Wrote {} to {}", file.name, path.display());

    Ok(())
}
