//! Graph listing and detail command.

use clap::Args;
use keypath_config::{
    GraphFile, factory_graph_names, get_factory_graph, graph_name_from_path, list_user_graphs,
    load_graph, user_graphs_dir,
};

#[derive(Args)]
pub struct GraphsArgs {
    /// Graph to show in detail (name or path); lists all graphs when omitted
    name: Option<String>,
}

pub fn run(args: GraphsArgs) -> anyhow::Result<()> {
    match args.name {
        Some(name) => show_graph(&name),
        None => list_graphs(),
    }
}

fn summary(file: &GraphFile) -> String {
    match file.to_graph() {
        Ok(graph) => format!(
            "{} stages, {:.0} ms - {}",
            graph.node_count(),
            graph.critical_path_ms(),
            file.name
        ),
        Err(e) => format!("(invalid: {})", e),
    }
}

fn list_graphs() -> anyhow::Result<()> {
    println!("Built-in Graphs:");
    println!("================");
    for name in factory_graph_names() {
        if let Some(file) = get_factory_graph(name) {
            println!("  {:20} {}", name, summary(&file));
        }
    }
    println!();

    println!("User Graphs:");
    println!("============");
    let user_graphs = list_user_graphs();
    if user_graphs.is_empty() {
        println!("  (none)");
        println!();
        println!(
            "  Add TOML files to {} or start from: keypath export enter_key --user",
            user_graphs_dir().display()
        );
    } else {
        for path in user_graphs {
            let name = graph_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
            match GraphFile::load(&path) {
                Ok(file) => println!("  {:20} {}", name, summary(&file)),
                Err(_) => println!("  {:20} (error loading)", name),
            }
        }
    }
    println!();

    Ok(())
}

fn show_graph(name: &str) -> anyhow::Result<()> {
    let file = load_graph(name)?;
    let graph = file.to_graph()?;

    println!("Graph: {}", file.name);
    println!("{}", "=".repeat(7 + file.name.len()));
    println!();

    if let Some(desc) = &file.description {
        println!("{}", desc);
        println!();
    }

    println!("Stages ({}):", graph.node_count());
    for (i, &id) in graph.path().iter().enumerate() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        println!(
            "  {}. {:22} [{:11}] {:>6.0} ms {:>7} ops",
            i + 1,
            node.label,
            node.kind.as_str(),
            node.base_latency_ms,
            node.ops_cost
        );
        if !node.tooltip.is_empty() {
            println!("       {}", node.tooltip);
        }

        if let Some(edge) = graph.outgoing(id).and_then(|e| graph.edge(e)) {
            println!("       |  {} ({:.0} ms)", edge.key, edge.latency_ms);
        }
    }
    println!();

    println!("Critical path: {:.0} ms at 1x", graph.critical_path_ms());
    println!("Nominal ops:   {}", graph.total_ops_cost());
    println!("Default speed: {:.1}x", file.simulation.speed);
    if let Some(seed) = file.simulation.seed {
        println!("Seed:          {}", seed);
    }

    Ok(())
}
