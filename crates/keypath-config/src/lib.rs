//! Graph files and built-in graphs for the keypath timeline.
//!
//! # Features
//!
//! - **Graph Files**: Load and save path definitions as TOML
//! - **Validation**: Check kinds, latencies and node references before building
//! - **Factory Graphs**: The Enter-key path and a short interrupt path
//! - **Paths**: Platform-specific user graph directory
//!
//! # Example
//!
//! ```rust
//! use keypath_config::{GraphFile, NodeConfig, load_graph};
//!
//! // Built-in graph by name
//! let enter = load_graph("enter_key")?.to_graph()?;
//! assert_eq!(enter.node_count(), 9);
//!
//! // Programmatic graph, chained in order
//! let graph = GraphFile::new("Two stages")
//!     .with_node(NodeConfig::new("keyboard", "hardware").with_latency(110.0))
//!     .with_node(NodeConfig::new("isr", "kernel").with_latency(170.0))
//!     .to_graph()?;
//! assert_eq!(graph.edge_count(), 1);
//! # Ok::<(), keypath_config::ConfigError>(())
//! ```

mod error;
mod graph_file;

/// Built-in graphs bundled with the library.
pub mod factory_graphs;

/// Platform-specific paths for user graphs.
pub mod paths;

/// Graph file validation.
pub mod validation;

pub use error::ConfigError;
pub use factory_graphs::{
    FACTORY_GRAPH_NAMES, factory_graph_names, factory_graphs, get_factory_graph, is_factory_graph,
};
pub use graph_file::{
    ChainLatency, DEFAULT_EDGE_LATENCY_MS, EdgeConfig, GraphFile, NodeConfig, SimulationSettings,
};
pub use paths::{
    ensure_user_graphs_dir, find_graph, graph_name_from_path, list_user_graphs, user_config_dir,
    user_graphs_dir,
};
pub use validation::{ValidationError, ValidationResult, validate_graph_file};

/// Resolves a graph by file path, built-in name, or user graph name, in that
/// order.
///
/// # Errors
///
/// Returns [`ConfigError::GraphNotFound`] if nothing matches, or the load
/// error of the matching file.
pub fn load_graph(name_or_path: &str) -> Result<GraphFile, ConfigError> {
    let path = std::path::Path::new(name_or_path);
    if path.is_file() {
        return GraphFile::load(path);
    }
    if let Some(graph) = get_factory_graph(name_or_path) {
        return Ok(graph);
    }
    match find_graph(name_or_path) {
        Some(path) => GraphFile::load(path),
        None => Err(ConfigError::GraphNotFound(name_or_path.to_string())),
    }
}
