//! TOML graph file definitions.
//!
//! A graph file lists the stages of a path and, optionally, the edges between
//! them. When `[[edges]]` is omitted the nodes are chained in file order and
//! edge latencies come from the `[chain]` table.
//!
//! ```toml
//! name = "Enter key"
//! start = "keyboard"
//!
//! [simulation]
//! speed = 1.0
//! seed = 42
//!
//! [chain]
//! edge_latency_ms = 170.0
//! step_ms = 25.0
//!
//! [[nodes]]
//! id = "keyboard"
//! kind = "hardware"
//! base_latency_ms = 110.0
//! ops_cost = 420
//! position = [90.0, 90.0]
//! ```

use crate::error::ConfigError;
use crate::validation::{self, ValidationError, ValidationResult};
use keypath_core::{DEFAULT_SPEED, ExecutionGraph, GraphBuilder, GraphNode, NodeId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Edge latency used when nodes are chained without a `[chain]` table.
pub const DEFAULT_EDGE_LATENCY_MS: f64 = 170.0;

/// A graph definition as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphFile {
    /// Display name.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Id of the start node; defaults to the node without incoming edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    /// Default run settings.
    #[serde(default, skip_serializing_if = "SimulationSettings::is_default")]
    pub simulation: SimulationSettings,

    /// Edge latencies for implicitly chained nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<ChainLatency>,

    /// Stages, in path order when edges are omitted.
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    /// Explicit edges.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgeConfig>,
}

/// `[simulation]` table: run defaults a front end may override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Speed multiplier, clamped by the engine.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Jitter seed for reproducible ops totals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

fn default_speed() -> f64 {
    DEFAULT_SPEED
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            seed: None,
        }
    }
}

impl SimulationSettings {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// `[chain]` table: latency of the `i`-th implicit edge is
/// `edge_latency_ms + i * step_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainLatency {
    /// Latency of the first edge.
    pub edge_latency_ms: f64,
    /// Increment per subsequent edge.
    #[serde(default)]
    pub step_ms: f64,
}

impl Default for ChainLatency {
    fn default() -> Self {
        Self {
            edge_latency_ms: DEFAULT_EDGE_LATENCY_MS,
            step_ms: 0.0,
        }
    }
}

impl ChainLatency {
    /// Latencies of the edges joining `node_count` chained nodes.
    pub fn latencies(self, node_count: usize) -> impl Iterator<Item = f64> {
        (0..node_count.saturating_sub(1)).map(move |i| self.edge_latency_ms + i as f64 * self.step_ms)
    }
}

/// One `[[nodes]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node key.
    pub id: String,

    /// Display label; defaults to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// `hardware`, `kernel`, `application` or `cpu`.
    pub kind: String,

    /// Hover text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,

    /// Processing time at speed 1.
    pub base_latency_ms: f64,

    /// Nominal op count.
    #[serde(default)]
    pub ops_cost: u64,

    /// Layout hint `[x, y]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 2]>,
}

impl NodeConfig {
    /// Creates an entry with zero latency and cost.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            kind: kind.into(),
            tooltip: None,
            base_latency_ms: 0.0,
            ops_cost: 0,
            position: None,
        }
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the tooltip.
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Sets the base latency.
    pub fn with_latency(mut self, base_latency_ms: f64) -> Self {
        self.base_latency_ms = base_latency_ms;
        self
    }

    /// Sets the op cost.
    pub fn with_ops(mut self, ops_cost: u64) -> Self {
        self.ops_cost = ops_cost;
        self
    }

    /// Sets the layout hint.
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = Some([x, y]);
        self
    }

    /// Converts to a core node.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownKind`] for an unrecognized kind.
    pub fn to_node(&self) -> ValidationResult<GraphNode> {
        let kind = validation::parse_kind(&self.id, &self.kind)?;
        let mut node = GraphNode::new(self.id.clone(), kind)
            .with_latency(self.base_latency_ms)
            .with_ops(self.ops_cost);
        if let Some(label) = &self.label {
            node = node.with_label(label.clone());
        }
        if let Some(tooltip) = &self.tooltip {
            node = node.with_tooltip(tooltip.clone());
        }
        if let Some([x, y]) = self.position {
            node = node.with_position(x, y);
        }
        Ok(node)
    }

    /// Converts from a core node, omitting fields that hold their defaults.
    pub fn from_node(node: &GraphNode) -> Self {
        Self {
            id: node.key.clone(),
            label: (node.label != node.key).then(|| node.label.clone()),
            kind: node.kind.as_str().to_string(),
            tooltip: (!node.tooltip.is_empty()).then(|| node.tooltip.clone()),
            base_latency_ms: node.base_latency_ms,
            ops_cost: node.ops_cost,
            position: (node.position != [0.0, 0.0]).then_some(node.position),
        }
    }
}

/// One `[[edges]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Edge key; defaults to `"<from>-><to>"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Source node id.
    pub from: String,
    /// Destination node id.
    pub to: String,
    /// Travel time at speed 1.
    pub latency_ms: f64,
}

impl EdgeConfig {
    /// Creates an edge with the default key.
    pub fn new(from: impl Into<String>, to: impl Into<String>, latency_ms: f64) -> Self {
        Self {
            id: None,
            from: from.into(),
            to: to.into(),
            latency_ms,
        }
    }

    /// Sets an explicit key.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The edge key the built graph will use.
    pub fn key(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("{}->{}", self.from, self.to))
    }
}

impl GraphFile {
    /// Creates an empty graph file.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            start: None,
            simulation: SimulationSettings::default(),
            chain: None,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Pins the start node.
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Appends a node.
    pub fn with_node(mut self, node: NodeConfig) -> Self {
        self.nodes.push(node);
        self
    }

    /// Appends an explicit edge.
    pub fn with_edge(mut self, edge: EdgeConfig) -> Self {
        self.edges.push(edge);
        self
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the file defines no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Loads a graph file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parses a graph file from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Saves the graph file to disk, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Serializes to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates the file without building it.
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_graph_file(self)
    }

    /// Validates the file and builds the execution graph.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for bad kinds, latencies or
    /// references, and [`ConfigError::Graph`] when the topology is not a
    /// single path.
    pub fn to_graph(&self) -> Result<ExecutionGraph, ConfigError> {
        self.validate()?;

        let mut builder = GraphBuilder::new();
        let mut ids = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            ids.push(builder.add_node(node.to_node()?));
        }

        if self.edges.is_empty() {
            let chain = self.chain.unwrap_or_default();
            for (pair, latency) in ids.windows(2).zip(chain.latencies(ids.len())) {
                builder.connect(pair[0], pair[1], latency)?;
            }
        } else {
            for edge in &self.edges {
                let key = edge.key();
                let from = lookup(&builder, &edge.from, &key)?;
                let to = lookup(&builder, &edge.to, &key)?;
                builder.connect_keyed(from, to, edge.latency_ms, key)?;
            }
        }

        if let Some(start) = &self.start {
            let id = builder
                .node_id(start)
                .ok_or_else(|| ValidationError::UnknownStart(start.clone()))?;
            builder.set_start(id)?;
        }

        Ok(builder.build()?)
    }

    /// Describes an existing graph, nodes in path order with explicit edges.
    pub fn from_graph(name: impl Into<String>, graph: &ExecutionGraph) -> Self {
        let nodes = graph
            .path()
            .iter()
            .filter_map(|&id| graph.node(id))
            .map(NodeConfig::from_node)
            .collect();
        let edges = graph
            .path_edges()
            .filter_map(|id| graph.edge(id))
            .filter_map(|edge| {
                let from = graph.node(edge.from)?;
                let to = graph.node(edge.to)?;
                let mut config = EdgeConfig::new(from.key.clone(), to.key.clone(), edge.latency_ms);
                if edge.key != config.key() {
                    config = config.with_id(edge.key.clone());
                }
                Some(config)
            })
            .collect();

        Self {
            nodes,
            edges,
            ..Self::new(name)
        }
    }
}

fn lookup(builder: &GraphBuilder, node: &str, edge: &str) -> ValidationResult<NodeId> {
    builder
        .node_id(node)
        .ok_or_else(|| ValidationError::UnknownNode {
            edge: edge.to_string(),
            node: node.to_string(),
        })
}
