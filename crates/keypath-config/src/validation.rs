//! Graph file validation.
//!
//! Checks the parts of a [`GraphFile`] that the core graph builder never sees
//! as strings: node kinds, key references in edges and `start`, and the
//! `[simulation]` table. Topology rules (one path, no cycles) are enforced
//! later by [`GraphBuilder::build`](keypath_core::GraphBuilder::build).
//!
//! # Example
//!
//! ```rust
//! use keypath_config::{validate_graph_file, get_factory_graph};
//!
//! let file = get_factory_graph("enter_key").unwrap();
//! validate_graph_file(&file).expect("built-in graphs are valid");
//! ```

use crate::graph_file::{EdgeConfig, GraphFile, NodeConfig};
use keypath_core::NodeKind;
use std::collections::HashSet;
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The file defines no nodes.
    #[error("graph defines no nodes")]
    NoNodes,

    /// Two nodes share an id.
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    /// A node's kind is not one of the known categories.
    #[error("unknown kind '{kind}' for node '{node}' (expected hardware, kernel, application or cpu)")]
    UnknownKind {
        /// Id of the node.
        node: String,
        /// The unrecognized kind string.
        kind: String,
    },

    /// A latency is negative or not finite.
    #[error("latency of '{key}' must be finite and >= 0, got {value}")]
    InvalidLatency {
        /// Node id or edge key.
        key: String,
        /// The rejected value.
        value: f64,
    },

    /// An edge refers to an undefined node.
    #[error("edge '{edge}' refers to undefined node '{node}'")]
    UnknownNode {
        /// Key of the edge.
        edge: String,
        /// The undefined node id.
        node: String,
    },

    /// `start` names an undefined node.
    #[error("start node '{0}' is not defined")]
    UnknownStart(String),

    /// The default speed is not a finite positive number.
    #[error("simulation speed must be finite and > 0, got {0}")]
    InvalidSpeed(f64),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Parses a node kind string.
///
/// Matching is case-insensitive.
pub fn parse_kind(node: &str, kind: &str) -> ValidationResult<NodeKind> {
    NodeKind::from_name(&kind.to_ascii_lowercase()).ok_or_else(|| ValidationError::UnknownKind {
        node: node.to_string(),
        kind: kind.to_string(),
    })
}

fn check_latency(key: &str, value: f64) -> ValidationResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidLatency {
            key: key.to_string(),
            value,
        })
    }
}

/// Validates a single node entry.
pub fn validate_node(node: &NodeConfig) -> ValidationResult<()> {
    parse_kind(&node.id, &node.kind)?;
    check_latency(&node.id, node.base_latency_ms)
}

/// Validates a single edge entry against the set of defined node ids.
pub fn validate_edge(edge: &EdgeConfig, node_ids: &HashSet<&str>) -> ValidationResult<()> {
    let key = edge.key();
    for endpoint in [&edge.from, &edge.to] {
        if !node_ids.contains(endpoint.as_str()) {
            return Err(ValidationError::UnknownNode {
                edge: key,
                node: endpoint.clone(),
            });
        }
    }
    check_latency(&key, edge.latency_ms)
}

/// Validates every entry of a graph file and collects all failures.
///
/// # Errors
///
/// Returns the single failure, or [`ValidationError::Multiple`] when more
/// than one entry is invalid.
pub fn validate_graph_file(file: &GraphFile) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if file.nodes.is_empty() {
        errors.push(ValidationError::NoNodes);
    }

    let mut node_ids = HashSet::new();
    for node in &file.nodes {
        if !node_ids.insert(node.id.as_str()) {
            errors.push(ValidationError::DuplicateNode(node.id.clone()));
        }
        if let Err(e) = validate_node(node) {
            errors.push(e);
        }
    }

    for edge in &file.edges {
        if let Err(e) = validate_edge(edge, &node_ids) {
            errors.push(e);
        }
    }
    if let Some(chain) = &file.chain {
        for (i, latency) in chain.latencies(file.nodes.len()).enumerate() {
            if let Err(e) = check_latency(&format!("chain[{i}]"), latency) {
                errors.push(e);
            }
        }
    }

    if let Some(start) = &file.start
        && !node_ids.contains(start.as_str())
    {
        errors.push(ValidationError::UnknownStart(start.clone()));
    }

    let speed = file.simulation.speed;
    if !speed.is_finite() || speed <= 0.0 {
        errors.push(ValidationError::InvalidSpeed(speed));
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
