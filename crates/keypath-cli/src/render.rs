//! Text and JSON rendering of simulation snapshots.
//!
//! The engine only exposes state; this module turns consecutive snapshots into
//! transition lines and serializable views.

use keypath_core::{EdgeStatus, ExecutionGraph, NodeStatus, SimulationState};
use serde::Serialize;

/// One status change observed between two snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Time of the later snapshot.
    pub at_ms: f64,
    /// Node label or edge key.
    pub subject: String,
    /// New status name.
    pub status: &'static str,
    /// Whether the subject is an edge.
    pub is_edge: bool,
}

impl Transition {
    /// Formats as a fixed-width log line.
    pub fn line(&self) -> String {
        let subject = if self.is_edge {
            format!("  {}", self.subject)
        } else {
            self.subject.clone()
        };
        format!("{:>9.1} ms  {:<8} {}", self.at_ms, self.status, subject)
    }
}

/// Status changes from `prev` to `next`, in path order.
pub fn transitions(
    graph: &ExecutionGraph,
    prev: &SimulationState,
    next: &SimulationState,
) -> Vec<Transition> {
    let at_ms = next.now_ms();
    let mut out = Vec::new();

    for &node_id in graph.path() {
        if let (Some(before), Some(after), Some(node)) = (
            prev.node_status(node_id),
            next.node_status(node_id),
            graph.node(node_id),
        ) && before != after
        {
            out.push(Transition {
                at_ms,
                subject: node.label.clone(),
                status: after.as_str(),
                is_edge: false,
            });
        }

        let Some(edge_id) = graph.outgoing(node_id) else {
            continue;
        };
        if let (Some(before), Some(after), Some(edge)) = (
            prev.edge_status(edge_id),
            next.edge_status(edge_id),
            graph.edge(edge_id),
        ) && before != after
        {
            out.push(Transition {
                at_ms,
                subject: edge.key.clone(),
                status: after.as_str(),
                is_edge: true,
            });
        }
    }
    out
}

/// What the path is doing right now, for a status line.
pub fn activity(graph: &ExecutionGraph, state: &SimulationState) -> String {
    if let Some(node) = state
        .node_statuses()
        .find(|&(_, status)| status == NodeStatus::Active)
        .and_then(|(id, _)| graph.node(id))
    {
        return node.label.clone();
    }
    if let Some((edge, flow)) = state.edge_flows().next()
        && let Some(to) = graph.edge(edge).and_then(|e| graph.node(e.to))
    {
        return format!(
            "-> {} ({:.0}%)",
            to.label,
            flow.progress(state.now_ms()) * 100.0
        );
    }
    if state.is_complete() {
        "done".to_string()
    } else {
        "idle".to_string()
    }
}

/// Serializable view of one snapshot.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub now_ms: f64,
    pub running: bool,
    pub total_ops: u64,
    pub speed: f64,
    pub nodes: Vec<NodeView<'a>>,
    pub edges: Vec<EdgeView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct NodeView<'a> {
    pub key: &'a str,
    pub kind: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EdgeView<'a> {
    pub key: &'a str,
    pub status: &'static str,
    /// Fraction travelled, present while flowing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Interpolated pulse position, present while flowing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse: Option<[f32; 2]>,
}

impl<'a> Snapshot<'a> {
    /// Captures `state` with keys borrowed from `graph`, in path order.
    pub fn capture(graph: &'a ExecutionGraph, state: &SimulationState) -> Self {
        let nodes = graph
            .path()
            .iter()
            .filter_map(|&id| {
                let node = graph.node(id)?;
                Some(NodeView {
                    key: &node.key,
                    kind: node.kind.as_str(),
                    status: state.node_status(id)?.as_str(),
                })
            })
            .collect();

        let edges = graph
            .path_edges()
            .filter_map(|id| {
                let edge = graph.edge(id)?;
                let status = state.edge_status(id)?;
                let progress = state
                    .edge_flow(id)
                    .filter(|_| status == EdgeStatus::Flowing)
                    .map(|flow| flow.progress(state.now_ms()));
                Some(EdgeView {
                    key: &edge.key,
                    status: status.as_str(),
                    progress,
                    pulse: progress.and_then(|p| graph.edge_point(id, p)),
                })
            })
            .collect();

        Self {
            now_ms: state.now_ms(),
            running: state.is_running(),
            total_ops: state.total_ops(),
            speed: state.speed(),
            nodes,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypath_core::{GraphBuilder, GraphNode, NoJitter, NodeKind, Timeline};

    fn abc() -> ExecutionGraph {
        GraphBuilder::linear(
            ["a", "b", "c"].map(|k| {
                GraphNode::new(k, NodeKind::Kernel)
                    .with_label(k.to_uppercase())
                    .with_latency(10.0)
                    .with_ops(100)
            }),
            |_| 5.0,
        )
        .unwrap()
    }

    #[test]
    fn test_transitions_in_path_order() {
        let graph = abc();
        let mut timeline = Timeline::with_jitter(graph.clone(), NoJitter, 0.0);
        timeline.start(0.0);
        let prev = timeline.advance(0.0).clone();
        let next = timeline.advance(10.0).clone();

        let changes: Vec<(String, &str)> = transitions(&graph, &prev, &next)
            .into_iter()
            .map(|t| (t.subject, t.status))
            .collect();
        assert_eq!(
            changes,
            [
                ("A".to_string(), "done"),
                ("a->b".to_string(), "flowing"),
                ("B".to_string(), "queued"),
            ]
        );
    }

    #[test]
    fn test_line_format() {
        let t = Transition {
            at_ms: 15.0,
            subject: "Keyboard".to_string(),
            status: "active",
            is_edge: false,
        };
        assert_eq!(t.line(), "     15.0 ms  active   Keyboard");
    }

    #[test]
    fn test_activity() {
        let graph = abc();
        let mut timeline = Timeline::with_jitter(graph.clone(), NoJitter, 0.0);
        assert_eq!(activity(&graph, timeline.state()), "idle");
        timeline.start(0.0);
        timeline.advance(0.0);
        assert_eq!(activity(&graph, timeline.advance(5.0)), "A");
        timeline.advance(10.0);
        assert_eq!(activity(&graph, timeline.advance(12.5)), "-> B (50%)");
        assert_eq!(activity(&graph, timeline.advance(f64::MAX)), "done");
    }

    #[test]
    fn test_snapshot_json() {
        let graph = abc();
        let mut timeline = Timeline::with_jitter(graph.clone(), NoJitter, 0.0);
        timeline.start(0.0);
        timeline.advance(0.0);
        timeline.advance(10.0);
        let state = timeline.advance(12.5).clone();

        let json = serde_json::to_value(Snapshot::capture(&graph, &state)).unwrap();
        assert_eq!(json["now_ms"], 12.5);
        assert_eq!(json["running"], true);
        assert_eq!(json["total_ops"], 100);
        assert_eq!(json["nodes"][1]["status"], "queued");
        assert_eq!(json["edges"][0]["progress"], 0.5);
        assert!(json["edges"][1].get("progress").is_none());
    }
}
