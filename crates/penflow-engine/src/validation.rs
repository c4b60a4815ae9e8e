//! Graph validation
//!
//! Reports structural problems (dangling edges, cycles, unknown kinds,
//! missing outputs) for display in the editor. Evaluation never requires
//! a valid graph; this is diagnostics only.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::registry::NodeRegistry;
use crate::types::{NodeKind, PlotGraph};

/// Validation error with location context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Cycle detected in the graph
    CycleDetected,
    /// The graph has no output node
    MissingOutputNode,
    /// More than one output node; only the first is evaluated
    MultipleOutputNodes { node_ids: Vec<String> },
    /// A node has an unknown type
    UnknownNodeType { node_id: String, node_type: String },
    /// An edge references a non-existent node
    UnknownNode { edge_id: String, node_id: String },
    /// A node names a parent that does not exist or is not a group
    UnknownParent { node_id: String, parent_id: String },
    /// A required input port is not connected
    UnconnectedRequiredInput { node_id: String, port_id: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CycleDetected => write!(f, "Cycle detected in graph"),
            Self::MissingOutputNode => write!(f, "Graph has no output node"),
            Self::MultipleOutputNodes { node_ids } => {
                write!(f, "Graph has multiple output nodes: {}", node_ids.join(", "))
            }
            Self::UnknownNodeType { node_id, node_type } => {
                write!(f, "Unknown node type '{}' for node '{}'", node_type, node_id)
            }
            Self::UnknownNode { edge_id, node_id } => {
                write!(f, "Edge '{}' references unknown node '{}'", edge_id, node_id)
            }
            Self::UnknownParent { node_id, parent_id } => {
                write!(
                    f,
                    "Node '{}' belongs to '{}', which is not a group in this graph",
                    node_id, parent_id
                )
            }
            Self::UnconnectedRequiredInput { node_id, port_id } => {
                write!(
                    f,
                    "Required input '{}' on node '{}' is not connected",
                    port_id, node_id
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a plot graph
///
/// Returns all validation errors found (not just the first). Pass a
/// registry to enable required-input checks; without one, node types are
/// checked against the built-in kinds.
pub fn validate_graph(graph: &PlotGraph, registry: Option<&NodeRegistry>) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_edge_references(graph, &mut errors);
    validate_output_presence(graph, &mut errors);
    validate_parents(graph, &mut errors);
    detect_cycles(graph, &mut errors);
    validate_node_types(graph, registry, &mut errors);
    if let Some(reg) = registry {
        validate_required_inputs(graph, reg, &mut errors);
    }

    errors
}

/// Check that all edge source/target nodes exist
fn validate_edge_references(graph: &PlotGraph, errors: &mut Vec<ValidationError>) {
    let node_ids: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

    for edge in &graph.edges {
        for endpoint in [&edge.source, &edge.target] {
            if !node_ids.contains(endpoint.as_str()) {
                errors.push(ValidationError::UnknownNode {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
    }
}

fn validate_output_presence(graph: &PlotGraph, errors: &mut Vec<ValidationError>) {
    let outputs: Vec<String> = graph
        .nodes
        .iter()
        .filter(|n| n.kind() == Some(NodeKind::Output))
        .map(|n| n.id.clone())
        .collect();
    match outputs.len() {
        0 => errors.push(ValidationError::MissingOutputNode),
        1 => {}
        _ => errors.push(ValidationError::MultipleOutputNodes { node_ids: outputs }),
    }
}

fn validate_parents(graph: &PlotGraph, errors: &mut Vec<ValidationError>) {
    let groups: HashSet<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.kind() == Some(NodeKind::Group))
        .map(|n| n.id.as_str())
        .collect();
    for node in &graph.nodes {
        if let Some(parent_id) = &node.parent_id {
            if !groups.contains(parent_id.as_str()) {
                errors.push(ValidationError::UnknownParent {
                    node_id: node.id.clone(),
                    parent_id: parent_id.clone(),
                });
            }
        }
    }
}

/// Detect cycles using Kahn's algorithm (topological sort)
fn detect_cycles(graph: &PlotGraph, errors: &mut Vec<ValidationError>) {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for node in &graph.nodes {
        in_degree.insert(&node.id, 0);
    }
    for edge in &graph.edges {
        if in_degree.contains_key(edge.source.as_str()) {
            if let Some(deg) = in_degree.get_mut(edge.target.as_str()) {
                *deg += 1;
            }
        }
    }

    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&id, _)| id)
        .collect();

    let mut visited = 0;
    while let Some(node_id) = queue.pop_front() {
        visited += 1;
        for edge in &graph.edges {
            if edge.source == node_id {
                if let Some(deg) = in_degree.get_mut(edge.target.as_str()) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(&edge.target);
                    }
                }
            }
        }
    }

    if visited < graph.nodes.len() {
        errors.push(ValidationError::CycleDetected);
    }
}

fn validate_node_types(
    graph: &PlotGraph,
    registry: Option<&NodeRegistry>,
    errors: &mut Vec<ValidationError>,
) {
    for node in &graph.nodes {
        let known = match registry {
            Some(reg) => reg.has_node_type(&node.node_type),
            None => node.kind().is_some(),
        };
        if !known {
            errors.push(ValidationError::UnknownNodeType {
                node_id: node.id.clone(),
                node_type: node.node_type.clone(),
            });
        }
    }
}

/// Check that required inputs are connected
///
/// An edge without a target handle counts as connected to every port.
fn validate_required_inputs(
    graph: &PlotGraph,
    registry: &NodeRegistry,
    errors: &mut Vec<ValidationError>,
) {
    for node in &graph.nodes {
        let Some(metadata) = registry.get_metadata(&node.node_type) else {
            continue;
        };
        let incoming = graph.incoming_edges(&node.id);
        for port in metadata.inputs.iter().filter(|p| p.required) {
            let connected = incoming
                .iter()
                .any(|e| e.target_handle.is_empty() || e.target_handle == port.id);
            if !connected {
                errors.push(ValidationError::UnconnectedRequiredInput {
                    node_id: node.id.clone(),
                    port_id: port.id.clone(),
                });
            }
        }
    }
}
