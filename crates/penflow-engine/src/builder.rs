//! Fluent builder for plot graphs
//!
//! Provides a compact API for constructing graphs programmatically, mostly
//! for hosts that generate documents and for tests.

use crate::types::{CanvasPosition, GraphEdge, GraphNode, NodeKind, PlotGraph};

/// Fluent builder for constructing plot graphs
///
/// # Example
///
/// ```ignore
/// let graph = GraphBuilder::new("g-1", "Rosette")
///     .add_node("c", NodeKind::Circle)
///     .with_data(serde_json::json!({"radius": 20}))
///     .add_node("r", NodeKind::Radial)
///     .add_node("out", NodeKind::Output)
///     .connect("c", "r")
///     .connect("r", "out")
///     .build();
/// ```
pub struct GraphBuilder {
    id: String,
    name: String,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    edge_counter: usize,
}

impl GraphBuilder {
    /// Create a new graph builder
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            edge_counter: 0,
        }
    }

    /// Add a node of a known kind
    pub fn add_node(self, id: impl Into<String>, kind: NodeKind) -> Self {
        self.add_node_of_type(id, kind.as_str())
    }

    /// Add a node with an arbitrary type string
    pub fn add_node_of_type(mut self, id: impl Into<String>, node_type: impl Into<String>) -> Self {
        self.nodes.push(GraphNode::new(id, node_type));
        self
    }

    /// Set data on the most recently added node
    ///
    /// Must be called immediately after `add_node`.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.data = data;
        }
        self
    }

    /// Place the most recently added node inside a group
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.parent_id = Some(parent_id.into());
        }
        self
    }

    /// Set the canvas position of the most recently added node
    pub fn at(mut self, x: f64, y: f64) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.position = CanvasPosition { x, y };
        }
        self
    }

    /// Connect the default output of `source` to the default input of `target`
    pub fn connect(self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.add_edge(source, "out", target, "in")
    }

    /// Add an edge between two handles (auto-generates edge ID)
    pub fn add_edge(
        mut self,
        source: impl Into<String>,
        source_port: impl Into<String>,
        target: impl Into<String>,
        target_port: impl Into<String>,
    ) -> Self {
        self.edge_counter += 1;
        let id = format!("edge-{}", self.edge_counter);
        self.add_edge_with_id(id, source, source_port, target, target_port)
    }

    /// Add an edge with an explicit ID
    pub fn add_edge_with_id(
        mut self,
        edge_id: impl Into<String>,
        source: impl Into<String>,
        source_port: impl Into<String>,
        target: impl Into<String>,
        target_port: impl Into<String>,
    ) -> Self {
        self.edges.push(GraphEdge {
            id: edge_id.into(),
            source: source.into(),
            source_handle: source_port.into(),
            target: target.into(),
            target_handle: target_port.into(),
        });
        self
    }

    /// Build the graph without validation
    pub fn build(self) -> PlotGraph {
        let mut graph = PlotGraph::new(self.id, self.name);
        graph.nodes = self.nodes;
        graph.edges = self.edges;
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_wires_nodes() {
        let graph = GraphBuilder::new("g", "G")
            .add_node("c", NodeKind::Circle)
            .with_data(serde_json::json!({"radius": 20}))
            .at(10.0, 20.0)
            .add_node("grp", NodeKind::Group)
            .add_node("t", NodeKind::Translate)
            .with_parent("grp")
            .add_node("out", NodeKind::Output)
            .connect("c", "t")
            .add_edge_with_id("final", "grp", "out", "out", "in")
            .build();

        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[0].id, "edge-1");
        assert_eq!(graph.edges[0].target_handle, "in");
        assert_eq!(graph.find_node("c").unwrap().data["radius"], 20);
        assert_eq!(graph.find_node("c").unwrap().position.y, 20.0);
        assert_eq!(graph.find_node("t").unwrap().parent_id.as_deref(), Some("grp"));
        assert_eq!(graph.output_node().unwrap().id, "out");
    }

    #[test]
    fn test_unknown_type_strings_are_kept() {
        let graph = GraphBuilder::new("g", "G")
            .add_node_of_type("x", "teleporter")
            .build();
        assert_eq!(graph.nodes[0].node_type, "teleporter");
        assert!(graph.nodes[0].kind().is_none());
    }
}
