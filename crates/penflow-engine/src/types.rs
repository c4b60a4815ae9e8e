//! Core types for plot graphs
//!
//! These types mirror the editor's persisted document: nodes carry a kind
//! string, a parameter bag and canvas metadata; edges connect handles.

use serde::{Deserialize, Serialize};

/// Unique identifier for a node
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// Unique identifier for a node handle (port)
pub type HandleId = String;

/// The closed set of node kinds the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    // Structural
    Output,
    Group,
    Image,
    // Shape generators
    Line,
    Rect,
    Circle,
    Ellipse,
    Arc,
    Polygon,
    // Procedural generators
    Attractor,
    #[serde(rename = "lsystem")]
    LSystem,
    Text,
    Batak,
    // Raster sampling
    Halftone,
    Ascii,
    Mask,
    // Transformers
    Path,
    Repeat,
    Grid,
    Radial,
    Translate,
    Rotate,
    Scale,
    Bytebeat,
    Code,
}

impl NodeKind {
    /// Every kind, in declaration order
    pub const ALL: [NodeKind; 25] = [
        NodeKind::Output,
        NodeKind::Group,
        NodeKind::Image,
        NodeKind::Line,
        NodeKind::Rect,
        NodeKind::Circle,
        NodeKind::Ellipse,
        NodeKind::Arc,
        NodeKind::Polygon,
        NodeKind::Attractor,
        NodeKind::LSystem,
        NodeKind::Text,
        NodeKind::Batak,
        NodeKind::Halftone,
        NodeKind::Ascii,
        NodeKind::Mask,
        NodeKind::Path,
        NodeKind::Repeat,
        NodeKind::Grid,
        NodeKind::Radial,
        NodeKind::Translate,
        NodeKind::Rotate,
        NodeKind::Scale,
        NodeKind::Bytebeat,
        NodeKind::Code,
    ];

    /// The type string used in documents
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Output => "output",
            NodeKind::Group => "group",
            NodeKind::Image => "image",
            NodeKind::Line => "line",
            NodeKind::Rect => "rect",
            NodeKind::Circle => "circle",
            NodeKind::Ellipse => "ellipse",
            NodeKind::Arc => "arc",
            NodeKind::Polygon => "polygon",
            NodeKind::Attractor => "attractor",
            NodeKind::LSystem => "lsystem",
            NodeKind::Text => "text",
            NodeKind::Batak => "batak",
            NodeKind::Halftone => "halftone",
            NodeKind::Ascii => "ascii",
            NodeKind::Mask => "mask",
            NodeKind::Path => "path",
            NodeKind::Repeat => "repeat",
            NodeKind::Grid => "grid",
            NodeKind::Radial => "radial",
            NodeKind::Translate => "translate",
            NodeKind::Rotate => "rotate",
            NodeKind::Scale => "scale",
            NodeKind::Bytebeat => "bytebeat",
            NodeKind::Code => "code",
        }
    }

    /// Parse a document type string; unknown strings yield `None`
    pub fn from_type(node_type: &str) -> Option<NodeKind> {
        NodeKind::ALL.iter().copied().find(|k| k.as_str() == node_type)
    }

    /// UI grouping for this kind
    pub fn category(&self) -> NodeCategory {
        match self {
            NodeKind::Output => NodeCategory::Output,
            NodeKind::Group => NodeCategory::Structural,
            NodeKind::Image => NodeCategory::Source,
            NodeKind::Line
            | NodeKind::Rect
            | NodeKind::Circle
            | NodeKind::Ellipse
            | NodeKind::Arc
            | NodeKind::Polygon => NodeCategory::Shape,
            NodeKind::Attractor | NodeKind::LSystem => NodeCategory::Procedural,
            NodeKind::Text | NodeKind::Batak => NodeCategory::Text,
            NodeKind::Halftone | NodeKind::Ascii | NodeKind::Mask => NodeCategory::Raster,
            NodeKind::Path
            | NodeKind::Repeat
            | NodeKind::Grid
            | NodeKind::Radial
            | NodeKind::Translate
            | NodeKind::Rotate
            | NodeKind::Scale
            | NodeKind::Bytebeat => NodeCategory::Transform,
            NodeKind::Code => NodeCategory::Code,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    /// Parametric shapes
    Shape,
    /// Iterated maps and grammars
    Procedural,
    /// Stroke text and scripts
    Text,
    /// Image-driven generators
    Raster,
    /// Geometry transformers
    Transform,
    /// User code
    Code,
    /// Raster sources
    Source,
    /// Grouping containers
    Structural,
    /// The sink
    Output,
}

/// An edge connecting two handles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// Source node ID
    pub source: NodeId,
    /// Source handle ID
    #[serde(default)]
    pub source_handle: HandleId,
    /// Target node ID
    pub target: NodeId,
    /// Target handle ID
    #[serde(default)]
    pub target_handle: HandleId,
}

/// Canvas coordinates of a node
///
/// Accepts both `{"x": .., "y": ..}` and `[x, y]` in documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "PositionRepr")]
pub struct CanvasPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PositionRepr {
    Object { x: f64, y: f64 },
    Pair(f64, f64),
}

impl From<PositionRepr> for CanvasPosition {
    fn from(repr: PositionRepr) -> Self {
        match repr {
            PositionRepr::Object { x, y } | PositionRepr::Pair(x, y) => CanvasPosition { x, y },
        }
    }
}

/// A node instance in a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique identifier for this node instance
    pub id: NodeId,
    /// Node kind as written in the document
    #[serde(rename = "type")]
    pub node_type: String,
    /// Parameter bag for this instance
    #[serde(default)]
    pub data: serde_json::Value,
    /// Position on the canvas
    #[serde(default)]
    pub position: CanvasPosition,
    /// Enclosing group node, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    /// Canvas selection state
    #[serde(default)]
    pub selected: bool,
    /// Canvas drag state
    #[serde(default)]
    pub dragging: bool,
    /// Rendered size on the canvas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl GraphNode {
    /// Create a node with an empty parameter bag
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            data: serde_json::Value::Null,
            position: CanvasPosition::default(),
            parent_id: None,
            selected: false,
            dragging: false,
            width: None,
            height: None,
        }
    }

    /// The parsed kind, or `None` for unknown type strings
    pub fn kind(&self) -> Option<NodeKind> {
        NodeKind::from_type(&self.node_type)
    }
}

/// A complete plot graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotGraph {
    /// Unique identifier for this graph
    #[serde(default)]
    pub id: String,
    /// Human-readable name
    #[serde(default)]
    pub name: String,
    /// Nodes in the graph
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    /// Edges connecting nodes
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl PlotGraph {
    /// Create a new empty graph
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find a node by ID (mutable)
    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// The sink: the first node of kind `output`
    pub fn output_node(&self) -> Option<&GraphNode> {
        self.nodes
            .iter()
            .find(|n| n.kind() == Some(NodeKind::Output))
    }

    /// Edges coming into a node, in a storage-order independent order
    ///
    /// Sorted by (target handle, source, source handle, edge id).
    pub fn incoming_edges(&self, node_id: &str) -> Vec<&GraphEdge> {
        let mut edges: Vec<&GraphEdge> =
            self.edges.iter().filter(|e| e.target == node_id).collect();
        edges.sort_by(|a, b| {
            (&a.target_handle, &a.source, &a.source_handle, &a.id).cmp(&(
                &b.target_handle,
                &b.source,
                &b.source_handle,
                &b.id,
            ))
        });
        edges
    }

    /// Get edges going out of a node
    pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// Get the IDs of nodes that this node depends on (upstream nodes)
    pub fn get_dependencies(&self, node_id: &str) -> Vec<NodeId> {
        self.incoming_edges(node_id)
            .into_iter()
            .map(|e| e.source.clone())
            .collect()
    }

    /// Get the IDs of nodes that depend on this node (downstream nodes)
    pub fn get_dependents(&self, node_id: &str) -> Vec<NodeId> {
        self.outgoing_edges(node_id)
            .map(|e| e.target.clone())
            .collect()
    }

    /// Nodes whose `parent_id` is `group_id`, in node-list order
    pub fn children_of<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a GraphNode> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id.as_deref() == Some(group_id))
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, node_id: &str) -> Option<GraphNode> {
        let pos = self.nodes.iter().position(|n| n.id == node_id)?;
        self.edges
            .retain(|e| e.source != node_id && e.target != node_id);
        Some(self.nodes.remove(pos))
    }
}
