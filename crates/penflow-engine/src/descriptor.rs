//! Node descriptor trait and metadata types
//!
//! Each node kind describes itself (label, category, ports) next to its
//! implementation. Descriptors are collected at link time through
//! `inventory`, so adding a node never means editing a central table.

use serde::{Deserialize, Serialize};

use crate::types::{NodeCategory, NodeKind};

/// Trait for node implementations that can describe their metadata
///
/// # Example
///
/// ```ignore
/// use penflow_engine::{NodeDescriptor, NodeMetadata, PortMetadata, PortDataType};
///
/// impl NodeDescriptor for CircleNode {
///     fn descriptor() -> NodeMetadata {
///         NodeMetadata::new(NodeKind::Circle, "Circle", "Sampled circle outline")
///             .with_output(PortMetadata::optional("out", "Paths", PortDataType::Geometry))
///     }
/// }
///
/// inventory::submit!(penflow_engine::DescriptorFn(CircleNode::descriptor));
/// ```
pub trait NodeDescriptor {
    /// Get the static metadata for this node kind
    fn descriptor() -> NodeMetadata
    where
        Self: Sized;
}

/// Function pointer registered with `inventory` to expose a descriptor
pub struct DescriptorFn(pub fn() -> NodeMetadata);

inventory::collect!(DescriptorFn);

/// What flows through a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDataType {
    /// A collection of colored paths
    Geometry,
    /// A raster exposed by an image node
    Image,
}

/// Complete metadata for a node kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    /// Type string used in documents (e.g., "lsystem")
    pub node_type: String,
    /// Category for UI grouping
    pub category: NodeCategory,
    /// Human-readable label
    pub label: String,
    /// Description of what the node does
    pub description: String,
    /// Input port definitions
    pub inputs: Vec<PortMetadata>,
    /// Output port definitions
    pub outputs: Vec<PortMetadata>,
}

impl NodeMetadata {
    /// Metadata for `kind` with no ports yet
    pub fn new(kind: NodeKind, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            node_type: kind.as_str().to_string(),
            category: kind.category(),
            label: label.into(),
            description: description.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, port: PortMetadata) -> Self {
        self.inputs.push(port);
        self
    }

    pub fn with_output(mut self, port: PortMetadata) -> Self {
        self.outputs.push(port);
        self
    }

    /// The usual single geometry output
    pub fn with_geometry_output(self) -> Self {
        self.with_output(PortMetadata::optional("out", "Paths", PortDataType::Geometry))
    }
}

/// Metadata for a port (input or output)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMetadata {
    /// Handle identifier
    pub id: String,
    /// Human-readable label
    pub label: String,
    /// Data type
    pub data_type: PortDataType,
    /// Whether this input must be connected for the node to produce output
    pub required: bool,
    /// Whether multiple connections are allowed
    pub multiple: bool,
}

impl PortMetadata {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        data_type: PortDataType,
        required: bool,
        multiple: bool,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data_type,
            required,
            multiple,
        }
    }

    /// Create a required port
    pub fn required(
        id: impl Into<String>,
        label: impl Into<String>,
        data_type: PortDataType,
    ) -> Self {
        Self::new(id, label, data_type, true, false)
    }

    /// Create an optional port
    pub fn optional(
        id: impl Into<String>,
        label: impl Into<String>,
        data_type: PortDataType,
    ) -> Self {
        Self::new(id, label, data_type, false, false)
    }

    /// Set this port to accept multiple connections
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_metadata_required() {
        let port = PortMetadata::required("in", "Input", PortDataType::Geometry);
        assert_eq!(port.id, "in");
        assert!(port.required);
        assert!(!port.multiple);
    }

    #[test]
    fn test_port_metadata_multiple() {
        let port = PortMetadata::optional("in", "Input", PortDataType::Geometry).multiple();
        assert!(port.multiple);
        assert!(!port.required);
    }

    #[test]
    fn test_metadata_takes_category_from_kind() {
        let meta = NodeMetadata::new(NodeKind::Halftone, "Halftone", "Wave shading")
            .with_input(PortMetadata::required("image", "Image", PortDataType::Image))
            .with_geometry_output();
        assert_eq!(meta.node_type, "halftone");
        assert_eq!(meta.category, NodeCategory::Raster);
        assert_eq!(meta.outputs[0].id, "out");

        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("nodeType"));
        assert!(json.contains("dataType"));
    }
}
