//! Node kind registry
//!
//! Maps type strings to [`NodeMetadata`]. Built-in kinds register their
//! descriptors via `inventory`; hosts may add or override entries.

use std::collections::HashMap;

use crate::descriptor::{DescriptorFn, NodeMetadata, PortDataType, PortMetadata};
use crate::types::{NodeCategory, NodeKind};

/// Registry of node kinds and their metadata
pub struct NodeRegistry {
    entries: HashMap<String, NodeMetadata>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// A registry holding every descriptor linked into the binary
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in inventory::iter::<DescriptorFn> {
            registry.register(descriptor.0());
        }
        log::debug!("Registered {} built-in node kinds", registry.entries.len());
        registry
    }

    /// Register (or replace) a node kind
    pub fn register(&mut self, metadata: NodeMetadata) {
        self.entries.insert(metadata.node_type.clone(), metadata);
    }

    /// Get metadata for a node type
    pub fn get_metadata(&self, node_type: &str) -> Option<&NodeMetadata> {
        self.entries.get(node_type)
    }

    /// All registered metadata, sorted by type string
    pub fn all_metadata(&self) -> Vec<&NodeMetadata> {
        let mut all: Vec<&NodeMetadata> = self.entries.values().collect();
        all.sort_by(|a, b| a.node_type.cmp(&b.node_type));
        all
    }

    /// Metadata grouped by category
    pub fn metadata_by_category(&self) -> HashMap<NodeCategory, Vec<&NodeMetadata>> {
        let mut grouped: HashMap<NodeCategory, Vec<&NodeMetadata>> = HashMap::new();
        for metadata in self.all_metadata() {
            grouped.entry(metadata.category).or_default().push(metadata);
        }
        grouped
    }

    /// Check if a node type is registered
    pub fn has_node_type(&self, node_type: &str) -> bool {
        self.entries.contains_key(node_type)
    }

    /// List all registered node type strings
    pub fn node_types(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    /// Merge another registry into this one
    ///
    /// Entries from `other` override entries in `self` with the same type.
    pub fn merge(&mut self, other: NodeRegistry) {
        self.entries.extend(other.entries);
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn output_descriptor() -> NodeMetadata {
    NodeMetadata::new(NodeKind::Output, "Output", "Collects the plot sent to the plotter")
        .with_input(PortMetadata::optional("in", "Paths", PortDataType::Geometry).multiple())
}

fn group_descriptor() -> NodeMetadata {
    NodeMetadata::new(
        NodeKind::Group,
        "Group",
        "Combines the output of its member nodes",
    )
    .with_input(PortMetadata::optional("in", "Paths", PortDataType::Geometry).multiple())
    .with_geometry_output()
}

fn image_descriptor() -> NodeMetadata {
    NodeMetadata::new(
        NodeKind::Image,
        "Image",
        "Raster source for halftone, ascii and mask nodes",
    )
    .with_output(PortMetadata::optional("image", "Image", PortDataType::Image))
}

inventory::submit!(DescriptorFn(output_descriptor));
inventory::submit!(DescriptorFn(group_descriptor));
inventory::submit!(DescriptorFn(image_descriptor));
