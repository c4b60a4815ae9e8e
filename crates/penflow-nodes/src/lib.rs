//! Penflow Nodes
//!
//! The algorithm behind every node kind of the Penflow engine, plus the
//! executor that dispatches to them and the `execute_flow` entry point.
//! Every algorithm is a pure function of its parameters and inputs.
//!
//! # Categories
//!
//! - **Shapes**: line, rect, circle, ellipse, arc, polygon
//! - **Procedural**: strange attractors and L-systems
//! - **Text**: stroke-font text and Batak script
//! - **Raster**: halftone, ASCII art and brightness masks over an image
//! - **Transform**: rigid transforms, repetition, curve layout, bytebeat
//! - **Code**: sandboxed Rhai scripts

pub mod code;
pub mod executor;
pub mod flow;
pub mod procedural;
pub mod raster;
pub mod shapes;
pub mod text;
pub mod transform;

// Re-export all nodes for convenience
pub use code::CodeNode;
pub use executor::CoreNodeExecutor;
pub use flow::{execute_flow, Flow, FlowError, FlowResult};
pub use procedural::*;
pub use raster::{AsciiNode, HalftoneNode, MaskNode};
pub use shapes::*;
pub use text::{BatakNode, TextNode};
pub use transform::*;

#[cfg(test)]
mod tests {
    use penflow_engine::{NodeKind, NodeRegistry};

    #[test]
    fn test_inventory_collects_all_builtins() {
        let registry = NodeRegistry::with_builtins();
        assert_eq!(registry.all_metadata().len(), 25, "Expected 25 built-in kinds");

        for kind in NodeKind::ALL {
            assert!(
                registry.has_node_type(kind.as_str()),
                "missing descriptor for {}",
                kind
            );
        }
    }

    #[test]
    fn test_raster_kinds_take_an_image() {
        let registry = NodeRegistry::with_builtins();
        for kind in [NodeKind::Halftone, NodeKind::Ascii, NodeKind::Mask] {
            let metadata = registry.get_metadata(kind.as_str()).unwrap();
            assert!(metadata.inputs.iter().any(|port| port.id == "image"));
        }
    }
}
