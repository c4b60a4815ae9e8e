//! User code node
//!
//! Runs a Rhai script against the upstream geometry. Failures are local to
//! the node: the executor turns them into an empty output carrying the
//! error message.

pub mod noise;
pub mod sandbox;

use penflow_engine::params::CodeParams;
use penflow_engine::{
    ColoredPath, NodeDescriptor, NodeKind, NodeMetadata, PortDataType, PortMetadata, Result,
    ScriptLimits,
};

pub struct CodeNode;

impl CodeNode {
    pub const PORT_INPUT: &'static str = "in";

    pub fn run(
        p: &CodeParams,
        inputs: &[ColoredPath],
        limits: &ScriptLimits,
    ) -> Result<Vec<ColoredPath>> {
        sandbox::run_script(&p.code, inputs, p.seed, limits)
    }
}

impl NodeDescriptor for CodeNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Code, "Code", "Sandboxed Rhai script over the input")
            .with_input(
                PortMetadata::optional(Self::PORT_INPUT, "Paths", PortDataType::Geometry).multiple(),
            )
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(CodeNode::descriptor));
