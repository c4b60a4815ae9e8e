//! Core node executor with built-in algorithm handlers.
//!
//! `CoreNodeExecutor` routes every non-structural kind to its algorithm.
//! Hosts that want extra kinds wrap it and fall back to it for the rest.

use penflow_engine::geometry::drawable;
use penflow_engine::{NodeExecutor, NodeOutput, NodeParams, NodeRequest, Result};

use crate::code::CodeNode;
use crate::procedural::{AttractorNode, LSystemNode};
use crate::raster::{AsciiNode, HalftoneNode, MaskNode};
use crate::shapes::{ArcNode, CircleNode, EllipseNode, LineNode, PolygonNode, RectNode};
use crate::text::{BatakNode, TextNode};
use crate::transform::{
    BytebeatNode, GridNode, PathNode, RadialNode, RepeatNode, RotateNode, ScaleNode,
    TranslateNode,
};

/// Executor for every built-in node kind
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreNodeExecutor;

impl CoreNodeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl NodeExecutor for CoreNodeExecutor {
    fn execute(&self, request: &NodeRequest<'_>) -> Result<NodeOutput> {
        let inputs = request.inputs;
        let limits = &request.config.limits;
        let paths = match request.params {
            // Structural kinds are resolved by the engine
            NodeParams::Output | NodeParams::Group | NodeParams::Image(_) => Vec::new(),
            NodeParams::Unknown(_) => {
                log::debug!(
                    "No handler for node type '{}' on '{}'",
                    request.node.node_type,
                    request.node.id
                );
                Vec::new()
            }

            NodeParams::Line(p) => LineNode::generate(p),
            NodeParams::Rect(p) => RectNode::generate(p),
            NodeParams::Circle(p) => CircleNode::generate(p),
            NodeParams::Ellipse(p) => EllipseNode::generate(p),
            NodeParams::Arc(p) => ArcNode::generate(p),
            NodeParams::Polygon(p) => PolygonNode::generate(p),

            NodeParams::Attractor(p) => AttractorNode::generate(p, limits),
            NodeParams::LSystem(p) => LSystemNode::generate(p, inputs, limits),
            NodeParams::Text(p) => TextNode::generate(p, limits),
            NodeParams::Batak(p) => BatakNode::generate(p, limits),

            NodeParams::Halftone(p) => HalftoneNode::generate(p, request.raster),
            NodeParams::Ascii(p) => AsciiNode::generate(p, request.raster),
            NodeParams::Mask(p) => MaskNode::apply(p, inputs, request.raster),

            NodeParams::Path(p) => PathNode::apply(p, inputs, limits),
            NodeParams::Repeat(p) => RepeatNode::apply(p, inputs),
            NodeParams::Grid(p) => GridNode::apply(p, inputs),
            NodeParams::Radial(p) => RadialNode::apply(p, inputs),
            NodeParams::Translate(p) => TranslateNode::apply(p, inputs),
            NodeParams::Rotate(p) => RotateNode::apply(p, inputs),
            NodeParams::Scale(p) => ScaleNode::apply(p, inputs),
            NodeParams::Bytebeat(p) => BytebeatNode::apply(p, inputs),

            NodeParams::Code(p) => match CodeNode::run(p, inputs, &request.config.script) {
                Ok(paths) => paths,
                Err(e) => {
                    log::warn!("Code node '{}' failed: {}", request.node.id, e);
                    return Ok(NodeOutput::failed(e.to_string()));
                }
            },
        };
        Ok(NodeOutput::paths(drawable(paths)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penflow_engine::params::{CodeParams, LineParams};
    use penflow_engine::{EngineConfig, GraphNode, Point};

    fn request_output(params: NodeParams) -> NodeOutput {
        let node = GraphNode::new("n", "line");
        let config = EngineConfig::default();
        let request = NodeRequest {
            node: &node,
            params: &params,
            inputs: &[],
            raster: None,
            config: &config,
        };
        CoreNodeExecutor::new().execute(&request).unwrap()
    }

    #[test]
    fn test_dispatches_generators() {
        let out = request_output(NodeParams::Line(LineParams {
            x1: 0.0,
            y1: 0.0,
            x2: 10.0,
            y2: 0.0,
            color: Some(1),
        }));
        assert_eq!(out.error, None);
        assert_eq!(out.paths.len(), 1);
        assert_eq!(out.paths[0].points[1], Point::new(10.0, 0.0));
    }

    #[test]
    fn test_structural_and_unknown_are_empty() {
        assert_eq!(request_output(NodeParams::Output), NodeOutput::empty());
        assert_eq!(
            request_output(NodeParams::Unknown(serde_json::json!({}))),
            NodeOutput::empty()
        );
    }

    #[test]
    fn test_script_failure_is_node_local() {
        let out = request_output(NodeParams::Code(CodeParams {
            code: "throw \"boom\"".to_string(),
            ..CodeParams::default()
        }));
        assert!(out.paths.is_empty());
        assert!(out.error.unwrap().contains("boom"));
    }

    #[test]
    fn test_degenerate_line_is_dropped() {
        let out = request_output(NodeParams::Line(LineParams {
            x1: f64::NAN,
            ..LineParams::default()
        }));
        assert!(out.paths.is_empty());
    }
}
