//! Single affine transforms: translate, rotate and scale

use penflow_engine::geometry::{centroid, transform_paths};
use penflow_engine::params::{Pivot, RotateParams, ScaleParams, TranslateParams};
use penflow_engine::{
    Affine, ColoredPath, NodeDescriptor, NodeKind, NodeMetadata, Point, PortDataType,
    PortMetadata,
};

pub const PORT_INPUT: &str = "in";

pub(crate) fn geometry_input() -> PortMetadata {
    PortMetadata::required(PORT_INPUT, "Paths", PortDataType::Geometry).multiple()
}

/// Resolve a pivot against the input; `None` only when the centroid of an
/// empty input is requested
pub fn resolve_pivot(pivot: Pivot, x: f64, y: f64, inputs: &[ColoredPath]) -> Option<Point> {
    match pivot {
        Pivot::Centroid => centroid(inputs),
        Pivot::Origin => Some(Point::default()),
        Pivot::Point => Some(Point::new(x, y)),
    }
}

pub struct TranslateNode;

impl TranslateNode {
    pub fn apply(p: &TranslateParams, inputs: &[ColoredPath]) -> Vec<ColoredPath> {
        transform_paths(inputs, &Affine::translate(p.dx, p.dy))
    }
}

impl NodeDescriptor for TranslateNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Translate, "Translate", "Move the input")
            .with_input(geometry_input())
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(TranslateNode::descriptor));

pub struct RotateNode;

impl RotateNode {
    pub fn apply(p: &RotateParams, inputs: &[ColoredPath]) -> Vec<ColoredPath> {
        match resolve_pivot(p.pivot, p.pivot_x, p.pivot_y, inputs) {
            Some(pivot) => transform_paths(inputs, &Affine::rotate_about(p.angle, pivot)),
            None => Vec::new(),
        }
    }
}

impl NodeDescriptor for RotateNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Rotate, "Rotate", "Rotate the input about a pivot")
            .with_input(geometry_input())
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(RotateNode::descriptor));

pub struct ScaleNode;

impl ScaleNode {
    pub fn apply(p: &ScaleParams, inputs: &[ColoredPath]) -> Vec<ColoredPath> {
        let sy = if p.uniform { p.sx } else { p.sy };
        match resolve_pivot(p.pivot, p.pivot_x, p.pivot_y, inputs) {
            Some(pivot) => transform_paths(inputs, &Affine::scale_about(p.sx, sy, pivot)),
            None => Vec::new(),
        }
    }
}

impl NodeDescriptor for ScaleNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Scale, "Scale", "Scale the input about a pivot")
            .with_input(geometry_input())
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(ScaleNode::descriptor));

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<ColoredPath> {
        vec![ColoredPath::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(2.0, 2.0),
                Point::new(0.0, 2.0),
            ],
            Some(1),
        )]
    }

    fn assert_close(p: Point, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9,
            "expected ({}, {}), got ({}, {})",
            x,
            y,
            p.x,
            p.y
        );
    }

    #[test]
    fn test_translate_keeps_color() {
        let out = TranslateNode::apply(&TranslateParams { dx: 5.0, dy: -1.0 }, &square());
        assert_close(out[0].points[2], 7.0, 1.0);
        assert_eq!(out[0].color, Some(1));
    }

    #[test]
    fn test_rotate_about_centroid() {
        let out = RotateNode::apply(
            &RotateParams {
                angle: 90.0,
                ..RotateParams::default()
            },
            &square(),
        );
        // centroid (1, 1): (0, 0) -> (2, 0)
        assert_close(out[0].points[0], 2.0, 0.0);
    }

    #[test]
    fn test_rotate_about_explicit_point() {
        let out = RotateNode::apply(
            &RotateParams {
                angle: 180.0,
                pivot: Pivot::Point,
                pivot_x: 0.0,
                pivot_y: 0.0,
            },
            &square(),
        );
        assert_close(out[0].points[2], -2.0, -2.0);
    }

    #[test]
    fn test_uniform_scale_ignores_sy() {
        let out = ScaleNode::apply(
            &ScaleParams {
                sx: 2.0,
                sy: 5.0,
                pivot: Pivot::Origin,
                ..ScaleParams::default()
            },
            &square(),
        );
        assert_close(out[0].points[2], 4.0, 4.0);

        let stretched = ScaleNode::apply(
            &ScaleParams {
                sx: 2.0,
                sy: 5.0,
                uniform: false,
                pivot: Pivot::Origin,
                ..ScaleParams::default()
            },
            &square(),
        );
        assert_close(stretched[0].points[2], 4.0, 10.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(RotateNode::apply(&RotateParams::default(), &[]).is_empty());
        assert!(TranslateNode::apply(&TranslateParams::default(), &[]).is_empty());
    }
}
