//! Shape generators
//!
//! Pure parametric sampling. Angle-based shapes take `segments + 1` evenly
//! spaced samples across their sweep, so a full turn ends where it began.
//! Each shape is a single path tagged with the node's own color.

use penflow_engine::params::{
    ArcParams, CircleParams, EllipseParams, LineParams, PolygonParams, RectParams,
};
use penflow_engine::{ColoredPath, NodeDescriptor, NodeKind, NodeMetadata, Point};

/// Upper bound on sampled segments for any one shape
pub const MAX_SEGMENTS: u32 = 65_536;

/// `segments + 1` points of `f(angle)` with the angle running from
/// `start` to `end` degrees
fn sweep(start: f64, end: f64, segments: u32, f: impl Fn(f64) -> Point) -> Vec<Point> {
    let segments = segments.clamp(1, MAX_SEGMENTS);
    (0..=segments)
        .map(|i| {
            let t = f64::from(i) / f64::from(segments);
            f((start + (end - start) * t).to_radians())
        })
        .collect()
}

pub struct LineNode;

impl LineNode {
    pub fn generate(p: &LineParams) -> Vec<ColoredPath> {
        vec![ColoredPath::new(
            vec![Point::new(p.x1, p.y1), Point::new(p.x2, p.y2)],
            p.color,
        )]
    }
}

impl NodeDescriptor for LineNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Line, "Line", "Straight segment between two points")
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(LineNode::descriptor));

pub struct RectNode;

impl RectNode {
    pub fn generate(p: &RectParams) -> Vec<ColoredPath> {
        let (x0, y0, x1, y1) = (p.x, p.y, p.x + p.width, p.y + p.height);
        vec![ColoredPath::new(
            vec![
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
                Point::new(x0, y0),
            ],
            p.color,
        )]
    }
}

impl NodeDescriptor for RectNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Rect, "Rectangle", "Closed axis-aligned rectangle")
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(RectNode::descriptor));

pub struct CircleNode;

impl CircleNode {
    pub fn generate(p: &CircleParams) -> Vec<ColoredPath> {
        let mut points = sweep(0.0, 360.0, p.segments, |a| {
            Point::new(p.cx + p.radius * a.cos(), p.cy + p.radius * a.sin())
        });
        close(&mut points);
        vec![ColoredPath::new(points, p.color)]
    }
}

impl NodeDescriptor for CircleNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Circle, "Circle", "Circle sampled into straight segments")
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(CircleNode::descriptor));

pub struct EllipseNode;

impl EllipseNode {
    pub fn generate(p: &EllipseParams) -> Vec<ColoredPath> {
        let (sin_r, cos_r) = p.rotation.to_radians().sin_cos();
        let mut points = sweep(0.0, 360.0, p.segments, |a| {
            let (x, y) = (p.rx * a.cos(), p.ry * a.sin());
            Point::new(p.cx + x * cos_r - y * sin_r, p.cy + x * sin_r + y * cos_r)
        });
        close(&mut points);
        vec![ColoredPath::new(points, p.color)]
    }
}

impl NodeDescriptor for EllipseNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Ellipse, "Ellipse", "Rotated ellipse outline")
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(EllipseNode::descriptor));

pub struct ArcNode;

impl ArcNode {
    pub fn generate(p: &ArcParams) -> Vec<ColoredPath> {
        let points = sweep(p.start_angle, p.end_angle, p.segments, |a| {
            Point::new(p.cx + p.radius * a.cos(), p.cy + p.radius * a.sin())
        });
        vec![ColoredPath::new(points, p.color)]
    }
}

impl NodeDescriptor for ArcNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Arc, "Arc", "Circular arc between two angles")
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(ArcNode::descriptor));

pub struct PolygonNode;

impl PolygonNode {
    pub fn generate(p: &PolygonParams) -> Vec<ColoredPath> {
        let sides = p.sides.clamp(3, MAX_SEGMENTS);
        let mut points = sweep(p.rotation, p.rotation + 360.0, sides, |a| {
            Point::new(p.cx + p.radius * a.cos(), p.cy + p.radius * a.sin())
        });
        close(&mut points);
        vec![ColoredPath::new(points, p.color)]
    }
}

impl NodeDescriptor for PolygonNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Polygon, "Polygon", "Regular polygon")
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(PolygonNode::descriptor));

/// Snap the final sample of a full turn onto the first
fn close(points: &mut [Point]) {
    if points.len() > 1 {
        let last = points.len() - 1;
        points[last] = points[0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_circle_with_four_segments() {
        let paths = CircleNode::generate(&CircleParams {
            cx: 50.0,
            cy: 50.0,
            radius: 20.0,
            segments: 4,
            color: Some(1),
        });
        assert_eq!(paths.len(), 1);
        let pts = &paths[0].points;
        assert_eq!(pts.len(), 5);
        assert_close(pts[0], 70.0, 50.0);
        assert_close(pts[1], 50.0, 70.0);
        assert_close(pts[2], 30.0, 50.0);
        assert_close(pts[3], 50.0, 30.0);
        assert_eq!(pts[4], Point::new(70.0, 50.0));
        assert_eq!(paths[0].color, Some(1));
    }

    #[test]
    fn test_zero_segments_still_draws() {
        let paths = ArcNode::generate(&ArcParams {
            segments: 0,
            ..ArcParams::default()
        });
        assert_eq!(paths[0].len(), 2);
    }

    #[test]
    fn test_rect_is_closed() {
        let paths = RectNode::generate(&RectParams {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
            color: None,
        });
        let pts = &paths[0].points;
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[2], Point::new(4.0, 6.0));
        assert_eq!(pts[0], pts[4]);
    }

    #[test]
    fn test_arc_sweep_endpoints() {
        let paths = ArcNode::generate(&ArcParams {
            cx: 0.0,
            cy: 0.0,
            radius: 10.0,
            start_angle: 0.0,
            end_angle: 90.0,
            segments: 2,
            color: None,
        });
        let pts = &paths[0].points;
        assert_eq!(pts.len(), 3);
        assert_close(pts[0], 10.0, 0.0);
        assert_close(pts[2], 0.0, 10.0);
    }

    #[test]
    fn test_polygon_clamps_sides() {
        let paths = PolygonNode::generate(&PolygonParams {
            sides: 1,
            ..PolygonParams::default()
        });
        assert_eq!(paths[0].len(), 4);
    }

    #[test]
    fn test_ellipse_rotation() {
        let paths = EllipseNode::generate(&EllipseParams {
            cx: 0.0,
            cy: 0.0,
            rx: 10.0,
            ry: 5.0,
            rotation: 90.0,
            segments: 4,
            color: None,
        });
        assert_close(paths[0].points[0], 0.0, 10.0);
        assert_close(paths[0].points[1], -5.0, 0.0);
    }
}
