//! Copying transforms: repeat, grid and radial
//!
//! Every copy is the whole input under one affine transform. Copies are
//! concatenated in generation order.

use penflow_engine::geometry::{centroid, transform_paths};
use penflow_engine::params::{GridParams, RadialParams, RepeatParams};
use penflow_engine::{Affine, ColoredPath, NodeDescriptor, NodeKind, NodeMetadata, Point};

use super::rigid::geometry_input;

fn copies(inputs: &[ColoredPath], transforms: impl IntoIterator<Item = Affine>) -> Vec<ColoredPath> {
    transforms
        .into_iter()
        .flat_map(|t| transform_paths(inputs, &t))
        .collect()
}

pub struct RepeatNode;

impl RepeatNode {
    /// Copy `i` is scaled by `scale^i` and rotated by `i * rotation` about
    /// the input centroid, then moved by `i` offsets
    pub fn apply(p: &RepeatParams, inputs: &[ColoredPath]) -> Vec<ColoredPath> {
        let Some(center) = centroid(inputs) else {
            return Vec::new();
        };
        copies(
            inputs,
            (0..p.count).map(|i| {
                let i = f64::from(i);
                let factor = p.scale.powf(i);
                Affine::scale_about(factor, factor, center)
                    .then(Affine::rotate_about(i * p.rotation, center))
                    .then(Affine::translate(i * p.offset_x, i * p.offset_y))
            }),
        )
    }
}

impl NodeDescriptor for RepeatNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Repeat, "Repeat", "Stepped copies with compounding transform")
            .with_input(geometry_input())
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(RepeatNode::descriptor));

pub struct GridNode;

impl GridNode {
    /// Row-major copies with the input centroid moved onto each lattice point
    pub fn apply(p: &GridParams, inputs: &[ColoredPath]) -> Vec<ColoredPath> {
        let Some(center) = centroid(inputs) else {
            return Vec::new();
        };
        let cells = (0..p.rows).flat_map(|r| (0..p.cols).map(move |c| (r, c)));
        copies(
            inputs,
            cells.map(|(r, c)| {
                Affine::translate(
                    p.start_x + f64::from(c) * p.spacing_x - center.x,
                    p.start_y + f64::from(r) * p.spacing_y - center.y,
                )
            }),
        )
    }
}

impl NodeDescriptor for GridNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Grid, "Grid", "Copies laid out in rows and columns")
            .with_input(geometry_input())
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(GridNode::descriptor));

pub struct RadialNode;

impl RadialNode {
    /// Copies centred on evenly spaced points of a circle
    pub fn apply(p: &RadialParams, inputs: &[ColoredPath]) -> Vec<ColoredPath> {
        let Some(center) = centroid(inputs) else {
            return Vec::new();
        };
        if p.count == 0 {
            return Vec::new();
        }
        let step = 360.0 / f64::from(p.count);
        copies(
            inputs,
            (0..p.count).map(|k| {
                let angle = p.start_angle + f64::from(k) * step;
                let (sin, cos) = angle.to_radians().sin_cos();
                let target = Point::new(p.cx + p.radius * cos, p.cy + p.radius * sin);
                let spin = if p.rotate_copies {
                    Affine::rotate_about(angle, center)
                } else {
                    Affine::IDENTITY
                };
                spin.then(Affine::translate(target.x - center.x, target.y - center.y))
            }),
        )
    }
}

impl NodeDescriptor for RadialNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Radial, "Radial", "Copies arranged around a circle")
            .with_input(geometry_input())
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(RadialNode::descriptor));

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> Vec<ColoredPath> {
        vec![ColoredPath::new(
            vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0)],
            Some(2),
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
    fn test_repeat_offsets() {
        let out = RepeatNode::apply(
            &RepeatParams {
                count: 3,
                offset_x: 10.0,
                offset_y: 0.0,
                rotation: 0.0,
                scale: 1.0,
            },
            &segment(),
        );
        assert_eq!(out.len(), 3);
        assert_close(out[0].points[0], 0.0, 0.0);
        assert_close(out[1].points[0], 10.0, 0.0);
        assert_close(out[2].points[0], 20.0, 0.0);
        assert!(out.iter().all(|p| p.color == Some(2)));
    }

    #[test]
    fn test_repeat_compounds_scale_about_centroid() {
        let out = RepeatNode::apply(
            &RepeatParams {
                count: 3,
                offset_x: 0.0,
                offset_y: 0.0,
                rotation: 0.0,
                scale: 2.0,
            },
            &segment(),
        );
        // centroid (1, 0), copy 2 is scaled by 4
        assert_close(out[2].points[0], -3.0, 0.0);
        assert_close(out[2].points[1], 5.0, 0.0);
    }

    #[test]
    fn test_repeat_zero_count() {
        let out = RepeatNode::apply(
            &RepeatParams {
                count: 0,
                ..RepeatParams::default()
            },
            &segment(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_grid_is_row_major() {
        let far = vec![ColoredPath::new(
            vec![Point::new(100.0, 100.0), Point::new(102.0, 100.0)],
            None,
        )];
        let out = GridNode::apply(
            &GridParams {
                cols: 2,
                rows: 2,
                spacing_x: 10.0,
                spacing_y: 20.0,
                start_x: 0.0,
                start_y: 0.0,
            },
            &far,
        );
        assert_eq!(out.len(), 4);
        // centroid (101, 100) lands on each lattice point
        assert_close(out[0].points[0], -1.0, 0.0);
        assert_close(out[1].points[0], 9.0, 0.0);
        assert_close(out[2].points[0], -1.0, 20.0);
        assert_close(out[3].points[1], 11.0, 20.0);
    }

    #[test]
    fn test_grid_anchors_at_start_point() {
        let far = vec![ColoredPath::new(
            vec![Point::new(100.0, 100.0), Point::new(102.0, 100.0)],
            Some(1),
        )];
        let out = GridNode::apply(
            &GridParams {
                cols: 1,
                rows: 1,
                spacing_x: 10.0,
                spacing_y: 10.0,
                start_x: 0.0,
                start_y: 0.0,
            },
            &far,
        );
        assert_eq!(out.len(), 1);
        assert_close(centroid(&out).unwrap(), 0.0, 0.0);
        assert_eq!(out[0].color, Some(1));
    }

    #[test]
    fn test_radial_places_centroids_on_circle() {
        let out = RadialNode::apply(
            &RadialParams {
                count: 4,
                radius: 10.0,
                cx: 0.0,
                cy: 0.0,
                start_angle: 0.0,
                rotate_copies: true,
            },
            &segment(),
        );
        assert_eq!(out.len(), 4);
        let second = centroid(&out[1..2]).unwrap();
        assert_close(second, 0.0, 10.0);
        // the copy at 90 degrees is turned upright
        assert!((out[1].points[0].x - out[1].points[1].x).abs() < 1e-9);
    }

    #[test]
    fn test_radial_without_rotation() {
        let out = RadialNode::apply(
            &RadialParams {
                count: 2,
                radius: 10.0,
                cx: 0.0,
                cy: 0.0,
                start_angle: 0.0,
                rotate_copies: false,
            },
            &segment(),
        );
        assert_close(out[1].points[0], -11.0, 0.0);
        assert_close(out[1].points[1], -9.0, 0.0);
    }
}
