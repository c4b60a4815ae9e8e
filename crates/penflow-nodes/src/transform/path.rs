//! Bend geometry along a curve
//!
//! The input's x axis is mapped onto arclength along the curve and its y
//! axis onto the curve normal. Arclength is tabulated from a fixed number of
//! samples, so the mapping is deterministic for a given sample count.

use penflow_engine::geometry::bounds;
use penflow_engine::params::{Alignment, Curve, PathParams};
use penflow_engine::{ColoredPath, EngineLimits, NodeDescriptor, NodeKind, NodeMetadata, Point};

use super::rigid::geometry_input;

/// Sampled curve with cumulative arclength
#[derive(Debug, Clone)]
pub struct ArclengthTable {
    points: Vec<Point>,
    cumulative: Vec<f64>,
    closed: bool,
}

impl ArclengthTable {
    /// Sample `curve` at `samples + 1` evenly spaced parameters
    pub fn new(curve: impl Fn(f64) -> Point, samples: usize, closed: bool) -> Self {
        let samples = samples.max(1);
        let points: Vec<Point> = (0..=samples)
            .map(|i| curve(i as f64 / samples as f64))
            .collect();
        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for pair in points.windows(2) {
            total += pair[0].distance(pair[1]);
            cumulative.push(total);
        }
        Self {
            points,
            cumulative,
            closed,
        }
    }

    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Position and unit tangent at arclength `d`
    ///
    /// Closed curves wrap; open curves continue along the end tangents.
    pub fn locate(&self, d: f64) -> (Point, Point) {
        let total = self.length();
        if total <= 0.0 || self.points.len() < 2 {
            return (self.points[0], Point::new(1.0, 0.0));
        }
        let last = self.points.len() - 1;
        let d = if self.closed { d.rem_euclid(total) } else { d };

        if d <= 0.0 {
            let tangent = unit(self.points[1].sub(self.points[0]));
            return (self.points[0].add(tangent.scale(d)), tangent);
        }
        if d >= total {
            let tangent = unit(self.points[last].sub(self.points[last - 1]));
            return (self.points[last].add(tangent.scale(d - total)), tangent);
        }

        // first sample at or past d
        let upper = self.cumulative.partition_point(|&c| c < d).clamp(1, last);
        let lower = upper - 1;
        let span = self.cumulative[upper] - self.cumulative[lower];
        let t = if span > 0.0 {
            (d - self.cumulative[lower]) / span
        } else {
            0.0
        };
        let (a, b) = (self.points[lower], self.points[upper]);
        (a.lerp(b, t), unit(b.sub(a)))
    }
}

fn unit(v: Point) -> Point {
    let len = v.length();
    if len > 0.0 {
        v.scale(1.0 / len)
    } else {
        Point::new(1.0, 0.0)
    }
}

fn polar(cx: f64, cy: f64, radius: f64, degrees: f64) -> Point {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point::new(cx + radius * cos, cy + radius * sin)
}

/// Arclength table for the configured curve
pub fn curve_table(p: &PathParams, samples: usize) -> ArclengthTable {
    let (dir_sin, dir_cos) = p.angle.to_radians().sin_cos();
    let along = move |distance: f64, offset: f64| {
        Point::new(
            p.cx + distance * dir_cos - offset * dir_sin,
            p.cy + distance * dir_sin + offset * dir_cos,
        )
    };
    match p.curve {
        Curve::Circle => ArclengthTable::new(
            |s| polar(p.cx, p.cy, p.radius, p.start_angle + s * 360.0),
            samples,
            true,
        ),
        Curve::Arc => ArclengthTable::new(
            |s| polar(p.cx, p.cy, p.radius, p.start_angle + s * (p.end_angle - p.start_angle)),
            samples,
            false,
        ),
        Curve::Line => ArclengthTable::new(|s| along(s * p.length, 0.0), samples, false),
        Curve::Wave => ArclengthTable::new(
            |s| {
                let distance = s * p.length;
                let phase = if p.wavelength != 0.0 {
                    distance / p.wavelength * std::f64::consts::TAU
                } else {
                    0.0
                };
                along(distance, p.amplitude * phase.sin())
            },
            samples,
            false,
        ),
        Curve::Spiral => ArclengthTable::new(
            |s| {
                polar(
                    p.cx,
                    p.cy,
                    p.radius + s * p.turns * p.spacing,
                    p.start_angle + s * p.turns * 360.0,
                )
            },
            samples,
            false,
        ),
    }
}

pub struct PathNode;

impl PathNode {
    pub fn apply(p: &PathParams, inputs: &[ColoredPath], limits: &EngineLimits) -> Vec<ColoredPath> {
        let Some(b) = bounds(inputs) else {
            return Vec::new();
        };
        let table = curve_table(p, limits.curve_samples);
        let total = table.length();
        let offset = match p.alignment {
            Alignment::Start => 0.0,
            Alignment::Center => (total - b.width()) / 2.0,
            Alignment::End => total - b.width(),
        };
        let mid_y = b.center().y;

        inputs
            .iter()
            .map(|path| {
                path.map_points(|pt| {
                    let mut d = pt.x - b.min_x + offset;
                    if p.reverse {
                        d = total - d;
                    }
                    let (position, tangent) = table.locate(d);
                    let normal = Point::new(-tangent.y, tangent.x);
                    position.add(normal.scale(pt.y - mid_y))
                })
            })
            .collect()
    }
}

impl NodeDescriptor for PathNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Path, "Path", "Bend the input along a curve")
            .with_input(geometry_input())
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(PathNode::descriptor));

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(y: f64, width: f64) -> Vec<ColoredPath> {
        vec![ColoredPath::new(
            vec![Point::new(0.0, y), Point::new(width, y)],
            Some(1),
        )]
    }

    fn line_params() -> PathParams {
        PathParams {
            curve: Curve::Line,
            cx: 0.0,
            cy: 0.0,
            length: 200.0,
            angle: 0.0,
            ..PathParams::default()
        }
    }

    fn assert_close(p: Point, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() < 1e-6 && (p.y - y).abs() < 1e-6,
            "expected ({}, {}), got ({}, {})",
            x,
            y,
            p.x,
            p.y
        );
    }

    #[test]
    fn test_line_maps_x_to_arclength() {
        let out = PathNode::apply(&line_params(), &bar(5.0, 50.0), &EngineLimits::default());
        assert_close(out[0].points[0], 0.0, 0.0);
        assert_close(out[0].points[1], 50.0, 0.0);
        assert_eq!(out[0].color, Some(1));
    }

    #[test]
    fn test_alignment_offsets() {
        let limits = EngineLimits::default();
        let centered = PathNode::apply(
            &PathParams {
                alignment: Alignment::Center,
                ..line_params()
            },
            &bar(0.0, 50.0),
            &limits,
        );
        assert_close(centered[0].points[0], 75.0, 0.0);

        let end = PathNode::apply(
            &PathParams {
                alignment: Alignment::End,
                ..line_params()
            },
            &bar(0.0, 50.0),
            &limits,
        );
        assert_close(end[0].points[1], 200.0, 0.0);
    }

    #[test]
    fn test_reverse_runs_from_the_far_end() {
        let out = PathNode::apply(
            &PathParams {
                reverse: true,
                ..line_params()
            },
            &bar(0.0, 50.0),
            &EngineLimits::default(),
        );
        assert_close(out[0].points[0], 200.0, 0.0);
        assert_close(out[0].points[1], 150.0, 0.0);
    }

    #[test]
    fn test_open_curve_extrapolates() {
        let out = PathNode::apply(&line_params(), &bar(0.0, 300.0), &EngineLimits::default());
        assert_close(out[0].points[1], 300.0, 0.0);
    }

    #[test]
    fn test_normal_displacement() {
        let input = vec![ColoredPath::new(
            vec![Point::new(0.0, 0.0), Point::new(0.0, 4.0)],
            None,
        )];
        let out = PathNode::apply(&line_params(), &input, &EngineLimits::default());
        assert_close(out[0].points[0], 0.0, -2.0);
        assert_close(out[0].points[1], 0.0, 2.0);
    }

    #[test]
    fn test_circle_wraps() {
        let params = PathParams {
            curve: Curve::Circle,
            cx: 0.0,
            cy: 0.0,
            radius: 10.0,
            ..PathParams::default()
        };
        let table = curve_table(&params, 1_000);
        let total = table.length();
        let (start, _) = table.locate(0.0);
        let (wrapped, _) = table.locate(total + 5.0);
        let (direct, _) = table.locate(5.0);
        assert_close(start, 10.0, 0.0);
        assert_close(wrapped, direct.x, direct.y);
    }

    #[test]
    fn test_empty_input() {
        assert!(PathNode::apply(&line_params(), &[], &EngineLimits::default()).is_empty());
    }
}
