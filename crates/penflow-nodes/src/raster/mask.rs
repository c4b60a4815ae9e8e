//! Brightness mask over incoming geometry
//!
//! Input paths are resampled and cut wherever the image underneath crosses
//! the threshold. A non-zero `feather` adds hysteresis so noise near the
//! threshold does not shred a stroke into fragments.

use penflow_engine::params::MaskParams;
use penflow_engine::{
    ColoredPath, NodeDescriptor, NodeKind, NodeMetadata, Point, PortDataType, PortMetadata, Raster,
};

use super::{image_input, Frame, MAX_SAMPLES};

pub struct MaskNode;

impl MaskNode {
    pub const PORT_INPUT: &'static str = "in";

    pub fn apply(
        p: &MaskParams,
        inputs: &[ColoredPath],
        raster: Option<&Raster>,
    ) -> Vec<ColoredPath> {
        let Some(raster) = raster else {
            return Vec::new();
        };
        let Some(frame) = Frame::new(raster, p.x, p.y, p.width, p.height) else {
            return Vec::new();
        };
        if !(p.resolution > 0.0) {
            return Vec::new();
        }

        let band = p.feather.max(0.0) / 2.0;
        let margin = |at: Point| {
            let b = frame.brightness(at);
            if p.invert {
                b - p.threshold
            } else {
                p.threshold - b
            }
        };

        let mut out = Vec::new();
        for path in inputs {
            let samples = resample(&path.points, p.resolution);
            let mut run: Vec<Point> = Vec::new();
            let mut inside = false;
            let mut prev: Option<Point> = None;
            for at in samples {
                let m = margin(at);
                let enter = if p.invert { m >= band } else { m > band };
                let keep = enter || (inside && m > -band);
                match (inside, keep, prev) {
                    (false, true, Some(before)) => run.push(before.lerp(at, 0.5)),
                    (true, false, Some(before)) => {
                        run.push(before.lerp(at, 0.5));
                        flush(&mut run, &mut out, path.color);
                    }
                    _ => {}
                }
                if keep {
                    run.push(at);
                }
                inside = keep;
                prev = Some(at);
            }
            flush(&mut run, &mut out, path.color);
        }
        out
    }
}

/// Points along `points` no more than `step` apart, keeping every vertex
///
/// A segment is never split into more than [`MAX_SAMPLES`] pieces.
fn resample(points: &[Point], step: f64) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut out = vec![first];
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let pieces = ((a.distance(b) / step).ceil().max(1.0) as usize).min(MAX_SAMPLES);
        for i in 1..=pieces {
            out.push(a.lerp(b, i as f64 / pieces as f64));
        }
    }
    out
}

fn flush(run: &mut Vec<Point>, out: &mut Vec<ColoredPath>, color: Option<u8>) {
    let points = std::mem::take(run);
    if points.len() >= 2 {
        out.push(ColoredPath::new(points, color));
    }
}

impl NodeDescriptor for MaskNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Mask, "Mask", "Keep geometry over dark image regions")
            .with_input(image_input())
            .with_input(
                PortMetadata::required(Self::PORT_INPUT, "Paths", PortDataType::Geometry).multiple(),
            )
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(MaskNode::descriptor));

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn horizontal(color: Option<u8>) -> Vec<ColoredPath> {
        vec![ColoredPath::new(
            vec![Point::new(0.0, 20.0), Point::new(40.0, 20.0)],
            color,
        )]
    }

    fn params() -> MaskParams {
        MaskParams {
            width: 40.0,
            height: 40.0,
            resolution: 1.0,
            ..MaskParams::default()
        }
    }

    #[test]
    fn test_keeps_dark_half() {
        let raster = split_raster(8, 8);
        let out = MaskNode::apply(&params(), &horizontal(Some(3)), Some(&raster));
        assert_eq!(out.len(), 1);
        let path = &out[0];
        assert_eq!(path.color, Some(3));
        assert_eq!(path.points[0], Point::new(0.0, 20.0));
        let end = path.points[path.points.len() - 1];
        assert!(end.x > 15.0 && end.x < 25.0, "{:?}", end);
    }

    #[test]
    fn test_invert_keeps_light_half() {
        let raster = split_raster(8, 8);
        let p = MaskParams {
            invert: true,
            ..params()
        };
        let out = MaskNode::apply(&p, &horizontal(None), Some(&raster));
        assert_eq!(out.len(), 1);
        assert!(out[0].points[0].x > 15.0);
        assert_eq!(out[0].points[out[0].points.len() - 1], Point::new(40.0, 20.0));
    }

    #[test]
    fn test_outside_frame_reads_white() {
        let raster = flat_raster(0.0);
        let path = vec![ColoredPath::new(
            vec![Point::new(100.0, 100.0), Point::new(120.0, 100.0)],
            None,
        )];
        assert!(MaskNode::apply(&params(), &path, Some(&raster)).is_empty());
    }

    #[test]
    fn test_feather_needs_clear_darkness_to_enter() {
        let raster = flat_raster(0.45);
        let p = MaskParams {
            feather: 0.2,
            ..params()
        };
        assert!(MaskNode::apply(&p, &horizontal(None), Some(&raster)).is_empty());
        let plain = MaskNode::apply(&params(), &horizontal(None), Some(&raster));
        assert_eq!(plain.len(), 1);
    }

    #[test]
    fn test_no_raster_is_empty() {
        assert!(MaskNode::apply(&params(), &horizontal(None), None).is_empty());
    }

    #[test]
    fn test_resample_keeps_endpoints() {
        let pts = resample(&[Point::new(0.0, 0.0), Point::new(3.0, 0.0)], 1.0);
        assert_eq!(pts.len(), 4);
        assert_eq!(pts[3], Point::new(3.0, 0.0));
    }

    #[test]
    fn test_resample_is_bounded() {
        let pts = resample(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)], 1e-12);
        assert_eq!(pts.len(), MAX_SAMPLES + 1);
        assert_eq!(pts[MAX_SAMPLES], Point::new(100.0, 0.0));
    }
}
