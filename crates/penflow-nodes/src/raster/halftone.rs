//! Wave halftone
//!
//! Parallel scan lines cross the target rectangle at `angle`. Along each
//! line the pen is pushed sideways by a periodic wave whose amplitude grows
//! with the darkness underneath. A scan line leaving the rectangle is split.

use std::f64::consts::{PI, TAU};

use penflow_engine::params::{HalftoneParams, Waveform};
use penflow_engine::{ColoredPath, NodeDescriptor, NodeKind, NodeMetadata, Point, Raster};

use super::{image_input, Frame, MAX_SAMPLES, MAX_SCAN_LINES};

/// Periodic wave in `[-1, 1]` at `phase` radians
pub fn wave(waveform: Waveform, phase: f64) -> f64 {
    match waveform {
        Waveform::Sine => phase.sin(),
        Waveform::Triangle => (2.0 / PI) * phase.sin().asin(),
        Waveform::Zigzag => {
            let cycle = (phase / TAU).rem_euclid(1.0);
            2.0 * cycle - 1.0
        }
        Waveform::Square => {
            if phase.sin() >= 0.0 {
                1.0
            } else {
                -1.0
            }
        }
    }
}

pub struct HalftoneNode;

impl HalftoneNode {
    pub fn generate(p: &HalftoneParams, raster: Option<&Raster>) -> Vec<ColoredPath> {
        let Some(raster) = raster else {
            return Vec::new();
        };
        let Some(frame) = Frame::new(raster, p.x, p.y, p.width, p.height) else {
            return Vec::new();
        };
        if !(p.spacing > 0.0 && p.resolution > 0.0) {
            return Vec::new();
        }

        let (sin, cos) = p.angle.to_radians().sin_cos();
        let along = Point::new(cos, sin);
        let normal = Point::new(-sin, cos);
        let center = frame.center();
        let reach = frame.width.hypot(frame.height) / 2.0;
        let spacing = p.spacing.max(2.0 * reach / MAX_SCAN_LINES as f64);
        let resolution = p.resolution.max(2.0 * reach / MAX_SAMPLES as f64);
        let lines = (2.0 * reach / spacing).floor() as usize;
        let steps = (2.0 * reach / resolution).ceil() as usize;

        let mut out = Vec::new();
        for k in 0..=lines {
            let offset = -reach + k as f64 * spacing;
            let mut run: Vec<Point> = Vec::new();
            for i in 0..=steps {
                let s = -reach + i as f64 * resolution;
                let base = center.add(normal.scale(offset)).add(along.scale(s));
                if !frame.contains(base) {
                    flush(&mut run, &mut out, p.color);
                    continue;
                }
                let darkness = 1.0 - frame.brightness(base);
                let lift = darkness * p.amplitude * wave(p.waveform, TAU * p.frequency * s);
                run.push(base.add(normal.scale(lift)));
            }
            flush(&mut run, &mut out, p.color);
        }
        out
    }
}

fn flush(run: &mut Vec<Point>, out: &mut Vec<ColoredPath>, color: Option<u8>) {
    let points = std::mem::take(run);
    if points.len() >= 2 {
        out.push(ColoredPath::new(points, color));
    }
}

impl NodeDescriptor for HalftoneNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(
            NodeKind::Halftone,
            "Halftone",
            "Scan lines displaced by image darkness",
        )
        .with_input(image_input())
        .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(HalftoneNode::descriptor));

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn params() -> HalftoneParams {
        HalftoneParams {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
            spacing: 5.0,
            color: Some(2),
            ..HalftoneParams::default()
        }
    }

    #[test]
    fn test_no_raster_is_empty() {
        assert!(HalftoneNode::generate(&params(), None).is_empty());
    }

    #[test]
    fn test_tiny_steps_are_bounded() {
        let raster = flat_raster(0.5);
        let p = HalftoneParams {
            spacing: 1e-9,
            resolution: 1e-9,
            ..params()
        };
        let out = HalftoneNode::generate(&p, Some(&raster));
        assert!(!out.is_empty());
        assert!(out.len() <= MAX_SCAN_LINES + 1);
        assert!(out.iter().all(|path| path.points.len() <= MAX_SAMPLES + 1));
    }

    #[test]
    fn test_white_image_gives_straight_lines() {
        let raster = flat_raster(1.0);
        let out = HalftoneNode::generate(&params(), Some(&raster));
        assert!(!out.is_empty());
        for path in &out {
            let y = path.points[0].y;
            assert!(path.points.iter().all(|p| (p.y - y).abs() < 1e-9));
            assert_eq!(path.color, Some(2));
        }
    }

    #[test]
    fn test_dark_image_displaces() {
        let raster = flat_raster(0.0);
        let out = HalftoneNode::generate(&params(), Some(&raster));
        let wobbles = out.iter().any(|path| {
            let y = path.points[0].y;
            path.points.iter().any(|p| (p.y - y).abs() > 0.1)
        });
        assert!(wobbles);
    }

    #[test]
    fn test_lines_stay_inside_frame() {
        let raster = flat_raster(1.0);
        let out = HalftoneNode::generate(&params(), Some(&raster));
        for p in out.iter().flat_map(|path| path.points.iter()) {
            assert!(p.x >= 0.0 && p.x <= 20.0 && p.y >= 0.0 && p.y <= 20.0);
        }
    }

    #[test]
    fn test_waveforms() {
        assert!((wave(Waveform::Sine, PI / 2.0) - 1.0).abs() < 1e-12);
        assert!((wave(Waveform::Triangle, PI / 2.0) - 1.0).abs() < 1e-12);
        assert!((wave(Waveform::Triangle, PI / 4.0) - 0.5).abs() < 1e-12);
        assert_eq!(wave(Waveform::Square, 4.0), -1.0);
        assert!((wave(Waveform::Zigzag, PI) - 0.0).abs() < 1e-12);
    }
}
