//! ASCII-art rendering of an image
//!
//! The target rectangle is divided into character cells. Each cell's
//! brightness picks a character from the charset, which is then drawn with
//! the stroke font.

use penflow_engine::params::AsciiParams;
use penflow_engine::{ColoredPath, NodeDescriptor, NodeKind, NodeMetadata, Point, Raster};

use super::{image_input, Frame};
use crate::text::{self, glyphs, TextStyle};

/// Cell height over cell width when rows are derived
const CELL_ASPECT: f64 = 1.25;
/// Fraction of the cell the glyph may fill
const FILL: f64 = 0.8;

pub struct AsciiNode;

impl AsciiNode {
    pub fn generate(p: &AsciiParams, raster: Option<&Raster>) -> Vec<ColoredPath> {
        let Some(raster) = raster else {
            return Vec::new();
        };
        let Some(frame) = Frame::new(raster, p.x, p.y, p.width, p.height) else {
            return Vec::new();
        };
        let charset: Vec<char> = p.charset.chars().collect();
        if charset.is_empty() || p.cols == 0 {
            return Vec::new();
        }

        let cols = p.cols as usize;
        let cell_w = frame.width / cols as f64;
        let rows = if p.rows > 0 {
            p.rows as usize
        } else {
            ((frame.height / (cell_w * CELL_ASPECT)).round() as usize).max(1)
        };
        let cell_h = frame.height / rows as f64;
        let size = cell_h.min(cell_w / glyphs::fallback_advance()) * FILL;
        let style = TextStyle {
            size,
            letter_spacing: 0.0,
            line_height: 1.0,
            color: p.color,
            tolerance: 0.0,
        };

        let mut out = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                let corner = Point::new(
                    frame.origin.x + col as f64 * cell_w,
                    frame.origin.y + row as f64 * cell_h,
                );
                let center = corner.add(Point::new(cell_w / 2.0, cell_h / 2.0));
                let c = pick(&charset, frame.brightness(center), p.invert);
                let advance = glyphs::glyph(c)
                    .map(|g| g.advance)
                    .unwrap_or_else(glyphs::fallback_advance);
                let origin = corner.add(Point::new(
                    (cell_w - advance * size) / 2.0,
                    (cell_h - size) / 2.0,
                ));
                out.extend(text::render(&c.to_string(), origin, &style));
            }
        }
        out
    }
}

/// Character for `brightness`; the charset runs from lightest to darkest
fn pick(charset: &[char], brightness: f64, invert: bool) -> char {
    let density = if invert { brightness } else { 1.0 - brightness };
    let last = charset.len() - 1;
    let index = (density.clamp(0.0, 1.0) * last as f64).round() as usize;
    charset[index.min(last)]
}

impl NodeDescriptor for AsciiNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Ascii, "ASCII", "Image drawn as a grid of characters")
            .with_input(image_input())
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(AsciiNode::descriptor));

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_pick_maps_darkness() {
        let charset: Vec<char> = " .#".chars().collect();
        assert_eq!(pick(&charset, 1.0, false), ' ');
        assert_eq!(pick(&charset, 0.0, false), '#');
        assert_eq!(pick(&charset, 0.5, false), '.');
        assert_eq!(pick(&charset, 0.0, true), ' ');
    }

    #[test]
    fn test_white_image_draws_spaces() {
        let raster = flat_raster(1.0);
        let p = AsciiParams {
            width: 40.0,
            cols: 4,
            ..AsciiParams::default()
        };
        assert!(AsciiNode::generate(&p, Some(&raster)).is_empty());
    }

    #[test]
    fn test_dark_half_draws_inside_cells() {
        let raster = split_raster(8, 8);
        let p = AsciiParams {
            width: 40.0,
            height: 40.0,
            cols: 4,
            rows: 4,
            color: Some(1),
            ..AsciiParams::default()
        };
        let out = AsciiNode::generate(&p, Some(&raster));
        assert!(!out.is_empty());
        for path in &out {
            assert_eq!(path.color, Some(1));
            for point in &path.points {
                // only the black left half carries ink
                assert!(point.x >= 0.0 && point.x <= 20.0, "{:?}", point);
                assert!(point.y >= 0.0 && point.y <= 40.0);
            }
        }
    }

    #[test]
    fn test_missing_raster_or_empty_charset() {
        assert!(AsciiNode::generate(&AsciiParams::default(), None).is_empty());
        let raster = flat_raster(0.0);
        let p = AsciiParams {
            charset: String::new(),
            ..AsciiParams::default()
        };
        assert!(AsciiNode::generate(&p, Some(&raster)).is_empty());
    }
}
