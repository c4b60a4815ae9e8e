//! Stroke text
//!
//! Renders strings with the single-stroke glyph table. The same renderer
//! backs the `text` node and the character cells of the `ascii` node.

pub mod batak;
pub mod glyphs;

use penflow_engine::geometry::simplify;
use penflow_engine::params::TextParams;
use penflow_engine::{ColoredPath, EngineLimits, NodeDescriptor, NodeKind, NodeMetadata, Point};

pub use batak::BatakNode;
pub use glyphs::{Glyph, Mark};

/// How a run of text is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Cap height in mm
    pub size: f64,
    /// Extra mm after every glyph
    pub letter_spacing: f64,
    /// Line pitch as a multiple of `size`
    pub line_height: f64,
    pub color: Option<u8>,
    /// Adjacent points closer than this are merged
    pub tolerance: f64,
}

/// Place em-unit strokes at `origin` scaled by `size`
pub(crate) fn place_strokes(
    strokes: &[Vec<Point>],
    origin: Point,
    style: &TextStyle,
    out: &mut Vec<ColoredPath>,
) {
    for stroke in strokes {
        let placed: Vec<Point> = stroke
            .iter()
            .map(|p| origin.add(p.scale(style.size)))
            .collect();
        let points = simplify(&placed, style.tolerance);
        if points.len() >= 2 {
            out.push(ColoredPath::new(points, style.color));
        }
    }
}

/// Lay out `text` with its first line's top-left corner at `origin`
///
/// Newlines return the cursor to `origin.x`. Combining marks attach to the
/// most recent base glyph on the line; a mark with nothing to attach to is
/// dropped.
pub fn render(text: &str, origin: Point, style: &TextStyle) -> Vec<ColoredPath> {
    let mut out = Vec::new();
    let mut cursor = origin;
    let mut anchor: Option<Point> = None;

    for c in text.chars() {
        if c == '\n' {
            cursor = Point::new(origin.x, cursor.y + style.size * style.line_height);
            anchor = None;
            continue;
        }
        if c == '\r' {
            continue;
        }
        if let Some(mark) = Mark::from_combining(c) {
            if let Some(at) = anchor {
                place_strokes(mark.strokes(), at, style, &mut out);
            }
            continue;
        }

        let (base, mark) = match glyphs::decompose(c) {
            Some((base, mark)) => (base, Some(mark)),
            None => (c, None),
        };
        let advance = match glyphs::glyph(base) {
            Some(g) => {
                place_strokes(&g.strokes, cursor, style, &mut out);
                anchor = Some(cursor.add(g.top_anchor.scale(style.size)));
                g.advance
            }
            None => {
                log::trace!("No glyph for {:?}", c);
                anchor = None;
                glyphs::fallback_advance()
            }
        };
        if let (Some(mark), Some(at)) = (mark, anchor) {
            place_strokes(mark.strokes(), at, style, &mut out);
        }
        cursor.x += advance * style.size + style.letter_spacing;
    }
    out
}

pub struct TextNode;

impl TextNode {
    pub fn generate(p: &TextParams, limits: &EngineLimits) -> Vec<ColoredPath> {
        let style = TextStyle {
            size: p.size,
            letter_spacing: p.letter_spacing,
            line_height: p.line_height,
            color: p.color,
            tolerance: limits.simplify_tolerance,
        };
        render(&p.text, Point::new(p.x, p.y), &style)
    }
}

impl NodeDescriptor for TextNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(NodeKind::Text, "Text", "Single-stroke lettering")
            .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(TextNode::descriptor));

#[cfg(test)]
mod tests {
    use super::*;

    fn params(text: &str) -> TextParams {
        TextParams {
            text: text.to_string(),
            ..TextParams::default()
        }
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

    fn first_x(paths: &[ColoredPath]) -> f64 {
        paths
            .iter()
            .flat_map(|p| p.points.iter())
            .map(|p| p.x)
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn test_glyph_placement() {
        let out = TextNode::generate(&params("A"), &EngineLimits::default());
        assert_eq!(out.len(), 2);
        assert_close(out[0].points[0], 10.0, 20.0);
        assert_close(out[0].points[1], 13.0, 10.0);
    }

    #[test]
    fn test_advance_and_letter_spacing() {
        let limits = EngineLimits::default();
        let plain = TextNode::generate(&params("AL"), &limits);
        // L is the third stroke; its first point is the glyph origin
        assert!((plain[2].points[0].x - 18.0).abs() < 1e-9);

        let spaced = TextNode::generate(
            &TextParams {
                letter_spacing: 2.0,
                ..params("AL")
            },
            &limits,
        );
        assert!((spaced[2].points[0].x - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_newline_uses_line_height() {
        let out = TextNode::generate(&params("L\nL"), &EngineLimits::default());
        assert_eq!(out.len(), 2);
        assert_close(out[1].points[0], 10.0, 24.0);
    }

    #[test]
    fn test_combining_mark_matches_precomposed() {
        let limits = EngineLimits::default();
        let composed = TextNode::generate(&params("é"), &limits);
        let combining = TextNode::generate(&params("e\u{0301}"), &limits);
        assert_eq!(composed, combining);
        assert_eq!(composed.len(), glyphs::glyph('e').unwrap().strokes.len() + 1);
    }

    #[test]
    fn test_unknown_character_advances() {
        let out = TextNode::generate(&params("€L"), &EngineLimits::default());
        assert_eq!(out.len(), 1);
        assert!((first_x(&out) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_color_is_applied() {
        let out = TextNode::generate(
            &TextParams {
                color: Some(2),
                ..params("Hi")
            },
            &EngineLimits::default(),
        );
        assert!(!out.is_empty());
        assert!(out.iter().all(|p| p.color == Some(2)));
    }
}
