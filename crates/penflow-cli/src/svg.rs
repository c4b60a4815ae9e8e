//! SVG preview writer
//!
//! One `<polyline>` per path, stroked with its ink well's preview color.
//! Coordinates stay in millimeters; the view box hugs the drawing.

use std::fmt::Write;

use penflow_engine::geometry::bounds;
use penflow_engine::ColoredPath;

const MARGIN: f64 = 5.0;
const STROKE_WIDTH: f64 = 0.3;

/// Preview color for each ink well
const WELL_COLORS: [&str; 4] = ["#1a1a1a", "#d62728", "#1f77b4", "#2ca02c"];
const UNSET_COLOR: &str = "#7f7f7f";

fn well_color(color: Option<u8>) -> &'static str {
    color
        .and_then(|well| WELL_COLORS.get(usize::from(well)).copied())
        .unwrap_or(UNSET_COLOR)
}

pub fn render_svg(paths: &[ColoredPath]) -> String {
    let (x, y, w, h) = match bounds(paths) {
        Some(b) => (
            b.min_x - MARGIN,
            b.min_y - MARGIN,
            b.width() + 2.0 * MARGIN,
            b.height() + 2.0 * MARGIN,
        ),
        None => (0.0, 0.0, 2.0 * MARGIN, 2.0 * MARGIN),
    };

    let mut svg = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}mm" height="{h}mm" viewBox="{x} {y} {w} {h}">"#
    );
    for path in paths {
        let points: Vec<String> = path
            .points
            .iter()
            .map(|p| format!("{:.3},{:.3}", p.x, p.y))
            .collect();
        let _ = writeln!(
            svg,
            r#"  <polyline fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round" points="{}"/>"#,
            well_color(path.color),
            STROKE_WIDTH,
            points.join(" ")
        );
    }
    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use penflow_engine::Point;

    #[test]
    fn test_one_polyline_per_path() {
        let paths = vec![
            ColoredPath::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)], Some(1)),
            ColoredPath::new(vec![Point::new(0.0, 5.0), Point::new(10.0, 5.0)], None),
        ];
        let svg = render_svg(&paths);
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains("#d62728"));
        assert!(svg.contains(UNSET_COLOR));
        assert!(svg.contains(r#"viewBox="-5 -5 20 15""#));
        assert!(svg.contains("0.000,0.000 10.000,0.000"));
    }

    #[test]
    fn test_empty_drawing_is_valid_svg() {
        let svg = render_svg(&[]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_unknown_well_uses_unset_color() {
        assert_eq!(well_color(Some(9)), UNSET_COLOR);
        assert_eq!(well_color(Some(0)), "#1a1a1a");
    }
}
