//! Single-stroke glyph table
//!
//! Glyphs are drawn on a 6 x 10 grid (y down, baseline at 10) and stored
//! scaled to em units, so a glyph is `size` tall when rendered at `size`.
//! Lowercase letters reuse the capital strokes as small capitals.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use penflow_engine::Point;

/// Grid units per em
const GRID: f64 = 10.0;
/// Horizontal gap added after a glyph's ink, in grid units
const GAP: f64 = 2.0;
/// Small-capital scale for lowercase letters
const SMALL_CAPS: f64 = 0.7;

/// One glyph in em units
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Cursor advance
    pub advance: f64,
    /// Pen strokes
    pub strokes: Vec<Vec<Point>>,
    /// Where combining marks above the glyph attach
    pub top_anchor: Point,
}

/// Combining marks that can sit above a base glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Grave,
    Acute,
    Circumflex,
    Tilde,
    Diaeresis,
}

impl Mark {
    /// Mark for a combining code point (U+0300 to U+0308 subset)
    pub fn from_combining(c: char) -> Option<Mark> {
        match c {
            '\u{0300}' => Some(Mark::Grave),
            '\u{0301}' => Some(Mark::Acute),
            '\u{0302}' => Some(Mark::Circumflex),
            '\u{0303}' => Some(Mark::Tilde),
            '\u{0308}' => Some(Mark::Diaeresis),
            _ => None,
        }
    }

    /// Strokes relative to the base glyph's top anchor, in em units
    pub fn strokes(self) -> &'static [Vec<Point>] {
        &MARKS[&self]
    }
}

/// Split a precomposed Latin-1 letter into its base letter and mark
pub fn decompose(c: char) -> Option<(char, Mark)> {
    use Mark::*;
    let pair = match c {
        'À' => ('A', Grave),
        'Á' => ('A', Acute),
        'Â' => ('A', Circumflex),
        'Ã' => ('A', Tilde),
        'Ä' => ('A', Diaeresis),
        'È' => ('E', Grave),
        'É' => ('E', Acute),
        'Ê' => ('E', Circumflex),
        'Ë' => ('E', Diaeresis),
        'Ì' => ('I', Grave),
        'Í' => ('I', Acute),
        'Î' => ('I', Circumflex),
        'Ï' => ('I', Diaeresis),
        'Ñ' => ('N', Tilde),
        'Ò' => ('O', Grave),
        'Ó' => ('O', Acute),
        'Ô' => ('O', Circumflex),
        'Õ' => ('O', Tilde),
        'Ö' => ('O', Diaeresis),
        'Ù' => ('U', Grave),
        'Ú' => ('U', Acute),
        'Û' => ('U', Circumflex),
        'Ü' => ('U', Diaeresis),
        'Ý' => ('Y', Acute),
        'à' => ('a', Grave),
        'á' => ('a', Acute),
        'â' => ('a', Circumflex),
        'ã' => ('a', Tilde),
        'ä' => ('a', Diaeresis),
        'è' => ('e', Grave),
        'é' => ('e', Acute),
        'ê' => ('e', Circumflex),
        'ë' => ('e', Diaeresis),
        'ì' => ('i', Grave),
        'í' => ('i', Acute),
        'î' => ('i', Circumflex),
        'ï' => ('i', Diaeresis),
        'ñ' => ('n', Tilde),
        'ò' => ('o', Grave),
        'ó' => ('o', Acute),
        'ô' => ('o', Circumflex),
        'õ' => ('o', Tilde),
        'ö' => ('o', Diaeresis),
        'ù' => ('u', Grave),
        'ú' => ('u', Acute),
        'û' => ('u', Circumflex),
        'ü' => ('u', Diaeresis),
        'ý' => ('y', Acute),
        'ÿ' => ('y', Diaeresis),
        _ => return None,
    };
    Some(pair)
}

/// Look up the glyph for `c`
pub fn glyph(c: char) -> Option<&'static Glyph> {
    GLYPHS.get(&c)
}

/// Advance used for characters with no glyph
pub fn fallback_advance() -> f64 {
    (6.0 + GAP) / GRID
}

const CAPITALS: &[(char, &str)] = &[
    ('A', "0,10 3,0 6,10|1,6 5,6"),
    ('B', "0,10 0,0 4,0 5,1 5,4 4,5 0,5|4,5 6,6 6,9 5,10 0,10"),
    ('C', "6,1 5,0 1,0 0,1 0,9 1,10 5,10 6,9"),
    ('D', "0,0 4,0 6,2 6,8 4,10 0,10 0,0"),
    ('E', "6,0 0,0 0,10 6,10|0,5 4,5"),
    ('F', "6,0 0,0 0,10|0,5 4,5"),
    ('G', "6,1 5,0 1,0 0,1 0,9 1,10 5,10 6,9 6,5 3,5"),
    ('H', "0,0 0,10|6,0 6,10|0,5 6,5"),
    ('I', "1,0 5,0|3,0 3,10|1,10 5,10"),
    ('J', "6,0 6,9 5,10 1,10 0,9"),
    ('K', "0,0 0,10|6,0 0,6|2,4 6,10"),
    ('L', "0,0 0,10 6,10"),
    ('M', "0,10 0,0 3,5 6,0 6,10"),
    ('N', "0,10 0,0 6,10 6,0"),
    ('O', "1,0 5,0 6,1 6,9 5,10 1,10 0,9 0,1 1,0"),
    ('P', "0,10 0,0 5,0 6,1 6,4 5,5 0,5"),
    ('Q', "1,0 5,0 6,1 6,9 5,10 1,10 0,9 0,1 1,0|4,8 6,10"),
    ('R', "0,10 0,0 5,0 6,1 6,4 5,5 0,5|3,5 6,10"),
    ('S', "6,1 5,0 1,0 0,1 0,4 1,5 5,5 6,6 6,9 5,10 1,10 0,9"),
    ('T', "0,0 6,0|3,0 3,10"),
    ('U', "0,0 0,9 1,10 5,10 6,9 6,0"),
    ('V', "0,0 3,10 6,0"),
    ('W', "0,0 1.5,10 3,4 4.5,10 6,0"),
    ('X', "0,0 6,10|6,0 0,10"),
    ('Y', "0,0 3,5 6,0|3,5 3,10"),
    ('Z', "0,0 6,0 0,10 6,10"),
];

const SYMBOLS: &[(char, &str)] = &[
    ('0', "1,0 5,0 6,1 6,9 5,10 1,10 0,9 0,1 1,0|5,1 1,9"),
    ('1', "1,2 3,0 3,10|1,10 5,10"),
    ('2', "0,1 1,0 5,0 6,1 6,4 0,10 6,10"),
    ('3', "0,1 1,0 5,0 6,1 6,4 5,5 2,5|5,5 6,6 6,9 5,10 1,10 0,9"),
    ('4', "5,10 5,0 0,7 6,7"),
    ('5', "6,0 0,0 0,5 5,5 6,6 6,9 5,10 1,10 0,9"),
    ('6', "5,0 1,0 0,1 0,9 1,10 5,10 6,9 6,6 5,5 0,5"),
    ('7', "0,0 6,0 2,10"),
    ('8', "1,0 5,0 6,1 6,4 5,5 1,5 0,4 0,1 1,0|1,5 0,6 0,9 1,10 5,10 6,9 6,6 5,5"),
    ('9', "6,5 1,5 0,4 0,1 1,0 5,0 6,1 6,9 5,10 1,10"),
    ('.', "0,9.5 0,10"),
    (',', "1,9 0,11"),
    ('!', "0,0 0,7|0,9.5 0,10"),
    ('?', "0,1 1,0 5,0 6,1 6,4 3,6 3,7|3,9.5 3,10"),
    (':', "0,3 0,3.5|0,9.5 0,10"),
    (';', "0,3 0,3.5|1,9 0,11"),
    ('\'', "0,0 0,3"),
    ('"', "0,0 0,3|2,0 2,3"),
    ('(', "2,0 0,3 0,7 2,10"),
    (')', "0,0 2,3 2,7 0,10"),
    ('-', "0,5 4,5"),
    ('+', "0,5 6,5|3,2 3,8"),
    ('=', "0,4 6,4|0,6 6,6"),
    ('/', "6,0 0,10"),
    ('_', "0,10 6,10"),
    ('*', "3,2 3,8|0,3 6,7|6,3 0,7"),
    ('#', "2,0 1,10|5,0 4,10|0,3.5 6,3.5|0,6.5 6,6.5"),
    ('%', "0,10 6,0|0,0 1,0 1,1 0,1 0,0|5,9 6,9 6,10 5,10 5,9"),
    ('@', "5,6 5,3 2,3 1,5 2,7 5,7 6,6 6,1 5,0 1,0 0,1 0,9 1,10 6,10"),
];

const MARK_STROKES: &[(Mark, &str)] = &[
    (Mark::Grave, "-1,-3 1,-1.5"),
    (Mark::Acute, "-1,-1.5 1,-3"),
    (Mark::Circumflex, "-1.5,-1.5 0,-3 1.5,-1.5"),
    (Mark::Tilde, "-2,-1.5 -1,-2.5 1,-1.5 2,-2.5"),
    (Mark::Diaeresis, "-1.5,-2 -1.5,-1.5|1.5,-2 1.5,-1.5"),
];

/// Parse `x,y x,y|x,y ...` grid notation into em-unit strokes
pub(crate) fn parse_strokes(outline: &str) -> Vec<Vec<Point>> {
    outline.split('|')
        .map(|stroke| {
            stroke
                .split_whitespace()
                .filter_map(|pair| {
                    let (x, y) = pair.split_once(',')?;
                    Some(Point::new(
                        x.parse::<f64>().ok()? / GRID,
                        y.parse::<f64>().ok()? / GRID,
                    ))
                })
                .collect()
        })
        .collect()
}

fn build(strokes: Vec<Vec<Point>>, space: bool) -> Glyph {
    let ink = strokes
        .iter()
        .flatten()
        .map(|p| p.x)
        .fold(0.0_f64, f64::max);
    Glyph {
        advance: if space { fallback_advance() - GAP / GRID } else { ink + GAP / GRID },
        top_anchor: Point::new(ink / 2.0, 0.0),
        strokes,
    }
}

fn small_capital(capital: &Glyph) -> Glyph {
    let shrink = |p: Point| Point::new(p.x * SMALL_CAPS, 1.0 - (1.0 - p.y) * SMALL_CAPS);
    let strokes: Vec<Vec<Point>> = capital
        .strokes
        .iter()
        .map(|s| s.iter().copied().map(shrink).collect())
        .collect();
    let ink = (capital.advance - GAP / GRID) * SMALL_CAPS;
    Glyph {
        advance: ink + GAP / GRID,
        top_anchor: Point::new(ink / 2.0, 1.0 - SMALL_CAPS),
        strokes,
    }
}

static GLYPHS: Lazy<HashMap<char, Glyph>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for (c, outline) in CAPITALS.iter().chain(SYMBOLS) {
        table.insert(*c, build(parse_strokes(outline), false));
    }
    for (c, _) in CAPITALS {
        let lower = c.to_ascii_lowercase();
        let derived = small_capital(&table[c]);
        table.insert(lower, derived);
    }
    table.insert(' ', build(Vec::new(), true));
    table
});

static MARKS: Lazy<HashMap<Mark, Vec<Vec<Point>>>> = Lazy::new(|| {
    MARK_STROKES
        .iter()
        .map(|(mark, outline)| (*mark, parse_strokes(outline)))
        .collect()
});
