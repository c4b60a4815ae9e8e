//! Batak script lettering
//!
//! Latin input is split into syllables: an optional onset consonant (with
//! `ng` and `ny` as digraphs) followed by a vowel. Each syllable becomes a
//! base letter carrying the inherent `a`; other vowels are diacritics
//! placed on the base letter's anchors, and a consonant with no vowel gets
//! the `pangolat` killer mark. The letter table here is a compact
//! stand-in drawn on the same grid as the Latin glyphs.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use penflow_engine::geometry::points_bounds;
use penflow_engine::params::BatakParams;
use penflow_engine::{ColoredPath, EngineLimits, NodeDescriptor, NodeKind, NodeMetadata, Point};

use super::glyphs::parse_strokes;
use super::{place_strokes, TextStyle};

const LETTER_ADVANCE: f64 = 0.8;
const SPACE_ADVANCE: f64 = 0.6;
/// Extra advance for marks hung on the right anchor
const RIGHT_MARK_ADVANCE: f64 = 0.2;

const LETTER_STROKES: &[(&str, &str)] = &[
    ("a", "0,8 1,3 3,2 5,3 6,8"),
    ("ha", "0,8 0,3 3,2 6,5 6,8"),
    ("ba", "0,3 3,8 6,3 0,3"),
    ("pa", "0,3 3,8 6,3"),
    ("na", "0,8 0,2 6,8 6,2"),
    ("wa", "0,3 2,8 4,3 6,8"),
    ("ga", "0,8 3,2 6,8 0,8"),
    ("ja", "0,5 3,2 6,5 3,8 0,5"),
    ("da", "0,2 6,2 6,8 0,8"),
    ("ra", "0,8 3,2 6,8"),
    ("ma", "0,8 0,2 3,6 6,2 6,8"),
    ("ta", "0,2 6,2|3,2 3,8|0,8 6,8"),
    ("sa", "6,2 0,2 6,8 0,8"),
    ("ya", "0,2 3,5 6,2|3,5 3,8"),
    ("nga", "0,5 6,5|3,2 3,8"),
    ("la", "0,2 0,8 6,8 6,2"),
    ("nya", "0,8 0,2 6,8 6,2|0,5 2,5"),
    ("ca", "6,2 2,2 0,5 2,8 6,8"),
    ("i", "0,5 3,2 6,5|3,2 3,8"),
    ("u", "0,2 0,8 6,8|3,5 6,5"),
];

static LETTERS: Lazy<HashMap<&'static str, Vec<Vec<Point>>>> = Lazy::new(|| {
    LETTER_STROKES
        .iter()
        .map(|(name, outline)| (*name, parse_strokes(outline)))
        .collect()
});

/// Diacritics attached to a base letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diacritic {
    E,
    I,
    U,
    O,
    /// Vowel killer
    Pangolat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Top,
    Bottom,
    Right,
}

impl Diacritic {
    fn anchor(self) -> Anchor {
        match self {
            Diacritic::E | Diacritic::I => Anchor::Top,
            Diacritic::U => Anchor::Bottom,
            Diacritic::O | Diacritic::Pangolat => Anchor::Right,
        }
    }

    fn outline(self) -> &'static str {
        match self {
            Diacritic::E => "-2,-1 2,-1",
            Diacritic::I => "-1,-2.5 1,-0.5",
            Diacritic::U => "-2,1 2,1",
            Diacritic::O => "0.5,-2 1.5,0 0.5,2",
            Diacritic::Pangolat => "0.5,-2 1.5,2",
        }
    }
}

/// One unit of Batak output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Space,
    Syllable {
        letter: &'static str,
        marks: Vec<Diacritic>,
    },
}

fn onset(chars: &[char]) -> Option<(&'static str, usize)> {
    let first = *chars.first()?;
    let second = chars.get(1).copied();
    let digraph = match (first, second) {
        ('n', Some('g')) => Some("nga"),
        ('n', Some('y')) => Some("nya"),
        _ => None,
    };
    if let Some(letter) = digraph {
        return Some((letter, 2));
    }
    let letter = match first {
        'h' | 'k' | 'q' => "ha",
        'b' => "ba",
        'p' | 'f' | 'v' => "pa",
        'n' => "na",
        'w' => "wa",
        'g' => "ga",
        'j' | 'z' => "ja",
        'd' => "da",
        'r' => "ra",
        'm' => "ma",
        't' => "ta",
        's' | 'x' => "sa",
        'y' => "ya",
        'l' => "la",
        'c' => "ca",
        _ => return None,
    };
    Some((letter, 1))
}

fn vowel_mark(v: char) -> Option<Option<Diacritic>> {
    match v {
        'a' => Some(None),
        'e' => Some(Some(Diacritic::E)),
        'i' => Some(Some(Diacritic::I)),
        'u' => Some(Some(Diacritic::U)),
        'o' => Some(Some(Diacritic::O)),
        _ => None,
    }
}

/// Split Latin text into Batak syllables
///
/// Characters that are neither letters of the table nor whitespace are
/// skipped.
pub fn syllabify(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            if tokens.last() != Some(&Token::Space) {
                tokens.push(Token::Space);
            }
            i += 1;
            continue;
        }
        if let Some(mark) = vowel_mark(c) {
            let letter = match c {
                'i' => "i",
                'u' => "u",
                _ => "a",
            };
            let marks = match c {
                'e' | 'o' => mark.into_iter().collect(),
                _ => Vec::new(),
            };
            tokens.push(Token::Syllable { letter, marks });
            i += 1;
            continue;
        }
        match onset(&chars[i..]) {
            Some((letter, used)) => {
                i += used;
                let vowel = chars.get(i).copied().and_then(vowel_mark);
                let marks = match vowel {
                    Some(mark) => {
                        i += 1;
                        mark.into_iter().collect()
                    }
                    None => vec![Diacritic::Pangolat],
                };
                tokens.push(Token::Syllable { letter, marks });
            }
            None => {
                log::trace!("Skipping {:?} in Batak text", c);
                i += 1;
            }
        }
    }
    tokens
}

fn anchor_point(strokes: &[Vec<Point>], anchor: Anchor) -> Point {
    let Some(b) = points_bounds(strokes.iter().flatten().copied()) else {
        return Point::default();
    };
    let center = b.center();
    match anchor {
        Anchor::Top => Point::new(center.x, b.min_y),
        Anchor::Bottom => Point::new(center.x, b.max_y),
        Anchor::Right => Point::new(b.max_x, center.y),
    }
}

pub struct BatakNode;

impl BatakNode {
    pub fn generate(p: &BatakParams, limits: &EngineLimits) -> Vec<ColoredPath> {
        let style = TextStyle {
            size: p.size,
            letter_spacing: p.letter_spacing,
            line_height: 1.0,
            color: p.color,
            tolerance: limits.simplify_tolerance,
        };
        let mut out = Vec::new();
        let mut cursor = Point::new(p.x, p.y);

        for token in syllabify(&p.text) {
            let advance = match token {
                Token::Space => SPACE_ADVANCE,
                Token::Syllable { letter, marks } => {
                    let Some(strokes) = LETTERS.get(letter) else {
                        continue;
                    };
                    place_strokes(strokes, cursor, &style, &mut out);
                    let mut advance = LETTER_ADVANCE;
                    for mark in marks {
                        let at = anchor_point(strokes, mark.anchor());
                        let origin = cursor.add(at.scale(style.size));
                        place_strokes(&parse_strokes(mark.outline()), origin, &style, &mut out);
                        if mark.anchor() == Anchor::Right {
                            advance += RIGHT_MARK_ADVANCE;
                        }
                    }
                    advance
                }
            };
            cursor.x += advance * style.size + style.letter_spacing;
        }
        out
    }
}

impl NodeDescriptor for BatakNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(
            NodeKind::Batak,
            "Batak",
            "Latin text transliterated into Batak syllables",
        )
        .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(BatakNode::descriptor));

#[cfg(test)]
mod tests {
    use super::*;

    fn syllable(letter: &'static str, marks: &[Diacritic]) -> Token {
        Token::Syllable {
            letter,
            marks: marks.to_vec(),
        }
    }

    #[test]
    fn test_syllabify_with_trailing_consonant() {
        assert_eq!(
            syllabify("horas"),
            vec![
                syllable("ha", &[Diacritic::O]),
                syllable("ra", &[]),
                syllable("sa", &[Diacritic::Pangolat]),
            ]
        );
    }

    #[test]
    fn test_digraphs_and_independent_vowels() {
        assert_eq!(
            syllabify("Nyanga ibu"),
            vec![
                syllable("nya", &[]),
                syllable("nga", &[]),
                Token::Space,
                syllable("i", &[]),
                syllable("ba", &[Diacritic::U]),
            ]
        );
        assert_eq!(syllabify("e"), vec![syllable("a", &[Diacritic::E])]);
    }

    #[test]
    fn test_unknown_characters_are_skipped() {
        assert_eq!(syllabify("1-2"), Vec::<Token>::new());
    }

    #[test]
    fn test_every_letter_is_in_the_table() {
        for c in 'a'..='z' {
            if let Some((letter, _)) = onset(&[c]) {
                assert!(LETTERS.contains_key(letter), "{}", letter);
            }
        }
        for letter in ["a", "i", "u", "nga", "nya"] {
            assert!(LETTERS.contains_key(letter));
        }
    }

    #[test]
    fn test_marks_add_strokes_and_advance() {
        let limits = EngineLimits::default();
        let plain = BatakNode::generate(
            &BatakParams {
                text: "ra".to_string(),
                ..BatakParams::default()
            },
            &limits,
        );
        assert_eq!(plain.len(), 1);

        let killed = BatakNode::generate(
            &BatakParams {
                text: "rr".to_string(),
                color: Some(1),
                ..BatakParams::default()
            },
            &limits,
        );
        // two letters, each with a pangolat
        assert_eq!(killed.len(), 4);
        assert!(killed.iter().all(|p| p.color == Some(1)));
        let second_letter_x = killed[2].points[0].x;
        assert!((second_letter_x - (10.0 + 10.0)).abs() < 1e-9);
    }
}
