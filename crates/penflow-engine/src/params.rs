//! Typed, validated parameter bags for every node kind
//!
//! Documents written by older editor builds (or mid-edit) may carry missing,
//! misspelled or mistyped fields. Parsing never fails: each field that does
//! not deserialize falls back to its default while its well-formed
//! neighbours are kept.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::geometry::MAX_WELL;
use crate::types::{GraphNode, NodeKind};

/// Canvas and interaction metadata that may leak into a node's `data`
pub const UI_ONLY_FIELDS: &[&str] = &[
    "position",
    "positionAbsolute",
    "selected",
    "dragging",
    "dragHandle",
    "resizing",
    "isConnecting",
    "connecting",
    "measured",
    "zIndex",
];

/// Remove [`UI_ONLY_FIELDS`] from a parameter bag
pub fn strip_ui_fields(data: &Value) -> Value {
    match data {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !UI_ONLY_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Deserialize `data` into `T`, degrading field-by-field to defaults
pub fn parse_lenient<T>(data: &Value) -> T
where
    T: DeserializeOwned + Serialize + Default,
{
    let Some(fields) = data.as_object() else {
        return T::default();
    };
    if let Ok(parsed) = T::deserialize(data) {
        return parsed;
    }

    let mut merged = match serde_json::to_value(T::default()) {
        Ok(Value::Object(map)) => map,
        _ => return T::default(),
    };
    for (key, value) in fields {
        if !merged.contains_key(key) {
            continue;
        }
        let previous = merged.insert(key.clone(), value.clone());
        if T::deserialize(&Value::Object(merged.clone())).is_err() {
            log::debug!("Parameter '{}' is malformed, using default", key);
            if let Some(previous) = previous {
                merged.insert(key.clone(), previous);
            }
        }
    }
    T::deserialize(&Value::Object(merged)).unwrap_or_default()
}

fn deserialize_well<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
        .filter(|w| *w <= MAX_WELL as u64)
        .map(|w| w as u8))
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineParams {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default, deserialize_with = "deserialize_well", skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl Default for LineParams {
    fn default() -> Self {
        Self { x1: 0.0, y1: 0.0, x2: 100.0, y2: 0.0, color: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RectParams {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, deserialize_with = "deserialize_well", skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl Default for RectParams {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, width: 100.0, height: 100.0, color: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircleParams {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub segments: u32,
    #[serde(default, deserialize_with = "deserialize_well", skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self { cx: 100.0, cy: 100.0, radius: 50.0, segments: 64, color: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EllipseParams {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
    /// Degrees
    pub rotation: f64,
    pub segments: u32,
    #[serde(default, deserialize_with = "deserialize_well", skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl Default for EllipseParams {
    fn default() -> Self {
        Self { cx: 100.0, cy: 100.0, rx: 60.0, ry: 40.0, rotation: 0.0, segments: 64, color: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArcParams {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    /// Degrees
    pub start_angle: f64,
    /// Degrees
    pub end_angle: f64,
    pub segments: u32,
    #[serde(default, deserialize_with = "deserialize_well", skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl Default for ArcParams {
    fn default() -> Self {
        Self {
            cx: 100.0,
            cy: 100.0,
            radius: 50.0,
            start_angle: 0.0,
            end_angle: 180.0,
            segments: 32,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolygonParams {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub sides: u32,
    /// Degrees
    pub rotation: f64,
    #[serde(default, deserialize_with = "deserialize_well", skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl Default for PolygonParams {
    fn default() -> Self {
        Self { cx: 100.0, cy: 100.0, radius: 50.0, sides: 6, rotation: 0.0, color: None }
    }
}

// ---------------------------------------------------------------------------
// Procedural generators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttractorType {
    #[default]
    Clifford,
    #[serde(alias = "de-jong", alias = "deJong")]
    DeJong,
    Bedhead,
    Tinkerbell,
    #[serde(alias = "gumowski-mira")]
    Gumowski,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttractorParams {
    pub attractor_type: AttractorType,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub iterations: u32,
    pub scale: f64,
    pub cx: f64,
    pub cy: f64,
    #[serde(default, deserialize_with = "deserialize_well", skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl Default for AttractorParams {
    fn default() -> Self {
        Self {
            attractor_type: AttractorType::Clifford,
            a: -1.4,
            b: 1.6,
            c: 1.0,
            d: 0.7,
            iterations: 10_000,
            scale: 20.0,
            cx: 100.0,
            cy: 100.0,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LSystemParams {
    pub axiom: String,
    /// Compact `LHS=RHS,LHS2=RHS2` rule notation
    pub rules: String,
    pub iterations: u32,
    /// Turn angle in degrees
    pub angle: f64,
    pub step_length: f64,
    pub scale_factor: f64,
    pub start_x: f64,
    pub start_y: f64,
    /// Initial heading in degrees (0 = +x)
    pub start_angle: f64,
}

impl Default for LSystemParams {
    fn default() -> Self {
        Self {
            axiom: "F".to_string(),
            rules: "F=F+F-F-F+F".to_string(),
            iterations: 3,
            angle: 90.0,
            step_length: 10.0,
            scale_factor: 0.5,
            start_x: 100.0,
            start_y: 100.0,
            start_angle: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextParams {
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Cap height in millimeters
    pub size: f64,
    /// Extra advance after each glyph (kerning), millimeters
    pub letter_spacing: f64,
    /// Line advance as a multiple of `size`
    pub line_height: f64,
    #[serde(default, deserialize_with = "deserialize_well", skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            text: "Penflow".to_string(),
            x: 10.0,
            y: 10.0,
            size: 10.0,
            letter_spacing: 0.0,
            line_height: 1.4,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatakParams {
    /// Latin transcription to render in Batak script
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub letter_spacing: f64,
    #[serde(default, deserialize_with = "deserialize_well", skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl Default for BatakParams {
    fn default() -> Self {
        Self {
            text: "horas".to_string(),
            x: 10.0,
            y: 10.0,
            size: 10.0,
            letter_spacing: 0.0,
            color: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Raster sampling
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Zigzag,
    Square,
    Triangle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HalftoneParams {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    /// 0 keeps the image aspect ratio
    pub height: f64,
    /// Distance between scan lines
    pub spacing: f64,
    /// Scan line angle in degrees
    pub angle: f64,
    /// Peak displacement for fully dark regions
    pub amplitude: f64,
    /// Wave cycles per millimeter
    pub frequency: f64,
    pub waveform: Waveform,
    /// Sample step along each scan line
    pub resolution: f64,
    #[serde(default, deserialize_with = "deserialize_well", skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl Default for HalftoneParams {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 0.0,
            spacing: 2.0,
            angle: 0.0,
            amplitude: 1.5,
            frequency: 0.5,
            waveform: Waveform::Sine,
            resolution: 0.5,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AsciiParams {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub cols: u32,
    /// 0 derives rows from the image aspect ratio
    pub rows: u32,
    /// Characters ordered from lightest to darkest
    pub charset: String,
    pub invert: bool,
    #[serde(default, deserialize_with = "deserialize_well", skip_serializing_if = "Option::is_none")]
    pub color: Option<u8>,
}

impl Default for AsciiParams {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 0.0,
            cols: 40,
            rows: 0,
            charset: " .:-=+*#%@".to_string(),
            invert: false,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaskParams {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Brightness in `[0, 1]` below which geometry is kept
    pub threshold: f64,
    pub invert: bool,
    /// Width of the hysteresis band around `threshold`
    pub feather: f64,
    /// Resampling step along input paths
    pub resolution: f64,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 0.0,
            threshold: 0.5,
            invert: false,
            feather: 0.0,
            resolution: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageParams {
    /// `data:` URL holding the encoded raster
    pub src: String,
}

// ---------------------------------------------------------------------------
// Transformers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    #[default]
    Circle,
    Arc,
    Line,
    Wave,
    Spiral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathParams {
    pub curve: Curve,
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    /// Line and wave length
    pub length: f64,
    /// Line and wave direction in degrees
    pub angle: f64,
    pub amplitude: f64,
    pub wavelength: f64,
    pub turns: f64,
    /// Radial growth per spiral turn
    pub spacing: f64,
    pub alignment: Alignment,
    pub reverse: bool,
}

impl Default for PathParams {
    fn default() -> Self {
        Self {
            curve: Curve::Circle,
            cx: 100.0,
            cy: 100.0,
            radius: 50.0,
            start_angle: 0.0,
            end_angle: 180.0,
            length: 200.0,
            angle: 0.0,
            amplitude: 10.0,
            wavelength: 50.0,
            turns: 3.0,
            spacing: 10.0,
            alignment: Alignment::Start,
            reverse: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepeatParams {
    pub count: u32,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Degrees added per copy
    pub rotation: f64,
    /// Compounding scale per copy
    pub scale: f64,
}

impl Default for RepeatParams {
    fn default() -> Self {
        Self { count: 5, offset_x: 10.0, offset_y: 0.0, rotation: 0.0, scale: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridParams {
    pub cols: u32,
    pub rows: u32,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub start_x: f64,
    pub start_y: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        Self { cols: 3, rows: 3, spacing_x: 50.0, spacing_y: 50.0, start_x: 0.0, start_y: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialParams {
    pub count: u32,
    pub radius: f64,
    pub cx: f64,
    pub cy: f64,
    pub start_angle: f64,
    pub rotate_copies: bool,
}

impl Default for RadialParams {
    fn default() -> Self {
        Self {
            count: 8,
            radius: 50.0,
            cx: 100.0,
            cy: 100.0,
            start_angle: 0.0,
            rotate_copies: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranslateParams {
    pub dx: f64,
    pub dy: f64,
}

/// Pivot used by rotate and scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pivot {
    /// Mean of the input points
    #[default]
    Centroid,
    /// Drawing origin
    Origin,
    /// `pivotX`/`pivotY`
    Point,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RotateParams {
    pub angle: f64,
    pub pivot: Pivot,
    pub pivot_x: f64,
    pub pivot_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScaleParams {
    pub sx: f64,
    pub sy: f64,
    /// Use `sx` for both axes
    pub uniform: bool,
    pub pivot: Pivot,
    pub pivot_x: f64,
    pub pivot_y: f64,
}

impl Default for ScaleParams {
    fn default() -> Self {
        Self { sx: 1.0, sy: 1.0, uniform: true, pivot: Pivot::Centroid, pivot_x: 0.0, pivot_y: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    #[default]
    Position,
    Rotation,
    Scale,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BytebeatParams {
    pub formula: String,
    pub count: u32,
    pub mode: CombineMode,
    /// X advance per step of `t`
    pub step_x: f64,
    /// Y displacement range for position mode
    pub amplitude: f64,
    /// Rotation range in degrees for rotation mode
    pub rotation_range: f64,
    /// Scale range for scale mode
    pub scale_range: f64,
}

impl Default for BytebeatParams {
    fn default() -> Self {
        Self {
            formula: "t*(t>>5|t>>8)".to_string(),
            count: 64,
            mode: CombineMode::Position,
            step_x: 5.0,
            amplitude: 50.0,
            rotation_range: 360.0,
            scale_range: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodeParams {
    pub code: String,
    /// Seed for `random()` and `noise()`
    pub seed: u64,
}

impl Default for CodeParams {
    fn default() -> Self {
        Self {
            code: "input".to_string(),
            seed: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch enum
// ---------------------------------------------------------------------------

/// Validated parameters, one variant per [`NodeKind`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "params", rename_all = "lowercase")]
pub enum NodeParams {
    Output,
    Group,
    Image(ImageParams),
    Line(LineParams),
    Rect(RectParams),
    Circle(CircleParams),
    Ellipse(EllipseParams),
    Arc(ArcParams),
    Polygon(PolygonParams),
    Attractor(AttractorParams),
    #[serde(rename = "lsystem")]
    LSystem(LSystemParams),
    Text(TextParams),
    Batak(BatakParams),
    Halftone(HalftoneParams),
    Ascii(AsciiParams),
    Mask(MaskParams),
    Path(PathParams),
    Repeat(RepeatParams),
    Grid(GridParams),
    Radial(RadialParams),
    Translate(TranslateParams),
    Rotate(RotateParams),
    Scale(ScaleParams),
    Bytebeat(BytebeatParams),
    Code(CodeParams),
    /// A type string the engine does not know; carries the stripped bag
    Unknown(Value),
}

impl NodeParams {
    /// Validate a node's parameter bag for its kind
    pub fn parse(node: &GraphNode) -> NodeParams {
        let data = strip_ui_fields(&node.data);
        let Some(kind) = node.kind() else {
            return NodeParams::Unknown(data);
        };
        match kind {
            NodeKind::Output => NodeParams::Output,
            NodeKind::Group => NodeParams::Group,
            NodeKind::Image => NodeParams::Image(parse_lenient(&data)),
            NodeKind::Line => NodeParams::Line(parse_lenient(&data)),
            NodeKind::Rect => NodeParams::Rect(parse_lenient(&data)),
            NodeKind::Circle => NodeParams::Circle(parse_lenient(&data)),
            NodeKind::Ellipse => NodeParams::Ellipse(parse_lenient(&data)),
            NodeKind::Arc => NodeParams::Arc(parse_lenient(&data)),
            NodeKind::Polygon => NodeParams::Polygon(parse_lenient(&data)),
            NodeKind::Attractor => NodeParams::Attractor(parse_lenient(&data)),
            NodeKind::LSystem => NodeParams::LSystem(parse_lenient(&data)),
            NodeKind::Text => NodeParams::Text(parse_lenient(&data)),
            NodeKind::Batak => NodeParams::Batak(parse_lenient(&data)),
            NodeKind::Halftone => NodeParams::Halftone(parse_lenient(&data)),
            NodeKind::Ascii => NodeParams::Ascii(parse_lenient(&data)),
            NodeKind::Mask => NodeParams::Mask(parse_lenient(&data)),
            NodeKind::Path => NodeParams::Path(parse_lenient(&data)),
            NodeKind::Repeat => NodeParams::Repeat(parse_lenient(&data)),
            NodeKind::Grid => NodeParams::Grid(parse_lenient(&data)),
            NodeKind::Radial => NodeParams::Radial(parse_lenient(&data)),
            NodeKind::Translate => NodeParams::Translate(parse_lenient(&data)),
            NodeKind::Rotate => NodeParams::Rotate(parse_lenient(&data)),
            NodeKind::Scale => NodeParams::Scale(parse_lenient(&data)),
            NodeKind::Bytebeat => NodeParams::Bytebeat(parse_lenient(&data)),
            NodeKind::Code => NodeParams::Code(parse_lenient(&data)),
        }
    }

    /// The kind these parameters belong to
    pub fn kind(&self) -> Option<NodeKind> {
        Some(match self {
            NodeParams::Output => NodeKind::Output,
            NodeParams::Group => NodeKind::Group,
            NodeParams::Image(_) => NodeKind::Image,
            NodeParams::Line(_) => NodeKind::Line,
            NodeParams::Rect(_) => NodeKind::Rect,
            NodeParams::Circle(_) => NodeKind::Circle,
            NodeParams::Ellipse(_) => NodeKind::Ellipse,
            NodeParams::Arc(_) => NodeKind::Arc,
            NodeParams::Polygon(_) => NodeKind::Polygon,
            NodeParams::Attractor(_) => NodeKind::Attractor,
            NodeParams::LSystem(_) => NodeKind::LSystem,
            NodeParams::Text(_) => NodeKind::Text,
            NodeParams::Batak(_) => NodeKind::Batak,
            NodeParams::Halftone(_) => NodeKind::Halftone,
            NodeParams::Ascii(_) => NodeKind::Ascii,
            NodeParams::Mask(_) => NodeKind::Mask,
            NodeParams::Path(_) => NodeKind::Path,
            NodeParams::Repeat(_) => NodeKind::Repeat,
            NodeParams::Grid(_) => NodeKind::Grid,
            NodeParams::Radial(_) => NodeKind::Radial,
            NodeParams::Translate(_) => NodeKind::Translate,
            NodeParams::Rotate(_) => NodeKind::Rotate,
            NodeParams::Scale(_) => NodeKind::Scale,
            NodeParams::Bytebeat(_) => NodeKind::Bytebeat,
            NodeParams::Code(_) => NodeKind::Code,
            NodeParams::Unknown(_) => return None,
        })
    }
}

/// Parameters that hold no semantic content
pub fn empty_bag() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(kind: &str, data: Value) -> GraphNode {
        let mut n = GraphNode::new("n1", kind);
        n.data = data;
        n
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let params = NodeParams::parse(&node("circle", json!({"radius": 20})));
        let NodeParams::Circle(p) = params else {
            panic!("expected circle params");
        };
        assert_eq!(p.radius, 20.0);
        assert_eq!(p.segments, 64);
        assert_eq!(p.cx, 100.0);
    }

    #[test]
    fn test_malformed_field_degrades_alone() {
        let params = NodeParams::parse(&node(
            "circle",
            json!({"radius": "big", "segments": 4, "cx": 50}),
        ));
        let NodeParams::Circle(p) = params else {
            panic!("expected circle params");
        };
        assert_eq!(p.radius, 50.0);
        assert_eq!(p.segments, 4);
        assert_eq!(p.cx, 50.0);
    }

    #[test]
    fn test_non_object_bag_is_default() {
        let params = NodeParams::parse(&node("repeat", json!("nonsense")));
        assert_eq!(params, NodeParams::Repeat(RepeatParams::default()));
    }

    #[test]
    fn test_color_outside_wells_is_unset() {
        let NodeParams::Line(p) = NodeParams::parse(&node("line", json!({"color": 7}))) else {
            panic!("expected line params");
        };
        assert_eq!(p.color, None);
        let NodeParams::Line(p) = NodeParams::parse(&node("line", json!({"color": 2}))) else {
            panic!("expected line params");
        };
        assert_eq!(p.color, Some(2));
    }

    #[test]
    fn test_enum_aliases() {
        let NodeParams::Attractor(p) =
            NodeParams::parse(&node("attractor", json!({"attractorType": "de-jong"})))
        else {
            panic!("expected attractor params");
        };
        assert_eq!(p.attractor_type, AttractorType::DeJong);
    }

    #[test]
    fn test_unknown_kind_keeps_stripped_bag() {
        let params = NodeParams::parse(&node("teleporter", json!({"a": 1, "selected": true})));
        assert_eq!(params, NodeParams::Unknown(json!({"a": 1})));
        assert_eq!(params.kind(), None);
    }

    #[test]
    fn test_every_kind_parses_from_empty_bag() {
        for kind in NodeKind::ALL {
            let params = NodeParams::parse(&node(kind.as_str(), empty_bag()));
            assert_eq!(params.kind(), Some(kind));
        }
    }
}
