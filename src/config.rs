//! Configuration model for canvases and countdown templates.
//!
//! Templates arrive as untyped nested key-value structures
//! ([`serde_json::Value`]); this module converts them into the typed,
//! validated model used by the engine. Parsing is fail-fast: the first
//! required-field violation in an object aborts with an error naming the
//! offending field, before any rendering work happens.
//!
//! Color fields split into two regimes: `bgColor` and `digits.style.color`
//! are validated strictly here (must start with `#`), while label and
//! overlay colors are decoded leniently at render time by
//! [`crate::color::Argb::from_hex`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::clock::{Moment, TimeUnit};
use crate::error::{ConfigError, Result};

/// Default background color for new canvases: opaque white.
pub const DEFAULT_BG_COLOR: &str = "#FFFFFF";

/// Default text color when unspecified: opaque black.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Placement origin and optional bounding box for one overlay.
///
/// `width`/`height` of 0 mean "use the natural glyph size"; a non-zero box
/// enables anchor alignment inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Position2D {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            width: 0,
            height: 0,
        }
    }

    /// Parse from an object with required `x`/`y` and optional
    /// `width`/`height` attributes.
    pub fn from_value(value: &Value) -> std::result::Result<Self, ConfigError> {
        let obj = as_object(value, "position")?;
        Ok(Self {
            x: require_int(obj, "x")? as i32,
            y: require_int(obj, "y")? as i32,
            width: optional_dimension(obj, "width")?,
            height: optional_dimension(obj, "height")?,
        })
    }
}

/// One of the nine alignment anchors used to place a glyph inside its
/// bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    Top,
    TopRight,
    Left,
    #[default]
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Anchor {
    /// Parse an anchor name.
    ///
    /// Accepts both grid names ("top-left", "center") and compass names
    /// ("north-west", "centre"). Unknown names fall back to [`Anchor::Center`].
    pub fn parse(name: &str) -> Anchor {
        match name.to_ascii_lowercase().as_str() {
            "top-left" | "north-west" => Anchor::TopLeft,
            "top" | "top-center" | "north" => Anchor::Top,
            "top-right" | "north-east" => Anchor::TopRight,
            "left" | "center-left" | "west" => Anchor::Left,
            "center" | "centre" => Anchor::Center,
            "right" | "center-right" | "east" => Anchor::Right,
            "bottom-left" | "south-west" => Anchor::BottomLeft,
            "bottom" | "bottom-center" | "south" => Anchor::Bottom,
            "bottom-right" | "south-east" => Anchor::BottomRight,
            _ => Anchor::Center,
        }
    }
}

/// One static text overlay baked into the countdown background.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSpec {
    pub text: String,
    pub position: Position2D,
    pub color: String,
    pub text_alignment: Anchor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_file: Option<PathBuf>,
    pub padding_top: u32,
    pub padding_bottom: u32,
}

impl LabelSpec {
    /// Parse from an object with required `text`/`position` attributes and
    /// optional styling.
    pub fn from_value(value: &Value, field: &str) -> std::result::Result<Self, ConfigError> {
        let obj = as_object(value, field)?;
        Ok(Self {
            text: require_string(obj, "text")?,
            position: Position2D::from_value(require(obj, "position")?)?,
            color: optional_string(obj, "color")?
                .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
            text_alignment: optional_anchor(obj)?,
            font: optional_string(obj, "font")?,
            font_file: optional_string(obj, "fontFile")?.map(PathBuf::from),
            padding_top: optional_dimension(obj, "paddingTop")?,
            padding_bottom: optional_dimension(obj, "paddingBottom")?,
        })
    }
}

/// Shared style applied to all 100 digit glyphs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitStyle {
    pub color: String,
    pub width: u32,
    pub height: u32,
    pub text_alignment: Anchor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_file: Option<PathBuf>,
}

impl Default for DigitStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_TEXT_COLOR.to_string(),
            width: 0,
            height: 0,
            text_alignment: Anchor::Center,
            font: None,
            font_file: None,
        }
    }
}

impl DigitStyle {
    /// Parse from an object; every attribute is optional. The `color`
    /// attribute is validated strictly (must start with `#`).
    pub fn from_value(value: &Value) -> std::result::Result<Self, ConfigError> {
        let obj = as_object(value, "style")?;
        let color = match optional_string(obj, "color")? {
            Some(color) => {
                if !color.starts_with('#') {
                    return Err(ConfigError::invalid_color("color"));
                }
                color
            }
            None => DEFAULT_TEXT_COLOR.to_string(),
        };
        Ok(Self {
            color,
            width: optional_dimension(obj, "width")?,
            height: optional_dimension(obj, "height")?,
            text_alignment: optional_anchor(obj)?,
            font: optional_string(obj, "font")?,
            font_file: optional_string(obj, "fontFile")?.map(PathBuf::from),
        })
    }
}

/// Digit glyph placement and styling: one position per time unit, a shared
/// style, and an optional text template with a single `%s` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitLayout {
    /// Indexed by [`TimeUnit`] order: days, hours, minutes, seconds.
    #[serde(serialize_with = "serialize_positions")]
    pub positions: [Position2D; 4],
    pub style: DigitStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_template: Option<String>,
}

impl DigitLayout {
    /// Parse from an object with a required `positions` map supplying every
    /// time unit by name, plus optional `style` and `textTemplate`.
    pub fn from_value(value: &Value) -> std::result::Result<Self, ConfigError> {
        let obj = as_object(value, "digits")?;

        let positions_obj = as_object(require(obj, "positions")?, "positions")?;
        let mut positions = [Position2D::new(0, 0); 4];
        for unit in TimeUnit::ALL {
            let entry = positions_obj
                .get(unit.name())
                .ok_or_else(|| ConfigError::missing(unit.name()))?;
            let entry_obj = as_object(entry, unit.name())?;
            positions[unit.index()] = Position2D::from_value(require(entry_obj, "position")?)?;
        }

        let style = match obj.get("style") {
            Some(style) => DigitStyle::from_value(style)?,
            None => DigitStyle::default(),
        };

        Ok(Self {
            positions,
            style,
            text_template: optional_string(obj, "textTemplate")?,
        })
    }
}

fn serialize_positions<S: Serializer>(
    positions: &[Position2D; 4],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Entry<'a> {
        position: &'a Position2D,
    }

    let mut map = serializer.serialize_map(Some(TimeUnit::ALL.len()))?;
    for unit in TimeUnit::ALL {
        map.serialize_entry(unit.name(), &Entry {
            position: &positions[unit.index()],
        })?;
    }
    map.end()
}

/// Options for creating a plain background canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationOptions {
    pub width: u32,
    pub height: u32,
    pub bg_color: String,
}

impl CreationOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bg_color: DEFAULT_BG_COLOR.to_string(),
        }
    }

    /// Parse from an object with required `width`/`height` and an optional
    /// strict `bgColor`.
    pub fn from_value(value: &Value) -> std::result::Result<Self, ConfigError> {
        let obj = as_object(value, "options")?;
        Ok(Self {
            width: require_canvas_dimension(obj, "width")?,
            height: require_canvas_dimension(obj, "height")?,
            bg_color: optional_bg_color(obj)?,
        })
    }
}

/// A fully validated countdown template.
///
/// Built once, immutable for the lifetime of the engine instance it
/// configures. Label keys are caller-chosen identifiers with no meaning to
/// the engine; the [`BTreeMap`] keeps iteration deterministic across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownTemplate {
    pub width: u32,
    pub height: u32,
    pub bg_color: String,
    pub labels: BTreeMap<String, LabelSpec>,
    pub digits: DigitLayout,
}

impl CountdownTemplate {
    /// Parse and validate a template from an untyped value.
    pub fn from_value(value: &Value) -> std::result::Result<Self, ConfigError> {
        let obj = as_object(value, "options")?;

        let width = require_canvas_dimension(obj, "width")?;
        let height = require_canvas_dimension(obj, "height")?;
        let bg_color = optional_bg_color(obj)?;

        let labels_obj = as_object(require(obj, "labels")?, "labels")?;
        let mut labels = BTreeMap::new();
        for (key, label) in labels_obj {
            let spec = LabelSpec::from_value(label, &format!("labels.{key}"))?;
            labels.insert(key.clone(), spec);
        }

        let digits = DigitLayout::from_value(require(obj, "digits")?)?;

        Ok(Self {
            width,
            height,
            bg_color,
            labels,
            digits,
        })
    }

    /// Load and validate a template from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content).map_err(|_| ConfigError::ParseFailed {
            path: path.display().to_string(),
        })?;
        Ok(Self::from_value(&value)?)
    }

    /// A small example template, used by the CLI to emit a starting point.
    pub fn sample() -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(
            "title".to_string(),
            LabelSpec {
                text: "SALE ENDS IN".to_string(),
                position: Position2D::new(20, 10),
                color: DEFAULT_TEXT_COLOR.to_string(),
                text_alignment: Anchor::Center,
                font: None,
                font_file: None,
                padding_top: 0,
                padding_bottom: 0,
            },
        );

        let positions = [
            Position2D::new(20, 60),
            Position2D::new(100, 60),
            Position2D::new(180, 60),
            Position2D::new(260, 60),
        ];

        Self {
            width: 320,
            height: 120,
            bg_color: DEFAULT_BG_COLOR.to_string(),
            labels,
            digits: DigitLayout {
                positions,
                style: DigitStyle::default(),
                text_template: None,
            },
        }
    }
}

/// Per-call options for drawing free text onto a canvas.
#[derive(Debug, Clone, Default)]
pub struct TextOverlay {
    pub font: Option<String>,
    pub font_file: Option<PathBuf>,
    pub color: Option<String>,
}

impl TextOverlay {
    /// Parse from an optional options object. The `color` attribute is
    /// validated strictly (must start with `#`).
    pub fn from_value(value: &Value) -> std::result::Result<Self, ConfigError> {
        let obj = as_object(value, "options")?;
        let color = optional_string(obj, "color")?;
        if let Some(color) = &color {
            if !color.starts_with('#') {
                return Err(ConfigError::invalid_color("color"));
            }
        }
        Ok(Self {
            font: optional_string(obj, "font")?,
            font_file: optional_string(obj, "fontFile")?.map(PathBuf::from),
            color,
        })
    }
}

/// Parse a start duration from an object with required numeric
/// `days`/`hours`/`minutes`/`seconds` attributes.
pub fn parse_moment(value: &Value) -> std::result::Result<Moment, ConfigError> {
    let obj = as_object(value, "start")?;
    let mut parts = [0u32; 4];
    for unit in TimeUnit::ALL {
        let raw = require_int(obj, unit.name())?;
        if raw < 0 {
            return Err(ConfigError::wrong_type(unit.name(), "non-negative number"));
        }
        parts[unit.index()] = raw as u32;
    }
    Ok(Moment::new(parts[0], parts[1], parts[2], parts[3]))
}

// Fail-fast accessors over untyped objects. Each names the offending field.

fn as_object<'a>(
    value: &'a Value,
    field: &str,
) -> std::result::Result<&'a serde_json::Map<String, Value>, ConfigError> {
    value
        .as_object()
        .ok_or_else(|| ConfigError::wrong_type(field, "object"))
}

fn require<'a>(
    obj: &'a serde_json::Map<String, Value>,
    field: &str,
) -> std::result::Result<&'a Value, ConfigError> {
    obj.get(field).ok_or_else(|| ConfigError::missing(field))
}

fn require_int(
    obj: &serde_json::Map<String, Value>,
    field: &str,
) -> std::result::Result<i64, ConfigError> {
    require(obj, field)?
        .as_i64()
        .ok_or_else(|| ConfigError::wrong_type(field, "number"))
}

fn require_string(
    obj: &serde_json::Map<String, Value>,
    field: &str,
) -> std::result::Result<String, ConfigError> {
    require(obj, field)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::wrong_type(field, "string"))
}

fn optional_string(
    obj: &serde_json::Map<String, Value>,
    field: &str,
) -> std::result::Result<Option<String>, ConfigError> {
    match obj.get(field) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| ConfigError::wrong_type(field, "string")),
    }
}

/// Optional non-negative integer attribute, defaulting to 0.
fn optional_dimension(
    obj: &serde_json::Map<String, Value>,
    field: &str,
) -> std::result::Result<u32, ConfigError> {
    match obj.get(field) {
        None => Ok(0),
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ConfigError::wrong_type(field, "non-negative number")),
    }
}

fn require_canvas_dimension(
    obj: &serde_json::Map<String, Value>,
    field: &str,
) -> std::result::Result<u32, ConfigError> {
    let raw = require_int(obj, field)?;
    if raw <= 0 {
        return Err(ConfigError::wrong_type(field, "positive number"));
    }
    u32::try_from(raw).map_err(|_| ConfigError::wrong_type(field, "positive number"))
}

fn optional_anchor(
    obj: &serde_json::Map<String, Value>,
) -> std::result::Result<Anchor, ConfigError> {
    Ok(optional_string(obj, "textAlignment")?
        .map(|name| Anchor::parse(&name))
        .unwrap_or_default())
}

fn optional_bg_color(
    obj: &serde_json::Map<String, Value>,
) -> std::result::Result<String, ConfigError> {
    match optional_string(obj, "bgColor")? {
        Some(color) => {
            if !color.starts_with('#') {
                return Err(ConfigError::invalid_color("bgColor"));
            }
            Ok(color)
        }
        None => Ok(DEFAULT_BG_COLOR.to_string()),
    }
}
