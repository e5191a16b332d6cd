// THEORY:
// The `raw_element` module holds the "sensory input" of the engine: everything
// the upstream Vision Preprocessor hands us for a single image. These are dumb,
// read-only data containers, the equivalent of raw pixels for the rest of the
// analysis stack. Nothing here interprets UI semantics; the kind field is only
// the preprocessor's coarse guess.
//
// The one piece of behavior that lives here is normalization: the preprocessor
// may omit an element's `area` or report it as zero, and every downstream
// score needs a non-negative area, so `normalized_area` derives it from the
// bounds when required.

use crate::core_modules::geometry::Bounds;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The preprocessor's coarse guess at what a detected region is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Button,
    InputField,
    TextRegion,
    TextBlock,
    Container,
    CircularElement,
    HorizontalSeparator,
    VerticalSeparator,
    #[serde(other)]
    Unclassified,
}

impl ElementKind {
    pub fn is_text(self) -> bool {
        matches!(self, ElementKind::TextRegion | ElementKind::TextBlock)
    }
}

/// An unclassified detected UI region, exactly as produced by the preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawElement {
    pub kind: ElementKind,
    pub bounds: Bounds,
    /// Open property bag derived by the preprocessor (e.g. `isEmpty`).
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub confidence: f64,
}

impl RawElement {
    pub fn new(kind: ElementKind, bounds: Bounds) -> Self {
        Self {
            kind,
            bounds,
            properties: Map::new(),
            area: bounds.area(),
            confidence: 0.0,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// The reported area, or the bounds' area when the report is missing or
    /// not positive. Never negative.
    pub fn normalized_area(&self) -> f64 {
        if self.area.is_finite() && self.area > 0.0 {
            self.area
        } else {
            self.bounds.area().max(0.0)
        }
    }

    pub fn normalized_confidence(&self) -> f64 {
        if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_empty_region(&self) -> bool {
        self.properties
            .get("isEmpty")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// A recognized text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub bounds: Bounds,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextExtraction {
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
}

/// A dominant color with its relative frequency in the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub hex: String,
    /// Share of the image covered by this color, in [0, 1].
    #[serde(default)]
    pub frequency: f64,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, frequency: f64) -> Self {
        Self {
            r,
            g,
            b,
            hex: format!("#{r:02x}{g:02x}{b:02x}"),
            frequency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridEstimate {
    pub columns: u32,
    pub rows: u32,
}

/// The preprocessor's own coarse layout reading.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreprocessorLayout {
    #[serde(default)]
    pub grid: Option<GridEstimate>,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Everything the Vision Preprocessor yields for one image.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreprocessorOutput {
    #[serde(default)]
    pub elements: Vec<RawElement>,
    #[serde(default)]
    pub text: TextExtraction,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub layout: PreprocessorLayout,
    #[serde(default)]
    pub metadata: ImageMetadata,
    #[serde(default)]
    pub confidence: f64,
}
