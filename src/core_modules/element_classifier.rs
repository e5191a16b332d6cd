// THEORY:
// The `element_classifier` is the first analytical layer. It takes one raw
// detected region and decides which semantic UI role it plays, turning a
// "button-shaped thing" into a `button`, a wide short empty box into an
// `input-field`, and so on.
//
// Key architectural principles:
// 1.  **Ordered Decision Policy**: `classify` walks a fixed list of rules and
//     stops at the first one that matches. No rule is ever re-evaluated, so
//     the outcome is a pure function of the element and the text blocks.
// 2.  **One Table Per Type**: Everything that depends on the semantic type
//     (markup tag, base priority, hierarchy weight, interaction and default
//     component properties) lives in a single exhaustive `profile` match.
//     Adding a new type means adding one variant and one table row; the
//     compiler points at every place that must learn about it.
// 3.  **Derived, Never Mutated**: A `WireframeElement` is built once from its
//     `RawElement` and never edited afterwards. Refinements (e.g. precise
//     bounds from the spatial layer) produce a new element.

use crate::core_modules::geometry::Bounds;
use crate::core_modules::raw_element::{ElementKind, RawElement, TextBlock};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Share of an element that must be covered by recognized text for a
/// button-shaped region to count as a real button.
const TEXT_OVERLAP_THRESHOLD: f64 = 0.3;
const MAX_PRIORITY: f64 = 10.0;

/// The semantic UI role assigned to a classified element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WireframeType {
    Button,
    PlaceholderButton,
    InputField,
    TextLabel,
    TextHeading,
    TextContent,
    ContentSection,
    HorizontalContainer,
    VerticalContainer,
    CardContainer,
    IconPlaceholder,
    AvatarPlaceholder,
    Divider,
    Sidebar,
}

/// How a user interacts with an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Click,
    Input,
    Hover,
}

impl InteractionKind {
    pub fn event_handlers(self) -> &'static [&'static str] {
        match self {
            InteractionKind::Click => &["onClick"],
            InteractionKind::Input => &["onChange", "onFocus", "onBlur"],
            // No profile maps to hover; it only marks interactive elements
            // without a declared interaction.
            InteractionKind::Hover => &[],
        }
    }
}

/// Which family of default component properties a type receives in the
/// generated wireframe document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentFamily {
    Button,
    Input,
    Text,
    Structural,
}

/// The per-type row of the classification table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeProfile {
    pub name: &'static str,
    pub html_tag: &'static str,
    pub base_priority: f64,
    /// Contribution of the type to visual importance.
    pub hierarchy_weight: f64,
    pub interaction: Option<InteractionKind>,
    pub family: ComponentFamily,
    /// Counts as readable content when grouping content blocks.
    pub is_content: bool,
}

const DEFAULT_BASE_PRIORITY: f64 = 5.0;
const DEFAULT_HIERARCHY_WEIGHT: f64 = 0.3;

const fn row(
    name: &'static str,
    html_tag: &'static str,
    base_priority: f64,
    hierarchy_weight: f64,
    interaction: Option<InteractionKind>,
    family: ComponentFamily,
    is_content: bool,
) -> TypeProfile {
    TypeProfile {
        name,
        html_tag,
        base_priority,
        hierarchy_weight,
        interaction,
        family,
        is_content,
    }
}

impl WireframeType {
    pub const ALL: [WireframeType; 14] = [
        WireframeType::Button,
        WireframeType::PlaceholderButton,
        WireframeType::InputField,
        WireframeType::TextLabel,
        WireframeType::TextHeading,
        WireframeType::TextContent,
        WireframeType::ContentSection,
        WireframeType::HorizontalContainer,
        WireframeType::VerticalContainer,
        WireframeType::CardContainer,
        WireframeType::IconPlaceholder,
        WireframeType::AvatarPlaceholder,
        WireframeType::Divider,
        WireframeType::Sidebar,
    ];

    pub fn profile(self) -> TypeProfile {
        use ComponentFamily as F;
        use InteractionKind as I;
        match self {
            WireframeType::Button => row("button", "button", 9.0, 0.7, Some(I::Click), F::Button, false),
            WireframeType::PlaceholderButton => row(
                "placeholder-button",
                "button",
                8.0,
                DEFAULT_HIERARCHY_WEIGHT,
                Some(I::Click),
                F::Button,
                false,
            ),
            WireframeType::InputField => row("input-field", "input", 8.0, 0.5, Some(I::Input), F::Input, false),
            WireframeType::TextLabel => row("text-label", "span", 4.0, DEFAULT_HIERARCHY_WEIGHT, None, F::Text, true),
            WireframeType::TextHeading => row("text-heading", "h2", 7.0, 0.8, None, F::Text, true),
            WireframeType::TextContent => row("text-content", "p", DEFAULT_BASE_PRIORITY, 0.4, None, F::Text, true),
            WireframeType::ContentSection => row("content-section", "section", 6.0, 0.6, None, F::Structural, true),
            WireframeType::HorizontalContainer => row(
                "horizontal-container",
                "div",
                DEFAULT_BASE_PRIORITY,
                DEFAULT_HIERARCHY_WEIGHT,
                None,
                F::Structural,
                false,
            ),
            WireframeType::VerticalContainer => row(
                "vertical-container",
                "div",
                DEFAULT_BASE_PRIORITY,
                DEFAULT_HIERARCHY_WEIGHT,
                None,
                F::Structural,
                false,
            ),
            WireframeType::CardContainer => row(
                "card-container",
                "div",
                6.0,
                DEFAULT_HIERARCHY_WEIGHT,
                None,
                F::Structural,
                true,
            ),
            WireframeType::IconPlaceholder => row(
                "icon-placeholder",
                "i",
                4.0,
                DEFAULT_HIERARCHY_WEIGHT,
                None,
                F::Structural,
                false,
            ),
            WireframeType::AvatarPlaceholder => row(
                "avatar-placeholder",
                "img",
                DEFAULT_BASE_PRIORITY,
                DEFAULT_HIERARCHY_WEIGHT,
                None,
                F::Structural,
                false,
            ),
            WireframeType::Divider => row("divider", "hr", 2.0, DEFAULT_HIERARCHY_WEIGHT, None, F::Structural, false),
            WireframeType::Sidebar => row("sidebar", "aside", 7.0, DEFAULT_HIERARCHY_WEIGHT, None, F::Structural, false),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.profile().name
    }

    pub fn html_tag(self) -> &'static str {
        self.profile().html_tag
    }

    pub fn is_button_like(self) -> bool {
        matches!(self, WireframeType::Button | WireframeType::PlaceholderButton)
    }

    pub fn is_text(self) -> bool {
        self.profile().family == ComponentFamily::Text
    }

    pub fn is_heading(self) -> bool {
        self.as_str().contains("heading")
    }

    pub fn is_interactive(self) -> bool {
        self.profile().interaction.is_some()
    }
}

impl fmt::Display for WireframeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw element enriched with its semantic role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireframeElement {
    /// Position of the contributing `RawElement` in the preprocessor output.
    pub source_index: usize,
    pub kind: ElementKind,
    pub bounds: Bounds,
    pub properties: Map<String, Value>,
    pub area: f64,
    pub confidence: f64,
    pub wireframe_type: WireframeType,
    pub html_tag: &'static str,
    pub style_hints: Vec<String>,
    pub priority: f64,
}

impl WireframeElement {
    fn new(source_index: usize, raw: &RawElement, wireframe_type: WireframeType) -> Self {
        let area = raw.normalized_area();
        let confidence = raw.normalized_confidence();
        Self {
            source_index,
            kind: raw.kind,
            bounds: raw.bounds,
            properties: raw.properties.clone(),
            area,
            confidence,
            wireframe_type,
            html_tag: wireframe_type.html_tag(),
            style_hints: style_hints(wireframe_type, &raw.bounds),
            priority: priority(wireframe_type, area, confidence),
        }
    }

    /// A copy of this element placed at refined bounds.
    pub fn with_bounds(&self, bounds: Bounds) -> Self {
        Self {
            bounds,
            ..self.clone()
        }
    }
}

/// Decides the semantic type of a raw element. First matching rule wins.
pub fn classify(raw: &RawElement, text_blocks: &[TextBlock]) -> Option<WireframeType> {
    let bounds = &raw.bounds;
    let aspect = bounds.aspect_ratio();

    // --- 1. Buttons ---
    if raw.kind == ElementKind::Button || (aspect > 1.5 && aspect < 6.0 && bounds.height < 60.0) {
        let has_text = text_blocks
            .iter()
            .any(|block| bounds.overlap_ratio(&block.bounds) >= TEXT_OVERLAP_THRESHOLD);
        return Some(if has_text {
            WireframeType::Button
        } else {
            WireframeType::PlaceholderButton
        });
    }

    // --- 2. Input fields ---
    if raw.kind == ElementKind::InputField
        || (aspect > 2.0 && bounds.height < 50.0 && raw.is_empty_region())
    {
        return Some(WireframeType::InputField);
    }

    // --- 3. Text ---
    if raw.kind.is_text() {
        return Some(if bounds.height < 30.0 {
            WireframeType::TextLabel
        } else if bounds.height > 100.0 {
            WireframeType::TextContent
        } else {
            WireframeType::TextHeading
        });
    }

    match raw.kind {
        ElementKind::Container => Some(if bounds.width > 300.0 && bounds.height > 200.0 {
            WireframeType::ContentSection
        } else if aspect > 2.0 {
            WireframeType::HorizontalContainer
        } else if aspect < 0.5 {
            WireframeType::VerticalContainer
        } else {
            WireframeType::CardContainer
        }),
        ElementKind::CircularElement => Some(if bounds.width < 50.0 {
            WireframeType::IconPlaceholder
        } else {
            WireframeType::AvatarPlaceholder
        }),
        ElementKind::HorizontalSeparator => Some(WireframeType::Divider),
        ElementKind::VerticalSeparator => Some(WireframeType::Sidebar),
        _ => None,
    }
}

/// Classifies and enriches one raw element, or returns `None` when it has no
/// semantic role.
pub fn classify_element(
    source_index: usize,
    raw: &RawElement,
    text_blocks: &[TextBlock],
) -> Option<WireframeElement> {
    classify(raw, text_blocks).map(|wireframe_type| WireframeElement::new(source_index, raw, wireframe_type))
}

/// Classifies every raw element, dropping the unclassified ones. Source
/// indices refer to positions in `elements`.
pub fn classify_all(elements: &[RawElement], text_blocks: &[TextBlock]) -> Vec<WireframeElement> {
    elements
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| classify_element(index, raw, text_blocks))
        .collect()
}

pub fn style_hints(wireframe_type: WireframeType, bounds: &Bounds) -> Vec<String> {
    let mut hints = vec![format!("ui-{wireframe_type}")];
    let conditional = [
        (bounds.width > 400.0, "large-width"),
        (bounds.height > 200.0, "large-height"),
        (bounds.width < 100.0, "small-width"),
        (bounds.height < 50.0, "small-height"),
        (bounds.x < 50.0, "left-aligned"),
        (bounds.y < 50.0, "top-aligned"),
    ];
    hints.extend(
        conditional
            .iter()
            .filter(|(applies, _)| *applies)
            .map(|(_, hint)| hint.to_string()),
    );
    hints
}

pub fn priority(wireframe_type: WireframeType, area: f64, confidence: f64) -> f64 {
    let raw = wireframe_type.profile().base_priority + 0.1 * (area / 10_000.0) + 0.2 * confidence;
    raw.min(MAX_PRIORITY)
}
