// THEORY:
// The `spatial_analyzer` is Strategy B of the engine: a precision-oriented
// reading of the screen. Strategy A asks "what kind of page is this"; this
// layer asks "where exactly is everything, how do the pieces relate, and what
// draws the eye first".
//
// Key architectural principles:
// 1.  **Precise Geometry**: Bounds are snapped to one decimal place and checked
//     against the common design grids (8, 12, 16, 24). Spacing is estimated,
//     not measured: the preprocessor gives us regions, not margins.
// 2.  **Pairwise Relationships**: Every unordered pair of elements is visited
//     exactly once. The distance between their origins is normalized by the
//     typical element size so that "adjacent" means the same thing for icons
//     and for hero sections.
// 3.  **Single-Pass Hierarchy**: Visual importance blends size, position
//     (top-left reads first) and semantic weight. One sort and one split cut
//     the ranked list into primary/secondary/tertiary tiers that always
//     partition the input.
// 4.  **Color Semantics**: Dominant colors are mapped to semantic roles by
//     simple channel thresholds, plus a usage hint derived from how much of
//     the image each color covers.

use crate::core_modules::element_classifier::{WireframeElement, classify_element};
use crate::core_modules::geometry::Bounds;
use crate::core_modules::raw_element::{Color, ImageMetadata, RawElement, TextBlock};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

pub const GRID_SIZES: [u32; 4] = [8, 12, 16, 24];
const DEFAULT_MARGIN: f64 = 8.0;
const MIN_PADDING: f64 = 4.0;
const PADDING_RATIO: f64 = 0.05;
const MIN_RELATIONSHIP_STRENGTH: f64 = 0.3;
const PRIMARY_PERCENT: usize = 20;
const SECONDARY_PERCENT: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spacing {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Spacing {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// A raw element with refined geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreciseElement {
    pub source_index: usize,
    pub element: RawElement,
    /// Grid size → whether every bound is a multiple of it.
    pub grid_alignment: BTreeMap<u32, bool>,
    pub margins: Spacing,
    pub padding: Spacing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Adjacent,
    Nearby,
    Distant,
}

/// A relationship between two elements, referenced by their source index.
/// The pair is unordered; `source < target` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialRelationship {
    pub source: usize,
    pub target: usize,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    pub distance: f64,
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VisualHierarchy {
    pub primary: Vec<WireframeElement>,
    pub secondary: Vec<WireframeElement>,
    pub tertiary: Vec<WireframeElement>,
}

impl VisualHierarchy {
    /// Number of non-empty tiers.
    pub fn levels(&self) -> usize {
        [&self.primary, &self.secondary, &self.tertiary]
            .iter()
            .filter(|tier| !tier.is_empty())
            .count()
    }

    pub fn len(&self) -> usize {
        self.primary.len() + self.secondary.len() + self.tertiary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorRole {
    #[serde(rename = "error/alert")]
    ErrorAlert,
    #[serde(rename = "success/confirmation")]
    SuccessConfirmation,
    #[serde(rename = "info/navigation")]
    InfoNavigation,
    #[serde(rename = "background/neutral")]
    BackgroundNeutral,
    #[serde(rename = "text/content")]
    TextContent,
    #[serde(rename = "accent/decoration")]
    AccentDecoration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageContext {
    Background,
    Accent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorAssignment {
    pub color: Color,
    pub role: ColorRole,
    pub usage: Vec<UsageContext>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub name: &'static str,
    pub min_width: u32,
}

/// The output of the spatial strategy for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialAnalysis {
    pub precise_elements: Vec<PreciseElement>,
    pub spatial_relationships: Vec<SpatialRelationship>,
    pub visual_hierarchy: VisualHierarchy,
    /// Keyed by the color's hex code.
    pub color_mapping: BTreeMap<String, ColorAssignment>,
    pub responsive_breakpoints: Vec<Breakpoint>,
    pub confidence: f64,
}

impl SpatialAnalysis {
    /// The refined element with the given source index.
    pub fn precise_element(&self, source_index: usize) -> Option<&PreciseElement> {
        self.precise_elements.iter().find(|p| p.source_index == source_index)
    }
}

/// Runs the spatial strategy. Text blocks are only used to type the
/// elements that enter the visual hierarchy.
pub fn analyze_spatial(
    elements: &[RawElement],
    text_blocks: &[TextBlock],
    colors: &[Color],
    metadata: &ImageMetadata,
) -> SpatialAnalysis {
    let precise_elements: Vec<PreciseElement> = elements
        .iter()
        .enumerate()
        .map(|(index, raw)| refine_element(index, raw))
        .collect();

    let spatial_relationships = compute_relationships(&precise_elements);

    let ranked: Vec<WireframeElement> = precise_elements
        .iter()
        .filter_map(|p| classify_element(p.source_index, &p.element, text_blocks))
        .collect();
    let visual_hierarchy = build_visual_hierarchy(ranked);

    let color_mapping = map_colors(colors);
    let responsive_breakpoints = responsive_breakpoints(metadata.width);

    let confidence = spatial_confidence(
        precise_elements.len(),
        spatial_relationships.len(),
        color_mapping.len(),
        visual_hierarchy.levels(),
    );

    debug!(
        elements = precise_elements.len(),
        relationships = spatial_relationships.len(),
        colors = color_mapping.len(),
        confidence = confidence;
        "Spatial analysis complete"
    );

    SpatialAnalysis {
        precise_elements,
        spatial_relationships,
        visual_hierarchy,
        color_mapping,
        responsive_breakpoints,
        confidence,
    }
}

pub fn refine_element(source_index: usize, raw: &RawElement) -> PreciseElement {
    let bounds = raw.bounds.rounded();
    let grid_alignment = GRID_SIZES
        .iter()
        .map(|&size| (size, is_grid_aligned(&bounds, size)))
        .collect();
    let padding = (PADDING_RATIO * bounds.width.min(bounds.height)).max(MIN_PADDING);

    PreciseElement {
        source_index,
        element: RawElement {
            bounds,
            area: raw.normalized_area(),
            confidence: raw.normalized_confidence(),
            ..raw.clone()
        },
        grid_alignment,
        margins: Spacing::uniform(DEFAULT_MARGIN),
        padding: Spacing::uniform(padding),
    }
}

fn is_grid_aligned(bounds: &Bounds, size: u32) -> bool {
    let size = f64::from(size);
    [bounds.x, bounds.y, bounds.width, bounds.height]
        .iter()
        .all(|v| v % size == 0.0)
}

/// Classifies a pair distance normalized by the typical element size.
fn relationship_for(normalized_distance: f64) -> (RelationshipKind, f64) {
    if normalized_distance < 2.0 {
        (RelationshipKind::Adjacent, 1.0 - normalized_distance / 2.0)
    } else if normalized_distance < 5.0 {
        (RelationshipKind::Nearby, 1.0 - normalized_distance / 5.0)
    } else {
        (RelationshipKind::Distant, 0.0)
    }
}

pub fn compute_relationships(elements: &[PreciseElement]) -> Vec<SpatialRelationship> {
    let mut relationships = Vec::new();

    for (i, a) in elements.iter().enumerate() {
        for b in &elements[i + 1..] {
            let average_area = (a.element.area + b.element.area) / 2.0;
            if average_area <= 0.0 {
                continue;
            }
            let distance = a.element.bounds.origin_distance(&b.element.bounds);
            let (kind, strength) = relationship_for(distance / average_area.sqrt());
            if strength > MIN_RELATIONSHIP_STRENGTH {
                relationships.push(SpatialRelationship {
                    source: a.source_index.min(b.source_index),
                    target: a.source_index.max(b.source_index),
                    kind,
                    distance,
                    strength,
                });
            }
        }
    }

    relationships.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    relationships
}

pub fn visual_importance(element: &WireframeElement) -> f64 {
    let size_score = element.area.max(1.0).ln();
    let position_score = (1000.0 - element.bounds.x - element.bounds.y) / 1000.0;
    let type_score = element.wireframe_type.profile().hierarchy_weight;
    0.3 * size_score + 0.2 * position_score + 0.5 * type_score
}

fn percentile_boundary(count: usize, percent: usize) -> usize {
    (count * percent).div_ceil(100)
}

pub fn build_visual_hierarchy(elements: Vec<WireframeElement>) -> VisualHierarchy {
    let mut scored: Vec<(f64, WireframeElement)> = elements
        .into_iter()
        .map(|e| (visual_importance(&e), e))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let count = scored.len();
    let primary_end = percentile_boundary(count, PRIMARY_PERCENT);
    let secondary_end = percentile_boundary(count, SECONDARY_PERCENT).max(primary_end);

    let mut ranked = scored.into_iter().map(|(_, e)| e);
    let primary: Vec<WireframeElement> = ranked.by_ref().take(primary_end).collect();
    let secondary: Vec<WireframeElement> = ranked.by_ref().take(secondary_end - primary_end).collect();
    let tertiary: Vec<WireframeElement> = ranked.collect();

    VisualHierarchy {
        primary,
        secondary,
        tertiary,
    }
}

pub fn color_role(color: &Color) -> ColorRole {
    let (r, g, b) = (color.r, color.g, color.b);
    if r > 200 && g < 100 && b < 100 {
        ColorRole::ErrorAlert
    } else if r < 100 && g > 150 && b < 100 {
        ColorRole::SuccessConfirmation
    } else if r < 100 && g < 100 && b > 150 {
        ColorRole::InfoNavigation
    } else if r > 240 && g > 240 && b > 240 {
        ColorRole::BackgroundNeutral
    } else if r < 50 && g < 50 && b < 50 {
        ColorRole::TextContent
    } else {
        ColorRole::AccentDecoration
    }
}

/// Frequencies between 0.1 and 0.3 carry no usage label.
pub fn usage_context(frequency: f64) -> Vec<UsageContext> {
    let mut usage = Vec::new();
    if frequency > 0.3 {
        usage.push(UsageContext::Background);
    }
    if frequency < 0.1 {
        usage.push(UsageContext::Accent);
    }
    usage
}

pub fn map_colors(colors: &[Color]) -> BTreeMap<String, ColorAssignment> {
    colors
        .iter()
        .map(|color| {
            (
                color.hex.clone(),
                ColorAssignment {
                    color: color.clone(),
                    role: color_role(color),
                    usage: usage_context(color.frequency),
                },
            )
        })
        .collect()
}

pub fn responsive_breakpoints(image_width: u32) -> Vec<Breakpoint> {
    let candidates = [
        Breakpoint { name: "xl", min_width: 1200 },
        Breakpoint { name: "lg", min_width: 992 },
        Breakpoint { name: "md", min_width: 768 },
    ];
    candidates
        .into_iter()
        .filter(|bp| image_width >= bp.min_width)
        .chain(std::iter::once(Breakpoint { name: "sm", min_width: 576 }))
        .collect()
}

pub fn spatial_confidence(
    precise_count: usize,
    relationship_count: usize,
    color_count: usize,
    hierarchy_levels: usize,
) -> f64 {
    let precise_score = (precise_count as f64 / 10.0).min(1.0);
    let relationship_score = (relationship_count as f64 / 20.0).min(1.0);
    let color_score = (color_count as f64 / 8.0).min(1.0);
    let hierarchy_score = if hierarchy_levels >= 1 { 1.0 } else { 0.0 };
    (0.3 * precise_score + 0.3 * relationship_score + 0.2 * color_score + 0.2 * hierarchy_score)
        .clamp(0.0, 1.0)
}
