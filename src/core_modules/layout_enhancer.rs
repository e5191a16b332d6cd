// THEORY:
// The `layout_enhancer` takes the page-level reading from the wireframe
// strategy and decorates it with the facts a code generator needs to lay the
// page out: which elements belong to which semantic region, which responsive
// breakpoints the design spans, and what kind of column grid it was built on.
//
// It works on the final, merged element list (wireframe types with precise
// bounds) and never changes those elements; regions refer to them by source
// index.

use crate::core_modules::element_classifier::WireframeElement;
use crate::core_modules::geometry::cluster_positions;
use crate::core_modules::raw_element::{GridEstimate, PreprocessorLayout};
use crate::core_modules::wireframe_analyzer::{
    GRID_CLUSTER_TOLERANCE, LayoutStructure, NavigationGroup, WireframeAnalysis,
};
use serde::Serialize;

const HEADER_MAX_Y: f64 = 100.0;
const FOOTER_MIN_Y: f64 = 600.0;
const SIDEBAR_MAX_X: f64 = 200.0;
const BOOTSTRAP_COLUMNS: u32 = 12;
const CUSTOM_GRID_MIN_COLUMNS: u32 = 6;

/// Source indices of the elements in each page region. The sidebar band is
/// orthogonal to the vertical bands, so an element can sit in two regions.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SemanticRegions {
    pub header: Vec<usize>,
    pub main: Vec<usize>,
    pub footer: Vec<usize>,
    pub sidebar: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GridSystem {
    /// The classic 12-column grid.
    Bootstrap { columns: u32 },
    Custom { columns: u32 },
    /// No regular column grid; content flows.
    Flexbox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedLayout {
    pub structure: LayoutStructure,
    pub confidence: f64,
    pub grid: GridEstimate,
    pub navigation: Vec<NavigationGroup>,
    pub semantic_regions: SemanticRegions,
    pub breakpoints: Vec<&'static str>,
    pub grid_system: GridSystem,
}

pub fn enhance_layout(
    elements: &[WireframeElement],
    wireframe: &WireframeAnalysis,
    preprocessor_layout: &PreprocessorLayout,
) -> EnhancedLayout {
    EnhancedLayout {
        structure: wireframe.layout_structure,
        confidence: clamp_unit(preprocessor_layout.confidence),
        grid: wireframe.grid,
        navigation: wireframe.navigation_elements.clone(),
        semantic_regions: semantic_regions(elements),
        breakpoints: breakpoint_labels(elements),
        grid_system: detect_grid_system(elements),
    }
}

pub fn semantic_regions(elements: &[WireframeElement]) -> SemanticRegions {
    let mut regions = SemanticRegions::default();
    for element in elements {
        let index = element.source_index;
        let bounds = &element.bounds;

        if bounds.y < HEADER_MAX_Y {
            regions.header.push(index);
        } else if bounds.y < FOOTER_MIN_Y {
            regions.main.push(index);
        } else {
            regions.footer.push(index);
        }

        if bounds.x < SIDEBAR_MAX_X {
            regions.sidebar.push(index);
        }
    }
    regions
}

/// Breakpoint labels implied by the widest extent any element reaches.
pub fn breakpoint_labels(elements: &[WireframeElement]) -> Vec<&'static str> {
    let max_extent = elements
        .iter()
        .map(|e| e.bounds.right())
        .fold(0.0_f64, f64::max);

    if max_extent > 1200.0 {
        vec!["xl", "lg", "md", "sm"]
    } else if max_extent > 768.0 {
        vec!["lg", "md", "sm"]
    } else {
        vec!["md", "sm"]
    }
}

pub fn detect_grid_system(elements: &[WireframeElement]) -> GridSystem {
    let columns =
        cluster_positions(elements.iter().map(|e| e.bounds.x), GRID_CLUSTER_TOLERANCE).len() as u32;
    if columns == BOOTSTRAP_COLUMNS {
        GridSystem::Bootstrap { columns }
    } else if columns >= CUSTOM_GRID_MIN_COLUMNS {
        GridSystem::Custom { columns }
    } else {
        GridSystem::Flexbox
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
