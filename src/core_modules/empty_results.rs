// THEORY:
// Every stage of the engine degrades to a well-defined "nothing found" value
// instead of failing. This module is the single home of those values so the
// aggregator, the merger and the tests all agree on exactly what an empty
// result looks like: empty collections, zero confidence and an `unknown`
// layout.

use crate::core_modules::layout_enhancer::{EnhancedLayout, GridSystem, SemanticRegions};
use crate::core_modules::merger::ProjectResult;
use crate::core_modules::raw_element::{GridEstimate, PreprocessorOutput};
use crate::core_modules::spatial_analyzer::{SpatialAnalysis, VisualHierarchy};
use crate::core_modules::wireframe_analyzer::{LayoutStructure, WireframeAnalysis};
use crate::core_modules::wireframe_document::WireframeDocument;
use crate::pipeline::{ImageInput, PerImageResult};
use std::collections::BTreeMap;

impl WireframeAnalysis {
    pub fn empty() -> Self {
        Self {
            wireframe_elements: Vec::new(),
            layout_structure: LayoutStructure::Unknown,
            grid: GridEstimate::default(),
            navigation_elements: Vec::new(),
            content_blocks: Vec::new(),
            interactive_elements: Vec::new(),
            confidence: 0.0,
        }
    }
}

impl SpatialAnalysis {
    pub fn empty() -> Self {
        Self {
            precise_elements: Vec::new(),
            spatial_relationships: Vec::new(),
            visual_hierarchy: VisualHierarchy::default(),
            color_mapping: BTreeMap::new(),
            responsive_breakpoints: Vec::new(),
            confidence: 0.0,
        }
    }
}

impl EnhancedLayout {
    pub fn empty() -> Self {
        Self {
            structure: LayoutStructure::Unknown,
            confidence: 0.0,
            grid: GridEstimate::default(),
            navigation: Vec::new(),
            semantic_regions: SemanticRegions::default(),
            breakpoints: Vec::new(),
            grid_system: GridSystem::Flexbox,
        }
    }
}

impl PerImageResult {
    /// The result of an image whose analysis failed. Index and input are kept
    /// so callers can still correlate it.
    pub fn empty(image_index: usize, original_image: ImageInput) -> Self {
        Self {
            image_index,
            original_image,
            cv_analysis: PreprocessorOutput::default(),
            wireframe_analysis: WireframeAnalysis::empty(),
            spatial_analysis: SpatialAnalysis::empty(),
            classified_elements: Vec::new(),
            enhanced_layout: EnhancedLayout::empty(),
            wireframe: WireframeDocument::default(),
            confidence: 0.0,
        }
    }
}

impl ProjectResult {
    pub fn empty() -> Self {
        Self {
            image_count: 0,
            elements: Vec::new(),
            layout: EnhancedLayout::empty(),
            wireframe: WireframeDocument::default(),
            confidence: 0.0,
            per_image_results: Vec::new(),
        }
    }
}
