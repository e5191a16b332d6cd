// THEORY:
// The `merger` is the last stage of a batch. Each image was analyzed in
// isolation; this module folds those per-image readings into one project-level
// model of the interface.
//
// Key architectural principles:
// 1.  **Greedy Deduplication**: Elements are visited in encounter order (image
//     order, then element order) and compared only against elements already
//     kept. An element whose box overlaps a kept one by more than the
//     configured ratio is a duplicate. The result depends on order and is not
//     globally optimal; the first sighting of a component always survives.
// 2.  **Best Single Layout**: Layouts are never blended. The layout with the
//     highest confidence wins outright, and the earliest image wins a tie.
// 3.  **Nothing Lost**: Wireframe documents are concatenated and every
//     per-image result is carried through untouched, so callers can always
//     correlate the merged model with its sources.

use crate::core_modules::element_classifier::WireframeElement;
use crate::core_modules::layout_enhancer::EnhancedLayout;
use crate::core_modules::wireframe_document::WireframeDocument;
use crate::pipeline::{PerImageResult, PipelineConfig};
use log::debug;
use serde::Serialize;

/// The final, merged model of every analyzed image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResult {
    pub image_count: usize,
    pub elements: Vec<WireframeElement>,
    pub layout: EnhancedLayout,
    pub wireframe: WireframeDocument,
    pub confidence: f64,
    pub per_image_results: Vec<PerImageResult>,
}

pub fn merge(results: Vec<PerImageResult>, config: &PipelineConfig) -> ProjectResult {
    match results.len() {
        0 => ProjectResult::empty(),
        1 => passthrough(results),
        _ => merge_many(results, config),
    }
}

fn passthrough(results: Vec<PerImageResult>) -> ProjectResult {
    let result = &results[0];
    ProjectResult {
        image_count: 1,
        elements: result.classified_elements.clone(),
        layout: result.enhanced_layout.clone(),
        wireframe: result.wireframe.clone(),
        confidence: result.confidence,
        per_image_results: results,
    }
}

fn merge_many(results: Vec<PerImageResult>, config: &PipelineConfig) -> ProjectResult {
    let all_elements: Vec<WireframeElement> = results
        .iter()
        .flat_map(|r| r.classified_elements.iter().cloned())
        .collect();
    let total = all_elements.len();
    let elements = deduplicate(all_elements, config.duplicate_overlap_threshold);

    let layout = best_layout(&results);

    let mut wireframe = WireframeDocument::default();
    for result in &results {
        wireframe.extend(result.wireframe.clone());
    }

    let confidence = results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64;

    debug!(
        images = results.len(),
        elements = total,
        kept = elements.len(),
        confidence = confidence;
        "Merged per-image results"
    );

    ProjectResult {
        image_count: results.len(),
        elements,
        layout,
        wireframe,
        confidence,
        per_image_results: results,
    }
}

/// Keeps each element unless it overlaps an already kept element by more
/// than `overlap_threshold`.
pub fn deduplicate(elements: Vec<WireframeElement>, overlap_threshold: f64) -> Vec<WireframeElement> {
    elements.into_iter().fold(Vec::new(), |mut kept, candidate| {
        let is_duplicate = kept
            .iter()
            .any(|k: &WireframeElement| k.bounds.overlap_ratio(&candidate.bounds) > overlap_threshold);
        if !is_duplicate {
            kept.push(candidate);
        }
        kept
    })
}

fn best_layout(results: &[PerImageResult]) -> EnhancedLayout {
    results
        .iter()
        .map(|r| &r.enhanced_layout)
        .reduce(|best, candidate| {
            if candidate.confidence > best.confidence {
                candidate
            } else {
                best
            }
        })
        .cloned()
        .unwrap_or_else(EnhancedLayout::empty)
}
