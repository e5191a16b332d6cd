// THEORY:
// The `pipeline` module is the per-image entry point of the engine. It wires
// the analytical layers in `core_modules` into a single call that turns one
// base64 screenshot into a `PerImageResult`.
//
// Key architectural principles:
// 1.  **Never Fails**: `analyze_image` always returns a result. Any failure
//     (bad payload, preprocessor error or panic, malformed element, crashed
//     strategy worker) is logged and replaced by the empty result for that
//     image, with its index and original input preserved.
// 2.  **Two Independent Strategies**: Strategy A (wireframe patterns) and
//     Strategy B (spatial precision) read the same immutable preprocessor
//     output and run side by side on blocking worker threads. Their readings
//     are combined only after both have finished.
// 3.  **Normalized Input**: Element areas and every preprocessor confidence
//     are brought into range once, before either strategy reads them, so the
//     stored `cv_analysis` obeys the same bounds as everything derived from it.
// 4.  **Fixed Confidence Blend**: The image confidence is a fixed 0.4/0.3/0.3
//     blend of the preprocessor, Strategy A and Strategy B confidences.

use crate::core_modules::element_classifier::{WireframeElement, classify_element};
use crate::core_modules::layout_enhancer::{EnhancedLayout, clamp_unit, enhance_layout};
use crate::core_modules::raw_element::{ImageMetadata, PreprocessorOutput, RawElement, TextBlock};
use crate::core_modules::spatial_analyzer::{SpatialAnalysis, analyze_spatial};
use crate::core_modules::wireframe_analyzer::{WireframeAnalysis, analyze_wireframe};
use crate::core_modules::wireframe_document::{WireframeDocument, build_document};
use crate::error::AnalysisError;
use crate::preprocessor::VisionPreprocessor;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::FutureExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Cursor;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

const PREPROCESSOR_WEIGHT: f64 = 0.4;
const WIREFRAME_WEIGHT: f64 = 0.3;
const SPATIAL_WEIGHT: f64 = 0.3;

/// Configuration for the pipeline. Every field has a default, so a partial
/// JSON document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on images analyzed at the same time within a batch.
    pub max_concurrent_images: usize,
    /// Overlap ratio above which an element from a later image is treated as
    /// a duplicate of one already kept.
    pub duplicate_overlap_threshold: f64,
    /// Relationships at or below this strength are left out of the wireframe
    /// document.
    pub document_relationship_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_images: num_cpus::get(),
            duplicate_overlap_threshold: 0.7,
            document_relationship_threshold: 0.5,
        }
    }
}

/// One image handed to the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageInput {
    /// Base64 image bytes, optionally as a `data:` URL.
    pub data: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ImageInput {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            metadata: Map::new(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(STANDARD.encode(bytes))
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Everything learned about a single image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerImageResult {
    pub image_index: usize,
    pub original_image: ImageInput,
    /// The preprocessor output the analysis started from.
    pub cv_analysis: PreprocessorOutput,
    pub wireframe_analysis: WireframeAnalysis,
    pub spatial_analysis: SpatialAnalysis,
    /// Strategy A's elements reclassified at Strategy B's refined bounds.
    pub classified_elements: Vec<WireframeElement>,
    pub enhanced_layout: EnhancedLayout,
    pub wireframe: WireframeDocument,
    pub confidence: f64,
}

/// Analyzes single images against a shared Vision Preprocessor.
#[derive(Clone)]
pub struct WireframePipeline {
    preprocessor: Arc<dyn VisionPreprocessor>,
    config: PipelineConfig,
}

impl WireframePipeline {
    pub fn new(preprocessor: Arc<dyn VisionPreprocessor>, config: PipelineConfig) -> Self {
        Self { preprocessor, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn preprocessor(&self) -> &Arc<dyn VisionPreprocessor> {
        &self.preprocessor
    }

    /// Runs the full analysis for one image. Never fails: on any error or
    /// panic the empty result for `index` is returned.
    pub async fn analyze_image(&self, image: ImageInput, index: usize) -> PerImageResult {
        let outcome = AssertUnwindSafe(self.try_analyze_image(&image, index))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                warn!(image_index = index, err:err; "Image analysis failed, using empty result");
                PerImageResult::empty(index, image)
            }
            Err(_) => {
                warn!(image_index = index; "Image analysis panicked, using empty result");
                PerImageResult::empty(index, image)
            }
        }
    }

    async fn try_analyze_image(&self, image: &ImageInput, index: usize) -> Result<PerImageResult, AnalysisError> {
        // --- 1. Decode ---
        let bytes = decode_image_data(&image.data)?;

        // --- 2. Probe ---
        let probed = probe_image(&bytes);

        // --- 3. Preprocess ---
        let mut cv_analysis = self.preprocessor.preprocess(&bytes).await?;
        if let Some(probed) = probed
            && cv_analysis.metadata.width == 0
            && cv_analysis.metadata.height == 0
        {
            cv_analysis.metadata = probed;
        }

        // --- 4. Validate ---
        validate_elements(&cv_analysis.elements)?;
        normalize_output(&mut cv_analysis);
        debug!(
            image_index = index,
            elements = cv_analysis.elements.len(),
            text_blocks = cv_analysis.text.blocks.len(),
            colors = cv_analysis.colors.len();
            "Preprocessing complete"
        );

        // --- 5. Strategies A and B ---
        let shared = Arc::new(cv_analysis);
        let wireframe_input = Arc::clone(&shared);
        let wireframe_task = tokio::task::spawn_blocking(move || {
            analyze_wireframe(
                &wireframe_input.elements,
                &wireframe_input.text.blocks,
                wireframe_input.layout.grid,
            )
        });
        let spatial_input = Arc::clone(&shared);
        let spatial_task = tokio::task::spawn_blocking(move || {
            analyze_spatial(
                &spatial_input.elements,
                &spatial_input.text.blocks,
                &spatial_input.colors,
                &spatial_input.metadata,
            )
        });
        let (wireframe_analysis, spatial_analysis) = tokio::try_join!(wireframe_task, spatial_task)?;
        let cv_analysis = Arc::try_unwrap(shared).unwrap_or_else(|shared| (*shared).clone());

        // --- 6. Final classification ---
        let classified_elements =
            refine_classification(&wireframe_analysis, &spatial_analysis, &cv_analysis.text.blocks);

        // --- 7. Enhanced layout ---
        let enhanced_layout = enhance_layout(&classified_elements, &wireframe_analysis, &cv_analysis.layout);

        // --- 8. Confidence ---
        let confidence = aggregate_confidence(
            cv_analysis.confidence,
            wireframe_analysis.confidence,
            spatial_analysis.confidence,
        );

        // --- 9. Wireframe document ---
        let wireframe = build_document(
            index,
            &classified_elements,
            &spatial_analysis.spatial_relationships,
            self.config.document_relationship_threshold,
        );

        info!(
            image_index = index,
            elements = classified_elements.len(),
            layout:? = enhanced_layout.structure,
            confidence = confidence;
            "Image analyzed"
        );

        Ok(PerImageResult {
            image_index: index,
            original_image: image.clone(),
            cv_analysis,
            wireframe_analysis,
            spatial_analysis,
            classified_elements,
            enhanced_layout,
            wireframe,
            confidence,
        })
    }
}

/// Decodes a base64 payload, accepting a `data:<mime>;base64,` prefix.
pub fn decode_image_data(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, encoded)| encoded),
        None => data,
    };
    STANDARD.decode(payload.trim())
}

/// Reads the image header for its format and dimensions. Payloads that are
/// not a recognizable image yield `None`.
pub fn probe_image(bytes: &[u8]) -> Option<ImageMetadata> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    let format = reader.format().map(|f| format!("{f:?}").to_lowercase());
    let (width, height) = reader.into_dimensions().ok()?;
    Some(ImageMetadata { width, height, format })
}

pub fn validate_elements(elements: &[RawElement]) -> Result<(), AnalysisError> {
    match elements.iter().position(|e| !e.bounds.is_well_formed()) {
        Some(index) => Err(AnalysisError::MalformedElement {
            index,
            reason: format!("bounds {:?} are not finite with non-negative size", elements[index].bounds),
        }),
        None => Ok(()),
    }
}

/// Brings element areas and every confidence of a validated output into range.
pub fn normalize_output(output: &mut PreprocessorOutput) {
    for element in &mut output.elements {
        element.area = element.normalized_area();
        element.confidence = element.normalized_confidence();
    }
    output.confidence = clamp_unit(output.confidence);
    output.layout.confidence = clamp_unit(output.layout.confidence);
}

/// Strategy A's elements reclassified at Strategy B's refined bounds, matched
/// by source index. Type, style hints, area and priority all follow the
/// refined geometry, so they agree with Strategy B's hierarchy. An element
/// the refined geometry no longer classifies keeps Strategy A's type.
pub fn refine_classification(
    wireframe: &WireframeAnalysis,
    spatial: &SpatialAnalysis,
    text_blocks: &[TextBlock],
) -> Vec<WireframeElement> {
    wireframe
        .wireframe_elements
        .iter()
        .map(|element| match spatial.precise_element(element.source_index) {
            Some(precise) => classify_element(precise.source_index, &precise.element, text_blocks)
                .unwrap_or_else(|| element.with_bounds(precise.element.bounds)),
            None => element.clone(),
        })
        .collect()
}

pub fn aggregate_confidence(preprocessor: f64, wireframe: f64, spatial: f64) -> f64 {
    clamp_unit(
        PREPROCESSOR_WEIGHT * clamp_unit(preprocessor)
            + WIREFRAME_WEIGHT * clamp_unit(wireframe)
            + SPATIAL_WEIGHT * clamp_unit(spatial),
    )
}
