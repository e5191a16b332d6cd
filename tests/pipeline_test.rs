use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use wireframe_vision::core_modules::element_classifier::WireframeType;
use wireframe_vision::core_modules::geometry::Bounds;
use wireframe_vision::core_modules::raw_element::{
    ElementKind, PreprocessorLayout, PreprocessorOutput, RawElement, TextBlock, TextExtraction,
};
use wireframe_vision::{
    ImageInput, ParallelPipeline, PerImageResult, PipelineConfig, PreprocessorError, ProjectResult,
    RecordedPreprocessor, VisionPreprocessor,
};

/// Replays recordings, but rejects the payload `fail` and panics on `panic`.
/// Counts teardown calls.
#[derive(Default)]
struct ScriptedPreprocessor {
    teardowns: AtomicUsize,
}

impl VisionPreprocessor for ScriptedPreprocessor {
    fn preprocess<'a>(&'a self, bytes: &'a [u8]) -> BoxFuture<'a, Result<PreprocessorOutput, PreprocessorError>> {
        async move {
            match bytes {
                b"fail" => Err(PreprocessorError::Failed("model rejected the image".to_string())),
                b"panic" => panic!("preprocessor crashed"),
                _ => RecordedPreprocessor::parse(bytes),
            }
        }
        .boxed()
    }

    fn teardown(&self) -> BoxFuture<'_, ()> {
        async move {
            self.teardowns.fetch_add(1, Ordering::SeqCst);
        }
        .boxed()
    }
}

fn recording(elements: Vec<RawElement>) -> ImageInput {
    let output = PreprocessorOutput {
        elements,
        confidence: 0.8,
        ..PreprocessorOutput::default()
    };
    ImageInput::from_bytes(&serde_json::to_vec(&output).unwrap())
}

fn card(x: f64) -> RawElement {
    RawElement::new(ElementKind::Container, Bounds::new(x, 300.0, 200.0, 200.0)).with_confidence(0.9)
}

fn config(max_concurrent_images: usize) -> PipelineConfig {
    PipelineConfig {
        max_concurrent_images,
        ..PipelineConfig::default()
    }
}

#[tokio::test]
async fn empty_batch_is_the_empty_project() {
    let pipeline = ParallelPipeline::new(Arc::new(RecordedPreprocessor::new()), PipelineConfig::default());
    let project = pipeline.analyze_batch(Vec::new()).await;
    assert_eq!(project, ProjectResult::empty());
    assert_eq!(project.image_count, 0);
    assert!(project.elements.is_empty());
}

#[tokio::test]
async fn overlapping_elements_across_images_merge_into_one() {
    let pipeline = ParallelPipeline::new(Arc::new(RecordedPreprocessor::new()), config(2));
    let project = pipeline
        .analyze_batch(vec![recording(vec![card(0.0)]), recording(vec![card(20.0)])])
        .await;

    assert_eq!(project.image_count, 2);
    assert_eq!(project.elements.len(), 1);
    assert_eq!(project.elements[0].wireframe_type, WireframeType::CardContainer);
    // Both documents are kept.
    assert_eq!(project.wireframe.components.len(), 2);
    assert_eq!(project.wireframe.components[0].id, "img0-card-container-0");
    assert_eq!(project.wireframe.components[1].id, "img1-card-container-0");
}

#[tokio::test]
async fn unbounded_concurrency_limit_still_runs_the_batch() {
    let config: PipelineConfig = serde_json::from_str(r#"{"max_concurrent_images": 18446744073709551615}"#).unwrap();
    assert_eq!(config.max_concurrent_images, usize::MAX);
    let pipeline = ParallelPipeline::new(Arc::new(RecordedPreprocessor::new()), config);

    let project = pipeline
        .analyze_batch(vec![recording(vec![card(0.0)]), recording(vec![card(600.0)])])
        .await;

    assert_eq!(project.image_count, 2);
    assert_eq!(project.elements.len(), 2);
}

#[tokio::test]
async fn failing_image_does_not_abort_the_batch() {
    let preprocessor = Arc::new(ScriptedPreprocessor::default());
    let pipeline = ParallelPipeline::new(preprocessor.clone(), config(3));
    let failing = ImageInput::from_bytes(b"fail");
    let images = vec![recording(vec![card(0.0)]), recording(vec![card(600.0)]), failing.clone()];

    let project = pipeline.analyze_batch(images).await;

    assert_eq!(project.image_count, 3);
    assert_eq!(project.per_image_results.len(), 3);
    for (index, result) in project.per_image_results.iter().enumerate() {
        assert_eq!(result.image_index, index);
    }
    assert_eq!(project.per_image_results[0].classified_elements.len(), 1);
    assert_eq!(project.per_image_results[1].classified_elements.len(), 1);
    assert_eq!(project.per_image_results[2], PerImageResult::empty(2, failing));
    assert_eq!(project.elements.len(), 2);
    assert_eq!(preprocessor.teardowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn panicking_image_degrades_to_empty_result() {
    let preprocessor = Arc::new(ScriptedPreprocessor::default());
    let pipeline = ParallelPipeline::new(preprocessor.clone(), config(1));
    let crashing = ImageInput::from_bytes(b"panic");

    let project = pipeline
        .analyze_batch(vec![crashing.clone(), recording(vec![card(0.0)])])
        .await;

    assert_eq!(project.image_count, 2);
    assert_eq!(project.per_image_results[0], PerImageResult::empty(0, crashing));
    assert_eq!(project.per_image_results[1].classified_elements.len(), 1);
    assert_eq!(preprocessor.teardowns.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn every_image_failing_folds_to_zero_confidence() {
    let pipeline = ParallelPipeline::new(Arc::new(ScriptedPreprocessor::default()), config(4));
    let images = vec![ImageInput::from_bytes(b"fail"), ImageInput::from_bytes(b"fail")];

    let project = pipeline.analyze_batch(images).await;

    assert_eq!(project.image_count, 2);
    assert!(project.elements.is_empty());
    assert!(project.wireframe.is_empty());
    assert!(project.confidence.abs() < f64::EPSILON);
}

#[tokio::test]
async fn single_image_passes_through_with_button_classified() {
    let output = PreprocessorOutput {
        elements: vec![RawElement::new(ElementKind::Button, Bounds::new(10.0, 10.0, 100.0, 40.0)).with_confidence(0.9)],
        text: TextExtraction {
            blocks: vec![TextBlock {
                bounds: Bounds::new(30.0, 20.0, 50.0, 20.0),
                text: "Submit".to_string(),
                confidence: 0.95,
            }],
        },
        confidence: 0.9,
        ..PreprocessorOutput::default()
    };
    let image = ImageInput::from_bytes(&serde_json::to_vec(&output).unwrap());
    let pipeline = ParallelPipeline::new(Arc::new(RecordedPreprocessor::new()), PipelineConfig::default());

    let project = pipeline.analyze_batch(vec![image]).await;

    assert_eq!(project.image_count, 1);
    assert_eq!(project.elements.len(), 1);
    let button = &project.elements[0];
    assert_eq!(button.wireframe_type, WireframeType::Button);
    assert_eq!(button.html_tag, "button");
    assert!(button.priority >= 9.0);
    assert!((project.confidence - project.per_image_results[0].confidence).abs() < f64::EPSILON);
    assert!((0.0..=1.0).contains(&project.confidence));
}

#[tokio::test]
async fn stored_preprocessor_output_is_brought_into_range() {
    let mut overreported = card(0.0).with_confidence(1.7);
    overreported.area = -5.0;
    let output = PreprocessorOutput {
        elements: vec![overreported],
        layout: PreprocessorLayout {
            confidence: -0.3,
            ..PreprocessorLayout::default()
        },
        confidence: 1.9,
        ..PreprocessorOutput::default()
    };
    let image = ImageInput::from_bytes(&serde_json::to_vec(&output).unwrap());
    let pipeline = ParallelPipeline::new(Arc::new(RecordedPreprocessor::new()), PipelineConfig::default());

    let project = pipeline.analyze_batch(vec![image]).await;

    let cv_analysis = &project.per_image_results[0].cv_analysis;
    assert!((cv_analysis.elements[0].area - 40_000.0).abs() < f64::EPSILON);
    assert!((cv_analysis.elements[0].confidence - 1.0).abs() < f64::EPSILON);
    assert!((cv_analysis.confidence - 1.0).abs() < f64::EPSILON);
    assert!(cv_analysis.layout.confidence.abs() < f64::EPSILON);
    assert!((0.0..=1.0).contains(&project.per_image_results[0].enhanced_layout.confidence));
}

#[tokio::test]
async fn demo_recordings_produce_a_model() {
    let login = std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/login_form.json")).unwrap();
    let dashboard = std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/dashboard.json")).unwrap();
    let pipeline = ParallelPipeline::new(Arc::new(RecordedPreprocessor::new()), PipelineConfig::default());

    let project = pipeline
        .analyze_batch(vec![ImageInput::from_bytes(&login), ImageInput::from_bytes(&dashboard)])
        .await;

    assert_eq!(project.image_count, 2);
    assert!(!project.elements.is_empty());
    assert!(project.per_image_results.iter().all(|r| r.confidence > 0.0));
    let json = serde_json::to_value(&project).unwrap();
    assert_eq!(json["imageCount"], 2);
    assert!(json["wireframe"]["components"].as_array().is_some_and(|c| !c.is_empty()));
}
