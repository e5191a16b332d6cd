// THEORY:
// The `parallel_pipeline` is the batch entry point. It fans a list of images
// out over tokio tasks, one per image, and folds the per-image results back
// into a single `ProjectResult`.
//
// Key architectural principles:
// 1.  **Bounded Fan-Out**: Every image gets its own task in a `JoinSet`, but a
//     semaphore caps how many are inside the preprocessor at once.
// 2.  **Isolation**: An image that fails or panics degrades to the empty result
//     for its own index. Siblings keep running and the batch always completes.
// 3.  **Ordered Fold**: Results arrive in completion order but are slotted
//     back by image index before merging, so the merged model does not depend
//     on scheduling.
// 4.  **All-or-Nothing Cancellation**: Dropping the batch future drops the
//     `JoinSet`, which aborts every in-flight task. Nothing partial is merged.

use crate::core_modules::merger::{ProjectResult, merge};
use crate::pipeline::{ImageInput, PerImageResult, PipelineConfig, WireframePipeline};
use crate::preprocessor::VisionPreprocessor;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub struct ParallelPipeline {
    pipeline: WireframePipeline,
}

impl ParallelPipeline {
    pub fn new(preprocessor: Arc<dyn VisionPreprocessor>, config: PipelineConfig) -> Self {
        Self {
            pipeline: WireframePipeline::new(preprocessor, config),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        self.pipeline.config()
    }

    /// Analyzes every image and merges the results. Never fails: images that
    /// could not be analyzed contribute their empty result.
    pub async fn analyze_batch(&self, images: Vec<ImageInput>) -> ProjectResult {
        let image_count = images.len();
        info!(images = image_count; "Starting batch analysis");

        let limit = self.config().max_concurrent_images.clamp(1, Semaphore::MAX_PERMITS);
        let permits = Arc::new(Semaphore::new(limit));
        let mut tasks = JoinSet::new();

        for (index, image) in images.iter().cloned().enumerate() {
            let pipeline = self.pipeline.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                pipeline.analyze_image(image, index).await
            });
        }

        let mut slots: Vec<Option<PerImageResult>> = vec![None; image_count];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    let index = result.image_index;
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(result);
                    }
                }
                Err(err) => warn!(err:err; "Image task failed to join"),
            }
        }

        // A task lost to a join failure still owes its image an empty result.
        let results: Vec<PerImageResult> = slots
            .into_iter()
            .zip(images)
            .enumerate()
            .map(|(index, (slot, image))| slot.unwrap_or_else(|| PerImageResult::empty(index, image)))
            .collect();

        self.pipeline.preprocessor().teardown().await;
        debug!(images = image_count; "Preprocessor torn down");

        let project = merge(results, self.config());
        info!(
            images = project.image_count,
            elements = project.elements.len(),
            confidence = project.confidence;
            "Batch analysis complete"
        );
        project
    }
}
