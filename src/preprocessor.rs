// THEORY:
// The Vision Preprocessor is the engine's only external collaborator: the
// service that turns raw image bytes into detected regions, recognized text,
// dominant colors and image metadata. Everything in `core_modules` starts
// from its output.
//
// The engine never knows how preprocessing is done. It only needs a handle it
// can share across concurrent per-image tasks (`Send + Sync`, held in an
// `Arc`) and call once per image, plus a teardown hook that runs once when a
// batch is finished.

use crate::core_modules::raw_element::PreprocessorOutput;
use crate::error::PreprocessorError;
use futures::FutureExt;
use futures::future::BoxFuture;

pub trait VisionPreprocessor: Send + Sync {
    /// Analyzes one decoded image.
    fn preprocess<'a>(&'a self, bytes: &'a [u8]) -> BoxFuture<'a, Result<PreprocessorOutput, PreprocessorError>>;

    /// Releases any resources held by the preprocessor. Called once per batch,
    /// after every image has been analyzed.
    fn teardown(&self) -> BoxFuture<'_, ()> {
        futures::future::ready(()).boxed()
    }
}

/// Replays preprocessor output captured earlier. The "image" bytes are the
/// JSON document of a [`PreprocessorOutput`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedPreprocessor;

impl RecordedPreprocessor {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(bytes: &[u8]) -> Result<PreprocessorOutput, PreprocessorError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl VisionPreprocessor for RecordedPreprocessor {
    fn preprocess<'a>(&'a self, bytes: &'a [u8]) -> BoxFuture<'a, Result<PreprocessorOutput, PreprocessorError>> {
        async move { Self::parse(bytes) }.boxed()
    }
}
