// THEORY:
// This file is the main entry point for the `wireframe_vision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the
// public API exposed to external consumers (code generators, renderers, the
// example runner).
//
// The primary goal is to export `ParallelPipeline` (a batch of screenshots in,
// one `ProjectResult` out) and `WireframePipeline` (one screenshot in, one
// `PerImageResult` out) as the high-level interface of the engine, together
// with the `VisionPreprocessor` seam the caller plugs its computer-vision
// backend into. The analytical layers live in `core_modules` and stay public
// for callers that want to run a single stage on their own data.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;
pub mod preprocessor;

pub use core_modules::merger::ProjectResult;
pub use error::{AnalysisError, PreprocessorError};
pub use parallel_pipeline::ParallelPipeline;
pub use pipeline::{ImageInput, PerImageResult, PipelineConfig, WireframePipeline};
pub use preprocessor::{RecordedPreprocessor, VisionPreprocessor};
