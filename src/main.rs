// Example runner for the `wireframe_vision` library.
//
// Replays recorded Vision Preprocessor output through the full batch pipeline:
//
//     wireframe_vision demos/login_form.json demos/dashboard.json
//
// Each argument is a JSON `PreprocessorOutput`. `WV_CONFIG` may point to a JSON
// `PipelineConfig`; `RUST_LOG` controls logging.

use anyhow::{Context, bail};
use log::info;
use std::sync::Arc;
use wireframe_vision::{ImageInput, ParallelPipeline, PipelineConfig, RecordedPreprocessor};

fn load_config() -> anyhow::Result<PipelineConfig> {
    match std::env::var("WV_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
            let config = serde_json::from_str(&raw).with_context(|| format!("parsing config {path}"))?;
            info!(path = path; "Loaded pipeline configuration");
            Ok(config)
        }
        Err(_) => Ok(PipelineConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        bail!("usage: wireframe_vision <recorded-output.json>...");
    }

    let images = paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path).with_context(|| format!("reading {path}"))?;
            Ok(ImageInput::from_bytes(&bytes).with_metadata("source", path.as_str()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let pipeline = ParallelPipeline::new(Arc::new(RecordedPreprocessor::new()), load_config()?);
    let project = pipeline.analyze_batch(images).await;

    println!("{}", serde_json::to_string_pretty(&project)?);
    Ok(())
}
