use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use serde_json::Value;
use std::time::Instant;
use tracing::info;

/// What one pipeline run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub summary: Value,
    pub saved: Vec<String>,
}

pub struct AnalysisEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> AnalysisEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        info!("Starting analysis...");

        // Extract
        info!("Extracting input...");
        let extracted = self.pipeline.extract().await?;

        // Transform
        info!("Calling model...");
        let result = self.pipeline.transform(extracted).await?;
        info!(artifacts = result.artifacts.len(), "Model output ready");

        let summary = result.summary.clone();

        // Load
        info!("Saving artifacts...");
        let saved = self.pipeline.load(result).await?;
        for path in &saved {
            info!("Saved to: {}", path);
        }

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis finished"
        );
        Ok(RunReport { summary, saved })
    }
}
