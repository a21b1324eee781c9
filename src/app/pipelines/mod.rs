pub mod physiognomy_pipeline;
pub mod saju_pipeline;

pub use physiognomy_pipeline::{PhysiognomyModels, PhysiognomyPipeline, PhysiognomyRequest};
pub use saju_pipeline::{parse_birth, SajuPipeline, SajuRequest, SajuSubject};

use crate::config::cli::timestamped_name_now;
use crate::domain::model::{Artifact, ArtifactPayload};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use tracing::debug;

pub const INTERPRETATION_TEMPERATURE: f32 = 0.6;

/// Writes each artifact under a timestamped name and returns the names in order.
pub async fn save_artifacts<S: Storage>(
    storage: &S,
    artifacts: &[Artifact],
) -> Result<Vec<String>> {
    let mut saved = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let name = timestamped_name_now(&artifact.prefix, artifact.extension());
        let data = match &artifact.payload {
            ArtifactPayload::Json(value) => serde_json::to_vec_pretty(value)?,
            ArtifactPayload::Png(bytes) => bytes.clone(),
        };
        debug!(file = %name, bytes = data.len(), "Writing artifact");
        storage.write_file(&name, &data).await?;
        saved.push(name);
    }
    Ok(saved)
}
