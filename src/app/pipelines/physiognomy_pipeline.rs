use super::{save_artifacts, INTERPRETATION_TEMPERATURE};
use crate::adapters::openai::image_data_url;
use crate::config::toml_config::LlmConfig;
use crate::core::llm_json::parse_llm_json;
use crate::core::prompts::{partner_image_prompt, physiognomy_prompt, FACE_FEATURE_PROMPT};
use crate::domain::model::{
    AnalysisResult, Artifact, ImageRequest, Sex, TextRequest, VisionRequest,
};
use crate::domain::ports::{LlmClient, Pipeline, Storage};
use crate::utils::error::Result;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct PhysiognomyRequest {
    pub image_path: PathBuf,
    pub sex: Sex,
    pub age: u32,
    pub partner_image: bool,
}

/// Model names and image size used by the three calls.
#[derive(Debug, Clone)]
pub struct PhysiognomyModels {
    pub vision: String,
    pub text: String,
    pub image: String,
    pub image_size: String,
}

impl From<&LlmConfig> for PhysiognomyModels {
    fn from(config: &LlmConfig) -> Self {
        Self {
            vision: config.models.vision.clone(),
            text: config.models.text.clone(),
            image: config.models.image.clone(),
            image_size: config.image.size.clone(),
        }
    }
}

pub struct PhysiognomyPipeline<S: Storage, L: LlmClient> {
    storage: S,
    llm: L,
    models: PhysiognomyModels,
    request: PhysiognomyRequest,
}

impl<S: Storage, L: LlmClient> PhysiognomyPipeline<S, L> {
    pub fn new(
        storage: S,
        llm: L,
        models: PhysiognomyModels,
        request: PhysiognomyRequest,
    ) -> Self {
        Self {
            storage,
            llm,
            models,
            request,
        }
    }

    async fn extract_features(&self, image_url: String) -> Result<Value> {
        let reply = self
            .llm
            .complete_vision(VisionRequest {
                model: self.models.vision.clone(),
                prompt: FACE_FEATURE_PROMPT.to_string(),
                image_url,
                temperature: 0.0,
            })
            .await?;
        Ok(Value::Object(parse_llm_json(&reply.text)?))
    }

    async fn interpret(&self, features: &Value) -> Result<Value> {
        let reply = self
            .llm
            .complete_text(TextRequest {
                model: self.models.text.clone(),
                prompt: physiognomy_prompt(features, self.request.sex, self.request.age),
                temperature: INTERPRETATION_TEMPERATURE,
            })
            .await?;
        Ok(Value::Object(parse_llm_json(&reply.text)?))
    }
}

#[async_trait::async_trait]
impl<S: Storage, L: LlmClient> Pipeline for PhysiognomyPipeline<S, L> {
    /// Image as a data URL.
    type Extracted = String;

    async fn extract(&self) -> Result<String> {
        let path = &self.request.image_path;
        let bytes = tokio::fs::read(path).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "Image loaded");
        image_data_url(&path.to_string_lossy(), &bytes)
    }

    async fn transform(&self, image_url: String) -> Result<AnalysisResult> {
        info!("Extracting facial features...");
        let features = self.extract_features(image_url).await?;
        let mut artifacts = vec![Artifact::json("face_features", features.clone())];

        info!("Interpreting physiognomy...");
        let mut enriched = features.clone();
        if let Value::Object(map) = &mut enriched {
            map.insert("sex".to_string(), json!(self.request.sex.as_word()));
            map.insert("age".to_string(), json!(self.request.age));
        }
        let interpretation = self.interpret(&enriched).await?;
        artifacts.push(Artifact::json(
            "physiognomy_interpretation",
            interpretation.clone(),
        ));

        if self.request.partner_image {
            info!("Generating ideal partner image...");
            let prompt = partner_image_prompt(&interpretation, self.request.sex, self.request.age);
            let bytes = self
                .llm
                .generate_image(ImageRequest {
                    model: self.models.image.clone(),
                    prompt,
                    size: self.models.image_size.clone(),
                })
                .await?;
            artifacts.push(Artifact::png("ideal_partner", bytes));
        }

        Ok(AnalysisResult {
            summary: json!({
                "features": enriched,
                "interpretation": interpretation,
            }),
            artifacts,
        })
    }

    async fn load(&self, result: AnalysisResult) -> Result<Vec<String>> {
        save_artifacts(&self.storage, &result.artifacts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipelines::testing::{Call, MockStorage, ScriptedLlm};
    use crate::utils::error::PaljaError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FEATURES: &str = r#"{"eyes": {"size": "large"}, "face_shape": "oval"}"#;
    const INTERPRETATION: &str = r#"```json
{"summary": "따뜻한 인상", "ideal_partner_physiognomy": {"partner_sex": "man", "partner_age": 33,
 "facial_feature_preferences": {"eyes": "narrow", "nose": "high bridge", "mouth": "thin", "face_shape": "long"}}}
```"#;

    fn models() -> PhysiognomyModels {
        PhysiognomyModels::from(&LlmConfig::default())
    }

    fn image_file() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"fake-png").unwrap();
        file
    }

    fn request(path: PathBuf, partner_image: bool) -> PhysiognomyRequest {
        PhysiognomyRequest {
            image_path: path,
            sex: Sex::Female,
            age: 31,
            partner_image,
        }
    }

    #[tokio::test]
    async fn test_extract_builds_data_url() {
        let file = image_file();
        let pipeline = PhysiognomyPipeline::new(
            MockStorage::new(),
            ScriptedLlm::new(&[]),
            models(),
            request(file.path().to_path_buf(), false),
        );

        let url = pipeline.extract().await.unwrap();
        assert_eq!(url, "data:image/png;base64,ZmFrZS1wbmc=");
    }

    #[tokio::test]
    async fn test_extract_missing_image() {
        let pipeline = PhysiognomyPipeline::new(
            MockStorage::new(),
            ScriptedLlm::new(&[]),
            models(),
            request(PathBuf::from("/nonexistent/face.png"), false),
        );
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, PaljaError::IoError(_)));
    }

    #[tokio::test]
    async fn test_full_run_without_partner_image() {
        let file = image_file();
        let llm = ScriptedLlm::new(&[FEATURES, INTERPRETATION]);
        let storage = MockStorage::new();
        let pipeline = PhysiognomyPipeline::new(
            storage.clone(),
            llm.clone(),
            models(),
            request(file.path().to_path_buf(), false),
        );

        let url = pipeline.extract().await.unwrap();
        let result = pipeline.transform(url).await.unwrap();
        assert_eq!(result.summary["features"]["sex"], "female");
        assert_eq!(result.summary["features"]["age"], 31);
        assert_eq!(result.summary["interpretation"]["summary"], "따뜻한 인상");

        let calls = llm.calls();
        assert_eq!(calls.len(), 2);
        match (&calls[0], &calls[1]) {
            (Call::Vision(vision), Call::Text(text)) => {
                assert_eq!(vision.temperature, 0.0);
                assert!(vision.image_url.starts_with("data:image/png;base64,"));
                assert_eq!(text.temperature, 0.6);
                assert!(text.prompt.contains("\"sex\": \"female\""));
            }
            other => panic!("unexpected calls: {:?}", other),
        }

        let saved = pipeline.load(result).await.unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved[0].starts_with("face_features_"));
        assert!(saved[1].starts_with("physiognomy_interpretation_"));

        // 特徵檔不含 sex/age
        let features: Value =
            serde_json::from_slice(&storage.get_file(&saved[0]).await.unwrap()).unwrap();
        assert!(features.get("sex").is_none());
        assert_eq!(features["face_shape"], "oval");
    }

    #[tokio::test]
    async fn test_partner_image_uses_interpretation() {
        let file = image_file();
        let llm = ScriptedLlm::new(&[FEATURES, INTERPRETATION]);
        let storage = MockStorage::new();
        let pipeline = PhysiognomyPipeline::new(
            storage.clone(),
            llm.clone(),
            models(),
            request(file.path().to_path_buf(), true),
        );

        let url = pipeline.extract().await.unwrap();
        let result = pipeline.transform(url).await.unwrap();

        match llm.calls().last() {
            Some(Call::Image(req)) => {
                assert_eq!(req.model, "gpt-image-1-mini");
                assert_eq!(req.size, "1024x1024");
                assert!(req.prompt.contains("man around 33 years old"));
                assert!(req.prompt.contains("Eyes: narrow"));
            }
            other => panic!("unexpected last call: {:?}", other),
        }

        let saved = pipeline.load(result).await.unwrap();
        assert_eq!(saved.len(), 3);
        assert!(saved[2].starts_with("ideal_partner_") && saved[2].ends_with(".png"));
        assert_eq!(
            storage.get_file(&saved[2]).await.unwrap(),
            vec![0x89, b'P', b'N', b'G']
        );
    }
}
