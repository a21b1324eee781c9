use anyhow::Result;
use httpmock::prelude::*;
use saju_palja::app::pipelines::{
    PhysiognomyModels, PhysiognomyPipeline, PhysiognomyRequest, SajuPipeline, SajuRequest,
};
use saju_palja::domain::model::Sex;
use saju_palja::{AnalysisEngine, LlmConfig, LocalStorage, OpenAiClient, PaljaError};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn responses_body(text: &str) -> Value {
    json!({
        "output": [{"type": "message", "content": [{"type": "output_text", "text": text}]}],
        "usage": {"input_tokens": 100, "output_tokens": 40, "total_tokens": 140}
    })
}

fn config_for(server: &MockServer, output: &Path) -> Result<LlmConfig> {
    let toml = format!(
        r#"
[api]
base_url = "{}"
api_key = "sk-integration"
timeout_seconds = 5

[output]
path = "{}"
"#,
        server.url("/v1"),
        output.display()
    );
    Ok(LlmConfig::from_toml_str(&toml)?)
}

#[tokio::test]
async fn test_saju_interpretation_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/responses")
            .header("authorization", "Bearer sk-integration")
            .body_contains("경오 / 정해 / 계사 / 정사");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(responses_body(
                r#"{"nickname": "고요한 등불", "sex": "male", "age": "30대", "summary": "차분함"}"#,
            ));
    });

    let config = config_for(&server, temp_dir.path())?;
    let storage = LocalStorage::new(config.output.path.clone());
    let llm = OpenAiClient::from_config(&config)?;
    let pipeline = SajuPipeline::new(
        storage,
        llm,
        config.models.text.clone(),
        SajuRequest {
            sex: Sex::Male,
            birth: Some("199011241030".to_string()),
            palja: None,
            timezone: "Asia/Seoul".to_string(),
            longitude: None,
        },
    );

    let report = AnalysisEngine::new(pipeline).run().await?;
    api_mock.assert();

    assert_eq!(report.summary["nickname"], "고요한 등불");
    assert_eq!(report.saved.len(), 1);
    assert!(report.saved[0].starts_with("saju_interpretation_male_199011241030_경오정해계사정사_"));

    let written: Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join(&report.saved[0]))?)?;
    assert_eq!(written, report.summary);
    Ok(())
}

#[tokio::test]
async fn test_saju_api_error_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/v1/responses");
        then.status(429).body("rate limited");
    });

    let config = config_for(&server, temp_dir.path())?;
    let pipeline = SajuPipeline::new(
        LocalStorage::new(config.output.path.clone()),
        OpenAiClient::from_config(&config)?,
        config.models.text.clone(),
        SajuRequest {
            sex: Sex::Female,
            birth: None,
            palja: Some("경오정해계사정사".to_string()),
            timezone: "Asia/Seoul".to_string(),
            longitude: None,
        },
    );

    let err = AnalysisEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, PaljaError::LlmStatus { status: 429, .. }));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_face_reading_end_to_end_with_partner_image() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let image_path = temp_dir.path().join("face.jpg");
    std::fs::write(&image_path, b"\xff\xd8\xff\xe0jpeg")?;
    let output_dir = temp_dir.path().join("out");

    let server = MockServer::start();
    let vision_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/responses")
            .body_contains("data:image/jpeg;base64,");
        then.status(200).json_body(responses_body(
            r#"{"eyes": {"size": "medium"}, "face_shape": "round"}"#,
        ));
    });
    let text_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/responses")
            .json_body_partial(r#"{"temperature": 0.6}"#);
        then.status(200).json_body(responses_body(
            r#"{"summary": "온화함", "ideal_partner_physiognomy": {"partner_sex": "woman", "partner_age": 40}}"#,
        ));
    });
    let image_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/images/generations")
            .json_body_partial(r#"{"size": "512x512"}"#);
        then.status(200)
            .json_body(json!({"data": [{"b64_json": "iVBORw0KGgo="}]}));
    });

    let mut config = config_for(&server, &output_dir)?;
    config.image.size = "512x512".to_string();

    let pipeline = PhysiognomyPipeline::new(
        LocalStorage::new(config.output.path.clone()),
        OpenAiClient::from_config(&config)?,
        PhysiognomyModels::from(&config),
        PhysiognomyRequest {
            image_path: image_path.clone(),
            sex: Sex::Male,
            age: 42,
            partner_image: true,
        },
    );

    let report = AnalysisEngine::new(pipeline)
        .run()
        .await?;
    vision_mock.assert();
    text_mock.assert();
    image_mock.assert();

    assert_eq!(report.summary["features"]["age"], 42);
    assert_eq!(report.summary["interpretation"]["summary"], "온화함");
    assert_eq!(report.saved.len(), 3);

    let png = std::fs::read(output_dir.join(&report.saved[2]))?;
    assert_eq!(&png[..4], b"\x89PNG");
    Ok(())
}

#[tokio::test]
async fn test_request_timeout_is_reported() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/responses");
        then.status(200)
            .delay(Duration::from_millis(1500))
            .json_body(responses_body("{}"));
    });

    let client = OpenAiClient::new(&server.url("/v1"), "sk", Duration::from_millis(200))?;
    let temp_dir = TempDir::new()?;
    let pipeline = SajuPipeline::new(
        LocalStorage::new(temp_dir.path().to_string_lossy().to_string()),
        client,
        "gpt-4.1-mini",
        SajuRequest {
            sex: Sex::Male,
            birth: None,
            palja: Some("경오정해계사".to_string()),
            timezone: "Asia/Seoul".to_string(),
            longitude: None,
        },
    );

    let err = AnalysisEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, PaljaError::ApiError(_)));
    Ok(())
}
