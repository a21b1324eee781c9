use crate::config::toml_config::LlmConfig;
use crate::domain::model::{ImageRequest, LlmReply, TextRequest, Usage, VisionRequest};
use crate::domain::ports::LlmClient;
use crate::utils::error::{PaljaError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<OutputItem>,
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    usage: Option<UsageWire>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Option<Vec<ContentPart>>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageWire {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ImagesReply {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    b64_json: Option<String>,
}

impl ResponsesReply {
    fn into_reply(self) -> LlmReply {
        let mut text = String::new();
        for part in self
            .output
            .into_iter()
            .flat_map(|item| item.content.unwrap_or_default())
        {
            if part.kind == "output_text" {
                if let Some(t) = part.text {
                    text.push_str(&t);
                }
            }
        }
        if text.is_empty() {
            text = self.output_text.unwrap_or_default();
        }

        LlmReply {
            text,
            usage: self.usage.map(|u| Usage {
                input: u.input_tokens,
                output: u.output_tokens,
                total: u.total_tokens,
            }),
        }
    }
}

/// `data:<mime>;base64,...` for an image file; the mime follows the extension.
pub fn image_data_url(file_name: &str, bytes: &[u8]) -> Result<String> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        _ => {
            return Err(PaljaError::InvalidInputValue {
                field: "image".to_string(),
                value: file_name.to_string(),
                reason: "supported image types: jpg, jpeg, png, webp".to_string(),
            })
        }
    };
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// OpenAI-compatible Responses and Images API client. No retries.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Self::new(
            &config.api.base_url,
            &config.api.api_key,
            Duration::from_secs(config.api.timeout_seconds),
        )
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("Making API request to: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PaljaError::LlmStatus { status, body });
        }
        Ok(response)
    }

    async fn responses(&self, body: Value) -> Result<LlmReply> {
        let reply: ResponsesReply = self.post_json("responses", &body).await?.json().await?;
        let reply = reply.into_reply();
        if let Some(usage) = reply.usage {
            info!(
                input_tokens = usage.input,
                output_tokens = usage.output,
                total_tokens = usage.total,
                "Model usage"
            );
        }
        Ok(reply)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete_text(&self, req: TextRequest) -> Result<LlmReply> {
        self.responses(json!({
            "model": req.model,
            "input": req.prompt,
            "temperature": req.temperature,
        }))
        .await
    }

    async fn complete_vision(&self, req: VisionRequest) -> Result<LlmReply> {
        self.responses(json!({
            "model": req.model,
            "input": [{
                "role": "user",
                "content": [
                    { "type": "input_text", "text": req.prompt },
                    { "type": "input_image", "image_url": req.image_url },
                ],
            }],
            "temperature": req.temperature,
        }))
        .await
    }

    async fn generate_image(&self, req: ImageRequest) -> Result<Vec<u8>> {
        let body = json!({
            "model": req.model,
            "prompt": req.prompt,
            "size": req.size,
        });
        let reply: ImagesReply = self
            .post_json("images/generations", &body)
            .await?
            .json()
            .await?;

        let b64 = reply
            .data
            .into_iter()
            .find_map(|d| d.b64_json)
            .ok_or_else(|| PaljaError::LlmJson {
                message: "image response carried no b64_json".to_string(),
                raw: String::new(),
            })?;
        Ok(STANDARD.decode(b64.trim())?)
    }
}
