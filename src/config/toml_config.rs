use crate::utils::error::{PaljaError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TEXT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1-mini";

/// Remote model settings. Every section may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_text_model")]
    pub text: String,
    #[serde(default = "default_text_model")]
    pub vision: String,
    #[serde(default = "default_image_model")]
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_image_size")]
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key() -> String {
    "${OPENAI_API_KEY}".to_string()
}

fn default_timeout() -> u64 {
    90
}

fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_output_path() -> String {
    ".".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            text: default_text_model(),
            vision: default_text_model(),
            image: default_image_model(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            size: default_image_size(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

/// 替換環境變數 (例如 ${OPENAI_API_KEY})，未設定的保持原樣
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PaljaError::ConfigError {
        message: format!("invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

impl LlmConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        let mut config: Self = toml::from_str(&processed).map_err(|e| PaljaError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })?;
        // 預設值本身也可能是 ${VAR}
        config.api.api_key = substitute_env_vars(&config.api.api_key)?;
        Ok(config)
    }

    /// Defaults plus `OPENAI_API_KEY` / `OPENAI_BASE_URL` from the environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.api.api_key = substitute_env_vars(&config.api.api_key)?;
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            if !base_url.trim().is_empty() {
                config.api.base_url = base_url;
            }
        }
        Ok(config)
    }

    /// File when given, environment otherwise.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    pub fn api_key_is_set(&self) -> bool {
        let key = self.api.api_key.trim();
        !key.is_empty() && !key.starts_with("${")
    }
}

impl Validate for LlmConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        if !self.api_key_is_set() {
            return Err(PaljaError::ConfigError {
                message: "api.api_key is not set (export OPENAI_API_KEY or add it to the config)"
                    .to_string(),
            });
        }
        validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 600)?;

        validate_non_empty_string("models.text", &self.models.text)?;
        validate_non_empty_string("models.vision", &self.models.vision)?;
        validate_non_empty_string("models.image", &self.models.image)?;

        let size = Regex::new(r"^\d+x\d+$").map_err(|e| PaljaError::ConfigError {
            message: format!("invalid size pattern: {}", e),
        })?;
        if !size.is_match(&self.image.size) {
            return Err(PaljaError::InvalidInputValue {
                field: "image.size".to_string(),
                value: self.image.size.clone(),
                reason: "expected WIDTHxHEIGHT, e.g. 1024x1024".to_string(),
            });
        }

        validate_path("output.path", &self.output.path)?;
        Ok(())
    }
}
