use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaljaError {
    #[error("Invalid timezone: {tz}")]
    InvalidTimezone { tz: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidInputValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required input: {field}")]
    MissingInput { field: String },

    #[error("Invalid solar date: {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("Solar term {term} of {year} is outside the supported range")]
    TermOutOfRange { year: i32, term: &'static str },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("LLM API returned {status}: {body}")]
    LlmStatus { status: u16, body: String },

    #[error("LLM output is not usable JSON: {message}")]
    LlmJson { message: String, raw: String },

    #[error("Image decode error: {0}")]
    ImageDecodeError(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },
}

pub type Result<T> = std::result::Result<T, PaljaError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Calendar,
    Network,
    Response,
    System,
}

impl PaljaError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTimezone { .. }
            | Self::InvalidInputValue { .. }
            | Self::MissingInput { .. }
            | Self::ConfigError { .. } => ErrorCategory::Input,
            Self::InvalidDate { .. } | Self::TermOutOfRange { .. } => ErrorCategory::Calendar,
            Self::ApiError(_) | Self::LlmStatus { .. } => ErrorCategory::Network,
            Self::LlmJson { .. } | Self::ImageDecodeError(_) => ErrorCategory::Response,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidTimezone { tz } => format!("Unknown timezone '{}'", tz),
            Self::InvalidInputValue { field, reason, .. } => {
                format!("Input '{}' is invalid: {}", field, reason)
            }
            Self::MissingInput { field } => format!("Input '{}' is required", field),
            Self::InvalidDate { year, month, day } => {
                format!("{:04}-{:02}-{:02} is not a valid date", year, month, day)
            }
            Self::TermOutOfRange { year, .. } => {
                format!("Year {} is outside the supported calendar range", year)
            }
            Self::ApiError(_) | Self::LlmStatus { .. } => {
                "The model API could not be reached or refused the request".to_string()
            }
            Self::LlmJson { message, .. } => format!("The model reply was unusable: {}", message),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check the command-line flags and configuration values",
            ErrorCategory::Calendar => {
                "Use a real Gregorian date between years 1 and 9999 (month 1-12, valid day)"
            }
            ErrorCategory::Network => "Check OPENAI_API_KEY, the base URL and network access",
            ErrorCategory::Response => "Run again; model output varies between calls",
            ErrorCategory::System => "Check file permissions and free disk space",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Calendar => 1,
            ErrorCategory::Network => 2,
            ErrorCategory::Response => 2,
            ErrorCategory::System => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = PaljaError::InvalidTimezone {
            tz: "Mars/Olympus".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "Invalid timezone: Mars/Olympus");

        let err = PaljaError::InvalidDate {
            year: 2023,
            month: 2,
            day: 30,
        };
        assert_eq!(err.category(), ErrorCategory::Calendar);
        assert_eq!(err.to_string(), "Invalid solar date: 2023-02-30");

        let err = PaljaError::TermOutOfRange {
            year: 10_000,
            term: "立春",
        };
        assert_eq!(err.category(), ErrorCategory::Calendar);
        assert_eq!(err.exit_code(), 1);
        assert!(!err.to_string().contains("-00-00"));

        let err = PaljaError::LlmStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.exit_code(), 2);
    }
}
