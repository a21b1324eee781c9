pub mod astro;
pub mod calculator;
pub mod calendar;
pub mod engine;
pub mod fortune;
pub mod ganzhi;
pub mod llm_json;
pub mod prompts;
pub mod solar_time;

pub use crate::domain::model::{AnalysisResult, Artifact, SexagenaryPillar, TimeInput};
pub use crate::domain::ports::{CalendarOracle, LlmClient, Pipeline, Storage};
pub use crate::utils::error::Result;
