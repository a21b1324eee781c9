pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::OpenAiClient;
pub use crate::config::{LlmConfig, LocalStorage};
pub use crate::core::{
    calculator::PaljaCalculator, calendar::SolarCalendar, engine::AnalysisEngine, ganzhi::Palja,
};
pub use crate::utils::error::{PaljaError, Result};
