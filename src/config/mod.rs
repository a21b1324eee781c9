#[cfg(feature = "cli")]
pub mod args;
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use args::{CalcArgs, FaceArgs, SajuArgs};
pub use cli::{timestamped_name, timestamped_name_now, LocalStorage};
pub use toml_config::LlmConfig;
