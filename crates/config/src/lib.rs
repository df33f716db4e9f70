//! Configuration for the autopod narration pipeline
//!
//! Supports loading configuration from:
//! - TOML files
//! - Environment variables (AUTOPOD_ prefix)

pub mod settings;

pub use settings::{BuildConfig, Settings, TrimConfig, TtsConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
