//! Error types for the narration pipeline

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the narration pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Segment parameter contract violations
    #[error("invalid segment: {0}")]
    Segment(#[from] SegmentError),

    /// Build pipeline errors
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Content provider errors
    #[error("content error: {0}")]
    Content(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}

/// Segment parameter violations, caught before any synthesis work
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentError {
    #[error("speech text must not be empty")]
    EmptyText,

    #[error("voice must not be empty")]
    EmptyVoice,

    #[error("rate must be a positive ratio, got {0}")]
    InvalidRate(f64),

    #[error("volume must be a positive ratio, got {0}")]
    InvalidVolume(f64),

    #[error("silence duration must be a finite non-negative number of seconds, got {0}")]
    InvalidDuration(f64),
}
