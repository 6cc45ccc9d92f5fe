//! Error types for cadence-audio

use thiserror::Error;

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio analysis errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio format error: {0}")]
    Format(String),

    #[error("Timed history error: {0}")]
    History(String),

    #[error("Audio source error: {0}")]
    Source(String),

    #[error("Precompute error: {0}")]
    Precompute(String),

    #[error("Precompute job was cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
