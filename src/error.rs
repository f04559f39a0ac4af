//! Error types for the tutoring gateway

use thiserror::Error;

/// Result type alias for tutoring operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the tutoring gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing lookup entry, bad settings file)
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech-to-text failure from the transcription collaborator
    #[error("transcription error: {0}")]
    Transcription(String),

    /// Chat-completion failure from the language-model collaborator
    #[error("completion error: {0}")]
    Completion(String),

    /// Text-to-speech failure from the synthesis collaborator
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
