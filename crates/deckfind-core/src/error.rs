//! Error types for deckfind

use thiserror::Error;

/// Result type alias using DeckFindError
pub type Result<T> = std::result::Result<T, DeckFindError>;

/// Error type alias for convenience
pub type Error = DeckFindError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for deckfind
#[derive(Debug, Error)]
pub enum DeckFindError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Reserved for stricter filter validation. The builder itself accepts
    /// any combination of absent fields, including contradictory year
    /// bounds, which simply match nothing.
    #[error("Filter construction error: {0}")]
    FilterConstruction(String),

    /// The vector index call failed (network, auth, malformed predicate).
    /// Never raised for zero matches.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// The enhancement model call failed or returned output that could not
    /// be parsed. Callers fall back to the raw, unenhanced query.
    #[error("Query enhancement error: {0}")]
    QueryEnhancement(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl DeckFindError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DocumentNotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
