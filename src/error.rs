//! Error types for archcost
//!
//! This module defines the error handling strategy for archcost. There are two
//! error types: `ArchcostError` (main error enum) and `ConfigError` (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `ArchcostError`.
//! CLI code uses `anyhow::Result<T>` for top-level error handling. The conversion
//! happens at the CLI boundary using `anyhow::Error::from` to preserve error chains.
//!
//! Only structural input errors (`Structural`) abort an estimation run.
//! Everything that can go wrong per node (a pricing lookup miss, an
//! unmapped region, an unrecognized node type) is NOT an error here: it
//! degrades to a zero-cost breakdown entry plus a report warning, so a
//! syntactically valid input always yields a report.
//!
//! ## Retry Awareness
//!
//! Errors implement `IsRetryable` to indicate whether an operation should be
//! retried. The `RetryPolicy` in `src/retry.rs` uses this for Price List API
//! transport failures. Catalog errors that survive the retry budget are
//! absorbed at the cache boundary and surfaced to resolvers as an empty
//! record set, never as an exception.

use thiserror::Error;

/// Main error type for archcost
#[derive(Error, Debug)]
pub enum ArchcostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Structural input error: {0}")]
    Structural(String),

    #[error("Pricing catalog error: {0}")]
    Catalog(String),

    #[error("LLM provider error: {provider} - {message}")]
    LlmProvider {
        provider: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("All LLM providers failed: {0}")]
    LlmExhausted(String),

    #[error("Retryable error (attempt {attempt}/{max_attempts}): {reason}")]
    Retryable {
        attempt: u32,
        max_attempts: u32,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ArchcostError>;

/// Trait for determining if an error is retryable
///
/// Used by `RetryPolicy` implementations to determine whether an error
/// should trigger a retry attempt. Catalog transport and I/O failures are
/// retryable; structural and configuration errors fail immediately since
/// the input will not become valid by waiting.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for ArchcostError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            ArchcostError::Retryable { .. }
                | ArchcostError::Catalog(_)
                | ArchcostError::Io(_)
                | ArchcostError::Http(_)
        )
    }
}
