//! Error handling for the batch runner
//!
//! Errors raised outside the orchestrator itself: configuration loading,
//! request and result files, and the command line surface.

#![allow(missing_docs)]

use crate::core::batch::BatchError;
use crate::core::providers::unified_provider::ProviderError;
use thiserror::Error;

/// Result type alias for the runner
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Main error type for the runner
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed request file
    #[error("Invalid input at line {line}: {message}")]
    InvalidInput { line: usize, message: String },

    /// Provider construction or direct provider call errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Orchestration errors
    #[error(transparent)]
    Batch(#[from] BatchError),
}

impl RunnerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the remote job may still be running and can be resumed
    pub fn is_resumable(&self) -> bool {
        matches!(
            self,
            Self::Batch(BatchError::PersistentPollFailure { .. })
        )
    }
}
