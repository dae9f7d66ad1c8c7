//! Batch orchestration errors

use crate::core::providers::unified_provider::ProviderError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for batch orchestration
pub type BatchResultOf<T> = std::result::Result<T, BatchError>;

/// Errors surfaced by the batch orchestrator
#[derive(Error, Debug, Clone)]
pub enum BatchError {
    /// Rejected locally before any network call
    #[error("Batch validation error: {0}")]
    Validation(String),

    /// Provider call failed and was not recovered
    #[error("Batch provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Status polling failed for too many consecutive cycles; the remote job is left running
    #[error(
        "Batch job {job_id} on {provider}: polling abandoned after {consecutive_failures} consecutive failed poll cycles (last error: {last_error})"
    )]
    PersistentPollFailure {
        provider: String,
        job_id: String,
        consecutive_failures: u32,
        last_error: ProviderError,
    },

    /// Deadline passed while the job was still running
    #[error(
        "Batch job {job_id} on {provider} timed out after {elapsed:?}: {completed}/{total} requests completed"
    )]
    TimeoutExceeded {
        provider: String,
        job_id: String,
        completed: u32,
        total: u32,
        elapsed: Duration,
    },

    #[error("Batch job {job_id} on {provider} failed: {failed}/{total} requests failed")]
    JobFailed {
        provider: String,
        job_id: String,
        failed: u32,
        total: u32,
    },

    #[error(
        "Batch job {job_id} on {provider} expired before completion: {completed}/{total} requests completed"
    )]
    JobExpired {
        provider: String,
        job_id: String,
        completed: u32,
        total: u32,
    },

    #[error("Batch job {job_id} on {provider} was cancelled: {completed}/{total} requests completed")]
    JobCancelled {
        provider: String,
        job_id: String,
        completed: u32,
        total: u32,
    },
}

impl BatchError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Remote job id, for errors raised after submission
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::PersistentPollFailure { job_id, .. }
            | Self::TimeoutExceeded { job_id, .. }
            | Self::JobFailed { job_id, .. }
            | Self::JobExpired { job_id, .. }
            | Self::JobCancelled { job_id, .. } => Some(job_id),
            Self::Validation(_) | Self::Provider(_) => None,
        }
    }

    /// Registered adapter name, for errors raised after submission
    pub fn provider_name(&self) -> Option<&str> {
        match self {
            Self::PersistentPollFailure { provider, .. }
            | Self::TimeoutExceeded { provider, .. }
            | Self::JobFailed { provider, .. }
            | Self::JobExpired { provider, .. }
            | Self::JobCancelled { provider, .. } => Some(provider),
            Self::Validation(_) | Self::Provider(_) => None,
        }
    }

    /// Whether the provider gave a definitive unsuccessful outcome
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            Self::JobFailed { .. } | Self::JobExpired { .. } | Self::JobCancelled { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimeoutExceeded { .. })
    }

    pub fn is_persistent_poll_failure(&self) -> bool {
        matches!(self, Self::PersistentPollFailure { .. })
    }
}
