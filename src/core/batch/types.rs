//! Batch processing types and data structures
//!
//! Canonical job and result model shared by every provider adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Maximum length of a caller supplied correlation id
pub const MAX_CORRELATION_ID_LEN: usize = 64;

/// Default upper bound on requests in a single batch
pub const DEFAULT_MAX_REQUESTS_PER_BATCH: usize = 5000;

/// Default initial poll interval (30s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30_000);

/// Default poll interval cap (12 minutes)
pub const DEFAULT_MAX_POLL_INTERVAL: Duration = Duration::from_millis(720_000);

/// Default wall clock deadline for `submit_and_wait` (1 hour)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3_600_000);

/// Single work item submitted as part of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    /// Caller assigned id, unique within the batch
    pub correlation_id: String,
    /// System prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// User prompt
    pub user_prompt: String,
    /// Model override for this item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Maximum output tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl BatchRequest {
    /// Create a request with only the required fields
    pub fn new(correlation_id: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            system_prompt: None,
            user_prompt: user_prompt.into(),
            model: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Token usage reported for a single item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Outcome of a single batch item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Matches `BatchRequest::correlation_id`
    pub correlation_id: String,
    pub success: bool,
    /// Present iff `success`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Present iff `!success`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<BatchUsage>,
}

impl BatchResult {
    /// Successful item
    pub fn succeeded(
        correlation_id: impl Into<String>,
        content: impl Into<String>,
        usage: Option<BatchUsage>,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            success: true,
            content: Some(content.into()),
            error: None,
            usage,
        }
    }

    /// Failed item
    pub fn failed(correlation_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            success: false,
            content: None,
            error: Some(error.into()),
            usage: None,
        }
    }
}

/// Canonical batch job status
///
/// `Submitted -> InProgress -> {Completed | Failed | Expired | Cancelling -> Cancelled}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Accepted by the provider, not yet running
    Submitted,
    /// Running
    InProgress,
    /// All items processed
    Completed,
    /// The job as a whole failed
    Failed,
    /// Provider deadline passed before completion
    Expired,
    /// Cancellation requested, not yet confirmed
    Cancelling,
    /// Cancellation confirmed
    Cancelled,
}

impl BatchStatus {
    /// Whether no further transition can leave this state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Expired | Self::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Expired => "expired",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a batch job as last reported by its provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchJob {
    /// Local id
    pub id: String,
    /// Id assigned by the remote provider
    pub provider_job_id: String,
    /// Registered adapter name
    pub provider_name: String,
    pub status: BatchStatus,
    /// Fixed at submission
    pub total_requests: u32,
    pub completed_requests: u32,
    pub failed_requests: u32,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl BatchJob {
    /// Build a job snapshot, clamping counts so `completed + failed <= total`.
    ///
    /// A zero `total_requests` means the provider did not report one; counts
    /// are then kept as reported until [`BatchJob::with_submission_identity`]
    /// supplies the submission total.
    pub fn new(
        id: impl Into<String>,
        provider_job_id: impl Into<String>,
        provider_name: impl Into<String>,
        status: BatchStatus,
        total_requests: u32,
        completed_requests: u32,
        failed_requests: u32,
    ) -> Self {
        let mut job = Self {
            id: id.into(),
            provider_job_id: provider_job_id.into(),
            provider_name: provider_name.into(),
            status,
            total_requests,
            completed_requests,
            failed_requests,
            submitted_at: Utc::now(),
            completed_at: None,
            metadata: None,
        };
        if job.total_requests > 0 {
            job.clamp_counts();
        }
        job
    }

    /// Generate a fresh local id
    pub fn new_local_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Requests not yet completed or failed
    pub fn pending_requests(&self) -> u32 {
        self.total_requests
            .saturating_sub(self.completed_requests + self.failed_requests)
    }

    /// Carry the identity fixed at submission onto a freshly polled snapshot.
    ///
    /// Status and counters stay as the provider reported them.
    pub fn with_submission_identity(mut self, submitted: &BatchJob) -> Self {
        self.id = submitted.id.clone();
        self.provider_name = submitted.provider_name.clone();
        self.submitted_at = submitted.submitted_at;
        if submitted.total_requests > 0 {
            self.total_requests = submitted.total_requests;
        }
        self.clamp_counts();
        self
    }

    fn clamp_counts(&mut self) {
        self.completed_requests = self.completed_requests.min(self.total_requests);
        self.failed_requests = self
            .failed_requests
            .min(self.total_requests - self.completed_requests);
    }
}

/// Options for `submit_batch`
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOptions {
    /// Explicit adapter name
    pub provider: Option<String>,
    /// Default model for items that do not set one
    pub model: Option<String>,
    pub max_requests_per_batch: usize,
    /// Free-form tag recorded in job metadata
    pub agent_name: Option<String>,
    /// Free-form tag recorded in job metadata
    pub purpose: Option<String>,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            max_requests_per_batch: DEFAULT_MAX_REQUESTS_PER_BATCH,
            agent_name: None,
            purpose: None,
        }
    }
}

impl SubmitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_requests_per_batch(mut self, max: usize) -> Self {
        self.max_requests_per_batch = max;
        self
    }

    pub fn with_agent_name(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = Some(agent_name.into());
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }
}

/// Progress callback invoked after every successful poll
pub type ProgressCallback = Arc<dyn Fn(&BatchJob) + Send + Sync>;

/// Options for `submit_and_wait` and `resume_and_wait`
#[derive(Clone)]
pub struct WaitOptions {
    pub submit: SubmitOptions,
    /// First sleep before polling; doubled after every poll
    pub poll_interval: Duration,
    /// Cap on the doubled poll interval
    pub max_poll_interval: Duration,
    /// Wall clock deadline measured from submission
    pub timeout: Duration,
    pub on_progress: Option<ProgressCallback>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            submit: SubmitOptions::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_interval: DEFAULT_MAX_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            on_progress: None,
        }
    }
}

impl fmt::Debug for WaitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitOptions")
            .field("submit", &self.submit)
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_interval", &self.max_poll_interval)
            .field("timeout", &self.timeout)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl WaitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submit_options(mut self, submit: SubmitOptions) -> Self {
        self.submit = submit;
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.submit.provider = Some(provider.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_poll_interval(mut self, interval: Duration) -> Self {
        self.max_poll_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&BatchJob) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }
}
