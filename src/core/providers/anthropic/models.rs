//! Anthropic Message Batches wire types
//!
//! Request payloads, batch snapshots and result lines, plus their mapping
//! onto the canonical batch model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::batch::{BatchJob, BatchResult, BatchStatus, BatchUsage};

/// `POST /v1/messages/batches` body
#[derive(Debug, Serialize)]
pub struct CreateMessageBatchRequest<'a> {
    pub requests: Vec<MessageBatchRequestItem<'a>>,
}

/// One inline request
#[derive(Debug, Serialize)]
pub struct MessageBatchRequestItem<'a> {
    pub custom_id: &'a str,
    pub params: MessageParams<'a>,
}

/// Messages API parameters
#[derive(Debug, Serialize)]
pub struct MessageParams<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub messages: Vec<MessageParam<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct MessageParam<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Batch processing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    InProgress,
    Canceling,
    Ended,
    #[serde(other)]
    Unknown,
}

/// Per-outcome request counters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestCounts {
    #[serde(default)]
    pub processing: u32,
    #[serde(default)]
    pub succeeded: u32,
    #[serde(default)]
    pub errored: u32,
    #[serde(default)]
    pub canceled: u32,
    #[serde(default)]
    pub expired: u32,
}

impl RequestCounts {
    pub fn total(&self) -> u32 {
        self.processing + self.succeeded + self.errored + self.canceled + self.expired
    }

    /// Items that reached a non-success outcome
    pub fn failed(&self) -> u32 {
        self.errored + self.canceled + self.expired
    }
}

/// Batch snapshot returned by create, retrieve and cancel
#[derive(Debug, Clone, Deserialize)]
pub struct MessageBatch {
    pub id: String,
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub request_counts: RequestCounts,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancel_initiated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub results_url: Option<String>,
}

impl MessageBatch {
    /// Canonical status.
    ///
    /// `ended` covers every terminal outcome, so it is refined from the
    /// cancel marker and counters.
    pub fn canonical_status(&self) -> BatchStatus {
        let counts = &self.request_counts;
        match self.processing_status {
            ProcessingStatus::InProgress => BatchStatus::InProgress,
            ProcessingStatus::Canceling => BatchStatus::Cancelling,
            ProcessingStatus::Ended => {
                if self.cancel_initiated_at.is_some() {
                    BatchStatus::Cancelled
                } else if counts.total() > 0 && counts.expired == counts.total() {
                    BatchStatus::Expired
                } else {
                    BatchStatus::Completed
                }
            }
            ProcessingStatus::Unknown => BatchStatus::InProgress,
        }
    }

    /// Canonical job snapshot; `total` overrides the counter sum when known
    pub fn to_job(&self, local_id: &str, provider_name: &str, total: Option<u32>) -> BatchJob {
        let counts = &self.request_counts;
        let mut job = BatchJob::new(
            local_id,
            &self.id,
            provider_name,
            self.canonical_status(),
            total.unwrap_or_else(|| counts.total()),
            counts.succeeded,
            counts.failed(),
        );
        if let Some(created_at) = self.created_at {
            job.submitted_at = created_at;
        }
        job.completed_at = self.ended_at;
        job.metadata = Some(serde_json::json!({
            "processing_status": self.processing_status_str(),
            "expires_at": self.expires_at,
            "results_url": self.results_url,
        }));
        job
    }

    fn processing_status_str(&self) -> &'static str {
        match self.processing_status {
            ProcessingStatus::InProgress => "in_progress",
            ProcessingStatus::Canceling => "canceling",
            ProcessingStatus::Ended => "ended",
            ProcessingStatus::Unknown => "unknown",
        }
    }
}

/// One line of the results feed
#[derive(Debug, Clone, Deserialize)]
pub struct MessageBatchResultLine {
    pub custom_id: String,
    pub result: MessageBatchItemResult,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBatchItemResult {
    Succeeded { message: MessageResponse },
    Errored { error: ErrorEnvelope },
    Canceled,
    Expired,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub usage: Option<MessageUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MessageUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

/// `{"type":"error","error":{"type":..,"message":..}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorDetail>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageBatchResultLine {
    pub fn into_result(self) -> BatchResult {
        match self.result {
            MessageBatchItemResult::Succeeded { message } => {
                let content: String = message
                    .content
                    .iter()
                    .filter(|block| block.block_type == "text")
                    .filter_map(|block| block.text.as_deref())
                    .collect();
                let usage = message.usage.map(|u| BatchUsage {
                    input_tokens: u.input_tokens,
                    output_tokens: u.output_tokens,
                });
                BatchResult::succeeded(self.custom_id, content, usage)
            }
            MessageBatchItemResult::Errored { error } => {
                let message = match error.error {
                    Some(ErrorDetail {
                        error_type: Some(error_type),
                        message: Some(message),
                    }) => format!("{}: {}", error_type, message),
                    Some(ErrorDetail {
                        message: Some(message),
                        ..
                    }) => message,
                    _ => error.message.unwrap_or_else(|| "request errored".to_string()),
                };
                BatchResult::failed(self.custom_id, message)
            }
            MessageBatchItemResult::Canceled => {
                BatchResult::failed(self.custom_id, "request was canceled before processing")
            }
            MessageBatchItemResult::Expired => {
                BatchResult::failed(self.custom_id, "request expired before processing")
            }
        }
    }
}
