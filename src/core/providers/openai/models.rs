//! OpenAI Batch API wire types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::batch::{BatchJob, BatchResult, BatchStatus, BatchUsage};

/// One line of the uploaded input file
#[derive(Debug, Serialize)]
pub struct BatchInputLine<'a> {
    pub custom_id: &'a str,
    pub method: &'static str,
    pub url: &'a str,
    pub body: ChatCompletionBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Response of `POST /files`
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub bytes: Option<u64>,
}

/// Body of `POST /batches`
#[derive(Debug, Serialize)]
pub struct CreateBatchRequest<'a> {
    pub input_file_id: &'a str,
    pub endpoint: &'a str,
    pub completion_window: &'a str,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<&'static str, String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RequestCounts {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub failed: u32,
}

/// Batch object returned by create, retrieve and cancel
#[derive(Debug, Clone, Deserialize)]
pub struct BatchObject {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub input_file_id: Option<String>,
    #[serde(default)]
    pub output_file_id: Option<String>,
    #[serde(default)]
    pub error_file_id: Option<String>,
    #[serde(default)]
    pub request_counts: Option<RequestCounts>,
    /// Unix seconds
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

/// Map the provider status vocabulary onto the canonical one.
///
/// Returns `None` for statuses this adapter does not know.
pub fn map_status(status: &str) -> Option<BatchStatus> {
    match status {
        "validating" => Some(BatchStatus::Submitted),
        "in_progress" | "finalizing" => Some(BatchStatus::InProgress),
        "completed" => Some(BatchStatus::Completed),
        "failed" => Some(BatchStatus::Failed),
        "expired" => Some(BatchStatus::Expired),
        "cancelling" => Some(BatchStatus::Cancelling),
        "cancelled" => Some(BatchStatus::Cancelled),
        _ => None,
    }
}

impl BatchObject {
    /// Canonical status; unknown values are treated as still running
    pub fn canonical_status(&self) -> BatchStatus {
        map_status(&self.status).unwrap_or_else(|| {
            tracing::warn!(job_id = %self.id, status = %self.status, "Unknown batch status, treating as in progress");
            BatchStatus::InProgress
        })
    }

    pub fn to_job(&self, local_id: &str, provider_name: &str, total: Option<u32>) -> BatchJob {
        let counts = self.request_counts.unwrap_or_default();
        let mut job = BatchJob::new(
            local_id,
            &self.id,
            provider_name,
            self.canonical_status(),
            total.unwrap_or(counts.total),
            counts.completed,
            counts.failed,
        );
        if let Some(created_at) = self.created_at.and_then(|s| chrono::DateTime::from_timestamp(s, 0)) {
            job.submitted_at = created_at;
        }
        job.completed_at = self
            .completed_at
            .and_then(|s| chrono::DateTime::from_timestamp(s, 0));
        job.metadata = Some(serde_json::json!({
            "provider_status": self.status,
            "input_file_id": self.input_file_id,
            "output_file_id": self.output_file_id,
            "error_file_id": self.error_file_id,
            "errors": self.errors,
        }));
        job
    }
}

/// One line of the output or error file
#[derive(Debug, Clone, Deserialize)]
pub struct BatchOutputLine {
    pub custom_id: String,
    #[serde(default)]
    pub response: Option<OutputResponse>,
    #[serde(default)]
    pub error: Option<OutputError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputResponse {
    pub status_code: u16,
    #[serde(default)]
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl OutputError {
    fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => "request failed".to_string(),
        }
    }
}

impl BatchOutputLine {
    pub fn into_result(self) -> BatchResult {
        if let Some(error) = &self.error {
            return BatchResult::failed(self.custom_id, error.describe());
        }

        let Some(response) = self.response else {
            return BatchResult::failed(self.custom_id, "result line carries neither response nor error");
        };

        if !(200..300).contains(&response.status_code) {
            let message = response.body["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("request failed with status {}", response.status_code));
            return BatchResult::failed(self.custom_id, message);
        }

        let content = response.body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let usage = response.body.get("usage").map(|usage| BatchUsage {
            input_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0),
            output_tokens: usage["completion_tokens"].as_u64().unwrap_or(0),
        });
        BatchResult::succeeded(self.custom_id, content, usage)
    }
}
