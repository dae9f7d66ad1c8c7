//! OpenAI Batch API adapter
//!
//! Upload-then-reference protocol: requests are written to a JSONL file,
//! uploaded, and the batch is created against the file id. Results live in
//! separate output and error files.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use super::config::OpenAIConfig;
use super::models::{
    BatchInputLine, BatchObject, BatchOutputLine, ChatCompletionBody, ChatMessage,
    CreateBatchRequest, FileObject,
};
use crate::core::batch::{BatchJob, BatchProviderAdapter, BatchRequest, BatchResult, SubmitOptions};
use crate::core::providers::shared::{
    HttpClientBuilder, check_response, parse_json_lines, read_json, to_json_lines, transport_error,
};
use crate::core::providers::unified_provider::ProviderError;

const PROVIDER: &str = super::PROVIDER_NAME;
const INPUT_FILE_NAME: &str = "batch_input.jsonl";

/// OpenAI batch adapter
#[derive(Debug, Clone)]
pub struct OpenAIBatchAdapter {
    name: String,
    config: OpenAIConfig,
    http_client: Client,
}

impl OpenAIBatchAdapter {
    pub fn new(name: impl Into<String>, config: OpenAIConfig) -> Result<Self, ProviderError> {
        let mut builder = HttpClientBuilder::new(PROVIDER)
            .timeout(Duration::from_secs(config.timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .default_headers(&config.headers);
        if let Some(api_key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.default_header("Authorization", format!("Bearer {}", api_key));
        }
        if let Some(org) = &config.organization {
            builder = builder.default_header("OpenAI-Organization", org.clone());
        }
        if let Some(project) = &config.project {
            builder = builder.default_header("OpenAI-Project", project.clone());
        }

        Ok(Self {
            name: name.into(),
            http_client: builder.build()?,
            config,
        })
    }

    /// Create from `OPENAI_*` environment variables
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(PROVIDER, OpenAIConfig::from_env()?)
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Render the input file
    fn build_input_file(
        &self,
        requests: &[BatchRequest],
        options: &SubmitOptions,
    ) -> Result<String, ProviderError> {
        let fallback_model = options
            .model
            .as_deref()
            .unwrap_or(self.config.default_model.as_str());

        let lines: Vec<BatchInputLine<'_>> = requests
            .iter()
            .map(|request| {
                let mut messages = Vec::with_capacity(2);
                if let Some(system) = request.system_prompt.as_deref() {
                    messages.push(ChatMessage {
                        role: "system",
                        content: system,
                    });
                }
                messages.push(ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                });

                BatchInputLine {
                    custom_id: &request.correlation_id,
                    method: "POST",
                    url: &self.config.endpoint,
                    body: ChatCompletionBody {
                        model: request.model.as_deref().unwrap_or(fallback_model),
                        messages,
                        max_tokens: request.max_tokens.unwrap_or(self.config.default_max_tokens),
                        temperature: request.temperature,
                    },
                }
            })
            .collect();

        to_json_lines(PROVIDER, &lines)
    }

    async fn upload_input_file(&self, content: String) -> Result<FileObject, ProviderError> {
        let size = content.len();
        let file_part = multipart::Part::bytes(content.into_bytes())
            .file_name(INPUT_FILE_NAME)
            .mime_str("application/jsonl")
            .map_err(|e| ProviderError::invalid_request(PROVIDER, format!("Invalid MIME type: {}", e)))?;
        let form = multipart::Form::new()
            .text("purpose", "batch")
            .part("file", file_part);

        debug!(provider = %self.name, bytes = size, "Uploading batch input file");
        let response = self
            .http_client
            .post(self.config.get_api_url("/files"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        read_json(PROVIDER, check_response(PROVIDER, response).await?).await
    }

    async fn fetch_batch(&self, provider_job_id: &str) -> Result<BatchObject, ProviderError> {
        let response = self
            .http_client
            .get(self.config.get_api_url(&format!("/batches/{}", provider_job_id)))
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        read_json(PROVIDER, check_response(PROVIDER, response).await?).await
    }

    async fn download_file(&self, file_id: &str) -> Result<String, ProviderError> {
        let response = self
            .http_client
            .get(self.config.get_api_url(&format!("/files/{}/content", file_id)))
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        check_response(PROVIDER, response)
            .await?
            .text()
            .await
            .map_err(|e| transport_error(PROVIDER, e))
    }
}

#[async_trait]
impl BatchProviderAdapter for OpenAIBatchAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        self.config.has_api_key()
    }

    async fn submit_batch(
        &self,
        requests: &[BatchRequest],
        options: &SubmitOptions,
    ) -> Result<BatchJob, ProviderError> {
        let input = self.build_input_file(requests, options)?;
        let file = self.upload_input_file(input).await?;

        let mut metadata = HashMap::new();
        if let Some(agent_name) = &options.agent_name {
            metadata.insert("agent_name", agent_name.clone());
        }
        if let Some(purpose) = &options.purpose {
            metadata.insert("purpose", purpose.clone());
        }
        let body = CreateBatchRequest {
            input_file_id: &file.id,
            endpoint: &self.config.endpoint,
            completion_window: &self.config.completion_window,
            metadata,
        };

        let response = self
            .http_client
            .post(self.config.get_api_url("/batches"))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let batch: BatchObject = read_json(PROVIDER, check_response(PROVIDER, response).await?).await?;

        info!(provider = %self.name, job_id = %batch.id, input_file_id = %file.id, "Batch created");
        Ok(batch.to_job(
            &BatchJob::new_local_id(),
            &self.name,
            Some(requests.len() as u32),
        ))
    }

    async fn get_batch_status(&self, provider_job_id: &str) -> Result<BatchJob, ProviderError> {
        let batch = self.fetch_batch(provider_job_id).await?;
        Ok(batch.to_job(provider_job_id, &self.name, None))
    }

    async fn get_batch_results(
        &self,
        provider_job_id: &str,
    ) -> Result<Vec<BatchResult>, ProviderError> {
        let batch = self.fetch_batch(provider_job_id).await?;
        if batch.output_file_id.is_none() && batch.error_file_id.is_none() {
            return Err(ProviderError::invalid_request(
                PROVIDER,
                format!(
                    "Batch {} has no output or error file (status {})",
                    provider_job_id, batch.status
                ),
            ));
        }

        let mut results = Vec::new();
        for file_id in [&batch.output_file_id, &batch.error_file_id]
            .into_iter()
            .flatten()
        {
            let content = self.download_file(file_id).await?;
            let lines: Vec<BatchOutputLine> = parse_json_lines(PROVIDER, &content);
            debug!(provider = %self.name, job_id = provider_job_id, file_id = %file_id, lines = lines.len(), "Parsed batch result file");
            results.extend(lines.into_iter().map(BatchOutputLine::into_result));
        }
        Ok(results)
    }

    async fn cancel_batch(&self, provider_job_id: &str) -> Result<(), ProviderError> {
        let response = self
            .http_client
            .post(self.config.get_api_url(&format!("/batches/{}/cancel", provider_job_id)))
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        check_response(PROVIDER, response).await?;
        info!(provider = %self.name, job_id = provider_job_id, "Batch cancellation requested");
        Ok(())
    }
}
