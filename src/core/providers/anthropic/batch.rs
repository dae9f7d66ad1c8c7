//! Anthropic Message Batches adapter
//!
//! Inline-submission protocol: every request is embedded in the create call,
//! status comes from one endpoint with aggregate counters, and results are
//! streamed as JSONL keyed by batch id.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::config::AnthropicConfig;
use super::models::{
    CreateMessageBatchRequest, MessageBatch, MessageBatchRequestItem, MessageBatchResultLine,
    MessageParam, MessageParams,
};
use crate::core::batch::{BatchJob, BatchProviderAdapter, BatchRequest, BatchResult, SubmitOptions};
use crate::core::providers::shared::{
    HttpClientBuilder, check_response, parse_json_line_stream, read_json, transport_error,
};
use crate::core::providers::unified_provider::ProviderError;

const PROVIDER: &str = super::PROVIDER_NAME;
const BATCHES_PATH: &str = "/v1/messages/batches";

/// Anthropic batch adapter
#[derive(Debug, Clone)]
pub struct AnthropicBatchAdapter {
    name: String,
    config: AnthropicConfig,
    http_client: Client,
}

impl AnthropicBatchAdapter {
    /// Create
    pub fn new(name: impl Into<String>, config: AnthropicConfig) -> Result<Self, ProviderError> {
        let mut builder = HttpClientBuilder::new(PROVIDER)
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .default_header("anthropic-version", config.api_version.clone())
            .default_headers(&config.custom_headers);
        if let Some(api_key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.default_header("x-api-key", api_key);
        }

        Ok(Self {
            name: name.into(),
            http_client: builder.build()?,
            config,
        })
    }

    /// Create from `ANTHROPIC_*` environment variables
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(PROVIDER, AnthropicConfig::from_env()?)
    }

    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    fn batch_url(&self, suffix: &str) -> String {
        self.config
            .get_api_url(&format!("{}{}", BATCHES_PATH, suffix))
    }

    fn build_create_request<'a>(
        &'a self,
        requests: &'a [BatchRequest],
        options: &'a SubmitOptions,
    ) -> CreateMessageBatchRequest<'a> {
        let fallback_model = options
            .model
            .as_deref()
            .unwrap_or(self.config.default_model.as_str());

        CreateMessageBatchRequest {
            requests: requests
                .iter()
                .map(|request| MessageBatchRequestItem {
                    custom_id: &request.correlation_id,
                    params: MessageParams {
                        model: request.model.as_deref().unwrap_or(fallback_model),
                        max_tokens: request.max_tokens.unwrap_or(self.config.default_max_tokens),
                        messages: vec![MessageParam {
                            role: "user",
                            content: &request.user_prompt,
                        }],
                        system: request.system_prompt.as_deref(),
                        temperature: request.temperature,
                    },
                })
                .collect(),
        }
    }

    async fn fetch_batch(&self, provider_job_id: &str) -> Result<MessageBatch, ProviderError> {
        let response = self
            .http_client
            .get(self.batch_url(&format!("/{}", provider_job_id)))
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        read_json(PROVIDER, check_response(PROVIDER, response).await?).await
    }
}

#[async_trait]
impl BatchProviderAdapter for AnthropicBatchAdapter {
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
        let body = self.build_create_request(requests, options);
        debug!(provider = %self.name, count = requests.len(), "Creating message batch");

        let response = self
            .http_client
            .post(self.batch_url(""))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let batch: MessageBatch = read_json(PROVIDER, check_response(PROVIDER, response).await?).await?;

        let mut job = batch.to_job(
            &BatchJob::new_local_id(),
            &self.name,
            Some(requests.len() as u32),
        );
        if let Some(serde_json::Value::Object(metadata)) = job.metadata.as_mut() {
            if let Some(agent_name) = &options.agent_name {
                metadata.insert("agent_name".to_string(), agent_name.clone().into());
            }
            if let Some(purpose) = &options.purpose {
                metadata.insert("purpose".to_string(), purpose.clone().into());
            }
        }

        info!(provider = %self.name, job_id = %job.provider_job_id, "Message batch created");
        Ok(job)
    }

    async fn get_batch_status(&self, provider_job_id: &str) -> Result<BatchJob, ProviderError> {
        let batch = self.fetch_batch(provider_job_id).await?;
        Ok(batch.to_job(provider_job_id, &self.name, None))
    }

    async fn get_batch_results(
        &self,
        provider_job_id: &str,
    ) -> Result<Vec<BatchResult>, ProviderError> {
        let response = self
            .http_client
            .get(self.batch_url(&format!("/{}/results", provider_job_id)))
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_response(PROVIDER, response).await?;

        let lines: Vec<MessageBatchResultLine> =
            parse_json_line_stream(PROVIDER, Box::pin(response.bytes_stream())).await?;
        debug!(provider = %self.name, job_id = provider_job_id, lines = lines.len(), "Parsed batch results");

        Ok(lines.into_iter().map(MessageBatchResultLine::into_result).collect())
    }

    async fn cancel_batch(&self, provider_job_id: &str) -> Result<(), ProviderError> {
        let response = self
            .http_client
            .post(self.batch_url(&format!("/{}/cancel", provider_job_id)))
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        check_response(PROVIDER, response).await?;
        info!(provider = %self.name, job_id = provider_job_id, "Message batch cancellation requested");
        Ok(())
    }
}
