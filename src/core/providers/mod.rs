//! Batch provider implementations
//!
//! One adapter per remote batch protocol family, selected by
//! [`ProviderKind`] and built from a [`ProviderConfig`].

pub mod anthropic;
pub mod openai;

// Shared utilities
pub mod shared;

pub mod unified_provider;

pub use anthropic::AnthropicBatchAdapter;
pub use openai::OpenAIBatchAdapter;
pub use unified_provider::ProviderError;

use crate::config::{ProviderConfig, ProviderKind};
use crate::core::batch::BatchProviderAdapter;
use std::sync::Arc;
use tracing::debug;

/// Build the adapter for one configured provider
pub fn build_adapter(
    config: &ProviderConfig,
) -> Result<Arc<dyn BatchProviderAdapter>, ProviderError> {
    debug!(provider = %config.name, kind = %config.kind, "Building batch adapter");

    let adapter: Arc<dyn BatchProviderAdapter> = match config.kind {
        ProviderKind::Anthropic => {
            let mut settings = anthropic::AnthropicConfig {
                api_key: config.resolved_api_key(),
                request_timeout: config.timeout,
                connect_timeout: config.connect_timeout,
                custom_headers: config.headers.clone(),
                ..Default::default()
            };
            if let Some(base_url) = &config.base_url {
                settings.base_url = base_url.clone();
            }
            if let Some(api_version) = &config.api_version {
                settings.api_version = api_version.clone();
            }
            if let Some(model) = &config.default_model {
                settings.default_model = model.clone();
            }
            if let Some(max_tokens) = config.default_max_tokens {
                settings.default_max_tokens = max_tokens;
            }
            Arc::new(AnthropicBatchAdapter::new(config.name.clone(), settings)?)
        }
        ProviderKind::OpenAI => {
            let mut settings = openai::OpenAIConfig {
                api_key: config.resolved_api_key(),
                organization: config.organization.clone(),
                timeout: config.timeout,
                connect_timeout: config.connect_timeout,
                headers: config.headers.clone(),
                ..Default::default()
            };
            if let Some(base_url) = &config.base_url {
                settings.api_base = base_url.clone();
            }
            if let Some(model) = &config.default_model {
                settings.default_model = model.clone();
            }
            if let Some(max_tokens) = config.default_max_tokens {
                settings.default_max_tokens = max_tokens;
            }
            Arc::new(OpenAIBatchAdapter::new(config.name.clone(), settings)?)
        }
    };

    Ok(adapter)
}
