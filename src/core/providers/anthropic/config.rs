//! Anthropic Message Batches configuration

use std::collections::HashMap;
use std::env;

use crate::config::Validate;
use crate::core::providers::unified_provider::ProviderError;

/// Configuration
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key
    pub api_key: Option<String>,
    /// Base URL
    pub base_url: String,
    /// `anthropic-version` header
    pub api_version: String,
    /// Request timeout (seconds)
    pub request_timeout: u64,
    /// Connection timeout (seconds)
    pub connect_timeout: u64,
    /// Model used when neither the request nor the submit options name one
    pub default_model: String,
    /// `max_tokens` used when the request does not set one
    pub default_max_tokens: u32,
    /// Extra headers sent with every call
    pub custom_headers: HashMap<String, String>,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: super::DEFAULT_BASE_URL.to_string(),
            api_version: super::DEFAULT_API_VERSION.to_string(),
            request_timeout: 120,
            connect_timeout: 10,
            default_model: "claude-3-5-haiku-20241022".to_string(),
            default_max_tokens: 4096,
            custom_headers: HashMap::new(),
        }
    }
}

impl AnthropicConfig {
    /// Create
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Configuration from `ANTHROPIC_*` environment variables
    pub fn from_env() -> Result<Self, ProviderError> {
        let mut config = Self {
            api_key: Some(env::var("ANTHROPIC_API_KEY").map_err(|_| {
                ProviderError::configuration(
                    super::PROVIDER_NAME,
                    "ANTHROPIC_API_KEY environment variable is required",
                )
            })?),
            ..Default::default()
        };

        if let Ok(base_url) = env::var("ANTHROPIC_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(api_version) = env::var("ANTHROPIC_API_VERSION") {
            config.api_version = api_version;
        }
        if let Ok(timeout) = env::var("ANTHROPIC_TIMEOUT") {
            config.request_timeout = timeout.parse().unwrap_or(config.request_timeout);
        }
        if let Ok(model) = env::var("ANTHROPIC_BATCH_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_default_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(key.into(), value.into());
        self
    }

    /// Full URL for an API path
    pub fn get_api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

impl Validate for AnthropicConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.has_api_key() {
            return Err("API key is required".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("Base URL must start with http:// or https://".to_string());
        }
        if self.request_timeout == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }
        if self.connect_timeout > self.request_timeout {
            return Err("Connect timeout cannot be greater than request timeout".to_string());
        }
        if self.default_max_tokens == 0 {
            return Err("Default max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }
}
