//! OpenAI Batch API configuration

use std::collections::HashMap;

use crate::config::Validate;
use crate::core::providers::unified_provider::ProviderError;

/// OpenAI batch adapter configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key
    pub api_key: Option<String>,
    /// Base URL, including the `/v1` prefix
    pub api_base: String,
    /// Organization ID (optional)
    pub organization: Option<String>,
    /// Project ID (optional)
    pub project: Option<String>,
    /// Request timeout (seconds); uploads use the same budget
    pub timeout: u64,
    /// Connection timeout (seconds)
    pub connect_timeout: u64,
    /// Model used when neither the request nor the submit options name one
    pub default_model: String,
    /// `max_tokens` used when the request does not set one
    pub default_max_tokens: u32,
    /// Processing window requested from the provider
    pub completion_window: String,
    /// Endpoint each input line targets
    pub endpoint: String,
    /// Extra headers sent with every call
    pub headers: HashMap<String, String>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: super::DEFAULT_BASE_URL.to_string(),
            organization: None,
            project: None,
            timeout: 300,
            connect_timeout: 10,
            default_model: "gpt-4o-mini".to_string(),
            default_max_tokens: 4096,
            completion_window: "24h".to_string(),
            endpoint: "/v1/chat/completions".to_string(),
            headers: HashMap::new(),
        }
    }
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ProviderError::configuration(super::PROVIDER_NAME, "OPENAI_API_KEY environment variable is required")
        })?;
        let mut config = Self::new(api_key);

        if let Ok(org) = std::env::var("OPENAI_ORG_ID") {
            config.organization = Some(org);
        }
        if let Ok(project) = std::env::var("OPENAI_PROJECT_ID") {
            config.project = Some(project);
        }
        if let Ok(base_url) = std::env::var("OPENAI_API_BASE") {
            config.api_base = base_url;
        }
        if let Ok(timeout_str) = std::env::var("OPENAI_TIMEOUT") {
            if let Ok(timeout) = timeout_str.parse::<u64>() {
                config.timeout = timeout;
            }
        }
        if let Ok(model) = std::env::var("OPENAI_BATCH_MODEL") {
            config.default_model = model;
        }

        Ok(config)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
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

    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Full URL for a path below the API base
    pub fn get_api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

impl Validate for OpenAIConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.has_api_key() {
            return Err("API key is required".to_string());
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err("API base must start with http:// or https://".to_string());
        }
        if self.timeout == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }
        if let Some(ref org) = self.organization {
            if org.is_empty() {
                return Err("Organization ID cannot be empty".to_string());
            }
        }
        if let Some(ref project) = self.project {
            if project.is_empty() {
                return Err("Project ID cannot be empty".to_string());
            }
        }
        if !self.endpoint.starts_with('/') {
            return Err("Batch endpoint must be an absolute path".to_string());
        }
        Ok(())
    }
}
