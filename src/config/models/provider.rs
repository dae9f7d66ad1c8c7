//! Provider configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Batch protocol family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Inline submission (message batches)
    Anthropic,
    /// File upload then batch reference
    #[serde(alias = "open_ai")]
    OpenAI,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Registry name
    pub name: String,
    /// Protocol family
    pub kind: ProviderKind,
    /// API key; `${VAR}` is read from the environment
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// API version header (anthropic)
    #[serde(default)]
    pub api_version: Option<String>,
    /// Organization ID (openai)
    #[serde(default)]
    pub organization: Option<String>,
    /// Model for requests that do not name one
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub default_max_tokens: Option<u32>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Extra headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Whether provider is registered
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            kind,
            api_key: None,
            base_url: None,
            api_version: None,
            organization: None,
            default_model: None,
            default_max_tokens: None,
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            headers: HashMap::new(),
            enabled: true,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// API key with `${VAR}` references expanded.
    ///
    /// An unset variable yields `None` so the adapter reports itself unavailable.
    pub fn resolved_api_key(&self) -> Option<String> {
        let raw = self.api_key.as_deref()?.trim();
        match raw.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
            Some(var) => std::env::var(var).ok().filter(|v| !v.is_empty()),
            None if raw.is_empty() => None,
            None => Some(raw.to_string()),
        }
    }
}
