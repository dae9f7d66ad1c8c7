//! Configuration management for the batch runner
//!
//! Providers and poll tuning, loaded from YAML or from the environment.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::core::batch::{SubmitOptions, WaitOptions};
use crate::utils::error::{Result, RunnerError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Providers in fallback order
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub polling: PollingConfig,
    /// Provider tried first when a call names none
    #[serde(default)]
    pub default_provider: Option<String>,
}

impl BatchConfig {
    /// Load configuration from a YAML file; `BATCH_*` overrides still apply
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading batch configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RunnerError::config(format!("Failed to read config file: {}", e)))?;

        let mut config: Self = serde_yaml::from_str(&content)
            .map_err(|e| RunnerError::config(format!("Failed to parse config: {}", e)))?;
        config.apply_env_overrides();

        config.validate_all()?;
        debug!(providers = config.providers.len(), "Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// `anthropic` and `openai` providers are configured when their API keys
    /// are present.
    pub fn from_env() -> Result<Self> {
        info!("Loading batch configuration from environment variables");

        let mut config = Self::default();

        if std::env::var("ANTHROPIC_API_KEY").is_ok_and(|k| !k.is_empty()) {
            let mut provider = ProviderConfig::new("anthropic", ProviderKind::Anthropic)
                .with_api_key("${ANTHROPIC_API_KEY}");
            provider.base_url = std::env::var("ANTHROPIC_BASE_URL").ok();
            provider.api_version = std::env::var("ANTHROPIC_API_VERSION").ok();
            provider.default_model = std::env::var("ANTHROPIC_BATCH_MODEL").ok();
            config.providers.push(provider);
        }

        if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
            let mut provider =
                ProviderConfig::new("openai", ProviderKind::OpenAI).with_api_key("${OPENAI_API_KEY}");
            provider.base_url = std::env::var("OPENAI_API_BASE").ok();
            provider.organization = std::env::var("OPENAI_ORG_ID").ok();
            provider.default_model = std::env::var("OPENAI_BATCH_MODEL").ok();
            config.providers.push(provider);
        }

        config.apply_env_overrides();
        config.validate_all()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.polling.apply_env_overrides();
        if let Ok(default) = std::env::var("BATCH_DEFAULT_PROVIDER") {
            if !default.trim().is_empty() {
                self.default_provider = Some(default.trim().to_string());
            }
        }
    }

    /// Validate the entire configuration
    pub fn validate_all(&self) -> Result<()> {
        self.validate()
            .map_err(|e| RunnerError::config(format!("Batch config error: {}", e)))
    }

    /// Enabled providers, the default provider first
    pub fn enabled_providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        let default = self.default_provider.as_deref();
        let preferred = self
            .providers
            .iter()
            .filter(move |p| p.enabled && Some(p.name.as_str()) == default);
        let rest = self
            .providers
            .iter()
            .filter(move |p| p.enabled && Some(p.name.as_str()) != default);
        preferred.chain(rest)
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    pub fn submit_options(&self) -> SubmitOptions {
        self.polling.submit_options()
    }

    pub fn wait_options(&self) -> WaitOptions {
        self.polling.wait_options()
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
