//! Batch, provider and polling validators

use super::Validate;
use crate::config::BatchConfig;
use crate::config::models::{PollingConfig, ProviderConfig};
use std::collections::HashSet;
use tracing::debug;

impl Validate for BatchConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating batch configuration");

        let mut names = HashSet::new();
        for provider in &self.providers {
            provider
                .validate()
                .map_err(|e| format!("Provider '{}': {}", provider.name, e))?;
            if !names.insert(provider.name.as_str()) {
                return Err(format!("Duplicate provider name: {}", provider.name));
            }
        }

        if let Some(default) = &self.default_provider {
            if !names.contains(default.as_str()) {
                return Err(format!(
                    "Default provider '{}' is not configured",
                    default
                ));
            }
        }

        self.polling
            .validate()
            .map_err(|e| format!("Polling: {}", e))
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Provider name cannot be empty".to_string());
        }
        if let Some(base_url) = &self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with http:// or https://".to_string());
            }
        }
        if self.timeout == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }
        if self.connect_timeout > self.timeout {
            return Err("Connect timeout cannot be greater than timeout".to_string());
        }
        if self.default_max_tokens == Some(0) {
            return Err("Default max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for PollingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms == 0 {
            return Err("Poll interval must be greater than 0".to_string());
        }
        if self.max_poll_interval_ms < self.poll_interval_ms {
            return Err("Max poll interval cannot be less than poll interval".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }
        if self.max_requests_per_batch == 0 {
            return Err("Max requests per batch must be greater than 0".to_string());
        }
        Ok(())
    }
}
