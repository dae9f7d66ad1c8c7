//! Polling configuration

use super::*;
use crate::core::batch::{SubmitOptions, WaitOptions};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Poll loop tuning, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// First sleep before polling
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Cap on the doubled interval
    #[serde(default = "default_max_poll_interval_ms")]
    pub max_poll_interval_ms: u64,
    /// Deadline for a whole wait
    #[serde(default = "default_batch_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_requests_per_batch")]
    pub max_requests_per_batch: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_interval_ms: default_max_poll_interval_ms(),
            timeout_ms: default_batch_timeout_ms(),
            max_requests_per_batch: default_max_requests_per_batch(),
        }
    }
}

impl PollingConfig {
    /// Submit options carrying the batch size limit
    pub fn submit_options(&self) -> SubmitOptions {
        SubmitOptions::default().with_max_requests_per_batch(self.max_requests_per_batch)
    }

    /// Wait options with these intervals and limits
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::default()
            .with_submit_options(self.submit_options())
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_max_poll_interval(Duration::from_millis(self.max_poll_interval_ms))
            .with_timeout(Duration::from_millis(self.timeout_ms))
    }

    /// Apply `BATCH_*` environment overrides; unparsable values are ignored
    pub fn apply_env_overrides(&mut self) {
        fn read<T: std::str::FromStr>(name: &str) -> Option<T> {
            std::env::var(name).ok()?.trim().parse().ok()
        }

        if let Some(value) = read("BATCH_POLL_INTERVAL_MS") {
            self.poll_interval_ms = value;
        }
        if let Some(value) = read("BATCH_MAX_POLL_INTERVAL_MS") {
            self.max_poll_interval_ms = value;
        }
        if let Some(value) = read("BATCH_TIMEOUT_MS") {
            self.timeout_ms = value;
        }
        if let Some(value) = read("BATCH_MAX_REQUESTS") {
            self.max_requests_per_batch = value;
        }
    }
}

impl From<&PollingConfig> for WaitOptions {
    fn from(config: &PollingConfig) -> Self {
        config.wait_options()
    }
}
