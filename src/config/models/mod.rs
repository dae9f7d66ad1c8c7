//! Configuration data models

#![allow(missing_docs)]

pub mod polling;
pub mod provider;

pub use polling::*;
pub use provider::*;

use crate::core::batch::types::{
    DEFAULT_MAX_POLL_INTERVAL, DEFAULT_MAX_REQUESTS_PER_BATCH, DEFAULT_POLL_INTERVAL,
    DEFAULT_TIMEOUT,
};

/// Default request timeout in seconds
pub fn default_timeout() -> u64 {
    120
}

/// Default connect timeout in seconds
pub fn default_connect_timeout() -> u64 {
    10
}

pub fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

pub fn default_max_poll_interval_ms() -> u64 {
    DEFAULT_MAX_POLL_INTERVAL.as_millis() as u64
}

pub fn default_batch_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

pub fn default_max_requests_per_batch() -> usize {
    DEFAULT_MAX_REQUESTS_PER_BATCH
}

/// Default true value
pub fn default_true() -> bool {
    true
}
