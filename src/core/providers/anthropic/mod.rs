//! Anthropic Message Batches
//!
//! Inline batch protocol: requests embedded in the create call, JSONL
//! results streamed from a per-batch endpoint.

pub mod batch;
pub mod config;
pub mod models;

pub use batch::AnthropicBatchAdapter;
pub use config::AnthropicConfig;

pub const PROVIDER_NAME: &str = "anthropic";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
