//! OpenAI Batch API
//!
//! Upload-then-reference batch protocol: JSONL input file, batch object,
//! output and error files.

pub mod batch;
pub mod config;
pub mod models;

pub use batch::OpenAIBatchAdapter;
pub use config::OpenAIConfig;

pub const PROVIDER_NAME: &str = "openai";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
