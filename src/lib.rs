//! # litellm-batch
//!
//! Batch job orchestration over asynchronous LLM batch APIs.
//!
//! ## Features
//!
//! - **Provider-agnostic**: one submit / poll / wait / cancel API over the
//!   Anthropic Message Batches and OpenAI Batch protocols
//! - **Adaptive polling**: exponential poll backoff with a cap, linear
//!   per-call retries, bounded tolerance for persistent failures
//! - **Deadlines**: best-effort remote cancellation when a wait times out
//! - **Recoverable**: optional job store and `resume_and_wait`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use litellm_batch::{BatchOrchestrator, BatchRequest, WaitOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = BatchOrchestrator::lazy_from_env();
//!     let requests = vec![
//!         BatchRequest::new("req-1", "Summarize the French revolution in one line."),
//!         BatchRequest::new("req-2", "Name three prime numbers.").with_max_tokens(32),
//!     ];
//!
//!     let results = orchestrator
//!         .submit_and_wait(&requests, &WaitOptions::default())
//!         .await?;
//!     for result in results {
//!         println!("{}: {:?}", result.correlation_id, result.content);
//!     }
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use config::{BatchConfig, PollingConfig, ProviderConfig, ProviderKind, Validate};
pub use core::batch::{
    BatchError, BatchJob, BatchJobStore, BatchOrchestrator, BatchProviderAdapter, BatchRequest,
    BatchResult, BatchStatus, BatchUsage, InMemoryJobStore, StoreError, SubmitOptions,
    WaitOptions,
};
pub use core::providers::{
    AnthropicBatchAdapter, OpenAIBatchAdapter, ProviderError, build_adapter,
};
pub use utils::error::{Result, RunnerError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name
pub const NAME: &str = env!("CARGO_PKG_NAME");
