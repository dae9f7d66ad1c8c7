//! Batch job orchestration
//!
//! Submits sets of independent requests to asynchronous batch providers,
//! polls them with adaptive backoff and collects per-item results.

pub mod adapter;
pub mod backoff;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod store;
pub mod types;

// Re-export all public types
pub use adapter::BatchProviderAdapter;
pub use backoff::{
    LinearRetry, MAX_CONSECUTIVE_POLL_FAILURES, POLL_RETRY_ATTEMPTS, POLL_RETRY_BASE_DELAY,
    poll_interval,
};
pub use error::{BatchError, BatchResultOf};
pub use orchestrator::{BatchOrchestrator, validate_requests};
pub use registry::{BatchProviderRegistry, ProviderInitGate};
pub use store::{BatchJobStore, InMemoryJobStore, StoreError};
pub use types::{
    BatchJob, BatchRequest, BatchResult, BatchStatus, BatchUsage, ProgressCallback,
    SubmitOptions, WaitOptions,
};
