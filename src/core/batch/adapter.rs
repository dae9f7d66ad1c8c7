//! Provider adapter capability trait

use super::types::{BatchJob, BatchRequest, BatchResult, SubmitOptions};
use crate::core::providers::unified_provider::ProviderError;
use async_trait::async_trait;

/// One implementation per remote batch protocol family.
///
/// Adapters translate provider-native status vocabularies and counters into
/// [`BatchJob`], and per-item outcomes into [`BatchResult`]. A malformed result
/// line or a single failed item never fails the whole call.
#[async_trait]
pub trait BatchProviderAdapter: Send + Sync + std::fmt::Debug {
    /// Registry key
    fn name(&self) -> &str;

    /// Whether the adapter is configured well enough to accept work
    async fn is_available(&self) -> bool;

    /// Create a remote batch job; `total_requests` equals `requests.len()`
    async fn submit_batch(
        &self,
        requests: &[BatchRequest],
        options: &SubmitOptions,
    ) -> Result<BatchJob, ProviderError>;

    /// Fetch the current job snapshot
    async fn get_batch_status(&self, provider_job_id: &str) -> Result<BatchJob, ProviderError>;

    /// Download and parse per-item results of a completed job
    async fn get_batch_results(
        &self,
        provider_job_id: &str,
    ) -> Result<Vec<BatchResult>, ProviderError>;

    /// Ask the provider to stop the job
    async fn cancel_batch(&self, provider_job_id: &str) -> Result<(), ProviderError>;
}
