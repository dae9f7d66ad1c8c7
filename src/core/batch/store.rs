//! Job metadata persistence used to resume polling after a restart

use super::types::BatchJob;
use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

/// Job store failures. The orchestrator logs them and keeps polling.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Job store backend error: {0}")]
    Backend(String),

    #[error("Job record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable record of submitted jobs.
///
/// Only `provider_job_id` and `provider_name` are needed to resume polling;
/// the rest is kept for reporting.
#[async_trait]
pub trait BatchJobStore: Send + Sync + std::fmt::Debug {
    /// Insert or replace the record for `job.id`
    async fn record(&self, job: &BatchJob) -> Result<(), StoreError>;

    /// Look up by local id
    async fn get(&self, id: &str) -> Result<Option<BatchJob>, StoreError>;

    /// Look up by provider identity
    async fn find_by_provider_job(
        &self,
        provider_name: &str,
        provider_job_id: &str,
    ) -> Result<Option<BatchJob>, StoreError>;

    /// Jobs whose last recorded status is not terminal
    async fn list_active(&self) -> Result<Vec<BatchJob>, StoreError>;

    async fn remove(&self, id: &str) -> Result<Option<BatchJob>, StoreError>;
}

/// In-memory job store
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<String, BatchJob>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[async_trait]
impl BatchJobStore for InMemoryJobStore {
    async fn record(&self, job: &BatchJob) -> Result<(), StoreError> {
        self.jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<BatchJob>, StoreError> {
        Ok(self.jobs.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_by_provider_job(
        &self,
        provider_name: &str,
        provider_job_id: &str,
    ) -> Result<Option<BatchJob>, StoreError> {
        Ok(self
            .jobs
            .iter()
            .find(|entry| {
                entry.provider_name == provider_name && entry.provider_job_id == provider_job_id
            })
            .map(|entry| entry.value().clone()))
    }

    async fn list_active(&self) -> Result<Vec<BatchJob>, StoreError> {
        let mut active: Vec<BatchJob> = self
            .jobs
            .iter()
            .filter(|entry| !entry.status.is_terminal())
            .map(|entry| entry.value().clone())
            .collect();
        active.sort_by_key(|job| job.submitted_at);
        Ok(active)
    }

    async fn remove(&self, id: &str) -> Result<Option<BatchJob>, StoreError> {
        Ok(self.jobs.remove(id).map(|(_, job)| job))
    }
}
