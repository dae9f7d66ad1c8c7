//! Batch orchestrator
//!
//! Provider-agnostic submit / poll / wait / cancel over the registered
//! adapters. Each `submit_and_wait` call is an independent sequential task;
//! the only state shared between calls is the read-mostly registry.

use super::adapter::BatchProviderAdapter;
use super::backoff::{LinearRetry, MAX_CONSECUTIVE_POLL_FAILURES, poll_interval};
use super::error::{BatchError, BatchResultOf};
use super::registry::{BatchProviderRegistry, ProviderInitGate, ProviderInitializer};
use super::store::BatchJobStore;
use super::types::{
    BatchJob, BatchRequest, BatchResult, BatchStatus, MAX_CORRELATION_ID_LEN, SubmitOptions,
    WaitOptions,
};
use crate::config::BatchConfig;
use crate::core::providers::{build_adapter, unified_provider::ProviderError};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Batch job orchestrator
pub struct BatchOrchestrator {
    registry: RwLock<BatchProviderRegistry>,
    init_gate: ProviderInitGate,
    job_store: Option<Arc<dyn BatchJobStore>>,
    retry: LinearRetry,
    max_consecutive_poll_failures: u32,
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchOrchestrator {
    /// Orchestrator with an empty registry
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(BatchProviderRegistry::new()),
            init_gate: ProviderInitGate::ready(),
            job_store: None,
            retry: LinearRetry::default(),
            max_consecutive_poll_failures: MAX_CONSECUTIVE_POLL_FAILURES,
        }
    }

    /// Orchestrator whose providers are registered on first use
    pub fn lazy<F>(initializer: F) -> Self
    where
        F: FnOnce() -> Vec<Arc<dyn BatchProviderAdapter>> + Send + 'static,
    {
        let initializer: ProviderInitializer = Box::new(initializer);
        Self {
            init_gate: ProviderInitGate::deferred(initializer),
            ..Self::new()
        }
    }

    /// Orchestrator with every enabled provider of `config` registered eagerly
    pub fn from_config(config: &BatchConfig) -> Result<Self, ProviderError> {
        let orchestrator = Self::new();
        for provider in config.enabled_providers() {
            orchestrator.register_provider(build_adapter(provider)?);
        }
        Ok(orchestrator)
    }

    /// Orchestrator that reads provider configuration from the environment on
    /// first use. Providers that fail to build are logged and skipped.
    pub fn lazy_from_env() -> Self {
        Self::lazy(|| match BatchConfig::from_env() {
            Ok(config) => config
                .enabled_providers()
                .filter_map(|provider| match build_adapter(provider) {
                    Ok(adapter) => Some(adapter),
                    Err(e) => {
                        warn!(provider = %provider.name, error = %e, "Skipping batch provider");
                        None
                    }
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "Batch provider configuration unavailable");
                Vec::new()
            }
        })
    }

    /// Record jobs after submission and on every observed change
    pub fn with_job_store(mut self, store: Arc<dyn BatchJobStore>) -> Self {
        self.job_store = Some(store);
        self
    }

    /// Override the per-call retry policy
    pub fn with_retry(mut self, retry: LinearRetry) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_consecutive_poll_failures(mut self, max: u32) -> Self {
        self.max_consecutive_poll_failures = max.max(1);
        self
    }

    pub fn job_store(&self) -> Option<&Arc<dyn BatchJobStore>> {
        self.job_store.as_ref()
    }

    /// Register an adapter; an existing adapter with the same name is replaced.
    ///
    /// A pending deferred initializer runs first, so it never overrides an
    /// explicit registration.
    pub fn register_provider(&self, adapter: Arc<dyn BatchProviderAdapter>) {
        self.ensure_initialized();
        self.registry.write().register(adapter);
    }

    /// Registered provider names in registration order
    pub fn providers(&self) -> Vec<String> {
        self.ensure_initialized();
        self.registry.read().list()
    }

    /// Availability of the named provider, or of any provider when `None`.
    /// Unknown names report `false`.
    pub async fn is_available(&self, provider_name: Option<&str>) -> bool {
        self.ensure_initialized();
        match provider_name {
            Some(name) => match self.adapter(name) {
                Some(adapter) => adapter.is_available().await,
                None => false,
            },
            None => {
                for adapter in self.adapters() {
                    if adapter.is_available().await {
                        return true;
                    }
                }
                false
            }
        }
    }

    /// Validate and submit a batch without waiting for it
    pub async fn submit_batch(
        &self,
        requests: &[BatchRequest],
        options: &SubmitOptions,
    ) -> BatchResultOf<BatchJob> {
        let (_, job) = self.submit_with_adapter(requests, options).await?;
        Ok(job)
    }

    pub async fn get_batch_status(
        &self,
        provider_job_id: &str,
        provider_name: Option<&str>,
    ) -> BatchResultOf<BatchJob> {
        let adapter = self.resolve_provider(provider_name).await?;
        Ok(adapter.get_batch_status(provider_job_id).await?)
    }

    pub async fn get_batch_results(
        &self,
        provider_job_id: &str,
        provider_name: Option<&str>,
    ) -> BatchResultOf<Vec<BatchResult>> {
        let adapter = self.resolve_provider(provider_name).await?;
        Ok(adapter.get_batch_results(provider_job_id).await?)
    }

    pub async fn cancel_batch(
        &self,
        provider_job_id: &str,
        provider_name: Option<&str>,
    ) -> BatchResultOf<()> {
        let adapter = self.resolve_provider(provider_name).await?;
        info!(provider = adapter.name(), job_id = provider_job_id, "Cancelling batch job");
        Ok(adapter.cancel_batch(provider_job_id).await?)
    }

    /// Submit a batch and poll it until it reaches a terminal state.
    ///
    /// Returns the per-item results of a completed job; every other outcome is
    /// an error. Results are not ordered like `requests`.
    pub async fn submit_and_wait(
        &self,
        requests: &[BatchRequest],
        options: &WaitOptions,
    ) -> BatchResultOf<Vec<BatchResult>> {
        let (adapter, job) = self.submit_with_adapter(requests, &options.submit).await?;
        self.wait_for_completion(adapter.as_ref(), job, options)
            .await
    }

    /// Re-enter the poll loop for a job submitted earlier, for example by a
    /// previous process. The deadline is measured from the resume.
    pub async fn resume_and_wait(
        &self,
        provider_job_id: &str,
        provider_name: &str,
        options: &WaitOptions,
    ) -> BatchResultOf<Vec<BatchResult>> {
        self.ensure_initialized();
        let adapter = self.adapter(provider_name).ok_or_else(|| {
            BatchError::validation(format!(
                "batch provider '{}' is not registered",
                provider_name
            ))
        })?;

        let recorded = match &self.job_store {
            Some(store) => store
                .find_by_provider_job(provider_name, provider_job_id)
                .await
                .unwrap_or_else(|e| {
                    warn!(provider = provider_name, job_id = provider_job_id, error = %e, "Job store lookup failed");
                    None
                }),
            None => None,
        };

        let baseline = match recorded {
            Some(job) => job,
            None => {
                let adapter_ref = adapter.as_ref();
                let mut job = self
                    .retry
                    .call("get_batch_status", move || {
                        adapter_ref.get_batch_status(provider_job_id)
                    })
                    .await?;
                job.id = BatchJob::new_local_id();
                job.provider_name = provider_name.to_string();
                job
            }
        };

        info!(
            provider = provider_name,
            job_id = provider_job_id,
            status = %baseline.status,
            "Resuming batch job"
        );
        self.wait_for_completion(adapter.as_ref(), baseline, options)
            .await
    }

    async fn submit_with_adapter(
        &self,
        requests: &[BatchRequest],
        options: &SubmitOptions,
    ) -> BatchResultOf<(Arc<dyn BatchProviderAdapter>, BatchJob)> {
        validate_requests(requests, options.max_requests_per_batch)?;
        let adapter = self.resolve_provider(options.provider.as_deref()).await?;

        let job = adapter.submit_batch(requests, options).await.map_err(|e| {
            error!(provider = adapter.name(), error = %e, "Batch submission failed");
            BatchError::from(e)
        })?;

        info!(
            provider = adapter.name(),
            job_id = %job.provider_job_id,
            total = job.total_requests,
            "Batch submitted"
        );
        self.record_job(&job).await;
        Ok((adapter, job))
    }

    async fn wait_for_completion(
        &self,
        adapter: &dyn BatchProviderAdapter,
        submitted: BatchJob,
        options: &WaitOptions,
    ) -> BatchResultOf<Vec<BatchResult>> {
        let started = Instant::now();
        let provider = submitted.provider_name.clone();
        let job_id = submitted.provider_job_id.clone();
        let job_id_ref: &str = &job_id;
        let mut latest = submitted.clone();
        let mut poll_count: u32 = 0;
        let mut consecutive_failures: u32 = 0;

        loop {
            let elapsed = started.elapsed();
            if elapsed > options.timeout {
                warn!(
                    provider = %provider,
                    job_id = %job_id,
                    ?elapsed,
                    completed = latest.completed_requests,
                    total = latest.total_requests,
                    "Batch job timed out, requesting cancellation"
                );
                if let Err(e) = adapter.cancel_batch(&job_id).await {
                    warn!(provider = %provider, job_id = %job_id, error = %e, "Cancellation after timeout failed");
                }
                return Err(BatchError::TimeoutExceeded {
                    provider,
                    job_id: job_id.clone(),
                    completed: latest.completed_requests,
                    total: latest.total_requests,
                    elapsed,
                });
            }

            let interval = poll_interval(options.poll_interval, options.max_poll_interval, poll_count);
            tokio::time::sleep(interval).await;

            let polled = self
                .retry
                .call("get_batch_status", move || adapter.get_batch_status(job_id_ref))
                .await;

            let job = match polled {
                Ok(job) => job.with_submission_identity(&submitted),
                Err(last_error) => {
                    consecutive_failures += 1;
                    if consecutive_failures >= self.max_consecutive_poll_failures {
                        error!(
                            provider = %provider,
                            job_id = %job_id,
                            consecutive_failures,
                            retryable = last_error.is_retryable(),
                            error = %last_error,
                            "Abandoning batch job polling; remote job left running"
                        );
                        return Err(BatchError::PersistentPollFailure {
                            provider,
                            job_id: job_id.clone(),
                            consecutive_failures,
                            last_error,
                        });
                    }
                    warn!(
                        provider = %provider,
                        job_id = %job_id,
                        consecutive_failures,
                        poll_count,
                        retryable = last_error.is_retryable(),
                        retry_after_secs = ?last_error.retry_delay(),
                        error = %last_error,
                        "Batch status poll failed"
                    );
                    poll_count += 1;
                    continue;
                }
            };
            consecutive_failures = 0;

            if job.status != latest.status
                || job.completed_requests != latest.completed_requests
                || job.failed_requests != latest.failed_requests
            {
                self.record_job(&job).await;
            }
            if let Some(on_progress) = &options.on_progress {
                on_progress(&job);
            }
            info!(
                provider = %provider,
                job_id = %job_id,
                status = %job.status,
                completed = job.completed_requests,
                total = job.total_requests,
                poll_count,
                interval_ms = interval.as_millis() as u64,
                "Batch job polled"
            );
            latest = job;

            match latest.status {
                BatchStatus::Completed => {
                    let results = self
                        .retry
                        .call("get_batch_results", move || {
                            adapter.get_batch_results(job_id_ref)
                        })
                        .await?;
                    if results.len() != latest.total_requests as usize {
                        warn!(
                            provider = %provider,
                            job_id = %job_id,
                            results = results.len(),
                            total = latest.total_requests,
                            "Result count differs from submitted request count"
                        );
                    }
                    info!(provider = %provider, job_id = %job_id, results = results.len(), "Batch job completed");
                    return Ok(results);
                }
                BatchStatus::Failed => {
                    return Err(BatchError::JobFailed {
                        provider,
                        job_id: job_id.clone(),
                        failed: latest.failed_requests,
                        total: latest.total_requests,
                    });
                }
                BatchStatus::Expired => {
                    return Err(BatchError::JobExpired {
                        provider,
                        job_id: job_id.clone(),
                        completed: latest.completed_requests,
                        total: latest.total_requests,
                    });
                }
                BatchStatus::Cancelled | BatchStatus::Cancelling => {
                    return Err(BatchError::JobCancelled {
                        provider,
                        job_id: job_id.clone(),
                        completed: latest.completed_requests,
                        total: latest.total_requests,
                    });
                }
                BatchStatus::Submitted | BatchStatus::InProgress => {
                    poll_count += 1;
                }
            }
        }
    }

    /// Explicit name: must be registered and available. No name: first
    /// available adapter in registration order.
    async fn resolve_provider(
        &self,
        provider_name: Option<&str>,
    ) -> BatchResultOf<Arc<dyn BatchProviderAdapter>> {
        self.ensure_initialized();

        if let Some(name) = provider_name {
            let adapter = self.adapter(name).ok_or_else(|| {
                BatchError::validation(format!("batch provider '{}' is not registered", name))
            })?;
            if !adapter.is_available().await {
                return Err(BatchError::validation(format!(
                    "batch provider '{}' is not available",
                    name
                )));
            }
            return Ok(adapter);
        }

        for adapter in self.adapters() {
            if adapter.is_available().await {
                debug!(provider = adapter.name(), "Resolved batch provider");
                return Ok(adapter);
            }
        }
        Err(BatchError::validation("no batch provider available"))
    }

    fn ensure_initialized(&self) {
        self.init_gate.ensure_initialized(|adapters| {
            let mut registry = self.registry.write();
            for adapter in adapters {
                registry.register(adapter);
            }
        });
    }

    fn adapter(&self, name: &str) -> Option<Arc<dyn BatchProviderAdapter>> {
        self.registry.read().get(name)
    }

    // Snapshot so no lock is held across an await
    fn adapters(&self) -> Vec<Arc<dyn BatchProviderAdapter>> {
        self.registry.read().all()
    }

    async fn record_job(&self, job: &BatchJob) {
        if let Some(store) = &self.job_store {
            if let Err(e) = store.record(job).await {
                warn!(job_id = %job.provider_job_id, error = %e, "Failed to record batch job");
            }
        }
    }
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("registry", &*self.registry.read())
            .field("init_gate", &self.init_gate)
            .field("job_store", &self.job_store.is_some())
            .field("retry", &self.retry)
            .field("max_consecutive_poll_failures", &self.max_consecutive_poll_failures)
            .finish()
    }
}

/// Local checks run before any provider is contacted
pub fn validate_requests(requests: &[BatchRequest], max_requests: usize) -> BatchResultOf<()> {
    if requests.is_empty() {
        return Err(BatchError::validation(
            "batch must contain at least one request",
        ));
    }
    if requests.len() > max_requests {
        return Err(BatchError::validation(format!(
            "batch contains {} requests, exceeding the maximum of {}",
            requests.len(),
            max_requests
        )));
    }

    let mut seen = HashSet::with_capacity(requests.len());
    for request in requests {
        let id = request.correlation_id.as_str();
        if id.is_empty() || id.chars().count() > MAX_CORRELATION_ID_LEN {
            return Err(BatchError::validation(format!(
                "correlation id '{}' must be 1 to {} characters",
                id, MAX_CORRELATION_ID_LEN
            )));
        }
        if !seen.insert(id) {
            return Err(BatchError::validation(format!(
                "duplicate correlation id '{}'",
                id
            )));
        }
    }
    Ok(())
}
