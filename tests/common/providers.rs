//! Scripted batch adapter
//!
//! Every `get_batch_status` call consumes the next [`Step`]; the last step
//! repeats forever. Calls are counted and status polls are timestamped with
//! the tokio clock so paused-clock tests can check the backoff schedule.

use async_trait::async_trait;
use litellm_batch::{
    BatchJob, BatchProviderAdapter, BatchRequest, BatchResult, BatchStatus, ProviderError,
    SubmitOptions,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;

pub const PROVIDER_JOB_ID: &str = "job-1";

/// One scripted status response
#[derive(Debug, Clone)]
pub enum Step {
    Job {
        status: BatchStatus,
        completed: u32,
        failed: u32,
    },
    Fail,
}

#[derive(Debug)]
pub struct ScriptedAdapter {
    name: String,
    available: AtomicBool,
    total: AtomicU32,
    steps: Mutex<VecDeque<Step>>,
    results: Mutex<Vec<BatchResult>>,
    failing_result_fetches: AtomicU32,
    omit_status_total: AtomicBool,
    fail_cancel: AtomicBool,
    pub submit_calls: AtomicU32,
    pub status_calls: AtomicU32,
    pub results_calls: AtomicU32,
    pub cancel_calls: AtomicU32,
    poll_times: Mutex<Vec<Instant>>,
}

impl ScriptedAdapter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            available: AtomicBool::new(true),
            total: AtomicU32::new(0),
            steps: Mutex::new(VecDeque::new()),
            results: Mutex::new(Vec::new()),
            failing_result_fetches: AtomicU32::new(0),
            omit_status_total: AtomicBool::new(false),
            fail_cancel: AtomicBool::new(false),
            submit_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            results_calls: AtomicU32::new(0),
            cancel_calls: AtomicU32::new(0),
            poll_times: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable(self) -> Self {
        self.available.store(false, Ordering::SeqCst);
        self
    }

    /// Total reported by status calls when nothing was submitted through this adapter
    pub fn with_total(self, total: u32) -> Self {
        self.total.store(total, Ordering::SeqCst);
        self
    }

    pub fn then(self, status: BatchStatus, completed: u32, failed: u32) -> Self {
        self.steps.lock().push_back(Step::Job {
            status,
            completed,
            failed,
        });
        self
    }

    pub fn then_in_progress(self, completed: u32) -> Self {
        self.then(BatchStatus::InProgress, completed, 0)
    }

    pub fn then_completed(self, completed: u32) -> Self {
        self.then(BatchStatus::Completed, completed, 0)
    }

    /// `calls` failing status calls
    pub fn then_fail(self, calls: usize) -> Self {
        {
            let mut steps = self.steps.lock();
            for _ in 0..calls {
                steps.push_back(Step::Fail);
            }
        }
        self
    }

    pub fn with_results(self, results: Vec<BatchResult>) -> Self {
        *self.results.lock() = results;
        self
    }

    /// The first `calls` results fetches fail
    pub fn then_fail_results(self, calls: u32) -> Self {
        self.failing_result_fetches.store(calls, Ordering::SeqCst);
        self
    }

    /// Status snapshots report a total of zero, as a provider omitting counters would
    pub fn without_status_total(self) -> Self {
        self.omit_status_total.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_cancel(self) -> Self {
        self.fail_cancel.store(true, Ordering::SeqCst);
        self
    }

    pub fn submits(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_polls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn result_fetches(&self) -> u32 {
        self.results_calls.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> u32 {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    /// Gaps between consecutive status calls, the first measured from `origin`
    pub fn poll_gaps(&self, origin: Instant) -> Vec<Duration> {
        let times = self.poll_times.lock();
        let mut previous = origin;
        times
            .iter()
            .map(|t| {
                let gap = t.duration_since(previous);
                previous = *t;
                gap
            })
            .collect()
    }

    fn next_step(&self) -> Step {
        let mut steps = self.steps.lock();
        if steps.len() > 1 {
            steps.pop_front().unwrap_or(Step::Fail)
        } else {
            steps.front().cloned().unwrap_or(Step::Fail)
        }
    }
}

#[async_trait]
impl BatchProviderAdapter for ScriptedAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn submit_batch(
        &self,
        requests: &[BatchRequest],
        _options: &SubmitOptions,
    ) -> Result<BatchJob, ProviderError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.total.store(requests.len() as u32, Ordering::SeqCst);
        Ok(BatchJob::new(
            BatchJob::new_local_id(),
            PROVIDER_JOB_ID,
            &self.name,
            BatchStatus::Submitted,
            requests.len() as u32,
            0,
            0,
        ))
    }

    async fn get_batch_status(&self, provider_job_id: &str) -> Result<BatchJob, ProviderError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.poll_times.lock().push(Instant::now());

        match self.next_step() {
            Step::Job {
                status,
                completed,
                failed,
            } => {
                let total = if self.omit_status_total.load(Ordering::SeqCst) {
                    0
                } else {
                    self.total.load(Ordering::SeqCst)
                };
                Ok(BatchJob::new(
                    provider_job_id,
                    provider_job_id,
                    &self.name,
                    status,
                    total,
                    completed,
                    failed,
                ))
            }
            Step::Fail => Err(ProviderError::network("openai", "connection reset")),
        }
    }

    async fn get_batch_results(
        &self,
        _provider_job_id: &str,
    ) -> Result<Vec<BatchResult>, ProviderError> {
        self.results_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_result_fetches.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_result_fetches
                .store(remaining - 1, Ordering::SeqCst);
            return Err(ProviderError::provider_unavailable("openai", "results not ready"));
        }
        Ok(self.results.lock().clone())
    }

    async fn cancel_batch(&self, _provider_job_id: &str) -> Result<(), ProviderError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_cancel.load(Ordering::SeqCst) {
            return Err(ProviderError::provider_unavailable("openai", "cancel rejected"));
        }
        Ok(())
    }
}
