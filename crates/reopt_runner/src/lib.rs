//! # REopt Runner
//! [![Crates.io](https://img.shields.io/crates/v/reopt_runner.svg)](https://crates.io/crates/reopt_runner)
//! [![Docs](https://docs.rs/reopt_runner/badge.svg)](https://docs.rs/reopt_runner/)
//!
//! Drives a job through `submit -> poll -> terminal` on top of any [`JobService`].
//!
//! Polling is a fixed-interval loop with a bounded number of status fetches. When the bound is
//! hit, [`JobError::PollingTimeout`] hands back the [`JobHandle`] so the job can be picked up
//! again later with [`RunOptions::resume_from`] or [`JobRunner::resume`], which never submit.
//!
//! A [`JobRunner`] holds no per-job state, so one runner can serve many sequential runs.
//! Running two polls against the *same* handle at once is not supported; callers must avoid it.
//!
//! ## Example
//!
//! ```no_run
//! use reopt_core::prelude::*;
//! use reopt_runner::{JobRunner, RunOptions, StoreHook};
//! # async fn run<S: JobService, A: ArtifactStore>(service: S, store: A) -> Result<(), JobError> {
//! let runner = JobRunner::new(service).with_hook(StoreHook::new(store));
//!
//! let request = JobRequest::new(serde_json::json!({
//!     "Site": { "latitude": 34.58, "longitude": -118.12 }
//! }));
//! match runner.run(&request, &RunOptions::default()).await {
//!     Ok(result) => println!("{}", summarize(&result)),
//!     Err(JobError::PollingTimeout { handle, .. }) => {
//!         println!("still running, resume with {handle}")
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

mod hook;

pub use hook::StoreHook;

use reopt_core::prelude::*;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How a single [`JobRunner::run`] behaves.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Pause between two status fetches.
    pub poll_interval: Duration,
    /// Maximum number of status fetches before giving up with [`JobError::PollingTimeout`].
    pub max_attempts: u32,
    /// Poll this job instead of submitting a new one.
    pub resume: Option<JobHandle>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            poll_interval: polling::DEFAULT_INTERVAL,
            max_attempts: polling::DEFAULT_MAX_ATTEMPTS,
            resume: None,
        }
    }
}

impl RunOptions {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn resume_from(mut self, handle: impl Into<JobHandle>) -> Self {
        self.resume = Some(handle.into());
        self
    }
}

/// Sleeps on the tokio timer, yielding to other tasks while waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone)]
pub struct JobRunner<S, H = NoHook, T = TokioTimer> {
    service: S,
    hook: H,
    timer: T,
}

impl<S: JobService> JobRunner<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            hook: NoHook,
            timer: TokioTimer,
        }
    }
}

impl<S, H, T> JobRunner<S, H, T>
where
    S: JobService,
    H: CompletionHook,
    T: Timer,
{
    /// Replaces the completion hook, e.g. with a [`StoreHook`] to persist inputs and results.
    pub fn with_hook<H2: CompletionHook>(self, hook: H2) -> JobRunner<S, H2, T> {
        JobRunner {
            service: self.service,
            hook,
            timer: self.timer,
        }
    }

    pub fn with_timer<T2: Timer>(self, timer: T2) -> JobRunner<S, H, T2> {
        JobRunner {
            service: self.service,
            hook: self.hook,
            timer,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// Submits `request` (unless `options.resume` is set) and polls until a terminal status.
    ///
    /// Both terminal statuses return `Ok`; inspect [`JobResult::outcome`] for failure details.
    /// A submit error ends the run, nothing is retried.
    pub async fn run(
        &self,
        request: &JobRequest,
        options: &RunOptions,
    ) -> Result<JobResult, JobError> {
        let handle = match &options.resume {
            Some(handle) => {
                info!(%handle, "Resuming job, skipping submission");
                handle.clone()
            }
            None => self.submit(request).await?,
        };

        self.poll(&handle, options).await
    }

    /// Polls an already submitted job. Never submits.
    pub async fn resume(
        &self,
        handle: &JobHandle,
        options: &RunOptions,
    ) -> Result<JobResult, JobError> {
        info!(%handle, "Resuming job");
        self.poll(handle, options).await
    }

    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, JobError> {
        let handle = self.service.submit(request).await?;
        info!(%handle, "Job submitted");

        // The job exists remotely from here on, a hook error must not lose its handle.
        if let Err(e) = self.hook.on_submitted(&handle, request).await {
            warn!(%handle, error = %e, "Submission hook failed");
        }

        Ok(handle)
    }

    /// Fetches the status up to `options.max_attempts` times, sleeping `options.poll_interval`
    /// between fetches but not after the last one.
    pub async fn poll(
        &self,
        handle: &JobHandle,
        options: &RunOptions,
    ) -> Result<JobResult, JobError> {
        for attempt in 1..=options.max_attempts {
            let status = self.service.fetch_status(handle).await?;
            debug!(%handle, attempt, %status, "Polled job");

            if let Some(result) = JobResult::from_status(handle.clone(), status) {
                match &result.outcome {
                    JobOutcome::Completed(output) => {
                        info!(%handle, attempt, status = %output.status, "Job completed")
                    }
                    JobOutcome::Failed(detail) => {
                        warn!(%handle, attempt, %detail, "Job failed")
                    }
                }
                self.hook.on_complete(&result).await?;
                return Ok(result);
            }

            if attempt < options.max_attempts {
                self.timer.sleep(options.poll_interval).await;
            }
        }

        warn!(
            %handle,
            attempts = options.max_attempts,
            "Job still running, giving up polling"
        );
        Err(JobError::PollingTimeout {
            handle: handle.clone(),
            attempts: options.max_attempts,
        })
    }
}
