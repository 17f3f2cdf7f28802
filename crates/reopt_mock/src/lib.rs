//! # REopt Mock
//! [![Crates.io](https://img.shields.io/crates/v/reopt_mock.svg)](https://crates.io/crates/reopt_mock)
//! [![Docs](https://docs.rs/reopt_mock/badge.svg)](https://docs.rs/reopt_mock/)
//!
//! In-memory stand-ins for the job service, the artifact store, the polling timer and
//! completion hooks. Everything records how it was called.
//!
//! **Never talks to the network. Meant for tests and examples only!**
//!
//! ## Usage
//!
//! ```rust
//! # use reopt_mock::ScriptedJobService;
//! # use reopt_core::prelude::*;
//! # fn main() {
//! let service = ScriptedJobService::new("abc-123")
//!     .then_running(2)
//!     .then_status(JobStatus::Failed("infeasible".into()));
//! # }
//! ```

use reopt_core::prelude::*;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct Script {
    handle: JobHandle,
    submit_error: Option<JobError>,
    statuses: VecDeque<Result<JobStatus, JobError>>,
    otherwise: JobStatus,
    submitted: Vec<JobRequest>,
    fetched: Vec<JobHandle>,
}

/// A [`JobService`] that replays a scripted sequence of status snapshots.
///
/// Once the script is used up every fetch returns the fallback status ([`JobStatus::Running`]
/// unless changed with [`otherwise`](Self::otherwise)).
#[derive(Clone, Debug)]
pub struct ScriptedJobService {
    script: Arc<Mutex<Script>>,
}

impl ScriptedJobService {
    /// A service that accepts every submission with `handle`.
    pub fn new(handle: impl Into<JobHandle>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                handle: handle.into(),
                submit_error: None,
                statuses: VecDeque::new(),
                otherwise: JobStatus::Running,
                submitted: Vec::new(),
                fetched: Vec::new(),
            })),
        }
    }

    /// Fails the next submission with `err`.
    pub fn fail_submit(self, err: JobError) -> Self {
        lock(&self.script).submit_error = Some(err);
        self
    }

    pub fn then_status(self, status: JobStatus) -> Self {
        lock(&self.script).statuses.push_back(Ok(status));
        self
    }

    /// Queues `n` [`JobStatus::Running`] snapshots.
    pub fn then_running(self, n: usize) -> Self {
        {
            let mut script = lock(&self.script);
            script
                .statuses
                .extend(std::iter::repeat_n(JobStatus::Running, n).map(Ok));
        }
        self
    }

    /// Queues a results document, classified the same way the HTTP adapter does.
    pub fn then_document(self, document: Value) -> Self {
        lock(&self.script)
            .statuses
            .push_back(JobStatus::from_document(document));
        self
    }

    pub fn then_error(self, err: JobError) -> Self {
        lock(&self.script).statuses.push_back(Err(err));
        self
    }

    pub fn otherwise(self, status: JobStatus) -> Self {
        lock(&self.script).otherwise = status;
        self
    }

    pub fn submit_calls(&self) -> usize {
        lock(&self.script).submitted.len()
    }

    pub fn fetch_calls(&self) -> usize {
        lock(&self.script).fetched.len()
    }

    pub fn submitted(&self) -> Vec<JobRequest> {
        lock(&self.script).submitted.clone()
    }

    pub fn fetched_handles(&self) -> Vec<JobHandle> {
        lock(&self.script).fetched.clone()
    }
}

impl JobService for ScriptedJobService {
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, JobError> {
        let mut script = lock(&self.script);
        script.submitted.push(request.clone());
        match script.submit_error.take() {
            Some(err) => Err(err),
            None => Ok(script.handle.clone()),
        }
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatus, JobError> {
        let mut script = lock(&self.script);
        script.fetched.push(handle.clone());
        match script.statuses.pop_front() {
            Some(next) => next,
            None => Ok(script.otherwise.clone()),
        }
    }
}

/// An [`ArtifactStore`] backed by a map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<(Category, String), Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactStore for MemoryStore {
    async fn save(
        &self,
        category: Category,
        name: &str,
        document: &Value,
    ) -> Result<(), StorageError> {
        validate_name(name)?;
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((category, name.to_string()), document.clone());
        Ok(())
    }

    async fn load(&self, category: Category, name: &str) -> Result<Value, StorageError> {
        validate_name(name)?;
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(category, name.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("{category}/{name}")))
    }

    async fn exists(&self, category: Category, name: &str) -> Result<bool, StorageError> {
        validate_name(name)?;
        Ok(self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(category, name.to_string())))
    }
}

/// A [`Timer`] that returns immediately and remembers every requested sleep.
#[derive(Clone, Debug, Default)]
pub struct RecordingTimer {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleeps).clone()
    }

    pub fn count(&self) -> usize {
        lock(&self.sleeps).len()
    }
}

impl Timer for RecordingTimer {
    async fn sleep(&self, duration: Duration) {
        lock(&self.sleeps).push(duration);
    }
}

/// A [`CompletionHook`] that records its calls and can be told to fail.
#[derive(Clone, Debug, Default)]
pub struct RecordingHook {
    submitted: Arc<Mutex<Vec<JobHandle>>>,
    completed: Arc<Mutex<Vec<JobResult>>>,
    fail: bool,
}

impl RecordingHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hook whose `on_complete` always fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn submitted(&self) -> Vec<JobHandle> {
        lock(&self.submitted).clone()
    }

    pub fn completed(&self) -> Vec<JobResult> {
        lock(&self.completed).clone()
    }
}

impl CompletionHook for RecordingHook {
    async fn on_submitted(
        &self,
        handle: &JobHandle,
        _request: &JobRequest,
    ) -> Result<(), JobError> {
        lock(&self.submitted).push(handle.clone());
        Ok(())
    }

    async fn on_complete(&self, result: &JobResult) -> Result<(), JobError> {
        lock(&self.completed).push(result.clone());
        if self.fail {
            return Err(JobError::Hook("recording hook told to fail".into()));
        }
        Ok(())
    }
}
