use crate::error::*;
use crate::job::*;
use crate::store::Category;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// The two remote operations of the job protocol.
///
/// Implementations do a single network round trip per call and keep no state between calls.
/// Retrying is left to the caller.
pub trait JobService: Send + Sync + 'static + Clone {
    /// Submits a job and returns the handle the service assigned to it.
    fn submit(&self, request: &JobRequest)
    -> impl Future<Output = Result<JobHandle, JobError>> + Send;

    /// Fetches a snapshot of the job's status. Never waits for completion.
    fn fetch_status(
        &self,
        handle: &JobHandle,
    ) -> impl Future<Output = Result<JobStatus, JobError>> + Send;
}

/// A trait for persisting named JSON documents, grouped by [`Category`].
///
/// Saving an existing name replaces it. Concurrent saves to the same name are last-writer-wins.
pub trait ArtifactStore: Send + Sync + 'static + Clone {
    /// Writes a document. Readers never observe a partially written document.
    fn save(
        &self,
        category: Category,
        name: &str,
        document: &Value,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Reads a document, [`StorageError::NotFound`] if it was never saved.
    fn load(
        &self,
        category: Category,
        name: &str,
    ) -> impl Future<Output = Result<Value, StorageError>> + Send;

    /// Checks if a document exists.
    fn exists(
        &self,
        category: Category,
        name: &str,
    ) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// Serializes `value` and saves it.
    fn save_as<T: Serialize + Sync>(
        &self,
        category: Category,
        name: &str,
        value: &T,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        async move {
            let document = serde_json::to_value(value)?;
            self.save(category, name, &document).await
        }
    }

    /// Loads a document and deserializes it into `T`.
    fn load_as<T: DeserializeOwned + Send>(
        &self,
        category: Category,
        name: &str,
    ) -> impl Future<Output = Result<T, StorageError>> + Send {
        async move {
            let document = self.load(category, name).await?;
            Ok(serde_json::from_value(document)?)
        }
    }
}

/// Suspends the polling task between status fetches.
pub trait Timer: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Called by the runner at the edges of a job's lifecycle.
///
/// Persistence is opt-in through this hook so the runner stays independent of storage policy.
pub trait CompletionHook: Send + Sync {
    /// Optional: Called once the service accepted a new submission. Not called on resume.
    fn on_submitted(
        &self,
        _handle: &JobHandle,
        _request: &JobRequest,
    ) -> impl Future<Output = Result<(), JobError>> + Send {
        async { Ok(()) }
    }

    /// Called once a terminal status (success or failure) was observed.
    fn on_complete(&self, result: &JobResult) -> impl Future<Output = Result<(), JobError>> + Send;
}

/// A hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl CompletionHook for NoHook {
    async fn on_complete(&self, _result: &JobResult) -> Result<(), JobError> {
        Ok(())
    }
}
