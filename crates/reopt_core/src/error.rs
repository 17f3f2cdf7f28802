use crate::job::JobHandle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// Low-level I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No document was saved under the requested name.
    #[error("Artifact not found: {0}")]
    NotFound(String),

    /// The artifact name is empty or would escape its category (e.g. `../x`, `a/b`).
    #[error("Invalid artifact name: {0}")]
    InvalidName(String),
}

#[derive(Error, Debug)]
pub enum JobError {
    /// Network, DNS or timeout failure at the HTTP layer.
    ///
    /// Never retried by the adapter, always surfaced to the caller.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    ///
    /// `payload` is the raw response body, attached for inspection and not parsed.
    #[error("Service rejected the request ({status}): {payload}")]
    Rejected { status: u16, payload: String },

    /// No terminal status was observed within the configured number of polls.
    ///
    /// Not fatal: the job keeps running remotely and can be resumed with `handle`.
    #[error("Job {handle} did not reach a terminal status after {attempts} polls")]
    PollingTimeout { handle: JobHandle, attempts: u32 },

    /// A success response could not be understood (e.g. a missing `run_uuid`).
    #[error("Invalid service response: {0}")]
    Validation(String),

    /// A caller-supplied [`CompletionHook`](crate::traits::CompletionHook) failed.
    #[error("Completion hook failed: {0}")]
    Hook(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl JobError {
    /// The handle to resume with, if this error left a job running remotely.
    pub fn handle(&self) -> Option<&JobHandle> {
        match self {
            Self::PollingTimeout { handle, .. } => Some(handle),
            _ => None,
        }
    }
}
