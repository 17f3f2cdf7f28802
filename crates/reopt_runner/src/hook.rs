use reopt_core::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Persists what was submitted and what came back, both filed under the job's handle.
///
/// - on submission: the request as [`Category::Request`]
/// - on a terminal status: the [`JobResult`] as [`Category::Output`]
///
/// Run ids are only unique per service, so a hook built with [`StoreHook::for_service`] tags
/// each stored result with the service's base url and ignores results stored for another one.
#[derive(Debug, Clone)]
pub struct StoreHook<A> {
    store: A,
    service: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct StoredResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    service: Option<String>,
    #[serde(flatten)]
    result: JobResult,
}

impl<A: ArtifactStore> StoreHook<A> {
    pub fn new(store: A) -> Self {
        Self {
            store,
            service: None,
        }
    }

    pub fn for_service(mut self, base_url: impl Into<String>) -> Self {
        self.service = Some(base_url.into());
        self
    }

    pub fn store(&self) -> &A {
        &self.store
    }

    /// A previously persisted result for `handle` from the same service, if there is one.
    pub async fn cached(&self, handle: &JobHandle) -> Result<Option<JobResult>, JobError> {
        if !self.store.exists(Category::Output, handle.as_str()).await? {
            return Ok(None);
        }
        let stored: StoredResult = self.store.load_as(Category::Output, handle.as_str()).await?;
        if stored.service != self.service {
            debug!(
                %handle,
                stored = ?stored.service,
                "Stored result belongs to another service"
            );
            return Ok(None);
        }
        Ok(Some(stored.result))
    }
}

impl<A: ArtifactStore> CompletionHook for StoreHook<A> {
    async fn on_submitted(
        &self,
        handle: &JobHandle,
        request: &JobRequest,
    ) -> Result<(), JobError> {
        self.store
            .save(Category::Request, handle.as_str(), request.as_value())
            .await?;
        debug!(%handle, "Stored submitted request");
        Ok(())
    }

    async fn on_complete(&self, result: &JobResult) -> Result<(), JobError> {
        let stored = StoredResult {
            service: self.service.clone(),
            result: result.clone(),
        };
        self.store
            .save_as(Category::Output, result.handle.as_str(), &stored)
            .await?;
        debug!(handle = %result.handle, "Stored job result");
        Ok(())
    }
}
