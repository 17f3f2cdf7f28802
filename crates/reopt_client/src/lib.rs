//! # REopt Client
//! [![Crates.io](https://img.shields.io/crates/v/reopt_client.svg)](https://crates.io/crates/reopt_client)
//! [![Docs](https://docs.rs/reopt_client/badge.svg)](https://docs.rs/reopt_client/)
//!
//! An async HTTP adapter for the REopt job service.
//!
//! Implements [`JobService`] with one request per call: `POST /job/` to submit and
//! `GET /job/{run_uuid}/results/` to fetch a status snapshot. The `run_uuid` is percent-encoded
//! as a single path segment. Transport failures surface as
//! [`JobError::Transport`] and are never retried here.
//!
//! ## Example
//!
//! ```no_run
//!  use reopt_client::{ReoptClient, ServiceConfig};
//!  use reopt_core::prelude::*;
//!  use serde_json::json;
//!
//!  async fn run() -> anyhow::Result<()> {
//!     let config = ServiceConfig::new(DEFAULT_BASE_URL, "my-api-key")?;
//!     let client = ReoptClient::new(config);
//!
//!     let request = JobRequest::new(json!({
//!         "Site": { "latitude": 34.58, "longitude": -118.12 },
//!         "ElectricLoad": { "annual_kwh": 100000 }
//!     }));
//!     let handle = client.submit(&request).await?;
//!     let status = client.fetch_status(&handle).await?;
//!     println!("{handle}: {status:?}");
//!     Ok(())
//! }
//! ```

use reopt_core::prelude::{params::*, routes::*, *};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;
use url::Url;

/// Where and as whom to talk to the service.
///
/// There is no default API key; it must always be supplied by the caller.
#[derive(Clone)]
pub struct ServiceConfig {
    base_url: Url,
    api_key: String,
}

impl ServiceConfig {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self {
            base_url,
            api_key: api_key.into(),
        })
    }

    /// The base url without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct SubmitResponse {
    run_uuid: String,
}

#[derive(Clone, Debug)]
pub struct ReoptClient {
    config: ServiceConfig,
    client: Client,
}

impl ReoptClient {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_http_client(config, Client::new())
    }

    /// Uses a preconfigured [`reqwest::Client`] (timeouts, proxies, TLS).
    pub fn with_http_client(config: ServiceConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Appends `segments` to the base url, percent-encoding each one, plus a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, JobError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| JobError::Validation("Base url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    fn keyed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.query(&[(API_KEY, self.config.api_key.as_str())])
    }

    async fn ensure_success(response: Response) -> Result<Response, JobError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let payload = match response.text().await {
            Ok(text) => text,
            Err(e) => format!("<failed to read response body: {}>", e.without_url()),
        };
        Err(JobError::Rejected { status, payload })
    }

    /// Fetches the raw results document of a job, as returned by the service.
    pub async fn fetch_results(&self, handle: &JobHandle) -> Result<Value, JobError> {
        let id = handle.as_str();
        if id.is_empty() || id == "." || id == ".." {
            return Err(JobError::Validation(format!("Invalid job handle `{id}`")));
        }
        let url = self.endpoint(&[JOB, id, RESULTS])?;
        debug!(%url, "Fetching job results");

        let response = self
            .keyed(self.client.get(url))
            .send()
            .await
            .map_err(transport)?;
        let response = Self::ensure_success(response).await?;

        response
            .json()
            .await
            .map_err(|e| {
                JobError::Validation(format!("Failed to parse results: {}", e.without_url()))
            })
    }
}

fn transport(err: reqwest::Error) -> JobError {
    // The url carries the api_key query parameter.
    JobError::Transport(err.without_url().to_string())
}

impl JobService for ReoptClient {
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle, JobError> {
        let url = self.endpoint(&[JOB])?;
        debug!(%url, "Submitting job");

        let response = self
            .keyed(self.client.post(url))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        let response = Self::ensure_success(response).await?;

        let data: SubmitResponse = response
            .json()
            .await
            .map_err(|e| {
                JobError::Validation(format!(
                    "Failed to parse submit response: {}",
                    e.without_url()
                ))
            })?;

        if data.run_uuid.is_empty() {
            return Err(JobError::Validation(
                "Service returned an empty run_uuid".into(),
            ));
        }

        Ok(JobHandle::new(data.run_uuid))
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatus, JobError> {
        let document = self.fetch_results(handle).await?;
        JobStatus::from_document(document)
    }
}
