use crate::constants::{fields, status};
use crate::error::JobError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A job document for the optimization service (site, load profile, technologies, financials).
///
/// The client never inspects it; validation is left to the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct JobRequest(Value);

impl JobRequest {
    pub fn new(document: Value) -> Self {
        Self(document)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for JobRequest {
    fn from(document: Value) -> Self {
        Self(document)
    }
}

impl std::str::FromStr for JobRequest {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map(Self)
    }
}

/// The identifier (`run_uuid`) the service assigned to an accepted job.
///
/// Only meaningful against the base url and API key it was obtained with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobHandle {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The `messages` block of a results document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Messages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Value>,
}

/// What the service returned for a job that finished successfully.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobOutput {
    /// The raw status label, e.g. `"optimal"`.
    pub status: String,
    /// Opaque results document. Only the [`summarize`](crate::summary::summarize) step looks inside.
    pub outputs: Value,
    #[serde(default)]
    pub messages: Messages,
}

/// A single snapshot of a job's state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded(JobOutput),
    Failed(String),
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Running => f.write_str("running"),
            Self::Succeeded(output) => write!(f, "succeeded ({})", output.status),
            Self::Failed(detail) => write!(f, "failed: {detail}"),
        }
    }
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    /// Classifies a results document from `GET /job/{run_uuid}/results/`.
    ///
    /// Unknown status labels are reported as [`JobStatus::Running`].
    pub fn from_document(document: Value) -> Result<Self, JobError> {
        let Value::Object(mut map) = document else {
            return Err(JobError::Validation(
                "results document is not a JSON object".into(),
            ));
        };

        let label = match map.remove(fields::STATUS) {
            Some(Value::String(label)) => label,
            Some(other) => {
                return Err(JobError::Validation(format!(
                    "`{}` is not a string: {other}",
                    fields::STATUS
                )));
            }
            None => {
                return Err(JobError::Validation(format!(
                    "results document has no `{}` field",
                    fields::STATUS
                )));
            }
        };

        let messages: Messages = match map.remove(fields::MESSAGES) {
            Some(Value::Null) | None => Messages::default(),
            Some(value) => serde_json::from_value(value).map_err(|e| {
                JobError::Validation(format!("Failed to parse `{}`: {e}", fields::MESSAGES))
            })?,
        };

        let normalized = label.trim().to_lowercase();
        let is = |labels: &[&str]| labels.contains(&normalized.as_str());

        let status = if is(status::SUCCEEDED) {
            Self::Succeeded(JobOutput {
                outputs: map
                    .remove(fields::OUTPUTS)
                    .unwrap_or_else(|| Value::Object(Default::default())),
                status: label,
                messages,
            })
        } else if is(status::FAILED) {
            let detail = messages
                .errors
                .as_ref()
                .filter(|errors| !is_empty(errors))
                .map(render)
                .unwrap_or(label);
            Self::Failed(detail)
        } else if is(status::PENDING) {
            Self::Pending
        } else {
            Self::Running
        };

        Ok(status)
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// How a job ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum JobOutcome {
    Completed(JobOutput),
    Failed(String),
}

/// The terminal result of a job, as handed to completion hooks and callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub handle: JobHandle,
    pub outcome: JobOutcome,
    /// When the client observed the terminal status.
    pub finished_at: DateTime<Utc>,
}

impl JobResult {
    pub fn new(handle: JobHandle, outcome: JobOutcome) -> Self {
        Self {
            handle,
            outcome,
            finished_at: Utc::now(),
        }
    }

    /// Builds a result from a terminal status, [`None`] for `Pending`/`Running`.
    pub fn from_status(handle: JobHandle, status: JobStatus) -> Option<Self> {
        let outcome = match status {
            JobStatus::Succeeded(output) => JobOutcome::Completed(output),
            JobStatus::Failed(detail) => JobOutcome::Failed(detail),
            JobStatus::Pending | JobStatus::Running => return None,
        };
        Some(Self::new(handle, outcome))
    }

    pub fn output(&self) -> Option<&JobOutput> {
        match &self.outcome {
            JobOutcome::Completed(output) => Some(output),
            JobOutcome::Failed(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, JobOutcome::Completed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optimal_is_succeeded_with_outputs() {
        let status = JobStatus::from_document(json!({
            "status": "optimal",
            "outputs": { "Financial": { "npv": 50000 } },
            "messages": { "warnings": ["clipped"] }
        }))
        .unwrap();

        let JobStatus::Succeeded(output) = status else {
            panic!("expected success, got {status:?}");
        };
        assert_eq!(output.status, "optimal");
        assert_eq!(output.outputs["Financial"]["npv"], json!(50000));
        assert_eq!(output.messages.warnings, Some(json!(["clipped"])));
    }

    #[test]
    fn labels_are_case_insensitive() {
        let status = JobStatus::from_document(json!({ "status": "  Optimal " })).unwrap();
        assert!(matches!(status, JobStatus::Succeeded(_)));

        let status = JobStatus::from_document(json!({ "status": "QUEUED" })).unwrap();
        assert_eq!(status, JobStatus::Pending);
    }

    #[test]
    fn unknown_label_keeps_polling() {
        for label in ["Optimizing...", "Running", "warming up"] {
            let status = JobStatus::from_document(json!({ "status": label })).unwrap();
            assert_eq!(status, JobStatus::Running, "label {label}");
            assert!(!status.is_terminal());
        }
    }

    #[test]
    fn failure_detail_prefers_error_messages() {
        let status = JobStatus::from_document(json!({
            "status": "error",
            "messages": { "errors": "Site.latitude out of range" }
        }))
        .unwrap();
        assert_eq!(status, JobStatus::Failed("Site.latitude out of range".into()));

        let status = JobStatus::from_document(json!({
            "status": "infeasible",
            "messages": { "errors": {} }
        }))
        .unwrap();
        assert_eq!(status, JobStatus::Failed("infeasible".into()));
    }

    #[test]
    fn missing_status_is_a_validation_error() {
        let err = JobStatus::from_document(json!({ "outputs": {} })).unwrap_err();
        assert!(matches!(err, JobError::Validation(_)));

        let err = JobStatus::from_document(json!([1, 2])).unwrap_err();
        assert!(matches!(err, JobError::Validation(_)));
    }

    #[test]
    fn request_round_trips_untouched() {
        let doc = json!({ "Site": { "latitude": 34.58, "longitude": -118.12 } });
        let request: JobRequest = doc.to_string().parse().unwrap();
        assert_eq!(serde_json::to_value(&request).unwrap(), doc);
    }

    #[test]
    fn only_terminal_statuses_build_results() {
        let handle = JobHandle::from("abc-123");
        assert!(JobResult::from_status(handle.clone(), JobStatus::Running).is_none());

        let result = JobResult::from_status(handle, JobStatus::Failed("boom".into())).unwrap();
        assert!(!result.is_success());
        assert!(result.output().is_none());
    }
}
