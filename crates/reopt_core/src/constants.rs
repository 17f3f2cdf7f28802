/// The public, stable REopt endpoint. Used when no base url is configured.
pub const DEFAULT_BASE_URL: &str = "https://developer.nrel.gov/api/reopt/stable";

/// Path segments below the base url: `job/` and `job/{run_uuid}/results/`.
pub mod routes {
    pub const JOB: &str = "job";
    pub const RESULTS: &str = "results";
}

pub mod params {
    pub const API_KEY: &str = "api_key";
}

pub mod fields {
    pub const STATUS: &str = "status";
    pub const OUTPUTS: &str = "outputs";
    pub const MESSAGES: &str = "messages";
}

/// Status labels reported by the service, compared case-insensitively.
///
/// Anything not listed here is treated as still running.
pub mod status {
    pub const PENDING: &[&str] = &["pending", "queued"];
    pub const SUCCEEDED: &[&str] = &["optimal", "succeeded", "completed", "success"];
    pub const FAILED: &[&str] = &["error", "failed", "infeasible", "timed-out", "timed out"];
}

pub mod polling {
    use std::time::Duration;

    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 120;
}
