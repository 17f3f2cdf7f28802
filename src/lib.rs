//! # REopt
//![![License](https://img.shields.io/badge/license-MIT%2FApache-blue.svg)](https://github.com/reopt-rs/reopt?tab=readme-ov-file#license)
//![![Crates.io](https://img.shields.io/crates/v/reopt.svg)](https://crates.io/crates/reopt)
//![![Docs](https://docs.rs/reopt/badge.svg)](https://docs.rs/reopt/)
//!
//! An async client for the REopt optimization service: submit a job, poll it to completion,
//! and keep the submitted input and the returned output on disk.
//!
//! This crate serves as an entry point, re-exporting the core types and
//! optionally including the HTTP adapter, the runner and the stores via feature flags.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | **`client`** | HTTP adapter for the job service (`reopt_client`). |
//! | **`runner`** | Submit/poll/resume lifecycle (`reopt_runner`). |
//! | **`fs`** | Artifact store on the local filesystem (`reopt_fs`). |
//! | **`mock`** | Scripted service, in-memory store and recording timer for tests (`reopt_mock`). |
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! reopt = { version = "0.3", features = ["client", "runner", "fs"] }
//! ```
//!
//! ```rust,ignore
//! use reopt::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api_key = std::env::var("REOPT_API_KEY")?;
//!     let client = ReoptClient::new(ServiceConfig::new(DEFAULT_BASE_URL, api_key)?);
//!     let store = FileSystemStore::new("./reopt_data");
//!
//!     let runner = JobRunner::new(client).with_hook(StoreHook::new(store));
//!     let request = JobRequest::from_reader(std::fs::File::open("job.json")?)?;
//!     let result = runner.run(&request, &RunOptions::default()).await?;
//!
//!     println!("{}", summarize(&result));
//!     Ok(())
//! }
//! ```

pub use reopt_core::*;

#[cfg(feature = "client")]
pub mod client {
    pub use reopt_client::*;
}

#[cfg(feature = "runner")]
pub mod runner {
    pub use reopt_runner::*;
}

#[cfg(feature = "fs")]
pub mod fs {
    pub use reopt_fs::*;
}

#[cfg(feature = "mock")]
pub mod mock {
    pub use reopt_mock::*;
}

pub mod prelude {
    pub use reopt_core::prelude::*;

    #[cfg(feature = "client")]
    pub use reopt_client::{ReoptClient, ServiceConfig};

    #[cfg(feature = "runner")]
    pub use reopt_runner::{JobRunner, RunOptions, StoreHook, TokioTimer};

    #[cfg(feature = "fs")]
    pub use reopt_fs::FileSystemStore;

    #[cfg(feature = "mock")]
    pub use reopt_mock::{MemoryStore, RecordingHook, RecordingTimer, ScriptedJobService};
}
