//! # REopt Core
//! [![Crates.io](https://img.shields.io/crates/v/reopt_core.svg)](https://crates.io/crates/reopt_core)
//! [![Docs](https://docs.rs/reopt_core/badge.svg)](https://docs.rs/reopt_core/)
//!
//! Types and traits for the ecosystem.
//!
//! Defines the job protocol shared by the service adapter, the lifecycle runner and the stores.
//!
//! - **[`JobRequest`](job::JobRequest)**: An opaque job document, passed through to the service untouched.
//! - **[`JobService`](traits::JobService)**: Trait for the two remote operations (submit, fetch status).
//! - **[`ArtifactStore`](traits::ArtifactStore)**: Trait for persisting named JSON documents by [`Category`](store::Category).
//! - **[`summarize`](summary::summarize)**: Flattens a finished job into a handful of financial and sizing figures.

pub mod constants;
pub mod error;
pub mod job;
pub mod store;
pub mod summary;
pub mod traits;

pub mod prelude {
    pub use super::constants::*;
    pub use super::error::*;
    pub use super::job::*;
    pub use super::store::*;
    pub use super::summary::*;
    pub use super::traits::*;
}
