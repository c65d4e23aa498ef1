//! The concurrent synthesis pipeline.
//!
//! - `seen`: duplicate-tracking actor
//! - `worker`: per-record synthesis tasks
//! - `orchestrator`: stage wiring and the shutdown protocol

pub mod orchestrator;
pub mod seen;
mod worker;

pub use orchestrator::{Pipeline, PipelineError, PipelineReport};
pub use seen::{SeenOutcome, SeenTracker, SeenTrackerError};
pub use worker::WorkerError;
