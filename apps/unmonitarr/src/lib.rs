//! Unmonitarr daemon library
//!
//! Keeps Radarr and Sonarr from grabbing releases too early: items are
//! unmonitored until their release or air date plus a delay has passed, then
//! monitored again. This crate holds the orchestration core (job queue,
//! category locks, worker loop, scheduler), the reconcilers and the webhook
//! routes; the binary in `main.rs` wires them together.

pub mod config;
pub mod error;
pub mod jobs;
pub mod locks;
pub mod queue;
pub mod retry;
pub mod routes;
pub mod scheduler;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use error::{ErrorSeverity, WorkerError, WorkerResult};
pub use jobs::{JobHandler, ReconcileResult};
pub use locks::CategoryLocks;
pub use queue::{Category, Job, JobQueue, Trigger};
pub use retry::RetryPolicy;
pub use scheduler::Scheduler;
pub use worker::Worker;
