//! Storage-event dispatching.
//!
//! A stateless unit triggered by object-storage change notifications: it
//! extracts the bucket/key pair, starts the downstream batch job, and
//! converts every failure into a structured response for the hosting
//! runtime. No retries and no deduplication here; redelivery policy
//! belongs to the host.

mod config;
mod handler;
mod job_runner;
mod types;

pub use config::DispatcherConfig;
pub use handler::EventDispatcher;
pub use job_runner::{HttpJobRunner, JobRunner};
pub use types::{
    DispatchOutcome, JobRunnerError, JobTrigger, StorageEvent, StorageRecord,
};
