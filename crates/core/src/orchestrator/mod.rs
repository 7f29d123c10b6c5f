//! Acquisition orchestration.
//!
//! One `AcquisitionRunner::run` call is one end-to-end session: drive the
//! page flow, land the downloaded raw artifact in its date partition, and
//! convert it to the columnar format. Retries live inside the sub-steps
//! that define them; the session as a whole is never retried here.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::AcquisitionRunner;
pub use types::{OrchestratorError, RunOutcome};
