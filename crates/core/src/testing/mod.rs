//! Testing utilities and mock implementations.
//!
//! Mock implementations of the external-service traits (rendering agent,
//! converter, job runner), allowing end-to-end tests without a browser,
//! a job service, or real conversions.

mod mock_agent;
mod mock_converter;
mod mock_job_runner;

pub use mock_agent::MockAgent;
pub use mock_converter::{MockConverter, RecordedConversion};
pub use mock_job_runner::{MockJobRunner, StartedJob};
