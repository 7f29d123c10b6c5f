//! Types for storage-event dispatching.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the downstream job-start API.
#[derive(Debug, Error)]
pub enum JobRunnerError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error: {0}")]
    ApiError(String),
}

/// Storage-change notification payload.
///
/// Matches the S3 event record shape; only the fields the dispatcher
/// consumes are modeled.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct S3Entity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectRef {
    pub key: String,
}

/// One job trigger extracted from a notification; consumed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTrigger {
    pub bucket: String,
    pub key: String,
}

impl StorageEvent {
    /// Extract the trigger from the first record, if any.
    pub fn first_trigger(&self) -> Option<JobTrigger> {
        self.records.first().map(|record| JobTrigger {
            bucket: record.s3.bucket.name.clone(),
            key: record.s3.object.key.clone(),
        })
    }
}

/// Structured dispatch result handed back to the hosting runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub status_code: u16,
    pub body: DispatchBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchBody {
    pub message: String,
    #[serde(rename = "jobRunId", skip_serializing_if = "Option::is_none")]
    pub job_run_id: Option<String>,
}

impl DispatchOutcome {
    pub fn started(job_name: &str, run_id: String) -> Self {
        Self {
            status_code: 200,
            body: DispatchBody {
                message: format!("Successfully started job {}", job_name),
                job_run_id: Some(run_id),
            },
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            status_code: 500,
            body: DispatchBody {
                message: format!("Error starting job: {}", error),
                job_run_id: None,
            },
        }
    }
}
