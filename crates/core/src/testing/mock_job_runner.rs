//! Mock job runner for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::dispatcher::{JobRunner, JobRunnerError};

/// A recorded job start for test assertions.
#[derive(Debug, Clone)]
pub struct StartedJob {
    pub job_name: String,
    pub arguments: HashMap<String, String>,
    pub run_id: String,
}

/// Mock implementation of the `JobRunner` trait.
///
/// Records every start and generates sequential run ids. A scripted error
/// fails the next call only. Clones share state.
#[derive(Clone)]
pub struct MockJobRunner {
    inner: Arc<Inner>,
}

struct Inner {
    started: RwLock<Vec<StartedJob>>,
    next_error: RwLock<Option<JobRunnerError>>,
    counter: RwLock<u32>,
}

impl Default for MockJobRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockJobRunner {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                started: RwLock::new(Vec::new()),
                next_error: RwLock::new(None),
                counter: RwLock::new(0),
            }),
        }
    }

    /// Fail the next `start_job` call with this error.
    pub async fn fail_next(&self, error: JobRunnerError) {
        *self.inner.next_error.write().await = Some(error);
    }

    pub async fn started_jobs(&self) -> Vec<StartedJob> {
        self.inner.started.read().await.clone()
    }
}

#[async_trait]
impl JobRunner for MockJobRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn start_job(
        &self,
        job_name: &str,
        arguments: HashMap<String, String>,
    ) -> Result<String, JobRunnerError> {
        if let Some(error) = self.inner.next_error.write().await.take() {
            return Err(error);
        }

        let run_id = {
            let mut counter = self.inner.counter.write().await;
            *counter += 1;
            format!("jr-{:04}", counter)
        };

        self.inner.started.write().await.push(StartedJob {
            job_name: job_name.to_string(),
            arguments,
            run_id: run_id.clone(),
        });

        Ok(run_id)
    }
}
