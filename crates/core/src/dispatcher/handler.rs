//! Event dispatcher implementation.

use std::collections::HashMap;

use tracing::{error, info};

use crate::metrics;

use super::job_runner::JobRunner;
use super::types::{DispatchOutcome, StorageEvent};

/// Dispatches one storage-change notification to the downstream job.
///
/// Stateless and safe under concurrent invocation: every call is an
/// independent transaction against the job-start API. Errors never
/// propagate past `dispatch`; the hosting runtime always receives a
/// structured outcome.
pub struct EventDispatcher<R: JobRunner> {
    runner: R,
    job_name: String,
}

impl<R: JobRunner> EventDispatcher<R> {
    pub fn new(runner: R, job_name: impl Into<String>) -> Self {
        Self {
            runner,
            job_name: job_name.into(),
        }
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// Consume one notification, starting exactly one job run for it.
    ///
    /// Duplicate notifications start duplicate runs; no idempotency key is
    /// attached at this layer.
    pub async fn dispatch(&self, event: StorageEvent) -> DispatchOutcome {
        let trigger = match event.first_trigger() {
            Some(trigger) => trigger,
            None => {
                error!("Notification carried no records");
                metrics::DISPATCHES_TOTAL.with_label_values(&["failed"]).inc();
                return DispatchOutcome::failed("notification carried no records");
            }
        };
        info!("Bucket: {}, Key: {}", trigger.bucket, trigger.key);

        let arguments = HashMap::from([
            ("S3_BUCKET".to_string(), trigger.bucket),
            ("S3_KEY".to_string(), trigger.key),
        ]);

        match self.runner.start_job(&self.job_name, arguments).await {
            Ok(run_id) => {
                info!("Started job {} with run ID: {}", self.job_name, run_id);
                metrics::DISPATCHES_TOTAL
                    .with_label_values(&["started"])
                    .inc();
                DispatchOutcome::started(&self.job_name, run_id)
            }
            Err(e) => {
                error!("Error starting job {}: {}", self.job_name, e);
                metrics::DISPATCHES_TOTAL.with_label_values(&["failed"]).inc();
                DispatchOutcome::failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockJobRunner;

    fn event(bucket: &str, key: &str) -> StorageEvent {
        serde_json::from_str(&format!(
            r#"{{"Records":[{{"s3":{{"bucket":{{"name":"{}"}},"object":{{"key":"{}"}}}}}}]}}"#,
            bucket, key
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_starts_job_with_bucket_and_key() {
        let runner = MockJobRunner::new();
        let handle = runner.clone();
        let dispatcher = EventDispatcher::new(runner, "bovespa-etl-job");

        let outcome = dispatcher.dispatch(event("b", "raw/x.csv")).await;

        assert_eq!(outcome.status_code, 200);
        assert!(outcome.body.job_run_id.is_some());

        let started = handle.started_jobs().await;
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].job_name, "bovespa-etl-job");
        assert_eq!(started[0].arguments["S3_BUCKET"], "b");
        assert_eq!(started[0].arguments["S3_KEY"], "raw/x.csv");
    }

    #[tokio::test]
    async fn test_dispatch_failure_returns_500_with_error_text() {
        let runner = MockJobRunner::new();
        runner
            .fail_next(crate::dispatcher::JobRunnerError::ApiError(
                "service unavailable".to_string(),
            ))
            .await;
        let dispatcher = EventDispatcher::new(runner, "bovespa-etl-job");

        let outcome = dispatcher.dispatch(event("b", "raw/x.csv")).await;

        assert_eq!(outcome.status_code, 500);
        assert!(outcome.body.message.contains("service unavailable"));
        assert!(outcome.body.job_run_id.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_without_records_fails_structured() {
        let runner = MockJobRunner::new();
        let handle = runner.clone();
        let dispatcher = EventDispatcher::new(runner, "bovespa-etl-job");

        let outcome = dispatcher
            .dispatch(serde_json::from_str("{}").unwrap())
            .await;

        assert_eq!(outcome.status_code, 500);
        assert!(handle.started_jobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_dispatches_are_independent() {
        let runner = MockJobRunner::new();
        let handle = runner.clone();
        let dispatcher =
            std::sync::Arc::new(EventDispatcher::new(runner, "bovespa-etl-job"));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let dispatcher = std::sync::Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    dispatcher
                        .dispatch(event("b", &format!("raw/{}.csv", i)))
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().status_code, 200);
        }
        assert_eq!(handle.started_jobs().await.len(), 8);
    }
}
