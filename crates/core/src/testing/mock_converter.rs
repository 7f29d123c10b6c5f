//! Mock converter for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::converter::{ConversionJob, ConversionReport, Converter, ConverterError};

/// A recorded conversion request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    pub input_path: std::path::PathBuf,
    pub output_path: std::path::PathBuf,
}

/// Mock implementation of the `Converter` trait.
///
/// Writes a placeholder output file and reports one row, unless a failure
/// has been scripted. Clones share state.
#[derive(Clone)]
pub struct MockConverter {
    inner: Arc<Inner>,
}

struct Inner {
    conversions: RwLock<Vec<RecordedConversion>>,
    fail_reason: RwLock<Option<String>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                conversions: RwLock::new(Vec::new()),
                fail_reason: RwLock::new(None),
            }),
        }
    }

    /// Every subsequent conversion fails with this reason.
    pub async fn fail_with(&self, reason: impl Into<String>) {
        *self.inner.fail_reason.write().await = Some(reason.into());
    }

    pub async fn conversions(&self) -> Vec<RecordedConversion> {
        self.inner.conversions.read().await.clone()
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionReport, ConverterError> {
        self.inner.conversions.write().await.push(RecordedConversion {
            input_path: job.input_path.clone(),
            output_path: job.output_path.clone(),
        });

        if let Some(reason) = self.inner.fail_reason.read().await.clone() {
            return Err(ConverterError::ParseFailed { reason });
        }

        tokio::fs::write(&job.output_path, b"mock-parquet").await?;
        Ok(ConversionReport {
            output_path: job.output_path,
            rows: 1,
            columns: 1,
            skipped_rows: 0,
            input_bytes: 0,
            output_bytes: 12,
            duration_ms: 0,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}
