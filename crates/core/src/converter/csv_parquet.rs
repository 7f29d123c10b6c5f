//! Delimited-text to Parquet converter implementation.
//!
//! Best-effort ingestion: rows whose field count disagrees with the header
//! are skipped and counted, never fatal. Column types are inferred from
//! the surviving rows (Int64, Float64, Utf8) honoring the source locale's
//! decimal mark.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use tracing::{debug, info, warn};

use super::config::{ConverterConfig, TextEncoding};
use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionReport};

/// Inferred type of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Int,
    Float,
    Text,
}

/// CSV-to-Parquet converter for the exchange's export format.
pub struct CsvParquetConverter {
    config: ConverterConfig,
}

impl CsvParquetConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    fn decode(&self, bytes: &[u8]) -> String {
        match self.config.encoding {
            TextEncoding::Latin1 => encoding_rs::mem::decode_latin1(bytes).into_owned(),
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// Parse the decoded text into a header and uniform-width rows.
    fn parse_rows(
        &self,
        text: &str,
    ) -> Result<(Vec<String>, Vec<Vec<Option<String>>>, usize), ConverterError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter as u8)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut records = reader.records();

        let header: Vec<String> = match records.next() {
            Some(Ok(record)) => record.iter().map(|f| f.trim().to_string()).collect(),
            Some(Err(e)) => return Err(ConverterError::parse_failed(e.to_string())),
            None => return Ok((Vec::new(), Vec::new(), 0)),
        };

        let mut rows: Vec<Vec<Option<String>>> = Vec::new();
        let mut skipped = 0usize;

        for record in records {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    debug!("Skipping unreadable row: {}", e);
                    skipped += 1;
                    continue;
                }
            };

            // Blank separator lines are not data and not worth counting.
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }

            if record.len() != header.len() {
                debug!(
                    "Skipping row with {} fields (expected {})",
                    record.len(),
                    header.len()
                );
                skipped += 1;
                continue;
            }

            rows.push(
                record
                    .iter()
                    .map(|f| {
                        let trimmed = f.trim();
                        if trimmed.is_empty() {
                            None
                        } else {
                            Some(trimmed.to_string())
                        }
                    })
                    .collect(),
            );
        }

        Ok((header, rows, skipped))
    }

    /// Normalize a numeric literal from the source locale to Rust syntax.
    ///
    /// With a comma decimal mark, periods are thousands separators and are
    /// stripped before the mark is rewritten.
    fn normalize_numeric(&self, value: &str) -> String {
        let thousands = if self.config.decimal_mark == ',' { '.' } else { ',' };
        value
            .chars()
            .filter(|c| *c != thousands)
            .map(|c| if c == self.config.decimal_mark { '.' } else { c })
            .collect()
    }

    fn parse_int(&self, value: &str) -> Option<i64> {
        self.normalize_numeric(value).parse::<i64>().ok()
    }

    fn parse_float(&self, value: &str) -> Option<f64> {
        self.normalize_numeric(value).parse::<f64>().ok()
    }

    /// Infer one column's type from its non-null values.
    fn infer_column(&self, rows: &[Vec<Option<String>>], idx: usize) -> ColumnType {
        let mut ty = ColumnType::Int;
        let mut seen = false;

        for row in rows {
            let Some(value) = &row[idx] else { continue };
            seen = true;

            match ty {
                ColumnType::Int if self.parse_int(value).is_some() => {}
                ColumnType::Int | ColumnType::Float if self.parse_float(value).is_some() => {
                    ty = ColumnType::Float;
                }
                _ => return ColumnType::Text,
            }
        }

        if seen {
            ty
        } else {
            ColumnType::Text
        }
    }

    /// Build the arrow batch from parsed rows.
    fn build_batch(
        &self,
        header: &[String],
        rows: &[Vec<Option<String>>],
    ) -> Result<RecordBatch, ConverterError> {
        let mut fields = Vec::with_capacity(header.len());
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(header.len());

        for (idx, name) in header.iter().enumerate() {
            let ty = self.infer_column(rows, idx);
            let (data_type, array): (DataType, ArrayRef) = match ty {
                ColumnType::Int => (
                    DataType::Int64,
                    Arc::new(Int64Array::from(
                        rows.iter()
                            .map(|r| r[idx].as_deref().and_then(|v| self.parse_int(v)))
                            .collect::<Vec<_>>(),
                    )),
                ),
                ColumnType::Float => (
                    DataType::Float64,
                    Arc::new(Float64Array::from(
                        rows.iter()
                            .map(|r| r[idx].as_deref().and_then(|v| self.parse_float(v)))
                            .collect::<Vec<_>>(),
                    )),
                ),
                ColumnType::Text => (
                    DataType::Utf8,
                    Arc::new(StringArray::from(
                        rows.iter()
                            .map(|r| r[idx].as_deref())
                            .collect::<Vec<_>>(),
                    )),
                ),
            };
            fields.push(Field::new(name, data_type, true));
            columns.push(array);
        }

        let schema = Arc::new(Schema::new(fields));
        RecordBatch::try_new(schema, columns)
            .map_err(|e| ConverterError::parquet(format!("record batch build failed: {e}")))
    }

    fn write_parquet(batch: &RecordBatch, output_path: &Path) -> Result<(), ConverterError> {
        if let Some(parent) = output_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|_| {
                    ConverterError::OutputDirectoryFailed {
                        path: parent.to_path_buf(),
                    }
                })?;
            }
        }

        let file = std::fs::File::create(output_path)?;
        let props = WriterProperties::builder().build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
            .map_err(|e| ConverterError::parquet(format!("writer init failed: {e}")))?;
        writer
            .write(batch)
            .map_err(|e| ConverterError::parquet(format!("write failed: {e}")))?;
        writer
            .close()
            .map_err(|e| ConverterError::parquet(format!("close failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Converter for CsvParquetConverter {
    fn name(&self) -> &str {
        "csv-parquet"
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionReport, ConverterError> {
        let start = Instant::now();

        let bytes = tokio::fs::read(&job.input_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConverterError::InputNotFound {
                    path: job.input_path.clone(),
                }
            } else {
                ConverterError::Io(e)
            }
        })?;
        let input_bytes = bytes.len() as u64;

        let text = self.decode(&bytes);
        let (header, rows, skipped) = self.parse_rows(&text)?;

        if rows.is_empty() {
            warn!(
                "No usable rows in {} ({} skipped)",
                job.input_path.display(),
                skipped
            );
            return Err(ConverterError::EmptyResult {
                path: job.input_path.clone(),
                skipped,
            });
        }

        let batch = self.build_batch(&header, &rows)?;
        Self::write_parquet(&batch, &job.output_path)?;

        let output_bytes = tokio::fs::metadata(&job.output_path).await?.len();
        info!(
            "Converted {} -> {}: {} rows x {} columns, {} skipped, {} -> {} bytes",
            job.input_path.display(),
            job.output_path.display(),
            rows.len(),
            header.len(),
            skipped,
            input_bytes,
            output_bytes
        );

        Ok(ConversionReport {
            output_path: job.output_path,
            rows: rows.len(),
            columns: header.len(),
            skipped_rows: skipped,
            input_bytes,
            output_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        if self.config.delimiter == self.config.decimal_mark {
            return Err(ConverterError::parse_failed(
                "delimiter and decimal mark cannot be the same character",
            ));
        }
        Ok(())
    }
}
