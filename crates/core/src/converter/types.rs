//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A conversion job request.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Raw delimited input file.
    pub input_path: PathBuf,
    /// Columnar output file.
    pub output_path: PathBuf,
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Output file path.
    pub output_path: PathBuf,
    /// Rows written to the columnar artifact.
    pub rows: usize,
    /// Columns in the inferred schema.
    pub columns: usize,
    /// Malformed rows skipped during parsing.
    pub skipped_rows: usize,
    /// Input size in bytes.
    pub input_bytes: u64,
    /// Output size in bytes.
    pub output_bytes: u64,
    /// Conversion duration in milliseconds.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serialization() {
        let report = ConversionReport {
            output_path: PathBuf::from("/data/date=2025-07-28/IBOVDia_28-07-25.parquet"),
            rows: 87,
            columns: 5,
            skipped_rows: 2,
            input_bytes: 4096,
            output_bytes: 2048,
            duration_ms: 12,
        };

        let json = serde_json::to_string(&report).unwrap();
        let parsed: ConversionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.rows, 87);
        assert_eq!(parsed.skipped_rows, 2);
    }
}
