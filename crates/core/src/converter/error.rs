//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// The input could not be parsed at all.
    #[error("Failed to parse input: {reason}")]
    ParseFailed { reason: String },

    /// Parsing succeeded but no usable rows survived.
    #[error("No rows survived parsing of {path} ({skipped} skipped)")]
    EmptyResult { path: PathBuf, skipped: usize },

    /// Output directory does not exist and could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed { path: PathBuf },

    /// Columnar encoding failed.
    #[error("Parquet write failed: {reason}")]
    Parquet { reason: String },

    /// I/O error during conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    pub fn parse_failed(reason: impl Into<String>) -> Self {
        Self::ParseFailed {
            reason: reason.into(),
        }
    }

    pub fn parquet(reason: impl Into<String>) -> Self {
        Self::Parquet {
            reason: reason.into(),
        }
    }
}
