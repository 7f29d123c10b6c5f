//! Raw listing conversion.
//!
//! Turns the locale-specific delimited text file the exchange publishes
//! into a typed columnar artifact. Structural transform only: malformed
//! rows are skipped, per-column business semantics are not validated.

mod config;
mod csv_parquet;
mod error;
mod traits;
mod types;

pub use config::{ConverterConfig, TextEncoding};
pub use csv_parquet::CsvParquetConverter;
pub use error::ConverterError;
pub use traits::Converter;
pub use types::{ConversionJob, ConversionReport};
