//! Configuration for the converter module.

use serde::{Deserialize, Serialize};

/// Input text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// ISO-8859-1 / Latin-1, used by the exchange's exports.
    Latin1,
    Utf8,
}

/// Converter settings for the source locale's delimited format.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConverterConfig {
    /// Field separator.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Input text encoding.
    #[serde(default = "default_encoding")]
    pub encoding: TextEncoding,

    /// Decimal mark used in numeric fields. With a comma mark, periods are
    /// treated as thousands separators.
    #[serde(default = "default_decimal_mark")]
    pub decimal_mark: char,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            encoding: default_encoding(),
            decimal_mark: default_decimal_mark(),
        }
    }
}

fn default_delimiter() -> char {
    ';'
}

fn default_encoding() -> TextEncoding {
    TextEncoding::Latin1
}

fn default_decimal_mark() -> char {
    ','
}
