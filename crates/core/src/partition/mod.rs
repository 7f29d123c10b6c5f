//! Date partition resolution.
//!
//! Downloaded listings are named `<prefix>_<DD>-<MM>-<YY>.<ext>`; the date
//! token determines the partition directory the artifacts land in. When
//! the token is missing or malformed the current process date is used
//! instead; callers must surface that fallback in their logs.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO-8601 date key (`YYYY-MM-DD`) naming one partition directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// Directory name for this partition (`date=YYYY-MM-DD`).
    pub fn dir_name(&self) -> String {
        format!("date={}", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NaiveDate> for PartitionKey {
    fn from(date: NaiveDate) -> Self {
        Self(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month(),
            date.day()
        ))
    }
}

/// Outcome of resolving a filename to a partition key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: PartitionKey,
    /// True when the filename did not yield a date and the current process
    /// date was used instead.
    pub fell_back: bool,
}

/// Derive a partition key from a downloaded filename.
///
/// Expects an underscore-delimited `DD-MM-YY` token before the extension;
/// two-digit years map into the 21st century. Pure function: any parse
/// failure falls back to today's date with `fell_back` set.
pub fn resolve(filename: &str) -> Resolution {
    match parse_date_token(filename) {
        Some(date) => Resolution {
            key: PartitionKey::from(date),
            fell_back: false,
        },
        None => Resolution {
            key: PartitionKey::from(Utc::now().date_naive()),
            fell_back: true,
        },
    }
}

fn parse_date_token(filename: &str) -> Option<NaiveDate> {
    let stem = filename.rsplit_once('.').map_or(filename, |(s, _)| s);
    let token = stem.rsplit_once('_')?.1;

    let mut fields = token.split('-');
    let day: u32 = fields.next()?.parse().ok()?;
    let month: u32 = fields.next()?.parse().ok()?;
    let year: i32 = fields.next()?.parse().ok()?;
    if fields.next().is_some() || year > 99 {
        return None;
    }

    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_standard_filename() {
        let resolution = resolve("IBOVDia_28-07-25.csv");
        assert_eq!(resolution.key.as_str(), "2025-07-28");
        assert!(!resolution.fell_back);
    }

    #[test]
    fn test_resolve_century_mapping() {
        let resolution = resolve("IBOVDia_01-01-00.csv");
        assert_eq!(resolution.key.as_str(), "2000-01-01");
        assert!(!resolution.fell_back);

        let resolution = resolve("IBOVDia_31-12-99.csv");
        assert_eq!(resolution.key.as_str(), "2099-12-31");
    }

    #[test]
    fn test_resolve_missing_token_falls_back() {
        let resolution = resolve("IBOVDia.csv");
        assert!(resolution.fell_back);
        assert_eq!(
            resolution.key,
            PartitionKey::from(Utc::now().date_naive())
        );
    }

    #[test]
    fn test_resolve_malformed_date_falls_back() {
        assert!(resolve("IBOVDia_32-13-25.csv").fell_back);
        assert!(resolve("IBOVDia_2025-07-28.csv").fell_back);
        assert!(resolve("IBOVDia_28-07.csv").fell_back);
        assert!(resolve("IBOVDia_28-07-25-extra.csv").fell_back);
        assert!(resolve("IBOVDia_aa-bb-cc.csv").fell_back);
        assert!(resolve("").fell_back);
    }

    #[test]
    fn test_resolve_uses_last_underscore_token() {
        let resolution = resolve("index_day_28-07-25.csv");
        assert_eq!(resolution.key.as_str(), "2025-07-28");
        assert!(!resolution.fell_back);
    }

    #[test]
    fn test_partition_dir_name() {
        let resolution = resolve("IBOVDia_28-07-25.csv");
        assert_eq!(resolution.key.dir_name(), "date=2025-07-28");
    }

    #[test]
    fn test_resolve_invalid_calendar_date() {
        // February 30th parses as numbers but is not a real date.
        assert!(resolve("IBOVDia_30-02-25.csv").fell_back);
    }
}
