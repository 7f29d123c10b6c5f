//! Prometheus metrics for core components.
//!
//! Instruments for the acquisition pipeline and the event dispatcher.
//! The server registers these into its registry at startup.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

/// Acquisition runs by terminal result.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bovespa_runs_total", "Total acquisition runs"),
        &["result"], // "complete", "partial", "failed"
    )
    .unwrap()
});

/// Times the partition key fell back to the current process date.
pub static PARTITION_FALLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "bovespa_partition_fallbacks_total",
        "Partition keys derived from the process date instead of the filename",
    )
    .unwrap()
});

/// Rows written to refined artifacts.
pub static CONVERTED_ROWS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "bovespa_converted_rows",
            "Rows per refined artifact",
        )
        .buckets(vec![1.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0]),
    )
    .unwrap()
});

/// Event dispatches by result.
pub static DISPATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bovespa_dispatches_total", "Storage-event dispatches"),
        &["result"], // "started", "failed"
    )
    .unwrap()
});

/// Register all core metrics into the given registry.
pub fn register(registry: &Registry) {
    let _ = registry.register(Box::new(RUNS_TOTAL.clone()));
    let _ = registry.register(Box::new(PARTITION_FALLBACKS.clone()));
    let _ = registry.register(Box::new(CONVERTED_ROWS.clone()));
    let _ = registry.register(Box::new(DISPATCHES_TOTAL.clone()));
}
