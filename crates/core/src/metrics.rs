//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog cache decisions (hit, stale, miss)
//! - BoardGameGeek requests (counts, latency)
//! - Search backfill batches

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Catalog Cache Metrics
// =============================================================================

/// Cache lookups total by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "meeple_catalog_cache_lookups_total",
            "Total catalog cache lookups",
        ),
        &["result"], // "hit", "stale", "miss"
    )
    .unwrap()
});

/// Ids refetched per search backfill batch.
pub static BACKFILL_IDS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "meeple_catalog_backfill_ids",
            "Number of ids refetched per search backfill batch",
        )
        .buckets(vec![1.0, 2.0, 5.0, 10.0, 15.0, 20.0]),
    )
    .unwrap()
});

// =============================================================================
// BoardGameGeek Metrics
// =============================================================================

/// BGG request duration.
pub static BGG_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "meeple_bgg_request_duration_seconds",
            "Duration of BoardGameGeek API calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap()
});

/// BGG requests total.
pub static BGG_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("meeple_bgg_requests_total", "Total BoardGameGeek API requests"),
        &["endpoint", "status"], // status: "success", "error", "rate_limited"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Record a cache lookup outcome.
pub fn record_cache_lookup(result: &str) {
    CACHE_LOOKUPS.with_label_values(&[result]).inc();
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(BACKFILL_IDS.clone()),
        Box::new(BGG_REQUEST_DURATION.clone()),
        Box::new(BGG_REQUESTS.clone()),
    ]
}
