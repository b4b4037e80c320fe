//! Metrics and observability utilities
//!
//! Prometheus-style metrics with standardized naming. Recording is a no-op
//! until the binary installs a recorder.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Trendcaster metrics
pub const METRICS_PREFIX: &str = "trendcaster";

/// Histogram buckets for external source latency (in seconds)
pub const SOURCE_LATENCY_BUCKETS: &[f64] = &[
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
    60.00,  // generation can be slow
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // External source metrics
    describe_counter!(
        format!("{}_source_calls_total", METRICS_PREFIX),
        Unit::Count,
        "Total calls to external sources by source and outcome"
    );

    describe_histogram!(
        format!("{}_source_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "External source call latency in seconds"
    );

    // Pipeline metrics
    describe_counter!(
        format!("{}_pipeline_stage_runs_total", METRICS_PREFIX),
        Unit::Count,
        "Content pipeline stage runs by stage and outcome"
    );

    // Persistence metrics
    describe_counter!(
        format!("{}_store_writes_total", METRICS_PREFIX),
        Unit::Count,
        "Store inserts by collection and outcome"
    );

    tracing::info!("Metrics registered");
}

fn outcome(success: bool) -> &'static str {
    if success { "success" } else { "error" }
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Helper to record an external source call
pub fn record_source_call(source: &str, operation: &str, duration_secs: f64, success: bool) {
    counter!(
        format!("{}_source_calls_total", METRICS_PREFIX),
        "source" => source.to_string(),
        "operation" => operation.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);

    histogram!(
        format!("{}_source_duration_seconds", METRICS_PREFIX),
        "source" => source.to_string(),
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Helper to record a pipeline stage run
pub fn record_stage(stage: &str, success: bool) {
    counter!(
        format!("{}_pipeline_stage_runs_total", METRICS_PREFIX),
        "stage" => stage.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);
}

/// Helper to record a store insert
pub fn record_store_write(collection: &str, success: bool) {
    counter!(
        format!("{}_store_writes_total", METRICS_PREFIX),
        "collection" => collection.to_string(),
        "outcome" => outcome(success)
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_buckets_sorted() {
        let mut prev = 0.0;
        for &bucket in SOURCE_LATENCY_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_recording_without_recorder() {
        let metrics = RequestMetrics::start("GET", "/api/ideas");
        metrics.finish(200);
        record_source_call("newsapi", "fetch_tech_news", 0.2, true);
        record_stage("idea_synthesis", false);
        record_store_write("content_ideas", true);
        // Just verify it runs without panic
    }
}
