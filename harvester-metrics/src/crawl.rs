//! Crawl/extraction metrics.

use opentelemetry::{
    metrics::{Counter, Histogram},
    KeyValue,
};

use crate::MetricsError;

#[derive(Debug)]
pub struct CrawlMetrics {
    attempts_total: Counter<u64>,
    extraction_duration_seconds: Histogram<f64>,
}

impl CrawlMetrics {
    /// # Errors
    /// Returns an error if metric instruments cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let meter = opentelemetry::global::meter("harvester.crawl");

        let attempts_total = meter
            .u64_counter("harvester.crawl.attempts.total")
            .with_description("Total number of crawl attempts by outcome")
            .build();

        let extraction_duration_seconds = meter
            .f64_histogram("harvester.crawl.extraction.duration.seconds")
            .with_description("Distribution of article extraction durations")
            .build();

        Ok(Self {
            attempts_total,
            extraction_duration_seconds,
        })
    }

    pub fn record_success(&self, duration_secs: f64) {
        self.attempts_total
            .add(1, &[KeyValue::new("outcome", "success")]);
        self.extraction_duration_seconds.record(duration_secs, &[]);
    }

    pub fn record_failure(&self, outcome: &str) {
        self.attempts_total
            .add(1, &[KeyValue::new("outcome", outcome.to_string())]);
    }
}
