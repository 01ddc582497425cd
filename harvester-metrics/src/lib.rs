//! OpenTelemetry metrics for the news harvester worker.
//!
//! Exports via OTLP to an OpenTelemetry Collector, which can expose them in
//! Prometheus format for scraping.

mod config;
mod crawl;
mod error;
mod exporter;
mod queue;

pub use config::MetricsConfig;
pub use crawl::CrawlMetrics;
pub use error::MetricsError;
use once_cell::sync::OnceCell;
pub use queue::QueueMetrics;

static METRICS_INSTANCE: OnceCell<Metrics> = OnceCell::new();

#[derive(Debug)]
pub struct Metrics {
    pub queue: QueueMetrics,
    pub crawl: CrawlMetrics,
}

/// Initializes the metrics system. Must be called once at startup before any
/// metrics are recorded; a no-op if metrics are disabled in config.
///
/// # Errors
/// Returns an error if metrics initialization fails or has already run.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        tracing::info!("Metrics collection is disabled");
        return Ok(());
    }

    let provider = exporter::init_otlp_exporter(&config.endpoint)?;
    opentelemetry::global::set_meter_provider(provider);

    let metrics = Metrics {
        queue: QueueMetrics::new()?,
        crawl: CrawlMetrics::new()?,
    };

    METRICS_INSTANCE
        .set(metrics)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    tracing::info!("Metrics collection initialized successfully");
    Ok(())
}

/// # Panics
/// Panics if metrics have not been initialized via [`init_metrics`].
#[must_use]
pub fn metrics() -> &'static Metrics {
    METRICS_INSTANCE
        .get()
        .expect("Metrics not initialized. Call init_metrics() first.")
}

#[must_use]
pub fn is_enabled() -> bool {
    METRICS_INSTANCE.get().is_some()
}
