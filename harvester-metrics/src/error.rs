use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("opentelemetry error: {0}")]
    OpenTelemetry(String),

    #[error("metrics already initialized")]
    AlreadyInitialized,
}
