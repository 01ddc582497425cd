//! HTTP health check endpoints for orchestrator liveness/readiness probes.
//!
//! - `/health/live` - liveness probe
//! - `/health/ready` - readiness probe, gated on the consumer, scheduler,
//!   and credential refresher all reporting ready, and queue depth below
//!   threshold.

mod checker;
mod config;
mod error;
mod server;

pub use checker::{HealthChecker, HealthStatus};
pub use config::HealthConfig;
pub use error::HealthError;
pub use server::HealthServer;
