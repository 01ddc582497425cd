//! Health check logic

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};

/// Tracks readiness of the worker's subsystems: the queue consumer, the RSS
/// scheduler, and the credential refresher.
#[derive(Debug)]
pub struct HealthChecker {
    consumer_ready: Arc<AtomicBool>,
    scheduler_ready: Arc<AtomicBool>,
    credential_ready: Arc<AtomicBool>,
    queue_size: Arc<AtomicU64>,
    max_queue_size: u64,
}

impl HealthChecker {
    #[must_use]
    pub fn new(max_queue_size: u64) -> Self {
        Self {
            consumer_ready: Arc::new(AtomicBool::new(false)),
            scheduler_ready: Arc::new(AtomicBool::new(false)),
            credential_ready: Arc::new(AtomicBool::new(false)),
            queue_size: Arc::new(AtomicU64::new(0)),
            max_queue_size,
        }
    }

    pub fn set_consumer_ready(&self, ready: bool) {
        self.consumer_ready.store(ready, Ordering::Relaxed);
        tracing::debug!(ready, "Consumer readiness updated");
    }

    pub fn set_scheduler_ready(&self, ready: bool) {
        self.scheduler_ready.store(ready, Ordering::Relaxed);
        tracing::debug!(ready, "Scheduler readiness updated");
    }

    pub fn set_credential_ready(&self, ready: bool) {
        self.credential_ready.store(ready, Ordering::Relaxed);
        tracing::debug!(ready, "Credential readiness updated");
    }

    pub fn set_queue_size(&self, size: u64) {
        self.queue_size.store(size, Ordering::Relaxed);
    }

    /// For liveness, we just need to respond; if the process can't, the
    /// HTTP server itself is dead and the orchestrator detects it via
    /// timeout.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        true
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        let consumer_ok = self.consumer_ready.load(Ordering::Relaxed);
        let scheduler_ok = self.scheduler_ready.load(Ordering::Relaxed);
        let credential_ok = self.credential_ready.load(Ordering::Relaxed);
        let current_queue = self.queue_size.load(Ordering::Relaxed);
        let queue_ok = current_queue < self.max_queue_size;

        let ready = consumer_ok && scheduler_ok && credential_ok && queue_ok;

        if !ready {
            tracing::debug!(
                consumer_ready = consumer_ok,
                scheduler_ready = scheduler_ok,
                credential_ready = credential_ok,
                queue_size = current_queue,
                max_queue_size = self.max_queue_size,
                "Readiness check failed"
            );
        }

        ready
    }

    #[must_use]
    pub fn get_status(&self) -> HealthStatus {
        HealthStatus {
            alive: self.is_alive(),
            ready: self.is_ready(),
            consumer_ready: self.consumer_ready.load(Ordering::Relaxed),
            scheduler_ready: self.scheduler_ready.load(Ordering::Relaxed),
            credential_ready: self.credential_ready.load(Ordering::Relaxed),
            queue_size: self.queue_size.load(Ordering::Relaxed),
            max_queue_size: self.max_queue_size,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
#[allow(
    clippy::struct_excessive_bools,
    reason = "Status struct intentionally has multiple boolean fields for clarity"
)]
pub struct HealthStatus {
    pub alive: bool,
    pub ready: bool,
    pub consumer_ready: bool,
    pub scheduler_ready: bool,
    pub credential_ready: bool,
    pub queue_size: u64,
    pub max_queue_size: u64,
}
