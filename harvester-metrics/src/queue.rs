//! Consumer/queue metrics: messages received, deleted, retried, and left
//! in place for the DLQ, plus in-flight gauge.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use opentelemetry::{metrics::Counter, KeyValue};

use crate::MetricsError;

#[derive(Debug)]
pub struct QueueMetrics {
    messages_received: Counter<u64>,
    messages_completed: Counter<u64>,
    messages_retried: Counter<u64>,
    messages_dropped_to_dlq: Counter<u64>,
    in_flight: Arc<AtomicU64>,
}

impl QueueMetrics {
    /// # Errors
    /// Returns an error if metric instruments cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let meter = opentelemetry::global::meter("harvester.queue");

        let messages_received = meter
            .u64_counter("harvester.queue.messages.received")
            .with_description("Total number of messages received from the queue")
            .build();

        let messages_completed = meter
            .u64_counter("harvester.queue.messages.completed")
            .with_description("Total number of messages successfully handled and deleted")
            .build();

        let messages_retried = meter
            .u64_counter("harvester.queue.messages.retried")
            .with_description("Total number of messages re-enqueued for retry")
            .build();

        let messages_dropped_to_dlq = meter
            .u64_counter("harvester.queue.messages.dropped_to_dlq")
            .with_description("Total number of messages left for the provider's redrive policy")
            .build();

        let in_flight_ref = Arc::new(AtomicU64::new(0));
        let in_flight_clone = in_flight_ref.clone();
        meter
            .u64_observable_gauge("harvester.queue.in_flight")
            .with_description("Number of messages currently being handled")
            .with_callback(move |observer| {
                observer.observe(in_flight_clone.load(Ordering::Relaxed), &[]);
            })
            .build();

        Ok(Self {
            messages_received,
            messages_completed,
            messages_retried,
            messages_dropped_to_dlq,
            in_flight: in_flight_ref,
        })
    }

    pub fn record_received(&self, count: u64) {
        self.messages_received.add(count, &[]);
    }

    pub fn record_completed(&self) {
        self.messages_completed.add(1, &[]);
    }

    pub fn record_retried(&self, job_kind: &str) {
        self.messages_retried
            .add(1, &[KeyValue::new("job_kind", job_kind.to_string())]);
    }

    pub fn record_dropped_to_dlq(&self, reason: &str) {
        self.messages_dropped_to_dlq
            .add(1, &[KeyValue::new("reason", reason.to_string())]);
    }

    pub fn set_in_flight(&self, count: u64) {
        self.in_flight.store(count, Ordering::Relaxed);
    }
}
