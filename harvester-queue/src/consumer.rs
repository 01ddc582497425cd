//! The consumer engine: the long-polling receive loop, concurrency gate,
//! per-message heartbeat, idempotency check, and retry/backoff/DLQ handling.

use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;

use harvester_common::{internal, Signal};
use harvester_tracing::traced;
use serde::Deserialize;
use tokio::sync::{broadcast, Notify, Semaphore};

use crate::{
    backoff::RetryPolicy,
    client::{clamp_max_messages, clamp_wait_time_secs, OutboundMessage, QueueAttributes, QueueClient},
    error::{QueueError, SystemError},
    idempotency::IdempotencyStore,
    router::Router,
};

fn default_concurrency() -> usize {
    5
}

const fn default_wait_time_secs() -> u32 {
    20
}

const fn default_max_messages() -> u32 {
    10
}

const fn default_visibility_timeout_secs() -> u32 {
    60
}

const fn default_heartbeat_every_secs() -> Option<u32> {
    Some(20)
}

/// Current operational status, surfaced through the health/control surface.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConsumerStatus {
    pub task_running: bool,
    pub task_paused: bool,
    pub queue_attributes: QueueAttributes,
}

/// Configuration and runtime state for the long-polling consumer loop.
#[derive(Deserialize)]
pub struct ConsumerEngine {
    /// Maximum number of messages handled concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Long-poll wait time, clamped to `[0, 20]` seconds.
    #[serde(default = "default_wait_time_secs")]
    pub wait_time_secs: u32,

    /// Messages requested per receive call, clamped to `[1, 10]`.
    #[serde(default = "default_max_messages")]
    pub max_messages: u32,

    /// Visibility timeout applied to in-flight messages.
    #[serde(default = "default_visibility_timeout_secs")]
    pub visibility_timeout_secs: u32,

    /// How often to extend visibility on a message still being handled.
    /// `None` disables heartbeating (matches the provider's own timeout).
    #[serde(default = "default_heartbeat_every_secs")]
    pub heartbeat_every_secs: Option<u32>,

    /// Handler-level retry policy (distinct from the provider's own
    /// receive-count-driven redrive policy).
    #[serde(default)]
    pub retry_policy: RetryPolicy,

    #[serde(skip)]
    running: Arc<AtomicBool>,
    #[serde(skip)]
    paused: Arc<AtomicBool>,
    #[serde(skip)]
    resume_notify: Arc<Notify>,
    #[serde(skip)]
    in_flight: Arc<AtomicU32>,
}

impl Default for ConsumerEngine {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            wait_time_secs: default_wait_time_secs(),
            max_messages: default_max_messages(),
            visibility_timeout_secs: default_visibility_timeout_secs(),
            heartbeat_every_secs: default_heartbeat_every_secs(),
            retry_policy: RetryPolicy::default(),
            running: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            resume_notify: Arc::new(Notify::new()),
            in_flight: Arc::new(AtomicU32::new(0)),
        }
    }
}

impl ConsumerEngine {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.resume_notify.notify_waiters();
    }

    pub async fn status(
        &self,
        queue: &dyn QueueClient,
    ) -> Result<ConsumerStatus, SystemError> {
        Ok(ConsumerStatus {
            task_running: self.is_running(),
            task_paused: self.is_paused(),
            queue_attributes: queue.queue_attributes().await?,
        })
    }

    /// Runs the receive loop until a shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error only if the queue client itself fails in a way that
    /// can't be retried; individual message failures are handled inline and
    /// never abort the loop.
    #[traced(instrument(level = harvester_common::tracing::Level::TRACE, skip_all))]
    pub async fn serve(
        self: Arc<Self>,
        queue: Arc<dyn QueueClient>,
        router: Arc<Router>,
        idempotency: Arc<IdempotencyStore>,
        mut shutdown: broadcast::Receiver<Signal>,
    ) -> Result<(), SystemError> {
        internal!("Consumer engine starting");
        self.running.store(true, Ordering::SeqCst);

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let max_messages = clamp_max_messages(self.max_messages);
        let wait_time_secs = clamp_wait_time_secs(self.wait_time_secs);

        loop {
            if self.is_paused() {
                tokio::select! {
                    () = self.resume_notify.notified() => {}
                    sig = shutdown.recv() => {
                        if matches!(sig, Ok(Signal::Shutdown | Signal::Finalised) | Err(_)) {
                            break;
                        }
                    }
                }
                continue;
            }

            tokio::select! {
                received = queue.receive_messages(max_messages, wait_time_secs) => {
                    let messages = received?;
                    for message in messages {
                        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                            continue;
                        };
                        let queue = Arc::clone(&queue);
                        let router = Arc::clone(&router);
                        let idempotency = Arc::clone(&idempotency);
                        let engine = Arc::clone(&self);
                        engine.in_flight.fetch_add(1, Ordering::SeqCst);
                        tokio::spawn(async move {
                            let _permit = permit;
                            engine.handle_message(queue, router, idempotency, message).await;
                            engine.in_flight.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                }
                sig = shutdown.recv() => {
                    match sig {
                        Ok(Signal::Shutdown | Signal::Finalised) | Err(_) => {
                            internal!("Consumer engine received shutdown signal");
                            break;
                        }
                    }
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        self.drain_in_flight().await;
        internal!("Consumer engine shutdown complete");
        Ok(())
    }

    async fn drain_in_flight(&self) {
        let shutdown_timeout = Duration::from_secs(30);
        let start = std::time::Instant::now();

        while self.in_flight.load(Ordering::SeqCst) > 0 {
            if start.elapsed() >= shutdown_timeout {
                harvester_common::tracing::warn!(
                    "Shutdown timeout exceeded, {} in-flight message(s) will be retried after visibility expiry",
                    self.in_flight.load(Ordering::SeqCst)
                );
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    async fn handle_message(
        &self,
        queue: Arc<dyn QueueClient>,
        router: Arc<Router>,
        idempotency: Arc<IdempotencyStore>,
        message: crate::client::QueueMessage,
    ) {
        let heartbeat_handle = self.heartbeat_every_secs.map(|every| {
            let queue = Arc::clone(&queue);
            let receipt_handle = message.receipt_handle.clone();
            let visibility_timeout_secs = self.visibility_timeout_secs;
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_secs(u64::from(every))).await;
                    if queue
                        .change_message_visibility(&receipt_handle, visibility_timeout_secs)
                        .await
                        .is_err()
                    {
                        harvester_common::tracing::warn!(
                            "Heartbeat failed to extend visibility for {receipt_handle}"
                        );
                    }
                }
            })
        });

        let outcome = self.process_message(&queue, &router, &idempotency, &message).await;

        if let Some(handle) = heartbeat_handle {
            handle.abort();
        }

        if let Err(e) = outcome {
            harvester_common::tracing::error!(
                "Error processing message {}: {e}",
                message.message_id
            );
        }
    }

    async fn process_message(
        &self,
        queue: &Arc<dyn QueueClient>,
        router: &Router,
        idempotency: &IdempotencyStore,
        message: &crate::client::QueueMessage,
    ) -> Result<(), QueueError> {
        let key = harvester_protocol::idempotency_key(&message.body, &message.message_id);

        if !idempotency.claim(&key) {
            harvester_common::incoming!("Duplicate delivery for {key}, deleting without reprocessing");
            queue.delete_message(&message.receipt_handle).await?;
            return Ok(());
        }

        let job = match harvester_protocol::parse_job(&message.body) {
            Ok(job) => job,
            Err(e) => {
                // Matches the message-body parse/validate failures that are
                // left for the provider's redrive policy to route to the DLQ.
                harvester_common::tracing::error!("Rejecting malformed message {}: {e}", message.message_id);
                return Ok(());
            }
        };

        match router.dispatch(job).await {
            Ok(()) => {
                queue.delete_message(&message.receipt_handle).await?;
                Ok(())
            }
            Err(QueueError::Retryable(e)) => {
                self.requeue_for_retry(queue, message, &e).await
            }
            Err(QueueError::NonRetryable(_)) => {
                // Left in place; the provider's own redrive policy moves it
                // to the DLQ once its max receive count is exceeded.
                Ok(())
            }
            Err(e @ QueueError::System(_)) => Err(e),
        }
    }

    async fn requeue_for_retry(
        &self,
        queue: &Arc<dyn QueueClient>,
        message: &crate::client::QueueMessage,
        reason: &crate::error::RetryableError,
    ) -> Result<(), QueueError> {
        let delay = self
            .retry_policy
            .backoff_delay_secs(message.approximate_receive_count);

        harvester_common::outgoing!(
            "Requeuing {} for retry in {delay}s: {reason}",
            message.message_id
        );

        queue.delete_message(&message.receipt_handle).await?;

        let body = reason
            .updated_body
            .clone()
            .unwrap_or_else(|| message.body.clone());

        let resend = queue
            .send_message(OutboundMessage {
                body,
                message_attributes: message.message_attributes.clone(),
                delay_secs: delay,
            })
            .await;

        if let Err(e) = resend {
            harvester_common::tracing::error!(
                "Failed to resend {} for retry ({e}); falling back to visibility extension",
                message.message_id
            );
            queue
                .change_message_visibility(&message.receipt_handle, delay as u32)
                .await?;
        }

        Ok(())
    }
}
