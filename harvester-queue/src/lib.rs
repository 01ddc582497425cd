pub mod backends;
pub mod backoff;
pub mod client;
pub mod consumer;
pub mod error;
pub mod idempotency;
pub mod router;

pub use backoff::RetryPolicy;
pub use client::{OutboundMessage, QueueAttributes, QueueClient, QueueMessage};
pub use consumer::{ConsumerEngine, ConsumerStatus};
pub use error::{NonRetryableError, QueueError, RetryableError, SystemError};
pub use idempotency::IdempotencyStore;
pub use router::{JobHandler, Router};

#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use harvester_common::Signal;
    use harvester_protocol::Job;
    use tokio::sync::broadcast;

    use super::*;
    use crate::backends::MemoryQueueClient;

    struct CountingHandler {
        calls: std::sync::atomic::AtomicU32,
        fail_first: bool,
    }

    #[async_trait]
    impl JobHandler for CountingHandler {
        async fn handle(&self, _job: Job) -> Result<(), QueueError> {
            let count = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if self.fail_first && count == 0 {
                return Err(RetryableError::transient("simulated").into());
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn successful_job_deletes_the_message() {
        let queue = Arc::new(MemoryQueueClient::new());
        queue.seed(
            "m1",
            r#"{"type":"crawl-single-url","id":"j1","url":"https://example.com"}"#,
        );

        let handler = Arc::new(CountingHandler {
            calls: std::sync::atomic::AtomicU32::new(0),
            fail_first: false,
        });
        let router = Arc::new(Router::new().with_handler("crawl-single-url", handler));
        let idempotency = Arc::new(IdempotencyStore::new());
        let engine = Arc::new(ConsumerEngine::default());

        let (tx, rx) = broadcast::channel(1);
        let engine_clone = Arc::clone(&engine);
        let queue_clone: Arc<dyn QueueClient> = queue.clone();
        let serve = tokio::spawn(engine_clone.serve(queue_clone, router, idempotency, rx));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        tx.send(Signal::Shutdown).unwrap();
        serve.await.unwrap().unwrap();

        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn duplicate_idempotency_key_is_deleted_without_dispatch() {
        let queue = Arc::new(MemoryQueueClient::new());
        let idempotency = Arc::new(IdempotencyStore::new());
        idempotency.claim("j1");
        queue.seed(
            "m1",
            r#"{"type":"crawl-single-url","id":"j1","url":"https://example.com"}"#,
        );

        let handler = Arc::new(CountingHandler {
            calls: std::sync::atomic::AtomicU32::new(0),
            fail_first: false,
        });
        let router = Arc::new(Router::new().with_handler("crawl-single-url", handler.clone()));
        let engine = Arc::new(ConsumerEngine::default());

        let (tx, rx) = broadcast::channel(1);
        let queue_clone: Arc<dyn QueueClient> = queue.clone();
        let serve = tokio::spawn(Arc::clone(&engine).serve(queue_clone, router, idempotency, rx));

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        tx.send(Signal::Shutdown).unwrap();
        serve.await.unwrap().unwrap();

        assert!(queue.is_empty());
        assert_eq!(handler.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
