//! Routes a parsed job to the handler registered for its kind.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use harvester_protocol::Job;

use crate::error::{NonRetryableError, QueueError};

/// A single job kind's handling logic.
///
/// Handlers report failures through [`QueueError`]'s Retryable/NonRetryable
/// split; the router doesn't interpret handler errors beyond passing them
/// through, so the single-retry-then-give-up budget lives in the handler
/// itself (see `harvester-crawl`'s single-flight handler for the concrete
/// case this protects).
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: Job) -> Result<(), QueueError>;
}

/// Dispatches jobs to their registered [`JobHandler`] by kind. An
/// unregistered kind is a non-retryable error: resending the same message
/// would hit the same missing route.
#[derive(Clone, Default)]
pub struct Router {
    handlers: HashMap<&'static str, Arc<dyn JobHandler>>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_handler(mut self, kind: &'static str, handler: Arc<dyn JobHandler>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub async fn dispatch(&self, job: Job) -> Result<(), QueueError> {
        let kind = job.kind();
        match self.handlers.get(kind) {
            Some(handler) => handler.handle(job).await,
            None => Err(NonRetryableError::UnknownType(kind.to_string()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvester_protocol::CrawlSingleUrlJob;

    struct AlwaysOk;

    #[async_trait]
    impl JobHandler for AlwaysOk {
        async fn handle(&self, _job: Job) -> Result<(), QueueError> {
            Ok(())
        }
    }

    fn sample_job() -> Job {
        Job::CrawlSingleUrl(CrawlSingleUrlJob {
            id: "abc-1".into(),
            url: "https://example.com".parse().unwrap(),
            tags: vec![],
            save_pdf: true,
            retry_count: 0,
        })
    }

    #[tokio::test]
    async fn dispatches_to_registered_handler() {
        let router = Router::new().with_handler("crawl-single-url", Arc::new(AlwaysOk));
        assert!(router.dispatch(sample_job()).await.is_ok());
    }

    #[tokio::test]
    async fn unregistered_kind_is_non_retryable() {
        let router = Router::new();
        let err = router.dispatch(sample_job()).await.unwrap_err();
        assert!(err.is_non_retryable());
    }
}
