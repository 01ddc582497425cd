//! The `crawl-single-url` job handler.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use harvester_common::ids::TaskId;
use harvester_protocol::{CrawlSingleUrlJob, Job};
use harvester_queue::{JobHandler, NonRetryableError, QueueError, RetryableError};
use harvester_state::{CrawlStateRecord, CrawlStateStore, ObjectStore};
use tokio::sync::Semaphore;

use crate::{extractor::ArticleExtractor, key};

/// Allow exactly one retry per job before giving up, matching the
/// extraction pipeline's own one-shot retry budget.
const MAX_HANDLER_ATTEMPTS: u32 = 1;

/// How long an indexed crawl outcome is kept before the state table's TTL
/// sweep can reclaim it. Matches the processed-URL marker's own default.
const CRAWL_STATE_TTL_DAYS: i64 = 30;

/// Handles `crawl-single-url` jobs: runs extraction behind a single-flight
/// gate, persists the result in `json -> text -> pdf -> index` order, and
/// enforces a one-retry-then-give-up budget independent of the provider's
/// own receive-count-driven backoff.
pub struct CrawlHandler {
    extractor: Arc<dyn ArticleExtractor>,
    object_store: Arc<dyn ObjectStore>,
    crawl_state: Arc<dyn CrawlStateStore>,
    /// Crawling is expensive (one in-flight browser session) so only one
    /// extraction runs at a time, regardless of the consumer's own
    /// concurrency setting.
    single_flight: Arc<Semaphore>,
}

impl CrawlHandler {
    #[must_use]
    pub fn new(
        extractor: Arc<dyn ArticleExtractor>,
        object_store: Arc<dyn ObjectStore>,
        crawl_state: Arc<dyn CrawlStateStore>,
    ) -> Self {
        Self {
            extractor,
            object_store,
            crawl_state,
            single_flight: Arc::new(Semaphore::new(1)),
        }
    }

    async fn crawl_and_persist(&self, job: &CrawlSingleUrlJob) -> Result<(), crate::error::CrawlError> {
        let _permit = self
            .single_flight
            .acquire()
            .await
            .expect("semaphore is never closed");

        harvester_common::internal!("Starting crawl for {}", job.url);
        let article = self.extractor.extract(&job.url).await?;

        if article.body.trim().is_empty() {
            return Err(crate::error::CrawlError::NoContent);
        }

        let now = Utc::now();
        // job.id is "{task_id}-{hash8}"; the task id is whatever precedes
        // the last hyphen-delimited hash segment the scheduler generated.
        let task_id = TaskId::new(task_id_from_job_id(&job.id)).unwrap_or_else(|_| {
            TaskId::new("unscoped").expect("static id is always valid")
        });
        let prefix = key::crawl_prefix(&task_id, job.url.as_str(), now);

        let json_bytes = serde_json::to_vec_pretty(&article).map_err(|e| {
            crate::error::CrawlError::Extraction(format!("failed to serialize article: {e}"))
        })?;
        self.object_store
            .put_bytes(&key::article_json_key(&prefix), json_bytes)
            .await?;

        self.object_store
            .put_bytes(
                &key::article_text_key(&prefix),
                article.body.clone().into_bytes(),
            )
            .await?;

        let mut pdf_path = None;
        if job.save_pdf {
            if let Some(pdf) = &article.pdf {
                self.object_store
                    .put_bytes(&key::article_pdf_key(&prefix), pdf.clone())
                    .await?;
                pdf_path = Some(key::article_pdf_key(&prefix));
            }
        }

        self.crawl_state
            .put(CrawlStateRecord {
                url_hash: key::url_hash8(job.url.as_str()),
                url: job.url.to_string(),
                title: article.title,
                crawled_at: now,
                published_at: article.published_at,
                has_content: true,
                content_length: article.body.len(),
                keywords: article.keywords,
                json_path: Some(key::article_json_key(&prefix)),
                text_path: Some(key::article_text_key(&prefix)),
                pdf_path,
                success: true,
                error: None,
                ttl: (now + chrono::Duration::days(CRAWL_STATE_TTL_DAYS)).timestamp(),
            })
            .await?;

        Ok(())
    }
}

fn task_id_from_job_id(job_id: &str) -> &str {
    job_id.rsplit_once('-').map_or(job_id, |(prefix, _hash)| prefix)
}

#[async_trait]
impl JobHandler for CrawlHandler {
    async fn handle(&self, job: Job) -> Result<(), QueueError> {
        let Job::CrawlSingleUrl(job) = job;

        match self.crawl_and_persist(&job).await {
            Ok(()) => Ok(()),
            Err(e) => {
                harvester_common::tracing::error!("Crawl failed for {}: {e}", job.url);

                if job.retry_count < MAX_HANDLER_ATTEMPTS {
                    let mut retried = job.clone();
                    retried.retry_count += 1;
                    let updated_body = serde_json::json!({
                        "type": "crawl-single-url",
                        "id": retried.id,
                        "url": retried.url,
                        "tags": retried.tags,
                        "save_pdf": retried.save_pdf,
                        "retry_count": retried.retry_count,
                    })
                    .to_string();

                    Err(RetryableError::transient(format!("transient crawl error: {e}"))
                        .with_updated_body(updated_body)
                        .into())
                } else {
                    Err(NonRetryableError::RetryBudgetExhausted(format!(
                        "failed to crawl {} after retry: {e}",
                        job.url
                    ))
                    .into())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvester_state::backends::{MemoryCrawlStateStore, MemoryObjectStore};

    struct StubExtractor {
        body: String,
        fail: bool,
    }

    #[async_trait]
    impl ArticleExtractor for StubExtractor {
        async fn extract(
            &self,
            _url: &url::Url,
        ) -> Result<crate::extractor::ExtractedArticle, crate::error::CrawlError> {
            if self.fail {
                return Err(crate::error::CrawlError::Extraction("boom".into()));
            }
            Ok(crate::extractor::ExtractedArticle {
                title: Some("Title".into()),
                body: self.body.clone(),
                published_at: None,
                keywords: vec!["a".into()],
                pdf: None,
            })
        }
    }

    fn sample_job(retry_count: u32) -> CrawlSingleUrlJob {
        CrawlSingleUrlJob {
            id: "reuters-abcd1234".into(),
            url: "https://example.com/a".parse().unwrap(),
            tags: vec![],
            save_pdf: false,
            retry_count,
        }
    }

    #[tokio::test]
    async fn successful_crawl_persists_json_and_text_then_indexes() {
        let object_store = Arc::new(MemoryObjectStore::new());
        let crawl_state = Arc::new(MemoryCrawlStateStore::new());
        let handler = CrawlHandler::new(
            Arc::new(StubExtractor {
                body: "article body".into(),
                fail: false,
            }),
            object_store.clone(),
            crawl_state.clone(),
        );

        let result = handler.handle(Job::CrawlSingleUrl(sample_job(0))).await;
        assert!(result.is_ok());

        let hash = key::url_hash8("https://example.com/a");
        let record = crawl_state.get(&hash).await.unwrap().unwrap();
        assert!(record.success);
        assert_eq!(record.title.as_deref(), Some("Title"));
    }

    #[tokio::test]
    async fn first_failure_is_retryable_with_incremented_retry_count() {
        let object_store = Arc::new(MemoryObjectStore::new());
        let crawl_state = Arc::new(MemoryCrawlStateStore::new());
        let handler = CrawlHandler::new(
            Arc::new(StubExtractor {
                body: String::new(),
                fail: true,
            }),
            object_store,
            crawl_state,
        );

        let err = handler
            .handle(Job::CrawlSingleUrl(sample_job(0)))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        if let QueueError::Retryable(e) = err {
            let body = e.updated_body.expect("should carry an updated body");
            assert!(body.contains("\"retry_count\":1"));
        } else {
            panic!("expected retryable error");
        }
    }

    #[tokio::test]
    async fn second_failure_is_non_retryable() {
        let object_store = Arc::new(MemoryObjectStore::new());
        let crawl_state = Arc::new(MemoryCrawlStateStore::new());
        let handler = CrawlHandler::new(
            Arc::new(StubExtractor {
                body: String::new(),
                fail: true,
            }),
            object_store,
            crawl_state,
        );

        let err = handler
            .handle(Job::CrawlSingleUrl(sample_job(1)))
            .await
            .unwrap_err();
        assert!(err.is_non_retryable());
    }
}
