use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use harvester_common::ids::TaskId;
use harvester_protocol::HarvesterTask;

use crate::error::Result;

/// Tracks which URLs have already been submitted for a given feed task, so
/// the scheduler doesn't re-enqueue the same article on every poll.
///
/// Entries expire (`expires_at`); an expired entry is treated the same as an
/// absent one by [`ProcessedUrlStore::is_processed`], so a URL can be
/// re-crawled once its marker ages out.
#[async_trait]
pub trait ProcessedUrlStore: Send + Sync {
    async fn is_processed(&self, task_id: &TaskId, url_hash: &str) -> Result<bool>;

    async fn mark_processed(
        &self,
        task_id: &TaskId,
        url_hash: &str,
        url: &str,
        processed_at: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Result<()>;
}

/// A single crawl outcome, indexed by the 8-character URL hash used in the
/// object-store key layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlStateRecord {
    pub url_hash: String,
    pub url: String,
    pub title: Option<String>,
    pub crawled_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub has_content: bool,
    pub content_length: usize,
    pub keywords: Vec<String>,
    pub json_path: Option<String>,
    pub text_path: Option<String>,
    pub pdf_path: Option<String>,
    pub success: bool,
    pub error: Option<String>,
    /// Epoch-seconds expiry, mirroring the processed-URL marker's own `ttl`
    /// attribute; a record past this point is eligible for the table's TTL
    /// sweep and should be treated as absent by readers that care.
    pub ttl: i64,
}

/// Indexes crawl outcomes by `url_hash` so later lookups (and the
/// `/crawl/url_response` style debugging surface) don't need to re-derive
/// object-store keys from scratch.
#[async_trait]
pub trait CrawlStateStore: Send + Sync {
    async fn put(&self, record: CrawlStateRecord) -> Result<()>;
    async fn get(&self, url_hash: &str) -> Result<Option<CrawlStateRecord>>;
}

/// CRUD access to feed task configuration (RSS/site/sitemap definitions).
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn get(&self, task_id: &TaskId) -> Result<Option<HarvesterTask>>;
    async fn put(&self, task: HarvesterTask) -> Result<()>;
    async fn list(&self) -> Result<Vec<HarvesterTask>>;
    async fn list_by_kind(
        &self,
        kind: harvester_protocol::TaskKind,
    ) -> Result<Vec<HarvesterTask>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|t| t.task_kind() == kind)
            .collect())
    }
}

/// A thin adapter over blob storage (S3 or equivalent). Keys are caller-
/// constructed; this trait doesn't know about the crawl key layout.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
    async fn get_bytes(&self, key: &str) -> Result<Vec<u8>>;
    async fn exists(&self, key: &str) -> Result<bool>;
}
