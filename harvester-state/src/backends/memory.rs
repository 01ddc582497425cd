use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use harvester_common::ids::TaskId;
use harvester_protocol::HarvesterTask;

use crate::{
    error::{Result, StateError},
    traits::{CrawlStateRecord, CrawlStateStore, ObjectStore, ProcessedUrlStore, TaskStore},
};

#[derive(Debug, Clone)]
struct ProcessedEntry {
    expires_at: DateTime<Utc>,
}

/// In-memory [`ProcessedUrlStore`]. Expiry is checked lazily on read; there's
/// no background sweep, matching how a DynamoDB TTL attribute would behave
/// from the caller's point of view (stale items just stop being visible).
#[derive(Debug, Clone, Default)]
pub struct MemoryProcessedUrlStore {
    entries: Arc<RwLock<HashMap<(String, String), ProcessedEntry>>>,
}

impl MemoryProcessedUrlStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProcessedUrlStore for MemoryProcessedUrlStore {
    async fn is_processed(&self, task_id: &TaskId, url_hash: &str) -> Result<bool> {
        let key = (task_id.to_string(), url_hash.to_string());
        let now = Utc::now();
        Ok(self
            .entries
            .read()?
            .get(&key)
            .is_some_and(|entry| entry.expires_at > now))
    }

    async fn mark_processed(
        &self,
        task_id: &TaskId,
        url_hash: &str,
        _url: &str,
        processed_at: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Result<()> {
        let key = (task_id.to_string(), url_hash.to_string());
        self.entries.write()?.insert(
            key,
            ProcessedEntry {
                expires_at: processed_at + ttl,
            },
        );
        Ok(())
    }
}

/// In-memory [`CrawlStateStore`], keyed by `url_hash`.
#[derive(Debug, Clone, Default)]
pub struct MemoryCrawlStateStore {
    records: Arc<RwLock<HashMap<String, CrawlStateRecord>>>,
}

impl MemoryCrawlStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CrawlStateStore for MemoryCrawlStateStore {
    async fn put(&self, record: CrawlStateRecord) -> Result<()> {
        self.records
            .write()?
            .insert(record.url_hash.clone(), record);
        Ok(())
    }

    async fn get(&self, url_hash: &str) -> Result<Option<CrawlStateRecord>> {
        Ok(self.records.read()?.get(url_hash).cloned())
    }
}

/// In-memory [`TaskStore`], keyed by task id.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    tasks: Arc<RwLock<HashMap<String, HarvesterTask>>>,
}

impl MemoryTaskStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn get(&self, task_id: &TaskId) -> Result<Option<HarvesterTask>> {
        Ok(self.tasks.read()?.get(task_id.as_str()).cloned())
    }

    async fn put(&self, task: HarvesterTask) -> Result<()> {
        self.tasks
            .write()?
            .insert(task.task_id().to_string(), task);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<HarvesterTask>> {
        Ok(self.tasks.read()?.values().cloned().collect())
    }
}

/// In-memory [`ObjectStore`], with an optional capacity limit. Production
/// deployments point this trait at object storage instead; this backend
/// exists for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    capacity: Option<usize>,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            capacity: Some(capacity),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_bytes(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        if let Some(cap) = self.capacity {
            let len = self.objects.read()?.len();
            if !self.objects.read()?.contains_key(key) && len >= cap {
                return Err(StateError::CapacityExceeded(len, cap));
            }
        }
        self.objects.write()?.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get_bytes(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .read()?
            .get(key)
            .cloned()
            .ok_or_else(|| StateError::NotFound(key.to_string()))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.read()?.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn processed_url_marker_expires() {
        let store = MemoryProcessedUrlStore::new();
        let task_id = TaskId::new("reuters").unwrap();
        let now = Utc::now();

        assert!(!store.is_processed(&task_id, "abcd1234").await.unwrap());

        store
            .mark_processed(&task_id, "abcd1234", "https://example.com", now, chrono::Duration::seconds(-1))
            .await
            .unwrap();
        // Already expired TTL: should read as not processed.
        assert!(!store.is_processed(&task_id, "abcd1234").await.unwrap());

        store
            .mark_processed(&task_id, "abcd1234", "https://example.com", now, chrono::Duration::days(30))
            .await
            .unwrap();
        assert!(store.is_processed(&task_id, "abcd1234").await.unwrap());
    }

    #[tokio::test]
    async fn object_store_capacity_limit() {
        let store = MemoryObjectStore::with_capacity(1);
        store.put_bytes("a", vec![1]).await.unwrap();
        assert!(store.put_bytes("b", vec![2]).await.is_err());
        // Overwriting an existing key doesn't count against capacity.
        store.put_bytes("a", vec![3]).await.unwrap();
        assert_eq!(store.get_bytes("a").await.unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn task_store_round_trip() {
        let store = MemoryTaskStore::new();
        let task = HarvesterTask::CrawlRss {
            task_id: TaskId::new("reuters").unwrap(),
            tags: vec!["world".into()],
            feed_url: "https://example.com/rss".into(),
            max_items: 10,
            save_pdf: true,
        };
        store.put(task.clone()).await.unwrap();
        let fetched = store
            .get(&TaskId::new("reuters").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.task_id().as_str(), "reuters");
    }
}
