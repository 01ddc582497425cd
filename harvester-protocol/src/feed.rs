//! Feed task configuration, as stored in the task table and surfaced via the
//! config importer and the `POST /crawl/rss` route.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use harvester_common::ids::TaskId;

/// The kind of source a task configures. Only [`TaskKind::Rss`] is processed
/// by the scheduler; `Site` and `Sitemap` are accepted and stored so the
/// config surface and importer stay forward compatible with crawl strategies
/// this worker doesn't run yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    CrawlRss,
    CrawlSite,
    CrawlSitemap,
}

/// Kind-specific configuration. Stored as an opaque JSON blob in the table
/// (`config_data`), typed here for the routes and importer that produce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "task_type", rename_all = "snake_case")]
pub enum HarvesterTask {
    CrawlRss {
        task_id: TaskId,
        #[serde(default)]
        tags: Vec<String>,
        feed_url: String,
        /// Caps how many feed items are processed per cycle. `0` (the
        /// default) means unset/unbounded: every item in the feed is
        /// processed. Any other value processes only the first `n` items
        /// in feed order.
        #[serde(default = "default_max_items")]
        max_items: usize,
        #[serde(default = "default_save_pdf")]
        save_pdf: bool,
    },
    CrawlSite {
        task_id: TaskId,
        #[serde(default)]
        tags: Vec<String>,
        site_url: String,
    },
    CrawlSitemap {
        task_id: TaskId,
        #[serde(default)]
        tags: Vec<String>,
        sitemap_url: String,
    },
}

/// `0` means unbounded (process every item); see the `max_items` field doc.
const fn default_max_items() -> usize {
    0
}

const fn default_save_pdf() -> bool {
    true
}

impl HarvesterTask {
    #[must_use]
    pub const fn task_kind(&self) -> TaskKind {
        match self {
            Self::CrawlRss { .. } => TaskKind::CrawlRss,
            Self::CrawlSite { .. } => TaskKind::CrawlSite,
            Self::CrawlSitemap { .. } => TaskKind::CrawlSitemap,
        }
    }

    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        match self {
            Self::CrawlRss { task_id, .. }
            | Self::CrawlSite { task_id, .. }
            | Self::CrawlSitemap { task_id, .. } => task_id,
        }
    }
}

/// A task row as persisted by the state adapter: [`HarvesterTask`] plus the
/// bookkeeping fields the table itself owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(flatten)]
    pub task: HarvesterTask,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u32,
}

impl TaskRecord {
    #[must_use]
    pub fn new(task: HarvesterTask, now: DateTime<Utc>) -> Self {
        Self {
            task,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }
}

/// Ensures no two tasks in a batch share a task id, mirroring the uniqueness
/// check the config importer and `POST /crawl/rss` both rely on.
///
/// # Errors
/// Returns the first duplicated task id encountered.
pub fn validate_unique_task_ids(tasks: &[HarvesterTask]) -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();
    for task in tasks {
        if !seen.insert(task.task_id().as_str()) {
            return Err(format!("duplicate task id: {}", task.task_id()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_duplicate_task_ids() {
        let a = HarvesterTask::CrawlRss {
            task_id: TaskId::new("reuters").unwrap(),
            tags: vec![],
            feed_url: "https://example.com/rss".into(),
            max_items: 20,
            save_pdf: true,
        };
        let b = HarvesterTask::CrawlSite {
            task_id: TaskId::new("reuters").unwrap(),
            tags: vec![],
            site_url: "https://example.com".into(),
        };
        assert!(validate_unique_task_ids(&[a, b]).is_err());
    }
}
