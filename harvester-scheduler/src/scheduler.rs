//! The RSS scheduling loop: on a fixed interval, walks every configured feed
//! task, fetches its feed, skips URLs already seen, and enqueues the rest as
//! `crawl-single-url` jobs.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use harvester_common::{internal, Signal};
use harvester_protocol::{HarvesterTask, TaskKind};
use harvester_queue::{OutboundMessage, QueueClient};
use harvester_state::{ProcessedUrlStore, TaskStore};
use harvester_tracing::traced;
use md5::{Digest, Md5};
use serde::Deserialize;

use crate::error::SchedulerError;
use crate::feed::fetch_feed;

const fn default_interval_secs() -> u64 {
    600
}

const fn default_processed_url_ttl_days() -> i64 {
    30
}

fn full_url_hash(url: &str) -> String {
    format!("{:x}", Md5::digest(url.as_bytes()))
}

fn short_url_hash(url: &str) -> String {
    let full = full_url_hash(url);
    full[full.len() - 8..].to_string()
}

/// Configuration and runtime state for the periodic feed scheduler.
#[derive(Debug, Deserialize)]
pub struct RssScheduler {
    /// How often to walk the task table and poll every feed (in seconds).
    /// Matches the Python worker's default 600s (10 minute) cadence.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Whether to consult [`ProcessedUrlStore`] before enqueuing an item.
    /// Disabling this re-enqueues every item on every poll; only useful for
    /// feeds an operator deliberately wants replayed.
    #[serde(default = "default_true")]
    pub track_processed_urls: bool,

    /// How long a processed-URL marker is honoured before the URL becomes
    /// eligible for re-crawling.
    #[serde(default = "default_processed_url_ttl_days")]
    pub processed_url_ttl_days: i64,
}

const fn default_true() -> bool {
    true
}

impl Default for RssScheduler {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            track_processed_urls: default_true(),
            processed_url_ttl_days: default_processed_url_ttl_days(),
        }
    }
}

impl RssScheduler {
    /// Runs the polling loop until a shutdown signal is received.
    ///
    /// # Errors
    /// Never returns an error from a single task's failure; those are
    /// logged and the loop continues. Only propagates if the shutdown
    /// channel itself is dropped in an unexpected way, which is treated the
    /// same as a shutdown signal.
    #[traced(instrument(level = harvester_common::tracing::Level::TRACE, skip_all))]
    pub async fn serve(
        self: Arc<Self>,
        tasks: Arc<dyn TaskStore>,
        processed_urls: Arc<dyn ProcessedUrlStore>,
        queue: Arc<dyn QueueClient>,
        mut shutdown: tokio::sync::broadcast::Receiver<Signal>,
    ) -> Result<(), SchedulerError> {
        internal!(
            "RSS scheduler starting with interval {}s",
            self.interval_secs
        );

        let mut timer = tokio::time::interval(Duration::from_secs(self.interval_secs));

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    let processed = self.run_once(&tasks, &processed_urls, &queue).await;
                    internal!("RSS scheduling cycle queued {processed} item(s)");
                }
                sig = shutdown.recv() => {
                    match sig {
                        Ok(Signal::Shutdown | Signal::Finalised) | Err(_) => {
                            internal!("RSS scheduler received shutdown signal");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Runs a single scheduling pass over every `crawl_rss` task, returning
    /// the number of items successfully enqueued.
    pub async fn run_once(
        &self,
        tasks: &Arc<dyn TaskStore>,
        processed_urls: &Arc<dyn ProcessedUrlStore>,
        queue: &Arc<dyn QueueClient>,
    ) -> usize {
        let task_list = match tasks.list_by_kind(TaskKind::CrawlRss).await {
            Ok(list) => list,
            Err(e) => {
                harvester_common::tracing::error!("Failed to list RSS tasks: {e}");
                return 0;
            }
        };

        let mut total = 0;
        for task in task_list {
            match self.process_task(&task, processed_urls, queue).await {
                Ok(count) => total += count,
                Err(e) => {
                    harvester_common::tracing::error!(
                        "Error processing feed task {}: {e}",
                        task.task_id()
                    );
                }
            }
        }
        total
    }

    async fn process_task(
        &self,
        task: &HarvesterTask,
        processed_urls: &Arc<dyn ProcessedUrlStore>,
        queue: &Arc<dyn QueueClient>,
    ) -> Result<usize, SchedulerError> {
        let HarvesterTask::CrawlRss {
            task_id,
            tags,
            feed_url,
            max_items,
            save_pdf,
        } = task
        else {
            return Ok(0);
        };

        let items = fetch_feed(feed_url, *max_items).await?;
        if items.is_empty() {
            harvester_common::tracing::warn!("No items found in feed for task {task_id}");
            return Ok(0);
        }

        let mut queued = 0;
        for item in items {
            let url_hash = full_url_hash(&item.link);

            if self.track_processed_urls
                && processed_urls.is_processed(task_id, &url_hash).await?
            {
                harvester_common::tracing::debug!("Skipping already processed URL: {}", item.link);
                continue;
            }

            let item_id = format!("{task_id}-{}", short_url_hash(&item.link));
            let body = serde_json::json!({
                "type": "crawl-single-url",
                "id": item_id,
                "url": item.link,
                "tags": tags,
                "save_pdf": save_pdf,
            })
            .to_string();

            let mut attributes = std::collections::HashMap::new();
            attributes.insert("MessageType".to_string(), "crawl-single-url".to_string());
            attributes.insert("Source".to_string(), "rss-scheduler".to_string());
            attributes.insert("TaskId".to_string(), task_id.to_string());

            queue
                .send_message(OutboundMessage {
                    body,
                    message_attributes: attributes,
                    delay_secs: 0,
                })
                .await?;

            if self.track_processed_urls {
                processed_urls
                    .mark_processed(
                        task_id,
                        &url_hash,
                        &item.link,
                        Utc::now(),
                        chrono::Duration::days(self.processed_url_ttl_days),
                    )
                    .await?;
            }

            queued += 1;
        }

        Ok(queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hash_is_suffix_of_full_hash() {
        let full = full_url_hash("https://example.com/a");
        let short = short_url_hash("https://example.com/a");
        assert!(full.ends_with(&short));
        assert_eq!(short.len(), 8);
    }
}
