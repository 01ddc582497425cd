//! Shared state injected into every control-surface handler.

use std::sync::Arc;

use harvester_crawl::ArticleExtractor;
use harvester_credential::CredentialRefresher;
use harvester_queue::{ConsumerEngine, QueueClient};
use harvester_state::TaskStore;

#[derive(Clone)]
pub struct ControlState {
    pub consumer: Arc<ConsumerEngine>,
    pub queue: Arc<dyn QueueClient>,
    pub tasks: Arc<dyn TaskStore>,
    pub credential: Arc<CredentialRefresher>,
    pub extractor: Arc<dyn ArticleExtractor>,
}
