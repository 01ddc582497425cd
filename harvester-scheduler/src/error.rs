use thiserror::Error;

/// Errors raised while fetching or parsing a feed. A single task's failure
/// here never aborts the scheduling loop; it's logged and the next task
/// still runs.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to fetch feed {url}: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },

    #[error("failed to parse feed {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("state error: {0}")]
    State(#[from] harvester_state::StateError),

    #[error("queue error: {0}")]
    Queue(#[from] harvester_queue::SystemError),
}
