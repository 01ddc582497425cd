pub mod envelope;
pub mod error;
pub mod feed;

pub use envelope::{idempotency_key, parse_job, CrawlSingleUrlJob, Job};
pub use error::ProtocolError;
pub use feed::{HarvesterTask, TaskKind, TaskRecord};
