pub mod backends;
pub mod error;
pub mod traits;

pub use error::{Result, StateError};
pub use traits::{CrawlStateRecord, CrawlStateStore, ObjectStore, ProcessedUrlStore, TaskStore};
