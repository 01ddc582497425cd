//! Turns a `crawl-single-url` job into persisted article content: the
//! extraction boundary, deterministic object-store key layout, and the
//! handler that wires them into the queue consumer.

pub mod error;
pub mod extractor;
pub mod handler;
pub mod key;

pub use error::CrawlError;
pub use extractor::{ArticleExtractor, ExtractedArticle};
pub use handler::CrawlHandler;
