//! The extraction boundary.
//!
//! Turning a fetched page into structured article content is driven by a
//! downstream LLM and isn't implemented in this crate; callers supply an
//! [`ArticleExtractor`] and this crate only owns what happens to its output:
//! the single-flight gate, key layout, persistence order, and state index.

use async_trait::async_trait;
use url::Url;

use crate::error::CrawlError;

/// A single extracted article, mirroring the shape persisted as
/// `article.json`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ExtractedArticle {
    pub title: Option<String>,
    pub body: String,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Rendered PDF capture of the page, if the extractor produced one.
    #[serde(skip)]
    pub pdf: Option<Vec<u8>>,
}

#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    async fn extract(&self, url: &Url) -> Result<ExtractedArticle, CrawlError>;
}
