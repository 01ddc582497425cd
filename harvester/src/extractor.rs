//! A reference [`ArticleExtractor`] for local runs and the default binary.
//!
//! The real extraction step is an LLM-backed, headless-browser pipeline
//! deliberately kept outside this workspace; this implementation only
//! fetches the page and strips markup, enough to exercise the rest of the
//! pipeline (persistence, keying, state indexing) without that dependency.

use async_trait::async_trait;
use harvester_crawl::{ArticleExtractor, CrawlError, ExtractedArticle};
use url::Url;

pub struct FetchExtractor {
    client: reqwest::Client,
}

impl FetchExtractor {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_title(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let start = lower.find("<title>")? + "<title>".len();
    let end = lower[start..].find("</title>")? + start;
    Some(html[start..end].trim().to_string())
}

#[async_trait]
impl ArticleExtractor for FetchExtractor {
    async fn extract(&self, url: &Url) -> Result<ExtractedArticle, CrawlError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| CrawlError::Extraction(e.to_string()))?;

        let html = response
            .text()
            .await
            .map_err(|e| CrawlError::Extraction(e.to_string()))?;

        Ok(ExtractedArticle {
            title: extract_title(&html),
            body: strip_tags(&html),
            published_at: None,
            keywords: Vec::new(),
            pdf: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_and_collapses_whitespace() {
        let html = "<html><body><p>Hello   <b>world</b></p></body></html>";
        assert_eq!(strip_tags(html), "Hello world");
    }

    #[test]
    fn extracts_title_case_insensitively() {
        let html = "<HTML><TITLE> My Article </TITLE></HTML>";
        assert_eq!(extract_title(html), Some("My Article".to_string()));
    }

    #[test]
    fn missing_title_is_none() {
        assert_eq!(extract_title("<html></html>"), None);
    }
}
