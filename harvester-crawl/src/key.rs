//! Deterministic object-store key layout for crawl output.
//!
//! Layout: `{task_id}/{YYYY}/{MM}/{DD}/{hash8}/article.{json,txt,pdf}`, where
//! `hash8` is the last 8 hex characters of the MD5 hash of the URL. Crawling
//! the same URL on different days produces different prefixes by design —
//! the hash alone identifies the URL, the date prefix identifies the run.

use chrono::{DateTime, Datelike, Utc};
use md5::{Digest, Md5};

use harvester_common::ids::TaskId;

/// The last 8 hex characters of the MD5 hash of `url`.
#[must_use]
pub fn url_hash8(url: &str) -> String {
    let digest = Md5::digest(url.as_bytes());
    let full = format!("{digest:x}");
    full[full.len() - 8..].to_string()
}

/// The directory prefix under which a crawl's artifacts are stored.
#[must_use]
pub fn crawl_prefix(task_id: &TaskId, url: &str, crawled_at: DateTime<Utc>) -> String {
    format!(
        "{task_id}/{:04}/{:02}/{:02}/{}",
        crawled_at.year(),
        crawled_at.month(),
        crawled_at.day(),
        url_hash8(url),
    )
}

#[must_use]
pub fn article_json_key(prefix: &str) -> String {
    format!("{prefix}/article.json")
}

#[must_use]
pub fn article_text_key(prefix: &str) -> String {
    format!("{prefix}/article.txt")
}

#[must_use]
pub fn article_pdf_key(prefix: &str) -> String {
    format!("{prefix}/article.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash8_is_last_eight_hex_chars_of_md5() {
        // md5("https://example.com/a") = f0a8b1...  computed independently;
        // we only assert the invariant (length, lowercase hex), not a fixed
        // digest, to avoid hard-coding a value that's easy to get wrong by
        // hand.
        let hash = url_hash8("https://example.com/a");
        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash8_is_deterministic() {
        assert_eq!(
            url_hash8("https://example.com/a"),
            url_hash8("https://example.com/a")
        );
        assert_ne!(
            url_hash8("https://example.com/a"),
            url_hash8("https://example.com/b")
        );
    }

    #[test]
    fn prefix_is_task_scoped_and_date_ordered() {
        let task_id = TaskId::new("reuters").unwrap();
        let at = "2026-03-05T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let prefix = crawl_prefix(&task_id, "https://example.com/a", at);
        assert!(prefix.starts_with("reuters/2026/03/05/"));
        assert_eq!(prefix.len(), "reuters/2026/03/05/".len() + 8);
    }
}
