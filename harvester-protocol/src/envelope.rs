//! The job envelope is the wire format carried on the queue. It mirrors the
//! wrapper/command split used on the control surface: a thin envelope naming
//! a `type`, and a payload whose shape depends on that type.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ProtocolError;

/// A single crawl job, as it appears in a queue message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSingleUrlJob {
    pub id: String,
    pub url: Url,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_save_pdf")]
    pub save_pdf: bool,
    #[serde(default)]
    pub retry_count: u32,
}

const fn default_save_pdf() -> bool {
    true
}

/// A parsed, routable job. New job kinds are added here; anything else in
/// the wire envelope's `type` field is rejected as [`ProtocolError::UnknownType`].
#[derive(Debug, Clone)]
pub enum Job {
    CrawlSingleUrl(CrawlSingleUrlJob),
}

impl Job {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CrawlSingleUrl(_) => "crawl-single-url",
        }
    }
}

/// The raw shape of a queue message body, before it's known to be a
/// recognised job kind. `extra` carries whatever fields the concrete job
/// type needs; we re-parse it once `type` is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Value,
}

/// Parses a queue message body into a routable [`Job`].
///
/// # Errors
/// Returns [`ProtocolError::Malformed`] if the body isn't valid JSON or is
/// missing fields the envelope itself requires, and
/// [`ProtocolError::UnknownType`] if `type` doesn't name a job kind this
/// worker knows how to handle.
pub fn parse_job(body: &str) -> Result<Job, ProtocolError> {
    let raw: RawEnvelope =
        serde_json::from_str(body).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    match raw.kind.as_str() {
        "crawl-single-url" => {
            let mut extra = raw.extra;
            if let (Some(id), Some(map)) = (raw.id.clone(), extra.as_object_mut()) {
                map.entry("id").or_insert(serde_json::Value::String(id));
            }
            let job: CrawlSingleUrlJob = serde_json::from_value(extra)
                .map_err(|e| ProtocolError::Malformed(e.to_string()))?;
            Ok(Job::CrawlSingleUrl(job))
        }
        other => Err(ProtocolError::UnknownType(other.to_string())),
    }
}

/// Extracts the idempotency key for a queue message: the envelope's own
/// `id` if present, otherwise the queue provider's message id.
#[must_use]
pub fn idempotency_key(body: &str, provider_message_id: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("id")
                .or_else(|| v.get("event_id"))
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| provider_message_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_crawl_single_url() {
        let body = r#"{"type":"crawl-single-url","id":"abc-1","url":"https://example.com/a","tags":["world"]}"#;
        let job = parse_job(body).expect("should parse");
        match job {
            Job::CrawlSingleUrl(j) => {
                assert_eq!(j.id, "abc-1");
                assert_eq!(j.url.as_str(), "https://example.com/a");
                assert!(j.save_pdf);
                assert_eq!(j.retry_count, 0);
            }
        }
    }

    #[test]
    fn rejects_unknown_type() {
        let body = r#"{"type":"crawl-sitemap","id":"abc-1"}"#;
        match parse_job(body) {
            Err(ProtocolError::UnknownType(t)) => assert_eq!(t, "crawl-sitemap"),
            other => panic!("expected UnknownType, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            parse_job("not json"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn idempotency_key_prefers_envelope_id() {
        let body = r#"{"type":"crawl-single-url","id":"abc-1","url":"https://example.com"}"#;
        assert_eq!(idempotency_key(body, "provider-msg-9"), "abc-1");
    }

    #[test]
    fn idempotency_key_falls_back_to_provider_message_id() {
        let body = r#"{"type":"crawl-single-url","url":"https://example.com"}"#;
        assert_eq!(idempotency_key(body, "provider-msg-9"), "provider-msg-9");
    }
}
