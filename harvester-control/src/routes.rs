//! Route handlers for the operator-facing control surface.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use harvester_common::ids::TaskId;
use harvester_protocol::HarvesterTask;
use harvester_queue::OutboundMessage;
use serde::{Deserialize, Serialize};

use crate::error::ControlError;
use crate::state::ControlState;

#[must_use]
pub fn router(state: ControlState) -> Router {
    Router::new()
        .route("/sqs/status", get(sqs_status))
        .route("/sqs/pause", get(sqs_pause))
        .route("/sqs/resume", get(sqs_resume))
        .route("/sqs/send_message", post(sqs_send_message))
        .route("/crawl/url", post(crawl_url))
        .route("/crawl/url_response", post(crawl_url_response))
        .route("/crawl/rss", post(crawl_rss))
        .route("/bedrock/token", get(bedrock_token))
        .route("/health", get(health))
        .with_state(state)
}

async fn sqs_status(
    State(state): State<ControlState>,
) -> Result<Json<harvester_queue::ConsumerStatus>, ControlError> {
    Ok(Json(state.consumer.status(state.queue.as_ref()).await?))
}

async fn sqs_pause(
    State(state): State<ControlState>,
) -> Result<Json<harvester_queue::ConsumerStatus>, ControlError> {
    state.consumer.pause();
    Ok(Json(state.consumer.status(state.queue.as_ref()).await?))
}

async fn sqs_resume(
    State(state): State<ControlState>,
) -> Result<Json<harvester_queue::ConsumerStatus>, ControlError> {
    state.consumer.resume();
    Ok(Json(state.consumer.status(state.queue.as_ref()).await?))
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    body: String,
    #[serde(default)]
    message_attributes: std::collections::HashMap<String, String>,
    #[serde(default)]
    delay_secs: u64,
}

#[derive(Debug, Serialize)]
struct SendMessageResponse {
    status: &'static str,
}

async fn sqs_send_message(
    State(state): State<ControlState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ControlError> {
    state
        .queue
        .send_message(OutboundMessage {
            body: req.body,
            message_attributes: req.message_attributes,
            delay_secs: req.delay_secs,
        })
        .await?;
    Ok(Json(SendMessageResponse { status: "sent" }))
}

#[derive(Debug, Deserialize)]
struct CrawlUrlRequest {
    id: Option<String>,
    url: url::Url,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_true")]
    save_pdf: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct CrawlUrlResponse {
    status: &'static str,
    message: String,
}

async fn crawl_url(
    State(state): State<ControlState>,
    Json(req): Json<CrawlUrlRequest>,
) -> Result<Json<CrawlUrlResponse>, ControlError> {
    let id = req.id.unwrap_or_else(|| req.url.to_string());
    let body = serde_json::json!({
        "type": "crawl-single-url",
        "id": id,
        "url": req.url,
        "tags": req.tags,
        "save_pdf": req.save_pdf,
    })
    .to_string();

    let mut attributes = std::collections::HashMap::new();
    attributes.insert("MessageType".to_string(), "crawl-single-url".to_string());

    state
        .queue
        .send_message(OutboundMessage {
            body,
            message_attributes: attributes,
            delay_secs: 0,
        })
        .await?;

    Ok(Json(CrawlUrlResponse {
        status: "queued",
        message: format!("URL '{}' queued for crawling", req.url),
    }))
}

/// Runs the extractor synchronously and returns the article without
/// persisting anything; unlike `/crawl/url` this never touches the queue
/// or the object store.
async fn crawl_url_response(
    State(state): State<ControlState>,
    Json(req): Json<CrawlUrlRequest>,
) -> Result<Json<harvester_crawl::ExtractedArticle>, ControlError> {
    let article = state
        .extractor
        .extract(&req.url)
        .await
        .map_err(|e| ControlError::Internal(e.to_string()))?;
    Ok(Json(article))
}

#[derive(Debug, Deserialize)]
struct CrawlRssRequest {
    id: String,
    #[serde(default)]
    tags: Vec<String>,
    feed_url: String,
    /// `0` (the default) means unbounded: process every feed item.
    #[serde(default = "default_max_items")]
    max_items: usize,
    #[serde(default = "default_true")]
    save_pdf: bool,
}

/// `0` means unbounded; matches [`harvester_protocol::feed`]'s own default.
const fn default_max_items() -> usize {
    0
}

#[derive(Debug, Serialize)]
struct CrawlRssResponse {
    status: &'static str,
    message: String,
}

async fn crawl_rss(
    State(state): State<ControlState>,
    Json(req): Json<CrawlRssRequest>,
) -> Result<Json<CrawlRssResponse>, ControlError> {
    let task_id = TaskId::new(req.id.clone())
        .map_err(|e| ControlError::Validation(e.to_string()))?;

    if state.tasks.get(&task_id).await?.is_some() {
        return Err(ControlError::Conflict(format!(
            "Task with ID '{}' already exists. Use a unique task ID.",
            req.id
        )));
    }

    let task = HarvesterTask::CrawlRss {
        task_id,
        tags: req.tags,
        feed_url: req.feed_url,
        max_items: req.max_items,
        save_pdf: req.save_pdf,
    };
    state.tasks.put(task).await?;

    Ok(Json(CrawlRssResponse {
        status: "success",
        message: format!("RSS crawl task '{}' added successfully", req.id),
    }))
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    token: String,
}

async fn bedrock_token(
    State(state): State<ControlState>,
) -> Result<Json<TokenResponse>, ControlError> {
    let credential = state.credential.current().await?;
    Ok(Json(TokenResponse {
        token: credential.token,
    }))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: chrono::DateTime<Utc>,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_message_request_defaults_delay_to_zero() {
        let req: SendMessageRequest = serde_json::from_str(r#"{"body":"hi"}"#).unwrap();
        assert_eq!(req.delay_secs, 0);
        assert!(req.message_attributes.is_empty());
    }
}
