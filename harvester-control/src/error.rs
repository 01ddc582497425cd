//! Control-surface error mapping: internal error taxonomy to HTTP status.

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl From<harvester_state::StateError> for ControlError {
    fn from(e: harvester_state::StateError) -> Self {
        match e {
            harvester_state::StateError::AlreadyExists(msg) => Self::Conflict(msg),
            harvester_state::StateError::NotFound(msg) => Self::Validation(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<harvester_queue::SystemError> for ControlError {
    fn from(e: harvester_queue::SystemError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<harvester_credential::CredentialError> for ControlError {
    fn from(e: harvester_credential::CredentialError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ControlError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        (status, Json(serde_json::json!({ "status": "error", "detail": message }))).into_response()
    }
}
