//! Typed error handling for queue consumption and message handling.
//!
//! Distinguishes between:
//! - Retryable failures - re-enqueued with backoff
//! - Non-retryable failures - dropped (eventually reaching the DLQ via the
//!   provider's redrive policy once `max_attempts` is exceeded)
//! - System errors - internal/provider errors, not part of message semantics

use thiserror::Error;

/// Top-level queue error type.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("retryable failure: {0}")]
    Retryable(#[from] RetryableError),

    #[error("non-retryable failure: {0}")]
    NonRetryable(#[from] NonRetryableError),

    #[error("system error: {0}")]
    System(#[from] SystemError),
}

/// A failure that should be retried with backoff.
///
/// `updated_body` lets a handler carry state forward into the resent
/// message (e.g. an incremented retry counter) rather than the consumer
/// blindly resending the original body.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct RetryableError {
    pub reason: String,
    pub updated_body: Option<String>,
}

impl RetryableError {
    #[must_use]
    pub fn transient(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            updated_body: None,
        }
    }

    #[must_use]
    pub fn dependency_unavailable(reason: impl Into<String>) -> Self {
        Self {
            reason: format!("dependency unavailable: {}", reason.into()),
            updated_body: None,
        }
    }

    #[must_use]
    pub fn with_updated_body(mut self, body: String) -> Self {
        self.updated_body = Some(body);
        self
    }
}

/// Failures that should not be retried: the message is dropped without
/// being resent, since resending it would fail the same way.
#[derive(Debug, Error)]
pub enum NonRetryableError {
    #[error("message body is not valid JSON: {0}")]
    InvalidBody(String),

    #[error("unknown job type: {0}")]
    UnknownType(String),

    #[error("handler exhausted its retry budget: {0}")]
    RetryBudgetExhausted(String),
}

/// Internal/provider errors unrelated to message content.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("queue provider error: {0}")]
    Provider(String),

    #[error("consumer not initialized: {0}")]
    NotInitialized(String),
}

impl QueueError {
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }

    #[must_use]
    pub const fn is_non_retryable(&self) -> bool {
        matches!(self, Self::NonRetryable(_))
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self, Self::System(_))
    }
}

impl From<harvester_protocol::ProtocolError> for QueueError {
    fn from(error: harvester_protocol::ProtocolError) -> Self {
        match error {
            harvester_protocol::ProtocolError::Malformed(msg) => {
                Self::NonRetryable(NonRetryableError::InvalidBody(msg))
            }
            harvester_protocol::ProtocolError::UnknownType(t) => {
                Self::NonRetryable(NonRetryableError::UnknownType(t))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorizes_correctly() {
        let err = QueueError::from(RetryableError::transient("boom"));
        assert!(err.is_retryable());
        assert!(!err.is_non_retryable());
        assert!(!err.is_system());
    }

    #[test]
    fn protocol_malformed_is_non_retryable() {
        let err: QueueError = harvester_protocol::ProtocolError::Malformed("bad json".into()).into();
        assert!(err.is_non_retryable());
    }

    #[test]
    fn protocol_unknown_type_is_non_retryable() {
        let err: QueueError =
            harvester_protocol::ProtocolError::UnknownType("crawl-sitemap".into()).into();
        assert!(err.is_non_retryable());
    }
}
