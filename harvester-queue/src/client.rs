//! The queue provider boundary. Implementations of [`QueueClient`] are thin
//! adapters over a concrete provider (SQS or equivalent); this crate only
//! depends on the trait.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::SystemError;

/// A message as received from the queue, plus the provider metadata the
/// consumer needs to act on it (the receipt handle to delete/extend, and the
/// receive count to drive backoff).
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
    pub approximate_receive_count: u32,
    pub message_attributes: HashMap<String, String>,
}

/// Queue attributes surfaced through the control/health surface.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct QueueAttributes {
    pub approximate_number_of_messages: u64,
    pub approximate_number_of_messages_not_visible: u64,
    pub redrive_max_receive_count: Option<u32>,
}

/// A message to be sent or re-sent to the queue.
#[derive(Debug, Clone, Default)]
pub struct OutboundMessage {
    pub body: String,
    pub message_attributes: HashMap<String, String>,
    pub delay_secs: u64,
}

/// Clamps follow the same provider limits a real SQS-style queue enforces:
/// at most 10 messages per receive, wait time between 0 and 20 seconds.
#[must_use]
pub fn clamp_max_messages(requested: u32) -> u32 {
    requested.clamp(1, 10)
}

#[must_use]
pub fn clamp_wait_time_secs(requested: u32) -> u32 {
    requested.clamp(0, 20)
}

/// The queue provider boundary: long-poll receive, delete, re-send, and
/// visibility-timeout management.
#[async_trait]
pub trait QueueClient: Send + Sync {
    async fn receive_messages(
        &self,
        max_messages: u32,
        wait_time_secs: u32,
    ) -> Result<Vec<QueueMessage>, SystemError>;

    async fn delete_message(&self, receipt_handle: &str) -> Result<(), SystemError>;

    async fn send_message(&self, message: OutboundMessage) -> Result<(), SystemError>;

    async fn change_message_visibility(
        &self,
        receipt_handle: &str,
        visibility_timeout_secs: u32,
    ) -> Result<(), SystemError>;

    async fn queue_attributes(&self) -> Result<QueueAttributes, SystemError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_max_messages_to_provider_limits() {
        assert_eq!(clamp_max_messages(0), 1);
        assert_eq!(clamp_max_messages(5), 5);
        assert_eq!(clamp_max_messages(50), 10);
    }

    #[test]
    fn clamps_wait_time_to_provider_limits() {
        assert_eq!(clamp_wait_time_secs(100), 20);
        assert_eq!(clamp_wait_time_secs(0), 0);
    }
}
