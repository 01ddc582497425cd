use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, RwLock},
};

use async_trait::async_trait;

use crate::{
    client::{OutboundMessage, QueueAttributes, QueueClient, QueueMessage},
    error::SystemError,
};

#[derive(Debug, Clone)]
struct Entry {
    message: QueueMessage,
    visible: bool,
}

/// An in-memory [`QueueClient`] used by the consumer engine's own tests.
/// Messages become visible immediately (no delay queue); each receive bumps
/// `approximate_receive_count` the same way a real provider would.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueueClient {
    messages: Arc<RwLock<HashMap<String, Entry>>>,
    order: Arc<RwLock<VecDeque<String>>>,
    redrive_max_receive_count: Option<u32>,
}

impl MemoryQueueClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_redrive_max_receive_count(max_receive_count: u32) -> Self {
        Self {
            redrive_max_receive_count: Some(max_receive_count),
            ..Self::default()
        }
    }

    /// Enqueues a message directly, bypassing `send_message`'s delay
    /// handling. Used by tests to seed queue state.
    pub fn seed(&self, message_id: impl Into<String>, body: impl Into<String>) {
        let message_id = message_id.into();
        let message = QueueMessage {
            message_id: message_id.clone(),
            receipt_handle: format!("receipt-{message_id}"),
            body: body.into(),
            approximate_receive_count: 0,
            message_attributes: HashMap::new(),
        };
        self.messages
            .write()
            .unwrap()
            .insert(message_id.clone(), Entry { message, visible: true });
        self.order.write().unwrap().push_back(message_id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.read().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl QueueClient for MemoryQueueClient {
    async fn receive_messages(
        &self,
        max_messages: u32,
        _wait_time_secs: u32,
    ) -> Result<Vec<QueueMessage>, SystemError> {
        let max_messages = crate::client::clamp_max_messages(max_messages) as usize;
        let ids: Vec<String> = self.order.read().unwrap().iter().cloned().collect();

        let mut received = Vec::new();
        let mut messages = self.messages.write().unwrap();
        for id in ids {
            if received.len() >= max_messages {
                break;
            }
            if let Some(entry) = messages.get_mut(&id) {
                if entry.visible {
                    entry.visible = false;
                    entry.message.approximate_receive_count += 1;
                    received.push(entry.message.clone());
                }
            }
        }
        Ok(received)
    }

    async fn delete_message(&self, receipt_handle: &str) -> Result<(), SystemError> {
        let id = receipt_handle
            .strip_prefix("receipt-")
            .unwrap_or(receipt_handle)
            .to_string();
        self.messages.write().unwrap().remove(&id);
        self.order.write().unwrap().retain(|o| o != &id);
        Ok(())
    }

    async fn send_message(&self, message: OutboundMessage) -> Result<(), SystemError> {
        let id = format!("generated-{}", ulid::Ulid::new());
        let entry = Entry {
            message: QueueMessage {
                message_id: id.clone(),
                receipt_handle: format!("receipt-{id}"),
                body: message.body,
                approximate_receive_count: 0,
                message_attributes: message.message_attributes,
            },
            visible: true,
        };
        self.messages.write().unwrap().insert(id.clone(), entry);
        self.order.write().unwrap().push_back(id);
        Ok(())
    }

    async fn change_message_visibility(
        &self,
        receipt_handle: &str,
        _visibility_timeout_secs: u32,
    ) -> Result<(), SystemError> {
        let id = receipt_handle
            .strip_prefix("receipt-")
            .unwrap_or(receipt_handle);
        if let Some(entry) = self.messages.write().unwrap().get_mut(id) {
            entry.visible = true;
        }
        Ok(())
    }

    async fn queue_attributes(&self) -> Result<QueueAttributes, SystemError> {
        let messages = self.messages.read().unwrap();
        let (visible, in_flight) = messages
            .values()
            .fold((0u64, 0u64), |(vis, inf), entry| {
                if entry.visible {
                    (vis + 1, inf)
                } else {
                    (vis, inf + 1)
                }
            });
        Ok(QueueAttributes {
            approximate_number_of_messages: visible,
            approximate_number_of_messages_not_visible: in_flight,
            redrive_max_receive_count: self.redrive_max_receive_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receive_then_delete_removes_message() {
        let client = MemoryQueueClient::new();
        client.seed("m1", r#"{"type":"crawl-single-url"}"#);

        let received = client.receive_messages(10, 0).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].approximate_receive_count, 1);

        client
            .delete_message(&received[0].receipt_handle)
            .await
            .unwrap();
        assert!(client.is_empty());
    }

    #[tokio::test]
    async fn in_flight_messages_are_not_received_again() {
        let client = MemoryQueueClient::new();
        client.seed("m1", "body");
        let first = client.receive_messages(10, 0).await.unwrap();
        assert_eq!(first.len(), 1);

        let second = client.receive_messages(10, 0).await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn change_visibility_makes_message_receivable_again() {
        let client = MemoryQueueClient::new();
        client.seed("m1", "body");
        let first = client.receive_messages(10, 0).await.unwrap();
        client
            .change_message_visibility(&first[0].receipt_handle, 0)
            .await
            .unwrap();

        let second = client.receive_messages(10, 0).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].approximate_receive_count, 2);
    }
}
