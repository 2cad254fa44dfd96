//! Mock publisher implementation for testing.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BusError, PublishedMessage, Publisher, Result};
use crate::envelope::Envelope;

/// Mock publisher that records messages in memory.
#[derive(Default)]
pub struct MockPublisher {
    published: RwLock<Vec<PublishedMessage>>,
    fail_on_publish: RwLock<bool>,
    failing_keys: RwLock<HashSet<String>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_publish(&self, fail: bool) {
        *self.fail_on_publish.write().await = fail;
    }

    /// Fail only publishes with `routing_key`.
    pub async fn fail_on_routing_key(&self, routing_key: &str) {
        self.failing_keys
            .write()
            .await
            .insert(routing_key.to_string());
    }

    pub async fn published_count(&self) -> usize {
        self.published.read().await.len()
    }

    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.published.read().await.clone()
    }

    pub async fn take_published(&self) -> Vec<PublishedMessage> {
        std::mem::take(&mut *self.published.write().await)
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, routing_key: &str, envelope: &Envelope) -> Result<()> {
        if *self.fail_on_publish.read().await
            || self.failing_keys.read().await.contains(routing_key)
        {
            return Err(BusError::Publish(format!(
                "Mock publish failure for '{}'",
                routing_key
            )));
        }
        self.published.write().await.push(PublishedMessage {
            routing_key: routing_key.to_string(),
            envelope: envelope.clone(),
        });
        Ok(())
    }
}
