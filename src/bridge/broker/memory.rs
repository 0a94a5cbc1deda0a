//! In-process broker.
//!
//! Topics are broadcast channels created on first use. Publishing to a
//! topic nobody listens on drops the payload, as Redis does.

use super::{Broker, Publisher, Subscription};
use crate::error::BrokerError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

const TOPIC_CAPACITY: usize = 256;

type Topics = Arc<Mutex<HashMap<String, broadcast::Sender<Bytes>>>>;

#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    topics: Topics,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish without going through a [`Publisher`]. Returns the number
    /// of subscriptions reached.
    pub fn broadcast(&self, topic: &str, payload: impl Into<Bytes>) -> usize {
        match self.topics.lock().get(topic) {
            Some(tx) => tx.send(payload.into()).unwrap_or(0),
            None => 0,
        }
    }

    /// Live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .get(topic)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<Bytes> {
        self.topics
            .lock()
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn subscribe(&self, topic: &str) -> Result<Subscription, BrokerError> {
        let rx = self.sender(topic).subscribe();
        let stream = stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(payload) => return Some((payload, rx)),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(stream.boxed())
    }

    async fn publisher(&self) -> Result<Box<dyn Publisher>, BrokerError> {
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl Publisher for MemoryBroker {
    async fn publish(&mut self, topic: &str, payload: Bytes) -> Result<(), BrokerError> {
        self.broadcast(topic, payload);
        Ok(())
    }
}
