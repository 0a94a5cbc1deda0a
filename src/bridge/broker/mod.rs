//! Pub/sub brokers.
//!
//! A bridge needs two independent things from a broker: a subscription to
//! one topic, and a publisher. They are never the same connection, since a
//! Redis connection in subscribe mode cannot publish.

mod memory;
mod redis_pubsub;

pub use self::memory::MemoryBroker;
pub use self::redis_pubsub::RedisBroker;

use crate::error::BrokerError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use std::sync::Arc;

/// Payloads arriving on a subscribed topic. Ends when the subscription is
/// lost.
pub type Subscription = BoxStream<'static, Bytes>;

#[async_trait]
pub trait Broker: Send + Sync {
    /// Open a dedicated subscription to `topic`.
    async fn subscribe(&self, topic: &str) -> Result<Subscription, BrokerError>;

    /// Open a dedicated publishing connection.
    async fn publisher(&self) -> Result<Box<dyn Publisher>, BrokerError>;
}

#[async_trait]
pub trait Publisher: Send {
    async fn publish(&mut self, topic: &str, payload: Bytes) -> Result<(), BrokerError>;
}

/// Pick a broker implementation from a configured URL.
///
/// `memory` selects the in-process broker; `redis://` and `unix://` URLs
/// select Redis. Nothing is dialled until the first subscription.
pub fn connect(url: &str) -> Result<Arc<dyn Broker>, BrokerError> {
    if url == "memory" {
        return Ok(Arc::new(MemoryBroker::new()));
    }
    if url.starts_with("redis://") || url.starts_with("unix://") {
        return Ok(Arc::new(RedisBroker::open(url)?));
    }
    Err(BrokerError::UnsupportedUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_picks_implementation() {
        assert!(connect("memory").is_ok());
        assert!(connect("redis://127.0.0.1:6379").is_ok());
        assert!(matches!(
            connect("amqp://localhost"),
            Err(BrokerError::UnsupportedUrl(_))
        ));
    }
}
