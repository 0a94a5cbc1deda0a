//! Redis pub/sub.

use super::{Broker, Publisher, Subscription};
use crate::error::BrokerError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tracing::debug;

pub struct RedisBroker {
    client: redis::Client,
}

impl RedisBroker {
    /// Parse the URL; no connection is made yet.
    pub fn open(url: &str) -> Result<Self, BrokerError> {
        Ok(Self {
            client: redis::Client::open(url)?,
        })
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn subscribe(&self, topic: &str) -> Result<Subscription, BrokerError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(topic).await?;
        debug!(topic = %topic, "Redis subscription open");
        let stream = pubsub
            .into_on_message()
            .map(|msg| Bytes::copy_from_slice(msg.get_payload_bytes()));
        Ok(stream.boxed())
    }

    async fn publisher(&self) -> Result<Box<dyn Publisher>, BrokerError> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(Box::new(RedisPublisher { conn }))
    }
}

struct RedisPublisher {
    conn: MultiplexedConnection,
}

#[async_trait]
impl Publisher for RedisPublisher {
    async fn publish(&mut self, topic: &str, payload: Bytes) -> Result<(), BrokerError> {
        let _receivers: i64 = self.conn.publish(topic, payload.as_ref()).await?;
        Ok(())
    }
}
