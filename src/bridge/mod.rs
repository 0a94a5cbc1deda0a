//! Broker bridges.
//!
//! A bridged channel runs two tasks: a subscriber relaying topic payloads
//! into the channel, and a publisher republishing channel chat to the
//! outbound topic. Both are owned by a [`BridgeHandle`] held by the channel
//! registry; dropping the handle stops them.
//!
//! The subscriber reports back only through a weak sender, so a bridge
//! never keeps the registry alive.

pub mod broker;
pub mod payload;

use self::broker::{Broker, Publisher};
use self::payload::{BRIDGE_HOST, BRIDGE_USER};
use crate::state::ChannelRequest;
use futures_util::StreamExt;
use slirc_proto::{Command, Message, Prefix};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

/// Lines waiting to be republished before new ones are dropped.
const OUTBOUND_CAPACITY: usize = 256;

/// Channel modes a running bridge reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeSettings {
    pub json: bool,
    pub nick_path: Option<String>,
    pub text_path: Option<String>,
    pub publish: bool,
}

/// Starts bridges for the channel registry.
///
/// Every bridge gets a fresh generation so that a late close notice from a
/// replaced bridge can be told apart from the current one.
pub struct BridgeFactory {
    broker: Arc<dyn Broker>,
    outbound_suffix: String,
    registry: mpsc::WeakSender<ChannelRequest>,
    next_generation: u64,
}

impl BridgeFactory {
    pub fn new(
        broker: Arc<dyn Broker>,
        outbound_suffix: &str,
        registry: mpsc::WeakSender<ChannelRequest>,
    ) -> Self {
        Self {
            broker,
            outbound_suffix: outbound_suffix.to_string(),
            registry,
            next_generation: 1,
        }
    }

    /// Start bridging `channel` to `topic`.
    pub fn spawn(&mut self, channel: &str, topic: &str, settings: BridgeSettings) -> BridgeHandle {
        let generation = self.next_generation;
        self.next_generation += 1;

        let span = crate::telemetry::spans::bridge(channel, topic, generation);
        let (settings_tx, settings_rx) = watch::channel(settings);
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);

        let subscriber = tokio::spawn(
            subscribe_loop(
                Arc::clone(&self.broker),
                channel.to_string(),
                topic.to_string(),
                generation,
                settings_rx.clone(),
                self.registry.clone(),
            )
            .instrument(span.clone()),
        );
        let publisher = tokio::spawn(
            publish_loop(
                Arc::clone(&self.broker),
                channel.to_string(),
                format!("{topic}{}", self.outbound_suffix),
                settings_rx,
                outbound_rx,
            )
            .instrument(span),
        );

        BridgeHandle {
            generation,
            topic: topic.to_string(),
            settings: settings_tx,
            outbound: outbound_tx,
            subscriber,
            publisher,
        }
    }
}

/// A running bridge. Dropping it aborts both tasks.
#[derive(Debug)]
pub struct BridgeHandle {
    generation: u64,
    topic: String,
    settings: watch::Sender<BridgeSettings>,
    outbound: mpsc::Sender<Arc<Message>>,
    subscriber: JoinHandle<()>,
    publisher: JoinHandle<()>,
}

impl BridgeHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Push changed channel modes; applies from the next payload on.
    pub fn update(&self, settings: BridgeSettings) {
        self.settings.send_replace(settings);
    }

    /// Hand a channel line to the publisher. Never waits.
    pub fn forward(&self, msg: Arc<Message>) {
        if self.outbound.try_send(msg).is_err() {
            warn!(topic = %self.topic, "Bridge publisher backlog full, dropping line");
        }
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        self.subscriber.abort();
        self.publisher.abort();
    }
}

async fn bridge_closed(registry: &mpsc::WeakSender<ChannelRequest>, channel: String, generation: u64) {
    if let Some(tx) = registry.upgrade() {
        let _ = tx
            .send(ChannelRequest::BridgeClosed {
                channel,
                generation,
            })
            .await;
    }
}

async fn subscribe_loop(
    broker: Arc<dyn Broker>,
    channel: String,
    topic: String,
    generation: u64,
    settings: watch::Receiver<BridgeSettings>,
    registry: mpsc::WeakSender<ChannelRequest>,
) {
    let mut subscription = match broker.subscribe(&topic).await {
        Ok(subscription) => subscription,
        Err(e) => {
            warn!(error = %e, "Subscribe failed");
            bridge_closed(&registry, channel, generation).await;
            return;
        }
    };
    info!("Bridge subscribed");

    while let Some(payload) = subscription.next().await {
        let relayed = payload::inbound(&topic, &payload, &settings.borrow());
        let Some(tx) = registry.upgrade() else {
            return;
        };
        let prefix = Prefix::new(relayed.origin.as_str(), BRIDGE_USER, BRIDGE_HOST);
        for line in relayed.lines() {
            let req = ChannelRequest::Relay {
                channel: channel.clone(),
                prefix: prefix.clone(),
                text: line.to_string(),
            };
            if tx.send(req).await.is_err() {
                return;
            }
        }
    }

    info!("Subscription ended");
    bridge_closed(&registry, channel, generation).await;
}

async fn publish_loop(
    broker: Arc<dyn Broker>,
    channel: String,
    topic: String,
    settings: watch::Receiver<BridgeSettings>,
    mut lines: mpsc::Receiver<Arc<Message>>,
) {
    let mut publisher: Option<Box<dyn Publisher>> = None;

    while let Some(msg) = lines.recv().await {
        let Command::PRIVMSG(_, text) = &msg.command else {
            continue;
        };
        let Some(origin) = &msg.prefix else {
            continue;
        };
        // Relayed lines must not loop back out.
        if origin.host() == Some(BRIDGE_HOST) {
            continue;
        }
        let current = settings.borrow().clone();
        if !current.publish {
            continue;
        }

        let nick = origin.nick().unwrap_or_default();
        let body = payload::outbound(nick, text, &channel, &current);

        if publisher.is_none() {
            match broker.publisher().await {
                Ok(p) => publisher = Some(p),
                Err(e) => {
                    warn!(error = %e, "Publisher connection failed");
                    continue;
                }
            }
        }
        if let Some(p) = publisher.as_mut() {
            if let Err(e) = p.publish(&topic, body).await {
                warn!(error = %e, "Publish failed");
                publisher = None;
            } else {
                debug!(topic = %topic, "Published");
            }
        }
    }
}
