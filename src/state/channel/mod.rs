//! Channel registry.
//!
//! One task owns every channel, every membership and every bridge handle.
//! Requests are processed one at a time in arrival order, so a channel's
//! member set never changes while a line is being fanned out to it.
//!
//! Fan-out collects the recipients first and then enqueues to each one;
//! enqueueing is bounded (see [`OutputQueue`](super::output::OutputQueue)),
//! so a stalled client costs the registry at most one short wait.

pub mod modes;
mod types;

pub use modes::{ChannelModes, ModeOutcome};
pub use types::{Channel, ChannelRequest, Membership, MessageKind};

use super::user::{User, UserId};
use crate::bridge::BridgeFactory;
use crate::bridge::broker::Broker;
use crate::error::RegistryError;
use slirc_proto::{Command, Message, Prefix, Response, irc_to_lower};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Modes applied to a channel on creation; the argument is the name
/// without its prefix character.
const SEED_MODES: &str = "+nRP";

/// Bridge topic a new channel starts with: the name after its prefix
/// character, ASCII-lowercased. RFC 1459 folding is only for registry keys.
fn seed_topic(name: &str) -> Option<String> {
    name.get(1..)
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Handle to the channel registry task. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    tx: mpsc::Sender<ChannelRequest>,
}

impl ChannelRegistry {
    /// Spawn the registry. Bridges it starts publish outward on
    /// `<topic><outbound_suffix>`.
    pub fn spawn(server_name: &str, broker: Arc<dyn Broker>, outbound_suffix: &str, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let bridges = BridgeFactory::new(broker, outbound_suffix, tx.downgrade());
        let actor = ChannelActor::new(server_name, bridges);
        tokio::spawn(actor.run(rx));
        Self { tx }
    }

    async fn request(&self, req: ChannelRequest) -> Result<(), RegistryError> {
        self.tx
            .send(req)
            .await
            .map_err(|_| RegistryError::Closed("channel"))
    }

    pub async fn join(&self, user: &Arc<User>, channel: &str) -> Result<(), RegistryError> {
        self.request(ChannelRequest::Join {
            user: Arc::clone(user),
            channel: channel.to_string(),
        })
        .await
    }

    pub async fn leave(&self, user: &Arc<User>, channel: &str, reason: &str) -> Result<(), RegistryError> {
        self.request(ChannelRequest::Leave {
            user: Arc::clone(user),
            channel: channel.to_string(),
            reason: reason.to_string(),
        })
        .await
    }

    pub async fn message(
        &self,
        from: &Arc<User>,
        channel: &str,
        text: &str,
        kind: MessageKind,
    ) -> Result<(), RegistryError> {
        self.request(ChannelRequest::Message {
            from: Arc::clone(from),
            channel: channel.to_string(),
            text: text.to_string(),
            kind,
        })
        .await
    }

    pub async fn mode_query(&self, user: &Arc<User>, channel: &str) -> Result<(), RegistryError> {
        self.request(ChannelRequest::ModeQuery {
            user: Arc::clone(user),
            channel: channel.to_string(),
        })
        .await
    }

    pub async fn mode_change(
        &self,
        user: &Arc<User>,
        channel: &str,
        modes: &str,
        args: &[String],
    ) -> Result<(), RegistryError> {
        self.request(ChannelRequest::ModeChange {
            user: Arc::clone(user),
            channel: channel.to_string(),
            modes: modes.to_string(),
            args: args.to_vec(),
        })
        .await
    }

    pub async fn quit(&self, user: &Arc<User>, reason: &str) -> Result<(), RegistryError> {
        self.request(ChannelRequest::Quit {
            user: Arc::clone(user),
            reason: reason.to_string(),
        })
        .await
    }
}

async fn deliver(recipients: Vec<Arc<User>>, msg: Arc<Message>) {
    for user in recipients {
        user.send(Arc::clone(&msg)).await;
    }
}

/// The task-owned state.
struct ChannelActor {
    server: Prefix,
    channels: HashMap<String, Channel>,
    members: HashMap<UserId, Membership>,
    bridges: BridgeFactory,
}

impl ChannelActor {
    fn new(server_name: &str, bridges: BridgeFactory) -> Self {
        Self {
            server: Prefix::ServerName(server_name.to_string()),
            channels: HashMap::new(),
            members: HashMap::new(),
            bridges,
        }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<ChannelRequest>) {
        while let Some(req) = rx.recv().await {
            self.handle_request(req).await;
        }
        debug!("Channel registry stopped");
    }

    async fn handle_request(&mut self, req: ChannelRequest) {
        match req {
            ChannelRequest::Join { user, channel } => self.join(&user, &channel).await,
            ChannelRequest::Leave {
                user,
                channel,
                reason,
            } => self.leave(&user, &channel, &reason).await,
            ChannelRequest::Message {
                from,
                channel,
                text,
                kind,
            } => self.message(&from, &channel, text, kind).await,
            ChannelRequest::ModeQuery { user, channel } => self.mode_query(&user, &channel).await,
            ChannelRequest::ModeChange {
                user,
                channel,
                modes,
                args,
            } => self.apply_modes(Some(&user), &channel, &modes, &args).await,
            ChannelRequest::Quit { user, reason } => self.quit(&user, &reason).await,
            ChannelRequest::Relay {
                channel,
                prefix,
                text,
            } => self.relay(&channel, prefix, text).await,
            ChannelRequest::BridgeClosed {
                channel,
                generation,
            } => self.bridge_closed(&channel, generation).await,
        }
    }

    fn reply(&self, numeric: Message) -> Message {
        numeric.with_prefix(self.server.clone())
    }

    /// Members of `key`, minus `exclude`.
    fn recipients(&self, key: &str, exclude: Option<UserId>) -> Vec<Arc<User>> {
        let Some(channel) = self.channels.get(key) else {
            return Vec::new();
        };
        channel
            .members
            .iter()
            .filter(|id| Some(**id) != exclude)
            .filter_map(|id| self.members.get(id))
            .map(|m| Arc::clone(&m.user))
            .collect()
    }

    async fn join(&mut self, user: &Arc<User>, name: &str) {
        let key = irc_to_lower(name);
        let created = !self.channels.contains_key(&key);
        let channel = self
            .channels
            .entry(key.clone())
            .or_insert_with(|| Channel::new(name.to_string()));
        if !channel.members.insert(user.id) {
            return;
        }
        let chan_name = channel.name.clone();
        self.members
            .entry(user.id)
            .or_insert_with(|| Membership::new(Arc::clone(user)))
            .channels
            .insert(key.clone());
        if created {
            info!(channel = %chan_name, "Channel created");
        }

        let join = Arc::new(Message::join(chan_name.as_str()).with_prefix(user.prefix.clone()));
        deliver(self.recipients(&key, None), join).await;

        let names = self
            .recipients(&key, None)
            .iter()
            .map(|u| u.nick.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        user.send_message(self.reply(Response::rpl_namreply(&user.nick, &chan_name, &names)))
            .await;
        user.send_message(self.reply(Response::rpl_endofnames(&user.nick, &chan_name)))
            .await;

        if created && let Some(topic) = seed_topic(&chan_name) {
            self.apply_modes(None, &chan_name, SEED_MODES, &[topic]).await;
        }
    }

    async fn leave(&mut self, user: &Arc<User>, name: &str, reason: &str) {
        let key = irc_to_lower(name);
        let Some(channel) = self.channels.get_mut(&key) else {
            user.send_message(self.reply(Response::err_nosuchchannel(&user.nick, name)))
                .await;
            return;
        };
        if !channel.members.remove(&user.id) {
            let chan_name = channel.name.clone();
            user.send_message(self.reply(Response::err_notonchannel(&user.nick, &chan_name)))
                .await;
            return;
        }
        let part = Arc::new(Message::part(channel.name.as_str(), reason).with_prefix(user.prefix.clone()));
        let emptied = channel.members.is_empty();
        self.forget_membership(user.id, &key);

        deliver(self.recipients(&key, None), part).await;
        if emptied {
            self.destroy(&key);
        }
    }

    fn forget_membership(&mut self, id: UserId, key: &str) {
        if let Some(membership) = self.members.get_mut(&id) {
            membership.channels.remove(key);
            if membership.channels.is_empty() {
                self.members.remove(&id);
            }
        }
    }

    fn destroy(&mut self, key: &str) {
        // Dropping the channel drops its bridge handle, which stops the tasks.
        if let Some(channel) = self.channels.remove(key) {
            info!(channel = %channel.name, "Channel destroyed");
        }
    }

    async fn message(&self, from: &Arc<User>, name: &str, text: String, kind: MessageKind) {
        let key = irc_to_lower(name);
        let Some(channel) = self.channels.get(&key) else {
            from.send_message(self.reply(Response::err_nosuchchannel(&from.nick, name)))
                .await;
            return;
        };
        if channel.modes.no_external && !channel.members.contains(&from.id) {
            let reply = self.reply(Response::err_cannotsendtochan(&from.nick, &channel.name));
            from.send_message(reply).await;
            return;
        }

        let command = match kind {
            MessageKind::Privmsg => Command::PRIVMSG(channel.name.clone(), text),
            MessageKind::Notice => Command::NOTICE(channel.name.clone(), text),
        };
        let msg = Arc::new(Message::from(command).with_prefix(from.prefix.clone()));
        if kind == MessageKind::Privmsg
            && channel.modes.publish
            && let Some(bridge) = &channel.bridge
        {
            bridge.forward(Arc::clone(&msg));
        }
        deliver(self.recipients(&key, Some(from.id)), msg).await;
    }

    async fn mode_query(&self, user: &Arc<User>, name: &str) {
        let reply = match self.channels.get(&irc_to_lower(name)) {
            Some(channel) => Response::rpl_channelmodeis(&user.nick, &channel.name, &channel.modes.mode_string()),
            None => Response::err_nosuchchannel(&user.nick, name),
        };
        user.send_message(self.reply(reply)).await;
    }

    /// Apply a mode string. `origin` is `None` for modes the server sets
    /// itself; those are announced under the server prefix.
    async fn apply_modes(&mut self, origin: Option<&Arc<User>>, name: &str, modes: &str, args: &[String]) {
        let key = irc_to_lower(name);
        let Some(channel) = self.channels.get_mut(&key) else {
            if let Some(user) = origin {
                user.send_message(self.reply(Response::err_nosuchchannel(&user.nick, name)))
                    .await;
            }
            return;
        };

        let outcome = channel.modes.apply(modes, args);
        if outcome.topic_changed {
            channel.bridge = None;
            if let Some(topic) = &channel.modes.topic {
                let handle = self
                    .bridges
                    .spawn(&channel.name, topic, channel.modes.bridge_settings());
                info!(channel = %channel.name, topic = %topic, generation = handle.generation(), "Bridge started");
                channel.bridge = Some(handle);
            } else {
                info!(channel = %channel.name, "Bridge stopped");
            }
        } else if let Some(bridge) = &channel.bridge {
            bridge.update(channel.modes.bridge_settings());
        }

        let chan_name = channel.name.clone();
        if !outcome.is_empty() {
            let prefix = origin.map_or_else(|| self.server.clone(), |u| u.prefix.clone());
            let mut params = vec![outcome.flags.clone()];
            params.extend(outcome.args.iter().cloned());
            let msg = Arc::new(Message::from(Command::MODE(chan_name.clone(), params)).with_prefix(prefix));
            deliver(self.recipients(&key, None), msg).await;
        }

        if let Some(user) = origin {
            for c in &outcome.unknown {
                let reply = self.reply(Response::err_unknownmode(&user.nick, &c.to_string()));
                user.send_message(reply).await;
            }
        }
    }

    /// Remove `user` everywhere and tell every co-member exactly once.
    async fn quit(&mut self, user: &Arc<User>, reason: &str) {
        let Some(membership) = self.members.remove(&user.id) else {
            return;
        };

        let mut audience: BTreeMap<UserId, Arc<User>> = BTreeMap::new();
        for key in &membership.channels {
            let Some(channel) = self.channels.get_mut(key) else {
                continue;
            };
            channel.members.remove(&user.id);
            for id in &channel.members {
                if let Some(other) = self.members.get(id) {
                    audience.insert(*id, Arc::clone(&other.user));
                }
            }
            if channel.members.is_empty() {
                self.destroy(key);
            }
        }

        let msg = Arc::new(Message::quit(reason).with_prefix(user.prefix.clone()));
        deliver(audience.into_values().collect(), msg).await;
    }

    async fn relay(&self, name: &str, prefix: Prefix, text: String) {
        let key = irc_to_lower(name);
        let Some(channel) = self.channels.get(&key) else {
            debug!(channel = %name, "Relay for vanished channel");
            return;
        };
        let msg = Message::from(Command::PRIVMSG(channel.name.clone(), text)).with_prefix(prefix);
        deliver(self.recipients(&key, None), Arc::new(msg)).await;
    }

    async fn bridge_closed(&mut self, name: &str, generation: u64) {
        let key = irc_to_lower(name);
        let Some(channel) = self.channels.get_mut(&key) else {
            return;
        };
        if channel.bridge.as_ref().map(|b| b.generation()) != Some(generation) {
            return;
        }
        warn!(channel = %channel.name, generation, "Bridge closed, clearing topic");
        channel.bridge = None;
        channel.modes.topic = None;

        let msg = Message::from(Command::MODE(channel.name.clone(), vec!["-R".to_string()]))
            .with_prefix(self.server.clone());
        deliver(self.recipients(&key, None), Arc::new(msg)).await;
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        for (key, channel) in &self.channels {
            assert!(!channel.members.is_empty(), "{key} is empty");
            for id in &channel.members {
                let membership = self.members.get(id).expect("member without membership");
                assert!(membership.channels.contains(key));
            }
        }
        for (id, membership) in &self.members {
            assert!(!membership.channels.is_empty());
            for key in &membership.channels {
                assert!(self.channels[key].members.contains(id));
            }
        }
    }
}
