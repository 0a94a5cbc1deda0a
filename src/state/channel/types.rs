//! Channel registry types.

use super::modes::ChannelModes;
use crate::bridge::BridgeHandle;
use crate::state::user::{User, UserId};
use slirc_proto::Prefix;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// PRIVMSG or NOTICE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Privmsg,
    Notice,
}

/// Requests served by the channel registry.
///
/// Channel names are passed as typed; the registry folds case itself.
#[derive(Debug)]
pub enum ChannelRequest {
    Join {
        user: Arc<User>,
        channel: String,
    },
    Leave {
        user: Arc<User>,
        channel: String,
        reason: String,
    },
    Message {
        from: Arc<User>,
        channel: String,
        text: String,
        kind: MessageKind,
    },
    ModeQuery {
        user: Arc<User>,
        channel: String,
    },
    ModeChange {
        user: Arc<User>,
        channel: String,
        modes: String,
        args: Vec<String>,
    },
    /// Remove the user from every channel; not keyed by channel.
    Quit {
        user: Arc<User>,
        reason: String,
    },
    /// A line produced by a bridge subscriber.
    Relay {
        channel: String,
        prefix: Prefix,
        text: String,
    },
    /// A bridge lost its subscription.
    BridgeClosed {
        channel: String,
        generation: u64,
    },
}

/// A live channel. Exists only while it has members.
#[derive(Debug)]
pub struct Channel {
    /// Name as first joined.
    pub name: String,
    pub members: BTreeSet<UserId>,
    pub modes: ChannelModes,
    pub bridge: Option<BridgeHandle>,
}

impl Channel {
    pub fn new(name: String) -> Self {
        Self {
            name,
            members: BTreeSet::new(),
            modes: ChannelModes::default(),
            bridge: None,
        }
    }
}

/// The channels one user is in, keyed by folded name.
#[derive(Debug)]
pub struct Membership {
    pub user: Arc<User>,
    pub channels: HashSet<String>,
}

impl Membership {
    pub fn new(user: Arc<User>) -> Self {
        Self {
            user,
            channels: HashSet::new(),
        }
    }
}
