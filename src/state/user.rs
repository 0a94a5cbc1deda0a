//! Registered users.

use super::output::{Delivery, OutputQueue};
use slirc_proto::{Message, Prefix};
use std::fmt;
use std::sync::Arc;

/// Stable identity of a registered user, unique for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub(crate) u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// A registered participant.
///
/// Created by the nick registry on successful registration and shared by
/// reference; channel membership is tracked by the channel registry, never
/// here.
#[derive(Debug)]
pub struct User {
    pub id: UserId,
    pub nick: String,
    pub prefix: Prefix,
    output: OutputQueue,
}

impl User {
    pub(crate) fn new(id: UserId, nick: String, username: String, host: String, output: OutputQueue) -> Self {
        let prefix = Prefix::new(nick.clone(), username, host);
        Self {
            id,
            nick,
            prefix,
            output,
        }
    }

    /// Queue a line for this user.
    pub async fn send(&self, msg: Arc<Message>) -> Delivery {
        self.output.send(msg).await
    }

    /// Queue a freshly built line for this user.
    pub async fn send_message(&self, msg: Message) -> Delivery {
        self.send(Arc::new(msg)).await
    }
}
