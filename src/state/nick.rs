//! Nick registry.
//!
//! A single task owns the case-folded nickname map. Sessions talk to it
//! through [`NickRegistry`]; requests are handled strictly in submission
//! order.
//!
//! Releasing a nickname sends nothing to anybody: quit fan-out is driven by
//! channel membership in the channel registry.

use super::output::OutputQueue;
use super::user::{User, UserId};
use crate::error::RegistryError;
use slirc_proto::{Command, Message, Prefix, Response, irc_to_lower};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Requests served by the nick registry.
#[derive(Debug)]
pub enum NickRequest {
    /// Allocate an identity; the reply is `None` when the nickname is taken.
    Register {
        nick: String,
        username: String,
        host: String,
        output: OutputQueue,
        reply: oneshot::Sender<Option<Arc<User>>>,
    },
    /// Route a PRIVMSG or NOTICE to a nickname.
    Message {
        from: Arc<User>,
        target: String,
        text: String,
        notice: bool,
    },
    /// Release a nickname.
    Quit { id: UserId, nick: String },
}

/// Handle to the nick registry task. Cheap to clone.
#[derive(Debug, Clone)]
pub struct NickRegistry {
    tx: mpsc::Sender<NickRequest>,
}

impl NickRegistry {
    /// Spawn the registry with a request queue of `capacity`.
    pub fn spawn(server_name: &str, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let actor = NickActor::new(server_name);
        tokio::spawn(actor.run(rx));
        Self { tx }
    }

    async fn request(&self, req: NickRequest) -> Result<(), RegistryError> {
        self.tx
            .send(req)
            .await
            .map_err(|_| RegistryError::Closed("nick"))
    }

    /// Try to register `nick`. `Ok(None)` means "pick another nickname".
    pub async fn register(
        &self,
        nick: &str,
        username: &str,
        host: &str,
        output: OutputQueue,
    ) -> Result<Option<Arc<User>>, RegistryError> {
        let (reply, rx) = oneshot::channel();
        self.request(NickRequest::Register {
            nick: nick.to_string(),
            username: username.to_string(),
            host: host.to_string(),
            output,
            reply,
        })
        .await?;
        rx.await.map_err(|_| RegistryError::Closed("nick"))
    }

    pub async fn message(
        &self,
        from: &Arc<User>,
        target: &str,
        text: &str,
        notice: bool,
    ) -> Result<(), RegistryError> {
        self.request(NickRequest::Message {
            from: Arc::clone(from),
            target: target.to_string(),
            text: text.to_string(),
            notice,
        })
        .await
    }

    pub async fn quit(&self, user: &User) -> Result<(), RegistryError> {
        self.request(NickRequest::Quit {
            id: user.id,
            nick: user.nick.clone(),
        })
        .await
    }
}

/// The task-owned state.
struct NickActor {
    server_name: String,
    nicks: HashMap<String, Arc<User>>,
    next_id: u64,
}

impl NickActor {
    fn new(server_name: &str) -> Self {
        Self {
            server_name: server_name.to_string(),
            nicks: HashMap::new(),
            next_id: 1,
        }
    }

    async fn run(mut self, mut rx: mpsc::Receiver<NickRequest>) {
        while let Some(req) = rx.recv().await {
            self.handle_request(req).await;
        }
        debug!("Nick registry stopped");
    }

    async fn handle_request(&mut self, req: NickRequest) {
        match req {
            NickRequest::Register {
                nick,
                username,
                host,
                output,
                reply,
            } => {
                let user = self.register(nick, username, host, output);
                // The session may have gone away while waiting.
                let _ = reply.send(user);
            }
            NickRequest::Message {
                from,
                target,
                text,
                notice,
            } => self.route(from, target, text, notice).await,
            NickRequest::Quit { id, nick } => self.release(id, &nick),
        }
    }

    fn register(
        &mut self,
        nick: String,
        username: String,
        host: String,
        output: OutputQueue,
    ) -> Option<Arc<User>> {
        let key = irc_to_lower(&nick);
        if self.nicks.contains_key(&key) {
            debug!(nick = %nick, "Nickname already registered");
            return None;
        }

        let id = UserId(self.next_id);
        self.next_id += 1;
        let user = Arc::new(User::new(id, nick, username, host, output));
        self.nicks.insert(key, Arc::clone(&user));
        info!(uid = %id, nick = %user.nick, "Nickname registered");
        Some(user)
    }

    async fn route(&self, from: Arc<User>, target: String, text: String, notice: bool) {
        let Some(recipient) = self.nicks.get(&irc_to_lower(&target)) else {
            // NOTICE never triggers automatic replies.
            if !notice {
                let reply = Response::err_nosuchnick(&from.nick, &target)
                    .with_prefix(Prefix::ServerName(self.server_name.clone()));
                from.send_message(reply).await;
            }
            return;
        };

        let command = if notice {
            Command::NOTICE(target, text)
        } else {
            Command::PRIVMSG(target, text)
        };
        let msg = Message::from(command).with_prefix(from.prefix.clone());
        recipient.send_message(msg).await;
    }

    fn release(&mut self, id: UserId, nick: &str) {
        let key = irc_to_lower(nick);
        // Only the owner may release a nickname.
        if self.nicks.get(&key).is_some_and(|u| u.id == id) {
            self.nicks.remove(&key);
            info!(uid = %id, nick = %nick, "Nickname released");
        }
    }
}
