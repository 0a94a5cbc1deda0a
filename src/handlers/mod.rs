//! IRC command handlers.
//!
//! Handlers translate protocol commands into registry requests. They never
//! touch shared state directly: everything a handler does goes through
//! [`Matrix`] handles or the user's own output queue.
//!
//! Registration is a separate state machine ([`Unregistered`]) because it
//! runs before the user exists and writes to the socket directly; every
//! other command goes through the [`Registry`].

mod channel;
mod connection;
mod messaging;
mod registration;
mod registry;

pub use registration::{Step, Unregistered, welcome_burst};
pub use registry::Registry;

pub use crate::error::{HandlerError, HandlerResult};

use crate::state::{Matrix, User};
use async_trait::async_trait;
use slirc_proto::{Message, Prefix};
use std::sync::Arc;

/// Everything a post-registration handler may use.
pub struct Context<'a> {
    pub matrix: &'a Arc<Matrix>,
    pub user: &'a Arc<User>,
}

impl Context<'_> {
    pub fn server_name(&self) -> &str {
        &self.matrix.server_info.name
    }

    /// Queue a server-originated line for this user.
    pub async fn reply(&self, msg: Message) {
        let msg = msg.with_prefix(Prefix::ServerName(self.server_name().to_string()));
        self.user.send_message(msg).await;
    }
}

/// A command handler for registered users.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult;
}
