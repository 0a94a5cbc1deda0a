//! Command handler registry and dispatch.

use super::channel::{JoinHandler, ModeHandler, PartHandler};
use super::connection::{PingHandler, PongHandler, QuitHandler};
use super::messaging::MessageHandler;
use super::{Context, Handler, HandlerError, HandlerResult};
use crate::state::MessageKind;
use slirc_proto::Message;
use std::collections::HashMap;
use tracing::{Instrument, Level, debug, span};

/// Registry of command handlers for registered users.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        handlers.insert("PING", Box::new(PingHandler));
        handlers.insert("PONG", Box::new(PongHandler));
        handlers.insert("QUIT", Box::new(QuitHandler));

        handlers.insert("JOIN", Box::new(JoinHandler));
        handlers.insert("PART", Box::new(PartHandler));
        handlers.insert("MODE", Box::new(ModeHandler));

        handlers.insert("PRIVMSG", Box::new(MessageHandler(MessageKind::Privmsg)));
        handlers.insert("NOTICE", Box::new(MessageHandler(MessageKind::Notice)));

        Self { handlers }
    }

    /// Whether `command` is handled once registered.
    pub fn knows(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    /// Dispatch a message to the appropriate handler.
    ///
    /// Unknown commands, NICK and USER included, yield
    /// [`HandlerError::UnknownCommand`].
    pub async fn dispatch(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        let cmd_name = msg.command.name();
        let Some(handler) = self.handlers.get(cmd_name.as_str()) else {
            return Err(HandlerError::UnknownCommand(cmd_name));
        };

        let irc_span = span!(
            Level::DEBUG,
            "irc.command",
            command = %cmd_name,
            uid = %ctx.user.id,
            nick = %ctx.user.nick,
        );
        let result = handler.handle(ctx, msg).instrument(irc_span).await;
        if let Err(ref e) = result {
            debug!(command = %cmd_name, error = %e, kind = e.error_code(), "Command error");
        }
        result
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
