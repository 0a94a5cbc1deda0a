//! PING, PONG and QUIT handlers.

use super::{Context, Handler, HandlerError, HandlerResult};
use async_trait::async_trait;
use slirc_proto::{Command, Message};

/// Handler for PING command.
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        // PING <token>
        let Command::PING(token, _) = &msg.command else {
            return Err(HandlerError::NeedMoreParams);
        };
        ctx.reply(Message::pong(ctx.server_name(), token.as_str()))
            .await;
        Ok(())
    }
}

/// Handler for PONG command. Any inbound line already counts as activity.
pub struct PongHandler;

#[async_trait]
impl Handler for PongHandler {
    async fn handle(&self, _ctx: &Context<'_>, _msg: &Message) -> HandlerResult {
        Ok(())
    }
}

/// Handler for QUIT command.
pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        let reason = quit_reason(&msg.command);
        tracing::info!(uid = %ctx.user.id, nick = %ctx.user.nick, reason = %reason, "Client quit");
        Err(HandlerError::Quit(reason))
    }
}

/// Reason announced for a client-requested QUIT.
pub(super) fn quit_reason(command: &Command) -> String {
    match command {
        Command::QUIT(Some(text)) if !text.is_empty() => format!("Quit: {text}"),
        _ => "Client Quit".to_string(),
    }
}
