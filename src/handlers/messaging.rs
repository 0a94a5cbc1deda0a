//! PRIVMSG and NOTICE handlers.

use super::{Context, Handler, HandlerError, HandlerResult};
use crate::state::MessageKind;
use async_trait::async_trait;
use slirc_proto::{ChannelExt, Message};

/// Handler for PRIVMSG and NOTICE; the two differ only in the verb and in
/// NOTICE never provoking automatic replies from recipients.
pub struct MessageHandler(pub MessageKind);

#[async_trait]
impl Handler for MessageHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        let params = msg.command.params();
        let target = params
            .first()
            .filter(|t| !t.is_empty())
            .ok_or(HandlerError::NoRecipient)?;
        let text = params
            .get(1)
            .filter(|t| !t.is_empty())
            .ok_or(HandlerError::NoTextToSend)?;

        if target.is_channel_target() {
            ctx.matrix
                .channels
                .message(ctx.user, target, text, self.0)
                .await?;
        } else {
            let notice = self.0 == MessageKind::Notice;
            ctx.matrix
                .nicks
                .message(ctx.user, target, text, notice)
                .await?;
        }
        Ok(())
    }
}
