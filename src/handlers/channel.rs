//! JOIN, PART and MODE handlers.

use super::{Context, Handler, HandlerError, HandlerResult};
use async_trait::async_trait;
use slirc_proto::{ChannelExt, Command, Message, Response, irc_eq};

/// Handler for JOIN command.
///
/// `JOIN #a,#b` joins each channel in turn; the first illegal name is
/// reported and the rest of the list is dropped.
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        let Command::JOIN(list) = &msg.command else {
            return Err(HandlerError::NeedMoreParams);
        };
        for name in list.split(',') {
            if !name.is_channel_name() {
                return Err(HandlerError::BadChannelName(name.to_string()));
            }
            ctx.matrix.channels.join(ctx.user, name).await?;
        }
        Ok(())
    }
}

/// Handler for PART command.
pub struct PartHandler;

#[async_trait]
impl Handler for PartHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        let Command::PART(name, reason) = &msg.command else {
            return Err(HandlerError::NeedMoreParams);
        };
        if !name.is_channel_name() {
            return Err(HandlerError::BadChannelName(name.clone()));
        }
        let reason = reason.as_deref().unwrap_or_default();
        ctx.matrix.channels.leave(ctx.user, name, reason).await?;
        Ok(())
    }
}

/// Handler for MODE command.
///
/// Channel targets go to the channel registry. For nicknames only the
/// user's own mode can be queried; it is always `+i`.
pub struct ModeHandler;

#[async_trait]
impl Handler for ModeHandler {
    async fn handle(&self, ctx: &Context<'_>, msg: &Message) -> HandlerResult {
        let Command::MODE(target, rest) = &msg.command else {
            return Err(HandlerError::NeedMoreParams);
        };

        if target.is_channel_target() {
            match rest.split_first() {
                None => ctx.matrix.channels.mode_query(ctx.user, target).await?,
                Some((modes, args)) => {
                    ctx.matrix
                        .channels
                        .mode_change(ctx.user, target, modes, args)
                        .await?
                }
            }
            return Ok(());
        }

        if !irc_eq(target, &ctx.user.nick) {
            return Err(HandlerError::UsersDontMatch);
        }
        // User modes cannot be changed.
        if rest.is_empty() {
            ctx.reply(Response::rpl_umodeis(&ctx.user.nick, "+i")).await;
        }
        Ok(())
    }
}
