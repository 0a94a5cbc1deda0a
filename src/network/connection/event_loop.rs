//! Phase 2: registered command loop.
//!
//! Reads are bounded by the idle timeout. The first silent interval sends a
//! PING through the output queue; a second one in a row ends the session.

use super::error_handling::read_error_reason;
use crate::handlers::{Context, HandlerError, Registry};
use crate::state::DeliveryExit;
use futures_util::StreamExt;
use slirc_proto::{IrcCodec, Message};
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedRead;
use tracing::{debug, warn};

/// Why the command loop stopped.
pub(super) enum LoopExit {
    /// The session decided to close; delivery is still running.
    Quit(String),
    /// The delivery task ended first.
    Delivery(DeliveryExit),
}

pub(super) async fn run<R>(
    reader: &mut FramedRead<R, IrcCodec>,
    ctx: &Context<'_>,
    registry: &Registry,
    delivery: &mut JoinHandle<DeliveryExit>,
) -> LoopExit
where
    R: AsyncRead + Unpin,
{
    let idle = ctx.matrix.limits.idle_timeout();
    let mut ping_pending = false;

    loop {
        tokio::select! {
            exit = &mut *delivery => {
                let exit = exit.unwrap_or_else(|e| {
                    warn!(error = %e, "Delivery task failed");
                    DeliveryExit::WriteError
                });
                return LoopExit::Delivery(exit);
            }

            read = tokio::time::timeout(idle, reader.next()) => {
                let msg = match read {
                    Err(_) if ping_pending => {
                        let total = idle.as_secs() * 2;
                        return LoopExit::Quit(format!("Ping timeout ({total} seconds)"));
                    }
                    Err(_) => {
                        ping_pending = true;
                        ctx.reply(Message::ping(ctx.server_name())).await;
                        continue;
                    }
                    Ok(None) => return LoopExit::Quit("EOF".to_string()),
                    Ok(Some(Err(e))) => return LoopExit::Quit(read_error_reason(&e)),
                    Ok(Some(Ok(msg))) => msg,
                };

                ping_pending = false;
                debug!(line = %msg, "Received message");

                match registry.dispatch(ctx, &msg).await {
                    Ok(()) => {}
                    Err(HandlerError::Quit(reason) | HandlerError::Internal(reason)) => {
                        return LoopExit::Quit(reason);
                    }
                    Err(e) => {
                        let cmd_name = msg.command.name();
                        if let Some(reply) = e.to_irc_reply(ctx.server_name(), &ctx.user.nick, &cmd_name) {
                            ctx.user.send_message(reply).await;
                        }
                    }
                }
            }
        }
    }
}
