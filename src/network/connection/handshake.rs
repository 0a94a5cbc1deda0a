//! Phase 1: registration.
//!
//! Until registration completes the session task is the only writer, so
//! replies go straight to the socket.

use super::error_handling::{WRITE_ERROR_REASON, read_error_reason};
use crate::handlers::{Registry, Step, Unregistered};
use crate::state::{Matrix, User};
use bytes::{Bytes, BytesMut};
use futures_util::{SinkExt, StreamExt};
use slirc_proto::{IrcCodec, Message};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::Instant;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::debug;

/// How the registration phase ended.
pub(super) enum Handshake {
    Registered(Arc<User>),
    /// Close with this reason.
    Closed(String),
    /// The client spoke HTTP.
    Http,
}

pub(super) async fn run<R, W>(
    reader: &mut FramedRead<R, IrcCodec>,
    writer: &mut FramedWrite<W, IrcCodec>,
    session: &mut Unregistered,
    matrix: &Matrix,
    registry: &Registry,
) -> Handshake
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let deadline = Instant::now() + matrix.limits.registration_timeout();
    let mut replies = Vec::new();

    loop {
        let msg = match tokio::time::timeout_at(deadline, reader.next()).await {
            Err(_) => return Handshake::Closed("Registration timeout".to_string()),
            Ok(None) => return Handshake::Closed("EOF".to_string()),
            Ok(Some(Err(e))) => return Handshake::Closed(read_error_reason(&e)),
            Ok(Some(Ok(msg))) => msg,
        };
        debug!(line = %msg, "Received message");

        let step = session.handle(matrix, registry, &msg, &mut replies).await;

        if let Err(e) = write_replies(writer, &mut replies).await {
            debug!(error = %e, "Write failed");
            // The nick is already taken in the registry; give it back.
            if let Step::Registered(user) = &step
                && let Err(e) = matrix.nicks.quit(user).await
            {
                debug!(error = %e, "Nick release not delivered");
            }
            return Handshake::Closed(WRITE_ERROR_REASON.to_string());
        }

        match step {
            Step::Continue => {}
            Step::Registered(user) => return Handshake::Registered(user),
            Step::Quit(reason) => return Handshake::Closed(reason),
            Step::Http => return Handshake::Http,
        }
    }
}

async fn write_replies<W>(
    writer: &mut FramedWrite<W, IrcCodec>,
    replies: &mut Vec<Message>,
) -> Result<(), slirc_proto::error::ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    for reply in replies.drain(..) {
        writer.feed(&reply).await?;
    }
    SinkExt::<&Message>::flush(writer).await
}

/// Bytes an HTTP responder must see before the rest of the socket: the
/// request line already decoded, then whatever is still buffered.
pub(super) fn http_replay<R>(reader: &FramedRead<R, IrcCodec>) -> Bytes {
    let mut replay = BytesMut::from(reader.decoder().last_line().as_bytes());
    replay.extend_from_slice(reader.read_buffer());
    replay.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::broker::MemoryBroker;
    use crate::config::Config;
    use crate::state::OutputQueue;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;

    /// A socket whose peer has gone away.
    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, _: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn matrix() -> Arc<Matrix> {
        let config: Config = "[server]\nname = \"irc.test\"\n".parse().unwrap();
        Matrix::new(&config, Arc::new(MemoryBroker::new()))
    }

    #[tokio::test]
    async fn failed_welcome_releases_nick() {
        let matrix = matrix();
        let registry = Registry::new();
        let (queue, _rx) = OutputQueue::new(8, Duration::from_millis(1));
        let mut session = Unregistered::new("10.0.0.1", queue);

        let input: &[u8] = b"NICK alice\r\nUSER a 0 * :Alice\r\n";
        let mut reader = FramedRead::new(input, IrcCodec::new());
        let mut writer = FramedWrite::new(BrokenPipe, IrcCodec::new());

        let outcome = run(&mut reader, &mut writer, &mut session, &matrix, &registry).await;
        assert!(matches!(outcome, Handshake::Closed(ref reason) if reason == WRITE_ERROR_REASON));

        let (queue, _rx) = OutputQueue::new(8, Duration::from_millis(1));
        let again = matrix
            .nicks
            .register("alice", "a", "10.0.0.2", queue)
            .await
            .unwrap();
        assert!(again.is_some(), "nick still held after failed handshake");
    }
}
