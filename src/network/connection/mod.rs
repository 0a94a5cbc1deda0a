//! Connection - Handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task:
//!
//! ```text
//! Phase 1: Handshake (session task reads and writes the socket)
//!    ├─ HTTP request line ──▶ socket handed to the HTTP responder
//!    ↓
//! Phase 2: Registered
//!    ┌────────────────────┐         ┌──────────────────────┐
//!    │  session task      │         │  delivery task       │
//!    │  FramedRead        │         │  OutputReceiver      │
//!    │  ─▶ Registry       │         │  ─▶ FramedWrite      │
//!    └─────────┬──────────┘         └──────────▲───────────┘
//!              │  requests                     │ lines
//!              ▼                               │
//!        nick / channel registries ───────────┘
//! ```
//!
//! Teardown always runs in the same order: channel registry quit (fan-out
//! to peers), nick release, then the user's own QUIT echo and final ERROR
//! line through the output queue.

mod error_handling;
mod event_loop;
mod handshake;
mod helpers;

use event_loop::LoopExit;
use handshake::Handshake;
use helpers::{closing_link, quit_echo};

use crate::handlers::{Context, Registry, Unregistered};
use crate::state::{DeliveryExit, Matrix, OutputQueue, User, spawn_delivery};
use futures_util::SinkExt;
use slirc_proto::{IrcCodec, Message};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

/// Upper bound on waiting for the delivery task to write the last lines.
const FAREWELL_TIMEOUT: Duration = Duration::from_secs(10);

/// A client connection handler.
pub struct Connection {
    stream: TcpStream,
    addr: SocketAddr,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
}

impl Connection {
    pub fn new(stream: TcpStream, addr: SocketAddr, matrix: Arc<Matrix>, registry: Arc<Registry>) -> Self {
        Self {
            stream,
            addr,
            matrix,
            registry,
        }
    }

    /// Drive the connection until it closes.
    pub async fn run(self) {
        let Self {
            stream,
            addr,
            matrix,
            registry,
        } = self;
        info!("Client connected");

        let limits = &matrix.limits;
        let (read, write) = stream.into_split();
        let mut reader = FramedRead::new(read, IrcCodec::with_max_len(limits.max_line_len));
        let mut writer = FramedWrite::new(write, IrcCodec::with_max_len(limits.max_line_len));

        let (queue, output) = OutputQueue::new(limits.output_queue, limits.enqueue_wait());
        let mut session = Unregistered::new(addr.ip().to_string(), queue);

        let user = match handshake::run(&mut reader, &mut writer, &mut session, &matrix, &registry).await {
            Handshake::Registered(user) => user,
            Handshake::Closed(reason) => {
                close_unregistered(&mut writer, &addr, &reason).await;
                info!(reason = %reason, "Client disconnected before registering");
                return;
            }
            Handshake::Http => {
                let replay = handshake::http_replay(&reader);
                match reader.into_inner().reunite(writer.into_inner()) {
                    Ok(stream) => crate::http::serve_handoff(stream, replay, Arc::clone(&matrix)).await,
                    Err(e) => warn!(error = %e, "Could not reassemble socket for HTTP"),
                }
                return;
            }
        };
        drop(session);

        let mut delivery = spawn_delivery(output, writer);
        let ctx = Context {
            matrix: &matrix,
            user: &user,
        };
        let exit = event_loop::run(&mut reader, &ctx, &registry, &mut delivery).await;

        let (reason, delivery) = match exit {
            LoopExit::Quit(reason) => (reason, Some(delivery)),
            LoopExit::Delivery(exit) => (exit.quit_reason().to_string(), None),
        };
        teardown(&matrix, &user, &addr, &reason, delivery).await;
        info!(uid = %user.id, nick = %user.nick, reason = %reason, "Client disconnected");
    }
}

/// Final line for a connection that never registered.
async fn close_unregistered(writer: &mut FramedWrite<OwnedWriteHalf, IrcCodec>, addr: &SocketAddr, reason: &str) {
    if let Err(e) = writer.send(&closing_link(addr, reason)).await {
        debug!(error = %e, "Could not send closing link");
    }
    let _ = SinkExt::<&Message>::close(writer).await;
}

/// Remove `user` from both registries and say goodbye if the socket is
/// still being written.
async fn teardown(
    matrix: &Matrix,
    user: &Arc<User>,
    addr: &SocketAddr,
    reason: &str,
    delivery: Option<JoinHandle<DeliveryExit>>,
) {
    if let Err(e) = matrix.channels.quit(user, reason).await {
        warn!(error = %e, "Channel quit not delivered");
    }
    if let Err(e) = matrix.nicks.quit(user).await {
        warn!(error = %e, "Nick release not delivered");
    }

    let Some(delivery) = delivery else {
        return;
    };
    user.send_message(quit_echo(&user.prefix, reason)).await;
    user.send_message(closing_link(addr, reason)).await;

    match tokio::time::timeout(FAREWELL_TIMEOUT, delivery).await {
        Ok(Ok(exit)) => debug!(?exit, "Delivery finished"),
        Ok(Err(e)) => warn!(error = %e, "Delivery task failed"),
        Err(_) => debug!("Delivery did not finish in time"),
    }
}
