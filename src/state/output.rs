//! Per-user output queue.
//!
//! Registries are the producers, the connection's socket writer is the only
//! consumer. Each queue has a bounded lane for ordinary traffic and a
//! one-slot lane for the "cannot keep up" signal:
//!
//! 1. try the ordinary lane without waiting;
//! 2. if it is full, wait for room for at most `wait`;
//! 3. if it is still full, raise the signal (non-blocking);
//! 4. if the signal is already raised, drop the line.
//!
//! Delivery is therefore at-most-once. A consumer that stays behind is
//! disconnected instead of stalling a registry.

use futures_util::SinkExt;
use slirc_proto::error::ProtocolError;
use slirc_proto::{Command, IrcCodec, Message};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::codec::FramedWrite;
use tracing::{debug, warn};

/// Outcome of an enqueue attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted on the ordinary lane.
    Queued,
    /// The ordinary lane stayed full; the disconnect signal was raised.
    Signalled,
    /// Not delivered: the signal was already raised or the consumer is gone.
    Dropped,
}

/// Producer side of an output queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct OutputQueue {
    lines: mpsc::Sender<Arc<Message>>,
    fatal: mpsc::Sender<()>,
    wait: Duration,
}

/// Consumer side of an output queue.
#[derive(Debug)]
pub struct OutputReceiver {
    lines: mpsc::Receiver<Arc<Message>>,
    fatal: mpsc::Receiver<()>,
}

impl OutputQueue {
    /// Create a queue holding up to `capacity` ordinary lines.
    pub fn new(capacity: usize, wait: Duration) -> (Self, OutputReceiver) {
        let (lines_tx, lines_rx) = mpsc::channel(capacity.max(1));
        let (fatal_tx, fatal_rx) = mpsc::channel(1);
        (
            Self {
                lines: lines_tx,
                fatal: fatal_tx,
                wait,
            },
            OutputReceiver {
                lines: lines_rx,
                fatal: fatal_rx,
            },
        )
    }

    /// Enqueue a line; never waits longer than the configured bound.
    pub async fn send(&self, msg: Arc<Message>) -> Delivery {
        let msg = match self.lines.try_send(msg) {
            Ok(()) => return Delivery::Queued,
            Err(TrySendError::Closed(_)) => return Delivery::Dropped,
            Err(TrySendError::Full(msg)) => msg,
        };

        match tokio::time::timeout(self.wait, self.lines.send(msg)).await {
            Ok(Ok(())) => Delivery::Queued,
            Ok(Err(_)) => Delivery::Dropped,
            Err(_) => match self.fatal.try_send(()) {
                Ok(()) => Delivery::Signalled,
                Err(_) => Delivery::Dropped,
            },
        }
    }
}

#[cfg(test)]
impl OutputReceiver {
    /// Queued lines rendered to wire text, oldest first.
    pub(crate) fn drain_lines(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(msg) = self.lines.try_recv() {
            out.push(msg.to_string());
        }
        out
    }
}

/// Upper bound on flushing the last lines of a closing connection.
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Why a delivery task stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryExit {
    /// An `ERROR` line was written; nothing may follow it.
    Closed,
    /// Every producer went away.
    Drained,
    /// The disconnect signal was raised.
    SlowConsumer,
    /// The socket refused a write.
    WriteError,
}

impl DeliveryExit {
    /// Quit reason to report for a delivery task that ended on its own.
    pub fn quit_reason(&self) -> &str {
        match self {
            DeliveryExit::Closed | DeliveryExit::Drained => "Connection closed",
            DeliveryExit::SlowConsumer => "SendQ exceeded",
            DeliveryExit::WriteError => "Write error",
        }
    }
}

/// Spawn the task draining `rx` into `writer`.
///
/// The signal lane is polled first, so a raised signal wins over lines
/// that are still queued. On every exit the write half is shut down.
pub fn spawn_delivery<W>(rx: OutputReceiver, writer: FramedWrite<W, IrcCodec>) -> JoinHandle<DeliveryExit>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(deliver(rx, writer))
}

async fn deliver<W>(mut rx: OutputReceiver, mut writer: FramedWrite<W, IrcCodec>) -> DeliveryExit
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let exit = loop {
        tokio::select! {
            biased;

            Some(()) = rx.fatal.recv() => break DeliveryExit::SlowConsumer,

            line = rx.lines.recv() => {
                let Some(msg) = line else {
                    break DeliveryExit::Drained;
                };
                // A stalled socket must not hide the signal.
                tokio::select! {
                    biased;

                    Some(()) = rx.fatal.recv() => break DeliveryExit::SlowConsumer,

                    res = writer.send(&*msg) => match res {
                        Ok(()) => {}
                        // Rejected by the encoder, nothing was buffered.
                        Err(ProtocolError::Io(e)) if e.kind() == io::ErrorKind::InvalidInput => {
                            warn!(line = ?msg.to_string(), "Dropping line that cannot be framed");
                        }
                        Err(e) => {
                            debug!(error = %e, "Write failed");
                            break DeliveryExit::WriteError;
                        }
                    }
                }
                if matches!(msg.command, Command::ERROR(_)) {
                    break DeliveryExit::Closed;
                }
            }
        }
    };

    match exit {
        DeliveryExit::SlowConsumer => {
            warn!("Output queue overflow, disconnecting slow consumer");
            // Dropping the write half discards whatever is still buffered.
            drop(writer);
        }
        DeliveryExit::WriteError => drop(writer),
        DeliveryExit::Closed | DeliveryExit::Drained => {
            match tokio::time::timeout(CLOSE_GRACE, SinkExt::<&Message>::close(&mut writer)).await {
                Ok(Err(e)) => debug!(error = %e, "Shutdown of write half failed"),
                Err(_) => debug!("Shutdown of write half timed out"),
                Ok(Ok(())) => {}
            }
        }
    }
    exit
}
