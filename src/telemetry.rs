//! Logging setup and span constructors.

use crate::config::{LogConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match config.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Standardized span constructors.
pub mod spans {
    use std::net::SocketAddr;
    use tracing::{Span, info_span};

    /// Span for a client connection.
    pub fn connection(conn_id: u64, addr: &SocketAddr) -> Span {
        info_span!("connection", conn_id, ip = %addr.ip())
    }

    /// Span for a bridge task.
    pub fn bridge(channel: &str, topic: &str, generation: u64) -> Span {
        info_span!("bridge", channel = %channel, topic = %topic, generation)
    }
}
