//! Connection and queue limits.

use super::defaults::{
    default_enqueue_wait_ms, default_idle_timeout, default_max_line_len, default_output_queue,
    default_registration_timeout, default_registry_queue,
};
use serde::Deserialize;
use std::time::Duration;

/// Timeouts and queue depths.
///
/// The defaults suit a small relay; raising `output_queue` trades memory for
/// tolerance of bursty channels before slow clients are cut off.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Seconds a connection may stay unregistered (default: 30).
    #[serde(default = "default_registration_timeout")]
    pub registration_timeout_secs: u64,
    /// Seconds of read silence before a keepalive PING is sent, and again
    /// before the connection is dropped (default: 30).
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    /// Longest accepted line in bytes, terminator included (default: 512).
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Per-user outbound queue depth (default: 512).
    #[serde(default = "default_output_queue")]
    pub output_queue: usize,
    /// How long a full output queue may block the producer, in milliseconds
    /// (default: 10).
    #[serde(default = "default_enqueue_wait_ms")]
    pub enqueue_wait_ms: u64,
    /// Pending request depth of each registry (default: 100).
    #[serde(default = "default_registry_queue")]
    pub registry_queue: usize,
}

impl LimitsConfig {
    pub fn registration_timeout(&self) -> Duration {
        Duration::from_secs(self.registration_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn enqueue_wait(&self) -> Duration {
        Duration::from_millis(self.enqueue_wait_ms)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            registration_timeout_secs: default_registration_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_line_len: default_max_line_len(),
            output_queue: default_output_queue(),
            enqueue_wait_ms: default_enqueue_wait_ms(),
            registry_queue: default_registry_queue(),
        }
    }
}
