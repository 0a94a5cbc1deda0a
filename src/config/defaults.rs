//! Default value functions for configuration.
//!
//! Separated into its own module so serde attributes and `Default` impls
//! share one source of truth.

use std::net::{Ipv4Addr, SocketAddr};

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_version() -> String {
    format!("slircd-relay-{}", env!("CARGO_PKG_VERSION"))
}

// =============================================================================
// Listener Defaults
// =============================================================================

pub fn default_listen_address() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 6667))
}

// =============================================================================
// Broker Defaults
// =============================================================================

pub fn default_broker_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

pub fn default_outbound_suffix() -> String {
    ":out".to_string()
}

// =============================================================================
// Limit Defaults
// =============================================================================

pub fn default_registration_timeout() -> u64 {
    30
}

pub fn default_idle_timeout() -> u64 {
    30
}

pub fn default_max_line_len() -> usize {
    512
}

pub fn default_output_queue() -> usize {
    512
}

pub fn default_enqueue_wait_ms() -> u64 {
    10
}

pub fn default_registry_queue() -> usize {
    100
}
