//! slircd-relay library target.
//!
//! The binary is a thin wrapper around these modules; integration tests
//! drive them directly.

pub mod bridge;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod network;
pub mod state;
pub mod telemetry;
