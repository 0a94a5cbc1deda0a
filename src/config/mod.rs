//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, LogConfig)
//! - [`listen`]: Network listener configuration (ListenConfig)
//! - [`broker`]: Pub/sub broker configuration (BrokerConfig)
//! - [`limits`]: Timeouts and queue depths (LimitsConfig)

mod broker;
mod defaults;
mod limits;
mod listen;
mod types;

pub use broker::BrokerConfig;
pub use limits::LimitsConfig;
pub use listen::ListenConfig;
pub use types::{Config, ConfigError, LogConfig, LogFormat, ServerConfig};
