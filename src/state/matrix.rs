//! The Matrix - shared handles for every connection.
//!
//! Nothing in here is mutable. The state itself lives in the registry
//! tasks; the Matrix only carries the handles that reach them, plus the
//! server identity and limits every session needs.

use super::channel::ChannelRegistry;
use super::nick::NickRegistry;
use crate::bridge::broker::Broker;
use crate::config::{Config, LimitsConfig};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// This server's identity as announced during registration.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
}

pub struct Matrix {
    pub server_info: ServerInfo,
    pub limits: LimitsConfig,
    pub nicks: NickRegistry,
    pub channels: ChannelRegistry,
    /// Also used directly by the HTTP publish endpoint.
    pub broker: Arc<dyn Broker>,
}

impl Matrix {
    /// Build the shared state and spawn both registries.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &Config, broker: Arc<dyn Broker>) -> Arc<Self> {
        let limits = config.limits.clone();
        let nicks = NickRegistry::spawn(&config.server.name, limits.registry_queue);
        let channels = ChannelRegistry::spawn(
            &config.server.name,
            Arc::clone(&broker),
            &config.broker.outbound_suffix,
            limits.registry_queue,
        );

        Arc::new(Self {
            server_info: ServerInfo {
                name: config.server.name.clone(),
                version: config.server.version.clone(),
                description: config.server.description.clone(),
                created: Utc::now(),
            },
            limits,
            nicks,
            channels,
            broker,
        })
    }
}
