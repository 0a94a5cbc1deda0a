//! Pub/sub broker configuration.

use super::defaults::{default_broker_url, default_outbound_suffix};
use serde::Deserialize;

/// Where bridged channels subscribe and publish.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    /// Broker URL. `redis://...` dials Redis; `memory` keeps everything
    /// in-process (single node, no persistence).
    #[serde(default = "default_broker_url")]
    pub url: String,
    /// Appended to a channel's topic to form its outbound topic.
    #[serde(default = "default_outbound_suffix")]
    pub outbound_suffix: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: default_broker_url(),
            outbound_suffix: default_outbound_suffix(),
        }
    }
}
