//! slircd-relay - Straylight IRC relay
//!
//! Chat channels that can be bridged to pub/sub topics on a broker.

use slircd_relay::bridge::broker;
use slircd_relay::config::Config;
use slircd_relay::network::Gateway;
use slircd_relay::state::Matrix;
use slircd_relay::telemetry;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not set up yet; the format is part of the config.
            eprintln!("Failed to load config {config_path}: {e}");
            return Err(e.into());
        }
    };

    telemetry::init(&config.log);

    info!(
        server = %config.server.name,
        version = %config.server.version,
        broker = %config.broker.url,
        "Starting slircd-relay"
    );

    let broker = broker::connect(&config.broker.url).map_err(|e| {
        error!(url = %config.broker.url, error = %e, "Unusable broker URL");
        e
    })?;

    let matrix = Matrix::new(&config, broker);
    let gateway = Gateway::bind(config.listen.address, matrix).await?;

    tokio::select! {
        res = gateway.run() => res?,
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("Shutdown requested");
        }
    }

    Ok(())
}
