//! Test server management.
//!
//! Runs the relay inside the test's runtime with an in-memory broker, so
//! tests can inject and observe broker traffic directly.

use slircd_relay::bridge::broker::MemoryBroker;
use slircd_relay::config::Config;
use slircd_relay::network::Gateway;
use slircd_relay::state::Matrix;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A test server instance.
pub struct TestServer {
    addr: SocketAddr,
    broker: Arc<MemoryBroker>,
    task: JoinHandle<()>,
}

const BASE_CONFIG: &str = r#"
[server]
name = "irc.test"
version = "relay-test"

[listen]
address = "127.0.0.1:0"

[broker]
url = "memory"
"#;

impl TestServer {
    /// Spawn a server with default limits.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn a server after adjusting its configuration.
    pub async fn spawn_with(tweak: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let mut config: Config = BASE_CONFIG.parse()?;
        tweak(&mut config);

        let broker = Arc::new(MemoryBroker::new());
        let matrix = Matrix::new(&config, broker.clone());
        let gateway = Gateway::bind(config.listen.address, matrix).await?;
        let addr = gateway.local_addr()?;

        let task = tokio::spawn(async move {
            let _ = gateway.run().await;
        });

        Ok(Self { addr, broker, task })
    }

    /// The server address as `host:port`.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// The broker every bridge of this server uses.
    #[allow(dead_code)]
    pub fn broker(&self) -> &MemoryBroker {
        &self.broker
    }

    /// Wait until `topic` has exactly `count` live subscriptions.
    #[allow(dead_code)]
    pub async fn wait_for_subscribers(&self, topic: &str, count: usize) -> anyhow::Result<()> {
        for _ in 0..200 {
            if self.broker.subscriber_count(topic) == count {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        anyhow::bail!(
            "topic {topic} has {} subscribers, wanted {count}",
            self.broker.subscriber_count(topic)
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
