//! Test broker management.
//!
//! Runs the broker in-process on an ephemeral port, so tests neither race
//! over fixed port numbers nor depend on a prebuilt binary.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use jrcd::state::Hub;
use jrcd::{Broker, Config};
use tokio::task::JoinHandle;

/// A broker instance running inside the test's runtime.
pub struct TestBroker {
    hub: Arc<Hub>,
    addr: SocketAddr,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestBroker {
    /// Spawn a broker with default (production) liveness timing.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(Self::base_config()).await
    }

    /// Spawn a broker with aggressive liveness timing for ping tests.
    pub async fn spawn_fast_pings() -> anyhow::Result<Self> {
        let config = Config {
            ping_interval: Duration::from_millis(300),
            tick_interval: Duration::from_millis(50),
            ..Self::base_config()
        };
        Self::spawn_with(config).await
    }

    /// Spawn a broker with the given configuration.
    pub async fn spawn_with(config: Config) -> anyhow::Result<Self> {
        let broker = Broker::bind(config).await?;
        let addr = broker.local_addr()?;
        let hub = broker.hub();
        let handle = tokio::spawn(broker.run());
        Ok(Self { hub, addr, handle })
    }

    fn base_config() -> Config {
        Config {
            hostname: "127.0.0.1".to_string(),
            port: 0,
            ..Config::default()
        }
    }

    /// The broker's listen address.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Create a new test client connected to this broker.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address()).await
    }

    /// Trigger ordered shutdown (the in-process stand-in for SIGINT).
    pub fn shutdown(&self) {
        self.hub.signal_shutdown();
    }

    /// Wait for the broker to finish its shutdown sequence.
    pub async fn wait(self) -> anyhow::Result<()> {
        self.handle.await?
    }
}
