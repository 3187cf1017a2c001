//! Broker lifecycle.
//!
//! One top-level object owns the whole process state: bind, run, ordered
//! shutdown. `main` and the integration tests drive the same surface.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use tracing::info;

use crate::config::Config;
use crate::liveness;
use crate::network::Gateway;
use crate::state::Hub;

/// Grace period after eviction for connection tasks to flush final frames.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

/// The broker: Hub plus Gateway with explicit lifecycle methods.
pub struct Broker {
    hub: Arc<Hub>,
    gateway: Gateway,
}

impl Broker {
    /// Bind the listener. A bind failure (for example, address already in
    /// use) surfaces here and becomes the process's nonzero exit.
    pub async fn bind(config: Config) -> anyhow::Result<Self> {
        let addr_for_error = format!("{}:{}", config.hostname, config.port);
        let hub = Arc::new(Hub::new(config));
        let gateway = Gateway::bind(Arc::clone(&hub))
            .await
            .with_context(|| format!("failed to bind {addr_for_error}"))?;
        Ok(Self { hub, gateway })
    }

    /// The bound listen address.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.gateway.local_addr()
    }

    /// The shared Hub (tests use it to trigger shutdown in-process).
    pub fn hub(&self) -> Arc<Hub> {
        Arc::clone(&self.hub)
    }

    /// Run until shutdown is signalled, then drain every session.
    pub async fn run(self) -> anyhow::Result<()> {
        let liveness_task = liveness::spawn(Arc::clone(&self.hub));

        let shutdown_rx = self.hub.subscribe_shutdown();
        self.gateway.run(shutdown_rx).await?;

        // Listener is closed; now evict everyone and let writers flush.
        self.hub.shutdown_all();
        tokio::time::sleep(SHUTDOWN_GRACE).await;

        let _ = liveness_task.await;
        info!("Broker stopped");
        Ok(())
    }
}
