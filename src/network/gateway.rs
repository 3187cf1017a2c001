//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds to the configured address and spawns a Connection task
//! for each incoming client. It stops accepting the moment the shutdown
//! broadcast fires; draining the already-registered sessions is the Hub's
//! job after that.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, instrument};

use crate::network::Connection;
use crate::state::Hub;

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    hub: Arc<Hub>,
}

impl Gateway {
    /// Bind the gateway to the Hub's configured address.
    pub async fn bind(hub: Arc<Hub>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(hub.config().listen_addr()).await?;
        info!(addr = %listener.local_addr()?, "Gateway listening");
        Ok(Self { listener, hub })
    }

    /// The bound address (the configured port may be 0 in tests).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the shutdown broadcast fires.
    #[instrument(skip_all, name = "gateway")]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> std::io::Result<()> {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Gateway stopping");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.accept(stream, addr),
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
            }
        }
    }

    fn accept(&self, stream: tokio::net::TcpStream, addr: SocketAddr) {
        let (tx, rx) = mpsc::channel(self.hub.config().send_queue_limit);
        let Some((id, nick)) = self.hub.register(addr, tx) else {
            // Stopping or full; the socket is dropped unanswered.
            info!(%addr, "Connection refused");
            return;
        };

        let hub = Arc::clone(&self.hub);
        tokio::spawn(async move {
            let connection = Connection::new(id, nick, addr, stream, rx, hub);
            if let Err(e) = connection.run().await {
                error!(%id, %addr, error = %e, "Connection error");
            }
        });
    }
}
