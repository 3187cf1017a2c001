//! Connection - handles an individual client connection.
//!
//! Each connection runs in its own tokio task, `select!`ing between the
//! framed reader and the session's outbound queue:
//!
//! - Inbound frames go through [`Hub::handle_line`]; frames the codec
//!   discarded (oversized, bad UTF-8) are answered with a schema error
//!   without dropping the connection.
//! - Queue frames are written out in order; the queue's sender lives in the
//!   session registry, so the queue closing means the session was evicted
//!   and the task drains what is left (the final `quit` among it), flushes,
//!   and exits.
//! - EOF and socket errors evict the session as a connection drop.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use jrc_proto::{Frame, FrameCodec, Segment};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, instrument, warn};

use crate::state::{Hub, SessionId};

/// A client connection handler.
pub struct Connection {
    id: SessionId,
    nick: String,
    addr: SocketAddr,
    stream: TcpStream,
    rx: mpsc::Receiver<Frame>,
    hub: Arc<Hub>,
}

impl Connection {
    pub fn new(
        id: SessionId,
        nick: String,
        addr: SocketAddr,
        stream: TcpStream,
        rx: mpsc::Receiver<Frame>,
        hub: Arc<Hub>,
    ) -> Self {
        Self {
            id,
            nick,
            addr,
            stream,
            rx,
            hub,
        }
    }

    /// Run the connection loop until the session ends.
    #[instrument(skip(self), fields(id = %self.id, nick = %self.nick, addr = %self.addr), name = "connection")]
    pub async fn run(self) -> anyhow::Result<()> {
        info!("Client connected");

        let (read_half, write_half) = self.stream.into_split();
        let mut reader = FramedRead::new(read_half, FrameCodec::new());
        let mut writer = FramedWrite::new(write_half, FrameCodec::new());
        let mut rx = self.rx;

        loop {
            tokio::select! {
                item = reader.next() => {
                    match item {
                        Some(Ok(Segment::Frame(line))) => {
                            if !self.hub.handle_line(self.id, &line) {
                                // Evicted mid-dispatch (quit, bad pong).
                                break;
                            }
                        }
                        Some(Ok(Segment::Discarded(e))) => {
                            debug!(error = %e, "Discarded inbound frame");
                            self.hub.schema_error(self.id, &e.to_string());
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "Read error");
                            self.hub.evict(self.id, "Connection Drop", true);
                            break;
                        }
                        None => {
                            self.hub.evict(self.id, "Connection Drop", true);
                            break;
                        }
                    }
                }
                frame = rx.recv() => {
                    match frame {
                        Some(frame) => {
                            if let Err(e) = writer.send(frame).await {
                                warn!(error = %e, "Write error");
                                self.hub.evict(self.id, "Connection Drop", true);
                                break;
                            }
                        }
                        // Queue closed: the session is gone from the registry.
                        None => break,
                    }
                }
            }
        }

        // Deliver whatever was queued before the eviction, then close.
        while let Some(frame) = rx.recv().await {
            if writer.send(frame).await.is_err() {
                break;
            }
        }
        let _ = writer.close().await;

        info!("Client disconnected");
        Ok(())
    }
}
