//! Per-connection session state.

use std::collections::BTreeSet;
use std::net::SocketAddr;

use jrc_proto::Frame;
use tokio::sync::mpsc;

/// Opaque session identifier, stable across renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub(crate) u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// One connected client.
///
/// The registry owns the session; the connection task owns the socket and
/// the receiving end of the outbound queue. Dropping the session drops the
/// queue's sender, which is what ultimately closes the connection.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    /// Current unique nickname.
    pub nick: String,
    pub addr: SocketAddr,
    /// Names of channels this session has joined. Mirrors the channels'
    /// member sets at all times.
    pub channels: BTreeSet<String>,
    /// Payload of the outstanding ping, if any. At most one at a time.
    pub pending_ping: Option<String>,
    tx: mpsc::Sender<Frame>,
}

impl Session {
    pub fn new(id: SessionId, nick: String, addr: SocketAddr, tx: mpsc::Sender<Frame>) -> Self {
        Self {
            id,
            nick,
            addr,
            channels: BTreeSet::new(),
            pending_ping: None,
            tx,
        }
    }

    /// Queue a frame for delivery, FIFO.
    ///
    /// Returns `false` when the queue is full (backpressure) or the
    /// connection task is gone; the caller schedules an eviction.
    #[must_use]
    pub fn enqueue(&self, frame: Frame) -> bool {
        self.tx.try_send(frame).is_ok()
    }
}
