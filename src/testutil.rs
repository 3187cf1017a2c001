//! Shared helpers for in-crate unit tests: a Hub fixture plus a fake peer
//! that speaks through the public dispatch surface only.

use std::net::SocketAddr;

use jrc_proto::{Command, Frame, NEW_USER};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::state::{Hub, SessionId};

/// A Hub sized for tests.
pub(crate) fn test_hub() -> Hub {
    Hub::new(Config {
        max_sessions: 8,
        ..Config::default()
    })
}

/// A registered fake peer: holds the receiving end of its outbound queue.
pub(crate) struct Peer {
    pub id: SessionId,
    pub nick: String,
    pub rx: mpsc::Receiver<Frame>,
}

/// Register a peer and swallow its `NEWUSER` greeting.
pub(crate) fn connect(hub: &Hub) -> Peer {
    let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
    let (tx, mut rx) = mpsc::channel(64);
    let (id, nick) = hub.register(addr, tx).expect("registry full");

    let greeting = rx.try_recv().unwrap();
    assert_eq!(
        greeting,
        Frame::command(NEW_USER, Command::Nick { update: nick.clone() })
    );

    Peer { id, nick, rx }
}

impl Peer {
    /// Submit a command under this peer's current nickname.
    pub fn send(&self, hub: &Hub, command: Command) -> bool {
        let line = Frame::command(self.nick.clone(), command)
            .to_json()
            .unwrap();
        hub.handle_line(self.id, &line)
    }

    /// Everything queued for this peer so far.
    pub fn drain(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(frame);
        }
        frames
    }
}
