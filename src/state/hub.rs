//! The Hub - central shared state for the broker.
//!
//! The Hub owns the session and channel registries. All registry mutation
//! happens under one `parking_lot::Mutex`: the relay's invariants (atomic
//! renames, membership symmetry between sessions and channels) span both
//! registries, so a single exclusive discipline replaces finer locking.
//! Nothing awaits while holding the lock; every send into a session's
//! outbound queue is a non-blocking `try_send`.
//!
//! Connection tasks feed inbound lines into [`Hub::handle_line`]; the
//! liveness task drives [`Hub::liveness_tick`]; shutdown fans out through
//! [`Hub::shutdown_all`].

use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use jrc_proto::{Command, CommandFrame, Frame, NEW_USER, SERVER_NAME};
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use super::names::generate_nick;
use super::{Channel, Session, SessionId};
use crate::config::Config;
use crate::error::HandlerError;
use crate::handlers;

/// Central state container.
pub struct Hub {
    state: Mutex<HubState>,
    config: Config,
    next_id: AtomicU64,
    shutdown_tx: broadcast::Sender<()>,
}

/// The registries. Only ever touched under the Hub lock.
pub(crate) struct HubState {
    /// Live sessions keyed by id.
    pub sessions: HashMap<SessionId, Session>,
    /// Reverse lookup: nickname to session id. Keys are exactly the live
    /// sessions' nicknames.
    pub nicks: HashMap<String, SessionId>,
    /// Live channels keyed by name.
    pub channels: HashMap<String, Channel>,
    /// Set once shutdown begins; refuses new sessions.
    pub stopping: bool,
    /// Sessions whose outbound queue overflowed mid-operation; reaped
    /// before the lock is released.
    overflowed: Vec<SessionId>,
    /// Liveness bookkeeping.
    last_round: Instant,
    ticks_since_round: u32,
}

impl Hub {
    pub fn new(config: Config) -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(HubState {
                sessions: HashMap::new(),
                nicks: HashMap::new(),
                channels: HashMap::new(),
                stopping: false,
                overflowed: Vec::new(),
                last_round: Instant::now(),
                ticks_since_round: 0,
            }),
            config,
            next_id: AtomicU64::new(1),
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Subscribe to the shutdown broadcast.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Begin ordered shutdown: the gateway and liveness task unblock on the
    /// broadcast, then the broker drains sessions via [`Hub::shutdown_all`].
    pub fn signal_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Register a new connection: allocate a session under a generated
    /// nickname and greet it with the `NEWUSER` rename.
    ///
    /// Returns `None` when the broker is stopping or at its session limit;
    /// the caller closes the socket.
    pub fn register(
        &self,
        addr: SocketAddr,
        tx: mpsc::Sender<Frame>,
    ) -> Option<(SessionId, String)> {
        let mut state = self.state.lock();
        if state.stopping || state.sessions.len() >= self.config.max_sessions {
            return None;
        }

        let nick = generate_nick(|candidate| state.nicks.contains_key(candidate));
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let session = Session::new(id, nick.clone(), addr, tx);
        // A fresh queue always has room for the greeting.
        let _ = session.enqueue(Frame::command(
            NEW_USER,
            Command::Nick {
                update: nick.clone(),
            },
        ));
        state.sessions.insert(id, session);
        state.nicks.insert(nick.clone(), id);

        info!(%id, %nick, %addr, "Session registered");
        Some((id, nick))
    }

    /// Validate and dispatch one inbound line from a session.
    ///
    /// Returns whether the session is still registered afterwards (a `quit`
    /// or an unexpected `pong` evicts it mid-call).
    pub fn handle_line(&self, id: SessionId, line: &str) -> bool {
        let parsed = CommandFrame::parse(line);

        let mut state = self.state.lock();
        if !state.sessions.contains_key(&id) {
            return false;
        }

        match parsed {
            Err(e) => {
                debug!(%id, error = %e, "Rejected inbound frame");
                state.send_error(id, &HandlerError::Schema(e.to_string()));
            }
            Ok(frame) => {
                let nick = state
                    .sessions
                    .get(&id)
                    .map(|s| s.nick.clone())
                    .unwrap_or_default();
                if frame.src != nick {
                    // Anti-spoofing: src must match the sender's nickname.
                    state.send_error(
                        id,
                        &HandlerError::Schema(format!(
                            "src {:?} does not match nickname {:?}",
                            frame.src, nick
                        )),
                    );
                } else if let Err(e) = handlers::dispatch(&mut state, id, frame.command) {
                    state.send_error(id, &e);
                }
            }
        }

        let alive = state.sessions.contains_key(&id);
        state.reap_overflowed();
        alive
    }

    /// Queue a schema error for a frame the codec already discarded
    /// (oversized or undecodable input).
    pub fn schema_error(&self, id: SessionId, detail: &str) {
        let mut state = self.state.lock();
        state.send_error(id, &HandlerError::Schema(detail.to_string()));
        state.reap_overflowed();
    }

    /// Evict a session for a liveness or transport reason.
    pub fn evict(&self, id: SessionId, reason: &str, from_server: bool) {
        let mut state = self.state.lock();
        state.remove_session(id, reason, from_server);
        state.reap_overflowed();
    }

    /// One liveness tick. A ping round fires only when both the wall-clock
    /// threshold and the tick threshold since the previous round have
    /// passed; the round then evicts unanswered sessions, pings the rest,
    /// and sweeps empty channels.
    pub fn liveness_tick(&self) {
        let mut state = self.state.lock();
        if state.stopping {
            return;
        }

        state.ticks_since_round += 1;
        if state.last_round.elapsed() < self.config.ping_interval
            || state.ticks_since_round <= self.config.min_round_ticks
        {
            return;
        }
        state.last_round = Instant::now();
        state.ticks_since_round = 0;

        let mut expired = Vec::new();
        let mut fresh = Vec::new();
        for (id, session) in &state.sessions {
            if session.pending_ping.is_some() {
                expired.push(*id);
            } else {
                fresh.push(*id);
            }
        }

        for id in expired {
            state.remove_session(id, "No ping response", true);
        }

        let payload = chrono::Utc::now().timestamp_millis().to_string();
        let ping = Frame::command(
            SERVER_NAME,
            Command::Ping {
                msg: payload.clone(),
            },
        );
        for id in fresh {
            if let Some(session) = state.sessions.get_mut(&id) {
                session.pending_ping = Some(payload.clone());
            }
            state.send_to(id, ping.clone());
        }

        // Reclaim channels emptied since the last round.
        state.channels.retain(|_, channel| !channel.is_empty());

        state.reap_overflowed();
    }

    /// Plant a pending ping directly (unit tests drive pong handling
    /// without waiting for a real round).
    #[cfg(test)]
    pub(crate) fn set_pending_ping(&self, id: SessionId, payload: &str) {
        let mut state = self.state.lock();
        if let Some(session) = state.sessions.get_mut(&id) {
            session.pending_ping = Some(payload.to_string());
        }
    }

    /// Evict every session with the shutdown reason. The gateway has
    /// already stopped accepting by the time this runs.
    pub fn shutdown_all(&self) {
        let mut state = self.state.lock();
        state.stopping = true;

        let ids: Vec<SessionId> = state.sessions.keys().copied().collect();
        let count = ids.len();
        for id in ids {
            state.remove_session(id, "Server Shutdown", true);
        }
        state.channels.clear();
        state.reap_overflowed();

        info!(sessions = count, "All sessions evicted for shutdown");
    }
}

impl HubState {
    /// Queue one frame for a session; a full or closed queue schedules the
    /// session for eviction.
    pub fn send_to(&mut self, id: SessionId, frame: Frame) {
        if let Some(session) = self.sessions.get(&id) {
            if !session.enqueue(frame) {
                debug!(%id, nick = %session.nick, "Outbound queue overflow");
                self.overflowed.push(id);
            }
        }
    }

    /// Queue an error frame for the offending session.
    pub fn send_error(&mut self, id: SessionId, error: &HandlerError) {
        self.send_to(id, error.to_error_frame());
    }

    /// Queue one frame for every destination.
    pub fn fan_out(&mut self, destinations: &BTreeSet<SessionId>, frame: Frame) {
        for id in destinations {
            self.send_to(*id, frame.clone());
        }
    }

    /// Deduplicated members of the named channels.
    pub fn channel_union<'a, I>(&self, names: I) -> BTreeSet<SessionId>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut union = BTreeSet::new();
        for name in names {
            if let Some(channel) = self.channels.get(name) {
                union.extend(channel.members.iter().copied());
            }
        }
        union
    }

    /// Member nicknames of a channel, sorted.
    pub fn member_nicks(&self, name: &str) -> Vec<String> {
        let Some(channel) = self.channels.get(name) else {
            return Vec::new();
        };
        let mut nicks: Vec<String> = channel
            .members
            .iter()
            .filter_map(|id| self.sessions.get(id).map(|s| s.nick.clone()))
            .collect();
        nicks.sort();
        nicks
    }

    /// Tear down a session: final `quit` to the session itself, membership
    /// removal, one `quit` announcement to the union of its channels, then
    /// the registry entry (and with it the queue sender) is dropped.
    pub fn remove_session(&mut self, id: SessionId, reason: &str, from_server: bool) {
        let Some(mut session) = self.sessions.remove(&id) else {
            return;
        };
        self.nicks.remove(&session.nick);

        let own_src = if from_server {
            SERVER_NAME.to_string()
        } else {
            session.nick.clone()
        };
        let _ = session.enqueue(Frame::command(
            own_src,
            Command::Quit {
                msg: reason.to_string(),
            },
        ));

        let mut audience = BTreeSet::new();
        for name in std::mem::take(&mut session.channels) {
            if let Some(channel) = self.channels.get_mut(&name) {
                channel.members.remove(&id);
                audience.extend(channel.members.iter().copied());
            }
        }

        info!(%id, nick = %session.nick, %reason, "Session evicted");

        let announcement = Frame::command(
            session.nick.clone(),
            Command::Quit {
                msg: reason.to_string(),
            },
        );
        self.fan_out(&audience, announcement);
        // Dropping `session` drops the sender; the connection task drains
        // the queued frames (the final quit among them) and closes.
    }

    /// Evict sessions whose queues overflowed during the current operation.
    /// Runs before the lock is released; eviction fan-out can overflow
    /// further queues, hence the loop.
    pub fn reap_overflowed(&mut self) {
        while let Some(id) = self.overflowed.pop() {
            self.remove_session(id, "Connection Drop", true);
        }
    }
}
