//! Broker configuration.
//!
//! The whole externally-visible surface is three CLI flags (`--hostname`,
//! `--port`, `--log`); the remaining knobs exist for tests and embedders and
//! keep their defaults in production.

use std::time::Duration;

/// Default listen host.
pub const DEFAULT_HOSTNAME: &str = "localhost";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 50000;

/// Broker configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind the listener to.
    pub hostname: String,
    /// Port to bind the listener to.
    pub port: u16,
    /// Wall-clock threshold between ping rounds.
    pub ping_interval: Duration,
    /// Liveness tick period; also bounds how long the broker waits between
    /// readiness passes, so it must not exceed `ping_interval`.
    pub tick_interval: Duration,
    /// Minimum ticks that must elapse between ping rounds.
    pub min_round_ticks: u32,
    /// Maximum number of concurrent sessions; further connections are
    /// refused at accept time.
    pub max_sessions: usize,
    /// Per-session outbound queue capacity, in frames. A session whose
    /// queue overflows is evicted.
    pub send_queue_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            port: DEFAULT_PORT,
            ping_interval: Duration::from_secs(2),
            tick_interval: Duration::from_millis(100),
            min_round_ticks: 2,
            max_sessions: 1024,
            send_queue_limit: 256,
        }
    }
}

impl Config {
    /// The listen address as a `ToSocketAddrs` pair.
    pub fn listen_addr(&self) -> (&str, u16) {
        (self.hostname.as_str(), self.port)
    }
}
