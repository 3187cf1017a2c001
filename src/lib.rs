//! jrcd - JSON Relay Chat Daemon.
//!
//! A standalone, non-federated chat relay: one broker process accepts
//! long-lived client connections, assigns each a unique nickname, forms
//! ad-hoc `#`-prefixed channels, and fans directed and broadcast messages
//! out over a JSON-framed wire protocol (see the `jrc-proto` crate). A
//! ping-driven liveness pass evicts unresponsive sessions, and an
//! interruption signal triggers ordered shutdown.
//!
//! The library target exists so integration tests and embedders can run the
//! broker in-process; the `jrcd` binary is a thin CLI wrapper around
//! [`Broker`].

pub mod broker;
pub mod config;
pub mod error;
mod handlers;
mod liveness;
pub mod network;
pub mod state;
#[cfg(test)]
pub(crate) mod testutil;

pub use broker::Broker;
pub use config::Config;
