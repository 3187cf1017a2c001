//! Integration test common infrastructure.
//!
//! Provides an in-process broker on an ephemeral port and a JSON-line test
//! client for asserting on frame flows.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestBroker;
