//! Broker state: the session and channel registries and the Hub that owns
//! them.

mod channel;
mod hub;
mod names;
mod session;

pub use channel::Channel;
pub use hub::Hub;
pub(crate) use hub::HubState;
pub use session::{Session, SessionId};
