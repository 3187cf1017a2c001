//! Channel state.

use std::collections::BTreeSet;

use super::SessionId;

/// A named multicast group.
///
/// Created lazily when the first session joins. An empty channel is not
/// destroyed on last-leave; the liveness sweep reclaims it, so observers may
/// briefly see it linger.
#[derive(Debug)]
pub struct Channel {
    pub name: String,
    /// Member sessions. Mirrors the sessions' channel sets at all times.
    pub members: BTreeSet<SessionId>,
}

impl Channel {
    pub fn new(name: String) -> Self {
        Self {
            name,
            members: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
