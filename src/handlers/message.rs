//! The msg handler: directed and broadcast delivery.

use std::collections::BTreeSet;

use jrc_proto::{Command, Frame};

use crate::error::{HandlerError, HandlerResult};
use crate::state::{HubState, SessionId};

/// Relay a message to a mixture of nicknames and channels.
///
/// Targets starting with `#` are channels: they must exist and the sender
/// must be a member. Anything else is a nickname lookup. Every target must
/// resolve before any frame is queued; the destination set is deduplicated
/// across all targets, so a session reachable through several of them still
/// receives exactly one copy, with the original sender's `src` intact.
pub(crate) fn handle_msg(
    state: &mut HubState,
    id: SessionId,
    targets: Vec<String>,
    msg: String,
) -> HandlerResult {
    let mut destinations: BTreeSet<SessionId> = BTreeSet::new();
    for target in &targets {
        if target.starts_with('#') {
            let channel = state
                .channels
                .get(target)
                .ok_or_else(|| HandlerError::NonExist(target.clone()))?;
            if !channel.members.contains(&id) {
                return Err(HandlerError::NonMember(target.clone()));
            }
            destinations.extend(channel.members.iter().copied());
        } else {
            let target_id = state
                .nicks
                .get(target)
                .copied()
                .ok_or_else(|| HandlerError::NonExist(target.clone()))?;
            destinations.insert(target_id);
        }
    }

    let Some(session) = state.sessions.get(&id) else {
        return Ok(());
    };
    let frame = Frame::command(session.nick.clone(), Command::Msg { targets, msg });
    state.fan_out(&destinations, frame);
    Ok(())
}
