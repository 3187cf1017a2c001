//! The nick handler.

use jrc_proto::{is_reserved_nick, Command, Frame, NameExt};
use tracing::info;

use crate::error::{HandlerError, HandlerResult};
use crate::state::{HubState, SessionId};

/// Rename a session.
///
/// The rename is atomic: the old key leaves and the new key enters the
/// nickname registry in one step, and the announcement goes to the session
/// itself plus every channel it has joined. Anything unavailable - bad
/// syntax, a reserved name, a name already held - is `badnick`.
pub(crate) fn handle_nick(state: &mut HubState, id: SessionId, update: String) -> HandlerResult {
    if !update.is_valid_nick() || is_reserved_nick(&update) || state.nicks.contains_key(&update) {
        return Err(HandlerError::BadNick(update));
    }

    let Some(session) = state.sessions.get_mut(&id) else {
        return Ok(());
    };
    let old = std::mem::replace(&mut session.nick, update.clone());
    let joined: Vec<String> = session.channels.iter().cloned().collect();

    state.nicks.remove(&old);
    state.nicks.insert(update.clone(), id);

    info!(%id, from = %old, to = %update, "Nickname changed");

    let mut audience = state.channel_union(joined.iter());
    audience.insert(id);
    state.fan_out(&audience, Frame::command(old, Command::Nick { update }));
    Ok(())
}
