//! Connection-level handlers: quit, ping, pong.

use tracing::{debug, trace};

use crate::error::HandlerResult;
use crate::state::{HubState, SessionId};

/// Client-requested departure.
pub(crate) fn handle_quit(state: &mut HubState, id: SessionId, msg: String) -> HandlerResult {
    state.remove_session(id, &msg, false);
    Ok(())
}

/// Inbound ping from a client. The broker never answers these; liveness
/// flows strictly broker-to-client.
pub(crate) fn handle_ping(_state: &mut HubState, id: SessionId, msg: String) -> HandlerResult {
    trace!(%id, payload = %msg, "Ignoring client ping");
    Ok(())
}

/// Answer to a broker ping. The payload must match the outstanding ping;
/// an unsolicited or mismatched pong is a liveness failure.
pub(crate) fn handle_pong(state: &mut HubState, id: SessionId, msg: String) -> HandlerResult {
    let Some(session) = state.sessions.get_mut(&id) else {
        return Ok(());
    };
    match session.pending_ping.take() {
        Some(expected) if expected == msg => Ok(()),
        expected => {
            debug!(%id, ?expected, got = %msg, "Pong mismatch");
            state.remove_session(id, "Unexpected Pong", true);
            Ok(())
        }
    }
}
