//! Command dispatch.
//!
//! The command set is closed, so dispatch is a total `match` over the parsed
//! [`Command`]; handlers are plain functions over the locked registries.
//! Validation runs before any mutation: a handler either errors with zero
//! side effects or applies its whole effect, never a mix.

mod channel;
mod connection;
mod message;
mod nick;

use jrc_proto::{Command, REPLY_CHUNK};

use crate::error::HandlerResult;
use crate::state::{HubState, SessionId};

/// Dispatch one validated command from a session.
pub(crate) fn dispatch(state: &mut HubState, id: SessionId, command: Command) -> HandlerResult {
    match command {
        Command::Nick { update } => nick::handle_nick(state, id, update),
        Command::Join { channels } => channel::handle_join(state, id, channels),
        Command::Leave { channels, msg } => channel::handle_leave(state, id, channels, msg),
        Command::Channels => channel::handle_channels(state, id),
        Command::Users { channels, client } => channel::handle_users(state, id, channels, client),
        Command::Msg { targets, msg } => message::handle_msg(state, id, targets, msg),
        Command::Quit { msg } => connection::handle_quit(state, id, msg),
        Command::Ping { msg } => connection::handle_ping(state, id, msg),
        Command::Pong { msg } => connection::handle_pong(state, id, msg),
    }
}

/// Split a listing into reply chunks of at most [`REPLY_CHUNK`] entries,
/// followed by the empty terminator chunk.
pub(crate) fn chunked(entries: &[String]) -> impl Iterator<Item = Vec<String>> + '_ {
    entries
        .chunks(REPLY_CHUNK)
        .map(<[String]>::to_vec)
        .chain(std::iter::once(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunked_splits_at_five_and_terminates() {
        let entries: Vec<String> = (0..7).map(|i| format!("n{i}")).collect();
        let chunks: Vec<Vec<String>> = chunked(&entries).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 5);
        assert_eq!(chunks[1].len(), 2);
        assert!(chunks[2].is_empty());
    }

    #[test]
    fn test_chunked_empty_listing_is_just_the_terminator() {
        let chunks: Vec<Vec<String>> = chunked(&[]).collect();
        assert_eq!(chunks, vec![Vec::<String>::new()]);
    }
}
