//! Channel handlers: join, leave, and the two listing queries.

use std::collections::BTreeSet;

use jrc_proto::{Command, Frame, NameExt};
use tracing::info;

use super::chunked;
use crate::error::{HandlerError, HandlerResult};
use crate::state::{Channel, HubState, SessionId};

/// Join one or more channels, creating missing ones lazily.
///
/// All-or-nothing: every name must be syntactically valid and not already
/// joined (a duplicate within the request counts as already joined) before
/// any channel is touched. Each channel's new membership gets a `join`
/// announcement, then the joiner gets a `names` burst per channel.
pub(crate) fn handle_join(
    state: &mut HubState,
    id: SessionId,
    channels: Vec<String>,
) -> HandlerResult {
    let mut requested = BTreeSet::new();
    for name in &channels {
        if !name.is_valid_channel() {
            return Err(HandlerError::BadChannel(name.clone()));
        }
        let already = state
            .channels
            .get(name)
            .is_some_and(|channel| channel.members.contains(&id));
        if already || !requested.insert(name.as_str()) {
            return Err(HandlerError::Member(name.clone()));
        }
    }

    let Some(session) = state.sessions.get(&id) else {
        return Ok(());
    };
    let src = session.nick.clone();

    for name in &channels {
        let members = {
            let channel = state
                .channels
                .entry(name.clone())
                .or_insert_with(|| {
                    info!(channel = %name, "Channel created");
                    Channel::new(name.clone())
                });
            channel.members.insert(id);
            channel.members.clone()
        };
        if let Some(session) = state.sessions.get_mut(&id) {
            session.channels.insert(name.clone());
        }
        state.fan_out(
            &members,
            Frame::command(
                src.clone(),
                Command::Join {
                    channels: vec![name.clone()],
                },
            ),
        );
    }

    // Member burst to the joiner, chunked, per channel.
    for name in &channels {
        let nicks = state.member_nicks(name);
        for chunk in chunked(&nicks) {
            state.send_to(id, Frame::names(vec![name.clone()], chunk, false));
        }
    }
    Ok(())
}

/// Leave one or more channels.
///
/// Every named channel must exist and be joined before anything happens.
/// Each channel's current membership (the leaver included) gets the `leave`
/// announcement with the client's message, then the membership is removed.
/// The channel object itself lingers until the liveness sweep.
pub(crate) fn handle_leave(
    state: &mut HubState,
    id: SessionId,
    channels: Vec<String>,
    msg: String,
) -> HandlerResult {
    let mut names: Vec<String> = Vec::new();
    for name in channels {
        let channel = state
            .channels
            .get(&name)
            .ok_or_else(|| HandlerError::NoChannel(name.clone()))?;
        if !channel.members.contains(&id) {
            return Err(HandlerError::NonMember(name));
        }
        if !names.contains(&name) {
            names.push(name);
        }
    }

    let Some(session) = state.sessions.get(&id) else {
        return Ok(());
    };
    let src = session.nick.clone();

    for name in &names {
        let members = state.channel_union(std::iter::once(name));
        state.fan_out(
            &members,
            Frame::command(
                src.clone(),
                Command::Leave {
                    channels: vec![name.clone()],
                    msg: msg.clone(),
                },
            ),
        );
        if let Some(channel) = state.channels.get_mut(name) {
            channel.members.remove(&id);
        }
        if let Some(session) = state.sessions.get_mut(&id) {
            session.channels.remove(name);
        }
    }
    Ok(())
}

/// The full channel listing, chunked, to the requester.
pub(crate) fn handle_channels(state: &mut HubState, id: SessionId) -> HandlerResult {
    let mut names: Vec<String> = state.channels.keys().cloned().collect();
    names.sort();
    for chunk in chunked(&names) {
        state.send_to(id, Frame::channel_list(chunk));
    }
    Ok(())
}

/// Member listings, chunked per channel; without a channel list, the
/// whole-server roster under an empty channel context.
pub(crate) fn handle_users(
    state: &mut HubState,
    id: SessionId,
    channels: Option<Vec<String>>,
    client: bool,
) -> HandlerResult {
    match channels {
        Some(names) => {
            for name in &names {
                if !state.channels.contains_key(name) {
                    return Err(HandlerError::NoChannel(name.clone()));
                }
            }
            for name in &names {
                let nicks = state.member_nicks(name);
                for chunk in chunked(&nicks) {
                    state.send_to(id, Frame::names(vec![name.clone()], chunk, client));
                }
            }
        }
        None => {
            let mut nicks: Vec<String> =
                state.sessions.values().map(|s| s.nick.clone()).collect();
            nicks.sort();
            for chunk in chunked(&nicks) {
                state.send_to(id, Frame::names(Vec::new(), chunk, client));
            }
        }
    }
    Ok(())
}
