//! Wire protocol library for the jrcd chat relay.
//!
//! The relay speaks a line-oriented JSON protocol: each frame is one JSON
//! object terminated by `\r\n` and at most [`MAX_FRAME_LEN`] bytes. This
//! crate provides the frame model ([`Frame`], [`Command`], [`Reply`],
//! [`ErrorKind`]), the tokio codec that segments the byte stream
//! ([`FrameCodec`]), and nickname/channel-name validation ([`NameExt`]).
//!
//! Both the broker and its clients (test harnesses, bots) build on this
//! crate; the broker is simply the peer that owns the registries.

#[cfg(feature = "tokio")]
mod codec;
mod error;
mod message;
mod name;

#[cfg(feature = "tokio")]
pub use codec::{FrameCodec, Segment};
pub use error::{FrameError, ProtocolError, Result};
pub use message::{Command, CommandFrame, ErrorFrame, ErrorKind, Frame, Reply, ReplyFrame};
pub use name::{is_reserved_nick, NameExt};

/// Maximum size of one frame in bytes, terminator included.
pub const MAX_FRAME_LEN: usize = 1024;

/// Maximum entries per `names`/`channels` reply chunk.
pub const REPLY_CHUNK: usize = 5;

/// Maximum nickname length (channel names allow one more for the `#`).
pub const NICK_MAX_LEN: usize = 10;

/// The broker's own source name on server-originated frames.
pub const SERVER_NAME: &str = "SERVER";

/// Placeholder source used when greeting a session that has no nickname yet.
pub const NEW_USER: &str = "NEWUSER";

/// Nicknames no session may ever hold.
pub const RESERVED_NICKS: [&str; 2] = [SERVER_NAME, NEW_USER];
