//! Frame model for the relay wire protocol.
//!
//! Every frame is one JSON object. Three shapes exist on the wire:
//!
//! - **Command frames** carry `cmd` + `src` and flow in both directions:
//!   clients originate them, the broker relays and announces with them.
//! - **Reply frames** carry `reply` and answer the two listing queries
//!   (`names`, `channels`), chunked at [`REPLY_CHUNK`](crate::REPLY_CHUNK)
//!   entries with an empty-array terminator.
//! - **Error frames** carry `error` + a human `msg` and never have side
//!   effects.
//!
//! Command names are matched case-insensitively on input ([`Frame::parse`])
//! and always emitted lowercase.

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::SERVER_NAME;

/// One frame on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Frame {
    /// A client command or a broker announcement (`cmd` key).
    Command(CommandFrame),
    /// A broker listing reply (`reply` key).
    Reply(ReplyFrame),
    /// A broker error reply (`error` key).
    Error(ErrorFrame),
}

/// A command frame: `src` plus the command-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFrame {
    /// Originating nickname, or `SERVER`/`NEWUSER` on broker frames.
    pub src: String,
    #[serde(flatten)]
    pub command: Command,
}

/// The tagged union of commands, keyed on the lowercased `cmd` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum Command {
    /// Request (or announce) a nickname change.
    Nick { update: String },
    /// Leave the relay with a parting message.
    Quit { msg: String },
    /// Join one or more channels.
    Join { channels: Vec<String> },
    /// Leave one or more channels with a parting message.
    Leave { channels: Vec<String>, msg: String },
    /// Request the channel listing.
    Channels,
    /// Request member listings for channels, or the whole-server roster
    /// when `channels` is omitted.
    Users {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        channels: Option<Vec<String>>,
        client: bool,
    },
    /// Send a message to a mixture of nicknames and channels.
    Msg { targets: Vec<String>, msg: String },
    /// Liveness probe; the payload is echoed back in `pong`.
    Ping { msg: String },
    /// Liveness answer; must echo the pending ping payload.
    Pong { msg: String },
}

impl Command {
    /// Lowercase wire name of this command, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nick { .. } => "nick",
            Self::Quit { .. } => "quit",
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Channels => "channels",
            Self::Users { .. } => "users",
            Self::Msg { .. } => "msg",
            Self::Ping { .. } => "ping",
            Self::Pong { .. } => "pong",
        }
    }
}

/// A listing reply frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyFrame {
    /// Always `SERVER`.
    pub src: String,
    #[serde(flatten)]
    pub reply: Reply,
}

/// Reply payloads, keyed on the `reply` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reply", rename_all = "lowercase")]
pub enum Reply {
    /// A chunk of member nicknames. `channels` names the channel context
    /// (empty for a whole-server roster); an empty `names` array terminates
    /// the listing.
    Names {
        channels: Vec<String>,
        names: Vec<String>,
        client: bool,
    },
    /// A chunk of channel names; an empty array terminates the listing.
    Channels { channels: Vec<String> },
}

/// An error reply frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFrame {
    /// Always `SERVER`.
    pub src: String,
    pub error: ErrorKind,
    /// Human-readable description.
    pub msg: String,
}

/// Error kinds on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Nickname is syntactically invalid, reserved, or already held.
    BadNick,
    /// Channel name is syntactically invalid.
    BadChannel,
    /// Frame failed JSON parsing or schema validation.
    Schema,
    /// Named channel does not exist.
    NoChannel,
    /// Sender is not a member of the named channel.
    NonMember,
    /// Message target is neither a known nickname nor a known channel.
    NonExist,
    /// Sender is already a member of the named channel.
    Member,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BadNick => "badnick",
            Self::BadChannel => "badchannel",
            Self::Schema => "schema",
            Self::NoChannel => "nochannel",
            Self::NonMember => "nonmember",
            Self::NonExist => "nonexist",
            Self::Member => "member",
        };
        f.write_str(name)
    }
}

impl CommandFrame {
    /// Build a command frame from a source nickname.
    pub fn new(src: impl Into<String>, command: Command) -> Self {
        Self {
            src: src.into(),
            command,
        }
    }

    /// Parse an inbound client frame.
    ///
    /// The `cmd` field is matched case-insensitively; anything that is not a
    /// JSON object with a recognized command shape is a schema violation.
    pub fn parse(line: &str) -> Result<Self> {
        let value = normalize_cmd(line)?;
        serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

impl Frame {
    /// Parse any frame shape (used by clients, which also see replies and
    /// errors). The `cmd` field, when present, is matched case-insensitively.
    pub fn parse(line: &str) -> Result<Self> {
        let value = normalize_cmd(line)?;
        serde_json::from_value(value).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Serialize to a JSON object without the line terminator.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// A broker error reply.
    pub fn error(error: ErrorKind, msg: impl Into<String>) -> Self {
        Self::Error(ErrorFrame {
            src: SERVER_NAME.to_string(),
            error,
            msg: msg.into(),
        })
    }

    /// A `names` reply chunk.
    pub fn names(channels: Vec<String>, names: Vec<String>, client: bool) -> Self {
        Self::Reply(ReplyFrame {
            src: SERVER_NAME.to_string(),
            reply: Reply::Names {
                channels,
                names,
                client,
            },
        })
    }

    /// A `channels` reply chunk.
    pub fn channel_list(channels: Vec<String>) -> Self {
        Self::Reply(ReplyFrame {
            src: SERVER_NAME.to_string(),
            reply: Reply::Channels { channels },
        })
    }

    /// A command frame (relay or announcement).
    pub fn command(src: impl Into<String>, command: Command) -> Self {
        Self::Command(CommandFrame::new(src, command))
    }
}

/// Parse a line as a JSON object and lowercase its `cmd` field in place, so
/// the tagged deserialization below sees canonical command names.
fn normalize_cmd(line: &str) -> Result<serde_json::Value> {
    let mut value: serde_json::Value =
        serde_json::from_str(line).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    let obj = value
        .as_object_mut()
        .ok_or_else(|| ProtocolError::Malformed("frame is not a JSON object".to_string()))?;
    if let Some(serde_json::Value::String(cmd)) = obj.get_mut("cmd") {
        *cmd = cmd.to_ascii_lowercase();
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_join() {
        let frame = CommandFrame::parse(r##"{"cmd":"join","src":"A","channels":["#x"]}"##).unwrap();
        assert_eq!(frame.src, "A");
        assert_eq!(
            frame.command,
            Command::Join {
                channels: vec!["#x".to_string()]
            }
        );
    }

    #[test]
    fn test_cmd_is_case_insensitive() {
        let frame = CommandFrame::parse(r##"{"cmd":"JoIn","src":"A","channels":["#x"]}"##).unwrap();
        assert_eq!(frame.command.name(), "join");
    }

    #[test]
    fn test_parse_users_optional_channels() {
        let frame = CommandFrame::parse(r#"{"cmd":"users","src":"A","client":true}"#).unwrap();
        assert_eq!(
            frame.command,
            Command::Users {
                channels: None,
                client: true
            }
        );

        let frame =
            CommandFrame::parse(r##"{"cmd":"users","src":"A","channels":["#x"],"client":false}"##)
                .unwrap();
        assert!(matches!(frame.command, Command::Users { channels: Some(_), .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_cmd() {
        let err = CommandFrame::parse(r#"{"cmd":"dance","src":"A"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        // join without its channels array
        let err = CommandFrame::parse(r#"{"cmd":"join","src":"A"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));

        // command frame without src
        let err = CommandFrame::parse(r#"{"cmd":"channels"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(CommandFrame::parse("[1,2,3]").is_err());
        assert!(CommandFrame::parse("not json").is_err());
    }

    #[test]
    fn test_parse_tolerates_extra_fields() {
        let frame =
            CommandFrame::parse(r#"{"cmd":"ping","src":"A","msg":"1","extra":42}"#).unwrap();
        assert_eq!(
            frame.command,
            Command::Ping {
                msg: "1".to_string()
            }
        );
    }

    #[test]
    fn test_command_wire_shape() {
        let frame = Frame::command(
            "A",
            Command::Msg {
                targets: vec!["#x".to_string()],
                msg: "hi".to_string(),
            },
        );
        let value: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"cmd":"msg","src":"A","targets":["#x"],"msg":"hi"})
        );
    }

    #[test]
    fn test_channels_command_is_bare() {
        let frame = Frame::command("A", Command::Channels);
        let value: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({"cmd":"channels","src":"A"}));
    }

    #[test]
    fn test_reply_wire_shape() {
        let frame = Frame::names(vec!["#x".to_string()], vec!["A".to_string()], false);
        let value: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"reply":"names","src":"SERVER","channels":["#x"],"names":["A"],"client":false})
        );
    }

    #[test]
    fn test_error_wire_shape() {
        let frame = Frame::error(ErrorKind::BadNick, "Nickname unavailable");
        let value: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"error":"badnick","src":"SERVER","msg":"Nickname unavailable"})
        );
    }

    #[test]
    fn test_frame_round_trips() {
        let frames = vec![
            Frame::command(
                "bluefox",
                Command::Nick {
                    update: "redfox".to_string(),
                },
            ),
            Frame::command(
                "A",
                Command::Leave {
                    channels: vec!["#x".to_string(), "#y".to_string()],
                    msg: "bye".to_string(),
                },
            ),
            Frame::command("SERVER", Command::Ping { msg: "17".to_string() }),
            Frame::command(
                "A",
                Command::Users {
                    channels: None,
                    client: true,
                },
            ),
            Frame::names(vec![], vec![], true),
            Frame::channel_list(vec!["#x".to_string()]),
            Frame::error(ErrorKind::Schema, "malformed frame"),
        ];

        for frame in frames {
            let line = frame.to_json().unwrap();
            let parsed = Frame::parse(&line).unwrap();
            assert_eq!(parsed, frame, "round trip failed for {line}");
        }
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(ErrorKind::BadNick.to_string(), "badnick");
        assert_eq!(ErrorKind::NonMember.to_string(), "nonmember");
        assert_eq!(
            serde_json::to_value(ErrorKind::NoChannel).unwrap(),
            json!("nochannel")
        );
    }
}
