//! Unified error handling for the broker.
//!
//! [`HandlerError`] covers the protocol-error tier: every variant maps onto
//! one wire error kind and is surfaced to the offending session as a single
//! error frame. The command that produced it is discarded without touching
//! the registries. Liveness and transport failures are not errors in this
//! sense; they are evictions with a human reason.

use jrc_proto::{ErrorKind, Frame};
use thiserror::Error;

/// Errors that can occur during command handling.
///
/// The `Display` text doubles as the human `msg` field on the error frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("nickname unavailable: {0}")]
    BadNick(String),

    #[error("invalid channel name: {0}")]
    BadChannel(String),

    #[error("no such channel: {0}")]
    NoChannel(String),

    #[error("not a member of {0}")]
    NonMember(String),

    #[error("no such user or channel: {0}")]
    NonExist(String),

    #[error("already a member of {0}")]
    Member(String),

    #[error("schema violation: {0}")]
    Schema(String),
}

impl HandlerError {
    /// The wire error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadNick(_) => ErrorKind::BadNick,
            Self::BadChannel(_) => ErrorKind::BadChannel,
            Self::NoChannel(_) => ErrorKind::NoChannel,
            Self::NonMember(_) => ErrorKind::NonMember,
            Self::NonExist(_) => ErrorKind::NonExist,
            Self::Member(_) => ErrorKind::Member,
            Self::Schema(_) => ErrorKind::Schema,
        }
    }

    /// Convert to the error frame sent to the offending session.
    pub fn to_error_frame(&self) -> Frame {
        Frame::error(self.kind(), self.to_string())
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(HandlerError::BadNick("x".into()).kind(), ErrorKind::BadNick);
        assert_eq!(
            HandlerError::Member("#x".into()).kind(),
            ErrorKind::Member
        );
    }

    #[test]
    fn test_error_frame_shape() {
        let frame = HandlerError::NoChannel("#x".into()).to_error_frame();
        let value: serde_json::Value =
            serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(value["error"], "nochannel");
        assert_eq!(value["src"], "SERVER");
        assert_eq!(value["msg"], "no such channel: #x");
    }
}
