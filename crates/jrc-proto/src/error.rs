//! Error types for the relay protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors. These are fatal to a connection; per-frame
/// violations that leave the stream usable are [`FrameError`]s carried
/// inside the codec's output instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame was not a JSON object matching the command schema.
    #[error("malformed frame: {0}")]
    Malformed(String),
}

/// Per-frame violations of the framing rules.
///
/// The offending frame has already been consumed from the stream when one
/// of these surfaces; the broker answers with a `schema` error and keeps
/// reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Frame exceeded the maximum allowed length, terminator included.
    #[error("frame too long: {actual} bytes (limit: {limit})")]
    TooLong {
        /// Observed length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Frame bytes were not valid UTF-8.
    #[error("invalid UTF-8 in frame at byte {byte_pos}")]
    InvalidUtf8 {
        /// Byte position where UTF-8 validation failed.
        byte_pos: usize,
    },
}
