//! Frame codec for tokio.
//!
//! Segments the inbound byte stream into frames on `\n` (tolerating a
//! preceding `\r`), enforcing the 1024-byte frame cap, and encodes outbound
//! frames as JSON followed by `\r\n`.
//!
//! Framing violations do not tear the stream down: an oversized frame is
//! consumed up to its terminator and yielded as a single
//! [`Segment::Discarded`], so the broker can answer with a `schema` error
//! and keep the connection. (They must not be `Decoder` errors - `Framed`
//! fuses the stream after one.) Empty frames (from `\r\n\r\n` keepalives)
//! are swallowed here and never reach the validator.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{FrameError, ProtocolError};
use crate::{Frame, MAX_FRAME_LEN};

/// One decoded unit from the inbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A complete frame, terminator stripped.
    Frame(String),
    /// A frame consumed and dropped for violating the framing rules.
    Discarded(FrameError),
}

/// Codec cutting the byte stream into JSON frames.
#[derive(Debug)]
pub struct FrameCodec {
    /// Index of the next byte to check for a terminator.
    next_index: usize,
    /// Discarding an oversized frame until its terminator arrives.
    discarding: bool,
    /// Maximum frame length, terminator included.
    max_len: usize,
}

impl FrameCodec {
    /// Create a codec with the protocol frame cap of [`MAX_FRAME_LEN`].
    pub fn new() -> Self {
        Self::with_max_len(MAX_FRAME_LEN)
    }

    /// Create a codec with a custom frame cap (tests).
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            discarding: false,
            max_len,
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Segment;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Segment>, ProtocolError> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                // No terminator yet; remember where scanning stopped.
                self.next_index = src.len();

                if self.discarding {
                    // Everything buffered belongs to the oversized frame.
                    src.clear();
                    self.next_index = 0;
                    return Ok(None);
                }

                if src.len() > self.max_len {
                    // Frame already over the cap with no terminator in
                    // sight: report once, then swallow until the
                    // terminator.
                    self.discarding = true;
                    let actual = src.len();
                    src.clear();
                    self.next_index = 0;
                    return Ok(Some(Segment::Discarded(FrameError::TooLong {
                        actual,
                        limit: self.max_len,
                    })));
                }

                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if self.discarding {
                // Tail of an already-reported oversized frame.
                self.discarding = false;
                continue;
            }

            if line.len() > self.max_len {
                return Ok(Some(Segment::Discarded(FrameError::TooLong {
                    actual: line.len(),
                    limit: self.max_len,
                })));
            }

            // Strip `\n` and an optional preceding `\r`.
            let mut end = line.len() - 1;
            if end > 0 && line[end - 1] == b'\r' {
                end -= 1;
            }

            if end == 0 {
                // Empty frame between terminators; dropped silently.
                continue;
            }

            match std::str::from_utf8(&line[..end]) {
                Ok(text) => return Ok(Some(Segment::Frame(text.to_string()))),
                Err(e) => {
                    return Ok(Some(Segment::Discarded(FrameError::InvalidUtf8 {
                        byte_pos: e.valid_up_to(),
                    })));
                }
            }
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        let json = frame.to_json()?;
        dst.reserve(json.len() + 2);
        dst.put_slice(json.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
