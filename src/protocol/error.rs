//! Frame codec error types

use thiserror::Error;

use super::{MethodId, ProtocolVersion};

/// Frame decoding errors
///
/// Every variant describes malformed input from one peer. None of them are
/// transient: the connection handler decides whether to close the connection.
#[derive(Error, Debug)]
pub enum Error {
    /// Buffer ended before a complete value could be read
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },

    /// Protocol initiation header names no supported version
    #[error("unsupported protocol header: {found:02x?}")]
    UnsupportedProtocolHeader {
        /// Header bytes received
        found: [u8; 8],
    },

    /// Frame type octet is not one this codec understands
    #[error("invalid frame type: {type_byte:#x}")]
    InvalidFrameType {
        /// Invalid type byte
        type_byte: u8,
    },

    /// Frame did not end with the frame-end octet
    #[error("invalid frame end: expected 0xce, got {found:#x}")]
    InvalidFrameEnd {
        /// Octet found where the frame end was expected
        found: u8,
    },

    /// Declared frame size exceeds the negotiated maximum
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge {
        /// Declared payload size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// (class, method) pair is not defined for the negotiated version
    #[error("unknown method {method} for protocol {version}")]
    UnknownMethod {
        /// Method identifier read from the payload
        method: MethodId,
        /// Negotiated protocol version
        version: ProtocolVersion,
    },

    /// Field table entry carries an unknown type tag
    #[error("invalid field type tag: {tag:#x}")]
    InvalidFieldType {
        /// Type tag byte
        tag: u8,
    },

    /// Field tables nest deeper than the decoder accepts
    #[error("field tables nested deeper than {max} levels")]
    TableTooDeep {
        /// Deepest accepted nesting
        max: usize,
    },

    /// Field table repeats a key
    #[error("duplicate field table key {key:?}")]
    DuplicateFieldKey {
        /// Repeated key
        key: String,
    },

    /// Long string length prefix exceeds the `0xFFFE` ceiling
    #[error("long string of {len} bytes exceeds 0xfffe")]
    LongStringTooLong {
        /// Declared length
        len: usize,
    },

    /// Method arguments did not consume the whole payload
    #[error("{count} trailing bytes after method arguments")]
    TrailingBytes {
        /// Unconsumed byte count
        count: usize,
    },

    /// Invalid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Decoding failure annotated with the frame it came from
    #[error(
        "malformed frame on channel {channel} (method {}): {source}",
        describe_method(.method)
    )]
    MalformedFrame {
        /// Channel the frame arrived on
        channel: u16,
        /// Method identifier, when the payload was long enough to carry one
        method: Option<MethodId>,
        /// Underlying decoding failure
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach frame context to a decoding failure.
    #[must_use]
    pub fn in_frame(self, channel: u16, method: Option<MethodId>) -> Self {
        Self::MalformedFrame {
            channel,
            method,
            source: Box::new(self),
        }
    }
}

fn describe_method(method: &Option<MethodId>) -> String {
    match method {
        Some(method) => method.to_string(),
        None => "unknown".to_owned(),
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
