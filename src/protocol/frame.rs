//! Frame envelope and the per-connection frame decoder
//!
//! # Format
//!
//! ```text
//! [TYPE (1)] [CHANNEL (2)] [SIZE (4)] [PAYLOAD (SIZE bytes)] [FRAME END 0xCE (1)]
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use super::codec::{self, peek_method_id};
use super::metrics::Metrics;
use super::{DEFAULT_FRAME_MAX, Error, FRAME_END, MethodBody, ProtocolVersion, Result};

/// Octets of framing around every payload: 7 header bytes plus the end octet.
pub const FRAME_OVERHEAD: usize = 8;

const FRAME_HEADER_SIZE: usize = 7;

/// Frame type octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FrameType {
    /// Method invocation
    Method = 1,
    /// Content header
    Header = 2,
    /// Content body
    Body = 3,
    /// Connection keep-alive
    Heartbeat = 8,
}

impl FrameType {
    /// Convert from the wire octet.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Method),
            2 => Ok(Self::Header),
            3 => Ok(Self::Body),
            8 => Ok(Self::Heartbeat),
            _ => Err(Error::InvalidFrameType { type_byte: value }),
        }
    }

    /// Wire octet
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// One complete frame with its payload still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame type
    pub frame_type: FrameType,
    /// Channel number; 0 is the connection itself
    pub channel: u16,
    /// Raw payload
    pub payload: Bytes,
}

impl Frame {
    /// Wrap an encoded method body in a method frame.
    #[must_use]
    pub fn method(channel: u16, body: &MethodBody, version: ProtocolVersion) -> Self {
        Self {
            frame_type: FrameType::Method,
            channel,
            payload: codec::encode(body, version),
        }
    }

    /// An empty heartbeat frame on channel 0.
    #[must_use]
    pub const fn heartbeat() -> Self {
        Self {
            frame_type: FrameType::Heartbeat,
            channel: 0,
            payload: Bytes::new(),
        }
    }

    /// Total encoded size including framing.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Append the encoded frame to `buf`.
    ///
    /// # Panics
    ///
    /// Panics if the payload does not fit the 32-bit size field.
    pub fn encode(&self, buf: &mut impl BufMut) {
        let size = u32::try_from(self.payload.len()).expect("frame payload exceeds u32::MAX bytes");
        buf.put_u8(self.frame_type.as_u8());
        buf.put_u16(self.channel);
        buf.put_u32(size);
        buf.put_slice(&self.payload);
        buf.put_u8(FRAME_END);
        Metrics::record_frame_encoded();
    }

    /// Encode into a fresh buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_size());
        self.encode(&mut buf);
        buf.freeze()
    }
}

/// Frame codec settings negotiated for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FrameCodecConfig {
    /// Negotiated protocol version.
    pub version: ProtocolVersion,
    /// Largest accepted frame in bytes, framing octets included; 0 is unlimited.
    pub frame_max: u32,
}

impl Default for FrameCodecConfig {
    fn default() -> Self {
        Self {
            version: ProtocolVersion::V0_91,
            frame_max: DEFAULT_FRAME_MAX,
        }
    }
}

impl FrameCodecConfig {
    /// Defaults for `version`.
    #[must_use]
    pub fn for_version(version: ProtocolVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Override the maximum frame size.
    #[must_use]
    pub const fn with_frame_max(mut self, frame_max: u32) -> Self {
        self.frame_max = frame_max;
        self
    }

    /// Largest accepted payload; a `frame_max` of 0 means no limit.
    fn max_payload(&self) -> usize {
        match self.frame_max {
            0 => usize::MAX,
            frame_max => (frame_max as usize).saturating_sub(FRAME_OVERHEAD),
        }
    }
}

/// Decodes one connection's inbound byte stream, frame by frame and in order.
///
/// The decoder keeps no state between frames beyond its configuration, so a
/// failure on one frame leaves it usable; whether the connection survives is
/// the caller's decision.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder {
    config: FrameCodecConfig,
}

impl FrameDecoder {
    /// Create a decoder for an established connection.
    #[must_use]
    pub const fn new(config: FrameCodecConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &FrameCodecConfig {
        &self.config
    }

    /// Negotiated protocol version
    #[must_use]
    pub const fn version(&self) -> ProtocolVersion {
        self.config.version
    }

    /// Apply a `frame_max` agreed during connection tuning.
    pub fn set_frame_max(&mut self, frame_max: u32) {
        debug!(frame_max, "frame max updated");
        self.config.frame_max = frame_max;
    }

    /// Split the next complete frame off the front of `buf`.
    ///
    /// Returns `Ok(None)` when `buf` holds only part of a frame; nothing is
    /// consumed in that case.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The type octet is unknown
    /// - The declared size exceeds `frame_max`
    /// - The frame does not end with `0xCE`
    pub fn decode_next(&self, buf: &mut BytesMut) -> Result<Option<Frame>> {
        self.split_frame(buf).inspect_err(|err| {
            Metrics::record_decode_error();
            debug!(error = %err, "rejecting frame");
        })
    }

    fn split_frame(&self, buf: &mut BytesMut) -> Result<Option<Frame>> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let mut header = &buf[..FRAME_HEADER_SIZE];
        let frame_type = FrameType::from_u8(header.get_u8())?;
        let channel = header.get_u16();
        let size = header.get_u32() as usize;

        let max = self.config.max_payload();
        if size > max {
            return Err(Error::FrameTooLarge { size, max });
        }

        let total = FRAME_HEADER_SIZE + size + 1;
        if buf.len() < total {
            buf.reserve(total - buf.len());
            return Ok(None);
        }

        let end = buf[total - 1];
        if end != FRAME_END {
            return Err(Error::InvalidFrameEnd { found: end });
        }

        let mut frame = buf.split_to(total).freeze();
        frame.advance(FRAME_HEADER_SIZE);
        frame.truncate(size);

        Metrics::record_frame_decoded(frame_type == FrameType::Heartbeat);
        trace!(?frame_type, channel, size, "frame decoded");

        Ok(Some(Frame {
            frame_type,
            channel,
            payload: frame,
        }))
    }

    /// Decode the method carried by a method frame.
    ///
    /// # Errors
    ///
    /// Every failure is wrapped in [`Error::MalformedFrame`] carrying the
    /// channel and, when readable, the (class, method) pair.
    pub fn decode_method(&self, frame: &Frame) -> Result<MethodBody> {
        let method = peek_method_id(&frame.payload);
        let result = if frame.frame_type == FrameType::Method {
            codec::decode(frame.payload.clone(), self.config.version)
        } else {
            Err(Error::InvalidFrameType {
                type_byte: frame.frame_type.as_u8(),
            })
        };

        result.map_err(|err| {
            Metrics::record_decode_error();
            debug!(channel = frame.channel, error = %err, "malformed method frame");
            err.in_frame(frame.channel, method)
        })
    }
}
