//! Protocol versions and method identifiers

use std::fmt;

use super::{Error, Result};

/// Class identifiers shared by every supported protocol version.
pub mod class {
    /// Connection class
    pub const CONNECTION: u16 = 10;
    /// Channel class
    pub const CHANNEL: u16 = 20;
    /// Exchange class
    pub const EXCHANGE: u16 = 40;
    /// Queue class
    pub const QUEUE: u16 = 50;
    /// Basic class
    pub const BASIC: u16 = 60;
}

/// Negotiated AMQP protocol version.
///
/// Gates every version-conditional branch in the codec. The set is closed:
/// anything else is rejected when the protocol header is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProtocolVersion {
    /// AMQP 0-8
    V0_8,
    /// AMQP 0-9
    V0_9,
    /// AMQP 0-9-1
    V0_91,
}

impl ProtocolVersion {
    /// Every supported version, oldest first.
    pub const ALL: [Self; 3] = [Self::V0_8, Self::V0_9, Self::V0_91];

    /// Number of supported versions.
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index used for per-version lookup tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::V0_8 => 0,
            Self::V0_9 => 1,
            Self::V0_91 => 2,
        }
    }

    /// The 8-byte protocol initiation header sent by a client.
    #[must_use]
    pub const fn header(self) -> [u8; 8] {
        match self {
            Self::V0_8 => *b"AMQP\x01\x01\x08\x00",
            Self::V0_9 => *b"AMQP\x01\x01\x00\x09",
            Self::V0_91 => *b"AMQP\x00\x00\x09\x01",
        }
    }

    /// Parse a protocol initiation header.
    pub fn from_header(bytes: &[u8]) -> Result<Self> {
        let header: [u8; 8] = bytes
            .get(..8)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(Error::BufferTooSmall {
                needed: 8,
                got: bytes.len(),
            })?;

        Self::ALL
            .into_iter()
            .find(|version| version.header() == header)
            .ok_or(Error::UnsupportedProtocolHeader { found: header })
    }

    /// `channel.open-ok` carries a reserved long string from 0-9 onwards.
    #[must_use]
    pub const fn has_channel_open_ok_reserved(self) -> bool {
        !matches!(self, Self::V0_8)
    }

    /// Method index of `connection.close`; 0-8 numbers it 60, later versions 50.
    #[must_use]
    pub const fn connection_close_method(self) -> u16 {
        match self {
            Self::V0_8 => 60,
            Self::V0_9 | Self::V0_91 => 50,
        }
    }

    /// Method index of `connection.close-ok`.
    #[must_use]
    pub const fn connection_close_ok_method(self) -> u16 {
        self.connection_close_method() + 1
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::V0_8 => "0-8",
            Self::V0_9 => "0-9",
            Self::V0_91 => "0-9-1",
        };
        write!(f, "{name}")
    }
}

/// (class id, method id) pair identifying a method on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodId {
    /// Class identifier
    pub class_id: u16,
    /// Method identifier within the class
    pub method_id: u16,
}

impl MethodId {
    /// Create a method identifier
    #[must_use]
    pub const fn new(class_id: u16, method_id: u16) -> Self {
        Self {
            class_id,
            method_id,
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.class_id, self.method_id)
    }
}
