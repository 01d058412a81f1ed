//! Version-keyed singletons for methods without arguments
//!
//! Each (kind, version) pair has exactly one `'static` instance, built at
//! compile time and never mutated, so decoding these methods allocates
//! nothing and concurrent decoders share the same values.

use std::fmt;

use bytes::{BufMut, Bytes};

use super::types::class;
use super::wire::read_long_string;
use super::{MethodId, ProtocolVersion, Result};

/// Methods that carry no arguments in at least one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PayloadlessKind {
    /// `connection.close-ok`
    ConnectionCloseOk,
    /// `channel.open-ok` (reserved long string from 0-9 onwards)
    ChannelOpenOk,
    /// `channel.close-ok`
    ChannelCloseOk,
    /// `exchange.declare-ok`
    ExchangeDeclareOk,
    /// `exchange.delete-ok`
    ExchangeDeleteOk,
    /// `queue.bind-ok`
    QueueBindOk,
    /// `basic.qos-ok`
    BasicQosOk,
}

const KIND_COUNT: usize = 7;

impl PayloadlessKind {
    const ALL: [Self; KIND_COUNT] = [
        Self::ConnectionCloseOk,
        Self::ChannelOpenOk,
        Self::ChannelCloseOk,
        Self::ExchangeDeclareOk,
        Self::ExchangeDeleteOk,
        Self::QueueBindOk,
        Self::BasicQosOk,
    ];

    /// Wire identifier under the given version.
    #[must_use]
    pub const fn method_id(self, version: ProtocolVersion) -> MethodId {
        match self {
            Self::ConnectionCloseOk => {
                MethodId::new(class::CONNECTION, version.connection_close_ok_method())
            }
            Self::ChannelOpenOk => MethodId::new(class::CHANNEL, 11),
            Self::ChannelCloseOk => MethodId::new(class::CHANNEL, 41),
            Self::ExchangeDeclareOk => MethodId::new(class::EXCHANGE, 11),
            Self::ExchangeDeleteOk => MethodId::new(class::EXCHANGE, 21),
            Self::QueueBindOk => MethodId::new(class::QUEUE, 21),
            Self::BasicQosOk => MethodId::new(class::BASIC, 11),
        }
    }

    /// Dotted method name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ConnectionCloseOk => "connection.close-ok",
            Self::ChannelOpenOk => "channel.open-ok",
            Self::ChannelCloseOk => "channel.close-ok",
            Self::ExchangeDeclareOk => "exchange.declare-ok",
            Self::ExchangeDeleteOk => "exchange.delete-ok",
            Self::QueueBindOk => "queue.bind-ok",
            Self::BasicQosOk => "basic.qos-ok",
        }
    }

    const fn has_reserved_field(self, version: ProtocolVersion) -> bool {
        matches!(self, Self::ChannelOpenOk) && version.has_channel_open_ok_reserved()
    }
}

/// Argument-free method body for one protocol version.
#[derive(Debug, PartialEq, Eq)]
pub struct Payloadless {
    kind: PayloadlessKind,
    version: ProtocolVersion,
}

// Rows follow the declaration order of `PayloadlessKind`, which `instance`
// relies on when indexing by discriminant.
const fn row(version: ProtocolVersion) -> [Payloadless; KIND_COUNT] {
    const fn at(index: usize, version: ProtocolVersion) -> Payloadless {
        Payloadless {
            kind: PayloadlessKind::ALL[index],
            version,
        }
    }
    [
        at(0, version),
        at(1, version),
        at(2, version),
        at(3, version),
        at(4, version),
        at(5, version),
        at(6, version),
    ]
}

static INSTANCES: [[Payloadless; KIND_COUNT]; ProtocolVersion::COUNT] = [
    row(ProtocolVersion::V0_8),
    row(ProtocolVersion::V0_9),
    row(ProtocolVersion::V0_91),
];

impl Payloadless {
    /// The shared instance for a kind under a version.
    #[must_use]
    pub fn instance(kind: PayloadlessKind, version: ProtocolVersion) -> &'static Self {
        &INSTANCES[version.index()][kind as usize]
    }

    /// Method kind
    #[must_use]
    pub const fn kind(&self) -> PayloadlessKind {
        self.kind
    }

    /// Version this instance was built for
    #[must_use]
    pub const fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Encoded argument size under this instance's version.
    #[must_use]
    pub const fn encoded_size(&self) -> usize {
        if self.kind.has_reserved_field(self.version) {
            4
        } else {
            0
        }
    }

    /// Write the (possibly empty) argument block.
    pub fn encode(&self, buf: &mut impl BufMut) {
        if self.kind.has_reserved_field(self.version) {
            buf.put_u32(0);
        }
    }

    /// Consume the argument block for `kind` and return the shared instance.
    pub fn decode(
        kind: PayloadlessKind,
        version: ProtocolVersion,
        buf: &mut Bytes,
    ) -> Result<&'static Self> {
        if kind.has_reserved_field(version) {
            let _reserved = read_long_string(buf)?;
        }
        Ok(Self::instance(kind, version))
    }
}

impl fmt::Display for Payloadless {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.kind.name(), self.version)
    }
}
