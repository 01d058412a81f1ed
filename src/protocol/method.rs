//! Method bodies
//!
//! One struct per method with arguments, plus [`MethodBody`], the tagged
//! union handed to dispatch. Argument layouts are identical across the
//! supported versions; the version-dependent parts (method numbering and
//! reserved fields) are resolved by the codec and by [`Payloadless`].

use bytes::{BufMut, Bytes};

use super::payloadless::{Payloadless, PayloadlessKind};
use super::types::class;
use super::wire::{
    field_table_size, long_string_size, read_booleans, read_content, read_field_table,
    read_long_string, read_short_string, read_u8, read_u16, read_u32, read_u64, short_string_size,
    write_booleans, write_content, write_field_table, write_long_string, write_short_string,
};
use super::{FieldTable, MethodId, ProtocolVersion, Result};

/// Argument block of a method with a fixed layout.
pub(crate) trait Arguments: Sized {
    fn encoded_size(&self) -> usize;
    fn write(&self, buf: &mut impl BufMut);
    fn read(buf: &mut Bytes) -> Result<Self>;
}

/// `connection.start`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionStart {
    /// Protocol major version
    pub version_major: u8,
    /// Protocol minor version
    pub version_minor: u8,
    /// Server properties
    pub server_properties: Option<FieldTable>,
    /// Space-separated SASL mechanisms
    pub mechanisms: Bytes,
    /// Space-separated message locales
    pub locales: Bytes,
}

impl Arguments for ConnectionStart {
    fn encoded_size(&self) -> usize {
        2 + field_table_size(self.server_properties.as_ref())
            + long_string_size(&self.mechanisms)
            + long_string_size(&self.locales)
    }

    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.version_major);
        buf.put_u8(self.version_minor);
        write_field_table(buf, self.server_properties.as_ref());
        write_long_string(buf, &self.mechanisms);
        write_long_string(buf, &self.locales);
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        Ok(Self {
            version_major: read_u8(buf)?,
            version_minor: read_u8(buf)?,
            server_properties: read_field_table(buf)?,
            mechanisms: read_long_string(buf)?,
            locales: read_long_string(buf)?,
        })
    }
}

/// `connection.start-ok`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionStartOk {
    /// Client properties
    pub client_properties: Option<FieldTable>,
    /// Selected SASL mechanism
    pub mechanism: Option<String>,
    /// SASL response blob
    pub response: Bytes,
    /// Selected locale
    pub locale: Option<String>,
}

impl Arguments for ConnectionStartOk {
    fn encoded_size(&self) -> usize {
        field_table_size(self.client_properties.as_ref())
            + short_string_size(self.mechanism.as_deref())
            + 4
            + self.response.len()
            + short_string_size(self.locale.as_deref())
    }

    fn write(&self, buf: &mut impl BufMut) {
        write_field_table(buf, self.client_properties.as_ref());
        write_short_string(buf, self.mechanism.as_deref());
        write_content(buf, &self.response);
        write_short_string(buf, self.locale.as_deref());
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        Ok(Self {
            client_properties: read_field_table(buf)?,
            mechanism: read_short_string(buf)?,
            response: read_content(buf)?,
            locale: read_short_string(buf)?,
        })
    }
}

/// `connection.tune` and `connection.tune-ok`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tune {
    /// Highest usable channel number
    pub channel_max: u16,
    /// Largest frame size in bytes
    pub frame_max: u32,
    /// Heartbeat interval in seconds
    pub heartbeat: u16,
}

impl Arguments for Tune {
    fn encoded_size(&self) -> usize {
        8
    }

    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.channel_max);
        buf.put_u32(self.frame_max);
        buf.put_u16(self.heartbeat);
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        Ok(Self {
            channel_max: read_u16(buf)?,
            frame_max: read_u32(buf)?,
            heartbeat: read_u16(buf)?,
        })
    }
}

/// `connection.open`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOpen {
    /// Virtual host
    pub virtual_host: Option<String>,
    /// Required capabilities
    pub capabilities: Option<String>,
    /// Refuse redirection
    pub insist: bool,
}

impl Arguments for ConnectionOpen {
    fn encoded_size(&self) -> usize {
        short_string_size(self.virtual_host.as_deref())
            + short_string_size(self.capabilities.as_deref())
            + 1
    }

    fn write(&self, buf: &mut impl BufMut) {
        write_short_string(buf, self.virtual_host.as_deref());
        write_short_string(buf, self.capabilities.as_deref());
        write_booleans(buf, &[self.insist]);
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        let virtual_host = read_short_string(buf)?;
        let capabilities = read_short_string(buf)?;
        let [insist, ..] = read_booleans(buf)?;
        Ok(Self {
            virtual_host,
            capabilities,
            insist,
        })
    }
}

/// `connection.open-ok`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOpenOk {
    /// Known hosts
    pub known_hosts: Option<String>,
}

impl Arguments for ConnectionOpenOk {
    fn encoded_size(&self) -> usize {
        short_string_size(self.known_hosts.as_deref())
    }

    fn write(&self, buf: &mut impl BufMut) {
        write_short_string(buf, self.known_hosts.as_deref());
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        Ok(Self {
            known_hosts: read_short_string(buf)?,
        })
    }
}

/// `connection.close` and `channel.close`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Close {
    /// Reply code
    pub reply_code: u16,
    /// Reply text
    pub reply_text: Option<String>,
    /// Class of the method that caused the close, or zero
    pub class_id: u16,
    /// Method that caused the close, or zero
    pub method_id: u16,
}

impl Close {
    /// Method that triggered the close, if the peer named one.
    #[must_use]
    pub const fn failed_method(&self) -> Option<MethodId> {
        if self.class_id == 0 && self.method_id == 0 {
            None
        } else {
            Some(MethodId::new(self.class_id, self.method_id))
        }
    }
}

impl Arguments for Close {
    fn encoded_size(&self) -> usize {
        2 + short_string_size(self.reply_text.as_deref()) + 4
    }

    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.reply_code);
        write_short_string(buf, self.reply_text.as_deref());
        buf.put_u16(self.class_id);
        buf.put_u16(self.method_id);
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        Ok(Self {
            reply_code: read_u16(buf)?,
            reply_text: read_short_string(buf)?,
            class_id: read_u16(buf)?,
            method_id: read_u16(buf)?,
        })
    }
}

/// `channel.open`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelOpen {
    /// Out-of-band settings
    pub out_of_band: Option<String>,
}

impl Arguments for ChannelOpen {
    fn encoded_size(&self) -> usize {
        short_string_size(self.out_of_band.as_deref())
    }

    fn write(&self, buf: &mut impl BufMut) {
        write_short_string(buf, self.out_of_band.as_deref());
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        Ok(Self {
            out_of_band: read_short_string(buf)?,
        })
    }
}

/// `channel.flow` and `channel.flow-ok`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flow {
    /// Whether content flow is enabled
    pub active: bool,
}

impl Arguments for Flow {
    fn encoded_size(&self) -> usize {
        1
    }

    fn write(&self, buf: &mut impl BufMut) {
        write_booleans(buf, &[self.active]);
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        let [active, ..] = read_booleans(buf)?;
        Ok(Self { active })
    }
}

/// `exchange.declare`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeDeclare {
    /// Access ticket
    pub ticket: u16,
    /// Exchange name
    pub exchange: Option<String>,
    /// Exchange type, e.g. `headers`
    pub kind: Option<String>,
    /// Only check that the exchange exists
    pub passive: bool,
    /// Survive broker restart
    pub durable: bool,
    /// Delete when the last binding goes
    pub auto_delete: bool,
    /// Not publishable by clients
    pub internal: bool,
    /// Do not send declare-ok
    pub nowait: bool,
    /// Exchange arguments
    pub arguments: Option<FieldTable>,
}

impl Arguments for ExchangeDeclare {
    fn encoded_size(&self) -> usize {
        2 + short_string_size(self.exchange.as_deref())
            + short_string_size(self.kind.as_deref())
            + 1
            + field_table_size(self.arguments.as_ref())
    }

    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.ticket);
        write_short_string(buf, self.exchange.as_deref());
        write_short_string(buf, self.kind.as_deref());
        write_booleans(
            buf,
            &[
                self.passive,
                self.durable,
                self.auto_delete,
                self.internal,
                self.nowait,
            ],
        );
        write_field_table(buf, self.arguments.as_ref());
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        let ticket = read_u16(buf)?;
        let exchange = read_short_string(buf)?;
        let kind = read_short_string(buf)?;
        let [passive, durable, auto_delete, internal, nowait, ..] = read_booleans(buf)?;
        Ok(Self {
            ticket,
            exchange,
            kind,
            passive,
            durable,
            auto_delete,
            internal,
            nowait,
            arguments: read_field_table(buf)?,
        })
    }
}

/// `exchange.delete`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeDelete {
    /// Access ticket
    pub ticket: u16,
    /// Exchange name
    pub exchange: Option<String>,
    /// Only delete when unbound
    pub if_unused: bool,
    /// Do not send delete-ok
    pub nowait: bool,
}

impl Arguments for ExchangeDelete {
    fn encoded_size(&self) -> usize {
        2 + short_string_size(self.exchange.as_deref()) + 1
    }

    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.ticket);
        write_short_string(buf, self.exchange.as_deref());
        write_booleans(buf, &[self.if_unused, self.nowait]);
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        let ticket = read_u16(buf)?;
        let exchange = read_short_string(buf)?;
        let [if_unused, nowait, ..] = read_booleans(buf)?;
        Ok(Self {
            ticket,
            exchange,
            if_unused,
            nowait,
        })
    }
}

/// `queue.declare`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueDeclare {
    /// Access ticket
    pub ticket: u16,
    /// Queue name; absent asks the broker to generate one
    pub queue: Option<String>,
    /// Only check that the queue exists
    pub passive: bool,
    /// Survive broker restart
    pub durable: bool,
    /// Owned by this connection
    pub exclusive: bool,
    /// Delete when the last consumer goes
    pub auto_delete: bool,
    /// Do not send declare-ok
    pub nowait: bool,
    /// Queue arguments
    pub arguments: Option<FieldTable>,
}

impl Arguments for QueueDeclare {
    fn encoded_size(&self) -> usize {
        2 + short_string_size(self.queue.as_deref())
            + 1
            + field_table_size(self.arguments.as_ref())
    }

    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.ticket);
        write_short_string(buf, self.queue.as_deref());
        write_booleans(
            buf,
            &[
                self.passive,
                self.durable,
                self.exclusive,
                self.auto_delete,
                self.nowait,
            ],
        );
        write_field_table(buf, self.arguments.as_ref());
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        let ticket = read_u16(buf)?;
        let queue = read_short_string(buf)?;
        let [passive, durable, exclusive, auto_delete, nowait, ..] = read_booleans(buf)?;
        Ok(Self {
            ticket,
            queue,
            passive,
            durable,
            exclusive,
            auto_delete,
            nowait,
            arguments: read_field_table(buf)?,
        })
    }
}

/// `queue.declare-ok`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueDeclareOk {
    /// Queue name
    pub queue: Option<String>,
    /// Messages ready in the queue
    pub message_count: u32,
    /// Active consumers
    pub consumer_count: u32,
}

impl Arguments for QueueDeclareOk {
    fn encoded_size(&self) -> usize {
        short_string_size(self.queue.as_deref()) + 8
    }

    fn write(&self, buf: &mut impl BufMut) {
        write_short_string(buf, self.queue.as_deref());
        buf.put_u32(self.message_count);
        buf.put_u32(self.consumer_count);
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        Ok(Self {
            queue: read_short_string(buf)?,
            message_count: read_u32(buf)?,
            consumer_count: read_u32(buf)?,
        })
    }
}

/// `queue.bind`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueBind {
    /// Access ticket
    pub ticket: u16,
    /// Queue to bind
    pub queue: Option<String>,
    /// Exchange to bind to
    pub exchange: Option<String>,
    /// Binding key
    pub routing_key: Option<String>,
    /// Do not send bind-ok
    pub nowait: bool,
    /// Binding arguments; a headers exchange matches on these
    pub arguments: Option<FieldTable>,
}

impl Arguments for QueueBind {
    fn encoded_size(&self) -> usize {
        2 + short_string_size(self.queue.as_deref())
            + short_string_size(self.exchange.as_deref())
            + short_string_size(self.routing_key.as_deref())
            + 1
            + field_table_size(self.arguments.as_ref())
    }

    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.ticket);
        write_short_string(buf, self.queue.as_deref());
        write_short_string(buf, self.exchange.as_deref());
        write_short_string(buf, self.routing_key.as_deref());
        write_booleans(buf, &[self.nowait]);
        write_field_table(buf, self.arguments.as_ref());
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        let ticket = read_u16(buf)?;
        let queue = read_short_string(buf)?;
        let exchange = read_short_string(buf)?;
        let routing_key = read_short_string(buf)?;
        let [nowait, ..] = read_booleans(buf)?;
        Ok(Self {
            ticket,
            queue,
            exchange,
            routing_key,
            nowait,
            arguments: read_field_table(buf)?,
        })
    }
}

/// `basic.qos`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicQos {
    /// Prefetch window in octets
    pub prefetch_size: u32,
    /// Prefetch window in messages
    pub prefetch_count: u16,
    /// Apply to the whole connection
    pub global: bool,
}

impl Arguments for BasicQos {
    fn encoded_size(&self) -> usize {
        7
    }

    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u32(self.prefetch_size);
        buf.put_u16(self.prefetch_count);
        write_booleans(buf, &[self.global]);
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        let prefetch_size = read_u32(buf)?;
        let prefetch_count = read_u16(buf)?;
        let [global, ..] = read_booleans(buf)?;
        Ok(Self {
            prefetch_size,
            prefetch_count,
            global,
        })
    }
}

/// `basic.publish`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicPublish {
    /// Access ticket
    pub ticket: u16,
    /// Target exchange
    pub exchange: Option<String>,
    /// Routing key
    pub routing_key: Option<String>,
    /// Return the message if it cannot be routed
    pub mandatory: bool,
    /// Return the message if it cannot be delivered at once
    pub immediate: bool,
}

impl Arguments for BasicPublish {
    fn encoded_size(&self) -> usize {
        2 + short_string_size(self.exchange.as_deref())
            + short_string_size(self.routing_key.as_deref())
            + 1
    }

    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u16(self.ticket);
        write_short_string(buf, self.exchange.as_deref());
        write_short_string(buf, self.routing_key.as_deref());
        write_booleans(buf, &[self.mandatory, self.immediate]);
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        let ticket = read_u16(buf)?;
        let exchange = read_short_string(buf)?;
        let routing_key = read_short_string(buf)?;
        let [mandatory, immediate, ..] = read_booleans(buf)?;
        Ok(Self {
            ticket,
            exchange,
            routing_key,
            mandatory,
            immediate,
        })
    }
}

/// `basic.deliver`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicDeliver {
    /// Consumer tag
    pub consumer_tag: Option<String>,
    /// Delivery tag
    pub delivery_tag: u64,
    /// Message was delivered before
    pub redelivered: bool,
    /// Exchange the message was published to
    pub exchange: Option<String>,
    /// Routing key used for publishing
    pub routing_key: Option<String>,
}

impl Arguments for BasicDeliver {
    fn encoded_size(&self) -> usize {
        short_string_size(self.consumer_tag.as_deref())
            + 8
            + 1
            + short_string_size(self.exchange.as_deref())
            + short_string_size(self.routing_key.as_deref())
    }

    fn write(&self, buf: &mut impl BufMut) {
        write_short_string(buf, self.consumer_tag.as_deref());
        buf.put_u64(self.delivery_tag);
        write_booleans(buf, &[self.redelivered]);
        write_short_string(buf, self.exchange.as_deref());
        write_short_string(buf, self.routing_key.as_deref());
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        let consumer_tag = read_short_string(buf)?;
        let delivery_tag = read_u64(buf)?;
        let [redelivered, ..] = read_booleans(buf)?;
        Ok(Self {
            consumer_tag,
            delivery_tag,
            redelivered,
            exchange: read_short_string(buf)?,
            routing_key: read_short_string(buf)?,
        })
    }
}

/// `basic.ack`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicAck {
    /// Delivery tag
    pub delivery_tag: u64,
    /// Acknowledge everything up to and including the tag
    pub multiple: bool,
}

impl Arguments for BasicAck {
    fn encoded_size(&self) -> usize {
        9
    }

    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u64(self.delivery_tag);
        write_booleans(buf, &[self.multiple]);
    }

    fn read(buf: &mut Bytes) -> Result<Self> {
        let delivery_tag = read_u64(buf)?;
        let [multiple, ..] = read_booleans(buf)?;
        Ok(Self {
            delivery_tag,
            multiple,
        })
    }
}

/// Decoded method, keyed by (class id, method id)
///
/// Argument-free methods hold the shared [`Payloadless`] instance for the
/// version they were decoded under.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodBody {
    /// `connection.start`
    ConnectionStart(ConnectionStart),
    /// `connection.start-ok`
    ConnectionStartOk(ConnectionStartOk),
    /// `connection.tune`
    ConnectionTune(Tune),
    /// `connection.tune-ok`
    ConnectionTuneOk(Tune),
    /// `connection.open`
    ConnectionOpen(ConnectionOpen),
    /// `connection.open-ok`
    ConnectionOpenOk(ConnectionOpenOk),
    /// `connection.close`
    ConnectionClose(Close),
    /// `connection.close-ok`
    ConnectionCloseOk(&'static Payloadless),
    /// `channel.open`
    ChannelOpen(ChannelOpen),
    /// `channel.open-ok`
    ChannelOpenOk(&'static Payloadless),
    /// `channel.flow`
    ChannelFlow(Flow),
    /// `channel.flow-ok`
    ChannelFlowOk(Flow),
    /// `channel.close`
    ChannelClose(Close),
    /// `channel.close-ok`
    ChannelCloseOk(&'static Payloadless),
    /// `exchange.declare`
    ExchangeDeclare(ExchangeDeclare),
    /// `exchange.declare-ok`
    ExchangeDeclareOk(&'static Payloadless),
    /// `exchange.delete`
    ExchangeDelete(ExchangeDelete),
    /// `exchange.delete-ok`
    ExchangeDeleteOk(&'static Payloadless),
    /// `queue.declare`
    QueueDeclare(QueueDeclare),
    /// `queue.declare-ok`
    QueueDeclareOk(QueueDeclareOk),
    /// `queue.bind`
    QueueBind(QueueBind),
    /// `queue.bind-ok`
    QueueBindOk(&'static Payloadless),
    /// `basic.qos`
    BasicQos(BasicQos),
    /// `basic.qos-ok`
    BasicQosOk(&'static Payloadless),
    /// `basic.publish`
    BasicPublish(BasicPublish),
    /// `basic.deliver`
    BasicDeliver(BasicDeliver),
    /// `basic.ack`
    BasicAck(BasicAck),
}

impl MethodBody {
    /// Body for an argument-free method, backed by the version singleton.
    #[must_use]
    pub fn payloadless(kind: PayloadlessKind, version: ProtocolVersion) -> Self {
        let instance = Payloadless::instance(kind, version);
        match kind {
            PayloadlessKind::ConnectionCloseOk => Self::ConnectionCloseOk(instance),
            PayloadlessKind::ChannelOpenOk => Self::ChannelOpenOk(instance),
            PayloadlessKind::ChannelCloseOk => Self::ChannelCloseOk(instance),
            PayloadlessKind::ExchangeDeclareOk => Self::ExchangeDeclareOk(instance),
            PayloadlessKind::ExchangeDeleteOk => Self::ExchangeDeleteOk(instance),
            PayloadlessKind::QueueBindOk => Self::QueueBindOk(instance),
            PayloadlessKind::BasicQosOk => Self::BasicQosOk(instance),
        }
    }

    /// Shared singleton, if this is an argument-free method.
    #[must_use]
    pub const fn as_payloadless(&self) -> Option<&'static Payloadless> {
        match self {
            Self::ConnectionCloseOk(p)
            | Self::ChannelOpenOk(p)
            | Self::ChannelCloseOk(p)
            | Self::ExchangeDeclareOk(p)
            | Self::ExchangeDeleteOk(p)
            | Self::QueueBindOk(p)
            | Self::BasicQosOk(p) => Some(*p),
            _ => None,
        }
    }

    /// Class identifier; the same in every version.
    #[must_use]
    pub fn class_id(&self) -> u16 {
        self.method_id(ProtocolVersion::V0_91).class_id
    }

    /// Wire identifier under the given version.
    #[must_use]
    pub fn method_id(&self, version: ProtocolVersion) -> MethodId {
        let (class_id, method_id) = match self {
            Self::ConnectionStart(_) => (class::CONNECTION, 10),
            Self::ConnectionStartOk(_) => (class::CONNECTION, 11),
            Self::ConnectionTune(_) => (class::CONNECTION, 30),
            Self::ConnectionTuneOk(_) => (class::CONNECTION, 31),
            Self::ConnectionOpen(_) => (class::CONNECTION, 40),
            Self::ConnectionOpenOk(_) => (class::CONNECTION, 41),
            Self::ConnectionClose(_) => (class::CONNECTION, version.connection_close_method()),
            Self::ChannelOpen(_) => (class::CHANNEL, 10),
            Self::ChannelFlow(_) => (class::CHANNEL, 20),
            Self::ChannelFlowOk(_) => (class::CHANNEL, 21),
            Self::ChannelClose(_) => (class::CHANNEL, 40),
            Self::ExchangeDeclare(_) => (class::EXCHANGE, 10),
            Self::ExchangeDelete(_) => (class::EXCHANGE, 20),
            Self::QueueDeclare(_) => (class::QUEUE, 10),
            Self::QueueDeclareOk(_) => (class::QUEUE, 11),
            Self::QueueBind(_) => (class::QUEUE, 20),
            Self::BasicQos(_) => (class::BASIC, 10),
            Self::BasicPublish(_) => (class::BASIC, 40),
            Self::BasicDeliver(_) => (class::BASIC, 60),
            Self::BasicAck(_) => (class::BASIC, 80),
            Self::ConnectionCloseOk(p)
            | Self::ChannelOpenOk(p)
            | Self::ChannelCloseOk(p)
            | Self::ExchangeDeclareOk(p)
            | Self::ExchangeDeleteOk(p)
            | Self::QueueBindOk(p)
            | Self::BasicQosOk(p) => return p.kind().method_id(version),
        };
        MethodId::new(class_id, method_id)
    }

    /// Dotted method name, for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ConnectionStart(_) => "connection.start",
            Self::ConnectionStartOk(_) => "connection.start-ok",
            Self::ConnectionTune(_) => "connection.tune",
            Self::ConnectionTuneOk(_) => "connection.tune-ok",
            Self::ConnectionOpen(_) => "connection.open",
            Self::ConnectionOpenOk(_) => "connection.open-ok",
            Self::ConnectionClose(_) => "connection.close",
            Self::ChannelOpen(_) => "channel.open",
            Self::ChannelFlow(_) => "channel.flow",
            Self::ChannelFlowOk(_) => "channel.flow-ok",
            Self::ChannelClose(_) => "channel.close",
            Self::ExchangeDeclare(_) => "exchange.declare",
            Self::ExchangeDelete(_) => "exchange.delete",
            Self::QueueDeclare(_) => "queue.declare",
            Self::QueueDeclareOk(_) => "queue.declare-ok",
            Self::QueueBind(_) => "queue.bind",
            Self::BasicQos(_) => "basic.qos",
            Self::BasicPublish(_) => "basic.publish",
            Self::BasicDeliver(_) => "basic.deliver",
            Self::BasicAck(_) => "basic.ack",
            Self::ConnectionCloseOk(p)
            | Self::ChannelOpenOk(p)
            | Self::ChannelCloseOk(p)
            | Self::ExchangeDeclareOk(p)
            | Self::ExchangeDeleteOk(p)
            | Self::QueueBindOk(p)
            | Self::BasicQosOk(p) => p.kind().name(),
        }
    }

    /// Size of the argument block under the given version.
    #[must_use]
    pub fn arguments_size(&self, version: ProtocolVersion) -> usize {
        match self {
            Self::ConnectionStart(args) => args.encoded_size(),
            Self::ConnectionStartOk(args) => args.encoded_size(),
            Self::ConnectionTune(args) | Self::ConnectionTuneOk(args) => args.encoded_size(),
            Self::ConnectionOpen(args) => args.encoded_size(),
            Self::ConnectionOpenOk(args) => args.encoded_size(),
            Self::ConnectionClose(args) | Self::ChannelClose(args) => args.encoded_size(),
            Self::ChannelOpen(args) => args.encoded_size(),
            Self::ChannelFlow(args) | Self::ChannelFlowOk(args) => args.encoded_size(),
            Self::ExchangeDeclare(args) => args.encoded_size(),
            Self::ExchangeDelete(args) => args.encoded_size(),
            Self::QueueDeclare(args) => args.encoded_size(),
            Self::QueueDeclareOk(args) => args.encoded_size(),
            Self::QueueBind(args) => args.encoded_size(),
            Self::BasicQos(args) => args.encoded_size(),
            Self::BasicPublish(args) => args.encoded_size(),
            Self::BasicDeliver(args) => args.encoded_size(),
            Self::BasicAck(args) => args.encoded_size(),
            Self::ConnectionCloseOk(p)
            | Self::ChannelOpenOk(p)
            | Self::ChannelCloseOk(p)
            | Self::ExchangeDeclareOk(p)
            | Self::ExchangeDeleteOk(p)
            | Self::QueueBindOk(p)
            | Self::BasicQosOk(p) => Payloadless::instance(p.kind(), version).encoded_size(),
        }
    }

    /// Write the argument block under the given version.
    pub(crate) fn write_arguments(&self, version: ProtocolVersion, buf: &mut impl BufMut) {
        match self {
            Self::ConnectionStart(args) => args.write(buf),
            Self::ConnectionStartOk(args) => args.write(buf),
            Self::ConnectionTune(args) | Self::ConnectionTuneOk(args) => args.write(buf),
            Self::ConnectionOpen(args) => args.write(buf),
            Self::ConnectionOpenOk(args) => args.write(buf),
            Self::ConnectionClose(args) | Self::ChannelClose(args) => args.write(buf),
            Self::ChannelOpen(args) => args.write(buf),
            Self::ChannelFlow(args) | Self::ChannelFlowOk(args) => args.write(buf),
            Self::ExchangeDeclare(args) => args.write(buf),
            Self::ExchangeDelete(args) => args.write(buf),
            Self::QueueDeclare(args) => args.write(buf),
            Self::QueueDeclareOk(args) => args.write(buf),
            Self::QueueBind(args) => args.write(buf),
            Self::BasicQos(args) => args.write(buf),
            Self::BasicPublish(args) => args.write(buf),
            Self::BasicDeliver(args) => args.write(buf),
            Self::BasicAck(args) => args.write(buf),
            Self::ConnectionCloseOk(p)
            | Self::ChannelOpenOk(p)
            | Self::ChannelCloseOk(p)
            | Self::ExchangeDeclareOk(p)
            | Self::ExchangeDeleteOk(p)
            | Self::QueueBindOk(p)
            | Self::BasicQosOk(p) => Payloadless::instance(p.kind(), version).encode(buf),
        }
    }

    /// Encode class id, method id and arguments.
    #[must_use]
    pub fn encode(&self, version: ProtocolVersion) -> Bytes {
        super::encode(self, version)
    }

    /// Decode a complete method payload.
    pub fn decode(payload: Bytes, version: ProtocolVersion) -> Result<Self> {
        super::decode(payload, version)
    }
}
