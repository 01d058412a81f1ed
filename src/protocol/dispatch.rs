//! Method dispatch
//!
//! [`dispatch`] routes a decoded [`MethodBody`] to the matching capability
//! of a [`MethodDispatcher`]. All routing lives in the one `match` below;
//! session state, including "only close-ok is accepted while closing",
//! belongs to the dispatcher.

use tracing::trace;

use super::method::{
    BasicAck, BasicDeliver, BasicPublish, BasicQos, ChannelOpen, Close, ConnectionOpen,
    ConnectionOpenOk, ConnectionStart, ConnectionStartOk, ExchangeDeclare, ExchangeDelete, Flow,
    QueueBind, QueueDeclare, QueueDeclareOk, Tune,
};
use super::types::class;
use super::MethodBody;

/// Handler capabilities, one per method.
///
/// Each capability returns whether later frames on the channel should still
/// be dispatched. Capabilities that are not overridden report the method to
/// [`MethodDispatcher::unhandled`].
#[allow(unused_variables)]
pub trait MethodDispatcher {
    /// Failure raised by a handler; surfaced unchanged by [`dispatch`].
    type Error;

    /// Called for every method whose capability is not implemented.
    fn unhandled(&mut self, method: &'static str, channel: u16) -> Result<bool, Self::Error>;

    /// When `true`, every method other than `channel.close-ok` and
    /// connection-class methods is skipped.
    fn ignore_all_but_close_ok(&self) -> bool {
        false
    }

    /// `connection.start`
    fn dispatch_connection_start(&mut self, channel: u16, body: &ConnectionStart) -> Result<bool, Self::Error> {
        self.unhandled("connection.start", channel)
    }

    /// `connection.start-ok`
    fn dispatch_connection_start_ok(&mut self, channel: u16, body: &ConnectionStartOk) -> Result<bool, Self::Error> {
        self.unhandled("connection.start-ok", channel)
    }

    /// `connection.tune`
    fn dispatch_connection_tune(&mut self, channel: u16, body: &Tune) -> Result<bool, Self::Error> {
        self.unhandled("connection.tune", channel)
    }

    /// `connection.tune-ok`
    fn dispatch_connection_tune_ok(&mut self, channel: u16, body: &Tune) -> Result<bool, Self::Error> {
        self.unhandled("connection.tune-ok", channel)
    }

    /// `connection.open`
    fn dispatch_connection_open(&mut self, channel: u16, body: &ConnectionOpen) -> Result<bool, Self::Error> {
        self.unhandled("connection.open", channel)
    }

    /// `connection.open-ok`
    fn dispatch_connection_open_ok(&mut self, channel: u16, body: &ConnectionOpenOk) -> Result<bool, Self::Error> {
        self.unhandled("connection.open-ok", channel)
    }

    /// `connection.close`
    fn dispatch_connection_close(&mut self, channel: u16, body: &Close) -> Result<bool, Self::Error> {
        self.unhandled("connection.close", channel)
    }

    /// `connection.close-ok`
    fn dispatch_connection_close_ok(&mut self, channel: u16) -> Result<bool, Self::Error> {
        self.unhandled("connection.close-ok", channel)
    }

    /// `channel.open`
    fn dispatch_channel_open(&mut self, channel: u16, body: &ChannelOpen) -> Result<bool, Self::Error> {
        self.unhandled("channel.open", channel)
    }

    /// `channel.open-ok`
    fn dispatch_channel_open_ok(&mut self, channel: u16) -> Result<bool, Self::Error> {
        self.unhandled("channel.open-ok", channel)
    }

    /// `channel.flow`
    fn dispatch_channel_flow(&mut self, channel: u16, body: &Flow) -> Result<bool, Self::Error> {
        self.unhandled("channel.flow", channel)
    }

    /// `channel.flow-ok`
    fn dispatch_channel_flow_ok(&mut self, channel: u16, body: &Flow) -> Result<bool, Self::Error> {
        self.unhandled("channel.flow-ok", channel)
    }

    /// `channel.close`
    fn dispatch_channel_close(&mut self, channel: u16, body: &Close) -> Result<bool, Self::Error> {
        self.unhandled("channel.close", channel)
    }

    /// `channel.close-ok`
    fn dispatch_channel_close_ok(&mut self, channel: u16) -> Result<bool, Self::Error> {
        self.unhandled("channel.close-ok", channel)
    }

    /// `exchange.declare`
    fn dispatch_exchange_declare(&mut self, channel: u16, body: &ExchangeDeclare) -> Result<bool, Self::Error> {
        self.unhandled("exchange.declare", channel)
    }

    /// `exchange.declare-ok`
    fn dispatch_exchange_declare_ok(&mut self, channel: u16) -> Result<bool, Self::Error> {
        self.unhandled("exchange.declare-ok", channel)
    }

    /// `exchange.delete`
    fn dispatch_exchange_delete(&mut self, channel: u16, body: &ExchangeDelete) -> Result<bool, Self::Error> {
        self.unhandled("exchange.delete", channel)
    }

    /// `exchange.delete-ok`
    fn dispatch_exchange_delete_ok(&mut self, channel: u16) -> Result<bool, Self::Error> {
        self.unhandled("exchange.delete-ok", channel)
    }

    /// `queue.declare`
    fn dispatch_queue_declare(&mut self, channel: u16, body: &QueueDeclare) -> Result<bool, Self::Error> {
        self.unhandled("queue.declare", channel)
    }

    /// `queue.declare-ok`
    fn dispatch_queue_declare_ok(&mut self, channel: u16, body: &QueueDeclareOk) -> Result<bool, Self::Error> {
        self.unhandled("queue.declare-ok", channel)
    }

    /// `queue.bind`
    fn dispatch_queue_bind(&mut self, channel: u16, body: &QueueBind) -> Result<bool, Self::Error> {
        self.unhandled("queue.bind", channel)
    }

    /// `queue.bind-ok`
    fn dispatch_queue_bind_ok(&mut self, channel: u16) -> Result<bool, Self::Error> {
        self.unhandled("queue.bind-ok", channel)
    }

    /// `basic.qos`
    fn dispatch_basic_qos(&mut self, channel: u16, body: &BasicQos) -> Result<bool, Self::Error> {
        self.unhandled("basic.qos", channel)
    }

    /// `basic.qos-ok`
    fn dispatch_basic_qos_ok(&mut self, channel: u16) -> Result<bool, Self::Error> {
        self.unhandled("basic.qos-ok", channel)
    }

    /// `basic.publish`
    fn dispatch_basic_publish(&mut self, channel: u16, body: &BasicPublish) -> Result<bool, Self::Error> {
        self.unhandled("basic.publish", channel)
    }

    /// `basic.deliver`
    fn dispatch_basic_deliver(&mut self, channel: u16, body: &BasicDeliver) -> Result<bool, Self::Error> {
        self.unhandled("basic.deliver", channel)
    }

    /// `basic.ack`
    fn dispatch_basic_ack(&mut self, channel: u16, body: &BasicAck) -> Result<bool, Self::Error> {
        self.unhandled("basic.ack", channel)
    }
}

/// Invoke the capability matching `body` and return whether dispatching on
/// `channel` should continue.
///
/// While the dispatcher reports [`MethodDispatcher::ignore_all_but_close_ok`],
/// skipped methods return `Ok(true)` without reaching any capability.
///
/// # Errors
///
/// Returns whatever the invoked capability returns; nothing is retried.
pub fn dispatch<D>(body: &MethodBody, channel: u16, dispatcher: &mut D) -> Result<bool, D::Error>
where
    D: MethodDispatcher + ?Sized,
{
    if dispatcher.ignore_all_but_close_ok() && !survives_closing(body) {
        trace!(channel, method = body.name(), "ignored while closing");
        return Ok(true);
    }

    trace!(channel, method = body.name(), "dispatching");
    match body {
        MethodBody::ConnectionStart(b) => dispatcher.dispatch_connection_start(channel, b),
        MethodBody::ConnectionStartOk(b) => dispatcher.dispatch_connection_start_ok(channel, b),
        MethodBody::ConnectionTune(b) => dispatcher.dispatch_connection_tune(channel, b),
        MethodBody::ConnectionTuneOk(b) => dispatcher.dispatch_connection_tune_ok(channel, b),
        MethodBody::ConnectionOpen(b) => dispatcher.dispatch_connection_open(channel, b),
        MethodBody::ConnectionOpenOk(b) => dispatcher.dispatch_connection_open_ok(channel, b),
        MethodBody::ConnectionClose(b) => dispatcher.dispatch_connection_close(channel, b),
        MethodBody::ConnectionCloseOk(_) => dispatcher.dispatch_connection_close_ok(channel),
        MethodBody::ChannelOpen(b) => dispatcher.dispatch_channel_open(channel, b),
        MethodBody::ChannelOpenOk(_) => dispatcher.dispatch_channel_open_ok(channel),
        MethodBody::ChannelFlow(b) => dispatcher.dispatch_channel_flow(channel, b),
        MethodBody::ChannelFlowOk(b) => dispatcher.dispatch_channel_flow_ok(channel, b),
        MethodBody::ChannelClose(b) => dispatcher.dispatch_channel_close(channel, b),
        MethodBody::ChannelCloseOk(_) => dispatcher.dispatch_channel_close_ok(channel),
        MethodBody::ExchangeDeclare(b) => dispatcher.dispatch_exchange_declare(channel, b),
        MethodBody::ExchangeDeclareOk(_) => dispatcher.dispatch_exchange_declare_ok(channel),
        MethodBody::ExchangeDelete(b) => dispatcher.dispatch_exchange_delete(channel, b),
        MethodBody::ExchangeDeleteOk(_) => dispatcher.dispatch_exchange_delete_ok(channel),
        MethodBody::QueueDeclare(b) => dispatcher.dispatch_queue_declare(channel, b),
        MethodBody::QueueDeclareOk(b) => dispatcher.dispatch_queue_declare_ok(channel, b),
        MethodBody::QueueBind(b) => dispatcher.dispatch_queue_bind(channel, b),
        MethodBody::QueueBindOk(_) => dispatcher.dispatch_queue_bind_ok(channel),
        MethodBody::BasicQos(b) => dispatcher.dispatch_basic_qos(channel, b),
        MethodBody::BasicQosOk(_) => dispatcher.dispatch_basic_qos_ok(channel),
        MethodBody::BasicPublish(b) => dispatcher.dispatch_basic_publish(channel, b),
        MethodBody::BasicDeliver(b) => dispatcher.dispatch_basic_deliver(channel, b),
        MethodBody::BasicAck(b) => dispatcher.dispatch_basic_ack(channel, b),
    }
}

// Connection-class methods and channel.close-ok are still needed to finish
// a close handshake.
fn survives_closing(body: &MethodBody) -> bool {
    matches!(body, MethodBody::ChannelCloseOk(_)) || body.class_id() == class::CONNECTION
}
