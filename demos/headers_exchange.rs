//! Decode a small client session and route messages through a headers exchange.
//!
//! Run with `RUST_LOG=amqp_route=trace cargo run --example headers_exchange`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use bytes::{Bytes, BytesMut};
use tracing::{info, warn};

use amqp_route::exchange::{
    DeliveryError, DestinationStore, HeadersExchange, MessageHeaders, PublishedMessage, QueueId,
};
use amqp_route::protocol::method::{BasicPublish, QueueBind};
use amqp_route::protocol::{
    FieldTable, FieldValue, Frame, FrameCodecConfig, FrameDecoder, MethodDispatcher, ProtocolVersion,
    dispatch, metrics_snapshot,
};

#[derive(Default)]
struct Queues(Mutex<BTreeMap<QueueId, Vec<Bytes>>>);

impl DestinationStore for Queues {
    fn active_destinations(&self, _exchange: &str) -> BTreeSet<QueueId> {
        self.0.lock().map(|q| q.keys().cloned().collect()).unwrap_or_default()
    }

    fn deliver(&self, queue: &QueueId, message: &PublishedMessage) -> Result<(), DeliveryError> {
        let mut queues = self.0.lock().map_err(|_| DeliveryError::QueueUnavailable {
            queue: queue.clone(),
        })?;
        queues
            .get_mut(queue)
            .ok_or_else(|| DeliveryError::QueueUnavailable {
                queue: queue.clone(),
            })?
            .push(message.body.clone());
        Ok(())
    }
}

struct Channel<'a> {
    exchange: &'a HeadersExchange,
    queues: &'a Queues,
    publishes: Vec<BasicPublish>,
}

impl MethodDispatcher for Channel<'_> {
    type Error = String;

    fn unhandled(&mut self, method: &'static str, channel: u16) -> Result<bool, String> {
        warn!(method, channel, "method not supported by demo");
        Ok(true)
    }

    fn dispatch_queue_bind(&mut self, _channel: u16, body: &QueueBind) -> Result<bool, String> {
        let queue = QueueId::from(body.queue.clone().unwrap_or_default());
        if let Ok(mut queues) = self.queues.0.lock() {
            queues.entry(queue.clone()).or_default();
        }
        self.exchange
            .bind(queue, "", body.arguments.clone())
            .map(|_| true)
            .map_err(|err| err.to_string())
    }

    fn dispatch_basic_publish(&mut self, _channel: u16, body: &BasicPublish) -> Result<bool, String> {
        self.publishes.push(body.clone());
        Ok(true)
    }
}

fn bind(queue: &str, arguments: FieldTable) -> QueueBind {
    QueueBind {
        queue: Some(queue.into()),
        exchange: Some("amq.match".into()),
        arguments: Some(arguments),
        ..QueueBind::default()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amqp_route=debug,info".into()),
        )
        .init();

    let version = ProtocolVersion::from_header(&ProtocolVersion::V0_9.header())?;
    let decoder = FrameDecoder::new(FrameCodecConfig::for_version(version));

    // Client side: three bindings and one publish on channel 1.
    let mut wire = BytesMut::new();
    let bindings = [
        bind("eu-orders", FieldTable::new().with("X-match", "all").with("region", "eu").with("kind", "order")),
        bind("vip", FieldTable::new().with("X-match", "any").with("tier", "gold").with("tier-override", FieldValue::Void)),
        bind("everything", FieldTable::new()),
    ];
    for body in bindings {
        Frame::method(1, &amqp_route::MethodBody::QueueBind(body), version).encode(&mut wire);
    }
    Frame::method(1, &amqp_route::MethodBody::BasicPublish(BasicPublish::default()), version)
        .encode(&mut wire);

    // Broker side.
    let exchange = HeadersExchange::new("amq.match");
    let queues = Queues::default();
    let mut channel = Channel {
        exchange: &exchange,
        queues: &queues,
        publishes: Vec::new(),
    };
    while let Some(frame) = decoder.decode_next(&mut wire)? {
        let body = decoder.decode_method(&frame)?;
        dispatch(&body, frame.channel, &mut channel)?;
    }
    info!(publishes = channel.publishes.len(), "session decoded");

    for binding in exchange.list_bindings() {
        info!(%binding, "bound");
    }

    let messages = [
        FieldTable::new().with("region", "eu").with("kind", "order"),
        FieldTable::new().with("region", "us").with("tier", "gold"),
        FieldTable::new().with("tier-override", true),
    ];
    for headers in messages {
        let message = PublishedMessage::new(MessageHeaders::from(headers), "payload");
        let outcome = exchange.publish(&message, &queues);
        info!(headers = %message.headers, delivered = ?outcome.delivered, "published");
    }

    let stats = metrics_snapshot();
    info!(
        frames = stats.frames_decoded,
        methods = stats.methods_decoded.total(),
        routed = stats.messages_routed,
        "done"
    );
    Ok(())
}
