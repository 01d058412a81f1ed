//! AMQP message-routing core: method-frame codec, dispatch and headers exchange
//!
//! This library decodes and encodes AMQP 0-8, 0-9 and 0-9-1 method frames
//! bit-exactly, routes decoded methods to a handler, and decides which bound
//! queues receive a message published to a headers exchange.
//!
//! # Quick Start
//!
//! ```rust
//! use amqp_route::exchange::{HeadersExchange, MessageHeaders};
//! use amqp_route::protocol::{FieldTable, MethodBody, PayloadlessKind, ProtocolVersion};
//!
//! // Round-trip a method payload
//! let body = MethodBody::payloadless(PayloadlessKind::ChannelOpenOk, ProtocolVersion::V0_9);
//! let bytes = body.encode(ProtocolVersion::V0_9);
//! assert_eq!(MethodBody::decode(bytes, ProtocolVersion::V0_9)?, body);
//!
//! // Route on headers
//! let exchange = HeadersExchange::new("amq.match");
//! let arguments = FieldTable::new().with("X-match", "any").with("region", "eu");
//! exchange.bind("orders-eu".into(), "", Some(arguments)).expect("valid binding");
//!
//! let headers: MessageHeaders = [("region", "eu")].into_iter().collect();
//! assert_eq!(exchange.route(&headers).len(), 1);
//! # Ok::<(), amqp_route::Error>(())
//! ```
//!
//! # Features
//!
//! - **Version-gated codec** - one decode table keyed by (class, method, version)
//! - **Allocation-free empty methods** - argument-free bodies are shared `'static` singletons
//! - **Lock-free matching** - compiled header matchers are immutable and `Sync`
//! - **Built-in observability** - `tracing` spans and process-wide counters

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod exchange;
pub mod protocol;

pub use exchange::{Binding, HeadersBinding, HeadersExchange, MessageHeaders, QueueId};
pub use protocol::{
    Error, FieldTable, FieldValue, Frame, FrameCodecConfig, FrameDecoder, MethodBody,
    MethodDispatcher, ProtocolVersion, Result, dispatch, metrics_snapshot,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
