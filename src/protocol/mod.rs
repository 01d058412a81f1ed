//! AMQP method-frame codec
//!
//! This module provides the wire primitives, method bodies, frame envelope
//! and dispatch for AMQP 0-8, 0-9 and 0-9-1.

mod codec;
mod dispatch;
mod error;
mod field_table;
mod frame;
pub mod method;
pub(crate) mod metrics;
mod payloadless;
mod types;
pub mod wire;

pub use codec::{decode, encode, encode_into, encoded_size, peek_method_id};
pub use dispatch::{MethodDispatcher, dispatch};
pub use error::{Error, Result};
pub use field_table::{FieldTable, FieldValue, MAX_TABLE_DEPTH};
pub use frame::{FRAME_OVERHEAD, Frame, FrameCodecConfig, FrameDecoder, FrameType};
pub use method::MethodBody;
pub use metrics::{ClassCountsSnapshot, MetricsSnapshot, metrics_snapshot};
pub use payloadless::{Payloadless, PayloadlessKind};
pub use types::{MethodId, ProtocolVersion, class};

/// Frame end octet
pub const FRAME_END: u8 = 0xCE;

/// Longest short string in bytes
pub const MAX_SHORT_STRING_LEN: usize = 255;

/// Longest long string accepted by the encoder and decoder
pub const MAX_LONG_STRING_LEN: usize = 0xFFFE;

/// Default negotiated maximum frame size (128 KiB)
pub const DEFAULT_FRAME_MAX: u32 = 128 * 1024;
