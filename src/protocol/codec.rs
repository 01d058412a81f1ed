//! Method payload codec (encode/decode)
//!
//! # Format
//!
//! ```text
//! [CLASS ID (2)] [METHOD ID (2)] [ARGUMENTS (variable, version dependent)]
//! ```
//!
//! The (class id, method id, version) triple is resolved once at the top of
//! [`decode`]; argument readers never look at the version again.

use bytes::{BufMut, Bytes, BytesMut};

use super::method::{
    Arguments, BasicAck, BasicDeliver, BasicPublish, BasicQos, ChannelOpen, Close,
    ConnectionOpen, ConnectionOpenOk, ConnectionStart, ConnectionStartOk, ExchangeDeclare,
    ExchangeDelete, Flow, QueueBind, QueueDeclare, QueueDeclareOk, Tune,
};
use super::metrics::Metrics;
use super::payloadless::{Payloadless, PayloadlessKind};
use super::types::class;
use super::wire::read_u16;
use super::{Error, MethodBody, MethodId, ProtocolVersion, Result};

/// Encode a method body to its payload bytes
#[must_use]
pub fn encode(body: &MethodBody, version: ProtocolVersion) -> Bytes {
    let mut buf = BytesMut::with_capacity(encoded_size(body, version));
    encode_into(body, version, &mut buf);
    buf.freeze()
}

/// Encode a method body into an existing buffer
pub fn encode_into(body: &MethodBody, version: ProtocolVersion, buf: &mut impl BufMut) {
    let id = body.method_id(version);
    buf.put_u16(id.class_id);
    buf.put_u16(id.method_id);
    body.write_arguments(version, buf);
    Metrics::record_encoded();
}

/// Encoded payload size, including the class and method ids
#[must_use]
pub fn encoded_size(body: &MethodBody, version: ProtocolVersion) -> usize {
    4 + body.arguments_size(version)
}

/// Read the (class id, method id) pair without consuming the payload.
#[must_use]
pub fn peek_method_id(payload: &[u8]) -> Option<MethodId> {
    match payload {
        [c0, c1, m0, m1, ..] => Some(MethodId::new(
            u16::from_be_bytes([*c0, *c1]),
            u16::from_be_bytes([*m0, *m1]),
        )),
        _ => None,
    }
}

/// Decode a complete method payload
///
/// # Errors
///
/// Returns an error if:
/// - The payload is truncated or a length prefix overruns it
/// - The (class, method) pair is unknown for `version`
/// - Bytes remain after the arguments
pub fn decode(mut payload: Bytes, version: ProtocolVersion) -> Result<MethodBody> {
    let class_id = read_u16(&mut payload)?;
    let method_id = read_u16(&mut payload)?;
    let body = decode_arguments(MethodId::new(class_id, method_id), version, &mut payload)?;

    if !payload.is_empty() {
        return Err(Error::TrailingBytes {
            count: payload.len(),
        });
    }
    Ok(body)
}

fn decode_arguments(
    id: MethodId,
    version: ProtocolVersion,
    buf: &mut Bytes,
) -> Result<MethodBody> {
    let payloadless = |kind, buf: &mut Bytes| Payloadless::decode(kind, version, buf);

    let body = match (id.class_id, id.method_id) {
        (class::CONNECTION, 10) => MethodBody::ConnectionStart(ConnectionStart::read(buf)?),
        (class::CONNECTION, 11) => MethodBody::ConnectionStartOk(ConnectionStartOk::read(buf)?),
        (class::CONNECTION, 30) => MethodBody::ConnectionTune(Tune::read(buf)?),
        (class::CONNECTION, 31) => MethodBody::ConnectionTuneOk(Tune::read(buf)?),
        (class::CONNECTION, 40) => MethodBody::ConnectionOpen(ConnectionOpen::read(buf)?),
        (class::CONNECTION, 41) => MethodBody::ConnectionOpenOk(ConnectionOpenOk::read(buf)?),
        (class::CONNECTION, m) if m == version.connection_close_method() => {
            MethodBody::ConnectionClose(Close::read(buf)?)
        }
        (class::CONNECTION, m) if m == version.connection_close_ok_method() => {
            MethodBody::ConnectionCloseOk(payloadless(PayloadlessKind::ConnectionCloseOk, buf)?)
        }
        (class::CHANNEL, 10) => MethodBody::ChannelOpen(ChannelOpen::read(buf)?),
        (class::CHANNEL, 11) => {
            MethodBody::ChannelOpenOk(payloadless(PayloadlessKind::ChannelOpenOk, buf)?)
        }
        (class::CHANNEL, 20) => MethodBody::ChannelFlow(Flow::read(buf)?),
        (class::CHANNEL, 21) => MethodBody::ChannelFlowOk(Flow::read(buf)?),
        (class::CHANNEL, 40) => MethodBody::ChannelClose(Close::read(buf)?),
        (class::CHANNEL, 41) => {
            MethodBody::ChannelCloseOk(payloadless(PayloadlessKind::ChannelCloseOk, buf)?)
        }
        (class::EXCHANGE, 10) => MethodBody::ExchangeDeclare(ExchangeDeclare::read(buf)?),
        (class::EXCHANGE, 11) => {
            MethodBody::ExchangeDeclareOk(payloadless(PayloadlessKind::ExchangeDeclareOk, buf)?)
        }
        (class::EXCHANGE, 20) => MethodBody::ExchangeDelete(ExchangeDelete::read(buf)?),
        (class::EXCHANGE, 21) => {
            MethodBody::ExchangeDeleteOk(payloadless(PayloadlessKind::ExchangeDeleteOk, buf)?)
        }
        (class::QUEUE, 10) => MethodBody::QueueDeclare(QueueDeclare::read(buf)?),
        (class::QUEUE, 11) => MethodBody::QueueDeclareOk(QueueDeclareOk::read(buf)?),
        (class::QUEUE, 20) => MethodBody::QueueBind(QueueBind::read(buf)?),
        (class::QUEUE, 21) => {
            MethodBody::QueueBindOk(payloadless(PayloadlessKind::QueueBindOk, buf)?)
        }
        (class::BASIC, 10) => MethodBody::BasicQos(BasicQos::read(buf)?),
        (class::BASIC, 11) => {
            MethodBody::BasicQosOk(payloadless(PayloadlessKind::BasicQosOk, buf)?)
        }
        (class::BASIC, 40) => MethodBody::BasicPublish(BasicPublish::read(buf)?),
        (class::BASIC, 60) => MethodBody::BasicDeliver(BasicDeliver::read(buf)?),
        (class::BASIC, 80) => MethodBody::BasicAck(BasicAck::read(buf)?),
        _ => return Err(Error::UnknownMethod { method: id, version }),
    };

    Metrics::record_decoded(id.class_id);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FieldTable;

    fn roundtrip(body: &MethodBody, version: ProtocolVersion) -> MethodBody {
        let encoded = encode(body, version);
        assert_eq!(encoded.len(), encoded_size(body, version));
        decode(encoded, version).unwrap()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let body = MethodBody::QueueBind(QueueBind {
            ticket: 0,
            queue: Some("orders".into()),
            exchange: Some("amq.match".into()),
            routing_key: None,
            nowait: false,
            arguments: Some(FieldTable::new().with("X-match", "all").with("region", "eu")),
        });
        for version in ProtocolVersion::ALL {
            assert_eq!(roundtrip(&body, version), body);
        }
    }

    #[test]
    fn test_channel_open_ok_per_version() {
        let v08 = MethodBody::payloadless(PayloadlessKind::ChannelOpenOk, ProtocolVersion::V0_8);
        assert_eq!(&encode(&v08, ProtocolVersion::V0_8)[..], &[0, 20, 0, 11]);

        let v09 = MethodBody::payloadless(PayloadlessKind::ChannelOpenOk, ProtocolVersion::V0_9);
        assert_eq!(
            &encode(&v09, ProtocolVersion::V0_9)[..],
            &[0, 20, 0, 11, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_decode_returns_singleton() {
        for version in ProtocolVersion::ALL {
            let body = MethodBody::payloadless(PayloadlessKind::ChannelOpenOk, version);
            let bytes = encode(&body, version);

            let first = decode(bytes.clone(), version).unwrap();
            let second = decode(bytes, version).unwrap();
            let expected = Payloadless::instance(PayloadlessKind::ChannelOpenOk, version);
            assert!(std::ptr::eq(first.as_payloadless().unwrap(), expected));
            assert!(std::ptr::eq(second.as_payloadless().unwrap(), expected));
        }
    }

    #[test]
    fn test_connection_close_numbering_per_version() {
        let v08 = Bytes::from_static(&[0, 10, 0, 61]);
        assert!(matches!(
            decode(v08.clone(), ProtocolVersion::V0_8).unwrap(),
            MethodBody::ConnectionCloseOk(_)
        ));
        assert!(matches!(
            decode(v08, ProtocolVersion::V0_91),
            Err(Error::UnknownMethod { .. })
        ));

        let v091 = Bytes::from_static(&[0, 10, 0, 51]);
        assert!(matches!(
            decode(v091, ProtocolVersion::V0_91).unwrap(),
            MethodBody::ConnectionCloseOk(_)
        ));
    }

    #[test]
    fn test_decode_unknown_method() {
        let bytes = Bytes::from_static(&[0, 90, 0, 10]);
        let result = decode(bytes, ProtocolVersion::V0_91);
        assert!(matches!(
            result,
            Err(Error::UnknownMethod { method, .. }) if method == MethodId::new(90, 10)
        ));
    }

    #[test]
    fn test_decode_buffer_too_small() {
        let bytes = Bytes::from_static(&[0, 20]);
        assert!(matches!(
            decode(bytes, ProtocolVersion::V0_9),
            Err(Error::BufferTooSmall { .. })
        ));

        // basic.ack with a 64-bit tag cut short
        let bytes = Bytes::from_static(&[0, 60, 0, 80, 0, 0, 0, 1]);
        assert!(matches!(
            decode(bytes, ProtocolVersion::V0_9),
            Err(Error::BufferTooSmall { needed: 8, got: 4 })
        ));
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let bytes = Bytes::from_static(&[0, 20, 0, 41, 0xFF]);
        assert!(matches!(
            decode(bytes, ProtocolVersion::V0_8),
            Err(Error::TrailingBytes { count: 1 })
        ));
    }

    #[test]
    fn test_peek_method_id() {
        assert_eq!(peek_method_id(&[0, 60, 0, 40, 9]), Some(MethodId::new(60, 40)));
        assert_eq!(peek_method_id(&[0, 60, 0]), None);
    }

    // Property-based tests
    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn version_strategy() -> impl Strategy<Value = ProtocolVersion> {
            prop_oneof![
                Just(ProtocolVersion::V0_8),
                Just(ProtocolVersion::V0_9),
                Just(ProtocolVersion::V0_91),
            ]
        }

        fn short_string_strategy() -> impl Strategy<Value = Option<String>> {
            prop::option::of("[a-zA-Z0-9._-]{1,32}")
        }

        fn table_strategy() -> impl Strategy<Value = Option<FieldTable>> {
            prop::option::of(
                prop::collection::vec(("[a-zA-Z]{1,8}", "[a-z ]{0,16}", any::<i32>()), 1..6)
                    .prop_map(|entries| {
                        entries
                            .into_iter()
                            .enumerate()
                            .flat_map(|(i, (key, text, number))| {
                                [
                                    (format!("{key}{i}s"), crate::protocol::FieldValue::from(text)),
                                    (format!("{key}{i}n"), crate::protocol::FieldValue::from(number)),
                                ]
                            })
                            .collect::<FieldTable>()
                    }),
            )
        }

        fn body_strategy() -> impl Strategy<Value = MethodBody> {
            prop_oneof![
                (any::<u16>(), any::<u32>(), any::<u16>()).prop_map(|(channel_max, frame_max, heartbeat)| {
                    MethodBody::ConnectionTune(Tune { channel_max, frame_max, heartbeat })
                }),
                (short_string_strategy(), short_string_strategy(), any::<bool>()).prop_map(
                    |(virtual_host, capabilities, insist)| {
                        MethodBody::ConnectionOpen(ConnectionOpen { virtual_host, capabilities, insist })
                    }
                ),
                (any::<u16>(), short_string_strategy(), any::<u16>(), any::<u16>()).prop_map(
                    |(reply_code, reply_text, class_id, method_id)| {
                        MethodBody::ChannelClose(Close { reply_code, reply_text, class_id, method_id })
                    }
                ),
                (short_string_strategy(), short_string_strategy(), any::<[bool; 5]>(), table_strategy())
                    .prop_map(|(exchange, kind, bits, arguments)| {
                        MethodBody::ExchangeDeclare(ExchangeDeclare {
                            ticket: 0,
                            exchange,
                            kind,
                            passive: bits[0],
                            durable: bits[1],
                            auto_delete: bits[2],
                            internal: bits[3],
                            nowait: bits[4],
                            arguments,
                        })
                    }),
                (short_string_strategy(), short_string_strategy(), short_string_strategy(), any::<bool>(), table_strategy())
                    .prop_map(|(queue, exchange, routing_key, nowait, arguments)| {
                        MethodBody::QueueBind(QueueBind { ticket: 0, queue, exchange, routing_key, nowait, arguments })
                    }),
                (short_string_strategy(), any::<u64>(), any::<bool>(), short_string_strategy(), short_string_strategy())
                    .prop_map(|(consumer_tag, delivery_tag, redelivered, exchange, routing_key)| {
                        MethodBody::BasicDeliver(BasicDeliver { consumer_tag, delivery_tag, redelivered, exchange, routing_key })
                    }),
                (any::<u64>(), any::<bool>()).prop_map(|(delivery_tag, multiple)| {
                    MethodBody::BasicAck(BasicAck { delivery_tag, multiple })
                }),
            ]
        }

        fn payloadless_strategy() -> impl Strategy<Value = PayloadlessKind> {
            prop_oneof![
                Just(PayloadlessKind::ConnectionCloseOk),
                Just(PayloadlessKind::ChannelOpenOk),
                Just(PayloadlessKind::ChannelCloseOk),
                Just(PayloadlessKind::ExchangeDeclareOk),
                Just(PayloadlessKind::ExchangeDeleteOk),
                Just(PayloadlessKind::QueueBindOk),
                Just(PayloadlessKind::BasicQosOk),
            ]
        }

        proptest! {
            /// Property: decoding then re-encoding reproduces the input bytes
            #[test]
            fn prop_reencode_reproduces_bytes(
                body in body_strategy(),
                version in version_strategy(),
            ) {
                let bytes = encode(&body, version);
                let decoded = decode(bytes.clone(), version).unwrap();
                prop_assert_eq!(&decoded, &body);
                prop_assert_eq!(encode(&decoded, version), bytes);
            }

            /// Property: payload-less methods decode to the version singleton
            #[test]
            fn prop_payloadless_identity(
                kind in payloadless_strategy(),
                version in version_strategy(),
            ) {
                let bytes = encode(&MethodBody::payloadless(kind, version), version);
                let decoded = decode(bytes.clone(), version).unwrap();
                let singleton = decoded.as_payloadless().unwrap();
                prop_assert!(std::ptr::eq(singleton, Payloadless::instance(kind, version)));
                prop_assert_eq!(encode(&decoded, version), bytes);
            }

            /// Property: every strict prefix of a valid payload fails cleanly
            #[test]
            fn prop_truncation_is_an_error(
                body in body_strategy(),
                version in version_strategy(),
                cut_ratio in 0.0f64..1.0,
            ) {
                let bytes = encode(&body, version);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
                let cut = (bytes.len() as f64 * cut_ratio) as usize;
                prop_assert!(decode(bytes.slice(..cut), version).is_err());
            }

            /// Property: arbitrary input never panics the decoder
            #[test]
            fn prop_garbage_never_panics(
                raw in prop::collection::vec(any::<u8>(), 0..256),
                version in version_strategy(),
            ) {
                let _ = decode(Bytes::from(raw), version);
            }
        }
    }
}
