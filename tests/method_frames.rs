use bytes::BytesMut;

use amqp_route::protocol::method::{BasicPublish, Close, ConnectionStart, ExchangeDeclare, QueueBind, Tune};
use amqp_route::protocol::{
    Error, FieldTable, FieldValue, Frame, FrameCodecConfig, FrameDecoder, MethodBody, MethodDispatcher,
    MethodId, Payloadless, PayloadlessKind, ProtocolVersion, dispatch, metrics_snapshot,
};

fn sample_bodies(version: ProtocolVersion) -> Vec<MethodBody> {
    let mut bodies = vec![
        MethodBody::ConnectionStart(ConnectionStart {
            version_major: 0,
            version_minor: 9,
            server_properties: Some(
                FieldTable::new()
                    .with("product", "broker")
                    .with("capabilities", FieldTable::new().with("publisher_confirms", true)),
            ),
            mechanisms: "PLAIN AMQPLAIN".into(),
            locales: "en_US".into(),
        }),
        MethodBody::ConnectionTune(Tune {
            channel_max: 256,
            frame_max: 131_072,
            heartbeat: 0,
        }),
        MethodBody::ConnectionClose(Close {
            reply_code: 320,
            reply_text: Some("CONNECTION_FORCED".into()),
            class_id: 0,
            method_id: 0,
        }),
        MethodBody::ExchangeDeclare(ExchangeDeclare {
            ticket: 0,
            exchange: Some("amq.match".into()),
            kind: Some("headers".into()),
            durable: true,
            arguments: None,
            ..ExchangeDeclare::default()
        }),
        MethodBody::QueueBind(QueueBind {
            ticket: 0,
            queue: Some("audit".into()),
            exchange: Some("amq.match".into()),
            routing_key: None,
            nowait: false,
            arguments: Some(
                FieldTable::new()
                    .with("X-match", "all")
                    .with("level", "warn")
                    .with("trace", FieldValue::Void),
            ),
        }),
        MethodBody::BasicPublish(BasicPublish {
            ticket: 0,
            exchange: Some("amq.match".into()),
            routing_key: None,
            mandatory: true,
            immediate: false,
        }),
    ];
    bodies.extend(
        [
            PayloadlessKind::ConnectionCloseOk,
            PayloadlessKind::ChannelOpenOk,
            PayloadlessKind::ChannelCloseOk,
            PayloadlessKind::QueueBindOk,
        ]
        .into_iter()
        .map(|kind| MethodBody::payloadless(kind, version)),
    );
    bodies
}

#[test]
fn frame_stream_roundtrip_every_version() {
    for version in ProtocolVersion::ALL {
        let decoder = FrameDecoder::new(FrameCodecConfig::for_version(version));
        let bodies = sample_bodies(version);

        let mut wire = BytesMut::new();
        for (channel, body) in bodies.iter().enumerate() {
            Frame::method(u16::try_from(channel).unwrap(), body, version).encode(&mut wire);
        }
        Frame::heartbeat().encode(&mut wire);
        let original = wire.clone().freeze();

        let mut reencoded = BytesMut::new();
        let mut decoded = Vec::new();
        while let Some(frame) = decoder.decode_next(&mut wire).unwrap() {
            if frame.frame_type == amqp_route::protocol::FrameType::Method {
                let body = decoder.decode_method(&frame).unwrap();
                Frame::method(frame.channel, &body, version).encode(&mut reencoded);
                decoded.push(body);
            } else {
                frame.encode(&mut reencoded);
            }
        }

        assert_eq!(decoded, bodies, "version {version}");
        assert_eq!(reencoded.freeze(), original, "version {version}");
    }
}

#[test]
fn channel_open_ok_reserved_block() {
    // 0-9 and 0-9-1 consume exactly four reserved bytes; 0-8 consumes none.
    let with_reserved = bytes::Bytes::from_static(&[0, 20, 0, 11, 0, 0, 0, 0]);
    let bare = bytes::Bytes::from_static(&[0, 20, 0, 11]);

    for version in [ProtocolVersion::V0_9, ProtocolVersion::V0_91] {
        let body = MethodBody::decode(with_reserved.clone(), version).unwrap();
        let singleton = Payloadless::instance(PayloadlessKind::ChannelOpenOk, version);
        assert!(std::ptr::eq(body.as_payloadless().unwrap(), singleton));
        assert!(matches!(
            MethodBody::decode(bare.clone(), version),
            Err(Error::BufferTooSmall { needed: 4, got: 0 })
        ));
    }

    let body = MethodBody::decode(bare, ProtocolVersion::V0_8).unwrap();
    assert!(std::ptr::eq(
        body.as_payloadless().unwrap(),
        Payloadless::instance(PayloadlessKind::ChannelOpenOk, ProtocolVersion::V0_8)
    ));
    assert!(matches!(
        MethodBody::decode(with_reserved, ProtocolVersion::V0_8),
        Err(Error::TrailingBytes { count: 4 })
    ));
}

#[test]
fn truncated_frames_never_panic() {
    let version = ProtocolVersion::V0_91;
    let decoder = FrameDecoder::new(FrameCodecConfig::for_version(version));

    for body in sample_bodies(version) {
        let frame = Frame::method(7, &body, version);
        for cut in 0..frame.payload.len() {
            let truncated = Frame {
                payload: frame.payload.slice(..cut),
                ..frame.clone()
            };
            match decoder.decode_method(&truncated) {
                Err(Error::MalformedFrame { channel: 7, .. }) => {}
                other => panic!("{} cut at {cut}: {other:?}", body.name()),
            }
        }
    }
}

/// A `queue.bind` frame whose arguments table body is `table`.
fn bind_frame_with_raw_arguments(table: &[u8]) -> Frame {
    let body = MethodBody::QueueBind(QueueBind {
        queue: Some("audit".into()),
        exchange: Some("amq.match".into()),
        ..QueueBind::default()
    });
    let frame = Frame::method(2, &body, ProtocolVersion::V0_91);
    let mut payload = BytesMut::from(&frame.payload[..frame.payload.len() - 4]);
    payload.extend_from_slice(&u32::try_from(table.len()).unwrap().to_be_bytes());
    payload.extend_from_slice(table);
    Frame {
        payload: payload.freeze(),
        ..frame
    }
}

#[test]
fn hostile_bind_arguments_are_rejected() {
    let decoder = FrameDecoder::default();

    let mut nested = Vec::new();
    let depth = 18_000_usize;
    for level in 0..depth {
        nested.extend_from_slice(&[1, b'k', b'F']);
        nested.extend_from_slice(&u32::try_from(7 * (depth - level - 1)).unwrap().to_be_bytes());
    }
    let mut oversized = vec![1, b'A', b'S'];
    oversized.extend_from_slice(&0x1_0000_u32.to_be_bytes());
    oversized.resize(oversized.len() + 0x1_0000, b'a');
    let repeated = [1, b'A', b'S', 0, 0, 0, 1, b'1', 1, b'A', b'S', 0, 0, 0, 1, b'2'];

    let cases: [(&[u8], fn(&Error) -> bool); 3] = [
        (&nested, |e| matches!(e, Error::TableTooDeep { .. })),
        (&oversized, |e| matches!(e, Error::LongStringTooLong { len: 0x1_0000 })),
        (&repeated, |e| matches!(e, Error::DuplicateFieldKey { .. })),
    ];
    for (table, expected) in cases {
        let mut wire = BytesMut::new();
        bind_frame_with_raw_arguments(table).encode(&mut wire);
        let frame = decoder.decode_next(&mut wire).unwrap().unwrap();
        match decoder.decode_method(&frame) {
            Err(Error::MalformedFrame { channel: 2, source, .. }) => {
                assert!(expected(&source), "unexpected cause: {source}");
            }
            other => panic!("expected a malformed frame, got {other:?}"),
        }
    }

    let valid = [1, b'A', b'S', 0, 0, 0, 1, b'1'];
    let frame = bind_frame_with_raw_arguments(&valid);
    let body = decoder.decode_method(&frame).unwrap();
    assert_eq!(body.encode(ProtocolVersion::V0_91), frame.payload);
}

#[test]
fn unknown_method_reports_identifier() {
    let decoder = FrameDecoder::default();
    let frame = Frame {
        frame_type: amqp_route::protocol::FrameType::Method,
        channel: 3,
        payload: bytes::Bytes::from_static(&[0, 85, 0, 10]),
    };
    let err = decoder.decode_method(&frame).unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedFrame { channel: 3, method: Some(id), .. } if id == MethodId::new(85, 10)
    ));
    assert!(err.to_string().contains("(85, 10)"));
}

#[test]
fn counters_advance() {
    let before = metrics_snapshot();
    let decoder = FrameDecoder::default();
    let mut wire = BytesMut::new();
    Frame::heartbeat().encode(&mut wire);
    decoder.decode_next(&mut wire).unwrap();
    let after = metrics_snapshot();
    assert!(after.frames_decoded > before.frames_decoded);
    assert!(after.heartbeats > before.heartbeats);
}

struct Session {
    closing: bool,
    published: u32,
}

impl MethodDispatcher for Session {
    type Error = String;

    fn unhandled(&mut self, method: &'static str, channel: u16) -> Result<bool, String> {
        Err(format!("{method} not allowed on channel {channel}"))
    }

    fn ignore_all_but_close_ok(&self) -> bool {
        self.closing
    }

    fn dispatch_basic_publish(&mut self, _channel: u16, _body: &BasicPublish) -> Result<bool, String> {
        self.published += 1;
        Ok(true)
    }

    fn dispatch_channel_close(&mut self, _channel: u16, _body: &Close) -> Result<bool, String> {
        self.closing = true;
        Ok(true)
    }

    fn dispatch_channel_close_ok(&mut self, _channel: u16) -> Result<bool, String> {
        Ok(false)
    }
}

#[test]
fn dispatch_follows_session_state() {
    let version = ProtocolVersion::V0_9;
    let publish = MethodBody::BasicPublish(BasicPublish::default());
    let mut session = Session {
        closing: false,
        published: 0,
    };

    assert_eq!(dispatch(&publish, 1, &mut session), Ok(true));
    let ack = MethodBody::payloadless(PayloadlessKind::BasicQosOk, version);
    assert_eq!(
        dispatch(&ack, 1, &mut session),
        Err("basic.qos-ok not allowed on channel 1".to_owned())
    );

    let close = MethodBody::ChannelClose(Close::default());
    assert_eq!(dispatch(&close, 1, &mut session), Ok(true));
    assert_eq!(dispatch(&publish, 1, &mut session), Ok(true));
    assert_eq!(session.published, 1);

    let close_ok = MethodBody::payloadless(PayloadlessKind::ChannelCloseOk, version);
    assert_eq!(dispatch(&close_ok, 1, &mut session), Ok(false));
}

#[cfg(feature = "serde")]
#[test]
fn codec_config_from_json() {
    let config: FrameCodecConfig = serde_json::from_str(r#"{"version":"V0_9"}"#).unwrap();
    assert_eq!(config.version, ProtocolVersion::V0_9);
    assert_eq!(config.frame_max, FrameCodecConfig::default().frame_max);
}
