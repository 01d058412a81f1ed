use bytes::BytesMut;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use amqp_route::protocol::method::{BasicDeliver, QueueBind};
use amqp_route::protocol::{
    decode, encode, FieldTable, Frame, FrameDecoder, MethodBody, PayloadlessKind, ProtocolVersion,
};

fn bind_body() -> MethodBody {
    MethodBody::QueueBind(QueueBind {
        ticket: 0,
        queue: Some("orders-eu".into()),
        exchange: Some("amq.match".into()),
        routing_key: None,
        nowait: false,
        arguments: Some(
            FieldTable::new()
                .with("X-match", "all")
                .with("region", "eu")
                .with("priority", 5)
                .with("tenant", "acme"),
        ),
    })
}

fn deliver_body() -> MethodBody {
    MethodBody::BasicDeliver(BasicDeliver {
        consumer_tag: Some("ctag-1".into()),
        delivery_tag: 42,
        redelivered: false,
        exchange: Some("amq.match".into()),
        routing_key: None,
    })
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let version = ProtocolVersion::V0_91;

    // Method with a field table
    let bind = bind_body();
    group.throughput(Throughput::Bytes(encode(&bind, version).len() as u64));
    group.bench_function("encode_queue_bind", |b| {
        b.iter(|| {
            black_box(encode(black_box(&bind), version));
        });
    });

    // Fixed-layout method
    let deliver = deliver_body();
    group.throughput(Throughput::Bytes(encode(&deliver, version).len() as u64));
    group.bench_function("encode_basic_deliver", |b| {
        b.iter(|| {
            black_box(encode(black_box(&deliver), version));
        });
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let version = ProtocolVersion::V0_91;

    let bind = encode(&bind_body(), version);
    group.throughput(Throughput::Bytes(bind.len() as u64));
    group.bench_function("decode_queue_bind", |b| {
        b.iter(|| {
            black_box(decode(bind.clone(), version).unwrap());
        });
    });

    let deliver = encode(&deliver_body(), version);
    group.throughput(Throughput::Bytes(deliver.len() as u64));
    group.bench_function("decode_basic_deliver", |b| {
        b.iter(|| {
            black_box(decode(deliver.clone(), version).unwrap());
        });
    });

    // Argument-free method: returns the shared singleton
    let open_ok = encode(
        &MethodBody::payloadless(PayloadlessKind::ChannelOpenOk, version),
        version,
    );
    group.throughput(Throughput::Bytes(open_ok.len() as u64));
    group.bench_function("decode_channel_open_ok", |b| {
        b.iter(|| {
            black_box(decode(open_ok.clone(), version).unwrap());
        });
    });

    group.finish();
}

fn bench_frame_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames");
    let version = ProtocolVersion::V0_91;
    let decoder = FrameDecoder::default();

    let mut stream = BytesMut::new();
    for channel in 0..64u16 {
        Frame::method(channel, &deliver_body(), version).encode(&mut stream);
    }
    let stream = stream.freeze();

    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("decode_64_frames", |b| {
        b.iter(|| {
            let mut buf = BytesMut::from(&stream[..]);
            while let Some(frame) = decoder.decode_next(&mut buf).unwrap() {
                black_box(decoder.decode_method(&frame).unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_frame_stream);
criterion_main!(benches);
