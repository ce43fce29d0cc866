//! Encoder hot-path benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use osc_audio_streamer::codec::{decode, encode_audio};

fn bench_codec(c: &mut Criterion) {
    let samples: Vec<f32> = (0..128).map(|i| (i as f32) / 64.0 - 1.0).collect();

    c.bench_function("encode_chunk_128", |b| {
        b.iter(|| encode_audio(black_box("/audio/stream"), black_box(&samples)).unwrap())
    });

    let encoded = encode_audio("/audio/stream", &samples).unwrap();
    c.bench_function("decode_chunk_128", |b| {
        b.iter(|| decode(black_box(&encoded)).unwrap())
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
