//! Benchmarks for delta injection and reading.
//!
//! Run with: cargo bench
//!
//! One frame is a 60 Hz NES frame of CPU clocks with a square wave edge
//! every 64 clocks, roughly a busy pulse channel.

use std::hint::black_box;

use blip_lpf::{Blip, FilterKind, SampleRate, CPU_FREQUENCY};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const FRAME_CLOCKS: usize = 29_830;
const EDGE_PERIOD: usize = 64;

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("blip/frame");

    for filter in FilterKind::ALL {
        for rate in [SampleRate::Hz48000, SampleRate::Hz192000, SampleRate::Hz768000] {
            let mut blip = Blip::new(16_384).unwrap();
            blip.set_rates(CPU_FREQUENCY, rate.hz() as f64).unwrap();
            blip.set_filter(filter);
            blip.clear();
            let mut out = vec![0i16; 16_384];

            let id = BenchmarkId::new(format!("{:?}", filter), rate.hz());
            group.bench_with_input(id, &rate, |b, _| {
                b.iter(|| {
                    let mut delta = 4000;
                    for t in (0..FRAME_CLOCKS).step_by(EDGE_PERIOD) {
                        blip.add_delta(t, delta);
                        delta = -delta;
                    }
                    blip.end_frame(FRAME_CLOCKS);
                    black_box(blip.read_samples(&mut out, usize::MAX, false));
                })
            });
        }
    }

    group.finish();
}

fn bench_fast(c: &mut Criterion) {
    let mut blip = Blip::new(16_384).unwrap();
    blip.set_rates(CPU_FREQUENCY, 48_000.0).unwrap();
    blip.clear();
    let mut out = vec![0i16; 16_384];

    c.bench_function("blip/frame_fast", |b| {
        b.iter(|| {
            let mut delta = 4000;
            for t in (0..FRAME_CLOCKS).step_by(EDGE_PERIOD) {
                blip.add_delta_fast(t, delta);
                delta = -delta;
            }
            blip.end_frame(FRAME_CLOCKS);
            black_box(blip.read_samples(&mut out, usize::MAX, false));
        })
    });
}

criterion_group!(benches, bench_frame, bench_fast);
criterion_main!(benches);
