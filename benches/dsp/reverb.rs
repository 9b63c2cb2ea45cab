//! Benchmarks for reverb processing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use roomtone::dsp::{FdnReverb, ReverbConfig};

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        // Impulse-like start with a quiet tail
        let input: Vec<f32> = (0..size)
            .map(|i| {
                if i < 10 {
                    1.0 - (i as f32 / 10.0)
                } else {
                    (i as f32 * 0.05).sin() * 0.1
                }
            })
            .collect();

        for (name, decay) in [("short_decay", 0.2), ("long_decay", 0.95)] {
            let mut reverb = FdnReverb::with_config(ReverbConfig {
                decay,
                mix: 0.5,
                input_gain: 0.3,
            });
            reverb.prepare(sample_rate, size);
            let mut left = input.clone();
            let mut right = input.clone();

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    left.copy_from_slice(&input);
                    right.copy_from_slice(&input);
                    reverb.process_block(black_box(&mut left), black_box(&mut right));
                })
            });
        }
    }

    group.finish();
}
