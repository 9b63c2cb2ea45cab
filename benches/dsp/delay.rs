//! Benchmarks for delay line operations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use roomtone::dsp::delay::DelayLine;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    // Shortest and longest reverb line lengths
    let delay_times: &[usize] = &[1116, 1617];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &delay_samples in delay_times {
            let mut delay = DelayLine::new();
            delay.prepare(size + delay_samples);
            group.bench_with_input(
                BenchmarkId::new(format!("read_write_{}", delay_samples), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        let mut sum = 0.0f32;
                        for &sample in &input {
                            sum += delay.read(black_box(delay_samples));
                            delay.write(sample);
                        }
                        sum
                    })
                },
            );
        }
    }

    group.finish();
}
