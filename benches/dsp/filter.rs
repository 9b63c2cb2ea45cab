//! Benchmarks for the one-pole damping filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use roomtone::dsp::filter::OnePole;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.37).sin()).collect();

        let mut filter = OnePole::new(0.3);
        group.bench_with_input(BenchmarkId::new("one_pole", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &input {
                    sum += filter.process(black_box(sample));
                }
                sum
            })
        });
    }

    group.finish();
}
