//! Benchmarks for the scope ring.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use roomtone::scope::{ScopeBuffer, ScopeConfig};

use crate::BLOCK_SIZES;

pub fn bench_scope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/scope");

    let (mut writer, mut reader) = ScopeBuffer::with_config(ScopeConfig::default());

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        group.bench_with_input(BenchmarkId::new("push", size), &size, |b, _| {
            b.iter(|| writer.push(black_box(&input)))
        });
    }

    // One UI frame's worth of history
    group.bench_function("snapshot_2400", |b| {
        b.iter(|| reader.snapshot(black_box(2_400)).1)
    });

    group.finish();
}
