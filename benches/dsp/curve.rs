//! Benchmarks for envelope curve evaluation on the render thread.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use roomtone::envelope::{EnvelopeCurve, EnvelopePoint, PointSet, SnapshotPublisher};
use roomtone::params::ParameterSettings;

use crate::BLOCK_SIZES;

fn busy_curve() -> PointSet {
    PointSet::new((0..=16).map(|i| {
        let t = i as f32 / 16.0;
        EnvelopePoint::new(t, if i % 2 == 0 { 0.2 } else { 0.9 }).with_curvature(0.5)
    }))
}

pub fn bench_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/curve");

    let mut publisher = SnapshotPublisher::new(busy_curve());
    let mut curve = EnvelopeCurve::new(
        ParameterSettings::exponential(20.0, 20_000.0, 1_000.0),
        publisher.subscribe(),
    )
    .with_rate(0.5);

    // Once per block, as RoomProcessor does
    group.bench_function("current_value", |b| {
        b.iter(|| {
            curve.update_time(black_box(256.0 / 48_000.0));
            curve.current_value()
        })
    });

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("render_values", size), &size, |b, _| {
            b.iter(|| curve.render_values(black_box(&mut out), 48_000.0))
        });
    }

    group.finish();
}
