//! Benchmarks for full processor blocks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use roomtone::dsp::ReverbConfig;
use roomtone::engine::{control_channel, RoomProcessor};
use roomtone::envelope::{EnvelopeCurve, PointSet, SnapshotPublisher};
use roomtone::params::{ParameterKind, ParameterTable};
use roomtone::scope::ScopeBuffer;

use crate::BLOCK_SIZES;

pub fn bench_processor(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/processor");
    let table = ParameterTable::standard();
    let decay_settings = *table.settings(ParameterKind::ReverbDecay).unwrap();
    let mix_settings = *table.settings(ParameterKind::ReverbMix).unwrap();

    for &size in BLOCK_SIZES {
        let mut decay_pub = SnapshotPublisher::new(PointSet::ramp(0.2, 0.9));
        let mut mix_pub = SnapshotPublisher::new(PointSet::flat(0.4));
        let (_tx, rx) = control_channel(16);
        let (writer, _reader) = ScopeBuffer::new(48_000);

        let mut processor = RoomProcessor::new(ReverbConfig::default(), rx)
            .with_decay_curve(EnvelopeCurve::new(decay_settings, decay_pub.subscribe()))
            .with_mix_curve(EnvelopeCurve::new(mix_settings, mix_pub.subscribe()))
            .with_scope(writer);
        processor.prepare(48_000.0, size);

        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.07).sin() * 0.5).collect();
        let mut left = input.clone();
        let mut right = input.clone();

        group.bench_with_input(BenchmarkId::new("curves_and_scope", size), &size, |b, _| {
            b.iter(|| {
                left.copy_from_slice(&input);
                right.copy_from_slice(&input);
                processor.process_block(black_box(&mut left), black_box(&mut right), None);
            })
        });
    }

    group.finish();
}
