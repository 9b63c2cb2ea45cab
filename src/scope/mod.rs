//! Audio → visualization ring.
//!
//! The render thread pushes every rendered block; any number of readers pull
//! the most recent history on their own schedule (typically a UI timer).
//!
//! Unlike an rtrb queue, reading does not consume: the writer overwrites the
//! oldest samples unconditionally and readers just look at the tail. There
//! is no backpressure in either direction.
//!
//! Samples are stored as `f32` bits in `AtomicU32` cells with relaxed
//! ordering. A read that races a push may see a mix of old and new samples
//! (a visual glitch at worst), but never an out-of-bounds or undefined read.
//! The total-written counter is the only bookkeeping field; the write cursor
//! is derived from it, so cursor and count can never disagree.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crate::{DEFAULT_SAMPLE_RATE, MAX_SAMPLE_RATE};

/// Longest history a [`ScopeConfig`] will size a ring for.
pub const MAX_SCOPE_SECONDS: f32 = 60.0;

/// Ring size ceiling: [`MAX_SCOPE_SECONDS`] at the highest supported rate.
pub const MAX_CAPACITY: usize = (MAX_SCOPE_SECONDS * MAX_SAMPLE_RATE) as usize;

/// Ring sizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScopeConfig {
    /// Seconds of history to keep
    pub seconds: f32,
    pub sample_rate: f32,
}

impl ScopeConfig {
    /// Samples needed for `seconds` of history, at least 1 and at most
    /// [`MAX_CAPACITY`].
    pub fn capacity(&self) -> usize {
        let samples = (self.seconds.max(0.0) as f64 * self.sample_rate.max(0.0) as f64).ceil();
        if samples.is_nan() {
            return 1;
        }
        if samples > MAX_CAPACITY as f64 {
            log::warn!(
                "scope history of {} s at {} Hz capped to {} samples",
                self.seconds,
                self.sample_rate,
                MAX_CAPACITY
            );
            return MAX_CAPACITY;
        }
        (samples as usize).max(1)
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            seconds: 4.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

/// Fixed-capacity sample history shared by one writer and many readers.
#[derive(Debug)]
pub struct ScopeBuffer {
    samples: Box<[AtomicU32]>,
    total_written: AtomicU64,
}

impl ScopeBuffer {
    /// Allocate a ring of `capacity` samples and split it into the writer
    /// handle and a first reader.
    pub fn new(capacity: usize) -> (ScopeWriter, ScopeReader) {
        let capacity = capacity.max(1);
        let samples = (0..capacity).map(|_| AtomicU32::new(0)).collect();
        let shared = Arc::new(ScopeBuffer {
            samples,
            total_written: AtomicU64::new(0),
        });
        log::debug!("scope ring allocated: {} samples", capacity);
        (
            ScopeWriter {
                shared: Arc::clone(&shared),
            },
            ScopeReader::from_shared(shared),
        )
    }

    pub fn with_config(config: ScopeConfig) -> (ScopeWriter, ScopeReader) {
        Self::new(config.capacity())
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn total_written(&self) -> u64 {
        self.total_written.load(Ordering::Acquire)
    }

    fn push(&self, block: &[f32]) {
        if block.is_empty() {
            return;
        }
        let capacity = self.capacity();
        let total = self.total_written.load(Ordering::Relaxed);

        // Only the newest `capacity` samples can survive
        let skipped = block.len().saturating_sub(capacity);
        let tail = &block[skipped..];
        let start = ((total + skipped as u64) % capacity as u64) as usize;

        let first_run = tail.len().min(capacity - start);
        let (head, wrapped) = tail.split_at(first_run);
        store_run(&self.samples[start..start + head.len()], head);
        store_run(&self.samples[..wrapped.len()], wrapped);

        self.total_written
            .store(total + block.len() as u64, Ordering::Release);
    }

    fn read_visible(&self, destination: &mut [f32], count: usize, offset_from_now: usize) -> usize {
        let capacity = self.capacity();
        let total = self.total_written.load(Ordering::Acquire);
        if offset_from_now >= capacity {
            return 0;
        }

        let history = total.min(capacity as u64) as usize;
        let available = history.saturating_sub(offset_from_now);
        let count = count.min(destination.len()).min(available);
        if count == 0 {
            return 0;
        }

        // Absolute index of the oldest requested sample
        let end = total - offset_from_now as u64;
        let start = ((end - count as u64) % capacity as u64) as usize;

        let first_run = count.min(capacity - start);
        let (head, wrapped) = destination[..count].split_at_mut(first_run);
        load_run(&self.samples[start..start + head.len()], head);
        load_run(&self.samples[..wrapped.len()], wrapped);

        count
    }
}

#[inline]
fn store_run(cells: &[AtomicU32], samples: &[f32]) {
    for (cell, &sample) in cells.iter().zip(samples) {
        cell.store(sample.to_bits(), Ordering::Relaxed);
    }
}

#[inline]
fn load_run(cells: &[AtomicU32], out: &mut [f32]) {
    for (cell, sample) in cells.iter().zip(out.iter_mut()) {
        *sample = f32::from_bits(cell.load(Ordering::Relaxed));
    }
}

/// The single writing end. Not `Clone`: exactly one thread pushes.
#[derive(Debug)]
pub struct ScopeWriter {
    shared: Arc<ScopeBuffer>,
}

impl ScopeWriter {
    /// Append a block, overwriting the oldest history. Bounded time, no
    /// allocation.
    #[inline]
    pub fn push(&mut self, block: &[f32]) {
        self.shared.push(block);
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    pub fn total_written(&self) -> u64 {
        self.shared.total_written()
    }
}

/// Levels computed over a scope snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Levels {
    pub peak: f32,
    pub rms: f32,
}

impl Levels {
    pub fn measure(samples: &[f32]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let peak = samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()));
        let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
        Self {
            peak,
            rms: (sum_sq / samples.len() as f32).sqrt(),
        }
    }
}

/// A reading end. Cheap to clone; each clone has its own scratch buffer.
#[derive(Debug)]
pub struct ScopeReader {
    shared: Arc<ScopeBuffer>,
    scratch: Vec<f32>,
}

impl ScopeReader {
    fn from_shared(shared: Arc<ScopeBuffer>) -> Self {
        Self {
            shared,
            scratch: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    pub fn total_written(&self) -> u64 {
        self.shared.total_written()
    }

    /// Copy up to `count` samples ending `offset_from_now` samples before the
    /// newest one into `destination`, oldest first.
    ///
    /// Returns how many samples were copied: never more than has ever been
    /// written, nor more than the ring still holds.
    pub fn read_visible(
        &self,
        destination: &mut [f32],
        count: usize,
        offset_from_now: usize,
    ) -> usize {
        self.shared.read_visible(destination, count, offset_from_now)
    }

    /// Pull the newest `count` samples into the reader's own buffer.
    ///
    /// May allocate the first time (or when `count` grows), so call it from
    /// the visualization thread, not the render thread.
    pub fn snapshot(&mut self, count: usize) -> (&[f32], Levels) {
        let count = count.min(self.capacity());
        if self.scratch.len() < count {
            self.scratch.resize(count, 0.0);
        }
        let read = self
            .shared
            .read_visible(&mut self.scratch[..count], count, 0);
        let samples = &self.scratch[..read];
        (samples, Levels::measure(samples))
    }
}

impl Clone for ScopeReader {
    fn clone(&self) -> Self {
        Self::from_shared(Arc::clone(&self.shared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(start: usize, len: usize) -> Vec<f32> {
        (start..start + len).map(|i| i as f32).collect()
    }

    #[test]
    fn round_trips_a_push() {
        let (mut writer, reader) = ScopeBuffer::new(16);
        let block = ramp(0, 10);
        writer.push(&block);

        let mut out = [0.0; 10];
        assert_eq!(reader.read_visible(&mut out, 10, 0), 10);
        assert_eq!(out.to_vec(), block);
    }

    #[test]
    fn clamps_to_written_history() {
        let (mut writer, reader) = ScopeBuffer::new(16);
        writer.push(&[1.0, 2.0, 3.0]);

        let mut out = [0.0; 8];
        assert_eq!(reader.read_visible(&mut out, 8, 0), 3);
        assert_eq!(&out[..3], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn evicts_oldest_first() {
        let (mut writer, reader) = ScopeBuffer::new(8);
        writer.push(&ramp(0, 5));
        writer.push(&ramp(5, 7)); // 12 total, 8 kept

        let mut out = [0.0; 8];
        assert_eq!(reader.read_visible(&mut out, 8, 0), 8);
        assert_eq!(out.to_vec(), ramp(4, 8));
        assert_eq!(reader.total_written(), 12);
    }

    #[test]
    fn block_larger_than_capacity_keeps_tail() {
        let (mut writer, reader) = ScopeBuffer::new(4);
        writer.push(&ramp(0, 11));

        let mut out = [0.0; 4];
        assert_eq!(reader.read_visible(&mut out, 4, 0), 4);
        assert_eq!(out.to_vec(), ramp(7, 4));
    }

    #[test]
    fn offset_reads_older_history_across_wrap() {
        let (mut writer, reader) = ScopeBuffer::new(8);
        for chunk in 0..4 {
            writer.push(&ramp(chunk * 3, 3)); // 0..12
        }

        let mut out = [0.0; 4];
        assert_eq!(reader.read_visible(&mut out, 4, 2), 4);
        assert_eq!(out.to_vec(), ramp(6, 4));

        // Only 8 samples are retained, so offset 6 leaves 2 readable
        assert_eq!(reader.read_visible(&mut out, 4, 6), 2);
        assert_eq!(&out[..2], &[4.0, 5.0]);

        assert_eq!(reader.read_visible(&mut out, 4, 8), 0);
    }

    #[test]
    fn destination_length_limits_count() {
        let (mut writer, reader) = ScopeBuffer::new(8);
        writer.push(&ramp(0, 8));
        let mut out = [0.0; 3];
        assert_eq!(reader.read_visible(&mut out, 100, 0), 3);
        assert_eq!(out.to_vec(), ramp(5, 3));
    }

    #[test]
    fn snapshot_reports_levels() {
        let (mut writer, mut reader) = ScopeBuffer::new(64);
        writer.push(&[0.5, -1.0, 0.5, -1.0]);

        let (samples, levels) = reader.snapshot(4);
        assert_eq!(samples.len(), 4);
        assert_eq!(levels.peak, 1.0);
        assert!((levels.rms - 0.790_569).abs() < 1e-5);
    }

    #[test]
    fn config_capacity_covers_duration() {
        let config = ScopeConfig {
            seconds: 2.0,
            sample_rate: 1_000.0,
        };
        assert_eq!(config.capacity(), 2_000);
        assert_eq!(ScopeConfig::default().capacity(), 192_000);
    }

    #[test]
    fn oversized_history_is_capped() {
        assert_eq!(MAX_CAPACITY, 23_040_000);
        for seconds in [f32::MAX, f32::INFINITY, 1.0e9] {
            let config = ScopeConfig {
                seconds,
                sample_rate: 48_000.0,
            };
            assert_eq!(config.capacity(), MAX_CAPACITY, "seconds {}", seconds);
        }
        let at_limit = ScopeConfig {
            seconds: MAX_SCOPE_SECONDS,
            sample_rate: MAX_SAMPLE_RATE,
        };
        assert_eq!(at_limit.capacity(), MAX_CAPACITY);
    }

    #[test]
    fn degenerate_config_still_gets_one_slot() {
        for (seconds, sample_rate) in [(f32::NAN, 48_000.0), (f32::INFINITY, 0.0), (-3.0, 48_000.0)] {
            let config = ScopeConfig { seconds, sample_rate };
            assert_eq!(config.capacity(), 1);
        }
    }
}
