#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One control point of an editable curve.
///
/// `time` and `value` are normalized to `[0, 1]`. `curvature` shapes the
/// segment from this point to the next one: 0 is a straight line, positive
/// values start slow and finish fast, negative values the reverse.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopePoint {
    pub time: f32,
    pub value: f32,
    pub curvature: f32,
    pub editable: bool,
    /// UI selection state; never read by the audio path
    #[cfg_attr(feature = "serde", serde(skip))]
    pub selected: bool,
}

impl EnvelopePoint {
    /// Create an editable point. Inputs are clamped into range.
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time: unit(time),
            value: unit(value),
            curvature: 0.0,
            editable: true,
            selected: false,
        }
    }

    pub fn with_curvature(mut self, curvature: f32) -> Self {
        self.curvature = bend(curvature);
        self
    }

    /// Mark the point as fixed (cannot be moved or removed by edits).
    pub fn locked(mut self) -> Self {
        self.editable = false;
        self
    }
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
pub(crate) fn unit(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Clamp into `[-1, 1]`, mapping NaN to 0.
pub(crate) fn bend(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(-1.0, 1.0)
    }
}

/// Immutable, time-ordered set of envelope points.
///
/// Once built a `PointSet` is never mutated; edits produce a new set that
/// replaces the old one wholesale (see `envelope::publish`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointSet {
    points: Vec<EnvelopePoint>,
    version: u64,
}

impl PointSet {
    /// Build a set from arbitrary points, sorting them by time.
    ///
    /// The sort is stable, so points sharing a time keep their given order.
    pub fn new(points: impl IntoIterator<Item = EnvelopePoint>) -> Self {
        let mut points: Vec<EnvelopePoint> = points.into_iter().collect();
        points.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { points, version: 0 }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Constant curve at `value`, anchored by locked end points.
    pub fn flat(value: f32) -> Self {
        Self::ramp(value, value)
    }

    /// Straight line from `from` at time 0 to `to` at time 1.
    pub fn ramp(from: f32, to: f32) -> Self {
        Self::new([
            EnvelopePoint::new(0.0, from).locked(),
            EnvelopePoint::new(1.0, to).locked(),
        ])
    }

    pub fn points(&self) -> &[EnvelopePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub(crate) fn into_points(self) -> Vec<EnvelopePoint> {
        self.points
    }

    /// Evaluate the curve at a normalized `position`, or `None` when empty.
    ///
    /// Before the first point the first value holds; after the last point the
    /// last value holds. Landing exactly on a point returns its value
    /// exactly. Cost is `O(log n)` with no allocation.
    pub fn value_at(&self, position: f32) -> Option<f32> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        let position = unit(position);

        if position <= first.time {
            return Some(first.value);
        }
        if position >= last.time {
            return Some(last.value);
        }

        // First point strictly after `position`; always in 1..len here
        let next = self.points.partition_point(|p| p.time <= position);
        let a = &self.points[next - 1];
        let b = &self.points[next];

        if position == a.time {
            return Some(a.value);
        }

        let progress = (position - a.time) / (b.time - a.time);
        let shaped = shape(progress, a.curvature);
        Some(a.value + (b.value - a.value) * shaped)
    }
}

/// Steepness of the curvature response at `|curvature| == 1`.
const CURVE_STEEPNESS: f32 = 6.0;

/// Bend linear `progress` (`0.0 - 1.0`) by `curvature` (`-1.0 - 1.0`).
///
/// Uses the normalized exponential `(e^(k x) - 1) / (e^k - 1)`, which is
/// monotonic, maps 0 to 0 and 1 to 1, and never leaves `[0, 1]`.
pub fn shape(progress: f32, curvature: f32) -> f32 {
    let progress = unit(progress);
    let k = bend(curvature) * CURVE_STEEPNESS;
    if k.abs() < 1e-4 {
        return progress;
    }
    let shaped = (k * progress).exp_m1() / k.exp_m1();
    shaped.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(points: &[(f32, f32)]) -> PointSet {
        PointSet::new(points.iter().map(|&(t, v)| EnvelopePoint::new(t, v)))
    }

    #[test]
    fn points_are_sorted_on_build() {
        let points = set(&[(0.8, 0.1), (0.2, 0.9), (0.5, 0.5)]);
        let times: Vec<f32> = points.points().iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.2, 0.5, 0.8]);
    }

    #[test]
    fn empty_set_has_no_value() {
        assert_eq!(PointSet::empty().value_at(0.5), None);
    }

    #[test]
    fn clamps_outside_first_and_last_points() {
        let points = set(&[(0.25, 0.2), (0.75, 0.6)]);
        assert_eq!(points.value_at(0.0), Some(0.2));
        assert_eq!(points.value_at(0.1), Some(0.2));
        assert_eq!(points.value_at(0.9), Some(0.6));
        assert_eq!(points.value_at(1.0), Some(0.6));
    }

    #[test]
    fn exact_at_every_point_time() {
        let points = PointSet::new([
            EnvelopePoint::new(0.0, 0.1).with_curvature(0.7),
            EnvelopePoint::new(0.3, 0.8).with_curvature(-1.0),
            EnvelopePoint::new(0.61, 0.35).with_curvature(0.2),
            EnvelopePoint::new(1.0, 0.95),
        ]);
        for p in points.points() {
            assert_eq!(points.value_at(p.time), Some(p.value));
        }
    }

    #[test]
    fn straight_segment_interpolates_linearly() {
        let points = set(&[(0.0, 0.0), (1.0, 1.0)]);
        let mid = points.value_at(0.5).unwrap();
        assert!((mid - 0.5).abs() < 1e-6);
    }

    #[test]
    fn curvature_bows_without_overshoot() {
        let up = PointSet::new([
            EnvelopePoint::new(0.0, 0.0).with_curvature(1.0),
            EnvelopePoint::new(1.0, 1.0),
        ]);
        let down = PointSet::new([
            EnvelopePoint::new(0.0, 0.0).with_curvature(-1.0),
            EnvelopePoint::new(1.0, 1.0),
        ]);

        assert!(up.value_at(0.5).unwrap() < 0.5);
        assert!(down.value_at(0.5).unwrap() > 0.5);

        let mut previous = 0.0;
        for i in 0..=1000 {
            let value = up.value_at(i as f32 / 1000.0).unwrap();
            assert!((0.0..=1.0).contains(&value));
            assert!(value >= previous, "curve must be monotonic within a segment");
            previous = value;
        }
    }

    #[test]
    fn duplicate_times_form_a_step() {
        let points = set(&[(0.0, 0.0), (0.5, 0.2), (0.5, 0.9), (1.0, 1.0)]);
        assert!(points.value_at(0.49).unwrap() < 0.25);
        assert!(points.value_at(0.51).unwrap() > 0.85);
    }

    #[test]
    fn shape_hits_endpoints() {
        for curvature in [-1.0, -0.3, 0.0, 0.4, 1.0] {
            assert_eq!(shape(0.0, curvature), 0.0);
            assert_eq!(shape(1.0, curvature), 1.0);
        }
    }

    #[test]
    fn point_inputs_are_clamped() {
        let point = EnvelopePoint::new(1.5, -0.2).with_curvature(3.0);
        assert_eq!(point.time, 1.0);
        assert_eq!(point.value, 0.0);
        assert_eq!(point.curvature, 1.0);
    }
}
