use crate::envelope::point::PointSet;
use crate::envelope::publish::SnapshotReader;
use crate::params::ParameterSettings;

/*
Cyclic Parameter Curves
=======================

An EnvelopeCurve turns "where are we in the cycle" into "what is the
parameter value right now". It is the render-thread end of an editable
curve: the points come from a SnapshotReader, the range from
ParameterSettings.

Vocabulary
----------

  phase       Position inside one cycle, 0.0 to 1.0. Curve point times live
              on the same axis.

  rate        Cycles per second when free-running; cycles per quarter note
              when synced to the host transport.

  transport   Host playback position in quarter notes, supplied once per
              block. When sync is on, phase = fract(transport * rate) and
              free-running time is ignored.

Pipeline
--------

    phase ──→ PointSet::value_at ──→ normalized ──→ map_to_range ──→ value
                    │
                    └─ empty set ──→ settings.default_in_range()

Reads never allocate or lock: the only shared state is the snapshot,
picked up wait-free from the reader.
*/

/// Upper bound for curve rates (cycles per second or per quarter note).
const MAX_RATE: f64 = 1_000.0;

/// Maps a published curve and a timebase to a parameter value.
pub struct EnvelopeCurve {
    settings: ParameterSettings,
    points: SnapshotReader,
    rate: f64,
    elapsed: f64,
    transport_sync: bool,
    transport_position: f64,
}

impl EnvelopeCurve {
    pub fn new(settings: ParameterSettings, points: SnapshotReader) -> Self {
        Self {
            settings,
            points,
            rate: 1.0,
            elapsed: 0.0,
            transport_sync: false,
            transport_position: 0.0,
        }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.set_rate(rate);
        self
    }

    pub fn settings(&self) -> &ParameterSettings {
        &self.settings
    }

    /// Swap the output range. Stored point positions are unaffected.
    pub fn set_settings(&mut self, settings: ParameterSettings) {
        self.settings = settings;
    }

    /// Negative and non-finite rates are clamped to 0 (curve holds still).
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = if rate.is_finite() {
            rate.clamp(0.0, MAX_RATE)
        } else {
            0.0
        };
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn set_transport_sync(&mut self, enabled: bool) {
        self.transport_sync = enabled;
    }

    pub fn is_transport_synced(&self) -> bool {
        self.transport_sync
    }

    /// Host position in quarter notes. Only used while transport sync is on.
    pub fn set_transport_position(&mut self, quarter_notes: f64) {
        if quarter_notes.is_finite() {
            self.transport_position = quarter_notes;
        }
    }

    /// Advance free-running time by `delta_seconds`. Ignored while synced.
    pub fn update_time(&mut self, delta_seconds: f64) {
        if self.transport_sync || !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return;
        }
        self.elapsed = (self.elapsed + delta_seconds * self.rate).rem_euclid(1.0);
    }

    /// Restart the free-running cycle.
    pub fn reset_time(&mut self) {
        self.elapsed = 0.0;
    }

    /// Current position inside the cycle (0.0 - 1.0).
    pub fn phase(&self) -> f32 {
        let phase = if self.transport_sync {
            (self.transport_position * self.rate).rem_euclid(1.0)
        } else {
            self.elapsed
        };
        phase as f32
    }

    /// Normalized curve value (`0.0 - 1.0`) at `position`.
    ///
    /// An empty curve yields the default *normalized* through the settings
    /// (`settings.normalized_default()`), not `default_value` itself, so the
    /// result can always go through [`EnvelopeCurve::map_to_parameter_range`].
    /// [`EnvelopeCurve::current_value`] returns the default in parameter
    /// units.
    pub fn value_at_position(&mut self, position: f32) -> f32 {
        let default = self.settings.normalized_default();
        self.points
            .current_points()
            .value_at(position)
            .unwrap_or(default)
    }

    pub fn map_to_parameter_range(&self, normalized: f32) -> f32 {
        self.settings.map_to_range(normalized)
    }

    /// Parameter value at the current phase.
    ///
    /// An empty curve yields `settings.default_in_range()`.
    pub fn current_value(&mut self) -> f32 {
        let phase = self.phase();
        let settings = self.settings;
        evaluate(self.points.current_points(), &settings, phase)
    }

    /// Fill `out` with per-sample values, advancing free-running time by one
    /// sample period per value. While synced, the block holds the value at
    /// the transport position.
    pub fn render_values(&mut self, out: &mut [f32], sample_rate: f32) {
        let settings = self.settings;
        if self.transport_sync || sample_rate <= 0.0 || !sample_rate.is_finite() {
            let value = self.current_value();
            out.fill(value);
            return;
        }

        let step = self.rate / sample_rate as f64;
        let mut elapsed = self.elapsed;
        let points = self.points.current_points();
        for sample in out.iter_mut() {
            *sample = evaluate(points, &settings, elapsed as f32);
            elapsed = (elapsed + step).rem_euclid(1.0);
        }
        self.elapsed = elapsed;
    }

    /// Version of the snapshot last used.
    pub fn version(&self) -> u64 {
        self.points.version()
    }
}

fn evaluate(points: &PointSet, settings: &ParameterSettings, phase: f32) -> f32 {
    match points.value_at(phase) {
        Some(normalized) => settings.map_to_range(normalized),
        None => settings.default_in_range(),
    }
}
