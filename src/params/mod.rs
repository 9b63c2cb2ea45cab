//! Parameter ranges and the table that maps parameter kinds to them.
//!
//! Curve points are always stored normalized to `[0, 1]`. A
//! [`ParameterSettings`] turns a normalized value into the parameter's real
//! range. The [`ParameterTable`] is built once at startup and then shared
//! read-only (typically behind an `Arc`) with every consumer that needs it.

use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::lfo::unipolar_to_bipolar;

/// Parameters a curve can drive.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Reverb decay (0.0 - 1.0)
    ReverbDecay,
    /// Reverb dry/wet mix (0.0 - 1.0)
    ReverbMix,
    /// Filter cutoff in Hz
    FilterCutoff,
    /// Output gain in dB
    GainDb,
    /// Stereo pan (-1.0 left, +1.0 right)
    Pan,
    /// Pitch offset in semitones
    PitchSemitones,
}

/// Output range and mapping for one parameter kind.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSettings {
    pub min_value: f32,
    pub max_value: f32,
    /// Exponential (perceptual) mapping instead of linear
    pub exponential: bool,
    /// Value used when a curve has no points, in parameter units
    pub default_value: f32,
    /// Range straddles zero; normalized 0.5 maps to 0.0
    pub bipolar: bool,
}

impl ParameterSettings {
    /// Linear range `[min, max]`. Swapped bounds are reordered.
    pub fn linear(min_value: f32, max_value: f32, default_value: f32) -> Self {
        let (min_value, max_value) = ordered(min_value, max_value);
        Self {
            min_value,
            max_value,
            exponential: false,
            default_value: clamp_finite(default_value, min_value, max_value),
            bipolar: false,
        }
    }

    pub fn exponential(min_value: f32, max_value: f32, default_value: f32) -> Self {
        Self {
            exponential: true,
            ..Self::linear(min_value, max_value, default_value)
        }
    }

    /// Range centred on zero. `min_value` should be negative and `max_value`
    /// positive; zero is clamped into the range otherwise.
    pub fn bipolar(min_value: f32, max_value: f32, default_value: f32) -> Self {
        Self {
            bipolar: true,
            ..Self::linear(min_value, max_value, default_value)
        }
    }

    /// Map a normalized value (`0.0 - 1.0`) into the parameter range.
    ///
    /// Always returns a finite value inside the range, even when the fields
    /// were set directly to swapped or non-finite bounds.
    pub fn map_to_range(&self, normalized: f32) -> f32 {
        self.sanitized().map_ordered(normalized)
    }

    /// Inverse of [`ParameterSettings::map_to_range`].
    pub fn normalize(&self, value: f32) -> f32 {
        self.sanitized().normalize_ordered(value)
    }

    /// `default_value`, clamped into the (sanitized) range.
    pub fn default_in_range(&self) -> f32 {
        self.sanitized().default_value
    }

    /// The default value expressed as a normalized curve position.
    pub fn normalized_default(&self) -> f32 {
        let settings = self.sanitized();
        settings.normalize_ordered(settings.default_value)
    }

    /// Finite, ordered bounds with a finite default inside them.
    fn sanitized(&self) -> Self {
        let (min_value, max_value) = ordered(self.min_value, self.max_value);
        Self {
            min_value,
            max_value,
            default_value: clamp_finite(self.default_value, min_value, max_value),
            ..*self
        }
    }

    fn map_ordered(&self, normalized: f32) -> f32 {
        let n = if normalized.is_finite() {
            normalized.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let value = if self.bipolar {
            self.map_bipolar(n)
        } else if self.exponential {
            self.map_exponential(n)
        } else {
            self.min_value + (self.max_value - self.min_value) * n
        };

        clamp_finite(value, self.min_value, self.max_value)
    }

    fn normalize_ordered(&self, value: f32) -> f32 {
        if !value.is_finite() || self.max_value <= self.min_value {
            return 0.0;
        }
        let value = value.clamp(self.min_value, self.max_value);

        let n = if self.bipolar {
            let zero = self.centre();
            let shape = |x: f32| if self.exponential { x.sqrt() } else { x };
            if value >= zero {
                let span = self.max_value - zero;
                let x = if span > 0.0 { (value - zero) / span } else { 0.0 };
                0.5 + 0.5 * shape(x)
            } else {
                let span = zero - self.min_value;
                let x = if span > 0.0 { (zero - value) / span } else { 0.0 };
                0.5 - 0.5 * shape(x)
            }
        } else if self.exponential && self.min_value > 0.0 {
            (value / self.min_value).ln() / (self.max_value / self.min_value).ln()
        } else if self.exponential {
            ((value - self.min_value) / (self.max_value - self.min_value)).sqrt()
        } else {
            (value - self.min_value) / (self.max_value - self.min_value)
        };

        clamp_finite(n, 0.0, 1.0)
    }

    fn centre(&self) -> f32 {
        0.0_f32.clamp(self.min_value, self.max_value)
    }

    fn map_exponential(&self, n: f32) -> f32 {
        if self.min_value > 0.0 && self.max_value > self.min_value {
            // Equal ratios per equal step: min * (max/min)^n
            self.min_value * (self.max_value / self.min_value).powf(n)
        } else {
            // Ranges touching zero can't be geometric; use a square-law skew
            self.min_value + (self.max_value - self.min_value) * n * n
        }
    }

    fn map_bipolar(&self, n: f32) -> f32 {
        let zero = self.centre();
        let x = unipolar_to_bipolar(n);
        let magnitude = if self.exponential { x * x } else { x.abs() };
        if x >= 0.0 {
            zero + (self.max_value - zero) * magnitude
        } else {
            zero - (zero - self.min_value) * magnitude
        }
    }
}

impl Default for ParameterSettings {
    fn default() -> Self {
        Self::linear(0.0, 1.0, 0.0)
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    let a = if a.is_finite() { a } else { 0.0 };
    let b = if b.is_finite() { b } else { 1.0 };
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn clamp_finite(value: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    }
}

/// Errors from parameter table lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// The kind was never registered
    NotFound(ParameterKind),
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::NotFound(kind) => {
                write!(f, "no settings registered for parameter {:?}", kind)
            }
        }
    }
}

impl std::error::Error for ParameterError {}

/// Read-only table of parameter settings, keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    entries: HashMap<ParameterKind, ParameterSettings>,
}

impl ParameterTable {
    pub fn builder() -> ParameterTableBuilder {
        ParameterTableBuilder {
            entries: HashMap::new(),
        }
    }

    /// Stock settings for every [`ParameterKind`].
    pub fn standard() -> Self {
        Self::builder()
            .with(ParameterKind::ReverbDecay, ParameterSettings::linear(0.0, 1.0, 0.5))
            .with(ParameterKind::ReverbMix, ParameterSettings::linear(0.0, 1.0, 0.3))
            .with(
                ParameterKind::FilterCutoff,
                ParameterSettings::exponential(20.0, 20_000.0, 1_000.0),
            )
            .with(ParameterKind::GainDb, ParameterSettings::linear(-60.0, 12.0, 0.0))
            .with(ParameterKind::Pan, ParameterSettings::bipolar(-1.0, 1.0, 0.0))
            .with(
                ParameterKind::PitchSemitones,
                ParameterSettings::bipolar(-24.0, 24.0, 0.0),
            )
            .build()
    }

    pub fn settings(&self, kind: ParameterKind) -> Result<&ParameterSettings, ParameterError> {
        self.entries.get(&kind).ok_or_else(|| {
            log::debug!("parameter lookup failed for {:?}", kind);
            ParameterError::NotFound(kind)
        })
    }

    pub fn contains(&self, kind: ParameterKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects entries for a [`ParameterTable`]. Later entries for the same kind
/// replace earlier ones.
#[derive(Debug)]
pub struct ParameterTableBuilder {
    entries: HashMap<ParameterKind, ParameterSettings>,
}

impl ParameterTableBuilder {
    pub fn with(mut self, kind: ParameterKind, settings: ParameterSettings) -> Self {
        self.entries.insert(kind, settings);
        self
    }

    pub fn build(self) -> ParameterTable {
        log::debug!("parameter table built with {} entries", self.entries.len());
        ParameterTable {
            entries: self.entries,
        }
    }
}
