//! Reverb - Room Simulation via a Feedback Delay Network
//!
//! Eight delay lines of mutually unrelated lengths recirculate the input.
//! Every round trip passes through a per-line damping filter and a per-line
//! feedback gain, so the tail darkens and decays the way a real room does.
//!
//! # Architecture
//!
//! ```text
//!            ┌──────────── early reflections (4 taps on line 0) ───┐
//!            │                                                     ↓
//! L+R ──→ (x in_gain) ──────────────────────────────────────────→ (+) ──┐
//!                                                                       │
//!   ┌───────────────────────────────────────────────────────────────────┘
//!   │   for each line k:
//!   └─→ [line k] ──tap──┬──→ (x g_k) ──→ network output k
//!          ↑            └──→ [damp k] ──→ (x g_k) ──┐
//!          └────────────────────────────────────────┘
//!
//! network outputs ──→ [± 0.5 left weights ] ──→ wet L
//!                 └─→ [± 0.5 right weights] ──→ wet R
//! ```
//!
//! ## Modulated taps
//!
//! Each line's read position wobbles a few samples around its base length
//! (see `dsp::lfo`). The rates differ per line, so no two lines drift in
//! step and the comb resonances smear instead of ringing.
//!
//! ## Stability
//!
//! Line gains live in `[0.5, 0.9)` and the damping filter never exceeds unity
//! gain. Early-reflection weights are small enough that line 0's total loop
//! gain (its own feedback plus the four taps) stays below 1, so every
//! recirculating path is contractive for any decay in `[0, 1]`.
//!
//! # Parameters
//!
//! - **Decay**: Maps linearly to the per-line feedback gains
//! - **Mix**: Dry/wet blend
//! - **Input gain**: Level of the mono downmix entering the network

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::delay::DelayLine;
use crate::dsp::filter::OnePole;
use crate::dsp::lfo::SinePhase;
use crate::{sanitize_sample_rate, DEFAULT_SAMPLE_RATE, MAX_BLOCK_SIZE};

/// Number of recirculating lines in the network.
pub const NUM_LINES: usize = 8;

/// Base delay lengths in samples (mutually prime, Freeverb-derived).
pub const BASE_DELAYS: [usize; NUM_LINES] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Per-line modulation rates (Hz). Distinct so excursions never align.
const MOD_RATES_HZ: [f32; NUM_LINES] = [0.31, 0.37, 0.43, 0.53, 0.61, 0.71, 0.83, 0.97];

/// Peak read-offset excursion in samples.
const MOD_DEPTH_SAMPLES: f32 = 6.0;

/// Per-line damping coefficients (higher = darker).
const DAMPING: [f32; NUM_LINES] = [0.20, 0.23, 0.26, 0.29, 0.32, 0.35, 0.38, 0.41];

/// Per-line feedback gain at decay 0. Rising while the slopes fall, so no
/// two lines share a gain at any decay.
const FEEDBACK_FLOOR: [f32; NUM_LINES] = [0.500, 0.505, 0.510, 0.515, 0.520, 0.525, 0.530, 0.535];

/// Per-line gain added at decay 1. `floor + slope` peaks at 0.888 on line 0.
const FEEDBACK_SLOPE: [f32; NUM_LINES] = [0.388, 0.376, 0.364, 0.352, 0.340, 0.328, 0.316, 0.304];

/// Early reflection tap offsets (samples) and weights (decreasing).
const EARLY_OFFSETS: [usize; 4] = [23, 41, 67, 89];
const EARLY_WEIGHTS: [f32; 4] = [0.04, 0.03, 0.02, 0.01];

/// Output mixing vectors: alternating ±0.5 patterns, orthogonal to each other.
const LEFT_WEIGHTS: [f32; NUM_LINES] = [0.5, -0.5, 0.5, -0.5, 0.5, -0.5, 0.5, -0.5];
const RIGHT_WEIGHTS: [f32; NUM_LINES] = [0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, -0.5];

/// Static reverb settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbConfig {
    /// 0.0 (short) to 1.0 (long)
    pub decay: f32,
    /// 0.0 (dry) to 1.0 (wet)
    pub mix: f32,
    /// Level of the mono downmix fed into the network
    pub input_gain: f32,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            decay: 0.5,
            mix: 0.3,
            input_gain: 0.3,
        }
    }
}

/// Eight-line feedback delay network reverberator.
pub struct FdnReverb {
    lines: [DelayLine; NUM_LINES],
    dampers: [OnePole; NUM_LINES],
    lfos: [SinePhase; NUM_LINES],
    feedback: [f32; NUM_LINES],
    decay: f32,
    input_gain: f32,
    wet_gain: f32,
    dry_gain: f32,
    sample_rate: f32,
    max_block_size: usize,
}

impl FdnReverb {
    /// Create an unprepared reverb. `process_block` is a no-op until
    /// [`FdnReverb::prepare`] has been called.
    pub fn new() -> Self {
        let mut reverb = Self {
            lines: Default::default(),
            dampers: DAMPING.map(OnePole::new),
            lfos: MOD_RATES_HZ.map(|rate| SinePhase::new(rate, DEFAULT_SAMPLE_RATE)),
            feedback: FEEDBACK_FLOOR,
            decay: 0.0,
            input_gain: 0.0,
            wet_gain: 0.0,
            dry_gain: 1.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: 0,
        };
        reverb.apply_config(&ReverbConfig::default());
        reverb
    }

    pub fn with_config(config: ReverbConfig) -> Self {
        let mut reverb = Self::new();
        reverb.apply_config(&config);
        reverb
    }

    /// Size every line to `max_block_size + BASE_DELAYS[i]` and clear all
    /// state. Allocates; call off the render thread.
    ///
    /// Out-of-range arguments are clamped rather than rejected.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        let rate = sanitize_sample_rate(sample_rate);
        if rate != sample_rate {
            log::warn!("reverb: sample rate {} clamped to {}", sample_rate, rate);
        }
        let block = max_block_size.clamp(1, MAX_BLOCK_SIZE);
        if block != max_block_size {
            log::warn!("reverb: block size {} clamped to {}", max_block_size, block);
        }

        self.sample_rate = rate;
        self.max_block_size = block;

        for (line, &base) in self.lines.iter_mut().zip(BASE_DELAYS.iter()) {
            line.prepare(block + base);
        }
        for (lfo, &rate_hz) in self.lfos.iter_mut().zip(MOD_RATES_HZ.iter()) {
            lfo.set_rate(rate_hz, rate);
            lfo.reset();
        }
        for damper in &mut self.dampers {
            damper.reset();
        }

        log::debug!(
            "reverb prepared: {} Hz, block {}, {} samples of line storage",
            rate,
            block,
            self.lines.iter().map(DelayLine::capacity).sum::<usize>()
        );
    }

    pub fn apply_config(&mut self, config: &ReverbConfig) {
        self.set_decay(config.decay);
        self.set_mix(config.mix);
        self.set_input_gain(config.input_gain);
    }

    /// Set decay (0.0 - 1.0). Each line gets its own gain in `[0.5, 0.9)`,
    /// distinct from every other line's at any decay.
    pub fn set_decay(&mut self, decay: f32) {
        let decay = if decay.is_finite() { decay.clamp(0.0, 1.0) } else { 0.0 };
        self.decay = decay;
        for (k, gain) in self.feedback.iter_mut().enumerate() {
            *gain = FEEDBACK_FLOOR[k] + FEEDBACK_SLOPE[k] * decay;
        }
    }

    /// Set dry/wet mix (0.0 = dry, 1.0 = wet).
    pub fn set_mix(&mut self, mix: f32) {
        let mix = if mix.is_finite() { mix.clamp(0.0, 1.0) } else { 0.0 };
        self.wet_gain = mix;
        self.dry_gain = 1.0 - mix;
    }

    pub fn set_input_gain(&mut self, gain: f32) {
        self.input_gain = if gain.is_finite() { gain.clamp(0.0, 1.0) } else { 0.0 };
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn mix(&self) -> f32 {
        self.wet_gain
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    pub fn feedback_gain(&self, line: usize) -> Option<f32> {
        self.feedback.get(line).copied()
    }

    pub fn line_capacity(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(DelayLine::capacity)
    }

    /// Process a stereo block in place.
    ///
    /// Processes `min(left.len(), right.len())` frames. Empty blocks and an
    /// unprepared reverb are no-ops.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        if !self.lines[0].is_prepared() {
            return;
        }

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let dry_l = *l;
            let dry_r = *r;
            let (wet_l, wet_r) = self.process_frame((dry_l + dry_r) * self.input_gain);

            *l = wet_l * self.wet_gain + dry_l * self.dry_gain;
            *r = wet_r * self.wet_gain + dry_r * self.dry_gain;
        }
    }

    #[inline]
    fn process_frame(&mut self, input: f32) -> (f32, f32) {
        let early: f32 = EARLY_OFFSETS
            .iter()
            .zip(EARLY_WEIGHTS.iter())
            .map(|(&offset, &weight)| self.lines[0].read(offset) * weight)
            .sum();

        let mut wet_l = 0.0;
        let mut wet_r = 0.0;

        for k in 0..NUM_LINES {
            let line = &mut self.lines[k];
            let excursion = self.lfos[k].next_value() * MOD_DEPTH_SAMPLES;
            let offset = (BASE_DELAYS[k] as f32 + excursion).round().max(1.0) as usize;
            let tap = line.read(offset.min(line.capacity()));

            let gain = self.feedback[k];
            let output = tap * gain;
            let damped = self.dampers[k].process(tap);
            line.write(input + early + damped * gain);

            wet_l += output * LEFT_WEIGHTS[k];
            wet_r += output * RIGHT_WEIGHTS[k];
        }

        (wet_l, wet_r)
    }

    /// Clear all lines and filter state without reallocating.
    pub fn reset(&mut self) {
        for line in &mut self.lines {
            line.reset();
        }
        for damper in &mut self.dampers {
            damper.reset();
        }
        for lfo in &mut self.lfos {
            lfo.reset();
        }
    }
}

impl Default for FdnReverb {
    fn default() -> Self {
        Self::new()
    }
}
