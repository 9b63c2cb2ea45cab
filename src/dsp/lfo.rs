//! Control-rate sinusoidal modulation.

/*
Delay-Line Modulation
=====================

A static delay line in a feedback loop rings at a fixed set of frequencies:
the comb teeth at multiples of sample_rate / delay_length. With eight lines
those teeth pile up into a metallic, "tin can" colour.

Slowly wobbling each read position by a few samples smears the teeth. The
wobble is a sine running far below audio rate (well under 2 Hz), so it is
heard as a gentle chorus on the tail rather than as vibrato.

Vocabulary
----------

  phase       Position within one cycle, in radians, kept in [0, TAU).

  rate        Cycles per second. Each reverb line uses a different rate so
              the excursions never line up.

  depth       Peak excursion in samples added to the base delay length.

  bipolar     Output swings -1.0 to +1.0 (sine output). Curve values
              are unipolar and get stretched the same way for bipolar
              parameters: bipolar = unipolar * 2.0 - 1.0
*/

use std::f32::consts::TAU;

/// Convert unipolar signal (0.0 to 1.0) to bipolar (-1.0 to +1.0).
#[inline]
pub fn unipolar_to_bipolar(unipolar: f32) -> f32 {
    (unipolar * 2.0) - 1.0
}

/// Free-running sine phase accumulator.
#[derive(Debug, Clone, Copy)]
pub struct SinePhase {
    phase: f32,
    increment: f32,
}

impl SinePhase {
    pub fn new(rate_hz: f32, sample_rate: f32) -> Self {
        let mut lfo = Self {
            phase: 0.0,
            increment: 0.0,
        };
        lfo.set_rate(rate_hz, sample_rate);
        lfo
    }

    /// Negative or non-finite rates stop the oscillator.
    pub fn set_rate(&mut self, rate_hz: f32, sample_rate: f32) {
        let rate_hz = if rate_hz.is_finite() { rate_hz.max(0.0) } else { 0.0 };
        self.increment = if sample_rate > 0.0 {
            (TAU * rate_hz / sample_rate).min(TAU)
        } else {
            0.0
        };
    }

    /// Advance one sample and return the new sine value (-1.0 to +1.0).
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        self.phase += self.increment;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        self.phase.sin()
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
