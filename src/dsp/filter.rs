/// One-pole low-pass used as a damping filter inside feedback loops.
///
/// ```text
/// y[n] = (1 - d) * x[n] + d * y[n - 1]
/// ```
///
/// `d` in `[0, 1)`: 0 passes everything, values near 1 darken the signal.
/// DC gain is always 1, so the filter never adds energy to a loop.
#[derive(Debug, Clone, Copy)]
pub struct OnePole {
    coefficient: f32,
    state: f32,
}

impl OnePole {
    pub fn new(coefficient: f32) -> Self {
        Self {
            coefficient: coefficient.clamp(0.0, 0.99),
            state: 0.0,
        }
    }

    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = input * (1.0 - self.coefficient) + self.state * self.coefficient;
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}
