pub mod dsp;
pub mod engine; // Render-thread control flow
pub mod envelope; // Editable curves and snapshot publication
pub mod params;
pub mod scope; // Audio → visualization ring

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;
pub(crate) const MIN_SAMPLE_RATE: f32 = 8_000.0;
pub(crate) const MAX_SAMPLE_RATE: f32 = 384_000.0;

/// Clamp a host-supplied sample rate into the supported range.
///
/// Non-finite values fall back to [`DEFAULT_SAMPLE_RATE`].
pub(crate) fn sanitize_sample_rate(sample_rate: f32) -> f32 {
    if sample_rate.is_finite() {
        sample_rate.clamp(MIN_SAMPLE_RATE, MAX_SAMPLE_RATE)
    } else {
        DEFAULT_SAMPLE_RATE
    }
}
