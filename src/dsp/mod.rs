//! Low-level DSP primitives used by the reverberator.
//!
//! Everything here is allocation-free once prepared, so it can live directly
//! inside the render-thread state. Storage is sized in `prepare`-style calls
//! that happen off the audio callback.

/// Circular sample store with a write cursor.
pub mod delay;
/// One-pole damping filter.
pub mod filter;
/// Sinusoidal modulation phase for delay excursions.
pub mod lfo;
/// Eight-line feedback delay network.
pub mod reverb;

pub use reverb::{FdnReverb, ReverbConfig};
