//! Benchmarks for low-level DSP primitives.

mod curve;
mod delay;
mod filter;
mod reverb;
mod scope;

pub use curve::bench_curve;
pub use delay::bench_delay;
pub use filter::bench_filter;
pub use reverb::bench_reverb;
pub use scope::bench_scope;
