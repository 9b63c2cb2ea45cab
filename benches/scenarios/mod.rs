//! Real-world scenario benchmarks.
//!
//! A complete processor block: message drain, curve evaluation, reverb and
//! scope push, the way a host callback drives it.

mod processor;

pub use processor::bench_processor;
