//! roomtone - Realtime reverb demo
//!
//! Plays a click train through the FDN reverb while an edit thread keeps
//! reshaping the decay curve and the main thread prints scope levels.
//!
//! Run with: cargo run -- [seconds]

mod app;
mod logging;

use app::Roomtone;
use color_eyre::eyre::WrapErr;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    logging::init_logger();

    let seconds = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<f32>()
            .wrap_err_with(|| format!("invalid duration: {arg}"))?,
        None => 20.0,
    };

    Roomtone::new()
        .bpm(96.0)
        .clicks_per_beat(1)
        .run_for(seconds)
}
