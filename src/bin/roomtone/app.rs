//! Roomtone - demo host wiring the processor to a cpal output stream

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use roomtone::{
    dsp::ReverbConfig,
    engine::{control_channel, EngineMessage, RoomProcessor},
    envelope::{CurveEditor, EnvelopeCurve, EnvelopePoint, PointSet},
    params::{ParameterKind, ParameterTable},
    scope::{ScopeBuffer, ScopeConfig, ScopeReader},
    MAX_BLOCK_SIZE,
};

/// How often the edit thread reshapes the decay curve.
const EDIT_INTERVAL: Duration = Duration::from_secs(2);

/// How often levels are printed.
const METER_INTERVAL: Duration = Duration::from_millis(250);

/// Samples per level reading (~50 ms at 48 kHz).
const METER_WINDOW: usize = 2_400;

/// Click length in samples.
const CLICK_LENGTH: usize = 64;

/// Demo builder
pub struct Roomtone {
    bpm: f64,
    clicks_per_beat: u32,
    config: ReverbConfig,
}

impl Roomtone {
    pub fn new() -> Self {
        Self {
            bpm: 120.0,
            clicks_per_beat: 1,
            config: ReverbConfig {
                decay: 0.8,
                mix: 0.45,
                input_gain: 0.4,
            },
        }
    }

    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm.clamp(20.0, 300.0);
        self
    }

    pub fn clicks_per_beat(mut self, clicks: u32) -> Self {
        self.clicks_per_beat = clicks.max(1);
        self
    }

    /// Play for `seconds`, then stop all threads and return.
    pub fn run_for(self, seconds: f32) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;
        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(eyre!(
                "unsupported sample format {:?}, need f32",
                config.sample_format()
            ));
        }

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        log::info!(
            "output: {} Hz, {} channel(s), {} bpm",
            sample_rate,
            channels,
            self.bpm
        );

        // Decay curve: one cycle per 4/4 bar, edited on its own thread
        let table = ParameterTable::standard();
        let decay_settings = *table
            .settings(ParameterKind::ReverbDecay)
            .wrap_err("decay parameter missing from table")?;
        let mut editor = CurveEditor::new(PointSet::ramp(0.3, 0.3));
        editor.add_point(EnvelopePoint::new(0.5, 0.95).with_curvature(-0.4));
        editor.publish();
        let decay_curve = EnvelopeCurve::new(decay_settings, editor.subscribe()).with_rate(0.25);

        let (scope_writer, scope_reader) = ScopeBuffer::with_config(ScopeConfig {
            seconds: 1.0,
            sample_rate,
        });

        let (mut control, control_rx) = control_channel(32);
        let mut processor = RoomProcessor::new(self.config, control_rx)
            .with_decay_curve(decay_curve)
            .with_scope(scope_writer);
        processor.prepare(sample_rate, MAX_BLOCK_SIZE);

        control
            .push(EngineMessage::SetTransportSync(true))
            .map_err(|_| eyre!("control queue full"))?;

        let samples_per_click =
            ((sample_rate as f64 * 60.0 / (self.bpm * self.clicks_per_beat as f64)) as usize).max(1);
        let quarter_notes_per_sample = self.bpm / 60.0 / sample_rate as f64;

        let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut right = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut frame_counter: u64 = 0;

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block_l = &mut left[..frames];
                    let block_r = &mut right[..frames];

                    for (i, (l, r)) in block_l.iter_mut().zip(block_r.iter_mut()).enumerate() {
                        let position = (frame_counter + i as u64) as usize % samples_per_click;
                        let click = if position < CLICK_LENGTH {
                            1.0 - position as f32 / CLICK_LENGTH as f32
                        } else {
                            0.0
                        };
                        *l = click * 0.5;
                        *r = click * 0.5;
                    }

                    let transport = frame_counter as f64 * quarter_notes_per_sample;
                    processor.process_block(block_l, block_r, Some(transport));
                    frame_counter += frames as u64;

                    // Interleave, duplicating the right channel past stereo
                    let out_off = frames_written * channels;
                    for (i, (&l, &r)) in block_l.iter().zip(block_r.iter()).enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = if ch == 0 { l } else { r };
                        }
                    }

                    frames_written += frames;
                }
            },
            |err| log::error!("audio stream error: {}", err),
            None,
        )?;

        stream.play().wrap_err("failed to start output stream")?;
        log::info!("playing for {:.1} s", seconds);

        let running = Arc::new(AtomicBool::new(true));
        let edit_thread = spawn_editor(editor, Arc::clone(&running));

        meter(scope_reader, seconds);

        running.store(false, Ordering::Relaxed);
        drop(stream);
        edit_thread
            .join()
            .map_err(|_| eyre!("edit thread panicked"))?;
        log::info!("stopped");
        Ok(())
    }
}

impl Default for Roomtone {
    fn default() -> Self {
        Self::new()
    }
}

/// Every `EDIT_INTERVAL`, move the peak of the decay curve to a new spot.
fn spawn_editor(mut editor: CurveEditor, running: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let peaks = [0.25f32, 0.5, 0.75, 0.4];
        let mut step = 0;
        let mut last_edit = Instant::now();

        while running.load(Ordering::Relaxed) {
            thread::sleep(Duration::from_millis(50));
            if last_edit.elapsed() < EDIT_INTERVAL {
                continue;
            }
            last_edit = Instant::now();
            step = (step + 1) % peaks.len();

            // The peak is the only editable point between the locked anchors
            let peak = editor.points().iter().position(|p| p.editable);
            let Some(index) = peak else {
                continue;
            };
            match editor.move_point(index, peaks[step], 0.95) {
                Ok(_) => {
                    let version = editor.publish();
                    log::info!(
                        "decay curve v{}: peak at {:.2} ({} retired)",
                        version,
                        peaks[step],
                        editor.publisher().retired()
                    );
                }
                Err(err) => log::warn!("curve edit rejected: {}", err),
            }
        }
    })
}

fn meter(mut scope: ScopeReader, seconds: f32) {
    let seconds = if seconds.is_finite() { seconds.clamp(0.0, 86_400.0) } else { 0.0 };
    let deadline = Instant::now() + Duration::from_secs_f32(seconds);
    while Instant::now() < deadline {
        thread::sleep(METER_INTERVAL);
        let (samples, levels) = scope.snapshot(METER_WINDOW);
        if samples.is_empty() {
            continue;
        }
        let db = 20.0 * levels.rms.max(1e-6).log10();
        println!(
            "peak {:5.3}  rms {:5.3} ({:6.1} dBFS)  {}",
            levels.peak,
            levels.rms,
            db,
            bar(levels.rms)
        );
    }
}

fn bar(level: f32) -> String {
    let width = (level.clamp(0.0, 1.0) * 40.0).round() as usize;
    "#".repeat(width)
}
