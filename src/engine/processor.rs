use rtrb::Consumer;

use crate::dsp::reverb::{FdnReverb, ReverbConfig};
use crate::engine::message::{CurveTarget, EngineMessage, MessageReceiver};
use crate::envelope::EnvelopeCurve;
use crate::scope::ScopeWriter;
use crate::{sanitize_sample_rate, DEFAULT_SAMPLE_RATE, MAX_BLOCK_SIZE};

/// Upper bound on control messages applied per block.
const MAX_MESSAGES_PER_BLOCK: usize = 64;

/// Render-thread state: reverb, its modulation curves and the scope writer.
pub struct RoomProcessor<R: MessageReceiver = Consumer<EngineMessage>> {
    reverb: FdnReverb,
    decay: Option<EnvelopeCurve>,
    mix: Option<EnvelopeCurve>,
    scope: Option<ScopeWriter>,
    rx: R,
    scratch: Vec<f32>,
    sample_rate: f32,
    bypass: bool,
}

impl<R: MessageReceiver> RoomProcessor<R> {
    pub fn new(config: ReverbConfig, rx: R) -> Self {
        Self {
            reverb: FdnReverb::with_config(config),
            decay: None,
            mix: None,
            scope: None,
            rx,
            scratch: Vec::new(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            bypass: false,
        }
    }

    /// Drive the reverb decay from a curve (expected range 0.0 - 1.0).
    pub fn with_decay_curve(mut self, curve: EnvelopeCurve) -> Self {
        self.decay = Some(curve);
        self
    }

    /// Drive the dry/wet mix from a curve (expected range 0.0 - 1.0).
    pub fn with_mix_curve(mut self, curve: EnvelopeCurve) -> Self {
        self.mix = Some(curve);
        self
    }

    pub fn with_scope(mut self, writer: ScopeWriter) -> Self {
        self.scope = Some(writer);
        self
    }

    /// Allocate everything the render path needs. Call before the first
    /// block and whenever the host changes rate or block size.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.sample_rate = sanitize_sample_rate(sample_rate);
        self.reverb.prepare(sample_rate, max_block_size);
        self.scratch.clear();
        self.scratch.resize(max_block_size.clamp(1, MAX_BLOCK_SIZE), 0.0);
    }

    pub fn reverb(&self) -> &FdnReverb {
        &self.reverb
    }

    pub fn reverb_mut(&mut self) -> &mut FdnReverb {
        &mut self.reverb
    }

    pub fn curve_mut(&mut self, target: CurveTarget) -> Option<&mut EnvelopeCurve> {
        match target {
            CurveTarget::Decay => self.decay.as_mut(),
            CurveTarget::Mix => self.mix.as_mut(),
        }
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    /// Render one stereo block in place.
    ///
    /// `transport` is the host position in quarter notes at the start of the
    /// block, when the host provides one. Processes
    /// `min(left.len(), right.len())` frames.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32], transport: Option<f64>) {
        self.apply_messages();

        let frames = left.len().min(right.len());
        let left = &mut left[..frames];
        let right = &mut right[..frames];
        let block_seconds = frames as f64 / self.sample_rate as f64;

        if let Some(curve) = self.decay.as_mut() {
            if let Some(position) = transport {
                curve.set_transport_position(position);
            }
            self.reverb.set_decay(curve.current_value());
            curve.update_time(block_seconds);
        }
        if let Some(curve) = self.mix.as_mut() {
            if let Some(position) = transport {
                curve.set_transport_position(position);
            }
            self.reverb.set_mix(curve.current_value());
            curve.update_time(block_seconds);
        }

        if !self.bypass {
            self.reverb.process_block(left, right);
        }

        if let Some(scope) = self.scope.as_mut() {
            if self.scratch.is_empty() {
                return;
            }
            // Chunked so oversized host blocks still fit the scratch buffer
            let chunk = self.scratch.len();
            for (l, r) in left.chunks(chunk).zip(right.chunks(chunk)) {
                let mono = &mut self.scratch[..l.len()];
                for ((m, &a), &b) in mono.iter_mut().zip(l).zip(r) {
                    *m = (a + b) * 0.5;
                }
                scope.push(mono);
            }
        }
    }

    fn apply_messages(&mut self) {
        for _ in 0..MAX_MESSAGES_PER_BLOCK {
            let Some(msg) = self.rx.pop() else {
                break;
            };
            match msg {
                EngineMessage::SetTransportSync(enabled) => {
                    for curve in self.decay.iter_mut().chain(self.mix.iter_mut()) {
                        curve.set_transport_sync(enabled);
                    }
                }
                EngineMessage::SetCurveRate { target, rate } => {
                    if let Some(curve) = self.curve_mut(target) {
                        curve.set_rate(rate);
                    }
                }
                EngineMessage::SetInputGain(gain) => self.reverb.set_input_gain(gain),
                EngineMessage::SetBypass(bypass) => self.bypass = bypass,
                EngineMessage::ResetTail => self.reverb.reset(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::message::control_channel;
    use crate::envelope::{PointSet, SnapshotPublisher};
    use crate::params::ParameterSettings;
    use crate::scope::ScopeBuffer;

    const BLOCK: usize = 256;

    fn unit_curve(points: PointSet) -> (SnapshotPublisher, EnvelopeCurve) {
        let mut publisher = SnapshotPublisher::new(points);
        let reader = publisher.subscribe();
        let curve = EnvelopeCurve::new(ParameterSettings::linear(0.0, 1.0, 0.0), reader);
        (publisher, curve)
    }

    #[test]
    fn curves_drive_reverb_parameters() {
        let (_tx, rx) = control_channel(8);
        let (_decay_pub, decay) = unit_curve(PointSet::flat(0.75));
        let (_mix_pub, mix) = unit_curve(PointSet::flat(0.4));

        let mut processor = RoomProcessor::new(ReverbConfig::default(), rx)
            .with_decay_curve(decay)
            .with_mix_curve(mix);
        processor.prepare(48_000.0, BLOCK);

        let mut left = [0.0; BLOCK];
        let mut right = [0.0; BLOCK];
        processor.process_block(&mut left, &mut right, None);

        assert!((processor.reverb().decay() - 0.75).abs() < 1e-6);
        assert!((processor.reverb().mix() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn messages_are_applied_before_rendering() {
        let (mut tx, rx) = control_channel(8);
        let mut processor = RoomProcessor::new(
            ReverbConfig {
                decay: 0.5,
                mix: 1.0,
                input_gain: 0.5,
            },
            rx,
        );
        processor.prepare(48_000.0, BLOCK);

        tx.push(EngineMessage::SetBypass(true)).unwrap();
        let mut left = [0.3; BLOCK];
        let mut right = [0.3; BLOCK];
        processor.process_block(&mut left, &mut right, None);

        assert!(processor.is_bypassed());
        assert!(left.iter().all(|&s| s == 0.3));
    }

    #[test]
    fn curve_rate_message_reaches_curve() {
        let (mut tx, rx) = control_channel(8);
        let (_publisher, decay) = unit_curve(PointSet::ramp(0.0, 1.0));
        let mut processor = RoomProcessor::new(ReverbConfig::default(), rx).with_decay_curve(decay);
        processor.prepare(48_000.0, BLOCK);

        tx.push(EngineMessage::SetCurveRate {
            target: CurveTarget::Decay,
            rate: 2.0,
        })
        .unwrap();
        processor.process_block(&mut [0.0; BLOCK], &mut [0.0; BLOCK], None);

        let curve = processor.curve_mut(CurveTarget::Decay).unwrap();
        assert_eq!(curve.rate(), 2.0);
    }

    #[test]
    fn transport_position_positions_synced_curve() {
        let (mut tx, rx) = control_channel(8);
        let (_publisher, decay) = unit_curve(PointSet::ramp(0.0, 1.0));
        let mut processor =
            RoomProcessor::new(ReverbConfig::default(), rx).with_decay_curve(decay.with_rate(0.25));
        processor.prepare(48_000.0, BLOCK);

        tx.push(EngineMessage::SetTransportSync(true)).unwrap();
        processor.process_block(&mut [0.0; BLOCK], &mut [0.0; BLOCK], Some(3.0));

        assert!((processor.reverb().decay() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn scope_receives_mono_downmix() {
        let (_tx, rx) = control_channel(8);
        let (writer, reader) = ScopeBuffer::new(1024);
        let mut processor = RoomProcessor::new(ReverbConfig::default(), rx).with_scope(writer);
        processor.prepare(48_000.0, 64);
        processor.process_block(&mut [0.0; 8], &mut [0.0; 8], None);

        processor.reverb_mut().set_mix(0.0);
        let mut left = [1.0; 100]; // Larger than the prepared block
        let mut right = [0.0; 100];
        processor.process_block(&mut left, &mut right, None);

        assert_eq!(reader.total_written(), 108);
        let mut out = [0.0; 100];
        assert_eq!(reader.read_visible(&mut out, 100, 0), 100);
        assert!(out.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }
}
