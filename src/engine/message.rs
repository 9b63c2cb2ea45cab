use rtrb::{Consumer, Producer, RingBuffer};

/// Which curve-driven parameter a message addresses.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CurveTarget {
    Decay,
    Mix,
}

/// Commands from control threads to the render thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EngineMessage {
    /// Follow the host transport instead of free-running time
    SetTransportSync(bool),
    /// Cycles per second (free-running) or per quarter note (synced)
    SetCurveRate { target: CurveTarget, rate: f64 },
    SetInputGain(f32),
    /// Pass audio through untouched (scope still receives it)
    SetBypass(bool),
    /// Silence the reverb tail
    ResetTail,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<EngineMessage>;
}

impl MessageReceiver for Consumer<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        Consumer::pop(self).ok()
    }
}

/// Bounded, wait-free command queue.
pub fn control_channel(capacity: usize) -> (Producer<EngineMessage>, Consumer<EngineMessage>) {
    RingBuffer::new(capacity.max(1))
}
