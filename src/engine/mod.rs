//! Per-block orchestration on the render thread.
//!
//! Once per audio block the [`RoomProcessor`]:
//!
//! 1. applies queued [`EngineMessage`]s (never more than a fixed number),
//! 2. reads the decay and mix curves at the current phase,
//! 3. runs the stereo block through the reverb in place,
//! 4. pushes a mono downmix to the scope ring.
//!
//! Control threads talk to it only through the message queue and curve
//! snapshots; nothing calls back into UI-owned objects.

pub mod message;
pub mod processor;

pub use message::{control_channel, CurveTarget, EngineMessage, MessageReceiver};
pub use processor::RoomProcessor;
