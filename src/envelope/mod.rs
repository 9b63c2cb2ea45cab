//! Editable envelope curves shared between an edit thread and the renderer.
//!
//! The edit thread owns a [`CurveEditor`] and mutates a private working copy.
//! Publishing turns that copy into an immutable [`PointSet`] snapshot and
//! hands it to every [`SnapshotReader`]. The render thread evaluates the
//! newest snapshot through an [`EnvelopeCurve`].

/// Cycle timebase and value mapping.
pub mod curve;
/// Working-copy edits on the edit thread.
pub mod editor;
/// Control points and immutable point sets.
pub mod point;
/// Wait-free snapshot hand-off with deferred reclamation.
pub mod publish;

pub use curve::EnvelopeCurve;
pub use editor::{CurveEditor, EditError};
pub use point::{EnvelopePoint, PointSet};
pub use publish::{SnapshotPublisher, SnapshotReader};
