use std::fmt;

use crate::envelope::point::{bend, unit, EnvelopePoint, PointSet};
use crate::envelope::publish::{SnapshotPublisher, SnapshotReader};

/// Errors for edits on the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// No point at this index
    IndexOutOfRange { index: usize, len: usize },
    /// The point is not editable
    Locked { index: usize },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::IndexOutOfRange { index, len } => {
                write!(f, "point index {} out of range ({} points)", index, len)
            }
            EditError::Locked { index } => write!(f, "point {} is not editable", index),
        }
    }
}

impl std::error::Error for EditError {}

/// Edit-thread view of one curve.
///
/// Holds a private working copy of the points. Nothing a reader sees changes
/// until [`CurveEditor::publish`] snapshots the working copy and hands it to
/// the publisher. If an edit fails, the published curve is untouched.
pub struct CurveEditor {
    working: Vec<EnvelopePoint>,
    publisher: SnapshotPublisher,
}

impl CurveEditor {
    /// Start from `template`, which is also published as the first snapshot.
    pub fn new(template: PointSet) -> Self {
        let working = template.points().to_vec();
        Self {
            working,
            publisher: SnapshotPublisher::new(template),
        }
    }

    pub fn from_publisher(publisher: SnapshotPublisher) -> Self {
        let working = publisher.current().points().to_vec();
        Self { working, publisher }
    }

    pub fn subscribe(&mut self) -> SnapshotReader {
        self.publisher.subscribe()
    }

    pub fn publisher(&self) -> &SnapshotPublisher {
        &self.publisher
    }

    pub fn publisher_mut(&mut self) -> &mut SnapshotPublisher {
        &mut self.publisher
    }

    /// Working copy, sorted by time.
    pub fn points(&self) -> &[EnvelopePoint] {
        &self.working
    }

    /// Insert a point, keeping time order. Returns its index.
    ///
    /// A point at an existing time lands after the points already there.
    pub fn add_point(&mut self, point: EnvelopePoint) -> usize {
        let point = EnvelopePoint {
            time: unit(point.time),
            value: unit(point.value),
            curvature: bend(point.curvature),
            ..point
        };
        let index = self.working.partition_point(|p| p.time <= point.time);
        self.working.insert(index, point);
        index
    }

    pub fn remove_point(&mut self, index: usize) -> Result<EnvelopePoint, EditError> {
        self.check_editable(index)?;
        Ok(self.working.remove(index))
    }

    /// Move a point to a new position. Returns its index after re-sorting.
    pub fn move_point(&mut self, index: usize, time: f32, value: f32) -> Result<usize, EditError> {
        self.check_editable(index)?;
        let mut point = self.working.remove(index);
        point.time = unit(time);
        point.value = unit(value);
        let new_index = self.working.partition_point(|p| p.time <= point.time);
        self.working.insert(new_index, point);
        Ok(new_index)
    }

    /// Set the curvature of the segment starting at `index`.
    pub fn set_curvature(&mut self, index: usize, curvature: f32) -> Result<(), EditError> {
        let len = self.working.len();
        let point = self
            .working
            .get_mut(index)
            .ok_or(EditError::IndexOutOfRange { index, len })?;
        point.curvature = bend(curvature);
        Ok(())
    }

    pub fn select(&mut self, index: usize) -> Result<(), EditError> {
        let len = self.working.len();
        let point = self
            .working
            .get_mut(index)
            .ok_or(EditError::IndexOutOfRange { index, len })?;
        point.selected = true;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        for point in &mut self.working {
            point.selected = false;
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.working
            .iter()
            .enumerate()
            .filter(|(_, p)| p.selected)
            .map(|(i, _)| i)
    }

    /// Remove every editable point. Locked points stay.
    pub fn clear(&mut self) {
        self.working.retain(|p| !p.editable);
    }

    /// Discard the working copy and start over from `template`.
    pub fn reset_to(&mut self, template: PointSet) {
        self.working = template.into_points();
    }

    /// Discard unpublished edits.
    pub fn revert(&mut self) {
        self.working = self.publisher.current().points().to_vec();
    }

    /// Snapshot the working copy and publish it. Returns the new version.
    pub fn publish(&mut self) -> u64 {
        let snapshot = PointSet::new(self.working.iter().copied());
        self.publisher.publish(snapshot)
    }

    fn check_editable(&self, index: usize) -> Result<(), EditError> {
        match self.working.get(index) {
            None => Err(EditError::IndexOutOfRange {
                index,
                len: self.working.len(),
            }),
            Some(point) if !point.editable => Err(EditError::Locked { index }),
            Some(_) => Ok(()),
        }
    }
}
