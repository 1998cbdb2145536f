//! Session-scoped, append-only detection log.

use serde::Serialize;

use crate::types::DetectionRecord;

/// Ordered detection records owned by a single session.
///
/// Records are only ever appended; insertion order is the export order.
/// Identical plates are kept as separate records.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionLog {
    records: Vec<DetectionRecord>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record at the end of the log.
    pub fn append(&mut self, record: DetectionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[DetectionRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DetectionRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&DetectionRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a SessionLog {
    type Item = &'a DetectionRecord;
    type IntoIter = std::slice::Iter<'a, DetectionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
