//! Session measurement history
//!
//! Append-ordered list of completed measurements. Deleting removes by
//! position and never touches the metrics of the remaining entries.

use crate::measurement::{Measurement, MeasurementId, MeasurementMetadata};

/// Ordered collection of measurements for one session
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MeasurementHistory {
    measurements: Vec<Measurement>,
}

impl MeasurementHistory {
    /// Create a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed measurement
    pub fn push(&mut self, measurement: Measurement) {
        tracing::debug!(id = %measurement.id(), position = self.measurements.len(), "history push");
        self.measurements.push(measurement);
    }

    /// Remove the measurement at `index`; out of range leaves history untouched
    pub fn remove(&mut self, index: usize) -> Option<Measurement> {
        if index >= self.measurements.len() {
            return None;
        }
        let removed = self.measurements.remove(index);
        tracing::debug!(id = %removed.id(), position = index, "history remove");
        Some(removed)
    }

    /// Get a measurement by position
    pub fn get(&self, index: usize) -> Option<&Measurement> {
        self.measurements.get(index)
    }

    /// Get a measurement by ID
    pub fn find(&self, id: MeasurementId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.id() == id)
    }

    /// Position of a measurement in the history
    pub fn position(&self, id: MeasurementId) -> Option<usize> {
        self.measurements.iter().position(|m| m.id() == id)
    }

    /// Editable metadata of a measurement
    pub fn metadata_mut(&mut self, id: MeasurementId) -> Option<&mut MeasurementMetadata> {
        self.measurements.iter_mut().find(|m| m.id() == id).map(Measurement::metadata_mut)
    }

    /// Most recently added measurement
    pub fn latest(&self) -> Option<&Measurement> {
        self.measurements.last()
    }

    /// Measurements in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Measurement> + ExactSizeIterator {
        self.measurements.iter()
    }

    /// Measurements with the most recent first, as the history panel lists them
    pub fn newest_first(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter().rev()
    }

    pub fn favorites(&self) -> impl Iterator<Item = &Measurement> {
        self.measurements.iter().filter(|m| m.metadata().is_favorite)
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Measurement> + 'a {
        self.measurements.iter().filter(move |m| m.metadata().tags.contains(tag))
    }

    /// Get total count of measurements
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn clear(&mut self) {
        tracing::debug!(removed = self.measurements.len(), "history cleared");
        self.measurements.clear();
    }

    pub fn as_slice(&self) -> &[Measurement] {
        &self.measurements
    }
}

impl From<Vec<Measurement>> for MeasurementHistory {
    fn from(measurements: Vec<Measurement>) -> Self {
        Self { measurements }
    }
}

impl<'a> IntoIterator for &'a MeasurementHistory {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.iter()
    }
}
