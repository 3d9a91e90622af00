//! JSON export of measurements
//!
//! The export document is what a user downloads: the raw metrics plus the
//! converted units and comparisons shown next to them.

use crate::error::MeasureResult;
use crate::format::{self, AreaSummary, LengthSummary, SizeComparison};
use crate::geometry::{CoordinateMode, Vertex};
use crate::history::MeasurementHistory;
use crate::measurement::{Measurement, MeasurementType};
use std::io::Write;

/// Name used when the user never named the measurement
pub const UNTITLED: &str = "Untitled Measurement";

/// Downloadable form of one measurement
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ExportDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub measurement_type: MeasurementType,
    pub mode: CoordinateMode,
    pub area: Option<f64>,
    pub perimeter: Option<f64>,
    pub distance: Option<f64>,
    pub radius: Option<f64>,
    pub coordinates: Option<Vec<Vertex>>,
    pub center_point: Option<Vertex>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub created_at: i64,
    pub area_summary: Option<AreaSummary>,
    pub length_summary: Option<LengthSummary>,
    pub comparisons: Option<SizeComparison>,
}

impl ExportDocument {
    pub fn from_measurement(measurement: &Measurement) -> MeasureResult<Self> {
        let metadata = measurement.metadata();
        Ok(Self {
            name: metadata.name.clone().unwrap_or_else(|| UNTITLED.to_owned()),
            measurement_type: measurement.measurement_type(),
            mode: measurement.mode(),
            area: measurement.area(),
            perimeter: measurement.perimeter(),
            distance: measurement.distance(),
            radius: measurement.radius(),
            coordinates: measurement.coordinates().map(<[Vertex]>::to_vec),
            center_point: measurement.center_point(),
            location: measurement.location().map(str::to_owned),
            notes: metadata.notes.clone(),
            tags: metadata.tags.iter().cloned().collect(),
            is_favorite: metadata.is_favorite,
            created_at: measurement.created_at(),
            area_summary: format::area_summary(measurement)?,
            length_summary: format::length_summary(measurement)?,
            comparisons: format::comparisons(measurement)?,
        })
    }
}

/// Pretty JSON document for a single measurement
pub fn measurement_json(measurement: &Measurement) -> MeasureResult<String> {
    let document = ExportDocument::from_measurement(measurement)?;
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Pretty JSON array of every measurement in the history, oldest first
pub fn history_json(history: &MeasurementHistory) -> MeasureResult<String> {
    let documents = history
        .iter()
        .map(ExportDocument::from_measurement)
        .collect::<MeasureResult<Vec<_>>>()?;
    Ok(serde_json::to_string_pretty(&documents)?)
}

/// Write the history JSON to any writer
pub fn write_history_json<W: Write>(
    mut writer: W,
    history: &MeasurementHistory,
) -> MeasureResult<()> {
    writer.write_all(history_json(history)?.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
