//! CSV export for the measurement history
//!
//! One row per measurement, for spreadsheets and reporting tools. Metric
//! cells that do not apply to a measurement type are left empty.

use crate::error::MeasureResult;
use crate::format;
use crate::history::MeasurementHistory;
use crate::measurement::{Measurement, MeasurementType};
use std::io::Write;

/// Configuration for CSV export
#[derive(Debug, Clone)]
pub struct CsvExportConfig {
    /// Include column headers in the output
    pub include_headers: bool,

    /// CSV delimiter character
    pub delimiter: u8,

    /// Export only favorites
    pub favorites_only: bool,

    /// Export only these measurement types (None = all types)
    pub type_filter: Option<Vec<MeasurementType>>,
}

impl Default for CsvExportConfig {
    fn default() -> Self {
        Self { include_headers: true, delimiter: b',', favorites_only: false, type_filter: None }
    }
}

impl CsvExportConfig {
    fn accepts(&self, measurement: &Measurement) -> bool {
        if self.favorites_only && !measurement.metadata().is_favorite {
            return false;
        }
        match self.type_filter {
            Some(ref types) => types.contains(&measurement.measurement_type()),
            None => true,
        }
    }
}

/// CSV column headers, in row order
pub const HEADERS: [&str; 18] = [
    "ID",
    "Type",
    "Mode",
    "Name",
    "Location",
    "Area (m2)",
    "Perimeter (m)",
    "Distance (m)",
    "Radius (m)",
    "Hectares",
    "Acres",
    "Kilometers",
    "Label X",
    "Label Y",
    "Vertices",
    "Tags",
    "Favorite",
    "Created",
];

/// Export the history to CSV format
///
/// Columns:
/// - ID: Unique measurement identifier
/// - Type: polygon, circle or line
/// - Mode: geographic or planar
/// - Name / Location: user name and place label (empty if none)
/// - Area, Perimeter, Distance, Radius: raw metrics, empty when not applicable
/// - Hectares, Acres: converted area (geographic mode only)
/// - Kilometers: perimeter (closed shapes) or distance (lines) in km (geographic mode only)
/// - Label X / Label Y: where the label is drawn (lon/lat in geographic mode)
/// - Vertices: number of drawn vertices (empty for circles)
/// - Tags: semicolon-separated tags
/// - Favorite: true/false
/// - Created: creation timestamp (Unix seconds)
pub fn export_history_csv<W: Write>(
    writer: W,
    history: &MeasurementHistory,
    config: &CsvExportConfig,
) -> MeasureResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(config.include_headers)
        .from_writer(writer);

    if config.include_headers {
        csv_writer.write_record(HEADERS)?;
    }

    for measurement in history.iter().filter(|m| config.accepts(m)) {
        csv_writer.write_record(&measurement_row(measurement)?)?;
    }

    csv_writer.flush()?;
    Ok(())
}

fn measurement_row(measurement: &Measurement) -> MeasureResult<Vec<String>> {
    let metadata = measurement.metadata();
    let area = format::area_summary(measurement)?;
    let length = format::length_summary(measurement)?;
    let label = measurement.label_position();

    Ok(vec![
        measurement.id().to_string(),
        measurement.measurement_type().to_string(),
        measurement.mode().as_str().to_string(),
        metadata.name.clone().unwrap_or_default(),
        measurement.location().unwrap_or("").to_string(),
        optional_cell(measurement.area()),
        optional_cell(measurement.perimeter()),
        optional_cell(measurement.distance()),
        optional_cell(measurement.radius()),
        optional_cell(area.map(|a| a.hectares)),
        optional_cell(area.map(|a| a.acres)),
        optional_cell(length.map(|l| l.kilometers)),
        label.x.to_string(),
        label.y.to_string(),
        measurement.coordinates().map(|c| c.len().to_string()).unwrap_or_default(),
        metadata.tags.iter().cloned().collect::<Vec<_>>().join(";"),
        metadata.is_favorite.to_string(),
        measurement.created_at().to_string(),
    ])
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
