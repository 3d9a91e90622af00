//! AreaScope Core Library
//!
//! Geometry measurement core for the map measuring tool: turns drawn
//! polygons, circles and paths into area, perimeter and length, keeps the
//! session history and converts metrics into display units.

pub mod csv_export;
pub mod error;
pub mod export;
pub mod format;
pub mod geometry;
pub mod history;
pub mod measurement;
pub mod projection;

pub use csv_export::{export_history_csv, CsvExportConfig};
pub use error::{MeasureError, MeasureResult};
pub use export::{history_json, measurement_json, ExportDocument};
pub use format::{
    central_parks, city_blocks, football_fields, to_acres, to_hectares, to_kilometers,
    to_square_kilometers, AreaSummary, LengthSummary, SizeComparison,
};
pub use geometry::{
    compute_circle_metrics, compute_polygon_metrics, compute_polyline_length, CircleMetrics,
    CoordinateMode, PolygonMetrics, Vertex, EARTH_RADIUS_M,
};
pub use history::MeasurementHistory;
pub use measurement::{
    Measurement, MeasurementId, MeasurementKind, MeasurementMetadata, MeasurementRecord,
    MeasurementType,
};
pub use projection::{project_vertex, unproject_path, unproject_vertex, Projection, WebMercator};
