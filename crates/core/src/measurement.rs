//! Measurement records
//!
//! A measurement is created once, when a drawing interaction completes, from
//! the final vertices. Geometry and metrics are immutable from then on; only
//! the user-facing metadata (name, notes, tags, favorite flag) can change.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::{
    compute_circle_metrics, compute_polygon_metrics, compute_polyline_length, normalize_ring,
    path_midpoint, CoordinateMode, Vertex,
};
use std::collections::BTreeSet;
use std::fmt;

/// Unique identifier for measurements
pub type MeasurementId = uuid::Uuid;

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Type of measurement being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    /// Area and perimeter of a closed ring
    Polygon,
    /// Area and circumference of a circle
    Circle,
    /// Length of an open path
    Line,
}

impl MeasurementType {
    pub fn as_str(self) -> &'static str {
        match self {
            MeasurementType::Polygon => "polygon",
            MeasurementType::Circle => "circle",
            MeasurementType::Line => "line",
        }
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry and computed metrics, one variant per measurement type
///
/// Each variant carries exactly the metrics that apply to it, so a line can
/// never report an area.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementKind {
    Polygon {
        /// Ring vertices as drawn (not explicitly closed)
        coordinates: Vec<Vertex>,
        area: f64,
        perimeter: f64,
        center_point: Vertex,
    },
    Circle {
        center: Vertex,
        radius: f64,
        area: f64,
        perimeter: f64,
    },
    Line {
        coordinates: Vec<Vertex>,
        distance: f64,
    },
}

impl MeasurementKind {
    pub fn measurement_type(&self) -> MeasurementType {
        match self {
            MeasurementKind::Polygon { .. } => MeasurementType::Polygon,
            MeasurementKind::Circle { .. } => MeasurementType::Circle,
            MeasurementKind::Line { .. } => MeasurementType::Line,
        }
    }
}

/// Editable metadata owned by the UI and persistence layers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementMetadata {
    /// User-provided name
    pub name: Option<String>,
    /// Notes about this measurement
    pub notes: Option<String>,
    /// Tags, trimmed and unique
    pub tags: BTreeSet<String>,
    /// Favorite flag
    pub is_favorite: bool,
    /// Last modification timestamp (Unix seconds), None until first edit
    pub modified_at: Option<i64>,
}

impl MeasurementMetadata {
    /// Add a tag; blank and duplicate tags are ignored
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        let added = self.tags.insert(tag.to_owned());
        if added {
            self.touch();
        }
        added
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let removed = self.tags.remove(tag.trim());
        if removed {
            self.touch();
        }
        removed
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.name = if name.trim().is_empty() { None } else { Some(name) };
        self.touch();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        let notes = notes.into();
        self.notes = if notes.is_empty() { None } else { Some(notes) };
        self.touch();
    }

    pub fn set_favorite(&mut self, is_favorite: bool) {
        self.is_favorite = is_favorite;
        self.touch();
    }

    /// Update the modified timestamp to now
    pub fn touch(&mut self) {
        self.modified_at = Some(unix_now());
    }
}

/// A completed measurement
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(into = "MeasurementRecord", try_from = "MeasurementRecord")]
pub struct Measurement {
    /// Unique identifier
    id: MeasurementId,
    /// How the stored vertices are interpreted
    mode: CoordinateMode,
    /// Geometry and metrics
    kind: MeasurementKind,
    /// Place name from location search, opaque here
    location: Option<String>,
    /// Creation timestamp (Unix seconds)
    created_at: i64,
    /// Editable metadata
    metadata: MeasurementMetadata,
}

impl Measurement {
    fn from_kind(kind: MeasurementKind, mode: CoordinateMode, location: Option<String>) -> Self {
        let measurement = Self {
            id: MeasurementId::new_v4(),
            mode,
            kind,
            location: location.filter(|l| !l.trim().is_empty()),
            created_at: unix_now(),
            metadata: MeasurementMetadata::default(),
        };
        tracing::debug!(
            id = %measurement.id,
            kind = %measurement.measurement_type(),
            mode = mode.as_str(),
            "measurement created"
        );
        measurement
    }

    /// Measure a drawn ring
    pub fn polygon(
        ring: &[Vertex],
        mode: CoordinateMode,
        location: Option<String>,
    ) -> MeasureResult<Self> {
        let metrics = compute_polygon_metrics(ring, mode).inspect_err(log_rejected)?;

        let mut coordinates = ring.to_vec();
        while coordinates.len() > 1 && coordinates.last() == coordinates.first() {
            coordinates.pop();
        }

        Ok(Self::from_kind(
            MeasurementKind::Polygon {
                coordinates,
                area: metrics.area,
                perimeter: metrics.perimeter,
                center_point: metrics.center_point,
            },
            mode,
            location,
        ))
    }

    /// Measure a drawn circle
    pub fn circle(
        center: Vertex,
        radius: f64,
        mode: CoordinateMode,
        location: Option<String>,
    ) -> MeasureResult<Self> {
        mode.check_vertex(&center).inspect_err(log_rejected)?;
        let metrics = compute_circle_metrics(center, radius).inspect_err(log_rejected)?;

        Ok(Self::from_kind(
            MeasurementKind::Circle {
                center,
                radius,
                area: metrics.area,
                perimeter: metrics.perimeter,
            },
            mode,
            location,
        ))
    }

    /// Measure a drawn path
    pub fn line(
        points: &[Vertex],
        mode: CoordinateMode,
        location: Option<String>,
    ) -> MeasureResult<Self> {
        let distance = compute_polyline_length(points, mode).inspect_err(log_rejected)?;

        Ok(Self::from_kind(
            MeasurementKind::Line { coordinates: points.to_vec(), distance },
            mode,
            location,
        ))
    }

    /// Get the measurement ID
    pub fn id(&self) -> MeasurementId {
        self.id
    }

    pub fn mode(&self) -> CoordinateMode {
        self.mode
    }

    pub fn kind(&self) -> &MeasurementKind {
        &self.kind
    }

    pub fn measurement_type(&self) -> MeasurementType {
        self.kind.measurement_type()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn metadata(&self) -> &MeasurementMetadata {
        &self.metadata
    }

    /// Metadata is the only part of a measurement that may change
    pub fn metadata_mut(&mut self) -> &mut MeasurementMetadata {
        &mut self.metadata
    }

    /// Name for display, falling back to the measurement type
    pub fn display_name(&self) -> String {
        self.metadata
            .name
            .clone()
            .unwrap_or_else(|| format!("{} measurement", self.measurement_type()))
    }

    /// Enclosed area, for polygons and circles
    pub fn area(&self) -> Option<f64> {
        match &self.kind {
            MeasurementKind::Polygon { area, .. } | MeasurementKind::Circle { area, .. } => {
                Some(*area)
            }
            MeasurementKind::Line { .. } => None,
        }
    }

    /// Perimeter (circumference for circles)
    pub fn perimeter(&self) -> Option<f64> {
        match &self.kind {
            MeasurementKind::Polygon { perimeter, .. }
            | MeasurementKind::Circle { perimeter, .. } => Some(*perimeter),
            MeasurementKind::Line { .. } => None,
        }
    }

    /// Path length, for lines only
    pub fn distance(&self) -> Option<f64> {
        match &self.kind {
            MeasurementKind::Line { distance, .. } => Some(*distance),
            _ => None,
        }
    }

    /// Circle radius
    pub fn radius(&self) -> Option<f64> {
        match &self.kind {
            MeasurementKind::Circle { radius, .. } => Some(*radius),
            _ => None,
        }
    }

    /// Drawn vertices (polygon ring or line path)
    pub fn coordinates(&self) -> Option<&[Vertex]> {
        match &self.kind {
            MeasurementKind::Polygon { coordinates, .. }
            | MeasurementKind::Line { coordinates, .. } => Some(coordinates),
            MeasurementKind::Circle { .. } => None,
        }
    }

    /// Interior point of a polygon, center of a circle
    pub fn center_point(&self) -> Option<Vertex> {
        match &self.kind {
            MeasurementKind::Polygon { center_point, .. } => Some(*center_point),
            MeasurementKind::Circle { center, .. } => Some(*center),
            MeasurementKind::Line { .. } => None,
        }
    }

    /// Where the measurement label should be placed
    pub fn label_position(&self) -> Vertex {
        match &self.kind {
            MeasurementKind::Polygon { center_point, .. } => *center_point,
            MeasurementKind::Circle { center, .. } => *center,
            MeasurementKind::Line { coordinates, .. } => path_midpoint(coordinates),
        }
    }
}

fn log_rejected(error: &MeasureError) {
    tracing::warn!(%error, "geometry rejected");
}

/// Flat serialized form of a measurement
///
/// Field names follow the persisted measurement table. Metrics that do not
/// apply to the measurement type are `null`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MeasurementRecord {
    pub id: MeasurementId,
    #[serde(rename = "type")]
    pub measurement_type: MeasurementType,
    #[serde(default)]
    pub mode: CoordinateMode,
    pub area: Option<f64>,
    pub perimeter: Option<f64>,
    pub distance: Option<f64>,
    pub radius: Option<f64>,
    pub coordinates: Option<Vec<Vertex>>,
    pub center_point: Option<Vertex>,
    pub location: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: i64,
    #[serde(default)]
    pub modified_at: Option<i64>,
}

impl From<Measurement> for MeasurementRecord {
    fn from(measurement: Measurement) -> Self {
        let Measurement { id, mode, kind, location, created_at, metadata } = measurement;
        let measurement_type = kind.measurement_type();

        let mut record = MeasurementRecord {
            id,
            measurement_type,
            mode,
            area: None,
            perimeter: None,
            distance: None,
            radius: None,
            coordinates: None,
            center_point: None,
            location,
            name: metadata.name,
            notes: metadata.notes,
            tags: metadata.tags.into_iter().collect(),
            is_favorite: metadata.is_favorite,
            created_at,
            modified_at: metadata.modified_at,
        };

        match kind {
            MeasurementKind::Polygon { coordinates, area, perimeter, center_point } => {
                record.coordinates = Some(coordinates);
                record.area = Some(area);
                record.perimeter = Some(perimeter);
                record.center_point = Some(center_point);
            }
            MeasurementKind::Circle { center, radius, area, perimeter } => {
                record.center_point = Some(center);
                record.radius = Some(radius);
                record.area = Some(area);
                record.perimeter = Some(perimeter);
            }
            MeasurementKind::Line { coordinates, distance } => {
                record.coordinates = Some(coordinates);
                record.distance = Some(distance);
            }
        }

        record
    }
}

impl TryFrom<MeasurementRecord> for Measurement {
    type Error = MeasureError;

    fn try_from(record: MeasurementRecord) -> Result<Self, Self::Error> {
        fn invalid(message: String) -> MeasureError {
            MeasureError::InvalidRecord(message)
        }
        fn required<T>(value: Option<T>, field: &str, kind: MeasurementType) -> MeasureResult<T> {
            value.ok_or_else(|| invalid(format!("{kind} record is missing {field}")))
        }
        fn absent<T>(value: &Option<T>, field: &str, kind: MeasurementType) -> MeasureResult<()> {
            match value {
                Some(_) => Err(invalid(format!("{kind} record must not carry {field}"))),
                None => Ok(()),
            }
        }
        fn non_negative(value: f64, field: &str) -> MeasureResult<f64> {
            if value.is_finite() && value >= 0.0 {
                Ok(value)
            } else {
                Err(invalid(format!("{field} must be non-negative, got {value}")))
            }
        }
        // Stored geometry must pass the same checks as freshly drawn geometry
        fn checked(result: MeasureResult<()>) -> MeasureResult<()> {
            result.map_err(|err| match err {
                MeasureError::InvalidGeometry(message) => invalid(message),
                other => other,
            })
        }

        let kind_tag = record.measurement_type;
        let kind = match kind_tag {
            MeasurementType::Polygon => {
                absent(&record.distance, "distance", kind_tag)?;
                absent(&record.radius, "radius", kind_tag)?;
                let coordinates = required(record.coordinates, "coordinates", kind_tag)?;
                checked(normalize_ring(&coordinates, record.mode).map(|_| ()))?;
                let center_point = required(record.center_point, "center_point", kind_tag)?;
                checked(record.mode.check_vertex(&center_point))?;
                MeasurementKind::Polygon {
                    coordinates,
                    area: non_negative(required(record.area, "area", kind_tag)?, "area")?,
                    perimeter: non_negative(
                        required(record.perimeter, "perimeter", kind_tag)?,
                        "perimeter",
                    )?,
                    center_point,
                }
            }
            MeasurementType::Circle => {
                absent(&record.distance, "distance", kind_tag)?;
                absent(&record.coordinates, "coordinates", kind_tag)?;
                let radius = required(record.radius, "radius", kind_tag)?;
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(invalid(format!("circle radius must be positive, got {radius}")));
                }
                let center = required(record.center_point, "center_point", kind_tag)?;
                checked(record.mode.check_vertex(&center))?;
                MeasurementKind::Circle {
                    center,
                    radius,
                    area: non_negative(required(record.area, "area", kind_tag)?, "area")?,
                    perimeter: non_negative(
                        required(record.perimeter, "perimeter", kind_tag)?,
                        "perimeter",
                    )?,
                }
            }
            MeasurementType::Line => {
                absent(&record.area, "area", kind_tag)?;
                absent(&record.perimeter, "perimeter", kind_tag)?;
                absent(&record.radius, "radius", kind_tag)?;
                let coordinates = required(record.coordinates, "coordinates", kind_tag)?;
                if coordinates.len() < 2 {
                    return Err(invalid("line record needs at least 2 coordinates".to_owned()));
                }
                for vertex in &coordinates {
                    checked(record.mode.check_vertex(vertex))?;
                }
                MeasurementKind::Line {
                    coordinates,
                    distance: non_negative(
                        required(record.distance, "distance", kind_tag)?,
                        "distance",
                    )?,
                }
            }
        };

        let tags = record
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Measurement {
            id: record.id,
            mode: record.mode,
            kind,
            location: record.location,
            created_at: record.created_at,
            metadata: MeasurementMetadata {
                name: record.name,
                notes: record.notes,
                tags,
                is_favorite: record.is_favorite,
                modified_at: record.modified_at,
            },
        })
    }
}
