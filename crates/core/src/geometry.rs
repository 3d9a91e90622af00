//! Geometry engine
//!
//! Pure conversion from drawn vertices (or a circle) into area, perimeter
//! and length. Geographic vertices are longitude/latitude in degrees and are
//! measured on a sphere of radius [`EARTH_RADIUS_M`]; planar vertices are
//! plain Cartesian units (screen pixels, page points, metres on a local grid).
//!
//! Rings are always treated as implicitly closed: the last vertex connects
//! back to the first, and a caller-supplied closing vertex is ignored.

use crate::error::{MeasureError, MeasureResult};
use geo::{
    Area, ChamberlainDuquetteArea, Coord, Euclidean, InteriorPoint, Length, LineString, Polygon,
};
use std::borrow::Cow;
use std::collections::HashSet;

/// Sphere radius used for geographic measurements (metres)
///
/// Same radius as the spherical Mercator projection the map is drawn in, so
/// lengths agree with what the map UI reports.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A single drawn vertex
///
/// In geographic mode `x` is longitude and `y` is latitude, both in degrees.
/// Serialized as a `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    /// Create a new vertex
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Longitude in degrees (geographic mode)
    pub fn lon(&self) -> f64 {
        self.x
    }

    /// Latitude in degrees (geographic mode)
    pub fn lat(&self) -> f64 {
        self.y
    }

    /// Euclidean distance to another vertex
    pub fn distance_to(&self, other: &Vertex) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    // -0.0 and 0.0 hash alike
    fn bit_key(&self) -> (u64, u64) {
        ((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }
}

impl From<[f64; 2]> for Vertex {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Vertex> for [f64; 2] {
    fn from(vertex: Vertex) -> Self {
        [vertex.x, vertex.y]
    }
}

impl From<Vertex> for Coord<f64> {
    fn from(vertex: Vertex) -> Self {
        Coord { x: vertex.x, y: vertex.y }
    }
}

impl From<(f64, f64)> for Vertex {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// How vertex coordinates are interpreted
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateMode {
    /// Longitude/latitude in degrees, spherical-earth distances in metres
    #[default]
    Geographic,
    /// Raw Cartesian units
    Planar,
}

impl CoordinateMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CoordinateMode::Geographic => "geographic",
            CoordinateMode::Planar => "planar",
        }
    }

    /// Reject vertices that cannot be measured in this mode
    pub(crate) fn check_vertex(self, vertex: &Vertex) -> MeasureResult<()> {
        if !vertex.is_finite() {
            return Err(MeasureError::geometry(format!(
                "vertex ({}, {}) is not finite",
                vertex.x, vertex.y
            )));
        }
        if self == CoordinateMode::Geographic
            && (!(-180.0..=180.0).contains(&vertex.x) || !(-90.0..=90.0).contains(&vertex.y))
        {
            return Err(MeasureError::geometry(format!(
                "vertex ({}, {}) is outside longitude/latitude range",
                vertex.x, vertex.y
            )));
        }
        Ok(())
    }
}

/// Metrics of a closed polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonMetrics {
    /// Square metres (geographic) or square units (planar)
    pub area: f64,
    /// Closed boundary length
    pub perimeter: f64,
    /// A point inside the ring, for labels
    pub center_point: Vertex,
}

/// Metrics of a circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleMetrics {
    pub area: f64,
    /// Circumference
    pub perimeter: f64,
}

/// Area, perimeter and interior point of a ring
///
/// Fails with `InvalidGeometry` when fewer than three distinct vertices
/// remain after dropping an explicit closing vertex. Self-intersecting rings
/// are not detected; they still produce a non-negative area.
pub fn compute_polygon_metrics(
    ring: &[Vertex],
    mode: CoordinateMode,
) -> MeasureResult<PolygonMetrics> {
    let ring = normalize_ring(ring, mode)?;

    let (area, center_point) = match mode {
        CoordinateMode::Geographic => {
            let continuous = unwrap_antimeridian(ring);
            let center = interior_point(&continuous);
            (
                spherical_ring_area(&continuous),
                Vertex::new(wrap_longitude(center.x), center.y),
            )
        }
        CoordinateMode::Planar => (shoelace_area(ring), interior_point(ring)),
    };

    Ok(PolygonMetrics { area, perimeter: closed_length(ring, mode), center_point })
}

/// Area and circumference of a circle
///
/// The radius is already linear (metres or planar units), so the same
/// formulas apply in both modes. Fails with `InvalidGeometry` unless the
/// radius is positive and finite.
pub fn compute_circle_metrics(center: Vertex, radius: f64) -> MeasureResult<CircleMetrics> {
    if !center.is_finite() {
        return Err(MeasureError::geometry(format!(
            "circle center ({}, {}) is not finite",
            center.x, center.y
        )));
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(MeasureError::geometry(format!(
            "circle radius must be positive, got {radius}"
        )));
    }

    Ok(CircleMetrics {
        area: std::f64::consts::PI * radius * radius,
        perimeter: 2.0 * std::f64::consts::PI * radius,
    })
}

/// Cumulative length of an open polyline
pub fn compute_polyline_length(points: &[Vertex], mode: CoordinateMode) -> MeasureResult<f64> {
    if points.len() < 2 {
        return Err(MeasureError::geometry(format!(
            "polyline needs at least 2 vertices, got {}",
            points.len()
        )));
    }
    for point in points {
        mode.check_vertex(point)?;
    }

    Ok(path_length(points, mode))
}

/// Validate a ring and strip an explicit closing vertex
pub(crate) fn normalize_ring(ring: &[Vertex], mode: CoordinateMode) -> MeasureResult<&[Vertex]> {
    for vertex in ring {
        mode.check_vertex(vertex)?;
    }

    let mut end = ring.len();
    while end > 1 && ring[end - 1] == ring[0] {
        end -= 1;
    }
    let ring = &ring[..end];

    let distinct: HashSet<(u64, u64)> = ring.iter().map(Vertex::bit_key).collect();
    if distinct.len() < 3 {
        return Err(MeasureError::geometry(format!(
            "polygon needs at least 3 distinct vertices, got {}",
            distinct.len()
        )));
    }

    Ok(ring)
}

/// Length of an open path
fn path_length(points: &[Vertex], mode: CoordinateMode) -> f64 {
    match mode {
        CoordinateMode::Geographic => {
            points.windows(2).map(|w| haversine_distance(&w[0], &w[1])).sum()
        }
        CoordinateMode::Planar => line_string(points).length::<Euclidean>(),
    }
}

/// Boundary length of an implicitly closed ring
fn closed_length(ring: &[Vertex], mode: CoordinateMode) -> f64 {
    let mut closed = ring.to_vec();
    if let Some(first) = ring.first() {
        closed.push(*first);
    }
    path_length(&closed, mode)
}

/// Great-circle distance in metres between two lon/lat vertices (haversine)
///
/// Uses [`EARTH_RADIUS_M`] rather than the mean radius so lengths match the
/// spherical area and the web map.
pub fn haversine_distance(a: &Vertex, b: &Vertex) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let half_dlat = (lat2 - lat1) / 2.0;
    let half_dlon = (b.lon() - a.lon()).to_radians() / 2.0;

    let h = half_dlat.sin().powi(2) + half_dlon.sin().powi(2) * lat1.cos() * lat2.cos();
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

fn line_string(points: &[Vertex]) -> LineString<f64> {
    points.iter().map(|v| Coord::from(*v)).collect()
}

fn polygon(ring: &[Vertex]) -> Polygon<f64> {
    Polygon::new(line_string(ring), vec![])
}

/// Planar polygon area (shoelace formula), orientation independent
pub fn shoelace_area(ring: &[Vertex]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    polygon(ring).unsigned_area()
}

/// Area in square metres of a lon/lat ring on the sphere
///
/// Chamberlain & Duquette, "Some Algorithms for Polygons on a Sphere", on
/// the equatorial radius. Exact for rings whose edges follow meridians and
/// parallels, a close approximation for small polygons otherwise. Rings
/// crossing the antimeridian are measured on continuous longitudes.
pub fn spherical_ring_area(ring: &[Vertex]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    polygon(&unwrap_antimeridian(ring)).chamberlain_duquette_unsigned_area()
}

/// Shift a ring that jumps across ±180° onto [0, 360) longitudes
fn unwrap_antimeridian(ring: &[Vertex]) -> Cow<'_, [Vertex]> {
    let n = ring.len();
    let crosses = (0..n).any(|i| (ring[(i + 1) % n].x - ring[i].x).abs() > 180.0);
    if !crosses {
        return Cow::Borrowed(ring);
    }
    Cow::Owned(
        ring.iter()
            .map(|v| Vertex::new(if v.x < 0.0 { v.x + 360.0 } else { v.x }, v.y))
            .collect(),
    )
}

/// Wrap a longitude into [-180, 180]
pub(crate) fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// A point inside a simple ring, suitable for placing a label
///
/// Midpoint of the widest horizontal span through the middle of the
/// bounding box. Falls back to the vertex average when no span is found.
pub fn interior_point(ring: &[Vertex]) -> Vertex {
    if ring.is_empty() {
        return Vertex::new(0.0, 0.0);
    }

    polygon(ring)
        .interior_point()
        .map(|p| Vertex::new(p.x(), p.y()))
        .unwrap_or_else(|| vertex_average(ring))
}

/// Point halfway along an open path, interpolated in vertex space
pub fn path_midpoint(points: &[Vertex]) -> Vertex {
    match points {
        [] => Vertex::new(0.0, 0.0),
        [only] => *only,
        _ => {
            let total: f64 = points.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
            let half = total / 2.0;

            let mut accumulated = 0.0;
            for w in points.windows(2) {
                let segment = w[0].distance_to(&w[1]);
                if segment > 0.0 && accumulated + segment >= half {
                    let t = (half - accumulated) / segment;
                    return Vertex::new(
                        w[0].x + t * (w[1].x - w[0].x),
                        w[0].y + t * (w[1].y - w[0].y),
                    );
                }
                accumulated += segment;
            }
            points[points.len() - 1]
        }
    }
}

fn vertex_average(points: &[Vertex]) -> Vertex {
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.x).sum();
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    Vertex::new(sum_x / n, sum_y / n)
}
