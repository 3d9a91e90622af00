//! Boundary adapter between the map's drawing surface and longitude/latitude
//!
//! The drawing UI hands over vertices in its projected coordinate system.
//! They are unprojected here before any metric is computed, so areas are
//! never taken in a distorted projection.

use crate::geometry::{wrap_longitude, Vertex, EARTH_RADIUS_M};
use std::f64::consts::PI;

/// Conversion between a projected plane and lon/lat degrees
pub trait Projection {
    /// Lon/lat degrees to projected coordinates
    fn project(&self, lon_lat: Vertex) -> Vertex;

    /// Projected coordinates to lon/lat degrees
    fn unproject(&self, projected: Vertex) -> Vertex;
}

/// Spherical Mercator (EPSG:3857), the projection of standard web map tiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WebMercator;

impl WebMercator {
    /// Half the width of the projected world in metres
    pub const HALF_SIZE: f64 = PI * EARTH_RADIUS_M;
}

impl Projection for WebMercator {
    fn project(&self, lon_lat: Vertex) -> Vertex {
        let x = EARTH_RADIUS_M * lon_lat.lon().to_radians();
        let y = EARTH_RADIUS_M * (PI * (lon_lat.lat() + 90.0) / 360.0).tan().ln();
        // Poles map to infinity; pin them to the square world extent
        Vertex::new(x, y.clamp(-Self::HALF_SIZE, Self::HALF_SIZE))
    }

    fn unproject(&self, projected: Vertex) -> Vertex {
        let lon = 180.0 * projected.x / Self::HALF_SIZE;
        let lat = 360.0 * (projected.y / EARTH_RADIUS_M).exp().atan() / PI - 90.0;
        Vertex::new(wrap_longitude(lon), lat)
    }
}

/// Project a lon/lat vertex into web map coordinates
pub fn project_vertex(lon_lat: Vertex) -> Vertex {
    WebMercator.project(lon_lat)
}

/// Convert a web map coordinate back to lon/lat
pub fn unproject_vertex(projected: Vertex) -> Vertex {
    WebMercator.unproject(projected)
}

/// Unproject every vertex of a drawn path or ring
pub fn unproject_path<P: Projection + ?Sized>(projection: &P, projected: &[Vertex]) -> Vec<Vertex> {
    projected.iter().map(|p| projection.unproject(*p)).collect()
}
