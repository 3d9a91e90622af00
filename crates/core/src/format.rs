//! Unit conversions and illustrative size comparisons
//!
//! Everything here returns full-precision numbers; rounding is left to
//! whoever renders them. Inputs must be finite and non-negative.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::CoordinateMode;
use crate::measurement::Measurement;

/// Square metres per hectare
pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Acres per hectare (rounded, as shown in the UI)
pub const ACRES_PER_HECTARE: f64 = 2.471;

/// Area of an American football field in square metres (approximate)
pub const FOOTBALL_FIELD_M2: f64 = 5_351.0;

/// Area of a Manhattan city block in hectares (approximate)
pub const CITY_BLOCK_HECTARES: f64 = 2.0;

/// Area of Central Park, New York, in hectares (approximate)
pub const CENTRAL_PARK_HECTARES: f64 = 341.0;

fn check(value: f64, what: &str) -> MeasureResult<f64> {
    if !value.is_finite() {
        return Err(MeasureError::input(format!("{what} must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(MeasureError::input(format!("{what} must not be negative, got {value}")));
    }
    Ok(value)
}

pub fn to_hectares(area_m2: f64) -> MeasureResult<f64> {
    Ok(check(area_m2, "area")? / SQUARE_METERS_PER_HECTARE)
}

pub fn to_acres(area_m2: f64) -> MeasureResult<f64> {
    Ok(to_hectares(area_m2)? * ACRES_PER_HECTARE)
}

pub fn to_square_kilometers(area_m2: f64) -> MeasureResult<f64> {
    Ok(check(area_m2, "area")? / 1_000_000.0)
}

pub fn to_kilometers(meters: f64) -> MeasureResult<f64> {
    Ok(check(meters, "length")? / 1_000.0)
}

/// How many football fields fit in the area
pub fn football_fields(area_m2: f64) -> MeasureResult<f64> {
    Ok(check(area_m2, "area")? / FOOTBALL_FIELD_M2)
}

/// How many NYC city blocks fit in the area
pub fn city_blocks(area_m2: f64) -> MeasureResult<f64> {
    Ok(to_hectares(area_m2)? / CITY_BLOCK_HECTARES)
}

/// The area as a fraction of Central Park
pub fn central_parks(area_m2: f64) -> MeasureResult<f64> {
    Ok(to_hectares(area_m2)? / CENTRAL_PARK_HECTARES)
}

/// Illustrative ratios for an area; approximations, not survey figures
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SizeComparison {
    pub football_fields: f64,
    pub city_blocks: f64,
    pub central_parks: f64,
}

impl SizeComparison {
    pub fn for_area(area_m2: f64) -> MeasureResult<Self> {
        Ok(Self {
            football_fields: football_fields(area_m2)?,
            city_blocks: city_blocks(area_m2)?,
            central_parks: central_parks(area_m2)?,
        })
    }
}

/// An area in the units the UI shows
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AreaSummary {
    pub square_meters: f64,
    pub hectares: f64,
    pub acres: f64,
    pub square_kilometers: f64,
}

impl AreaSummary {
    pub fn for_area(area_m2: f64) -> MeasureResult<Self> {
        Ok(Self {
            square_meters: check(area_m2, "area")?,
            hectares: to_hectares(area_m2)?,
            acres: to_acres(area_m2)?,
            square_kilometers: to_square_kilometers(area_m2)?,
        })
    }
}

/// A length in the units the UI shows
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LengthSummary {
    pub meters: f64,
    pub kilometers: f64,
}

impl LengthSummary {
    pub fn for_length(meters: f64) -> MeasureResult<Self> {
        Ok(Self { meters: check(meters, "length")?, kilometers: to_kilometers(meters)? })
    }
}

/// Area summary of a measurement, when it encloses an area in square metres
///
/// Planar measurements carry arbitrary units and get no summary.
pub fn area_summary(measurement: &Measurement) -> MeasureResult<Option<AreaSummary>> {
    si_metric(measurement, measurement.area()).map(AreaSummary::for_area).transpose()
}

/// Length summary: perimeter for closed shapes, distance for lines
pub fn length_summary(measurement: &Measurement) -> MeasureResult<Option<LengthSummary>> {
    let length = measurement.distance().or_else(|| measurement.perimeter());
    si_metric(measurement, length).map(LengthSummary::for_length).transpose()
}

/// Size comparisons of a measurement, when it encloses an area in square metres
pub fn comparisons(measurement: &Measurement) -> MeasureResult<Option<SizeComparison>> {
    si_metric(measurement, measurement.area()).map(SizeComparison::for_area).transpose()
}

fn si_metric(measurement: &Measurement, value: Option<f64>) -> Option<f64> {
    match measurement.mode() {
        CoordinateMode::Geographic => value,
        CoordinateMode::Planar => None,
    }
}
