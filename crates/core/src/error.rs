//! Error types shared by the measurement core

/// Errors raised while measuring, formatting or exporting
#[derive(Debug, thiserror::Error)]
pub enum MeasureError {
    /// Vertex count below the minimum, non-positive radius or unusable coordinates
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Formatter given a negative or non-finite value
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Serialized measurement whose fields disagree with its type
    #[error("invalid measurement record: {0}")]
    InvalidRecord(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MeasureResult<T> = Result<T, MeasureError>;

impl MeasureError {
    pub(crate) fn geometry(message: impl Into<String>) -> Self {
        MeasureError::InvalidGeometry(message.into())
    }

    pub(crate) fn input(message: impl Into<String>) -> Self {
        MeasureError::InvalidInput(message.into())
    }

    /// True for errors caused by the drawn shape itself
    pub fn is_invalid_geometry(&self) -> bool {
        matches!(self, MeasureError::InvalidGeometry(_))
    }
}
