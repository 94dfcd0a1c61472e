use thiserror::Error;

/// Errors raised by the AOI geometry core.
///
/// None of these are fatal to an editing session: callers keep their
/// previous state and surface the failure as a rejected update.
#[derive(Debug, Error)]
pub enum AoiError {
    #[error("malformed GeoJSON: {0}")]
    MalformedGeoJson(String),

    #[error("position must have at least two ordinates, got {0}")]
    InvalidPosition(usize),

    #[error("buffer distance {got}m is outside 0..={max}m")]
    BufferOutOfRange { got: f64, max: f64 },

    #[error("buffering produced an empty geometry")]
    EmptyBuffer,

    #[error("no AOI is selected")]
    NoSelection,

    #[error("no buffer preview is pending")]
    NoPendingBuffer,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AoiError>;
