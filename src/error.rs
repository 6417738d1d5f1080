//! Unified error handling.
//!
//! Expected absence (no road nearby, no intersection ahead, no POI) is never an
//! error: those are modelled as `Option` fields on the results. The variants here
//! cover the few conditions a caller genuinely has to react to.

use thiserror::Error;

/// Errors produced by the geocoding pipeline and the map repository.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// No spatial data is available around the location, so nothing can be
    /// geocoded right now. Callers should keep their last announcement.
    #[error("no spatial data available around ({latitude}, {longitude})")]
    MissingSnapshot { latitude: f64, longitude: f64 },

    /// A heading that is NaN, infinite or outside [0, 360].
    #[error("invalid heading: {value}")]
    InvalidHeading { value: f64 },

    /// A coordinate that is not a valid WGS84 position.
    #[error("invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Map data that is structurally unusable (duplicate keys, dangling references).
    #[error("invalid map data: {0}")]
    MapData(String),

    #[error("failed to parse map data: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GeocodeError>;

/// Convenience conversions from `Option` to `GeocodeError`.
pub trait OptionExt<T> {
    /// Map `None` to [`GeocodeError::MissingSnapshot`] for the given location.
    fn ok_or_missing_snapshot(self, latitude: f64, longitude: f64) -> Result<T>;

    /// Map `None` to [`GeocodeError::MapData`] with the given message.
    fn ok_or_map_data(self, message: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing_snapshot(self, latitude: f64, longitude: f64) -> Result<T> {
        self.ok_or(GeocodeError::MissingSnapshot {
            latitude,
            longitude,
        })
    }

    fn ok_or_map_data(self, message: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| GeocodeError::MapData(message.into()))
    }
}
