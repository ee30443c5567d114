use thiserror::Error;

use crate::geometry::GeometryError;
use crate::request::ValidationError;

/// Airmap error type.
#[derive(Debug, Error)]
pub enum AirmapError {
    /// The request was rejected before reaching the lookup provider.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request was valid but there is no data for it.
    #[error("{0}")]
    NotFound(String),

    /// Transport failure or unexpected response status.
    #[error("Failed to fetch map data. Please try again.")]
    Network(String),

    /// Boundary geometry could not be used.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// A table key does not have the `<region> - <period>` shape.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The requested time index is outside of the loaded period list.
    #[error("time index {index} is out of range for {len} periods")]
    TimeIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of loaded periods.
        len: usize,
    },

    /// A selection or playback change was made before any data was loaded.
    #[error("No map data loaded")]
    NoDataset,

    /// Catalog file could not be loaded.
    #[error("failed to load catalog: {0}")]
    Catalog(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AirmapError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
