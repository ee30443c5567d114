//! Lookup providers answer a map request with tile URLs, statistics, legend and geometry.

use async_trait::async_trait;
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

use crate::dataset::{LegendTable, StatsTable, UrlTable};
use crate::keys::RegionKey;
use crate::request::ValidatedRequest;
use crate::AirmapError;

pub mod catalog;
pub mod http;

/// Successful lookup, also the JSON body of a `200` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapResponse {
    /// Always `true`.
    pub success: bool,
    /// Dataset the data belongs to.
    #[serde(default)]
    pub dataset: String,
    /// Measured quantity, e.g. `O3`.
    #[serde(default)]
    pub quantity: String,
    /// Tile URL per `<region> - <period>` key.
    pub urls: UrlTable,
    /// Legend color per selected class.
    #[serde(default)]
    pub legends: LegendTable,
    /// Statistic per key; `null` when the value could not be computed.
    #[serde(default)]
    pub stats: StatsTable,
    /// Boundaries of the regions that have data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geojson_data: Option<FeatureCollection>,
    /// Regions that have data, in request order.
    #[serde(default)]
    pub selected_regions: Vec<RegionKey>,
}

/// JSON body of any non `200` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// User facing message.
    pub error: String,
}

impl ErrorBody {
    /// Creates an error body with the given message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Source of map data for a validated request.
///
/// Implementations must not have side effects the caller could observe on
/// failure: an `Err` means nothing was loaded.
#[async_trait]
pub trait LookupProvider: Send + Sync {
    /// Looks up the data for the request.
    async fn lookup(&self, request: &ValidatedRequest) -> Result<MapResponse, AirmapError>;
}
