//! Tables returned by a lookup and the periods and regions derived from them.

use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::BoundaryGeometry;
use crate::keys::{OverlayKey, RegionKey, TimeKey};
use crate::provider::MapResponse;
use crate::AirmapError;

/// Tile URL template per overlay key.
pub type UrlTable = BTreeMap<OverlayKey, String>;

/// Statistic value per overlay key. `None` means no data.
pub type StatsTable = BTreeMap<OverlayKey, Option<f64>>;

/// Color per concentration class.
pub type LegendTable = BTreeMap<String, String>;

/// One legend row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    /// Class name as sent by the provider.
    pub class: String,
    /// CSS color.
    pub color: String,
    /// Human readable label.
    pub label: String,
}

/// Label shown next to a legend color, e.g. `Low Concentration`.
pub fn legend_label(class: &str) -> String {
    let mut chars = class.chars();
    match chars.next() {
        Some(first) => format!("{}{} Concentration", first.to_uppercase(), chars.as_str()),
        None => "Concentration".to_string(),
    }
}

/// Text used for a statistic value: four decimals, or `N/A` when there is no data.
pub fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.4}"),
        _ => "N/A".to_string(),
    }
}

/// Everything loaded by one successful submission.
///
/// A new submission replaces the whole dataset; nothing is merged.
#[derive(Debug, Clone, Default)]
pub struct OverlayDataset {
    quantity: String,
    urls: UrlTable,
    stats: StatsTable,
    legend: LegendTable,
    geometry: BoundaryGeometry,
    requested_regions: Vec<RegionKey>,
    regions: BTreeSet<RegionKey>,
    periods: Vec<TimeKey>,
}

impl OverlayDataset {
    /// Creates a dataset from its tables.
    ///
    /// Fails if any URL key is not a `<region> - <period>` key.
    pub fn new(
        quantity: impl Into<String>,
        urls: UrlTable,
        stats: StatsTable,
        legend: LegendTable,
        geometry: BoundaryGeometry,
    ) -> Result<Self, AirmapError> {
        let mut regions = BTreeSet::new();
        let mut periods = BTreeSet::new();
        for key in urls.keys() {
            let (region, period) = key.split()?;
            regions.insert(region);
            periods.insert(period);
        }

        Ok(Self {
            quantity: quantity.into(),
            urls,
            stats,
            legend,
            geometry,
            requested_regions: Vec::new(),
            regions,
            periods: periods.into_iter().collect(),
        })
    }

    /// Validates a provider response and builds the dataset from it.
    pub fn from_response(response: MapResponse) -> Result<Self, AirmapError> {
        let geometry = match &response.geojson_data {
            Some(collection) => BoundaryGeometry::from_feature_collection(collection)?,
            None => BoundaryGeometry::default(),
        };

        let quantity = if response.quantity.is_empty() {
            response.dataset
        } else {
            response.quantity
        };
        let mut dataset = Self::new(
            quantity,
            response.urls,
            response.stats,
            response.legends,
            geometry,
        )?;
        dataset.requested_regions = response.selected_regions;

        Ok(dataset)
    }

    /// Name of the measured quantity, used in marker labels.
    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    /// URL table.
    pub fn urls(&self) -> &UrlTable {
        &self.urls
    }

    /// Tile URL for a key.
    pub fn url(&self, key: &OverlayKey) -> Option<&str> {
        self.urls.get(key).map(String::as_str)
    }

    /// Statistic for a key, `None` when absent or null.
    pub fn stat(&self, key: &OverlayKey) -> Option<f64> {
        self.stats.get(key).copied().flatten()
    }

    /// Legend table.
    pub fn legend(&self) -> &LegendTable {
        &self.legend
    }

    /// Legend rows in class order.
    pub fn legend_entries(&self) -> Vec<LegendEntry> {
        self.legend
            .iter()
            .map(|(class, color)| LegendEntry {
                class: class.clone(),
                color: color.clone(),
                label: legend_label(class),
            })
            .collect()
    }

    /// Boundary geometry.
    pub fn geometry(&self) -> &BoundaryGeometry {
        &self.geometry
    }

    /// Regions that have at least one URL.
    pub fn regions(&self) -> &BTreeSet<RegionKey> {
        &self.regions
    }

    /// Sorted, de-duplicated periods present in the URL table.
    pub fn periods(&self) -> &[TimeKey] {
        &self.periods
    }

    /// Region selected right after loading: the first requested region that
    /// has data, otherwise the smallest region.
    pub fn default_region(&self) -> Option<&RegionKey> {
        self.requested_regions
            .iter()
            .find(|region| self.regions.contains(*region))
            .or_else(|| self.regions.iter().next())
    }
}
