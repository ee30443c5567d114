//! Static lookup table of pre-generated tile overlays.
//!
//! A catalog is a JSON document:
//!
//! ```json
//! {
//!   "datasets": {
//!     "Ozone": {
//!       "quantity": "O3",
//!       "legend": {"low": "blue", "high": "red"},
//!       "url_template": "https://tiles.example/{dataset}/{region}/{period}/{z}/{x}/{y}.png",
//!       "series": {"Pune": {"2020-01": 0.1312, "2020-02": null}}
//!     }
//!   },
//!   "boundaries": {"type": "FeatureCollection", "features": []}
//! }
//! ```
//!
//! Every period listed for a region has a tile; the number next to it is the
//! region mean, or `null` when it is unknown.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use ahash::AHashMap;
use async_trait::async_trait;
use geojson::FeatureCollection;
use serde::Deserialize;

use crate::dataset::{LegendTable, StatsTable, UrlTable};
use crate::geometry::{shape_name, BoundaryGeometry};
use crate::keys::{OverlayKey, RegionKey, TimeKey};
use crate::provider::{LookupProvider, MapResponse};
use crate::request::ValidatedRequest;
use crate::AirmapError;

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// Placeholders left in the URL for the tile renderer to fill.
const RENDERER_PLACEHOLDERS: [&str; 4] = ["s", "z", "x", "y"];

#[derive(Debug, Deserialize)]
struct CatalogFile {
    datasets: BTreeMap<String, DatasetEntry>,
    #[serde(default)]
    boundaries: Option<FeatureCollection>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatasetEntry {
    #[serde(skip)]
    name: String,
    quantity: String,
    legend: LegendTable,
    url_template: String,
    series: BTreeMap<RegionKey, BTreeMap<TimeKey, Option<f64>>>,
}

/// In-process lookup provider backed by a static table.
#[derive(Debug, Clone)]
pub struct Catalog {
    datasets: AHashMap<String, DatasetEntry>,
    boundaries: FeatureCollection,
}

impl Catalog {
    /// Sample catalog shipped with the crate.
    pub fn builtin() -> Result<Self, AirmapError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Reads a catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AirmapError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|err| AirmapError::Catalog(format!("{}: {err}", path.display())))?;
        Self::from_json(&json)
    }

    /// Parses and checks a catalog document.
    ///
    /// Fails on duplicate boundary names and on URL templates with unknown placeholders.
    pub fn from_json(json: &str) -> Result<Self, AirmapError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|err| AirmapError::Catalog(err.to_string()))?;

        let boundaries = file.boundaries.unwrap_or(FeatureCollection {
            bbox: None,
            features: vec![],
            foreign_members: None,
        });
        BoundaryGeometry::from_feature_collection(&boundaries)?;

        let mut datasets = AHashMap::new();
        for (name, mut entry) in file.datasets {
            entry.name = name;
            let probe = RegionKey::new("probe");
            let period = TimeKey::parse("2000")?;
            tile_url(&entry, &probe, &period)
                .map_err(|err| AirmapError::Catalog(format!("dataset {}: {err}", entry.name)))?;

            log::debug!(
                "Catalog dataset {} with {} regions",
                entry.name,
                entry.series.len()
            );
            datasets.insert(entry.name.to_lowercase(), entry);
        }

        Ok(Self {
            datasets,
            boundaries,
        })
    }

    /// Names of the available datasets, sorted.
    pub fn dataset_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.datasets.values().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Answers a request from the table.
    ///
    /// Dataset names match case-insensitively, region names exactly. Regions
    /// without data are skipped. A period is returned when its year is selected.
    pub fn query(&self, request: &ValidatedRequest) -> Result<MapResponse, AirmapError> {
        let entry = self
            .datasets
            .get(&request.dataset().to_lowercase())
            .ok_or_else(|| {
                AirmapError::NotFound(format!(
                    "No data available for dataset: {}",
                    request.dataset()
                ))
            })?;

        let known: Vec<&RegionKey> = request
            .regions()
            .iter()
            .filter(|region| {
                let known = entry.series.contains_key(*region);
                if !known {
                    log::warn!("No {} data for region {region}", entry.name);
                }
                known
            })
            .collect();
        if known.is_empty() {
            let names: Vec<&str> = request.regions().iter().map(RegionKey::as_str).collect();
            return Err(AirmapError::NotFound(format!(
                "No data available for region: {}",
                names.join(", ")
            )));
        }

        let mut urls = UrlTable::new();
        let mut stats = StatsTable::new();
        let mut selected_regions = Vec::new();
        for region in known {
            let mut found = false;
            for (period, value) in &entry.series[region] {
                if !request.years().contains(&period.year()) {
                    continue;
                }

                let key = OverlayKey::new(region, period);
                urls.insert(key.clone(), tile_url(entry, region, period)?);
                stats.insert(key, *value);
                found = true;
            }

            if found {
                selected_regions.push(region.clone());
            }
        }

        let legends: LegendTable = request
            .classes()
            .iter()
            .filter_map(|class| entry.legend.get_key_value(class))
            .map(|(class, color)| (class.clone(), color.clone()))
            .collect();

        if urls.is_empty() || legends.is_empty() {
            return Err(AirmapError::NotFound(
                "No map data found for the selected criteria".to_string(),
            ));
        }

        let features = selected_regions
            .iter()
            .filter_map(|region| {
                let feature = self
                    .boundaries
                    .features
                    .iter()
                    .find(|f| shape_name(f) == Some(region.as_str()));
                if feature.is_none() {
                    log::warn!("Region not found in boundaries: {region}");
                }
                feature.cloned()
            })
            .collect();

        log::info!(
            "Lookup {} for {} regions: {} tiles",
            entry.name,
            selected_regions.len(),
            urls.len()
        );

        Ok(MapResponse {
            success: true,
            dataset: entry.name.clone(),
            quantity: entry.quantity.clone(),
            urls,
            legends,
            stats,
            geojson_data: Some(FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            }),
            selected_regions,
        })
    }
}

#[async_trait]
impl LookupProvider for Catalog {
    async fn lookup(&self, request: &ValidatedRequest) -> Result<MapResponse, AirmapError> {
        self.query(request)
    }
}

fn tile_url(entry: &DatasetEntry, region: &RegionKey, period: &TimeKey) -> Result<String, AirmapError> {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("dataset".into(), entry.name.to_lowercase());
    vars.insert("region".into(), region.slug());
    vars.insert("period".into(), period.to_string());
    for placeholder in RENDERER_PLACEHOLDERS {
        vars.insert(placeholder.into(), format!("{{{placeholder}}}"));
    }

    strfmt::strfmt(&entry.url_template, &vars).map_err(|err| {
        AirmapError::Internal(format!("tile url template {:?}: {err}", entry.url_template))
    })
}
