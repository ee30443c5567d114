//! Map request contract and its validation.
//!
//! This is the only request shape accepted by the server and sent by
//! [`HttpLookupProvider`](crate::HttpLookupProvider):
//!
//! ```json
//! {
//!   "dataset": "Ozone",
//!   "selected_regions": ["Pune", "Ahmadnagar"],
//!   "selected_years": [2020, 2021],
//!   "selected_classes": ["low", "high"]
//! }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys::RegionKey;

/// Input rejected before any lookup is made. The message is meant for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No dataset given.
    #[error("Please select a dataset")]
    MissingDataset,
    /// No region given.
    #[error("Please enter a region name")]
    MissingRegion,
    /// No year selected.
    #[error("Please select at least one year")]
    MissingYears,
    /// A year that cannot be a four digit period.
    #[error("{0} is not a valid year")]
    InvalidYear(i32),
    /// No concentration class selected.
    #[error("Please select at least one concentration class")]
    MissingClasses,
}

/// Raw request as entered by the user or received over the wire.
///
/// Missing fields deserialize as empty so that they fail validation instead of parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapRequest {
    /// Dataset name, e.g. `Ozone` or `NO2`.
    pub dataset: String,
    /// Region names.
    pub selected_regions: Vec<String>,
    /// Years whose periods should be returned.
    pub selected_years: Vec<i32>,
    /// Concentration classes whose legend entries should be returned.
    pub selected_classes: Vec<String>,
}

impl MapRequest {
    /// Builds a request from form input where regions are typed as a comma separated list.
    pub fn from_form(
        dataset: impl Into<String>,
        regions_input: &str,
        years: impl IntoIterator<Item = i32>,
        classes: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            selected_regions: regions_input
                .split(',')
                .map(str::trim)
                .filter(|region| !region.is_empty())
                .map(str::to_string)
                .collect(),
            selected_years: years.into_iter().collect(),
            selected_classes: classes.into_iter().collect(),
        }
    }

    /// Checks the request. Fields are checked in form order and the first
    /// failure is returned.
    pub fn validate(&self) -> Result<ValidatedRequest, ValidationError> {
        let dataset = self.dataset.trim();
        if dataset.is_empty() {
            return Err(ValidationError::MissingDataset);
        }

        let mut regions: Vec<RegionKey> = Vec::new();
        for region in self.selected_regions.iter().map(RegionKey::new) {
            if !region.as_str().is_empty() && !regions.contains(&region) {
                regions.push(region);
            }
        }
        if regions.is_empty() {
            return Err(ValidationError::MissingRegion);
        }

        if self.selected_years.is_empty() {
            return Err(ValidationError::MissingYears);
        }
        if let Some(&year) = self
            .selected_years
            .iter()
            .find(|year| !(1000..=9999).contains(*year))
        {
            return Err(ValidationError::InvalidYear(year));
        }

        let mut classes: Vec<String> = Vec::new();
        for class in self.selected_classes.iter().map(|c| c.trim()) {
            if !class.is_empty() && !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        }
        if classes.is_empty() {
            return Err(ValidationError::MissingClasses);
        }

        Ok(ValidatedRequest {
            dataset: dataset.to_string(),
            regions,
            years: self.selected_years.iter().copied().collect(),
            classes,
        })
    }
}

/// A request that passed [`MapRequest::validate`].
///
/// Regions and classes keep their input order without duplicates; years are sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    dataset: String,
    regions: Vec<RegionKey>,
    years: BTreeSet<i32>,
    classes: Vec<String>,
}

impl ValidatedRequest {
    /// Dataset name.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Selected regions.
    pub fn regions(&self) -> &[RegionKey] {
        &self.regions
    }

    /// Selected years.
    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    /// Selected classes.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Wire form of the normalized request.
    pub fn to_request(&self) -> MapRequest {
        MapRequest {
            dataset: self.dataset.clone(),
            selected_regions: self.regions.iter().map(|r| r.to_string()).collect(),
            selected_years: self.years.iter().copied().collect(),
            selected_classes: self.classes.clone(),
        }
    }
}
