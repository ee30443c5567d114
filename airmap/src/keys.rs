//! String keys addressing regions, time periods and their combination.

use std::borrow::Borrow;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::AirmapError;

/// Separator between the region and the period in an [`OverlayKey`].
pub const OVERLAY_KEY_SEPARATOR: &str = " - ";

/// Region display name, matched exactly against the `shapeName` of boundary features.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RegionKey(String);

impl RegionKey {
    /// Creates a region key. Surrounding whitespace is removed, case is kept.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    /// Region name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form with every non alphanumeric run replaced by a single `-`.
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.0.len());
        for c in self.0.chars() {
            if c.is_alphanumeric() {
                slug.extend(c.to_lowercase());
            } else if !slug.ends_with('-') {
                slug.push('-');
            }
        }

        slug.trim_matches('-').to_string()
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RegionKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RegionKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<RegionKey> for String {
    fn from(value: RegionKey) -> Self {
        value.0
    }
}

fn time_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]{4}(-(0[1-9]|1[0-2]))?$").expect("time key pattern is valid")
    })
}

/// One discrete time period: a bare year (`2020`) or a month (`2020-01`).
///
/// Both forms sort lexicographically in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeKey(String);

impl TimeKey {
    /// Parses a period, rejecting anything that is not `YYYY` or `YYYY-MM`.
    pub fn parse(value: impl AsRef<str>) -> Result<Self, AirmapError> {
        let value = value.as_ref().trim();
        if time_key_pattern().is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(AirmapError::InvalidKey(format!("not a time period: {value:?}")))
        }
    }

    /// Period string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Year of the period.
    pub fn year(&self) -> i32 {
        // The pattern guarantees four leading digits.
        self.0[..4].parse().unwrap_or_default()
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TimeKey {
    type Error = AirmapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TimeKey> for String {
    fn from(value: TimeKey) -> Self {
        value.0
    }
}

/// `"<region> - <period>"`, addressing one tile URL and one statistic value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayKey(String);

impl OverlayKey {
    /// Joins a region and a period.
    pub fn new(region: &RegionKey, time: &TimeKey) -> Self {
        Self(format!("{region}{OVERLAY_KEY_SEPARATOR}{time}"))
    }

    /// Key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the key back into region and period.
    ///
    /// Region names may themselves contain the separator, so the split happens
    /// at the last occurrence.
    pub fn split(&self) -> Result<(RegionKey, TimeKey), AirmapError> {
        let (region, time) = self
            .0
            .rsplit_once(OVERLAY_KEY_SEPARATOR)
            .ok_or_else(|| AirmapError::InvalidKey(self.0.clone()))?;
        if region.trim().is_empty() {
            return Err(AirmapError::InvalidKey(self.0.clone()));
        }

        Ok((RegionKey::new(region), TimeKey::parse(time)?))
    }
}

impl fmt::Display for OverlayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OverlayKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
