//! Region boundaries used to place statistic markers and to fit the map view.

use ahash::AHashMap;
use geo::BoundingRect;
use geo_types::{coord, Point, Rect};
use geojson::{Feature, FeatureCollection};
use thiserror::Error;

use crate::keys::RegionKey;

/// Feature property holding the region name.
pub const SHAPE_NAME_PROPERTY: &str = "shapeName";

/// Error from boundary geometry processing.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Two features share the same `shapeName`, so joining by name is ambiguous.
    #[error("boundary name {0:?} appears more than once")]
    DuplicateRegion(String),

    /// Feature geometry could not be converted.
    #[error("invalid geometry for {region}: {reason}")]
    InvalidGeometry {
        /// Region the feature belongs to.
        region: String,
        /// Conversion error.
        reason: String,
    },
}

/// Returns the `shapeName` of a feature.
pub fn shape_name(feature: &Feature) -> Option<&str> {
    feature
        .property(SHAPE_NAME_PROPERTY)
        .and_then(|value| value.as_str())
}

/// Bounding box of one named region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBoundary {
    name: RegionKey,
    bounds: Rect<f64>,
}

impl RegionBoundary {
    /// Region name.
    pub fn name(&self) -> &RegionKey {
        &self.name
    }

    /// Bounding box in longitude/latitude.
    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// Centre of the bounding box, used as the marker anchor.
    pub fn center(&self) -> Point<f64> {
        self.bounds.center().into()
    }
}

/// Region boundaries joined by exact, case-sensitive name.
#[derive(Debug, Clone, Default)]
pub struct BoundaryGeometry {
    regions: Vec<RegionBoundary>,
    index: AHashMap<RegionKey, usize>,
}

impl BoundaryGeometry {
    /// Builds the lookup from a GeoJSON feature collection.
    ///
    /// Features without a name or without geometry are skipped. Duplicate
    /// names are rejected.
    pub fn from_feature_collection(collection: &FeatureCollection) -> Result<Self, GeometryError> {
        let mut geometry = Self::default();
        for feature in &collection.features {
            let Some(name) = shape_name(feature) else {
                log::warn!("Skipping boundary feature without {SHAPE_NAME_PROPERTY}");
                continue;
            };
            let Some(value) = feature.geometry.as_ref().map(|g| g.value.clone()) else {
                log::warn!("Skipping boundary feature {name:?} without geometry");
                continue;
            };

            let region = RegionKey::new(name);
            if geometry.index.contains_key(&region) {
                return Err(GeometryError::DuplicateRegion(region.to_string()));
            }

            let shape = geo_types::Geometry::<f64>::try_from(value).map_err(|err| {
                GeometryError::InvalidGeometry {
                    region: region.to_string(),
                    reason: err.to_string(),
                }
            })?;
            let Some(bounds) = shape.bounding_rect() else {
                log::warn!("Skipping boundary feature {name:?} with empty geometry");
                continue;
            };

            geometry.index.insert(region.clone(), geometry.regions.len());
            geometry.regions.push(RegionBoundary {
                name: region,
                bounds,
            });
        }

        Ok(geometry)
    }

    /// Boundary of the region with exactly this name.
    pub fn get(&self, region: &str) -> Option<&RegionBoundary> {
        self.index.get(region).map(|&i| &self.regions[i])
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether there are no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions in source order.
    pub fn iter(&self) -> impl Iterator<Item = &RegionBoundary> {
        self.regions.iter()
    }

    /// Union of the bounding boxes of the given regions. Unknown regions are ignored.
    pub fn bounds_of<'a>(&self, regions: impl IntoIterator<Item = &'a RegionKey>) -> Option<Rect<f64>> {
        regions
            .into_iter()
            .filter_map(|region| self.get(region.as_str()))
            .map(RegionBoundary::bounds)
            .reduce(union)
    }
}

fn union(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn collection(json: &str) -> FeatureCollection {
        json.parse::<geojson::GeoJson>()
            .unwrap()
            .try_into()
            .unwrap()
    }

    const TWO_SQUARES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"shapeName": "Pune"},
             "geometry": {"type": "Polygon", "coordinates": [[[73.0, 18.0], [75.0, 18.0], [75.0, 19.0], [73.0, 19.0], [73.0, 18.0]]]}},
            {"type": "Feature", "properties": {"shapeName": "Satara"},
             "geometry": {"type": "Polygon", "coordinates": [[[73.5, 17.0], [74.5, 17.0], [74.5, 18.5], [73.5, 18.5], [73.5, 17.0]]]}},
            {"type": "Feature", "properties": {"name": "unnamed"},
             "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}
        ]
    }"#;

    #[test]
    fn center_is_bounding_box_center() {
        let geometry = BoundaryGeometry::from_feature_collection(&collection(TWO_SQUARES)).unwrap();
        assert_eq!(geometry.len(), 2);

        let center = geometry.get("Pune").unwrap().center();
        assert_relative_eq!(center.x(), 74.0);
        assert_relative_eq!(center.y(), 18.5);
    }

    #[test]
    fn name_join_is_case_sensitive() {
        let geometry = BoundaryGeometry::from_feature_collection(&collection(TWO_SQUARES)).unwrap();
        assert!(geometry.get("pune").is_none());
        assert!(geometry.get("Pune").is_some());
    }

    #[test]
    fn union_of_bounds() {
        let geometry = BoundaryGeometry::from_feature_collection(&collection(TWO_SQUARES)).unwrap();
        let regions = [RegionKey::new("Pune"), RegionKey::new("Satara"), RegionKey::new("Nowhere")];
        let bounds = geometry.bounds_of(&regions).unwrap();
        assert_relative_eq!(bounds.min().x, 73.0);
        assert_relative_eq!(bounds.min().y, 17.0);
        assert_relative_eq!(bounds.max().x, 75.0);
        assert_relative_eq!(bounds.max().y, 19.0);

        assert!(geometry.bounds_of(&[RegionKey::new("Nowhere")]).is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"shapeName": "Pune"},
                 "geometry": {"type": "Point", "coordinates": [73.8, 18.5]}},
                {"type": "Feature", "properties": {"shapeName": "Pune"},
                 "geometry": {"type": "Point", "coordinates": [74.0, 18.0]}}
            ]
        }"#;
        let err = BoundaryGeometry::from_feature_collection(&collection(json)).unwrap_err();
        assert!(matches!(err, GeometryError::DuplicateRegion(name) if name == "Pune"));
    }
}
