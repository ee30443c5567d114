//! Abstraction over the map widget that actually draws tiles and markers.

use std::fmt;

use geo_types::{Point, Rect};

#[cfg(any(test, feature = "_tests"))]
pub mod recording;

/// Opacity of air-quality overlay layers.
pub const OVERLAY_OPACITY: f32 = 0.7;

/// Handle of a tile layer added to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

/// Handle of a marker added to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker#{}", self.0)
    }
}

/// Raster tile layer description.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayerSpec {
    /// URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub url: String,
    /// Layer opacity in `0.0..=1.0`.
    pub opacity: f32,
}

impl TileLayerSpec {
    /// Overlay layer at the default opacity.
    pub fn overlay(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            opacity: OVERLAY_OPACITY,
        }
    }
}

/// Point marker with a text label.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    /// Anchor in longitude/latitude.
    pub position: Point<f64>,
    /// Label text, lines separated by `\n`.
    pub label: String,
    /// Whether the label stays visible without hovering.
    pub permanent_label: bool,
}

/// Drawing primitives used by the overlay synchronizer.
///
/// Ids are allocated by the surface. Removing an id that is not on the
/// surface must be a no-op.
pub trait RenderSurface {
    /// Adds a tile layer on top of the existing ones.
    fn add_layer(&mut self, layer: &TileLayerSpec) -> LayerId;

    /// Removes a tile layer.
    fn remove_layer(&mut self, id: LayerId);

    /// Adds a marker.
    fn add_marker(&mut self, marker: &MarkerSpec) -> MarkerId;

    /// Moves a marker and replaces its label.
    fn update_marker(&mut self, id: MarkerId, marker: &MarkerSpec);

    /// Removes a marker.
    fn remove_marker(&mut self, id: MarkerId);

    /// Moves the view so that the given longitude/latitude box is visible.
    fn fit_bounds(&mut self, bounds: Rect<f64>);
}

impl<S: RenderSurface + ?Sized> RenderSurface for &mut S {
    fn add_layer(&mut self, layer: &TileLayerSpec) -> LayerId {
        (**self).add_layer(layer)
    }

    fn remove_layer(&mut self, id: LayerId) {
        (**self).remove_layer(id)
    }

    fn add_marker(&mut self, marker: &MarkerSpec) -> MarkerId {
        (**self).add_marker(marker)
    }

    fn update_marker(&mut self, id: MarkerId, marker: &MarkerSpec) {
        (**self).update_marker(id, marker)
    }

    fn remove_marker(&mut self, id: MarkerId) {
        (**self).remove_marker(id)
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>) {
        (**self).fit_bounds(bounds)
    }
}
