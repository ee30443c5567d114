//! Render surface that records every call, for tests.

use std::collections::BTreeMap;

use geo_types::Rect;

use super::{LayerId, MarkerId, MarkerSpec, RenderSurface, TileLayerSpec};

/// One call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    /// `add_layer`
    AddLayer(LayerId, String),
    /// `remove_layer`
    RemoveLayer(LayerId),
    /// `add_marker`
    AddMarker(MarkerId, String),
    /// `update_marker`
    UpdateMarker(MarkerId, String),
    /// `remove_marker`
    RemoveMarker(MarkerId),
    /// `fit_bounds`
    FitBounds(Rect<f64>),
}

/// Keeps the current layers and markers and a log of all calls.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: u64,
    layers: BTreeMap<LayerId, TileLayerSpec>,
    markers: BTreeMap<MarkerId, MarkerSpec>,
    bounds: Option<Rect<f64>>,
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    /// Empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers currently on the surface.
    pub fn layers(&self) -> &BTreeMap<LayerId, TileLayerSpec> {
        &self.layers
    }

    /// URLs of the layers currently on the surface, in id order.
    pub fn layer_urls(&self) -> Vec<&str> {
        self.layers.values().map(|l| l.url.as_str()).collect()
    }

    /// Markers currently on the surface.
    pub fn markers(&self) -> &BTreeMap<MarkerId, MarkerSpec> {
        &self.markers
    }

    /// Labels of the markers currently on the surface, in id order.
    pub fn marker_labels(&self) -> Vec<&str> {
        self.markers.values().map(|m| m.label.as_str()).collect()
    }

    /// Last bounds passed to `fit_bounds`.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds
    }

    /// All calls so far.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Returns and forgets the calls made so far.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderSurface for RecordingSurface {
    fn add_layer(&mut self, layer: &TileLayerSpec) -> LayerId {
        let id = LayerId(self.next_id());
        self.layers.insert(id, layer.clone());
        self.ops.push(SurfaceOp::AddLayer(id, layer.url.clone()));
        id
    }

    fn remove_layer(&mut self, id: LayerId) {
        self.layers.remove(&id);
        self.ops.push(SurfaceOp::RemoveLayer(id));
    }

    fn add_marker(&mut self, marker: &MarkerSpec) -> MarkerId {
        let id = MarkerId(self.next_id());
        self.markers.insert(id, marker.clone());
        self.ops.push(SurfaceOp::AddMarker(id, marker.label.clone()));
        id
    }

    fn update_marker(&mut self, id: MarkerId, marker: &MarkerSpec) {
        if let Some(existing) = self.markers.get_mut(&id) {
            *existing = marker.clone();
        }
        self.ops.push(SurfaceOp::UpdateMarker(id, marker.label.clone()));
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
        self.ops.push(SurfaceOp::RemoveMarker(id));
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>) {
        self.bounds = Some(bounds);
        self.ops.push(SurfaceOp::FitBounds(bounds));
    }
}
