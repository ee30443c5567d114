//! Render surface that prints to the log instead of drawing.

use std::collections::BTreeMap;

use airmap::surface::{LayerId, MarkerId, MarkerSpec, TileLayerSpec};
use airmap::RenderSurface;
use geo_types::Rect;

/// Keeps the current layers and markers and logs every change.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    next_id: u64,
    layers: BTreeMap<LayerId, TileLayerSpec>,
    markers: BTreeMap<MarkerId, MarkerSpec>,
    view: Option<Rect<f64>>,
}

impl ConsoleSurface {
    /// Layers currently shown.
    pub fn layers(&self) -> impl Iterator<Item = &TileLayerSpec> {
        self.layers.values()
    }

    /// Marker labels on one line each, in creation order.
    pub fn marker_lines(&self) -> Vec<String> {
        self.markers
            .values()
            .map(|marker| marker.label.replace('\n', " | "))
            .collect()
    }

    /// Last fitted view.
    pub fn view(&self) -> Option<Rect<f64>> {
        self.view
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderSurface for ConsoleSurface {
    fn add_layer(&mut self, layer: &TileLayerSpec) -> LayerId {
        let id = LayerId(self.allocate());
        log::info!("+ {id} {} (opacity {})", layer.url, layer.opacity);
        self.layers.insert(id, layer.clone());
        id
    }

    fn remove_layer(&mut self, id: LayerId) {
        if let Some(layer) = self.layers.remove(&id) {
            log::info!("- {id} {}", layer.url);
        }
    }

    fn add_marker(&mut self, marker: &MarkerSpec) -> MarkerId {
        let id = MarkerId(self.allocate());
        log::info!(
            "+ {id} at ({:.4}, {:.4}): {}",
            marker.position.x(),
            marker.position.y(),
            marker.label.replace('\n', " | ")
        );
        self.markers.insert(id, marker.clone());
        id
    }

    fn update_marker(&mut self, id: MarkerId, marker: &MarkerSpec) {
        match self.markers.get_mut(&id) {
            Some(existing) => {
                log::info!("~ {id}: {}", marker.label.replace('\n', " | "));
                *existing = marker.clone();
            }
            None => log::warn!("Update of unknown {id}"),
        }
    }

    fn remove_marker(&mut self, id: MarkerId) {
        if self.markers.remove(&id).is_some() {
            log::info!("- {id}");
        }
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>) {
        log::info!(
            "View fitted to ({:.2}, {:.2}) - ({:.2}, {:.2})",
            bounds.min().x,
            bounds.min().y,
            bounds.max().x,
            bounds.max().y
        );
        self.view = Some(bounds);
    }
}
