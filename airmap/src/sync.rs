//! Reconciliation of tile layers and statistic markers with the desired selection.
//!
//! The synchronizer remembers which layer and marker it put on the surface for
//! every region. On each [`OverlaySynchronizer::reconcile`] call it removes
//! what belongs to regions that are no longer selected, then brings every
//! selected region to the state described by the current period:
//!
//! - a layer is replaced (removed, then added) when its URL changes and left
//!   alone otherwise;
//! - a marker is moved and relabelled in place;
//! - a missing URL is a lookup miss: it is logged and the region simply shows
//!   no layer until a period with data comes up.
//!
//! Calling `reconcile` again with the same frame makes no surface calls.

use std::collections::{BTreeMap, BTreeSet};

use crate::dataset::{format_stat, OverlayDataset};
use crate::keys::{OverlayKey, RegionKey, TimeKey};
use crate::surface::{LayerId, MarkerId, MarkerSpec, RenderSurface, TileLayerSpec};

/// Desired state of the surface.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Regions that should be shown.
    pub regions: &'a BTreeSet<RegionKey>,
    /// Period to show.
    pub time: &'a TimeKey,
    /// Source of URLs, statistics and geometry.
    pub dataset: &'a OverlayDataset,
}

/// What a reconcile call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Number of layers added.
    pub layers_added: usize,
    /// Number of layers removed.
    pub layers_removed: usize,
    /// Number of markers added.
    pub markers_added: usize,
    /// Number of markers moved or relabelled.
    pub markers_updated: usize,
    /// Number of markers removed.
    pub markers_removed: usize,
    /// Keys of selected regions that have no tile for the period.
    pub missing: Vec<OverlayKey>,
    /// Selected regions without boundary geometry, hence without a marker.
    pub unplaced: Vec<RegionKey>,
}

impl ReconcileReport {
    /// Whether no surface call was made.
    pub fn is_noop(&self) -> bool {
        self.layers_added == 0
            && self.layers_removed == 0
            && self.markers_added == 0
            && self.markers_updated == 0
            && self.markers_removed == 0
    }
}

/// Label of a statistic marker: region on the first line, value on the second.
pub fn marker_label(region: &RegionKey, quantity: &str, value: Option<f64>) -> String {
    format!("{region}\n{quantity}: {}", format_stat(value))
}

#[derive(Debug)]
struct ActiveLayer {
    id: LayerId,
    url: String,
}

#[derive(Debug)]
struct ActiveMarker {
    id: MarkerId,
    spec: MarkerSpec,
}

/// Owner of the per-region layers and markers on a surface.
#[derive(Debug, Default)]
pub struct OverlaySynchronizer {
    layers: BTreeMap<RegionKey, ActiveLayer>,
    markers: BTreeMap<RegionKey, ActiveMarker>,
}

impl OverlaySynchronizer {
    /// Synchronizer that has not drawn anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the surface in line with the frame.
    pub fn reconcile<S>(&mut self, surface: &mut S, frame: Frame<'_>) -> ReconcileReport
    where
        S: RenderSurface + ?Sized,
    {
        let mut report = ReconcileReport::default();
        self.remove_deselected(surface, frame.regions, &mut report);

        for region in frame.regions {
            let key = OverlayKey::new(region, frame.time);
            self.sync_layer(surface, region, &key, frame.dataset, &mut report);
            self.sync_marker(surface, region, &key, frame.dataset, &mut report);
        }

        if !report.is_noop() {
            log::debug!("Reconciled {} at {}: {report:?}", frame.regions.len(), frame.time);
        }

        report
    }

    /// Removes every layer and marker this synchronizer owns.
    pub fn clear<S>(&mut self, surface: &mut S) -> ReconcileReport
    where
        S: RenderSurface + ?Sized,
    {
        let mut report = ReconcileReport::default();
        self.remove_deselected(surface, &BTreeSet::new(), &mut report);
        report
    }

    /// Fits the view to the boundaries of the given regions. Returns `false`
    /// when none of them has geometry.
    pub fn fit_to_regions<S>(
        &self,
        surface: &mut S,
        regions: &BTreeSet<RegionKey>,
        dataset: &OverlayDataset,
    ) -> bool
    where
        S: RenderSurface + ?Sized,
    {
        match dataset.geometry().bounds_of(regions) {
            Some(bounds) => {
                surface.fit_bounds(bounds);
                true
            }
            None => false,
        }
    }

    /// URL of the layer currently shown for a region.
    pub fn layer_url(&self, region: &str) -> Option<&str> {
        self.layers.get(region).map(|layer| layer.url.as_str())
    }

    /// Label of the marker currently shown for a region.
    pub fn marker_label(&self, region: &str) -> Option<&str> {
        self.markers.get(region).map(|marker| marker.spec.label.as_str())
    }

    /// Number of layers currently owned.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Number of markers currently owned.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    fn remove_deselected<S>(
        &mut self,
        surface: &mut S,
        desired: &BTreeSet<RegionKey>,
        report: &mut ReconcileReport,
    ) where
        S: RenderSurface + ?Sized,
    {
        self.layers.retain(|region, layer| {
            if desired.contains(region) {
                return true;
            }
            log::trace!("Removing {} of deselected {region}", layer.id);
            surface.remove_layer(layer.id);
            report.layers_removed += 1;
            false
        });

        self.markers.retain(|region, marker| {
            if desired.contains(region) {
                return true;
            }
            log::trace!("Removing {} of deselected {region}", marker.id);
            surface.remove_marker(marker.id);
            report.markers_removed += 1;
            false
        });
    }

    fn sync_layer<S>(
        &mut self,
        surface: &mut S,
        region: &RegionKey,
        key: &OverlayKey,
        dataset: &OverlayDataset,
        report: &mut ReconcileReport,
    ) where
        S: RenderSurface + ?Sized,
    {
        let Some(url) = dataset.url(key) else {
            log::warn!("No tile for {key}");
            report.missing.push(key.clone());
            if let Some(stale) = self.layers.remove(region) {
                surface.remove_layer(stale.id);
                report.layers_removed += 1;
            }
            return;
        };

        if self.layer_url(region.as_str()) == Some(url) {
            return;
        }

        if let Some(previous) = self.layers.remove(region) {
            surface.remove_layer(previous.id);
            report.layers_removed += 1;
        }

        let id = surface.add_layer(&TileLayerSpec::overlay(url));
        log::trace!("Added {id} for {key}");
        report.layers_added += 1;
        self.layers.insert(
            region.clone(),
            ActiveLayer {
                id,
                url: url.to_string(),
            },
        );
    }

    fn sync_marker<S>(
        &mut self,
        surface: &mut S,
        region: &RegionKey,
        key: &OverlayKey,
        dataset: &OverlayDataset,
        report: &mut ReconcileReport,
    ) where
        S: RenderSurface + ?Sized,
    {
        let Some(boundary) = dataset.geometry().get(region.as_str()) else {
            report.unplaced.push(region.clone());
            if let Some(stale) = self.markers.remove(region) {
                surface.remove_marker(stale.id);
                report.markers_removed += 1;
            }
            return;
        };

        let spec = MarkerSpec {
            position: boundary.center(),
            label: marker_label(region, dataset.quantity(), dataset.stat(key)),
            permanent_label: true,
        };

        match self.markers.get_mut(region) {
            Some(marker) if marker.spec == spec => {}
            Some(marker) => {
                surface.update_marker(marker.id, &spec);
                marker.spec = spec;
                report.markers_updated += 1;
            }
            None => {
                let id = surface.add_marker(&spec);
                report.markers_added += 1;
                self.markers.insert(region.clone(), ActiveMarker { id, spec });
            }
        }
    }
}
