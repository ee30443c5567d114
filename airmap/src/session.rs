//! The map session: one object holding everything a viewer shows.

use std::collections::BTreeSet;

use tokio::sync::mpsc;

use crate::animation::{next_index, AnimationConfig, AnimationDriver, PlaybackState};
use crate::dataset::{LegendEntry, OverlayDataset};
use crate::provider::LookupProvider;
use crate::request::MapRequest;
use crate::surface::RenderSurface;
use crate::sync::{Frame, OverlaySynchronizer, ReconcileReport};
use crate::{AirmapError, RegionKey, TimeKey};

/// Event processed by [`MapSession::handle_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Playback timer fired.
    Tick {
        /// Generation of the ticker that sent the tick.
        generation: u64,
    },
}

/// Selected regions and the index of the displayed period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    regions: BTreeSet<RegionKey>,
    time_index: usize,
}

impl Selection {
    /// Selected regions.
    pub fn regions(&self) -> &BTreeSet<RegionKey> {
        &self.regions
    }

    /// Index into the period list of the loaded dataset.
    pub fn time_index(&self) -> usize {
        self.time_index
    }
}

/// Owns the loaded dataset, the selection and everything drawn on `S`.
///
/// All changes go through `&mut self`, so a reconcile always runs to
/// completion before the next change starts. Timer ticks arrive through
/// [`MapSession::next_event`] and are applied with
/// [`MapSession::handle_event`].
pub struct MapSession<S: RenderSurface> {
    surface: S,
    dataset: Option<OverlayDataset>,
    selection: Selection,
    synchronizer: OverlaySynchronizer,
    driver: AnimationDriver,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl<S: RenderSurface> MapSession<S> {
    /// Creates an empty session drawing on `surface`.
    pub fn new(surface: S, config: AnimationConfig) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        Self {
            surface,
            dataset: None,
            selection: Selection::default(),
            synchronizer: OverlaySynchronizer::new(),
            driver: AnimationDriver::new(config, sender),
            events,
        }
    }

    /// Validates the request, asks the provider and replaces the loaded data.
    ///
    /// Nothing changes unless every step succeeds. On success the selection
    /// is reset to the default region and the first period, the view is
    /// fitted to it, and playback restarts if it was running.
    pub async fn submit<P>(
        &mut self,
        provider: &P,
        request: &MapRequest,
    ) -> Result<ReconcileReport, AirmapError>
    where
        P: LookupProvider + ?Sized,
    {
        let validated = request.validate()?;
        let response = provider.lookup(&validated).await?;
        let dataset = OverlayDataset::from_response(response)?;
        if dataset.periods().is_empty() {
            return Err(AirmapError::NotFound(
                "No map data found for the selected criteria".to_string(),
            ));
        }

        let mut regions = BTreeSet::new();
        if let Some(region) = dataset.default_region() {
            regions.insert(region.clone());
        }
        log::info!(
            "Loaded {} with {} regions and {} periods",
            dataset.quantity(),
            dataset.regions().len(),
            dataset.periods().len()
        );

        self.selection = Selection {
            regions,
            time_index: 0,
        };
        let dataset: &OverlayDataset = self.dataset.insert(dataset);

        let report = self.synchronizer.reconcile(
            &mut self.surface,
            Frame {
                regions: &self.selection.regions,
                time: &dataset.periods()[0],
                dataset,
            },
        );
        self.synchronizer
            .fit_to_regions(&mut self.surface, &self.selection.regions, dataset);

        if self.driver.is_playing() {
            self.driver.restart(dataset.periods().len());
        }

        Ok(report)
    }

    /// Replaces the selected regions.
    ///
    /// Fails if a region has no data in the loaded dataset.
    pub fn select_regions<I>(&mut self, regions: I) -> Result<ReconcileReport, AirmapError>
    where
        I: IntoIterator<Item = RegionKey>,
    {
        let dataset = self.dataset.as_ref().ok_or(AirmapError::NoDataset)?;
        let regions: BTreeSet<RegionKey> = regions.into_iter().collect();
        if let Some(unknown) = regions.iter().find(|r| !dataset.regions().contains(*r)) {
            return Err(AirmapError::NotFound(format!(
                "No data available for region: {unknown}"
            )));
        }

        self.selection.regions = regions;
        Ok(self.reconcile())
    }

    /// Fits the view to the selected regions. Returns `false` if none of
    /// them has a boundary.
    pub fn fit_to_selection(&mut self) -> bool {
        let Some(dataset) = &self.dataset else {
            return false;
        };
        self.synchronizer
            .fit_to_regions(&mut self.surface, &self.selection.regions, dataset)
    }

    /// Shows the period at `index`.
    pub fn set_time_index(&mut self, index: usize) -> Result<ReconcileReport, AirmapError> {
        let dataset = self.dataset.as_ref().ok_or(AirmapError::NoDataset)?;
        let len = dataset.periods().len();
        if index >= len {
            return Err(AirmapError::TimeIndexOutOfRange { index, len });
        }

        self.selection.time_index = index;
        Ok(self.reconcile())
    }

    /// Starts or stops playback. Without loaded data playback stays stopped.
    pub fn toggle_playback(&mut self) -> PlaybackState {
        let state = self.driver.toggle(self.period_count());
        log::info!("Playback {state:?}");
        state
    }

    /// Waits for the next event.
    ///
    /// Returns `None` only if the event channel is closed, which cannot
    /// happen while the session is alive.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Applies an event. Returns `None` if the event was ignored.
    pub fn handle_event(&mut self, event: SessionEvent) -> Option<ReconcileReport> {
        match event {
            SessionEvent::Tick { generation } => {
                if !self.driver.accepts(generation) {
                    log::trace!("Ignoring tick of stale ticker {generation}");
                    return None;
                }

                let len = self.period_count();
                if len == 0 {
                    return None;
                }
                self.selection.time_index = next_index(self.selection.time_index, len);
                let report = self.reconcile();
                if let Some(time) = self.current_time_key() {
                    log::debug!("Advanced to {time}");
                }
                Some(report)
            }
        }
    }

    /// Period currently displayed.
    pub fn current_time_key(&self) -> Option<&TimeKey> {
        self.dataset
            .as_ref()
            .and_then(|dataset| dataset.periods().get(self.selection.time_index))
    }

    /// Legend rows of the loaded dataset.
    pub fn legend_entries(&self) -> Vec<LegendEntry> {
        self.dataset
            .as_ref()
            .map(OverlayDataset::legend_entries)
            .unwrap_or_default()
    }

    /// Loaded dataset.
    pub fn dataset(&self) -> Option<&OverlayDataset> {
        self.dataset.as_ref()
    }

    /// Current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Playback state.
    pub fn playback_state(&self) -> PlaybackState {
        self.driver.state()
    }

    /// Layer and marker bookkeeping.
    pub fn synchronizer(&self) -> &OverlaySynchronizer {
        &self.synchronizer
    }

    /// Surface the session draws on.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, e.g. to clear a test log.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn period_count(&self) -> usize {
        self.dataset
            .as_ref()
            .map_or(0, |dataset| dataset.periods().len())
    }

    fn reconcile(&mut self) -> ReconcileReport {
        let Some(dataset) = &self.dataset else {
            return ReconcileReport::default();
        };
        let Some(time) = dataset.periods().get(self.selection.time_index) else {
            return ReconcileReport::default();
        };

        self.synchronizer.reconcile(
            &mut self.surface,
            Frame {
                regions: &self.selection.regions,
                time,
                dataset,
            },
        )
    }
}
