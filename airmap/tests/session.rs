use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use airmap::animation::{AnimationConfig, PlaybackState};
use airmap::dataset::{LegendTable, StatsTable, UrlTable};
use airmap::surface::recording::{RecordingSurface, SurfaceOp};
use airmap::{
    AirmapError, Catalog, LookupProvider, MapRequest, MapResponse, MapSession, OverlayKey,
    RegionKey, ValidatedRequest, ValidationError,
};
use approx::assert_abs_diff_eq;
use async_trait::async_trait;
use tokio::time::Instant;

const PERIOD: Duration = Duration::from_millis(5000);

struct CountingProvider {
    catalog: Catalog,
    calls: AtomicUsize,
}

impl CountingProvider {
    fn new() -> Self {
        Self {
            catalog: Catalog::builtin().unwrap(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LookupProvider for CountingProvider {
    async fn lookup(&self, request: &ValidatedRequest) -> Result<MapResponse, AirmapError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.catalog.lookup(request).await
    }
}

struct FailingProvider;

#[async_trait]
impl LookupProvider for FailingProvider {
    async fn lookup(&self, _request: &ValidatedRequest) -> Result<MapResponse, AirmapError> {
        Err(AirmapError::Network("connection refused".into()))
    }
}

struct StaticProvider(MapResponse);

#[async_trait]
impl LookupProvider for StaticProvider {
    async fn lookup(&self, _request: &ValidatedRequest) -> Result<MapResponse, AirmapError> {
        Ok(self.0.clone())
    }
}

fn ozone(regions: &str, years: &[i32]) -> MapRequest {
    MapRequest::from_form(
        "Ozone",
        regions,
        years.iter().copied(),
        ["low".to_string(), "high".to_string()],
    )
}

fn session() -> MapSession<RecordingSurface> {
    let _ = env_logger::builder().is_test(true).try_init();
    MapSession::new(RecordingSurface::new(), AnimationConfig { period: PERIOD })
}

fn current_time(session: &MapSession<RecordingSurface>) -> &str {
    session.current_time_key().unwrap().as_str()
}

#[tokio::test]
async fn validation_failure_does_not_call_provider() {
    let provider = CountingProvider::new();
    let mut session = session();

    let err = session.submit(&provider, &ozone("Pune", &[])).await.unwrap_err();
    assert!(matches!(err, AirmapError::Validation(ValidationError::MissingYears)));
    assert_eq!(err.to_string(), "Please select at least one year");

    let err = session.submit(&provider, &ozone(" , ", &[2020])).await.unwrap_err();
    assert!(matches!(err, AirmapError::Validation(ValidationError::MissingRegion)));

    assert_eq!(provider.calls(), 0);
    assert!(session.surface().ops().is_empty());
    assert!(session.dataset().is_none());
}

#[tokio::test]
async fn submit_shows_first_requested_region() {
    let provider = CountingProvider::new();
    let mut session = session();

    session.submit(&provider, &ozone("Pune, Satara", &[2020])).await.unwrap();
    assert_eq!(provider.calls(), 1);

    let selected: Vec<&str> = session.selection().regions().iter().map(RegionKey::as_str).collect();
    assert_eq!(selected, ["Pune"]);
    assert_eq!(session.selection().time_index(), 0);
    assert_eq!(current_time(&session), "2020-01");

    let surface = session.surface();
    assert_eq!(
        surface.layer_urls(),
        ["https://tiles.airmap.example/ozone/pune/2020-01/{z}/{x}/{y}.png"]
    );
    assert_eq!(surface.marker_labels(), ["Pune\nO3: 0.1312"]);

    let bounds = surface.bounds().unwrap();
    assert_abs_diff_eq!(bounds.min().x, 73.3);
    assert_abs_diff_eq!(bounds.max().y, 19.4);

    let labels: Vec<String> = session.legend_entries().into_iter().map(|e| e.label).collect();
    assert_eq!(labels, ["High Concentration", "Low Concentration"]);
}

#[tokio::test]
async fn failed_lookup_keeps_previous_state() -> anyhow::Result<()> {
    let provider = CountingProvider::new();
    let mut session = session();
    session.submit(&provider, &ozone("Pune, Satara", &[2020])).await?;
    session.set_time_index(1)?;
    session.surface_mut().take_ops();

    let err = session.submit(&FailingProvider, &ozone("Satara", &[2021])).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch map data. Please try again.");

    let err = session.submit(&provider, &ozone("Atlantis", &[2021])).await.unwrap_err();
    assert!(matches!(err, AirmapError::NotFound(_)));

    assert_eq!(current_time(&session), "2020-02");
    assert!(session.selection().regions().contains("Pune"));
    assert_eq!(session.dataset().unwrap().periods().len(), 2);
    assert!(session.surface().ops().is_empty());
    Ok(())
}

#[tokio::test]
async fn advancing_replaces_layer_without_overlap() {
    let urls: UrlTable = [
        (OverlayKey::from("Pune - 2020-01"), "url1".to_string()),
        (OverlayKey::from("Pune - 2020-02"), "url2".to_string()),
    ]
    .into_iter()
    .collect();
    let provider = StaticProvider(MapResponse {
        success: true,
        dataset: "Ozone".into(),
        quantity: "O3".into(),
        urls,
        legends: LegendTable::from([("low".to_string(), "blue".to_string())]),
        stats: StatsTable::new(),
        ..Default::default()
    });

    let mut session = session();
    session.submit(&provider, &ozone("Pune", &[2020])).await.unwrap();
    assert_eq!(session.surface().layer_urls(), ["url1"]);
    // No geometry: no marker and nothing to fit.
    assert!(session.surface().markers().is_empty());
    assert!(session.surface().bounds().is_none());
    session.surface_mut().take_ops();

    session.set_time_index(1).unwrap();
    let ops = session.surface_mut().take_ops();
    assert!(matches!(
        ops.as_slice(),
        [SurfaceOp::RemoveLayer(_), SurfaceOp::AddLayer(_, url)] if url == "url2"
    ));
    assert_eq!(session.surface().layer_urls(), ["url2"]);

    assert!(matches!(
        session.set_time_index(2),
        Err(AirmapError::TimeIndexOutOfRange { index: 2, len: 2 })
    ));
}

#[tokio::test]
async fn changing_selection_reconciles() {
    let provider = CountingProvider::new();
    let mut session = session();
    session
        .submit(&provider, &ozone("Pune, Satara, Ahmadnagar", &[2021]))
        .await
        .unwrap();

    let report = session
        .select_regions([RegionKey::new("Pune"), RegionKey::new("Satara")])
        .unwrap();
    assert_eq!(report.layers_added, 1);
    assert_eq!(session.surface().layers().len(), 2);
    assert_eq!(session.surface().markers().len(), 2);

    let report = session.select_regions([RegionKey::new("Satara")]).unwrap();
    assert_eq!(report.layers_removed, 1);
    assert_eq!(report.markers_removed, 1);
    assert_eq!(
        session.surface().layer_urls(),
        ["https://tiles.airmap.example/ozone/satara/2021-01/{z}/{x}/{y}.png"]
    );

    let report = session.select_regions([RegionKey::new("Satara")]).unwrap();
    assert!(report.is_noop());

    let err = session.select_regions([RegionKey::new("Delhi")]).unwrap_err();
    assert!(matches!(err, AirmapError::NotFound(_)));
    assert!(session.selection().regions().contains("Satara"));

    session.select_regions(Vec::<RegionKey>::new()).unwrap();
    assert!(session.surface().layers().is_empty());
    assert!(session.surface().markers().is_empty());
}

#[tokio::test]
async fn view_follows_selection_when_fitted() {
    let provider = CountingProvider::new();
    let mut session = session();
    session.submit(&provider, &ozone("Pune, Satara", &[2021])).await.unwrap();
    let pune = session.surface().bounds().unwrap();

    session.select_regions([RegionKey::new("Satara")]).unwrap();
    assert_eq!(session.surface().bounds(), Some(pune));

    assert!(session.fit_to_selection());
    let expected = session
        .dataset()
        .unwrap()
        .geometry()
        .bounds_of(session.selection().regions())
        .unwrap();
    let satara = session.surface().bounds().unwrap();
    assert_eq!(satara, expected);
    assert_ne!(satara, pune);

    session.select_regions(Vec::<RegionKey>::new()).unwrap();
    assert!(!session.fit_to_selection());
}

#[tokio::test]
async fn selection_needs_loaded_data() {
    let mut session = session();
    assert!(matches!(
        session.select_regions([RegionKey::new("Pune")]),
        Err(AirmapError::NoDataset)
    ));
    assert!(matches!(session.set_time_index(0), Err(AirmapError::NoDataset)));
    assert_eq!(session.toggle_playback(), PlaybackState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn playback_advances_every_period_and_wraps() {
    let provider = CountingProvider::new();
    let mut session = session();
    session.submit(&provider, &ozone("Pune", &[2020])).await.unwrap();

    let start = Instant::now();
    assert_eq!(session.toggle_playback(), PlaybackState::Playing);

    let event = session.next_event().await.unwrap();
    assert!(start.elapsed() >= PERIOD);
    let report = session.handle_event(event).unwrap();
    assert_eq!(report.layers_added, 1);
    assert_eq!(report.layers_removed, 1);
    assert_eq!(report.markers_updated, 1);
    assert_eq!(current_time(&session), "2020-02");
    assert_eq!(session.surface().marker_labels(), ["Pune\nO3: 0.1298"]);

    let event = session.next_event().await.unwrap();
    session.handle_event(event).unwrap();
    assert_eq!(current_time(&session), "2020-01");
    assert_eq!(session.surface().layers().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn tick_queued_before_stop_is_ignored() {
    let provider = CountingProvider::new();
    let mut session = session();
    session.submit(&provider, &ozone("Pune", &[2020])).await.unwrap();

    session.toggle_playback();
    let event = session.next_event().await.unwrap();
    assert_eq!(session.toggle_playback(), PlaybackState::Stopped);

    assert!(session.handle_event(event).is_none());
    assert_eq!(current_time(&session), "2020-01");
}

#[tokio::test(start_paused = true)]
async fn resubmitting_while_playing_restarts_the_ticker() {
    let provider = CountingProvider::new();
    let mut session = session();
    session.submit(&provider, &ozone("Pune", &[2020])).await.unwrap();
    session.toggle_playback();
    let stale = session.next_event().await.unwrap();

    session.submit(&provider, &ozone("Satara", &[2021])).await.unwrap();
    assert_eq!(session.playback_state(), PlaybackState::Playing);
    assert_eq!(current_time(&session), "2021-01");
    assert!(session.handle_event(stale).is_none());

    let event = session.next_event().await.unwrap();
    session.handle_event(event).unwrap();
    assert_eq!(current_time(&session), "2021-02");
    assert_eq!(
        session.surface().layer_urls(),
        ["https://tiles.airmap.example/ozone/satara/2021-02/{z}/{x}/{y}.png"]
    );
    assert_eq!(session.surface().marker_labels(), ["Satara\nO3: 0.1283"]);
}
