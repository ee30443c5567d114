//! Playback of the time index.
//!
//! While playing, a background task sends [`SessionEvent::Tick`] every
//! period. The task only produces events; the session applies them. Every
//! ticker gets a new generation number so the session can drop ticks that
//! were already queued when the ticker was replaced or stopped.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::session::SessionEvent;

/// Default time between two ticks.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(5000);

/// Playback settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationConfig {
    /// Time between two ticks.
    pub period: Duration,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
        }
    }
}

/// Current state of the animation driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No ticker is running.
    #[default]
    Stopped,
    /// A ticker is running.
    Playing,
}

/// Index following `index` in a list of `len` periods, wrapping to the start.
///
/// Returns `0` for an empty list.
pub fn next_index(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (index + 1) % len
    }
}

/// Running ticker task. Aborted when cancelled or dropped.
#[derive(Debug)]
pub struct TickerHandle {
    task: JoinHandle<()>,
    generation: u64,
}

impl TickerHandle {
    /// Generation number carried by the ticks of this ticker.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stops the ticker. No tick is sent after this returns.
    pub fn cancel(self) {
        log::trace!("Cancelling ticker {}", self.generation);
        // Abort happens in drop.
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn spawn_ticker(
    period: Duration,
    generation: u64,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> TickerHandle {
    let start = Instant::now() + period;
    let task = tokio::spawn(async move {
        let mut timer = interval_at(start, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            timer.tick().await;
            if events.send(SessionEvent::Tick { generation }).is_err() {
                log::debug!("Session is gone, ticker {generation} exits");
                break;
            }
        }
    });

    TickerHandle { task, generation }
}

/// Starts and stops the ticker.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct AnimationDriver {
    config: AnimationConfig,
    generation: u64,
    ticker: Option<TickerHandle>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl AnimationDriver {
    /// Creates a stopped driver that will send ticks to `events`.
    pub fn new(config: AnimationConfig, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            config,
            generation: 0,
            ticker: None,
            events,
        }
    }

    /// Playback settings.
    pub fn config(&self) -> AnimationConfig {
        self.config
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        if self.ticker.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    /// Whether a ticker is running.
    pub fn is_playing(&self) -> bool {
        self.ticker.is_some()
    }

    /// Starts a ticker unless one is already running or there is nothing to
    /// animate. Returns whether the driver is playing afterwards.
    ///
    /// A zero period never starts a ticker.
    pub fn start(&mut self, period_count: usize) -> bool {
        if self.ticker.is_some() {
            return true;
        }
        if period_count == 0 {
            log::debug!("Nothing to animate, playback not started");
            return false;
        }
        if self.config.period.is_zero() {
            log::warn!("Animation period is zero, playback not started");
            return false;
        }

        self.generation += 1;
        log::debug!(
            "Starting ticker {} with period {:?}",
            self.generation,
            self.config.period
        );
        self.ticker = Some(spawn_ticker(
            self.config.period,
            self.generation,
            self.events.clone(),
        ));
        true
    }

    /// Cancels the running ticker, if any. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        match self.ticker.take() {
            Some(ticker) => {
                ticker.cancel();
                true
            }
            None => false,
        }
    }

    /// Switches between playing and stopped.
    pub fn toggle(&mut self, period_count: usize) -> PlaybackState {
        if !self.stop() {
            self.start(period_count);
        }
        self.state()
    }

    /// Cancels the running ticker and starts a fresh one, so the next tick
    /// comes one full period from now.
    pub fn restart(&mut self, period_count: usize) -> bool {
        self.stop();
        self.start(period_count)
    }

    /// Whether a tick with the given generation comes from the running ticker.
    pub fn accepts(&self, generation: u64) -> bool {
        self.ticker
            .as_ref()
            .is_some_and(|ticker| ticker.generation == generation)
    }
}
