use std::time::Duration;

use airmap::animation::AnimationConfig;
use airmap::{MapRequest, RegionKey};
use clap::Parser;

/// Loads air-quality overlays from an airmap server and plays them in the terminal.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the airmap server
    #[arg(long, env = "AIRMAP_SERVER", default_value = "http://127.0.0.1:5000")]
    pub server: String,

    /// Dataset to load, e.g. Ozone or NO2
    #[arg(long, default_value = "Ozone")]
    pub dataset: String,

    /// Region names, comma separated
    #[arg(long, default_value = "")]
    pub regions: String,

    /// Years to load, comma separated
    #[arg(long, value_delimiter = ',')]
    pub years: Vec<i32>,

    /// Concentration classes, comma separated
    #[arg(long, value_delimiter = ',', default_values = ["low", "medium", "high"])]
    pub classes: Vec<String>,

    /// Regions to show after loading, comma separated. Defaults to the first region with data
    #[arg(long, value_delimiter = ',')]
    pub show: Vec<String>,

    /// Start playback after loading
    #[arg(long)]
    pub play: bool,

    /// Number of periods to advance before exiting; 0 plays until interrupted
    #[arg(long, default_value_t = 0)]
    pub ticks: usize,

    /// Milliseconds between two periods
    #[arg(long, default_value_t = 5000, value_parser = clap::value_parser!(u64).range(1..))]
    pub period_ms: u64,
}

impl Args {
    /// Request described by the arguments.
    pub fn request(&self) -> MapRequest {
        MapRequest::from_form(
            self.dataset.as_str(),
            &self.regions,
            self.years.iter().copied(),
            self.classes.iter().cloned(),
        )
    }

    /// Regions to select after loading, if any were given.
    pub fn shown_regions(&self) -> Vec<RegionKey> {
        self.show
            .iter()
            .map(RegionKey::new)
            .filter(|region| !region.as_str().is_empty())
            .collect()
    }

    /// Playback settings.
    pub fn animation(&self) -> AnimationConfig {
        AnimationConfig {
            period: Duration::from_millis(self.period_ms),
        }
    }
}
