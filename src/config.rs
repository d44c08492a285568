//! Command-line configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::data::{default_groups, load_groups, Group};
use crate::error::ConfigError;
use crate::propagation::ReferenceFrame;
use crate::renderer::Viewport;
use crate::scene::clock::instant_from_utc;
use crate::scene::SelectionMode;

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3001/fetch-debris";

#[derive(Parser, Debug, Clone)]
#[command(name = "orbitview", about = "Real-time orbital telemetry for TLE catalogs")]
pub struct Config {
    /// Catalog group to load
    #[arg(long, default_value = "active")]
    pub group: String,
    /// JSON file with group definitions, replacing the built-in presets
    #[arg(long)]
    pub groups_file: Option<PathBuf>,
    /// Reference frame for object positions
    #[arg(long, value_enum, default_value_t = ReferenceFrame::EarthFixed)]
    pub frame: ReferenceFrame,
    /// Whether several objects can be selected at once
    #[arg(long, value_enum, default_value_t = SelectionMode::Single)]
    pub selection: SelectionMode,
    /// Relay for providers that need an authenticated session
    #[arg(long, default_value = DEFAULT_RELAY_URL)]
    pub relay_url: String,
    /// Timer interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub tick_ms: u64,
    /// Number of timer ticks to run before exiting
    #[arg(long, default_value_t = 10)]
    pub ticks: u32,
    /// Pin the clock to an RFC 3339 instant instead of following wall time
    #[arg(long)]
    pub at: Option<String>,
    /// Select objects matching this name or catalog number
    #[arg(long)]
    pub select: Option<String>,
    /// Viewport size in pixels, WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720", value_parser = parse_viewport)]
    pub viewport: Viewport,
    /// Network timeout for catalog fetches, seconds
    #[arg(long, default_value_t = 30)]
    pub fetch_timeout_secs: u64,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Group definitions from `--groups-file`, or the presets
    pub fn groups(&self) -> Result<Vec<Group>, ConfigError> {
        match &self.groups_file {
            Some(path) => load_groups(path),
            None => Ok(default_groups()),
        }
    }

    /// The `--at` instant, if given
    pub fn start_instant(&self) -> Result<Option<satkit::Instant>, ConfigError> {
        self.at.as_deref().map(parse_instant).transpose()
    }
}

pub fn parse_instant(s: &str) -> Result<satkit::Instant, ConfigError> {
    let parsed = chrono::DateTime::parse_from_rfc3339(s.trim())
        .map_err(|_| ConfigError::InvalidInstant(s.to_string()))?;
    instant_from_utc(&parsed.with_timezone(&chrono::Utc))
        .ok_or_else(|| ConfigError::InvalidInstant(s.to_string()))
}

pub fn parse_viewport(s: &str) -> Result<Viewport, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width: u32 = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let height: u32 = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    if width == 0 || height == 0 {
        return Err(format!("viewport must be non-empty, got '{s}'"));
    }
    Ok(Viewport::new(width as f32, height as f32))
}
