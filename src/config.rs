use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::constants::*;

/// Plays a day of photos as an auto-advancing story with music.
#[derive(Debug, Parser)]
#[command(name = "momentra", version, about)]
pub struct Args {
    /// JSON array of photo records ({id, image_url, music_url, ...})
    #[arg(long, value_name = "FILE", conflicts_with = "dir")]
    pub records: Option<PathBuf>,

    /// Directory of images to play instead of a records file
    #[arg(long, value_name = "DIR", requires = "music")]
    pub dir: Option<PathBuf>,

    /// Track played under every image of --dir
    #[arg(long, value_name = "FILE")]
    pub music: Option<PathBuf>,

    /// How long each photo stays up, in milliseconds
    #[arg(long, default_value_t = DEFAULT_AUTO_ADVANCE_MS)]
    pub auto_advance_ms: u64,

    /// Start in fullscreen
    #[arg(long)]
    pub fullscreen: bool,

    #[arg(long, default_value_t = RENDER_WIDTH)]
    pub width: i32,

    #[arg(long, default_value_t = RENDER_HEIGHT)]
    pub height: i32,

    /// Seed for picking card backgrounds
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("auto-advance time must be greater than zero")]
    ZeroAutoAdvance,
    #[error("window size {0}x{1} is not usable")]
    WindowSize(i32, i32),
}

/// Timing of a playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub auto_advance: Duration,
    pub interstitial_duration: Duration,
    pub settle_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_advance: Duration::from_millis(DEFAULT_AUTO_ADVANCE_MS),
            interstitial_duration: INTERSTITIAL_DURATION,
            settle_delay: SETTLE_DELAY,
        }
    }
}

impl SessionConfig {
    pub fn with_auto_advance(auto_advance: Duration) -> Self {
        Self { auto_advance, ..Self::default() }
    }
}

impl Args {
    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        if self.auto_advance_ms == 0 {
            return Err(ConfigError::ZeroAutoAdvance);
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::WindowSize(self.width, self.height));
        }
        Ok(SessionConfig::with_auto_advance(Duration::from_millis(self.auto_advance_ms)))
    }
}
