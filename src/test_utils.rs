//! Fakes shared by the unit tests: a hand-driven clock, an audio sink with
//! a configurable autoplay policy and a window with scripted fullscreen
//! support.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::audio::{AudioError, AudioSink};
use crate::controller::PlaybackController;
use crate::fullscreen::{FullscreenApi, FullscreenError};
use crate::timer::Clock;

pub const SETTLE: u64 = 150;

pub type TestSession = PlaybackController<FakeAudio, FakeWindow>;

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Rc::new(Cell::new(Instant::now())) }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Autoplay {
    Allowed,
    MutedOnly,
    Blocked,
}

#[derive(Debug)]
pub struct FakeAudio {
    pub policy: Autoplay,
    pub loads: Vec<String>,
    pub broken: Vec<String>,
    pub loaded: bool,
    pub playing: bool,
    pub muted: bool,
}

impl FakeAudio {
    pub fn new(policy: Autoplay) -> Self {
        Self {
            policy,
            loads: Vec::new(),
            broken: Vec::new(),
            loaded: false,
            playing: false,
            muted: false,
        }
    }
}

impl AudioSink for FakeAudio {
    fn load(&mut self, url: &str) -> Result<(), AudioError> {
        self.loads.push(url.to_string());
        self.playing = false;
        if self.broken.iter().any(|b| b == url) {
            self.loaded = false;
            return Err(AudioError::Load { url: url.to_string(), reason: "not found".to_string() });
        }
        self.loaded = true;
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if !self.loaded {
            return Err(AudioError::NothingLoaded);
        }
        let allowed = match self.policy {
            Autoplay::Allowed => true,
            Autoplay::MutedOnly => self.muted,
            Autoplay::Blocked => false,
        };
        if !allowed {
            return Err(AudioError::Rejected("autoplay policy".to_string()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[derive(Debug, Default)]
pub struct FakeWindow {
    pub available: Vec<&'static str>,
    pub engaged: Option<String>,
    pub failing: bool,
}

impl FakeWindow {
    pub fn supporting(apis: &[&'static str]) -> Self {
        Self { available: apis.to_vec(), ..Self::default() }
    }
}

pub struct FakeFullscreen(pub &'static str);

impl FullscreenApi<FakeWindow> for FakeFullscreen {
    fn name(&self) -> &'static str {
        self.0
    }

    fn is_available(&self, window: &FakeWindow) -> bool {
        window.available.contains(&self.0)
    }

    fn request(&self, window: &mut FakeWindow) -> Result<(), FullscreenError> {
        if window.failing {
            return Err(FullscreenError::Refused { api: self.0, action: "enter", reason: "denied".to_string() });
        }
        window.engaged = Some(self.0.to_string());
        Ok(())
    }

    fn exit(&self, window: &mut FakeWindow) -> Result<(), FullscreenError> {
        if window.failing {
            return Err(FullscreenError::Refused { api: self.0, action: "exit", reason: "denied".to_string() });
        }
        if self.is_engaged(window) {
            window.engaged = None;
        }
        Ok(())
    }

    fn is_engaged(&self, window: &FakeWindow) -> bool {
        window.engaged.as_deref() == Some(self.0)
    }
}
