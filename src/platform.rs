use log::debug;
use raylib::prelude::*;

use crate::audio::{AudioError, AudioSink};
use crate::constants::MUSIC_VOLUME;
use crate::fullscreen::{FullscreenApi, FullscreenError};

/// Streams the session's track through the raylib audio device.
pub struct RaylibMusicSink<'aud> {
    device: Option<&'aud RaylibAudio>,
    music: Option<Music<'aud>>,
    playing: bool,
    paused: bool,
    muted: bool,
}

impl<'aud> RaylibMusicSink<'aud> {
    /// `device` is `None` when the audio device failed to open; every play
    /// attempt is then rejected and the story runs muted.
    pub fn new(device: Option<&'aud RaylibAudio>) -> Self {
        Self { device, music: None, playing: false, paused: false, muted: false }
    }

    fn apply_volume(&mut self) {
        let volume = if self.muted { 0.0 } else { MUSIC_VOLUME };
        if let Some(music) = self.music.as_mut() {
            music.set_volume(volume);
        }
    }
}

impl AudioSink for RaylibMusicSink<'_> {
    fn load(&mut self, url: &str) -> Result<(), AudioError> {
        let device = self.device.ok_or(AudioError::DeviceUnavailable)?;
        if let Some(old) = self.music.as_mut() {
            old.stop_stream();
        }
        self.music = None;
        self.playing = false;
        self.paused = false;

        let music = device.new_music(url).map_err(|e| AudioError::Load {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        self.music = Some(music);
        self.apply_volume();
        Ok(())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if self.device.is_none() {
            return Err(AudioError::DeviceUnavailable);
        }
        let music = self.music.as_mut().ok_or(AudioError::NothingLoaded)?;
        if self.paused {
            music.resume_stream();
        } else {
            music.play_stream();
        }
        if !music.is_stream_playing() {
            return Err(AudioError::Rejected("stream did not start".to_string()));
        }
        self.playing = true;
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(music) = self.music.as_mut() {
            music.pause_stream();
            self.paused = self.playing || self.paused;
        }
        self.playing = false;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_volume();
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn update(&mut self) {
        if !self.playing {
            return;
        }
        if let Some(music) = self.music.as_mut() {
            // Tracks loop while their items are up
            if !music.is_stream_playing() {
                debug!("Track ended, looping");
                music.play_stream();
            }
            music.update_stream();
        }
    }
}

fn monitor_present(rl: &RaylibHandle) -> bool {
    rl.is_window_ready() && raylib::core::window::get_monitor_count() > 0
}

/// Fullscreen window on the current monitor without a mode switch.
pub struct BorderlessWindowed;

impl FullscreenApi<RaylibHandle> for BorderlessWindowed {
    fn name(&self) -> &'static str {
        "borderless windowed"
    }

    fn is_available(&self, rl: &RaylibHandle) -> bool {
        monitor_present(rl)
    }

    fn request(&self, rl: &mut RaylibHandle) -> Result<(), FullscreenError> {
        if !self.is_engaged(rl) {
            rl.toggle_borderless_windowed();
        }
        Ok(())
    }

    fn exit(&self, rl: &mut RaylibHandle) -> Result<(), FullscreenError> {
        if self.is_engaged(rl) {
            rl.toggle_borderless_windowed();
        }
        Ok(())
    }

    fn is_engaged(&self, _rl: &RaylibHandle) -> bool {
        // The safe window state does not expose the borderless flag
        unsafe { raylib::ffi::IsWindowState(raylib::ffi::ConfigFlags::FLAG_BORDERLESS_WINDOWED_MODE as u32) }
    }
}

/// Exclusive fullscreen with a video mode switch.
pub struct ExclusiveFullscreen;

impl FullscreenApi<RaylibHandle> for ExclusiveFullscreen {
    fn name(&self) -> &'static str {
        "exclusive fullscreen"
    }

    fn is_available(&self, rl: &RaylibHandle) -> bool {
        monitor_present(rl)
    }

    fn request(&self, rl: &mut RaylibHandle) -> Result<(), FullscreenError> {
        if !rl.is_window_fullscreen() {
            rl.toggle_fullscreen();
        }
        if rl.is_window_fullscreen() {
            Ok(())
        } else {
            Err(FullscreenError::Refused {
                api: self.name(),
                action: "enter",
                reason: "window did not switch mode".to_string(),
            })
        }
    }

    fn exit(&self, rl: &mut RaylibHandle) -> Result<(), FullscreenError> {
        if rl.is_window_fullscreen() {
            rl.toggle_fullscreen();
        }
        Ok(())
    }

    fn is_engaged(&self, rl: &RaylibHandle) -> bool {
        rl.is_window_fullscreen()
    }
}

/// Candidates in preference order.
pub fn fullscreen_candidates() -> Vec<Box<dyn FullscreenApi<RaylibHandle>>> {
    vec![
        Box::new(BorderlessWindowed) as Box<dyn FullscreenApi<RaylibHandle>>,
        Box::new(ExclusiveFullscreen),
    ]
}
