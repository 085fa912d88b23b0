use log::{debug, info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio device unavailable")]
    DeviceUnavailable,
    #[error("no track loaded")]
    NothingLoaded,
    #[error("failed to load track {url}: {reason}")]
    Load { url: String, reason: String },
    #[error("playback rejected: {0}")]
    Rejected(String),
}

/// The single audio output of a session.
pub trait AudioSink {
    fn load(&mut self, url: &str) -> Result<(), AudioError>;
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    fn set_muted(&mut self, muted: bool);
    fn is_playing(&self) -> bool;

    /// Called once per frame for sinks that stream.
    fn update(&mut self) {}
}

/// Keeps the sink on the active item's track.
///
/// A track is only reloaded when the URL changes; reloading would restart
/// the music that a card and its photo share.
#[derive(Debug)]
pub struct AudioSynchronizer<A: AudioSink> {
    sink: A,
    loaded: Option<String>,
    muted: bool,
}

impl<A: AudioSink> AudioSynchronizer<A> {
    pub fn new(sink: A) -> Self {
        Self { sink, loaded: None, muted: false }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    #[cfg(test)]
    pub fn loaded(&self) -> Option<&str> {
        self.loaded.as_deref()
    }

    #[cfg(test)]
    pub fn sink(&self) -> &A {
        &self.sink
    }

    #[cfg(test)]
    pub fn sink_mut(&mut self) -> &mut A {
        &mut self.sink
    }

    /// Loads the first track and tries unmuted, then muted, autoplay.
    /// Returns the resulting mute state.
    pub fn mount(&mut self, url: &str) -> bool {
        if !self.load(url) {
            self.muted = true;
            return self.muted;
        }

        self.sink.set_muted(false);
        match self.sink.play() {
            Ok(()) => self.muted = false,
            Err(e) => {
                info!("Unmuted autoplay prevented, trying muted: {}", e);
                self.sink.set_muted(true);
                if let Err(e) = self.sink.play() {
                    info!("All autoplay prevented: {}", e);
                }
                self.muted = true;
            }
        }
        self.muted
    }

    /// Follows the current item. Same URL: keep the source and only resume.
    pub fn sync(&mut self, url: &str) {
        if self.loaded.as_deref() != Some(url) {
            if !self.load(url) {
                return;
            }
            if !self.muted {
                self.play();
            }
        } else if !self.muted && !self.sink.is_playing() {
            self.play();
        }
    }

    /// Unmuting resumes playback, muting pauses it.
    pub fn toggle_mute(&mut self) -> bool {
        if self.muted {
            self.sink.set_muted(false);
            self.muted = false;
            self.play();
        } else {
            self.sink.pause();
            self.sink.set_muted(true);
            self.muted = true;
        }
        self.muted
    }

    pub fn update(&mut self) {
        self.sink.update();
    }

    pub fn stop(&mut self) {
        self.sink.pause();
    }

    fn load(&mut self, url: &str) -> bool {
        match self.sink.load(url) {
            Ok(()) => {
                debug!("Loaded track {}", url);
                self.loaded = Some(url.to_string());
                true
            }
            Err(e) => {
                warn!("{}", e);
                self.loaded = None;
                false
            }
        }
    }

    fn play(&mut self) {
        if let Err(e) = self.sink.play() {
            warn!("Play failed: {}", e);
        }
    }
}
