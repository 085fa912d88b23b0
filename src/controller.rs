use std::time::Duration;

use log::{debug, info};
use thiserror::Error;

use crate::audio::{AudioSink, AudioSynchronizer};
use crate::config::SessionConfig;
use crate::constants::{NEXT_ZONE, PREVIOUS_ZONE};
use crate::fullscreen::{FullscreenAdapter, FullscreenMode};
use crate::item::Item;
use crate::progress_clock::ProgressClock;
use crate::state::PlaybackState;
use crate::timer::{Clock, TimerEvent, TimerId, TimerQueue};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot play an empty story")]
    EmptySequence,
}

/// What a tap does, by where it lands across the story's width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAction {
    Previous,
    TogglePause,
    Next,
}

impl TapAction {
    /// `x` is the horizontal position as a fraction of the width.
    pub fn from_fraction(x: f32) -> Self {
        if x < PREVIOUS_ZONE {
            TapAction::Previous
        } else if x > NEXT_ZONE {
            TapAction::Next
        } else {
            TapAction::TogglePause
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    target: usize,
    timer: TimerId,
}

/// One playback session: the story state machine plus the clock, audio
/// output and fullscreen target it exclusively owns.
///
/// Time only moves when the session is pumped, either by [`update`] from
/// the frame loop or at the start of every operation, so anything that
/// was due happens before the operation is applied.
///
/// [`update`]: PlaybackController::update
pub struct PlaybackController<A: AudioSink, W> {
    sequence: Vec<Item>,
    config: SessionConfig,
    clock: Box<dyn Clock>,
    timers: TimerQueue,
    progress: ProgressClock,
    current_index: usize,
    paused: bool,
    finished: bool,
    transition: Option<Transition>,
    audio: AudioSynchronizer<A>,
    fullscreen: FullscreenAdapter<W>,
}

impl<A: AudioSink, W> PlaybackController<A, W> {
    /// Mounts a session: starts the clock on the first item and attempts
    /// autoplay of its track.
    pub fn new(
        sequence: Vec<Item>,
        config: SessionConfig,
        clock: Box<dyn Clock>,
        audio: A,
        fullscreen: FullscreenAdapter<W>,
    ) -> Result<Self, SessionError> {
        if sequence.is_empty() {
            return Err(SessionError::EmptySequence);
        }
        let timers = TimerQueue::new(clock.now());
        let mut session = Self {
            sequence,
            config,
            clock,
            timers,
            progress: ProgressClock::new(),
            current_index: 0,
            paused: false,
            finished: false,
            transition: None,
            audio: AudioSynchronizer::new(audio),
            fullscreen,
        };

        let duration = session.duration_for(0);
        session.progress.start(duration, &mut session.timers);
        let muted = session.audio.mount(&session.sequence[0].audio_url);
        info!("Story started with {} items (muted: {})", session.sequence.len(), muted);
        Ok(session)
    }

    // --- Observers ---

    pub fn sequence(&self) -> &[Item] {
        &self.sequence
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_item(&self) -> &Item {
        &self.sequence[self.current_index]
    }

    pub fn progress_percent(&self) -> f32 {
        self.progress.progress()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_muted(&self) -> bool {
        self.audio.is_muted()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_fullscreen()
    }

    pub fn fullscreen_mode(&self) -> FullscreenMode {
        self.fullscreen.mode()
    }

    #[cfg(test)]
    pub fn audio(&self) -> &AudioSynchronizer<A> {
        &self.audio
    }

    #[cfg(test)]
    pub fn armed_timers(&self) -> usize {
        self.timers.armed_count()
    }

    pub fn state(&self) -> PlaybackState {
        if self.finished {
            PlaybackState::Finished
        } else if self.transition.is_some() {
            PlaybackState::Transitioning
        } else if self.paused {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }

    /// Time spent on the current item, paused time excluded.
    pub fn item_elapsed(&self) -> Duration {
        self.progress.elapsed(self.timers.now())
    }

    /// Fill of the progress bar for `index`, in `[0, 100]`.
    pub fn bar_fill(&self, index: usize) -> f32 {
        if self.finished || index < self.current_index {
            100.0
        } else if index == self.current_index {
            self.progress.progress()
        } else {
            0.0
        }
    }

    /// Cards run a fixed time, photos the configured auto-advance time.
    fn duration_for(&self, index: usize) -> Duration {
        if self.sequence[index].is_interstitial() {
            self.config.interstitial_duration
        } else {
            self.config.auto_advance
        }
    }

    // --- Driving ---

    /// Fires everything that has come due. Call once per frame.
    pub fn update(&mut self) {
        self.pump();
        self.audio.update();
    }

    fn pump(&mut self) {
        let now = self.clock.now();
        while let Some((id, event)) = self.timers.pop_due(now) {
            match event {
                TimerEvent::Sample => self.progress.on_sample(self.timers.now()),
                TimerEvent::Complete => {
                    if self.progress.on_complete(id, &mut self.timers) {
                        debug!("Item {} ran out", self.current_index);
                        self.advance();
                    }
                }
                TimerEvent::Settle => {
                    if self.transition.is_some_and(|t| t.timer == id) {
                        self.settle();
                    }
                }
            }
        }
    }

    // --- Navigation ---

    pub fn next(&mut self) {
        self.pump();
        self.advance();
    }

    fn advance(&mut self) {
        if self.transition.is_some() || self.finished {
            return;
        }
        if self.current_index + 1 >= self.sequence.len() {
            self.finish();
            return;
        }
        self.begin_transition(self.current_index + 1);
    }

    pub fn previous(&mut self) {
        self.pump();
        if self.transition.is_some() || self.finished {
            return;
        }
        if self.current_index == 0 {
            debug!("Already at the first item");
            return;
        }
        self.begin_transition(self.current_index - 1);
    }

    /// Jumps straight to `index`; the same or an out-of-range index is ignored.
    pub fn go_to(&mut self, index: usize) {
        self.pump();
        if self.transition.is_some() || self.finished {
            return;
        }
        if index == self.current_index || index >= self.sequence.len() {
            return;
        }
        self.begin_transition(index);
    }

    pub fn toggle_pause(&mut self) {
        self.pump();
        if self.finished {
            return;
        }
        self.paused = !self.paused;
        if self.paused {
            self.progress.pause(&mut self.timers);
        } else if self.transition.is_none() {
            let duration = self.duration_for(self.current_index);
            let from = self.progress.progress();
            self.progress.resume(from, duration, &mut self.timers);
        }
        debug!("Paused: {}", self.paused);
    }

    pub fn tap(&mut self, x: f32) {
        match TapAction::from_fraction(x) {
            TapAction::Previous => self.previous(),
            TapAction::TogglePause => self.toggle_pause(),
            TapAction::Next => self.next(),
        }
    }

    /// Starts over from the first item, from any state.
    pub fn replay(&mut self) {
        self.pump();
        if let Some(transition) = self.transition.take() {
            self.timers.cancel(transition.timer);
        }
        self.current_index = 0;
        self.paused = false;
        self.finished = false;
        let duration = self.duration_for(0);
        self.progress.start(duration, &mut self.timers);
        self.audio.sync(&self.sequence[0].audio_url);
        info!("Replaying story");
    }

    fn begin_transition(&mut self, target: usize) {
        self.progress.stop(&mut self.timers);
        let timer = self.timers.arm_once(self.config.settle_delay, TimerEvent::Settle);
        self.transition = Some(Transition { target, timer });
    }

    fn settle(&mut self) {
        let Some(transition) = self.transition.take() else {
            return;
        };
        self.current_index = transition.target;
        let duration = self.duration_for(self.current_index);
        if self.paused {
            self.progress.reset(duration, &mut self.timers);
        } else {
            self.progress.start(duration, &mut self.timers);
        }
        self.audio.sync(&self.sequence[self.current_index].audio_url);
        debug!("Now showing item {} ({})", self.current_index, self.current_item().id);
    }

    fn finish(&mut self) {
        self.progress.stop(&mut self.timers);
        self.finished = true;
        info!("Story finished");
    }

    // --- Audio & fullscreen ---

    /// Returns the new mute state.
    pub fn toggle_mute(&mut self) -> bool {
        self.audio.toggle_mute()
    }

    pub fn toggle_fullscreen(&mut self, window: &mut W) {
        self.fullscreen.toggle(window);
    }

    pub fn observe_fullscreen(&mut self, window: &W) -> Option<bool> {
        self.fullscreen.observe(window)
    }

    /// Releases every timer and stops the audio. Also runs on drop.
    pub fn teardown(&mut self) {
        self.progress.stop(&mut self.timers);
        self.transition = None;
        self.timers.cancel_all();
        self.audio.stop();
    }
}

impl<A: AudioSink, W> Drop for PlaybackController<A, W> {
    fn drop(&mut self) {
        self.teardown();
    }
}
