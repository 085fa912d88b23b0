use std::time::{Duration, Instant};

use crate::constants::SAMPLE_INTERVAL;
use crate::timer::{TimerEvent, TimerId, TimerQueue};

/// Tracks elapsed time against one item's duration.
///
/// The clock arms a repeating [`TimerEvent::Sample`] and a one-shot
/// [`TimerEvent::Complete`] in the session's queue; the session forwards
/// those events back here and turns completion into an advance.
#[derive(Debug, Default)]
pub struct ProgressClock {
    started_at: Option<Instant>,
    duration: Duration,
    progress: f32,
    sample_timer: Option<TimerId>,
    complete_timer: Option<TimerId>,
}

impl ProgressClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress through the current duration, in `[0, 100]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.complete_timer.is_some()
    }

    /// Time since the (possibly back-dated) start, capped at the duration.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(start) => now.saturating_duration_since(start).min(self.duration),
            None => self.duration.mul_f32(self.progress / 100.0),
        }
    }

    pub fn start(&mut self, duration: Duration, timers: &mut TimerQueue) {
        self.resume(0.0, duration, timers);
    }

    /// Re-arms for the part of `duration` not covered by `from_percent`.
    /// The start timestamp is back-dated so samples keep counting from
    /// `from_percent` instead of from zero.
    pub fn resume(&mut self, from_percent: f32, duration: Duration, timers: &mut TimerQueue) {
        self.stop(timers);

        let from_percent = from_percent.clamp(0.0, 100.0);
        let already = duration.mul_f32(from_percent / 100.0);
        let remaining = duration.saturating_sub(already);
        let now = timers.now();

        self.started_at = Some(now.checked_sub(already).unwrap_or(now));
        self.duration = duration;
        self.progress = from_percent;
        self.sample_timer = Some(timers.arm_repeating(SAMPLE_INTERVAL, TimerEvent::Sample));
        self.complete_timer = Some(timers.arm_once(remaining, TimerEvent::Complete));
    }

    /// Cancels both timers and freezes progress where it is.
    pub fn stop(&mut self, timers: &mut TimerQueue) {
        if let Some(id) = self.sample_timer.take() {
            timers.cancel(id);
        }
        if let Some(id) = self.complete_timer.take() {
            timers.cancel(id);
        }
        self.started_at = None;
    }

    /// Like [`stop`](Self::stop), but first brings progress up to the
    /// current instant so a later resume loses nothing between samples.
    pub fn pause(&mut self, timers: &mut TimerQueue) {
        self.on_sample(timers.now());
        self.stop(timers);
    }

    /// Zeroes progress without arming anything; used when a new item
    /// becomes current while playback is held.
    pub fn reset(&mut self, duration: Duration, timers: &mut TimerQueue) {
        self.stop(timers);
        self.duration = duration;
        self.progress = 0.0;
    }

    pub fn on_sample(&mut self, now: Instant) {
        let Some(start) = self.started_at else {
            return;
        };
        if self.duration.is_zero() {
            self.progress = 100.0;
            return;
        }
        let elapsed = now.saturating_duration_since(start);
        self.progress = (elapsed.as_secs_f32() / self.duration.as_secs_f32() * 100.0).min(100.0);
    }

    /// Handles the completion timer. Returns `true` if it belonged to this
    /// clock and the caller should advance.
    pub fn on_complete(&mut self, id: TimerId, timers: &mut TimerQueue) -> bool {
        if self.complete_timer != Some(id) {
            return false;
        }
        self.complete_timer = None;
        self.stop(timers);
        self.progress = 100.0;
        true
    }
}
