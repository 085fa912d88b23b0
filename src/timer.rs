use std::time::{Duration, Instant};

/// Monotonic time source the timer queue is pumped against.
pub trait Clock {
    fn now(&self) -> Instant;
}

pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What a timer means when it fires. The owner of the queue maps each
/// variant to its continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Sample,
    Complete,
    Settle,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    id: TimerId,
    deadline: Instant,
    period: Option<Duration>,
    event: TimerEvent,
}

/// Cancellable one-shot and repeating timers for a single session.
///
/// Nothing fires on its own: the owner calls [`TimerQueue::pop_due`] until it
/// returns `None`. While a timer is being dispatched, [`TimerQueue::now`]
/// reports its deadline, so timers armed from inside a continuation are
/// scheduled relative to when the firing timer was due.
#[derive(Debug)]
pub struct TimerQueue {
    now: Instant,
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new(now: Instant) -> Self {
        Self { now, next_id: 0, timers: Vec::new() }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn arm_once(&mut self, delay: Duration, event: TimerEvent) -> TimerId {
        self.arm(delay, None, event)
    }

    pub fn arm_repeating(&mut self, period: Duration, event: TimerEvent) -> TimerId {
        self.arm(period, Some(period), event)
    }

    fn arm(&mut self, delay: Duration, period: Option<Duration>, event: TimerEvent) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer { id, deadline: self.now + delay, period, event });
        id
    }

    /// Cancelling an unknown or already fired timer is a no-op.
    pub fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    #[cfg(test)]
    pub fn is_armed(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    #[cfg(test)]
    pub fn armed_count(&self) -> usize {
        self.timers.len()
    }

    /// Removes (or reschedules, if repeating) the earliest timer due at or
    /// before `until` and returns it. Ties fire in arming order.
    pub fn pop_due(&mut self, until: Instant) -> Option<(TimerId, TimerEvent)> {
        let position = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= until)
            .min_by_key(|(_, t)| (t.deadline, t.id.0))
            .map(|(i, _)| i);

        let Some(position) = position else {
            if until > self.now {
                self.now = until;
            }
            return None;
        };

        let Timer { id, deadline, period, event } = self.timers[position];
        if deadline > self.now {
            self.now = deadline;
        }
        match period {
            Some(period) => self.timers[position].deadline += period,
            None => {
                self.timers.remove(position);
            }
        }
        Some((id, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn one_shot_fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new(t0);
        let id = q.arm_once(ms(100), TimerEvent::Complete);

        assert_eq!(q.pop_due(t0 + ms(99)), None);
        assert_eq!(q.pop_due(t0 + ms(100)), Some((id, TimerEvent::Complete)));
        assert_eq!(q.now(), t0 + ms(100));
        assert_eq!(q.pop_due(t0 + ms(1000)), None);
        assert!(!q.is_armed(id));
    }

    #[test]
    fn repeating_timer_catches_up_in_order() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new(t0);
        q.arm_repeating(ms(50), TimerEvent::Sample);
        let done = q.arm_once(ms(120), TimerEvent::Complete);

        let mut fired = Vec::new();
        while let Some((_, event)) = q.pop_due(t0 + ms(160)) {
            fired.push((event, q.now() - t0));
        }
        assert_eq!(
            fired,
            vec![
                (TimerEvent::Sample, ms(50)),
                (TimerEvent::Sample, ms(100)),
                (TimerEvent::Complete, ms(120)),
                (TimerEvent::Sample, ms(150)),
            ]
        );
        assert!(!q.is_armed(done));
        assert_eq!(q.armed_count(), 1);
        assert_eq!(q.now(), t0 + ms(160));
    }

    #[test]
    fn cancel_is_idempotent() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new(t0);
        let id = q.arm_once(ms(10), TimerEvent::Settle);
        q.cancel(id);
        q.cancel(id);
        assert_eq!(q.pop_due(t0 + ms(20)), None);
        assert_eq!(q.armed_count(), 0);
    }

    #[test]
    fn timers_armed_during_dispatch_start_from_the_firing_deadline() {
        let t0 = Instant::now();
        let mut q = TimerQueue::new(t0);
        q.arm_once(ms(100), TimerEvent::Complete);

        assert!(q.pop_due(t0 + ms(400)).is_some());
        let settle = q.arm_once(ms(150), TimerEvent::Settle);
        assert_eq!(q.pop_due(t0 + ms(400)), Some((settle, TimerEvent::Settle)));
        assert_eq!(q.now(), t0 + ms(250));
    }
}
