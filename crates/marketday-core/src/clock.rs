//! Session clock and the single outstanding deadline.
//!
//! The clock is the single source of truth for time inside a session. It
//! never reads the wall clock: time only moves when the dispatcher applies
//! a tick event, which keeps deadline handling deterministic relative to
//! player messages queued around it.
//!
//! # Rules
//!
//! - At most one deadline is pending. Setting a timeout replaces it.
//! - A deadline fires on the first tick that is strictly later than it.
//! - A fired deadline is cleared before the caller reacts, so a reaction
//!   that sets a new timeout can never be fired twice by the same tick.
//! - Out-of-order ticks move the clock backwards but cannot resurrect a
//!   deadline that already fired.

use std::time::Duration;

/// Logical time of a session plus its pending deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionClock {
    /// Elapsed time reported by the most recent tick.
    now: Duration,

    /// Absolute time after which the active phase's timer fires.
    deadline: Option<Duration>,
}

impl SessionClock {
    /// Create a clock at time zero with no deadline.
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            deadline: None,
        }
    }

    /// Current logical time.
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// The pending deadline, if any.
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Schedule the deadline `duration` after the current time, replacing
    /// any deadline already pending.
    pub fn set_timeout(&mut self, duration: Duration) {
        self.deadline = Some(self.now.checked_add(duration).unwrap_or(Duration::MAX));
    }

    /// Drop the pending deadline.
    pub const fn clear(&mut self) {
        self.deadline = None;
    }

    /// Move the clock to `now` and report whether the deadline fired.
    ///
    /// When this returns `true` the deadline has already been cleared.
    pub fn advance(&mut self, now: Duration) -> bool {
        self.now = now;
        match self.deadline {
            Some(deadline) if now > deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn clock_starts_at_zero_without_deadline() {
        let clock = SessionClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.deadline(), None);
    }

    #[test]
    fn timeout_is_relative_to_current_tick() {
        let mut clock = SessionClock::new();
        let _ = clock.advance(ms(300));
        clock.set_timeout(ms(1_000));
        assert_eq!(clock.deadline(), Some(ms(1_300)));
    }

    #[test]
    fn deadline_fires_only_strictly_after() {
        let mut clock = SessionClock::new();
        clock.set_timeout(ms(600));

        assert!(!clock.advance(ms(300)));
        assert!(!clock.advance(ms(600)));
        assert_eq!(clock.deadline(), Some(ms(600)));

        assert!(clock.advance(ms(601)));
        assert_eq!(clock.deadline(), None);
    }

    #[test]
    fn fired_deadline_does_not_fire_again() {
        let mut clock = SessionClock::new();
        clock.set_timeout(ms(100));
        assert!(clock.advance(ms(200)));
        assert!(!clock.advance(ms(300)));
    }

    #[test]
    fn out_of_order_tick_does_not_refire() {
        let mut clock = SessionClock::new();
        clock.set_timeout(ms(100));
        assert!(clock.advance(ms(900)));

        // A stale tick arrives late: time rewinds, nothing fires.
        assert!(!clock.advance(ms(150)));
        assert_eq!(clock.now(), ms(150));
        assert_eq!(clock.deadline(), None);
    }

    #[test]
    fn new_timeout_replaces_pending_one() {
        let mut clock = SessionClock::new();
        clock.set_timeout(ms(100));
        clock.set_timeout(ms(5_000));
        assert!(!clock.advance(ms(200)));
        assert_eq!(clock.deadline(), Some(ms(5_000)));
    }

    #[test]
    fn clear_drops_deadline() {
        let mut clock = SessionClock::new();
        clock.set_timeout(ms(100));
        clock.clear();
        assert!(!clock.advance(ms(10_000)));
    }
}
