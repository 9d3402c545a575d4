/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Rate limiter that spaces sink writes at least `interval` apart.
//!
//! [`Throttle`] does not own a timer or the sink.  It is a time-explicit
//! state machine: callers pass `now`, receive the value that may be written
//! right away, and ask [`deadline`](Throttle::deadline) when to come back.
//! That keeps the sink write in the caller's hands (so its `Result` can be
//! propagated with `?`) and lets tests drive it with a virtual clock.
//!
//! ```text
//!  push(a) ─► idle? ──yes──► deliver a, cooldown until now+interval
//!                 └──no───► queue a (FIFO)
//!  poll(now ≥ deadline) ─► deliver next queued, restart cooldown
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::clock::deadline_after;

/// FIFO of values released no faster than once per `interval`.
#[derive(Debug)]
pub struct Throttle<T> {
    interval: Duration,
    pending: VecDeque<T>,
    /// End of the running cooldown.  `None` when idle.
    cooldown_until: Option<Instant>,
}

impl<T> Throttle<T> {
    /// `interval` of zero disables throttling: every value is released as
    /// soon as it is pushed.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: VecDeque::new(),
            cooldown_until: None,
        }
    }

    /// Number of values waiting behind the cooldown.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Enqueue `value`; returns the value to deliver now, if the throttle is
    /// idle.  The returned value is always the oldest queued one.
    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        self.pending.push_back(value);
        self.poll(now)
    }

    /// Release the next queued value if the cooldown has elapsed, restarting
    /// the cooldown from `now`.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.is_cooling_down(now) {
            return None;
        }
        self.cooldown_until = None;

        let value = self.pending.pop_front()?;
        if !self.interval.is_zero() {
            self.cooldown_until = Some(deadline_after(now, self.interval));
        }
        Some(value)
    }

    /// When the running cooldown ends; `None` when idle.
    pub fn deadline(&self) -> Option<Instant> {
        self.cooldown_until
    }

    pub fn is_cooling_down(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| until > now)
    }

    /// Drop every queued value and the cooldown without delivering anything.
    /// Returns how many values were discarded.
    pub fn cancel(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.cooldown_until = None;
        dropped
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(150);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Drive the throttle the way a timer would: jump to each deadline and
    /// poll, recording (time, value) for every release.
    fn drain(throttle: &mut Throttle<&'static str>, start: Instant) -> Vec<(Instant, &'static str)> {
        let mut released = Vec::new();
        let mut now = start;
        while let Some(deadline) = throttle.deadline() {
            now = deadline.max(now);
            match throttle.poll(now) {
                Some(v) => released.push((now, v)),
                None if throttle.is_empty() => break,
                None => {}
            }
        }
        released
    }

    #[test]
    fn first_push_in_idle_period_delivers_immediately() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        assert_eq!(throttle.push("a", t0), Some("a"));
        assert_eq!(throttle.deadline(), Some(t0 + INTERVAL));
    }

    #[test]
    fn pushes_during_cooldown_queue_in_order() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        assert_eq!(throttle.push("a", t0), Some("a"));
        assert_eq!(throttle.push("b", t0), None);
        assert_eq!(throttle.push("c", t0 + ms(10)), None);
        assert_eq!(throttle.len(), 2);

        assert_eq!(throttle.poll(t0 + ms(100)), None);
        assert_eq!(throttle.poll(t0 + ms(150)), Some("b"));
        assert_eq!(throttle.poll(t0 + ms(200)), None);
        assert_eq!(throttle.poll(t0 + ms(300)), Some("c"));
        assert!(throttle.is_empty());
    }

    #[test]
    fn back_to_back_writes_are_spaced_by_interval() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        let mut released = Vec::new();
        for v in ["one", "two", "three"] {
            if let Some(v) = throttle.push(v, t0) {
                released.push((t0, v));
            }
        }
        released.extend(drain(&mut throttle, t0));

        let values: Vec<_> = released.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec!["one", "two", "three"], "nothing lost or reordered");
        for pair in released.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= INTERVAL);
        }
    }

    #[test]
    fn late_poll_restarts_cooldown_from_now() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        throttle.push("a", t0);
        throttle.push("b", t0);

        let late = t0 + ms(400);
        assert_eq!(throttle.poll(late), Some("b"));
        assert_eq!(throttle.deadline(), Some(late + INTERVAL));
    }

    #[test]
    fn cooldown_expires_when_nothing_is_queued() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        throttle.push("a", t0);
        assert_eq!(throttle.poll(t0 + INTERVAL), None);
        assert_eq!(throttle.deadline(), None);
        assert_eq!(throttle.push("b", t0 + INTERVAL), Some("b"));
    }

    #[test]
    fn cancel_drops_queue_and_cooldown() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(INTERVAL);
        throttle.push("a", t0);
        throttle.push("b", t0);
        throttle.push("c", t0);

        assert_eq!(throttle.cancel(), 2);
        assert_eq!(throttle.deadline(), None);
        assert_eq!(throttle.poll(t0 + ms(1_000)), None);
        // Idle again: the next push goes straight through.
        assert_eq!(throttle.push("d", t0 + ms(1)), Some("d"));
    }

    #[test]
    fn zero_interval_disables_throttling() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(Duration::ZERO);
        assert_eq!(throttle.push("a", t0), Some("a"));
        assert_eq!(throttle.push("b", t0), Some("b"));
        assert_eq!(throttle.deadline(), None);
    }

    #[test]
    fn oversized_interval_saturates() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(Duration::MAX);
        assert_eq!(throttle.push("a", t0), Some("a"));
        assert_eq!(throttle.deadline(), Some(t0 + crate::clock::FAR_FUTURE));
        assert_eq!(throttle.push("b", t0 + ms(1)), None);
    }
}
