/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Announcement data model.
//!
//! ```text
//! caller ──(text, AnnounceOptions)──►  Message  ──(queue order)──►  sink write
//!                                        │
//!                                        └── Deferred<Outcome> ──► Completion (caller)
//! ```
//!
//! # Ordering
//! [`compare_messages`] ranks by politeness first (assertive before polite,
//! whatever the due times), then by [`DueAt`].  Two messages with equal
//! politeness and due time compare [`Order::Equal`]; the region queue breaks
//! that tie with the message id so equal messages leave in arrival order.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tokio::time::Instant;

use crate::clock::deadline_after;
use crate::deferred::Deferred;
use crate::order::Order;
use crate::region::AnnounceError;

/// Identity of a message within one region.  Assigned in arrival order.
pub type MessageId = u64;

// ── Politeness ────────────────────────────────────────────────────────────────

/// Priority class of an announcement, named after the `aria-live` values
/// the two surfaces carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Politeness {
    /// Routine updates.  Queued behind assertive messages and may be delayed.
    #[default]
    Polite,
    /// Urgent updates.  Never delayed, always ahead of polite messages.
    Assertive,
}

impl Politeness {
    pub fn as_str(self) -> &'static str {
        match self {
            Politeness::Polite => "polite",
            Politeness::Assertive => "assertive",
        }
    }

    fn rank(self) -> u8 {
        match self {
            Politeness::Assertive => 0,
            Politeness::Polite => 1,
        }
    }
}

impl fmt::Display for Politeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Politeness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "polite" => Ok(Politeness::Polite),
            "assertive" => Ok(Politeness::Assertive),
            other => Err(format!(
                "unknown politeness '{other}' (valid: polite, assertive)"
            )),
        }
    }
}

// ── Due time ──────────────────────────────────────────────────────────────────

/// Earliest instant a message may reach the sink.
///
/// The derived ordering puts `Immediate` before every `At(_)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DueAt {
    Immediate,
    At(Instant),
}

impl DueAt {
    /// The instant still to wait for, or `None` if already due at `now`.
    pub fn pending_until(self, now: Instant) -> Option<Instant> {
        match self {
            DueAt::At(at) if at > now => Some(at),
            _ => None,
        }
    }
}

// ── Options ───────────────────────────────────────────────────────────────────

/// Per-call options for `announce`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnounceOptions {
    pub politeness: Politeness,
    /// Wait this long before the message becomes due.  Only honoured for
    /// [`Politeness::Polite`]; assertive messages ignore it.
    pub delay: Option<Duration>,
}

impl AnnounceOptions {
    pub fn polite() -> Self {
        Self::default()
    }

    pub fn assertive() -> Self {
        Self {
            politeness: Politeness::Assertive,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Resolve the due time for a message submitted at `now`.  Delays past
    /// [`FAR_FUTURE`](crate::clock::FAR_FUTURE) are clamped to it.
    pub fn due_at(&self, now: Instant) -> DueAt {
        match (self.politeness, self.delay) {
            (Politeness::Polite, Some(delay)) if !delay.is_zero() => DueAt::At(deadline_after(now, delay)),
            _ => DueAt::Immediate,
        }
    }
}

// ── Outcome ───────────────────────────────────────────────────────────────────

/// How an announcement's completion was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The text was written to its surface.
    Announced,
    /// The caller canceled before the message fired.
    Canceled,
    /// Nothing to announce (empty text); nothing was queued.
    Skipped,
}

// ── Message ───────────────────────────────────────────────────────────────────

/// One queued announcement.
///
/// `politeness` and `due_at` are fixed at creation; only queue membership
/// changes afterwards.  A message is dropped after it fires or is canceled
/// and is never reused.
#[derive(Debug)]
pub struct Message {
    id: MessageId,
    contents: String,
    politeness: Politeness,
    due_at: DueAt,
    deferred: Deferred<Outcome, AnnounceError>,
}

impl Message {
    pub fn new(
        id: MessageId,
        contents: impl Into<String>,
        options: &AnnounceOptions,
        now: Instant,
    ) -> Self {
        Self {
            id,
            contents: contents.into(),
            politeness: options.politeness,
            due_at: options.due_at(now),
            deferred: Deferred::new(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn politeness(&self) -> Politeness {
        self.politeness
    }

    pub fn due_at(&self) -> DueAt {
        self.due_at
    }

    pub fn deferred(&self) -> &Deferred<Outcome, AnnounceError> {
        &self.deferred
    }

    /// `true` once the completion is resolved or rejected; a settled message
    /// still in the queue was canceled and must not fire.
    pub fn is_settled(&self) -> bool {
        self.deferred.is_settled()
    }
}

/// Politeness first, then due time.  Equal politeness and due time compare
/// `Equal`.
pub fn compare_messages(a: &Message, b: &Message) -> Order {
    Order::from(a.politeness.rank().cmp(&b.politeness.rank()))
        .then_with(|| a.due_at.cmp(&b.due_at).into())
}

/// Queue order used by the region: [`compare_messages`] with arrival order
/// (message id) as the final key, making equal messages FIFO.
pub fn queue_order(a: &Message, b: &Message) -> Order {
    compare_messages(a, b).then_with(|| a.id.cmp(&b.id).into())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn polite_at(id: MessageId, now: Instant, delay: u64) -> Message {
        Message::new(id, "test", &AnnounceOptions::polite().with_delay(ms(delay)), now)
    }

    // ── compare_messages ──────────────────────────────────────────────────────

    #[test]
    fn same_politeness_same_due_time_is_equal() {
        let now = Instant::now();
        let a = polite_at(1, now, 10);
        let b = polite_at(2, now, 10);
        assert_eq!(compare_messages(&a, &b), Order::Equal);
    }

    #[test]
    fn same_politeness_earlier_due_time_is_less() {
        let now = Instant::now();
        let a = polite_at(1, now, 10);
        let b = polite_at(2, now, 1_000);
        assert_eq!(compare_messages(&a, &b), Order::Less);
        assert_eq!(compare_messages(&b, &a), Order::Greater);
    }

    #[test]
    fn assertive_beats_polite_regardless_of_due_time() {
        let now = Instant::now();
        let polite = Message::new(1, "p", &AnnounceOptions::polite(), now);
        let assertive = Message::new(2, "a", &AnnounceOptions::assertive(), now + ms(500));
        assert_eq!(compare_messages(&assertive, &polite), Order::Less);
        assert_eq!(compare_messages(&polite, &assertive), Order::Greater);
    }

    #[test]
    fn immediate_sorts_before_any_instant() {
        let now = Instant::now();
        let immediate = Message::new(2, "i", &AnnounceOptions::polite(), now + ms(900));
        let delayed = polite_at(1, now, 1);
        assert_eq!(compare_messages(&immediate, &delayed), Order::Less);
    }

    #[test]
    fn queue_order_breaks_ties_by_arrival() {
        let now = Instant::now();
        let first = Message::new(1, "x", &AnnounceOptions::polite(), now);
        let second = Message::new(2, "x", &AnnounceOptions::polite(), now);
        assert_eq!(compare_messages(&first, &second), Order::Equal);
        assert_eq!(queue_order(&first, &second), Order::Less);
        assert_eq!(queue_order(&second, &first), Order::Greater);
    }

    // ── AnnounceOptions ───────────────────────────────────────────────────────

    #[test]
    fn assertive_ignores_delay() {
        let now = Instant::now();
        let opts = AnnounceOptions::assertive().with_delay(ms(1_000));
        assert_eq!(opts.due_at(now), DueAt::Immediate);
    }

    #[test]
    fn zero_delay_is_immediate() {
        let now = Instant::now();
        assert_eq!(AnnounceOptions::polite().with_delay(Duration::ZERO).due_at(now), DueAt::Immediate);
        assert_eq!(AnnounceOptions::polite().due_at(now), DueAt::Immediate);
    }

    #[test]
    fn polite_delay_sets_instant() {
        let now = Instant::now();
        let due = AnnounceOptions::polite().with_delay(ms(250)).due_at(now);
        assert_eq!(due, DueAt::At(now + ms(250)));
        assert_eq!(due.pending_until(now), Some(now + ms(250)));
        assert_eq!(due.pending_until(now + ms(250)), None);
        assert_eq!(DueAt::Immediate.pending_until(now), None);
    }

    #[test]
    fn oversized_delay_is_clamped_not_overflowed() {
        let now = Instant::now();
        let due = AnnounceOptions::polite().with_delay(Duration::MAX).due_at(now);
        assert_eq!(due, DueAt::At(now + crate::clock::FAR_FUTURE));
    }

    // ── Politeness ────────────────────────────────────────────────────────────

    #[test]
    fn politeness_parses_and_displays() {
        assert_eq!("polite".parse::<Politeness>(), Ok(Politeness::Polite));
        assert_eq!("assertive".parse::<Politeness>(), Ok(Politeness::Assertive));
        assert!("loud".parse::<Politeness>().is_err());
        assert_eq!(Politeness::Assertive.to_string(), "assertive");
        assert_eq!(Politeness::default(), Politeness::Polite);
    }
}
