//! The announcement scheduler.
//!
//! [`LiveRegion`] owns a priority queue of pending [`Message`]s, a
//! [`Throttle`] that spaces surface writes, and the [`Sink`] it writes to.
//! It is an explicit state machine with one reentrant step,
//! [`perform_work`](LiveRegion::perform_work), and never reads the clock
//! itself: every call takes `now`, and [`next_wakeup`](LiveRegion::next_wakeup)
//! tells the driver when to step again.  The async
//! [`Announcer`](crate::service::Announcer) is one such driver; tests are
//! another, with a hand-advanced virtual clock.
//!
//! # States
//!
//! ```text
//!            announce / timer
//!   Idle ───────────────────────► perform_work ──due──► Delivering { until: cooldown end }
//!    ▲                               │    ▲                   │
//!    │ queue empty                   │    └───── timer ───────┘
//!    └───────────────────────────────┤
//!                                    └─not yet due─► Waiting { until: due time }
//! ```
//!
//! | Topic | Behaviour |
//! |---|---|
//! | Priority | assertive before polite regardless of due time, then due time, then arrival |
//! | Pre-emption | a message already written is never pre-empted; a new assertive message goes next |
//! | Repeats | identical consecutive text gets a trailing U+00A0 so the surface still changes |
//! | Cancel | resolves the completion as `Canceled`; the queue entry is removed on the next step; fails once the write has started |
//! | Clear | abandons everything: queued completions are never settled |
//! | Sink failure | rejects that message and clears the cooldown; `announce` returns the error only for its own message; no retry |

pub mod error;
pub mod sink;

pub use error::{AnnounceError, SinkError};
pub use sink::{ConsoleSink, Sink, Surfaces};

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::clock::deadline_after;
use crate::config::Profile;
use crate::deferred::{Claim, Completion, Deferred};
use crate::heap::MinHeap;
use crate::message::{queue_order, AnnounceOptions, Message, MessageId, Outcome, Politeness};
use crate::order::Order;
use crate::text::{extract_text, TextSource};
use crate::throttle::Throttle;

/// Appended to a message whose text equals what the surface already shows.
/// Some assistive technology only reacts to a content change.
pub const REPEAT_MARKER: char = '\u{00A0}';

type MessageQueue = MinHeap<Message, fn(&Message, &Message) -> Order>;

// ── State ─────────────────────────────────────────────────────────────────────

/// Where the scheduler is in its work loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionState {
    /// Nothing to do until the next `announce`.
    Idle,
    /// The head of the queue becomes deliverable at `until`.
    Waiting { until: Instant },
    /// A message was just written; nothing else may be written before `until`.
    Delivering { until: Instant },
}

// ── Announcement handles ──────────────────────────────────────────────────────

/// Cancels one announcement.  Cheap to clone and `Send + Sync`.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    id: MessageId,
    deferred: Deferred<Outcome, AnnounceError>,
    canceled: mpsc::UnboundedSender<MessageId>,
}

impl CancelHandle {
    /// Cancel the announcement if it has not fired yet.
    ///
    /// Resolves the completion with [`Outcome::Canceled`] and asks the
    /// region to drop the queue entry.  Returns `false` (and changes
    /// nothing) if the completion was already settled or the message is
    /// being written right now.
    pub fn cancel(&self) -> bool {
        if !self.deferred.resolve(Outcome::Canceled) {
            return false;
        }
        // The region may already be gone; the completion is settled anyway.
        let _ = self.canceled.send(self.id);
        debug!(id = self.id, "announcement canceled");
        true
    }
}

/// What `announce` hands back: a waiter and a canceler for one message.
#[derive(Debug, Clone)]
pub struct Announcement {
    pub completion: Completion<Outcome, AnnounceError>,
    pub cancel: CancelHandle,
}

impl Announcement {
    pub fn id(&self) -> MessageId {
        self.cancel.id
    }
}

// ── LiveRegion ────────────────────────────────────────────────────────────────

/// Priority-ordered, throttled announcer writing to one [`Sink`].
pub struct LiveRegion<S> {
    sink: S,
    queue: MessageQueue,
    throttle: Throttle<Message>,
    state: RegionState,
    /// Nothing is written before this instant (register delay).
    ready_at: Option<Instant>,
    next_id: MessageId,
    cancel_tx: mpsc::UnboundedSender<MessageId>,
    cancel_rx: mpsc::UnboundedReceiver<MessageId>,
}

impl<S: Sink> LiveRegion<S> {
    /// Create a region created at `now`, timed by `profile`.
    pub fn new(sink: S, profile: &Profile, now: Instant) -> Self {
        let (cancel_tx, cancel_rx) = mpsc::unbounded_channel();
        let register_delay = profile.register_delay();

        debug!(
            profile = %profile.name,
            min_interval_ms = profile.min_interval_ms,
            register_delay_ms = profile.register_delay_ms,
            "live region created"
        );

        Self {
            sink,
            queue: MinHeap::new(queue_order as fn(&Message, &Message) -> Order),
            throttle: Throttle::new(profile.min_interval()),
            state: RegionState::Idle,
            ready_at: (!register_delay.is_zero()).then(|| deadline_after(now, register_delay)),
            next_id: 1,
            cancel_tx,
            cancel_rx,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Queue `text` for announcement and run the work loop.
    ///
    /// Empty text queues nothing and returns an announcement already
    /// resolved with [`Outcome::Skipped`].
    ///
    /// # Errors
    /// Returns the [`AnnounceError`] when this message is written right away
    /// and the write fails (e.g. a missing surface).  Failures of other
    /// messages delivered during the same step are only logged; their own
    /// completions carry the error.  The region stays consistent either way.
    pub fn announce(
        &mut self,
        text: &str,
        options: AnnounceOptions,
        now: Instant,
    ) -> Result<Announcement, AnnounceError> {
        let id = self.next_id;
        self.next_id += 1;

        if text.is_empty() {
            debug!(id, "nothing to announce, skipping");
            let deferred = Deferred::new();
            deferred.resolve(Outcome::Skipped);
            return Ok(self.announcement(id, deferred));
        }

        let message = Message::new(id, text, &options, now);
        let announcement = self.announcement(id, message.deferred().clone());

        debug!(
            id,
            politeness = %message.politeness(),
            due = ?message.due_at(),
            queued = self.queue.len(),
            "announcement queued"
        );

        self.queue.insert(message);

        // Every failed step drops the failing message, so this terminates.
        loop {
            match self.perform_work(now) {
                Ok(()) => return Ok(announcement),
                Err(e) if matches!(announcement.completion.try_get(), Some(Err(_))) => return Err(e),
                Err(e) => warn!(id, error = %e, "another announcement failed while queuing this one"),
            }
        }
    }

    /// Announce the text extracted from `source` (see
    /// [`extract_text`]).
    pub fn announce_from_element<T: TextSource + ?Sized>(
        &mut self,
        source: &T,
        options: AnnounceOptions,
        now: Instant,
    ) -> Result<Announcement, AnnounceError> {
        let text = extract_text(source);
        self.announce(&text, options, now)
    }

    /// One step of the work loop at time `now`.
    ///
    /// Delivers every message that is due and allowed by the throttle, then
    /// settles into [`RegionState::Idle`], [`RegionState::Waiting`] or
    /// [`RegionState::Delivering`].
    pub fn perform_work(&mut self, now: Instant) -> Result<(), AnnounceError> {
        self.drain_cancellations();

        loop {
            // The throttle is only a cooldown gate: messages stay in the heap
            // until they can be written, so a later assertive one still goes
            // first.
            if self.throttle.is_cooling_down(now) {
                if let Some(until) = self.throttle.deadline() {
                    self.transition(RegionState::Delivering { until });
                    return Ok(());
                }
            }

            if let Some(ready_at) = self.ready_at {
                if ready_at > now {
                    let next = if self.queue.is_empty() {
                        RegionState::Idle
                    } else {
                        RegionState::Waiting { until: ready_at }
                    };
                    self.transition(next);
                    return Ok(());
                }
                self.ready_at = None;
            }

            let (settled, due_at) = match self.queue.peek() {
                Some(head) => (head.is_settled(), head.due_at()),
                None => {
                    self.transition(RegionState::Idle);
                    return Ok(());
                }
            };

            // Canceled after the last drain.
            if settled {
                self.queue.pop();
                continue;
            }

            if let Some(until) = due_at.pending_until(now) {
                self.transition(RegionState::Waiting { until });
                return Ok(());
            }

            let Some(message) = self.queue.pop() else {
                continue;
            };
            // From here on a concurrent cancel fails instead of racing the write.
            let Some(claim) = message.deferred().claim() else {
                debug!(id = message.id(), "announcement settled before delivery, skipped");
                continue;
            };
            if let Some(message) = self.throttle.push(message, now) {
                self.deliver(message, claim, now)?;
            }
        }
    }

    /// When the driver must call [`perform_work`](Self::perform_work) next.
    pub fn next_wakeup(&self) -> Option<Instant> {
        match self.state {
            RegionState::Idle => None,
            RegionState::Waiting { until } | RegionState::Delivering { until } => Some(until),
        }
    }

    /// Abandon all pending work.
    ///
    /// Queued messages are dropped without settling their completions: a
    /// caller still awaiting one is never told it was delivered or canceled.
    /// Use [`CancelHandle::cancel`] to withdraw a single message cleanly.
    pub fn clear(&mut self) {
        self.drain_cancellations();
        self.throttle.cancel();
        let abandoned = self.queue.len();
        self.queue.clear();
        self.transition(RegionState::Idle);

        if abandoned > 0 {
            warn!(abandoned, "live region cleared, pending announcements abandoned");
        } else {
            debug!("live region cleared");
        }
    }

    /// Text currently shown on the `politeness` surface.
    pub fn message(&self, politeness: Politeness) -> Result<String, SinkError> {
        self.sink.contents(politeness)
    }

    pub fn state(&self) -> RegionState {
        self.state
    }

    /// Messages still waiting to fire (canceled ones excluded).
    pub fn pending(&self) -> usize {
        self.queue.iter().filter(|m| !m.is_settled()).count()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn announcement(&self, id: MessageId, deferred: Deferred<Outcome, AnnounceError>) -> Announcement {
        Announcement {
            completion: deferred.completion(),
            cancel: CancelHandle {
                id,
                deferred,
                canceled: self.cancel_tx.clone(),
            },
        }
    }

    fn drain_cancellations(&mut self) {
        while let Ok(id) = self.cancel_rx.try_recv() {
            if self.queue.delete_by(|m| m.id() == id).is_some() {
                debug!(id, "canceled announcement removed from queue");
            }
        }
    }

    fn deliver(
        &mut self,
        message: Message,
        claim: Claim<Outcome, AnnounceError>,
        now: Instant,
    ) -> Result<(), AnnounceError> {
        match self.write_to_sink(&message) {
            Ok(()) => {
                claim.resolve(Outcome::Announced);
                info!(
                    id = message.id(),
                    politeness = %message.politeness(),
                    contents = message.contents(),
                    "announced"
                );
                Ok(())
            }
            Err(e) => {
                let err = AnnounceError::from(e);
                error!(id = message.id(), error = %err, "announcement failed");
                claim.reject(err.clone());

                // Not stuck delivering: drop the cooldown and step again now.
                self.throttle.cancel();
                let next = if self.queue.is_empty() {
                    RegionState::Idle
                } else {
                    RegionState::Waiting { until: now }
                };
                self.transition(next);
                Err(err)
            }
        }
    }

    fn write_to_sink(&mut self, message: &Message) -> Result<(), SinkError> {
        let politeness = message.politeness();
        let contents = message.contents();

        if self.sink.contents(politeness)? == contents {
            let marked = format!("{contents}{REPEAT_MARKER}");
            self.sink.write(politeness, &marked)
        } else {
            self.sink.write(politeness, contents)
        }
    }

    fn transition(&mut self, next: RegionState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "region state");
            self.state = next;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
