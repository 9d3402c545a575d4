/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Single-shot settable future.
//!
//! A [`Deferred`] is handed out before anyone knows when (or whether) the
//! work it represents will finish.  The settle side keeps the `Deferred`;
//! waiters hold [`Completion`]s obtained from
//! [`Deferred::completion`].
//!
//! ```text
//!   Deferred ──resolve/reject (first call wins)──► watch slot ──► Completion::wait()
//! ```
//!
//! A settler that has to do work before it settles (write to a sink, say)
//! first takes a [`Claim`].  While a claim is held, `resolve` and `reject`
//! from anyone else fail, so the work and its settlement cannot be split by
//! a concurrent cancel.
//!
//! The slot is a `tokio::sync::watch` channel, so settling works without a
//! running runtime (the synchronous region uses it from plain tests) while
//! waiters can still `.await` it.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug)]
enum Slot<T, E> {
    Pending,
    Claimed,
    Settled(Result<T, E>),
}

impl<T, E> Slot<T, E> {
    fn is_settled(&self) -> bool {
        matches!(self, Slot::Settled(_))
    }
}

/// Settle side of a single-shot future.  Cloning shares the same slot.
#[derive(Debug)]
pub struct Deferred<T, E> {
    slot: Arc<watch::Sender<Slot<T, E>>>,
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T, E> Default for Deferred<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Deferred<T, E> {
    /// Creates an unsettled deferred.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Slot::Pending);
        Self { slot: Arc::new(tx) }
    }

    /// Settles with `Ok(value)`.  Returns `true` if this call settled it,
    /// `false` if it was already settled or is claimed.
    pub fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value), false)
    }

    /// Settles with `Err(error)`.  Same rules as [`resolve`](Self::resolve).
    pub fn reject(&self, error: E) -> bool {
        self.settle(Err(error), false)
    }

    /// Reserve the right to settle.  `None` if already settled or claimed.
    ///
    /// Dropping the claim without settling makes the deferred pending again.
    pub fn claim(&self) -> Option<Claim<T, E>> {
        let claimed = self.slot.send_if_modified(|slot| match slot {
            Slot::Pending => {
                *slot = Slot::Claimed;
                true
            }
            _ => false,
        });
        claimed.then(|| Claim {
            deferred: self.clone(),
            settled: false,
        })
    }

    pub fn is_settled(&self) -> bool {
        self.slot.borrow().is_settled()
    }

    /// A new waiter on this deferred.
    pub fn completion(&self) -> Completion<T, E> {
        Completion {
            slot: self.slot.subscribe(),
        }
    }

    fn settle(&self, result: Result<T, E>, claimed: bool) -> bool {
        let mut result = Some(result);
        self.slot.send_if_modified(|slot| {
            let open = match slot {
                Slot::Pending => !claimed,
                Slot::Claimed => claimed,
                Slot::Settled(_) => false,
            };
            match result.take() {
                Some(result) if open => {
                    *slot = Slot::Settled(result);
                    true
                }
                _ => false,
            }
        })
    }
}

/// Exclusive right to settle a [`Deferred`], from [`Deferred::claim`].
#[must_use = "dropping a claim releases it without settling"]
#[derive(Debug)]
pub struct Claim<T, E> {
    deferred: Deferred<T, E>,
    settled: bool,
}

impl<T, E> Claim<T, E> {
    pub fn resolve(mut self, value: T) {
        self.settled = self.deferred.settle(Ok(value), true);
    }

    pub fn reject(mut self, error: E) {
        self.settled = self.deferred.settle(Err(error), true);
    }
}

impl<T, E> Drop for Claim<T, E> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.deferred.slot.send_if_modified(|slot| match slot {
            Slot::Claimed => {
                *slot = Slot::Pending;
                true
            }
            _ => false,
        });
    }
}

/// Await side of a [`Deferred`].  Any number of clones may wait.
#[derive(Debug)]
pub struct Completion<T, E> {
    slot: watch::Receiver<Slot<T, E>>,
}

impl<T, E> Clone for Completion<T, E> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T: Clone, E: Clone> Completion<T, E> {
    /// Waits for the settlement.
    ///
    /// Returns `None` if every [`Deferred`] sharing the slot was dropped
    /// without settling, i.e. the work was abandoned.
    pub async fn wait(&self) -> Option<Result<T, E>> {
        let mut slot = self.slot.clone();
        if let Ok(settled) = slot.wait_for(Slot::is_settled).await {
            if let Slot::Settled(result) = &*settled {
                return Some(result.clone());
            }
        }
        // Sender gone: only a value stored before the drop can exist.
        self.try_get()
    }

    /// The settlement if it has already happened.
    pub fn try_get(&self) -> Option<Result<T, E>> {
        match &*self.slot.borrow() {
            Slot::Settled(result) => Some(result.clone()),
            _ => None,
        }
    }
}

impl<T, E> Completion<T, E> {
    pub fn is_settled(&self) -> bool {
        self.slot.borrow().is_settled()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
