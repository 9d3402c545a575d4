/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the live region.
//!
//! Two error enums model the two failure layers:
//!
//! * [`SinkError`] - why a single surface could not be read or written
//!   (low-level, names the politeness surface involved).
//! * [`AnnounceError`] - top-level failure returned from
//!   [`LiveRegion::announce()`](super::LiveRegion::announce),
//!   [`LiveRegion::perform_work()`](super::LiveRegion::perform_work) and the
//!   async [`Announcer`](crate::service::Announcer).
//!
//! Both are `Clone`: one sink failure rejects the failing message's
//! completion *and* is returned to the caller that drove the step.
//!
//! Empty text, canceling a message that already fired and popping an empty
//! queue are not errors and have no variant here.

use thiserror::Error;

use crate::message::Politeness;

// ── Sink failures ─────────────────────────────────────────────────────────────

/// Failure reading or writing one politeness surface.
///
/// | Variant | Meaning |
/// |---|---|
/// | `MissingSurface` | structural misconfiguration, fatal to that delivery |
/// | `Write` | the backing output refused the text (e.g. closed stdout) |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The sink has no surface for this politeness level.
    #[error("unable to find container for message: expected a '{politeness}' surface")]
    MissingSurface { politeness: Politeness },

    /// Writing to the surface failed.
    #[error("failed to write '{politeness}' surface: {reason}")]
    Write {
        politeness: Politeness,
        reason: String,
    },
}

// ── Top-level announce errors ─────────────────────────────────────────────────

/// Top-level error type for announcing.
///
/// No variant is retried automatically: a misconfigured surface is not
/// expected to fix itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnounceError {
    /// The sink rejected a delivery.  The region has already cleared its
    /// cooldown and re-armed, so it is not left stuck delivering.
    #[error("delivery failed: {0}")]
    Sink(#[from] SinkError),

    /// The announcer task is gone (all handles were dropped or the task was
    /// aborted), so the request could not be queued.
    #[error("live region is closed: its announcer task has stopped")]
    RegionClosed,
}
