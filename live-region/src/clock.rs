/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Deadline arithmetic on `tokio::time::Instant` that never panics.
//!
//! `Instant + Duration` panics on overflow, and delays come from callers
//! and config files.  Every deadline in the crate goes through
//! [`deadline_after`], which saturates at [`FAR_FUTURE`].

use std::time::Duration;

use tokio::time::Instant;

/// Longest delay honoured (about thirty years, tokio's own horizon for a
/// timer that never fires).  Longer delays are clamped to it.
pub const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + delay`, clamped to `now + FAR_FUTURE`.
pub fn deadline_after(now: Instant, delay: Duration) -> Instant {
    let delay = delay.min(FAR_FUTURE);
    // Only an `Instant` within thirty years of the clock's end misses here.
    now.checked_add(delay).unwrap_or(now)
}
