/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! live-region – announcement scheduler for assistive technology
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── clock/      – overflow-free deadline arithmetic
//! ├── order/      – three-valued comparison result
//! ├── heap/       – min-heap with arbitrary delete
//! ├── deferred/   – single-shot settable future
//! ├── throttle/   – minimum spacing between sink writes
//! ├── message/    – politeness, due time, queue ordering
//! ├── text/       – text extraction from UI elements
//! ├── region/     – the scheduler state machine, sinks, errors
//! ├── service/    – tokio actor driving a region
//! └── config/     – YAML deployment profiles
//! ```

pub mod clock;
pub mod config;
pub mod deferred;
pub mod heap;
pub mod message;
pub mod order;
pub mod region;
pub mod service;
pub mod text;
pub mod throttle;

pub use message::{AnnounceOptions, Outcome, Politeness};
pub use region::{AnnounceError, Announcement, CancelHandle, LiveRegion, RegionState, Sink, SinkError};
pub use service::Announcer;
