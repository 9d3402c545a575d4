/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Output surfaces observed by assistive technology.
//!
//! The region owns its sink and only ever calls into it; a sink never holds
//! region state.

use std::io::Write;

use crate::message::Politeness;

use super::error::SinkError;

/// One text surface per politeness class.
pub trait Sink {
    /// Text currently displayed on the `politeness` surface.
    fn contents(&self, politeness: Politeness) -> Result<String, SinkError>;

    /// Replace the text on the `politeness` surface.
    fn write(&mut self, politeness: Politeness, text: &str) -> Result<(), SinkError>;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn contents(&self, politeness: Politeness) -> Result<String, SinkError> {
        (**self).contents(politeness)
    }

    fn write(&mut self, politeness: Politeness, text: &str) -> Result<(), SinkError> {
        (**self).write(politeness, text)
    }
}

// ── In-memory surfaces ────────────────────────────────────────────────────────

/// Plain in-memory pair of surfaces: the `polite` and `assertive` containers.
///
/// A surface that is `None` is missing, and reading or writing it fails with
/// [`SinkError::MissingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surfaces {
    polite: Option<String>,
    assertive: Option<String>,
}

impl Default for Surfaces {
    fn default() -> Self {
        Self::new()
    }
}

impl Surfaces {
    /// Both surfaces present and empty.
    pub fn new() -> Self {
        Self {
            polite: Some(String::new()),
            assertive: Some(String::new()),
        }
    }

    /// Only the `politeness` surface is present.
    pub fn with_only(politeness: Politeness) -> Self {
        let mut surfaces = Self {
            polite: None,
            assertive: None,
        };
        *surfaces.slot_mut(politeness) = Some(String::new());
        surfaces
    }

    fn slot(&self, politeness: Politeness) -> &Option<String> {
        match politeness {
            Politeness::Polite => &self.polite,
            Politeness::Assertive => &self.assertive,
        }
    }

    fn slot_mut(&mut self, politeness: Politeness) -> &mut Option<String> {
        match politeness {
            Politeness::Polite => &mut self.polite,
            Politeness::Assertive => &mut self.assertive,
        }
    }
}

impl Sink for Surfaces {
    fn contents(&self, politeness: Politeness) -> Result<String, SinkError> {
        self.slot(politeness)
            .clone()
            .ok_or(SinkError::MissingSurface { politeness })
    }

    fn write(&mut self, politeness: Politeness, text: &str) -> Result<(), SinkError> {
        let surface = self
            .slot_mut(politeness)
            .as_mut()
            .ok_or(SinkError::MissingSurface { politeness })?;
        surface.clear();
        surface.push_str(text);
        Ok(())
    }
}

// ── Console sink ──────────────────────────────────────────────────────────────

/// Mirrors every surface write as a line on `out` (`[polite] text`), while
/// keeping the current contents in [`Surfaces`].
///
/// Used by the `live-region` binary with `stdout`.
#[derive(Debug)]
pub struct ConsoleSink<W> {
    out: W,
    surfaces: Surfaces,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            surfaces: Surfaces::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for ConsoleSink<W> {
    fn contents(&self, politeness: Politeness) -> Result<String, SinkError> {
        self.surfaces.contents(politeness)
    }

    fn write(&mut self, politeness: Politeness, text: &str) -> Result<(), SinkError> {
        writeln!(self.out, "[{politeness}] {text}")
            .and_then(|()| self.out.flush())
            .map_err(|e| SinkError::Write {
                politeness,
                reason: e.to_string(),
            })?;
        self.surfaces.write(politeness, text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
