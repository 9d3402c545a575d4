/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Reading the user-facing text out of a UI element.

/// Anything that can expose the text an announcement should read out.
///
/// All methods default to `None`, so an implementor only provides what its
/// element model has.
pub trait TextSource {
    /// An explicit accessible label.  When present it always wins, even if
    /// it is empty.
    fn aria_label(&self) -> Option<&str> {
        None
    }

    /// Rendered text.
    fn inner_text(&self) -> Option<&str> {
        None
    }

    /// Raw text content.
    fn text_content(&self) -> Option<&str> {
        None
    }
}

/// The label if present, else the first non-empty of inner text and text
/// content, trimmed.  Empty string means there is nothing to announce.
pub fn extract_text<T: TextSource + ?Sized>(source: &T) -> String {
    let value = match source.aria_label() {
        Some(label) => label,
        None => source
            .inner_text()
            .filter(|text| !text.is_empty())
            .or_else(|| source.text_content())
            .unwrap_or_default(),
    };
    value.trim().to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
