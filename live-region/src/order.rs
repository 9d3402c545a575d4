/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Three-valued comparison result used by every ordered structure in the
//! crate.
//!
//! Comparators return an [`Order`] rather than a `bool` or a subtracted
//! number, so multi-key rules ("politeness first, then due time, then
//! arrival") read as a short chain of [`Order::then_with`] calls.

use std::cmp::Ordering;

/// Result of comparing two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    Less,
    Equal,
    Greater,
}

impl Order {
    /// Returns `self` unless it is [`Order::Equal`], in which case `other`.
    pub fn then(self, other: Order) -> Order {
        match self {
            Order::Equal => other,
            decided => decided,
        }
    }

    /// Lazy form of [`then`](Self::then): `f` only runs on a tie.
    pub fn then_with<F: FnOnce() -> Order>(self, f: F) -> Order {
        match self {
            Order::Equal => f(),
            decided => decided,
        }
    }

    /// Swaps `Less` and `Greater`.
    pub fn reverse(self) -> Order {
        match self {
            Order::Less => Order::Greater,
            Order::Equal => Order::Equal,
            Order::Greater => Order::Less,
        }
    }

    pub fn is_less(self) -> bool {
        self == Order::Less
    }

    pub fn is_greater(self) -> bool {
        self == Order::Greater
    }
}

impl From<Ordering> for Order {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Order::Less,
            Ordering::Equal => Order::Equal,
            Ordering::Greater => Order::Greater,
        }
    }
}

/// Natural-order comparator for any totally ordered type.
pub fn compare<T: Ord + ?Sized>(a: &T, b: &T) -> Order {
    a.cmp(b).into()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
