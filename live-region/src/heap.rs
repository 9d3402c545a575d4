/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Binary min-heap keyed by a pluggable comparator.
//!
//! Unlike `std::collections::BinaryHeap`, [`MinHeap`] supports removing an
//! an arbitrary element by identity ([`delete_by`](MinHeap::delete_by)),
//! which the announcement queue needs for cancellation.
//!
//! The heap is not stable on its own: elements that compare
//! [`Order::Equal`] come out in an unspecified order.  Callers that need
//! FIFO among equals add an insertion sequence as the final comparator key
//! (the region queue does exactly that with the message id).
//!
//! | Operation | Cost |
//! |---|---|
//! | `insert` | O(log n) |
//! | `pop` | O(log n) |
//! | `peek` | O(1) |
//! | `delete_by` | O(n) search + O(log n) repair |
//! | `clear` | O(n) drop |

use crate::order::Order;

/// Min-heap ordered by `compare`: the root is the element for which no other
/// element compares [`Order::Less`].
pub struct MinHeap<T, F> {
    compare: F,
    items: Vec<T>,
}

impl<T, F> MinHeap<T, F>
where
    F: Fn(&T, &T) -> Order,
{
    pub fn new(compare: F) -> Self {
        Self {
            compare,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates the elements in heap-array order (not sorted).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Append `item` and sift it up to its place.
    pub fn insert(&mut self, item: T) {
        self.items.push(item);
        let last = self.items.len() - 1;
        self.sift_up(last);
    }

    /// The minimum element, or `None` when the heap is empty.
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// Remove and return the minimum element.  `None` signals "no work", not
    /// an error.
    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let item = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        Some(item)
    }

    /// Remove the first element matching `predicate`.
    ///
    /// Returns the removed element, or `None` if nothing matched.  A miss is
    /// not an error: cancellation may race a pop that already took the item.
    pub fn delete_by<P>(&mut self, predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        let index = self.items.iter().position(predicate)?;
        let removed = self.items.swap_remove(index);

        // The former last element now sits at `index` and may violate heap
        // order in either direction.
        if index < self.items.len() {
            self.sift_down(index);
            self.sift_up(index);
        }
        Some(removed)
    }

    /// Drop every element.  Nothing held by the elements is settled or
    /// notified.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    // ── Heap repair ───────────────────────────────────────────────────────────

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !(self.compare)(&self.items[parent], &self.items[index]).is_greater() {
                break;
            }
            self.items.swap(parent, index);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut smaller = left;
            if right < len && (self.compare)(&self.items[right], &self.items[left]).is_less() {
                smaller = right;
            }
            if !(self.compare)(&self.items[index], &self.items[smaller]).is_greater() {
                break;
            }
            self.items.swap(index, smaller);
            index = smaller;
        }
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for MinHeap<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinHeap")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
