// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The three live page slots and their recycling round-trips.

use pageflip_core::recycler::Recycler;
use pageflip_core::render::PageWindow;

/// One materialized page.
#[derive(Clone, Debug)]
pub(crate) struct PageSlot<H> {
    pub(crate) handle: H,
    pub(crate) index: usize,
    pub(crate) view_type: u32,
}

/// The previous/current/next slots, each possibly empty at the dataset
/// edges.
#[derive(Clone, Debug)]
pub(crate) struct SlotSet<H> {
    pub(crate) previous: Option<PageSlot<H>>,
    pub(crate) current: Option<PageSlot<H>>,
    pub(crate) next: Option<PageSlot<H>>,
}

impl<H> Default for SlotSet<H> {
    fn default() -> Self {
        Self {
            previous: None,
            current: None,
            next: None,
        }
    }
}

impl<H: Clone> SlotSet<H> {
    /// Returns every live slot to the pool and empties the set.
    pub(crate) fn recycle_into(&mut self, recycler: &mut Recycler<H>) {
        for slot in [
            self.previous.take(),
            self.current.take(),
            self.next.take(),
        ]
        .into_iter()
        .flatten()
        {
            recycler.release(slot.handle, slot.index, slot.view_type);
        }
    }

    /// Drops every live slot without pooling, e.g. on adapter swap when
    /// the handles belong to the outgoing adapter.
    pub(crate) fn clear(&mut self) {
        self.previous = None;
        self.current = None;
        self.next = None;
    }

    /// Snapshot of the live handles for frame building.
    pub(crate) fn window(&self) -> PageWindow<H> {
        PageWindow {
            previous: self.previous.as_ref().map(|s| s.handle.clone()),
            current: self.current.as_ref().map(|s| s.handle.clone()),
            next: self.next.as_ref().map(|s| s.handle.clone()),
        }
    }
}
