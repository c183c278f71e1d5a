// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outbound listener events.
//!
//! The engine never calls back into the host mid-mutation. Everything a
//! listener would want to hear is queued here while state is committed
//! and drained by the host after each tick, preserving the
//! notify-after-commit ordering guarantee.

use pageflip_core::overflip::OverFlipMode;
use smallvec::SmallVec;

/// Something a host listener may care about, in emission order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlipEvent {
    /// Settling completed on a page that differs from the last settled
    /// one.
    FlippedToPage {
        /// The settled page index.
        page: usize,
        /// The adapter's stable id for that page, or `0` past the end.
        item_id: i64,
    },
    /// The flip distance was committed.
    DistanceChanged {
        /// The committed distance.
        distance: f64,
    },
    /// An overflip update, including the terminal magnitude-zero
    /// notifications for both boundaries when the overflip ends.
    OverFlip {
        /// Active overflip mode.
        mode: OverFlipMode,
        /// `true` when the first-page boundary is the one overflowed.
        previous_boundary: bool,
        /// Magnitude of the attempted excess, `>= 0`.
        magnitude: f64,
        /// The per-page distance constant, for normalization.
        per_page: f64,
    },
    /// The dataset transitioned between empty and non-empty.
    EmptyChanged {
        /// `true` when no adapter is attached or it has no items.
        empty: bool,
    },
}

/// FIFO queue of pending [`FlipEvent`]s.
#[derive(Clone, Debug, Default)]
pub(crate) struct EventQueue {
    events: SmallVec<[FlipEvent; 8]>,
}

impl EventQueue {
    pub(crate) fn push(&mut self, event: FlipEvent) {
        self.events.push(event);
    }

    pub(crate) fn take(&mut self) -> SmallVec<[FlipEvent; 8]> {
        core::mem::take(&mut self.events)
    }
}
