// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary to the host's page data.
//!
//! The engine never owns page content. A [`PageAdapter`] supplies item
//! count and identity and materializes view handles on demand; handles
//! are opaque to the engine, which only borrows them while a page is
//! live and returns retired ones through its recycler for the adapter to
//! rebind later.
//!
//! Change notification is explicit: hosts call
//! [`FlipEngine::dataset_changed`](crate::FlipEngine::dataset_changed)
//! when contents change in place and
//! [`FlipEngine::dataset_invalidated`](crate::FlipEngine::dataset_invalidated)
//! when the adapter itself is going away.

/// Supplies pages to a [`FlipEngine`](crate::FlipEngine).
pub trait PageAdapter {
    /// Opaque page view handle. Clones must refer to the same underlying
    /// view (an id, index, or reference-counted pointer).
    type Handle: Clone + PartialEq + core::fmt::Debug;

    /// Number of pages.
    fn len(&self) -> usize;

    /// Returns `true` when the dataset has no pages.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`item_id`](Self::item_id) values are stable across
    /// dataset changes. Stable ids let the engine keep the user on the
    /// same page when items are inserted or reordered.
    fn has_stable_ids(&self) -> bool {
        false
    }

    /// Identity of the page at `index`.
    fn item_id(&self, index: usize) -> i64 {
        index as i64
    }

    /// View-type tag of the page at `index`, in
    /// `[0, view_type_count())`.
    fn view_type(&self, index: usize) -> u32 {
        let _ = index;
        0
    }

    /// Number of distinct view types this adapter produces.
    fn view_type_count(&self) -> u32 {
        1
    }

    /// Produces a handle showing the page at `index`.
    ///
    /// `recycled` is a retired handle of the same view type, if the
    /// engine's pool had one; the adapter may rebind and return it, or
    /// ignore it and build a fresh handle.
    fn materialize(&mut self, index: usize, recycled: Option<Self::Handle>) -> Self::Handle;
}
