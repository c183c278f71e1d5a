// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=pageflip_core --heading-base-level=0

//! Pageflip Core: renderer-agnostic page-flip mechanics.
//!
//! This crate provides the pure, per-frame math behind a page-flip
//! ("book page turn") navigation surface. It knows nothing about widgets,
//! canvases, or any particular UI framework; host frameworks own the actual
//! page views and feed a scalar *flip distance* in, getting frame
//! descriptors out.
//!
//! The core concepts are:
//!
//! - [`distance`]: mapping between the continuous flip distance and page
//!   indices / rotation angles. One page of travel is
//!   [`FLIP_DISTANCE_PER_PAGE`] units and corresponds to a 180° turn.
//! - [`overflip`]: pluggable resistance applied when the distance is pushed
//!   past the first or last page, with an optional glow indicator.
//! - [`recycler`]: a small object pool for retired page view handles, keyed
//!   by view type.
//! - [`cascade`]: window bounds and draw-order resolution for the
//!   multi-page fan-out mode, where several pages are mid-turn at once.
//! - [`render`]: assembly of the above into an ordered list of draw
//!   commands for a frame.
//!
//! ## Minimal example
//!
//! ```rust
//! use pageflip_core::distance::{degrees_flipped, page_index_round};
//! use pageflip_core::FLIP_DISTANCE_PER_PAGE;
//!
//! // Half way between page 2 and page 3.
//! let d = 2.5 * FLIP_DISTANCE_PER_PAGE;
//!
//! // The active leaf is 90° into its turn; rounding lands on page 3.
//! assert_eq!(degrees_flipped(d), 90.0);
//! assert_eq!(page_index_round(d), 3);
//! ```
//!
//! Distances are expected to be finite. Hosts typically clamp incoming
//! gesture deltas before handing them to this crate; see the
//! `pageflip_engine` crate for a full controller that does so.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod cascade;
pub mod distance;
pub mod overflip;
pub mod recycler;
pub mod render;

mod math;

pub use distance::{FLIP_DISTANCE_PER_PAGE, SETTLE_EPSILON};

/// The axis along which pages turn.
///
/// A vertical flip rotates leaves around the horizontal center line (the
/// calendar/notepad look); a horizontal flip rotates around the vertical
/// center line (the book look).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum FlipAxis {
    /// Pages turn top-over-bottom; gestures travel along Y.
    #[default]
    Vertical,
    /// Pages turn left-over-right; gestures travel along X.
    Horizontal,
}
