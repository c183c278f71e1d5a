// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping between flip distance, page indices, and rotation angles.
//!
//! The flip distance is a continuous scalar over the whole dataset:
//! [`FLIP_DISTANCE_PER_PAGE`] units of travel turn one leaf by 180°, so
//! page `p` rests at distance `p * 180`. Everything here is a pure
//! function of its inputs.
//!
//! The three index mappings differ only in their rounding and exist
//! because fling resolution picks different targets under different
//! velocity regimes: a fast forward fling floors, a fast backward fling
//! ceils, and a slow release rounds to the nearest page.

use crate::math;

/// Distance units corresponding to one full page turn (180°).
pub const FLIP_DISTANCE_PER_PAGE: f64 = 180.0;

/// Tolerance for treating a distance as resting exactly on a page.
pub const SETTLE_EPSILON: f64 = 0.1;

/// Returns the page index nearest to `distance`, rounding half-up.
#[must_use]
pub fn page_index_round(distance: f64) -> isize {
    math::round(distance / FLIP_DISTANCE_PER_PAGE) as isize
}

/// Returns the page index at or before `distance`.
#[must_use]
pub fn page_index_floor(distance: f64) -> isize {
    math::floor(distance / FLIP_DISTANCE_PER_PAGE) as isize
}

/// Returns the page index at or after `distance`.
#[must_use]
pub fn page_index_ceil(distance: f64) -> isize {
    math::ceil(distance / FLIP_DISTANCE_PER_PAGE) as isize
}

/// Returns the resting distance for `page`.
#[must_use]
pub fn distance_for_page(page: usize) -> f64 {
    page as f64 * FLIP_DISTANCE_PER_PAGE
}

/// Returns how far the active leaf has turned, in degrees within
/// `[0, 180)`.
///
/// The residue is always non-negative regardless of the direction of
/// travel, so `degrees_flipped(-10.0) == 170.0`. This single formula
/// drives every rotation and shading computation downstream.
#[must_use]
pub fn degrees_flipped(distance: f64) -> f64 {
    let mut local = distance % FLIP_DISTANCE_PER_PAGE;
    if local < 0.0 {
        local += FLIP_DISTANCE_PER_PAGE;
    }
    local
}

/// Returns `true` if `distance` rests on a page boundary within
/// [`SETTLE_EPSILON`].
#[must_use]
pub fn is_settled(distance: f64) -> bool {
    let local = degrees_flipped(distance);
    local < SETTLE_EPSILON || FLIP_DISTANCE_PER_PAGE - local < SETTLE_EPSILON
}
