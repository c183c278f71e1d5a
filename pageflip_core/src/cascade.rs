// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-page fan-out geometry and draw-order resolution.
//!
//! In cascade mode a strip of `N` materialized views animates over a
//! *local* distance domain `[0, end_distance]`, with each successive view
//! starting its turn a fixed stagger [`CascadeStrip::offset`] after its
//! predecessor. Several leaves are mid-turn at once; this module decides
//! which slots to evaluate each frame and in which order their views must
//! be painted so the physically turning leaf always lands on top.
//!
//! Drawing a fan in plain index order shows seams: a leaf past the 90°
//! threshold visually belongs to the *other* side of the spine, so its
//! entry adopts the successor view and a drawing-order key reflected
//! through `N - 1 - i`. Sorting all evaluated entries descending by key
//! yields the correct overlap.
//!
//! Only slots inside the visible window
//! ([`CascadeStrip::prev_visible_index`] ..
//! [`CascadeStrip::next_visible_index`]) are evaluated, so per-frame cost
//! is bounded by `180 / offset` regardless of strip length.

use smallvec::SmallVec;

use crate::distance::{FLIP_DISTANCE_PER_PAGE, degrees_flipped};
use crate::math;

/// One view to paint this frame, with its clip side and local rotation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CascadeEntry {
    /// Index into the strip's view sequence of the view to paint.
    pub view_index: usize,
    /// The evaluated slot this entry came from.
    pub slot: usize,
    /// Local degrees flipped of the evaluated slot, in `[0, 180)`.
    pub degrees: f64,
    /// `true` to clip to the front (next) half, `false` for the back
    /// (previous) half.
    pub front_half: bool,
    /// Sort key; entries paint in descending key order, so lower keys
    /// land later and nearer the viewer.
    pub drawing_order: usize,
}

/// Geometry of a cascade strip: `len` views staggered by `offset` units.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CascadeStrip {
    len: usize,
    offset: f64,
}

impl CascadeStrip {
    /// Creates a strip over `len` views with a per-index stagger of
    /// `offset` distance units.
    #[must_use]
    pub fn new(len: usize, offset: f64) -> Self {
        debug_assert!(offset > 0.0, "cascade offset must be positive");
        Self { len, offset }
    }

    /// Number of views in the strip.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for an empty strip.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Per-index stagger in distance units.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// The local distance at which the last view rests flat.
    ///
    /// The final turning slot is `len - 2`; its turn starts at
    /// `offset * (len - 2)` and completes a full 180° later.
    #[must_use]
    pub fn end_distance(&self) -> f64 {
        if self.len < 2 {
            0.0
        } else {
            FLIP_DISTANCE_PER_PAGE + self.offset * (self.len - 2) as f64
        }
    }

    /// Local degrees flipped of slot `slot` at strip distance `distance`.
    #[must_use]
    pub fn degrees_for(&self, slot: usize, distance: f64) -> f64 {
        degrees_flipped(distance - slot as f64 * self.offset)
    }

    /// Index of the view backing the front (next) half at `distance`.
    #[must_use]
    pub fn next_visible_index(&self, distance: f64) -> usize {
        if self.len == 0 || distance == 0.0 {
            return 0;
        }
        let raw = math::floor(distance / self.offset) as isize + 1;
        raw.clamp(0, self.len as isize - 1) as usize
    }

    /// Index of the view backing the back (previous) half at `distance`.
    #[must_use]
    pub fn prev_visible_index(&self, distance: f64) -> usize {
        let turned = distance - FLIP_DISTANCE_PER_PAGE;
        if turned < 0.0 {
            return 0;
        }
        let raw = math::floor(turned / self.offset) as isize + 1;
        raw.clamp(0, self.len as isize - 1) as usize
    }

    /// Resolves the paint sequence for the turning slots at `distance`.
    ///
    /// Every slot in `[prev_visible_index, next_visible_index)` produces
    /// exactly one entry. The returned sequence is in paint order (first
    /// entry deepest): within each half, leaves closer to the
    /// perpendicular paint later, which is what keeps the fan's overlap
    /// seamless.
    #[must_use]
    pub fn draw_order(&self, distance: f64) -> SmallVec<[CascadeEntry; 8]> {
        let next = self.next_visible_index(distance);
        let prev = self.prev_visible_index(distance);

        let mut entries = SmallVec::new();
        for slot in (prev..next).rev() {
            let degrees = self.degrees_for(slot, distance);
            let entry = if degrees > 90.0 {
                // Past the perpendicular: the back of this leaf shows the
                // successor's face, stacked above the settled side.
                CascadeEntry {
                    view_index: slot + 1,
                    slot,
                    degrees,
                    front_half: false,
                    drawing_order: self.len - 1 - slot,
                }
            } else {
                CascadeEntry {
                    view_index: slot,
                    slot,
                    degrees,
                    front_half: true,
                    drawing_order: slot,
                }
            };
            entries.push(entry);
        }

        entries.sort_by(|a: &CascadeEntry, b: &CascadeEntry| b.drawing_order.cmp(&a.drawing_order));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_distance_for_two_views_is_one_turn() {
        let strip = CascadeStrip::new(2, 30.0);
        assert_eq!(strip.end_distance(), 180.0);
    }

    #[test]
    fn end_distance_grows_with_the_stagger() {
        let strip = CascadeStrip::new(10, 30.0);
        assert_eq!(strip.end_distance(), 180.0 + 30.0 * 8.0);
    }

    #[test]
    fn rest_positions_have_no_turning_slots() {
        let strip = CascadeStrip::new(5, 30.0);
        assert!(strip.draw_order(0.0).is_empty());
        assert_eq!(strip.next_visible_index(0.0), 0);
        assert_eq!(strip.prev_visible_index(0.0), 0);
    }

    #[test]
    fn window_bounds_mid_animation() {
        let strip = CascadeStrip::new(10, 30.0);
        // 200 units in: slot 6 just started, slots past 20/30 are done.
        assert_eq!(strip.next_visible_index(200.0), 7);
        assert_eq!(strip.prev_visible_index(200.0), 1);
    }

    #[test]
    fn every_window_slot_is_evaluated_exactly_once() {
        let strip = CascadeStrip::new(10, 30.0);
        for step in 0..40 {
            let d = step as f64 * (strip.end_distance() / 39.0);
            let entries = strip.draw_order(d);
            let prev = strip.prev_visible_index(d);
            let next = strip.next_visible_index(d);
            assert_eq!(entries.len(), next - prev, "window size at {d}");
            let mut slots: alloc::vec::Vec<usize> = entries.iter().map(|e| e.slot).collect();
            slots.sort_unstable();
            slots.dedup();
            assert_eq!(slots.len(), entries.len(), "duplicate slot at {d}");
            assert!(slots.iter().all(|&s| (prev..next).contains(&s)));
        }
    }

    #[test]
    fn entries_are_sorted_descending_by_order() {
        let strip = CascadeStrip::new(10, 30.0);
        let entries = strip.draw_order(200.0);
        for pair in entries.windows(2) {
            assert!(pair[0].drawing_order >= pair[1].drawing_order);
        }
    }

    #[test]
    fn slots_past_perpendicular_adopt_the_successor() {
        let strip = CascadeStrip::new(10, 30.0);
        let entries = strip.draw_order(200.0);

        // Slot 1 is 170° in; it paints view 2 on the back half with a
        // reflected order key, above the settled neighbors on that side.
        let back = entries
            .iter()
            .find(|e| e.slot == 1)
            .expect("slot 1 evaluated");
        assert_eq!(back.view_index, 2);
        assert!(!back.front_half);
        assert_eq!(back.drawing_order, 8);
        assert_eq!(back.degrees, 170.0);

        // Slot 6 is only 20° in; it paints itself on the front half.
        let front = entries
            .iter()
            .find(|e| e.slot == 6)
            .expect("slot 6 evaluated");
        assert_eq!(front.view_index, 6);
        assert!(front.front_half);
        assert_eq!(front.drawing_order, 6);
        assert_eq!(front.degrees, 20.0);
    }

    #[test]
    fn leaves_near_the_perpendicular_paint_last_within_each_half() {
        let strip = CascadeStrip::new(10, 30.0);
        for step in 1..40 {
            let d = step as f64 * (strip.end_distance() / 40.0);
            let entries = strip.draw_order(d);

            // Front half: later entries are further into their turn.
            let front: alloc::vec::Vec<f64> = entries
                .iter()
                .filter(|e| e.front_half)
                .map(|e| e.degrees)
                .collect();
            for pair in front.windows(2) {
                assert!(pair[0] <= pair[1], "front order broke at {d}");
            }

            // Back half: later entries are closer back down to 90°.
            let back: alloc::vec::Vec<f64> = entries
                .iter()
                .filter(|e| !e.front_half)
                .map(|e| e.degrees)
                .collect();
            for pair in back.windows(2) {
                assert!(pair[0] >= pair[1], "back order broke at {d}");
            }
        }
    }
}
