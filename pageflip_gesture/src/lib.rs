// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=pageflip_gesture --heading-base-level=0

//! Pageflip Gesture: pointer interpretation for page-flip navigation.
//!
//! [`FlipGesture`] is a small state machine that turns a serial stream of
//! pointer events into flip-distance deltas and fling releases. It owns
//! no distance and talks to no adapter; the host engine feeds events in
//! and applies the returned [`GestureTransition`]s, in the same
//! events-in/transitions-out shape as the other interaction state
//! managers in this family.
//!
//! The machine distinguishes four phases:
//!
//! - *Idle*: no pointer tracked.
//! - *Axis undetermined*: a pointer is down but has not yet moved past
//!   the touch slop on either axis.
//! - *Flipping*: the flip axis won; every move becomes a distance delta
//!   and the machine claims the gesture exclusively
//!   ([`FlipGesture::claims_gesture`]).
//! - *Unable to flip*: the orthogonal axis won; events are ignored until
//!   every pointer lifts.
//!
//! Two details matter for feel and are easy to get wrong:
//!
//! - **Speed multiplier.** Near the leading edge a full page of visual
//!   travel corresponds to little physical travel, so at drag start the
//!   machine measures how much room the finger has toward that edge and
//!   scales deltas by it, keeping perceived speed consistent anywhere on
//!   the surface.
//! - **Multi-pointer handoff.** A second pointer going down re-anchors
//!   tracking to it; the tracked pointer lifting while others remain
//!   re-anchors to a survivor *without* re-running axis classification.
//!   A pointer id the machine has never seen resets tracking defensively
//!   instead of faulting.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Point;
//! use pageflip_core::FlipAxis;
//! use pageflip_gesture::{FlipGesture, GestureConfig, GestureTransition};
//!
//! let mut gesture = FlipGesture::new(FlipAxis::Vertical, GestureConfig::default());
//! gesture.set_extent(600.0);
//!
//! gesture.on_down(1, Point::new(200.0, 300.0), 0, false);
//! // Drag upward past the slop: the flip axis wins.
//! let started = gesture.on_move(1, Point::new(200.0, 280.0), 16);
//! assert_eq!(started, Some(GestureTransition::DragStarted));
//! assert!(gesture.claims_gesture());
//!
//! // Further motion produces distance deltas (upward = forward).
//! match gesture.on_move(1, Point::new(200.0, 260.0), 32) {
//!     Some(GestureTransition::DragBy { delta_distance }) => assert!(delta_distance > 0.0),
//!     other => panic!("expected a drag delta, got {other:?}"),
//! }
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod velocity;

use alloc::vec::Vec;

use kurbo::Point;
use pageflip_core::{FLIP_DISTANCE_PER_PAGE, FlipAxis};

use crate::velocity::VelocityTracker;

/// Floor for the edge-distance speed multiplier, so a touch starting on
/// the leading edge cannot blow up the delta conversion.
const MIN_SPEED_MULTIPLIER: f64 = 0.01;

/// Tunables for gesture interpretation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GestureConfig {
    /// Minimum pointer travel, in surface units, before an axis wins.
    pub touch_slop: f64,
    /// Release speeds below this resolve to the nearest page instead of
    /// a directional fling, in units per second.
    pub min_fling_velocity: f64,
    /// Velocity estimates are clamped to this, in units per second.
    pub max_fling_velocity: f64,
}

impl GestureConfig {
    /// Defaults close to a phone-sized touch surface.
    #[must_use]
    pub const fn touch() -> Self {
        Self {
            touch_slop: 8.0,
            min_fling_velocity: 250.0,
            max_fling_velocity: 8000.0,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self::touch()
    }
}

/// What a pointer event did to the gesture.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GestureTransition {
    /// The flip axis won; the machine now claims the gesture.
    DragStarted,
    /// The tracked pointer moved while flipping.
    DragBy {
        /// Flip-distance delta to apply; positive flips forward.
        delta_distance: f64,
    },
    /// The gesture ended while flipping.
    Released {
        /// Signed axis velocity at release, units per second, clamped.
        velocity: f64,
    },
    /// The orthogonal axis won; the gesture is given up until the next
    /// pointer down.
    Rejected,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    AxisUndetermined,
    Flipping,
    UnableToFlip,
}

/// Pointer gesture state machine for one flip surface.
#[derive(Clone, Debug)]
pub struct FlipGesture {
    axis: FlipAxis,
    config: GestureConfig,
    /// Extent of the surface along the flip axis, in surface units.
    extent: f64,
    phase: Phase,
    /// Live pointers in press order: `(id, last seen position)`.
    pointers: Vec<(u64, Point)>,
    active: Option<u64>,
    last: Point,
    speed_multiplier: f64,
    velocity: VelocityTracker,
}

impl FlipGesture {
    /// Creates an idle machine for a surface flipping along `axis`.
    ///
    /// Call [`set_extent`](Self::set_extent) before feeding events;
    /// deltas are meaningless on a zero-extent surface.
    #[must_use]
    pub fn new(axis: FlipAxis, config: GestureConfig) -> Self {
        Self {
            axis,
            config,
            extent: 0.0,
            phase: Phase::Idle,
            pointers: Vec::new(),
            active: None,
            last: Point::ZERO,
            speed_multiplier: 0.5,
            velocity: VelocityTracker::new(),
        }
    }

    /// Updates the surface extent along the flip axis.
    pub fn set_extent(&mut self, extent: f64) {
        self.extent = extent;
    }

    /// Returns the configured minimum fling velocity.
    #[must_use]
    pub fn min_fling_velocity(&self) -> f64 {
        self.config.min_fling_velocity
    }

    /// Returns `true` while the machine claims the gesture exclusively.
    ///
    /// While claimed, no other consumer may interpret move events; when
    /// the orthogonal axis has won instead, the machine has released the
    /// gesture entirely until the next pointer down.
    #[must_use]
    pub fn claims_gesture(&self) -> bool {
        self.phase == Phase::Flipping
    }

    /// Returns `true` when the orthogonal axis won the current gesture.
    #[must_use]
    pub fn is_unable_to_flip(&self) -> bool {
        self.phase == Phase::UnableToFlip
    }

    /// Drops all tracking and returns to idle.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.pointers.clear();
        self.active = None;
        self.speed_multiplier = 0.5;
        self.velocity.clear();
    }

    /// Feeds a pointer-down event.
    ///
    /// `interrupting_animation` is `true` when the host just aborted an
    /// in-flight fling or peek for this touch; the machine then promotes
    /// straight to flipping so the touch picks the page up mid-turn.
    pub fn on_down(
        &mut self,
        pointer: u64,
        position: Point,
        time_ms: u64,
        interrupting_animation: bool,
    ) -> Option<GestureTransition> {
        if self.pointers.is_empty() {
            // Fresh gesture after a settled state.
            self.pointers.push((pointer, position));
            self.active = Some(pointer);
            self.last = position;
            self.speed_multiplier = 0.5;
            self.velocity.clear();
            self.velocity.add_sample(time_ms, self.axis_coord(position));
            if interrupting_animation {
                self.phase = Phase::Flipping;
                return Some(GestureTransition::DragStarted);
            }
            self.phase = Phase::AxisUndetermined;
            return None;
        }

        // Secondary pointer: re-anchor tracking to it, keeping the phase.
        self.pointers.retain(|&(id, _)| id != pointer);
        self.pointers.push((pointer, position));
        self.active = Some(pointer);
        self.last = position;
        self.velocity.clear();
        self.velocity.add_sample(time_ms, self.axis_coord(position));
        None
    }

    /// Feeds a pointer-move event.
    pub fn on_move(
        &mut self,
        pointer: u64,
        position: Point,
        time_ms: u64,
    ) -> Option<GestureTransition> {
        let mut known = false;
        for entry in &mut self.pointers {
            if entry.0 == pointer {
                entry.1 = position;
                known = true;
                break;
            }
        }
        if !known {
            // Tracking state without a matching pointer: recover locally
            // rather than faulting.
            if self.phase != Phase::Idle {
                self.reset();
            }
            return None;
        }
        if self.active != Some(pointer) {
            return None;
        }

        match self.phase {
            Phase::AxisUndetermined => {
                let delta = position - self.last;
                let (flip_delta, orth_delta) = match self.axis {
                    FlipAxis::Vertical => (delta.y, delta.x),
                    FlipAxis::Horizontal => (delta.x, delta.y),
                };
                if flip_delta.abs() > self.config.touch_slop
                    && flip_delta.abs() > orth_delta.abs()
                {
                    self.begin_drag(flip_delta);
                    self.last = position;
                    self.velocity.add_sample(time_ms, self.axis_coord(position));
                    Some(GestureTransition::DragStarted)
                } else if orth_delta.abs() > self.config.touch_slop {
                    self.phase = Phase::UnableToFlip;
                    Some(GestureTransition::Rejected)
                } else {
                    self.velocity.add_sample(time_ms, self.axis_coord(position));
                    None
                }
            }
            Phase::Flipping => {
                let pixel_delta = self.axis_coord(self.last) - self.axis_coord(position);
                self.last = position;
                self.velocity.add_sample(time_ms, self.axis_coord(position));
                let scale = (self.extent / FLIP_DISTANCE_PER_PAGE) * self.speed_multiplier;
                if scale <= 0.0 {
                    return None;
                }
                Some(GestureTransition::DragBy {
                    delta_distance: pixel_delta / scale,
                })
            }
            Phase::Idle | Phase::UnableToFlip => None,
        }
    }

    /// Feeds a pointer-up (or cancel, which behaves identically) event.
    pub fn on_up(
        &mut self,
        pointer: u64,
        position: Point,
        time_ms: u64,
    ) -> Option<GestureTransition> {
        self.pointers.retain(|&(id, _)| id != pointer);

        if self.active != Some(pointer) {
            return None;
        }

        if let Some(&(survivor, survivor_pos)) = self.pointers.last() {
            // The tracked pointer lifted mid-gesture: hand off to a
            // survivor, keeping the axis classification.
            self.active = Some(survivor);
            self.last = survivor_pos;
            self.velocity.clear();
            return None;
        }

        let was_flipping = self.phase == Phase::Flipping;
        self.velocity.add_sample(time_ms, self.axis_coord(position));
        let released = self.velocity.velocity(self.config.max_fling_velocity);
        self.reset();
        if was_flipping {
            Some(GestureTransition::Released { velocity: released })
        } else {
            None
        }
    }

    fn begin_drag(&mut self, flip_delta: f64) {
        // Room between the touch and the edge the finger is heading for;
        // a page's worth of travel shrinks with it.
        let near_edge = if flip_delta < 0.0 { 0.0 } else { self.extent };
        if self.extent > 0.0 {
            self.speed_multiplier = ((self.axis_coord(self.last) - near_edge).abs()
                / self.extent)
                .max(MIN_SPEED_MULTIPLIER);
        }
        self.phase = Phase::Flipping;
    }

    fn axis_coord(&self, position: Point) -> f64 {
        match self.axis {
            FlipAxis::Vertical => position.y,
            FlipAxis::Horizontal => position.x,
        }
    }
}
