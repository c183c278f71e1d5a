// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=pageflip_engine --heading-base-level=0

//! Pageflip Engine: a complete page-flip navigation controller.
//!
//! [`FlipEngine`] fuses the pieces from `pageflip_core` and
//! `pageflip_gesture` into one frame-driven state machine: pointer events
//! and commands go in, committed flip state and [`FrameDescriptor`]s come
//! out. The engine owns no threads and no clock — hosts deliver input
//! serially, call [`FlipEngine::tick`] with a millisecond timestamp each
//! frame, then ask for the frame and drain pending [`FlipEvent`]s. All
//! state mutation for a tick completes before the frame is built, so a
//! frame never observes half-applied state.
//!
//! Page content stays with the host behind the [`PageAdapter`] boundary;
//! the engine borrows view handles while pages are live and returns them
//! through its recycler.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Size;
//! use pageflip_engine::{FlipConfig, FlipEngine, PageAdapter};
//!
//! struct Pages(usize);
//!
//! impl PageAdapter for Pages {
//!     type Handle = usize;
//!     fn len(&self) -> usize {
//!         self.0
//!     }
//!     fn materialize(&mut self, index: usize, _recycled: Option<usize>) -> usize {
//!         index
//!     }
//! }
//!
//! let mut engine = FlipEngine::new(FlipConfig::default());
//! engine.set_viewport(Size::new(400.0, 600.0));
//! engine.set_adapter(Pages(5));
//!
//! engine.flip_to(2).unwrap();
//! assert_eq!(engine.current_page(), Some(2));
//! assert_eq!(engine.flip_distance(), 360.0);
//!
//! // Out-of-range navigation fails fast, with no state change.
//! assert!(engine.flip_to(7).is_err());
//! assert_eq!(engine.current_page(), Some(2));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("pageflip_engine requires either the `std` or `libm` feature");

pub mod adapter;
pub mod animate;
pub mod events;

mod pages;

pub use adapter::PageAdapter;
pub use events::FlipEvent;
pub use pageflip_core::overflip::{OverFlipIndicator, OverFlipMode};
pub use pageflip_core::render::{
    FrameDescriptor, FrameOp, Overlay, OverlayKind, RenderEffects, RenderStyle,
};
pub use pageflip_core::{FLIP_DISTANCE_PER_PAGE, FlipAxis};
pub use pageflip_gesture::GestureConfig;

use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Size};
use peniko::Color;
use smallvec::SmallVec;

use pageflip_core::cascade::CascadeStrip;
use pageflip_core::distance::{
    distance_for_page, is_settled, page_index_ceil, page_index_floor, page_index_round,
};
use pageflip_core::overflip::OverFlipper;
use pageflip_core::recycler::Recycler;
use pageflip_core::render;

use pageflip_gesture::{FlipGesture, GestureTransition};

use crate::animate::{AnimationDriver, Interpolation, fling_duration_ms};
use crate::events::EventQueue;
use crate::pages::{PageSlot, SlotSet};

/// How far a peek travels from the resting page: a quarter turn.
pub const PEEK_DELTA: f64 = FLIP_DISTANCE_PER_PAGE / 4.0;

/// Engine-wide tunables.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlipConfig {
    /// Flip axis of the surface.
    pub axis: FlipAxis,
    /// Gesture interpretation tunables.
    pub gesture: GestureConfig,
    /// Fling duration for exactly one page; longer flings grow with the
    /// square root of the distance.
    pub max_single_page_duration_ms: u64,
    /// Duration of one peek leg (out, or back).
    pub peek_duration_ms: u64,
    /// Duration of a whole cascade flight.
    pub cascade_duration_ms: u64,
    /// Per-index stagger of cascade turns, in distance units.
    pub cascade_offset: f64,
}

impl FlipConfig {
    /// Defaults for a touch surface.
    #[must_use]
    pub const fn touch() -> Self {
        Self {
            axis: FlipAxis::Vertical,
            gesture: GestureConfig::touch(),
            max_single_page_duration_ms: 360,
            peek_duration_ms: 600,
            cascade_duration_ms: 1000,
            cascade_offset: 30.0,
        }
    }
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self::touch()
    }
}

/// A navigation command named a target outside the dataset.
///
/// This is the only user-visible failure the engine produces; it is
/// reported synchronously and leaves all state unchanged.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlipError {
    /// Page target outside `[0, count - 1]`.
    PageOutOfRange {
        /// The requested page.
        page: isize,
        /// Current page count.
        count: usize,
    },
    /// Distance target outside `[0, (count - 1) * 180]`.
    DistanceOutOfRange {
        /// The requested distance.
        distance: f64,
        /// Largest valid distance.
        max: f64,
    },
}

impl fmt::Display for FlipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageOutOfRange { page, count } => {
                write!(f, "page {page} is out of range for {count} pages")
            }
            Self::DistanceOutOfRange { distance, max } => {
                write!(f, "distance {distance} is outside [0, {max}]")
            }
        }
    }
}

impl core::error::Error for FlipError {}

/// What a pointer did.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    /// Pointer made contact.
    Down,
    /// Pointer moved while down.
    Move,
    /// Pointer lifted.
    Up,
    /// The gesture was cancelled by the host; treated like a lift.
    Cancel,
}

/// One pointer event, delivered serially by the host.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// Stable id of the pointer within the gesture.
    pub pointer: u64,
    /// Position in surface coordinates.
    pub position: Point,
    /// Host timestamp in milliseconds.
    pub time_ms: u64,
}

/// A prepared cascade strip, optionally mid-flight.
#[derive(Clone, Debug)]
struct CascadeFlight<H> {
    views: Vec<H>,
    strip: CascadeStrip,
    /// Strip-local distance in `[0, strip.end_distance()]`.
    local: f64,
    end_local: f64,
    target_page: usize,
    flying: bool,
}

/// The page-flip navigation engine.
///
/// See the crate docs for the driving contract. Everything here is
/// single-threaded and synchronous; the host serializes input and ticks.
#[derive(Debug)]
pub struct FlipEngine<A: PageAdapter> {
    adapter: Option<A>,
    config: FlipConfig,
    viewport: Size,
    style: RenderStyle,

    gesture: FlipGesture,
    animations: AnimationDriver,
    recycler: Recycler<A::Handle>,
    slots: SlotSet<A::Handle>,

    over_flipper: OverFlipper,
    is_over_flipping: bool,
    indicator: Option<OverFlipIndicator>,

    page_count: usize,
    distance: f64,
    current_index: Option<isize>,
    current_id: i64,
    last_settled: Option<usize>,
    /// Set while resting at an explicitly requested distance; settle
    /// logic must not snap it to a page or fire page events.
    explicit_distance_rest: bool,

    cascade_enabled: bool,
    cascade: Option<CascadeFlight<A::Handle>>,

    events: EventQueue,
    last_empty: Option<bool>,
}

impl<A: PageAdapter> FlipEngine<A> {
    /// Creates an engine with no adapter attached.
    #[must_use]
    pub fn new(config: FlipConfig) -> Self {
        Self {
            adapter: None,
            config,
            viewport: Size::ZERO,
            style: RenderStyle::default(),
            gesture: FlipGesture::new(config.axis, config.gesture),
            animations: AnimationDriver::new(),
            recycler: Recycler::new(),
            slots: SlotSet::default(),
            over_flipper: OverFlipper::new(OverFlipMode::default()),
            is_over_flipping: false,
            indicator: None,
            page_count: 0,
            distance: 0.0,
            current_index: None,
            current_id: -1,
            last_settled: None,
            explicit_distance_rest: false,
            cascade_enabled: false,
            cascade: None,
            events: EventQueue::default(),
            last_empty: None,
        }
    }

    /* ---------- adapter and dataset ---------- */

    /// Attaches `adapter`, replacing any previous one.
    ///
    /// Handles belonging to the outgoing adapter are dropped, not pooled.
    /// The engine lands on page 0 of the new dataset (or the empty state).
    pub fn set_adapter(&mut self, adapter: A) {
        self.slots.clear();
        self.cascade = None;
        self.recycler.clear();
        self.recycler.set_type_cardinality(adapter.view_type_count());
        self.page_count = adapter.len();
        self.adapter = Some(adapter);

        self.cancel_navigation();
        self.explicit_distance_rest = false;
        self.current_index = None;
        self.current_id = -1;
        self.last_settled = None;
        self.commit_distance(0.0);
        self.update_empty_status();
    }

    /// Tells the engine the adapter's contents changed in place.
    ///
    /// With stable ids the engine follows the current page's identity:
    /// same-index check first, then a linear id scan, then keeping the
    /// current index if the id vanished. Pooled scraps are demoted to
    /// type-only matching.
    pub fn dataset_changed(&mut self) {
        let Some(adapter) = self.adapter.as_ref() else {
            return;
        };
        let new_len = adapter.len();
        let new_position = match self.current_index {
            None => 0,
            Some(idx) => {
                let idx = idx.clamp(0, (self.page_count as isize - 1).max(0)) as usize;
                if adapter.has_stable_ids() && self.page_count > 0 {
                    if idx < new_len && adapter.item_id(idx) == self.current_id {
                        idx
                    } else {
                        (0..new_len)
                            .find(|&i| adapter.item_id(i) == self.current_id)
                            .unwrap_or(idx)
                    }
                } else {
                    idx
                }
            }
        };

        self.cascade = None;
        self.cancel_navigation();
        self.explicit_distance_rest = false;
        self.slots.recycle_into(&mut self.recycler);
        let type_count = self.adapter.as_ref().map_or(1, A::view_type_count);
        self.recycler.set_type_cardinality(type_count);
        self.recycler.invalidate_all();

        self.page_count = new_len;
        self.current_index = None;
        self.current_id = -1;
        self.last_settled = None;
        if new_len > 0 {
            let page = new_position.min(new_len - 1);
            self.commit_distance(distance_for_page(page));
        } else {
            self.commit_distance(0.0);
        }
        self.update_empty_status();
    }

    /// Detaches the adapter entirely and drops all pooled handles.
    pub fn dataset_invalidated(&mut self) {
        self.adapter = None;
        self.slots.clear();
        self.cascade = None;
        self.recycler.clear();
        self.page_count = 0;
        self.cancel_navigation();
        self.explicit_distance_rest = false;
        self.current_index = None;
        self.current_id = -1;
        self.last_settled = None;
        self.commit_distance(0.0);
        self.update_empty_status();
    }

    /* ---------- accessors ---------- */

    /// Number of pages in the attached dataset.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// The attached adapter, if any.
    #[must_use]
    pub fn adapter(&self) -> Option<&A> {
        self.adapter.as_ref()
    }

    /// Mutable access to the attached adapter.
    ///
    /// Changing its contents must be followed by
    /// [`dataset_changed`](Self::dataset_changed).
    pub fn adapter_mut(&mut self) -> Option<&mut A> {
        self.adapter.as_mut()
    }

    /// The page the engine currently considers nearest, if any.
    #[must_use]
    pub fn current_page(&self) -> Option<usize> {
        let count = self.page_count as isize;
        self.current_index
            .filter(|idx| (0..count).contains(idx))
            .map(|idx| idx as usize)
    }

    /// The committed flip distance.
    #[must_use]
    pub fn flip_distance(&self) -> f64 {
        self.distance
    }

    /// The active overflip mode.
    #[must_use]
    pub fn over_flip_mode(&self) -> OverFlipMode {
        self.over_flipper.mode()
    }

    /// Returns `true` while the engine claims the pointer gesture.
    #[must_use]
    pub fn claims_gesture(&self) -> bool {
        self.gesture.claims_gesture()
    }

    /// Returns `true` while animations or indicator decay still need
    /// frames; hosts without a continuous render loop keep ticking while
    /// this holds.
    #[must_use]
    pub fn needs_frame(&self) -> bool {
        self.animations.is_active() || self.over_flipper.is_indicator_visible()
    }

    /// The glow indicator captured at the last tick, if visible.
    #[must_use]
    pub fn over_flip_indicator(&self) -> Option<OverFlipIndicator> {
        self.indicator
    }

    /// Current overlay style.
    #[must_use]
    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /* ---------- configuration ---------- */

    /// Updates the surface size. Must be called before events or frames
    /// make sense; gestures scale by the axis extent.
    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
        self.gesture.set_extent(match self.config.axis {
            FlipAxis::Vertical => size.height,
            FlipAxis::Horizontal => size.width,
        });
    }

    /// Selects the boundary resistance behavior, resetting any overflip
    /// state accumulated under the previous mode.
    pub fn set_over_flip_mode(&mut self, mode: OverFlipMode) {
        self.over_flipper = OverFlipper::new(mode);
        self.is_over_flipping = false;
        self.indicator = None;
    }

    /// Enables or disables overlay families.
    pub fn set_effects(&mut self, effects: RenderEffects) {
        self.style.effects = effects;
    }

    /// Sets the shadow overlay color.
    pub fn set_shadow_color(&mut self, color: Color) {
        self.style.shadow_color = color;
    }

    /// Sets the directional gradient colors (spine, outer edge).
    pub fn set_gradient_colors(&mut self, start: Color, end: Color) {
        self.style.gradient_start = start;
        self.style.gradient_end = end;
    }

    /// Sets the per-index stagger used by subsequently prepared cascades.
    pub fn set_cascade_offset(&mut self, offset: f64) {
        self.config.cascade_offset = offset;
    }

    /// Sets the duration of a whole cascade flight.
    pub fn set_cascade_duration_ms(&mut self, duration_ms: u64) {
        self.config.cascade_duration_ms = duration_ms;
    }

    /// Sets the single-page fling duration anchor.
    pub fn set_max_single_flip_duration_ms(&mut self, duration_ms: u64) {
        self.config.max_single_page_duration_ms = duration_ms;
    }

    /// Enters or leaves cascade mode.
    ///
    /// Leaving drops any prepared strip and rests the engine flat on the
    /// current page.
    pub fn set_cascade_mode(&mut self, enabled: bool) {
        if !enabled {
            self.cascade = None;
            self.animations.end_fling();
            if let Some(current) = self.current_page() {
                self.current_index = None;
                self.commit_distance(distance_for_page(current));
            }
        }
        self.cascade_enabled = enabled;
    }

    /* ---------- navigation commands ---------- */

    /// Jumps to `page` with no animation.
    ///
    /// Cancels any in-flight fling or peek and leaves cascade mode.
    pub fn flip_to(&mut self, page: usize) -> Result<(), FlipError> {
        self.validate_page(page as isize)?;
        self.cascade = None;
        self.cascade_enabled = false;
        self.cancel_navigation();
        self.explicit_distance_rest = false;
        self.commit_distance(distance_for_page(page));
        Ok(())
    }

    /// Jumps `delta` pages relative to the current one.
    pub fn flip_by(&mut self, delta: isize) -> Result<(), FlipError> {
        let base = self.current_index.unwrap_or(0);
        let target = base + delta;
        self.validate_page(target)?;
        self.flip_to(target as usize)
    }

    /// Animates to `page`.
    ///
    /// Outside cascade mode this is a fling with the square-root duration
    /// law. In cascade mode it launches the prepared strip (preparing one
    /// implicitly if needed) over the cascade duration.
    pub fn smooth_flip_to(&mut self, page: usize, now_ms: u64) -> Result<(), FlipError> {
        self.validate_page(page as isize)?;

        if self.cascade_enabled {
            if self.cascade.as_ref().map(|c| c.target_page) != Some(page) {
                self.prepare_cascade_flip(page)?;
            }
            if let Some(flight) = self.cascade.as_mut() {
                flight.flying = true;
                let (start, end) = (flight.local, flight.end_local);
                self.animations.end_peek();
                self.animations.start_fling(
                    start,
                    end,
                    now_ms,
                    self.config.cascade_duration_ms,
                    Interpolation::Decelerate,
                    false,
                );
            }
            return Ok(());
        }

        self.gesture.reset();
        self.animations.end_peek();
        self.explicit_distance_rest = false;
        self.start_page_fling(page, now_ms);
        Ok(())
    }

    /// Animates `delta` pages relative to the current one.
    pub fn smooth_flip_by(&mut self, delta: isize, now_ms: u64) -> Result<(), FlipError> {
        let base = self.current_index.unwrap_or(0);
        let target = base + delta;
        self.validate_page(target)?;
        self.smooth_flip_to(target as usize, now_ms)
    }

    /// Animates to an arbitrary distance within the dataset.
    ///
    /// `duration_ms` of `None` uses the square-root duration law. The
    /// engine will rest at the target without snapping to a page. No-op
    /// in cascade mode.
    pub fn smooth_flip_to_distance(
        &mut self,
        distance: f64,
        duration_ms: Option<u64>,
        now_ms: u64,
    ) -> Result<(), FlipError> {
        let max = self.max_distance();
        if !distance.is_finite() || distance < 0.0 || distance > max {
            return Err(FlipError::DistanceOutOfRange { distance, max });
        }
        if self.cascade_enabled {
            return Ok(());
        }

        self.gesture.reset();
        self.animations.end_peek();
        self.explicit_distance_rest = false;
        let delta = distance - self.distance;
        let duration = duration_ms
            .unwrap_or_else(|| fling_duration_ms(delta, self.config.max_single_page_duration_ms));
        self.animations.start_fling(
            self.distance,
            distance,
            now_ms,
            duration,
            Interpolation::Decelerate,
            true,
        );
        Ok(())
    }

    /// Sets the distance immediately, resting there without snapping.
    pub fn set_flip_distance(&mut self, distance: f64) {
        self.cancel_navigation();
        self.explicit_distance_rest = true;
        self.commit_distance(distance);
    }

    /// Hints at the next page with a quarter-turn peek.
    ///
    /// Returns `false` (and does nothing) when there is no next page or
    /// cascade mode is active. A repeating peek runs until cancelled by
    /// a new gesture or command.
    pub fn peek_next(&mut self, once: bool, now_ms: u64) -> bool {
        self.peek(true, once, now_ms)
    }

    /// Hints at the previous page; see [`peek_next`](Self::peek_next).
    pub fn peek_previous(&mut self, once: bool, now_ms: u64) -> bool {
        self.peek(false, once, now_ms)
    }

    /// Materializes the strip of pages between the current page and
    /// `page` for a cascade flight.
    ///
    /// The strip is destroyed when the flight completes, the dataset
    /// changes, or cascade mode is left.
    pub fn prepare_cascade_flip(&mut self, page: usize) -> Result<(), FlipError> {
        self.validate_page(page as isize)?;
        let current = self.current_page().unwrap_or(0);
        self.cancel_navigation();
        self.slots.recycle_into(&mut self.recycler);

        let forward = current <= page;
        let (lo, hi) = if forward { (current, page) } else { (page, current) };
        let Some(adapter) = self.adapter.as_mut() else {
            // Unreachable once page validation passed; mirror its error.
            return Err(FlipError::PageOutOfRange {
                page: page as isize,
                count: 0,
            });
        };
        let mut views = Vec::with_capacity(hi - lo + 1);
        for index in lo..=hi {
            views.push(adapter.materialize(index, None));
        }

        let strip = CascadeStrip::new(views.len(), self.config.cascade_offset);
        let end = strip.end_distance();
        let (local, end_local) = if forward { (0.0, end) } else { (end, 0.0) };
        self.cascade = Some(CascadeFlight {
            views,
            strip,
            local,
            end_local,
            target_page: page,
            flying: false,
        });
        Ok(())
    }

    /* ---------- input and frames ---------- */

    /// Feeds one pointer event.
    ///
    /// Returns `true` while the engine claims the gesture exclusively
    /// (the interception contract: once claimed, no other consumer may
    /// interpret moves; once rejected, the engine ignores the rest of
    /// the gesture).
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        if self.page_count < 1 || self.cascade_enabled {
            return false;
        }

        let transition = match event.phase {
            PointerPhase::Down => {
                let interrupted_fling = self.animations.end_fling();
                let interrupted_peek = self.animations.end_peek();
                self.gesture.on_down(
                    event.pointer,
                    event.position,
                    event.time_ms,
                    interrupted_fling || interrupted_peek,
                )
            }
            PointerPhase::Move => self.gesture.on_move(event.pointer, event.position, event.time_ms),
            PointerPhase::Up | PointerPhase::Cancel => {
                self.gesture.on_up(event.pointer, event.position, event.time_ms)
            }
        };

        match transition {
            Some(GestureTransition::DragStarted) => {
                self.explicit_distance_rest = false;
            }
            Some(GestureTransition::DragBy { delta_distance }) => {
                self.apply_drag_delta(delta_distance);
            }
            Some(GestureTransition::Released { velocity }) => {
                self.resolve_release(velocity, event.time_ms);
            }
            Some(GestureTransition::Rejected) | None => {}
        }

        self.gesture.claims_gesture()
    }

    /// Advances animation jobs and settle detection to `now_ms`.
    ///
    /// All state mutation happens here; the subsequent
    /// [`frame`](Self::frame) call observes a fully committed state.
    pub fn tick(&mut self, now_ms: u64) {
        let result = self.animations.tick(now_ms);

        let cascade_flying = self.cascade.as_ref().is_some_and(|c| c.flying);
        if cascade_flying {
            if let Some(distance) = result.distance
                && let Some(flight) = self.cascade.as_mut()
            {
                flight.local = distance;
            }
            if result.fling_finished.is_some() {
                self.finish_cascade();
            }
        } else {
            if let Some(distance) = result.distance {
                self.commit_distance(distance);
            }
            if let Some(finished) = result.fling_finished {
                self.explicit_distance_rest = finished.explicit_distance;
            }
        }

        self.detect_settle();

        self.indicator = if self.style.effects.contains(RenderEffects::OVER_FLIP) {
            self.over_flipper.indicator(now_ms)
        } else {
            None
        };
    }

    /// Builds the frame for the committed state.
    #[must_use]
    pub fn frame(&self) -> FrameDescriptor<A::Handle> {
        if self.page_count < 1 {
            return FrameDescriptor::default();
        }
        if self.cascade_enabled
            && let Some(flight) = &self.cascade
        {
            return render::cascade_frame(
                self.viewport,
                self.config.axis,
                flight.local,
                &flight.views,
                &flight.strip,
            );
        }
        render::sequential_frame(
            self.viewport,
            self.config.axis,
            self.distance,
            &self.slots.window(),
            &self.style,
        )
    }

    /// Takes all events queued since the last drain, in emission order.
    pub fn drain_events(&mut self) -> SmallVec<[FlipEvent; 8]> {
        self.events.take()
    }

    /* ---------- internals ---------- */

    fn validate_page(&self, page: isize) -> Result<(), FlipError> {
        if page < 0 || page >= self.page_count as isize {
            return Err(FlipError::PageOutOfRange {
                page,
                count: self.page_count,
            });
        }
        Ok(())
    }

    fn max_distance(&self) -> f64 {
        if self.page_count == 0 {
            0.0
        } else {
            (self.page_count - 1) as f64 * FLIP_DISTANCE_PER_PAGE
        }
    }

    fn cancel_navigation(&mut self) {
        self.animations.end_fling();
        self.animations.end_peek();
        self.gesture.reset();
    }

    fn peek(&mut self, next: bool, once: bool, now_ms: u64) -> bool {
        if self.cascade_enabled {
            return false;
        }
        let Some(current) = self.current_page() else {
            return false;
        };
        let delta = if next {
            if current + 1 >= self.page_count {
                return false;
            }
            PEEK_DELTA
        } else {
            if current == 0 {
                return false;
            }
            -PEEK_DELTA
        };
        self.animations.start_peek(
            distance_for_page(current),
            delta,
            now_ms,
            self.config.peek_duration_ms,
            once,
        );
        true
    }

    fn start_page_fling(&mut self, page: usize, now_ms: u64) {
        let end = distance_for_page(page);
        let delta = end - self.distance;
        let duration = fling_duration_ms(delta, self.config.max_single_page_duration_ms);
        self.animations.start_fling(
            self.distance,
            end,
            now_ms,
            duration,
            Interpolation::Decelerate,
            false,
        );
    }

    /// Converts a gesture delta into committed distance, applying the
    /// soft ceiling and overflip physics, and emits overflip updates.
    fn apply_drag_delta(&mut self, delta: f64) {
        if self.page_count < 1 {
            return;
        }
        let per_page = FLIP_DISTANCE_PER_PAGE;
        let soft_max = self.page_count as f64 * per_page + per_page / 2.0 - 1.0;
        let new_distance = (self.distance + delta).clamp(-per_page, soft_max);
        self.commit_distance(new_distance);

        let min = 0.0;
        let max = self.max_distance();
        if self.distance < min || self.distance > max {
            self.is_over_flipping = true;
            let clamped = self.over_flipper.calculate(self.distance, min, max);
            self.commit_distance(clamped);
            let total = self.over_flipper.total_over_flip();
            self.events.push(FlipEvent::OverFlip {
                mode: self.over_flipper.mode(),
                previous_boundary: total < 0.0,
                magnitude: total.abs(),
                per_page,
            });
        } else if self.is_over_flipping {
            self.is_over_flipping = false;
            // Terminal notification for both boundaries, so consumers
            // implementing release-triggered actions reset unconditionally.
            for previous_boundary in [false, true] {
                self.events.push(FlipEvent::OverFlip {
                    mode: self.over_flipper.mode(),
                    previous_boundary,
                    magnitude: 0.0,
                    per_page,
                });
            }
        }
    }

    /// Picks the landing page for a release at `velocity` and hands off
    /// to the fling driver.
    ///
    /// The literal thresholds are load-bearing: a fast forward release
    /// floors the page ratio, a fast backward release ceils it, and only
    /// slow releases round to the nearest page.
    fn resolve_release(&mut self, velocity: f64, now_ms: u64) {
        if self.page_count < 1 {
            return;
        }
        let min_velocity = self.config.gesture.min_fling_velocity;
        let target = if velocity > min_velocity {
            page_index_floor(self.distance)
        } else if velocity < -min_velocity {
            page_index_ceil(self.distance)
        } else {
            page_index_round(self.distance)
        };
        let target = target.clamp(0, self.page_count as isize - 1) as usize;

        self.explicit_distance_rest = false;
        self.start_page_fling(target, now_ms);
        self.over_flipper.on_interaction_end();

        if self.is_over_flipping {
            self.is_over_flipping = false;
            for previous_boundary in [false, true] {
                self.events.push(FlipEvent::OverFlip {
                    mode: self.over_flipper.mode(),
                    previous_boundary,
                    magnitude: 0.0,
                    per_page: FLIP_DISTANCE_PER_PAGE,
                });
            }
        }
    }

    /// The single distance setter: commits the value, re-derives the
    /// current page, and refills the slots when it changed.
    fn commit_distance(&mut self, new_distance: f64) {
        if self.page_count < 1 {
            self.distance = 0.0;
            self.current_index = None;
            self.current_id = -1;
            self.slots.recycle_into(&mut self.recycler);
            return;
        }

        self.distance = new_distance;
        let index = page_index_round(new_distance);
        if self.current_index != Some(index) {
            self.current_index = Some(index);
            self.current_id = if (0..self.page_count as isize).contains(&index) {
                self.adapter
                    .as_ref()
                    .map_or(-1, |a| a.item_id(index as usize))
            } else {
                -1
            };
            self.fill_slots(index);
        }

        self.events.push(FlipEvent::DistanceChanged {
            distance: self.distance,
        });
    }

    fn fill_slots(&mut self, index: isize) {
        self.slots.recycle_into(&mut self.recycler);
        let count = self.page_count as isize;
        if index > 0 && index <= count {
            self.slots.previous = self.obtain((index - 1) as usize);
        }
        if (0..count).contains(&index) {
            self.slots.current = self.obtain(index as usize);
        }
        if index >= -1 && index < count - 1 {
            self.slots.next = self.obtain((index + 1) as usize);
        }
    }

    fn obtain(&mut self, index: usize) -> Option<PageSlot<A::Handle>> {
        let adapter = self.adapter.as_mut()?;
        let view_type = adapter.view_type(index);
        let handle = match self.recycler.checkout(index, view_type) {
            Some(scrap) if scrap.matches(index) => scrap.handle,
            Some(scrap) => adapter.materialize(index, Some(scrap.handle)),
            None => adapter.materialize(index, None),
        };
        Some(PageSlot {
            handle,
            index,
            view_type,
        })
    }

    fn finish_cascade(&mut self) {
        let Some(flight) = self.cascade.take() else {
            return;
        };
        // The strip's fresh handles go back to the adapter by drop; the
        // regular window refills through the recycler.
        self.explicit_distance_rest = false;
        self.current_index = None;
        self.commit_distance(distance_for_page(flight.target_page));
    }

    fn detect_settle(&mut self) {
        if self.page_count < 1
            || self.animations.is_active()
            || self.gesture.claims_gesture()
            || self.cascade.is_some()
            || self.explicit_distance_rest
            || !is_settled(self.distance)
        {
            return;
        }
        let page = page_index_round(self.distance).clamp(0, self.page_count as isize - 1) as usize;
        if self.last_settled != Some(page) {
            self.last_settled = Some(page);
            let item_id = self
                .adapter
                .as_ref()
                .filter(|a| page < a.len())
                .map_or(0, |a| a.item_id(page));
            self.events.push(FlipEvent::FlippedToPage { page, item_id });
        }
    }

    fn update_empty_status(&mut self) {
        let empty = self.adapter.is_none() || self.page_count == 0;
        if self.last_empty != Some(empty) {
            self.last_empty = Some(empty);
            self.events.push(FlipEvent::EmptyChanged { empty });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestAdapter {
        ids: Vec<i64>,
        stable: bool,
        fresh: u32,
    }

    impl TestAdapter {
        fn with_len(len: usize) -> Self {
            Self {
                ids: (0..len as i64).collect(),
                stable: false,
                fresh: 0,
            }
        }
    }

    impl PageAdapter for TestAdapter {
        type Handle = u32;

        fn len(&self) -> usize {
            self.ids.len()
        }

        fn has_stable_ids(&self) -> bool {
            self.stable
        }

        fn item_id(&self, index: usize) -> i64 {
            self.ids[index]
        }

        fn materialize(&mut self, _index: usize, recycled: Option<u32>) -> u32 {
            recycled.unwrap_or_else(|| {
                self.fresh += 1;
                self.fresh
            })
        }
    }

    fn engine_with(len: usize) -> FlipEngine<TestAdapter> {
        let mut engine = FlipEngine::new(FlipConfig::default());
        engine.set_viewport(Size::new(400.0, 600.0));
        engine.set_adapter(TestAdapter::with_len(len));
        engine
    }

    #[test]
    fn flip_to_materializes_the_window() {
        let mut engine = engine_with(5);
        engine.flip_to(2).unwrap();

        assert_eq!(engine.current_page(), Some(2));
        assert_eq!(engine.flip_distance(), 360.0);
        assert_eq!(engine.slots.previous.as_ref().map(|s| s.index), Some(1));
        assert_eq!(engine.slots.current.as_ref().map(|s| s.index), Some(2));
        assert_eq!(engine.slots.next.as_ref().map(|s| s.index), Some(3));
    }

    #[test]
    fn out_of_range_flip_changes_nothing() {
        let mut engine = engine_with(5);
        engine.flip_to(2).unwrap();
        engine.drain_events();

        let err = engine.flip_to(7).unwrap_err();
        assert_eq!(err, FlipError::PageOutOfRange { page: 7, count: 5 });
        assert_eq!(engine.current_page(), Some(2));
        assert_eq!(engine.flip_distance(), 360.0);
        assert!(engine.drain_events().is_empty(), "no partial state change");
    }

    #[test]
    fn first_page_has_no_previous_slot() {
        let engine = engine_with(3);
        assert!(engine.slots.previous.is_none());
        assert_eq!(engine.slots.current.as_ref().map(|s| s.index), Some(0));
        assert_eq!(engine.slots.next.as_ref().map(|s| s.index), Some(1));
    }

    #[test]
    fn neighbor_step_reuses_pooled_handles() {
        let mut engine = engine_with(6);
        engine.flip_to(2).unwrap();
        let before = engine.slots.next.as_ref().map(|s| s.handle).unwrap();

        // Page 3's view was live as the next slot; after stepping, the
        // same handle must come back for index 3.
        engine.flip_to(3).unwrap();
        let after = engine.slots.current.as_ref().map(|s| s.handle).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn empty_dataset_degrades_not_fails() {
        let mut engine = engine_with(0);
        assert_eq!(engine.page_count(), 0);
        assert_eq!(engine.current_page(), None);
        assert_eq!(engine.flip_distance(), 0.0);
        assert!(engine.frame().ops.is_empty());
        let events = engine.drain_events();
        assert!(events.contains(&FlipEvent::EmptyChanged { empty: true }));
        assert!(engine.flip_to(0).is_err());
    }

    #[test]
    fn smooth_flip_lands_and_fires_page_event() {
        let mut engine = engine_with(5);
        engine.drain_events();
        engine.smooth_flip_to(1, 1_000).unwrap();
        assert!(engine.needs_frame());

        // Run past the fling duration.
        engine.tick(1_000);
        engine.tick(2_000);
        assert_eq!(engine.flip_distance(), 180.0);
        assert!(!engine.needs_frame());

        let events = engine.drain_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, FlipEvent::FlippedToPage { page: 1, item_id: 1 })),
            "missing page event in {events:?}"
        );
    }

    #[test]
    fn settle_event_fires_once_per_page_change() {
        let mut engine = engine_with(5);
        engine.tick(0);
        engine.tick(16);
        let events = engine.drain_events();
        let landings = events
            .iter()
            .filter(|e| matches!(e, FlipEvent::FlippedToPage { .. }))
            .count();
        assert_eq!(landings, 1, "initial landing fires exactly once");

        engine.tick(32);
        assert!(
            engine
                .drain_events()
                .iter()
                .all(|e| !matches!(e, FlipEvent::FlippedToPage { .. }))
        );
    }

    #[test]
    fn explicit_distance_rest_suppresses_page_events() {
        let mut engine = engine_with(5);
        engine.tick(0);
        engine.drain_events();

        // Rest exactly on a page boundary, but explicitly.
        engine.set_flip_distance(180.0);
        engine.tick(16);
        let events = engine.drain_events();
        assert!(
            events
                .iter()
                .all(|e| !matches!(e, FlipEvent::FlippedToPage { .. })),
            "explicit rest must not fire page events: {events:?}"
        );
        assert_eq!(engine.current_page(), Some(1));
    }

    #[test]
    fn dataset_change_with_stable_ids_follows_the_page() {
        let mut engine = engine_with(4);
        engine.adapter.as_mut().unwrap().stable = true;
        engine.flip_to(1).unwrap();
        assert_eq!(engine.current_page(), Some(1));

        // Insert an item in front: old id 1 now lives at index 2.
        engine.adapter.as_mut().unwrap().ids = alloc::vec![9, 0, 1, 2, 3];
        engine.dataset_changed();
        assert_eq!(engine.current_page(), Some(2));
        assert_eq!(engine.flip_distance(), 360.0);
    }

    #[test]
    fn dataset_change_without_stable_ids_keeps_the_index() {
        let mut engine = engine_with(4);
        engine.flip_to(2).unwrap();
        engine.adapter.as_mut().unwrap().ids = alloc::vec![7, 8, 9];
        engine.dataset_changed();
        assert_eq!(engine.current_page(), Some(2));
    }

    #[test]
    fn dataset_shrink_clamps_the_current_page() {
        let mut engine = engine_with(5);
        engine.flip_to(4).unwrap();
        engine.adapter.as_mut().unwrap().ids = alloc::vec![0, 1];
        engine.dataset_changed();
        assert_eq!(engine.current_page(), Some(1));
    }

    #[test]
    fn dataset_invalidated_resets_to_empty() {
        let mut engine = engine_with(5);
        engine.flip_to(3).unwrap();
        engine.drain_events();
        engine.dataset_invalidated();
        assert_eq!(engine.page_count(), 0);
        assert_eq!(engine.current_page(), None);
        assert!(
            engine
                .drain_events()
                .contains(&FlipEvent::EmptyChanged { empty: true })
        );
    }

    #[test]
    fn peek_requires_an_adjacent_page() {
        let mut engine = engine_with(3);
        assert!(!engine.peek_previous(true, 0), "no page before 0");
        assert!(engine.peek_next(true, 0));

        engine.flip_to(2).unwrap();
        assert!(!engine.peek_next(true, 0), "no page after the last");
        assert!(engine.peek_previous(true, 0));
    }

    #[test]
    fn peek_oscillates_and_returns_to_base() {
        let mut engine = engine_with(3);
        engine.flip_to(1).unwrap();
        assert!(engine.peek_next(true, 0));

        engine.tick(300);
        assert!(engine.flip_distance() > 180.0);
        assert!(engine.flip_distance() <= 180.0 + PEEK_DELTA);

        engine.tick(1_200);
        assert_eq!(engine.flip_distance(), 180.0);
        assert!(!engine.needs_frame());
    }

    #[test]
    fn cascade_flight_lands_on_the_target() {
        let mut engine = engine_with(6);
        engine.set_cascade_mode(true);
        engine.prepare_cascade_flip(4).unwrap();
        engine.smooth_flip_to(4, 0).unwrap();
        assert!(engine.cascade.as_ref().is_some_and(|c| c.flying));

        // Mid-flight the frame comes from the cascade builder.
        engine.tick(500);
        assert!(engine.cascade.is_some());

        engine.tick(2_000);
        assert!(engine.cascade.is_none(), "strip destroyed on completion");
        assert_eq!(engine.current_page(), Some(4));
        assert_eq!(engine.flip_distance(), 720.0);
    }

    #[test]
    fn leaving_cascade_mode_rests_flat() {
        let mut engine = engine_with(6);
        engine.flip_to(2).unwrap();
        engine.set_cascade_mode(true);
        engine.prepare_cascade_flip(5).unwrap();
        engine.set_cascade_mode(false);
        assert!(engine.cascade.is_none());
        assert_eq!(engine.flip_distance(), 360.0);
        assert_eq!(engine.slots.current.as_ref().map(|s| s.index), Some(2));
    }

    #[test]
    fn new_navigation_cancels_running_jobs() {
        let mut engine = engine_with(5);
        engine.smooth_flip_to(4, 0).unwrap();
        assert!(engine.needs_frame());
        engine.flip_to(1).unwrap();
        assert!(!engine.needs_frame());
        assert_eq!(engine.flip_distance(), 180.0);
    }

    #[test]
    fn smooth_flip_to_distance_rests_off_page() {
        let mut engine = engine_with(5);
        engine.smooth_flip_to_distance(200.0, Some(100), 0).unwrap();
        engine.tick(100);
        engine.tick(200);
        assert_eq!(engine.flip_distance(), 200.0);
        // No snap, no page event at the off-page rest.
        let events = engine.drain_events();
        assert!(
            events
                .iter()
                .all(|e| !matches!(e, FlipEvent::FlippedToPage { .. }))
        );

        let err = engine
            .smooth_flip_to_distance(900.0, None, 0)
            .unwrap_err();
        assert!(matches!(err, FlipError::DistanceOutOfRange { .. }));
    }
}
