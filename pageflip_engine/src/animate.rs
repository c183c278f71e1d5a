// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timed animation jobs: flings to a target distance and peek hints.
//!
//! Jobs are sampled, not stepped: each holds its start timestamp and
//! duration, and [`AnimationDriver::tick`] evaluates both active jobs at
//! the host-supplied time. Fling durations follow a square-root law in
//! the flipped distance, so flipping ten pages takes noticeably — but
//! not ten times — longer than flipping one.
//!
//! At most one fling and one peek exist at a time. Starting a new fling
//! replaces the old one; a fling never cancels a peek (or vice versa)
//! except through the explicit [`AnimationDriver::end_fling`] /
//! [`AnimationDriver::end_peek`] calls, whose return value tells the
//! caller whether an in-flight job was actually interrupted — that is
//! what lets a touch-down hand off an interrupted animation directly
//! into a drag.

use pageflip_core::FLIP_DISTANCE_PER_PAGE;

#[cfg(all(not(feature = "std"), feature = "libm"))]
fn sqrt(x: f64) -> f64 {
    libm::sqrt(x)
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
fn cos(x: f64) -> f64 {
    libm::cos(x)
}

#[cfg(feature = "std")]
fn sqrt(x: f64) -> f64 {
    f64::sqrt(x)
}

#[cfg(feature = "std")]
fn cos(x: f64) -> f64 {
    f64::cos(x)
}

/// Easing profile applied to a job's normalized time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Constant speed.
    Linear,
    /// Fast start, easing out: `1 - (1 - t)^2`.
    Decelerate,
    /// Slow start and end: `cos((t + 1)π) / 2 + 0.5`.
    AccelerateDecelerate,
}

impl Interpolation {
    /// Maps normalized time `t ∈ [0, 1]` through the profile.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Decelerate => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            Self::AccelerateDecelerate => cos((t + 1.0) * core::f64::consts::PI) / 2.0 + 0.5,
        }
    }
}

/// Duration for a fling over `delta` distance units.
///
/// Sub-linear in the distance: `max_single_page_ms * sqrt(|delta| / 180)`.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "durations are small positive millisecond counts"
)]
pub fn fling_duration_ms(delta: f64, max_single_page_ms: u64) -> u64 {
    (max_single_page_ms as f64 * sqrt(delta.abs() / FLIP_DISTANCE_PER_PAGE)) as u64
}

#[derive(Copy, Clone, Debug)]
struct FlingJob {
    start: f64,
    end: f64,
    start_ms: u64,
    duration_ms: u64,
    interpolation: Interpolation,
    explicit_distance: bool,
}

impl FlingJob {
    fn sample(&self, now_ms: u64) -> (f64, bool) {
        if self.duration_ms == 0 || now_ms >= self.start_ms + self.duration_ms {
            return (self.end, true);
        }
        let t = now_ms.saturating_sub(self.start_ms) as f64 / self.duration_ms as f64;
        let eased = self.interpolation.apply(t);
        (self.start + (self.end - self.start) * eased, false)
    }
}

#[derive(Copy, Clone, Debug)]
struct PeekJob {
    base: f64,
    delta: f64,
    start_ms: u64,
    /// One leg (base to apex, or apex back to base).
    leg_ms: u64,
    /// `true` runs exactly two legs; `false` oscillates until cancelled.
    once: bool,
}

impl PeekJob {
    fn sample(&self, now_ms: u64) -> (f64, bool) {
        if self.leg_ms == 0 {
            return (self.base, true);
        }
        let elapsed = now_ms.saturating_sub(self.start_ms);
        let leg = elapsed / self.leg_ms;
        if self.once && leg >= 2 {
            return (self.base, true);
        }
        let t = (elapsed % self.leg_ms) as f64 / self.leg_ms as f64;
        // Odd legs run in reverse, back toward the base.
        let t = if leg % 2 == 1 { 1.0 - t } else { t };
        let eased = Interpolation::AccelerateDecelerate.apply(t);
        (self.base + self.delta * eased, false)
    }
}

/// A finished fling, reported once from [`AnimationDriver::tick`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlingFinished {
    /// The fling's destination distance.
    pub end: f64,
    /// `true` when the destination was an arbitrary distance rather than
    /// a page boundary; settle logic must not snap it.
    pub explicit_distance: bool,
}

/// Everything one tick produced.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Tick {
    /// New distance to commit, if any job is (or just was) running.
    /// When both jobs ran this tick, the peek wins.
    pub distance: Option<f64>,
    /// Set on the tick a fling reaches its destination.
    pub fling_finished: Option<FlingFinished>,
    /// Set on the tick a one-shot peek returns to its base distance.
    pub peek_finished: Option<f64>,
}

/// Owns the at-most-one fling and at-most-one peek job.
#[derive(Copy, Clone, Debug, Default)]
pub struct AnimationDriver {
    fling: Option<FlingJob>,
    peek: Option<PeekJob>,
}

impl AnimationDriver {
    /// Creates an idle driver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while any job is in flight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.fling.is_some() || self.peek.is_some()
    }

    /// Returns `true` while a fling is in flight.
    #[must_use]
    pub fn is_flinging(&self) -> bool {
        self.fling.is_some()
    }

    /// Starts a fling from `start` to `end`, replacing any current one.
    pub fn start_fling(
        &mut self,
        start: f64,
        end: f64,
        now_ms: u64,
        duration_ms: u64,
        interpolation: Interpolation,
        explicit_distance: bool,
    ) {
        self.fling = Some(FlingJob {
            start,
            end,
            start_ms: now_ms,
            duration_ms,
            interpolation,
            explicit_distance,
        });
    }

    /// Starts a peek oscillation around `base`, replacing any current one.
    ///
    /// The apex is `base + delta`; each leg lasts `leg_ms`. A `once` peek
    /// runs out and back a single time, otherwise it oscillates until
    /// explicitly ended or interrupted by a gesture.
    pub fn start_peek(&mut self, base: f64, delta: f64, now_ms: u64, leg_ms: u64, once: bool) {
        self.peek = Some(PeekJob {
            base,
            delta,
            start_ms: now_ms,
            leg_ms,
            once,
        });
    }

    /// Cancels the fling. Idempotent; returns whether one was in flight.
    pub fn end_fling(&mut self) -> bool {
        self.fling.take().is_some()
    }

    /// Cancels the peek. Idempotent; returns whether one was in flight.
    pub fn end_peek(&mut self) -> bool {
        self.peek.take().is_some()
    }

    /// Samples both jobs at `now_ms`, retiring the ones that finished.
    pub fn tick(&mut self, now_ms: u64) -> Tick {
        let mut result = Tick::default();

        if let Some(fling) = self.fling {
            let (value, done) = fling.sample(now_ms);
            result.distance = Some(value);
            if done {
                result.fling_finished = Some(FlingFinished {
                    end: fling.end,
                    explicit_distance: fling.explicit_distance,
                });
                self.fling = None;
            }
        }

        if let Some(peek) = self.peek {
            let (value, done) = peek.sample(now_ms);
            result.distance = Some(value);
            if done {
                result.peek_finished = Some(peek.base);
                result.distance = Some(peek.base);
                self.peek = None;
            }
        }

        result
    }
}
