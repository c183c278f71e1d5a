// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Windowed pointer velocity estimation.
//!
//! Keeps recent `(timestamp, coordinate)` samples for the tracked pointer
//! and estimates velocity from the oldest and newest sample inside a
//! short window, which ignores stale history from earlier in the gesture.
//! Estimates are clamped to a configured maximum so a single noisy event
//! pair cannot produce an absurd fling.

use alloc::vec::Vec;

/// Samples older than this (relative to the newest) are discarded.
const WINDOW_MS: u64 = 100;

/// Velocity estimator over one pointer's recent movement.
#[derive(Clone, Debug, Default)]
pub struct VelocityTracker {
    /// `(time_ms, axis coordinate)`, oldest first.
    samples: Vec<(u64, f64)>,
}

impl VelocityTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Records the tracked pointer's axis coordinate at `time_ms`.
    ///
    /// Out-of-order timestamps reset the history; the estimator only
    /// works over a monotonic stream.
    pub fn add_sample(&mut self, time_ms: u64, coordinate: f64) {
        if let Some(&(newest, _)) = self.samples.last()
            && time_ms < newest
        {
            self.samples.clear();
        }
        self.samples.push((time_ms, coordinate));
        let cutoff = time_ms.saturating_sub(WINDOW_MS);
        self.samples.retain(|&(t, _)| t >= cutoff);
    }

    /// Forgets all samples, e.g. when tracking is re-anchored to another
    /// pointer.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Estimates velocity in coordinate units per second, clamped to
    /// `±max`.
    ///
    /// Returns `0.0` when fewer than two samples span a non-zero time.
    #[must_use]
    pub fn velocity(&self, max: f64) -> f64 {
        let (Some(&(t0, c0)), Some(&(t1, c1))) = (self.samples.first(), self.samples.last())
        else {
            return 0.0;
        };
        if t1 <= t0 {
            return 0.0;
        }
        let per_second = (c1 - c0) / (t1 - t0) as f64 * 1000.0;
        per_second.clamp(-max, max)
    }
}
