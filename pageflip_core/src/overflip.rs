// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boundary resistance for distances pushed past the first or last page.
//!
//! An [`OverFlipper`] is constructed for a single [`OverFlipMode`] and owns
//! all state accumulated while the user drags past a boundary. Switching
//! modes means constructing a fresh instance, which resets that state.
//!
//! The damping curve is the same for [`OverFlipMode::Glow`] and
//! [`OverFlipMode::RubberBand`]: the visible excess is
//! `A * x / (x + A)` for an attempted excess `x`, which grows
//! monotonically and saturates just below the asymptote `A`
//! ([`OVER_FLIP_ASYMPTOTE`]). `Glow` additionally exposes a fading edge
//! indicator; `RubberBand` is motion damping only.
//!
//! ## Minimal example
//!
//! ```rust
//! use pageflip_core::overflip::{OverFlipMode, OverFlipper};
//!
//! let mut flipper = OverFlipper::new(OverFlipMode::RubberBand);
//!
//! // Drag 100 units past the end of a 5 page dataset (max 720).
//! let shown = flipper.calculate(820.0, 0.0, 720.0);
//! assert!(shown > 720.0 && shown < 790.0);
//! assert_eq!(flipper.total_over_flip(), 100.0);
//!
//! // Release: transient state is dropped.
//! flipper.on_interaction_end();
//! assert_eq!(flipper.total_over_flip(), 0.0);
//! ```

/// Asymptotic cap, in distance units, on how far past a boundary the
/// damped distance can travel.
pub const OVER_FLIP_ASYMPTOTE: f64 = 70.0;

/// How long the glow indicator takes to fade after the interaction ends.
pub const GLOW_DECAY_MS: u64 = 500;

/// Boundary resistance behavior, selected by hosts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum OverFlipMode {
    /// Hard clamp at the boundary; no over-travel, no indicator.
    None,
    /// Damped over-travel plus a fading glow at the overflowed edge.
    #[default]
    Glow,
    /// Damped over-travel with no visual indicator.
    RubberBand,
}

/// A snapshot of the glow indicator for one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverFlipIndicator {
    /// `true` when the first-page boundary is the one overflowed.
    pub previous_boundary: bool,
    /// Indicator strength in `[0, 1]`.
    pub intensity: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum GlowPhase {
    Idle,
    Held,
    /// Fading after release. The start timestamp is anchored on the first
    /// indicator query after the interaction ended.
    Decaying {
        from: f64,
        previous_boundary: bool,
        start_ms: Option<u64>,
    },
}

/// Boundary resistance state for one [`OverFlipMode`].
#[derive(Clone, Debug)]
pub struct OverFlipper {
    mode: OverFlipMode,
    /// Signed attempted excess; negative when overflowing the first page.
    total: f64,
    glow: GlowPhase,
}

impl OverFlipper {
    /// Creates a flipper for `mode` with no accumulated overflip.
    #[must_use]
    pub fn new(mode: OverFlipMode) -> Self {
        Self {
            mode,
            total: 0.0,
            glow: GlowPhase::Idle,
        }
    }

    /// Returns the mode this flipper was constructed for.
    #[must_use]
    pub fn mode(&self) -> OverFlipMode {
        self.mode
    }

    /// Maps an unconstrained distance into the allowed range plus damped
    /// over-travel.
    ///
    /// Inside `[min, max]` the distance passes through unchanged and any
    /// accumulated overflip is cleared. Outside, the attempted excess is
    /// recorded (see [`total_over_flip`](Self::total_over_flip)) and the
    /// returned distance is the boundary plus the damped excess — or the
    /// boundary itself for [`OverFlipMode::None`].
    #[must_use]
    pub fn calculate(&mut self, distance: f64, min: f64, max: f64) -> f64 {
        if (min..=max).contains(&distance) {
            self.total = 0.0;
            if self.glow == GlowPhase::Held {
                self.glow = GlowPhase::Idle;
            }
            return distance;
        }

        let (bound, excess) = if distance < min {
            (min, distance - min)
        } else {
            (max, distance - max)
        };
        self.total = excess;

        match self.mode {
            OverFlipMode::None => bound,
            OverFlipMode::Glow => {
                self.glow = GlowPhase::Held;
                bound + damp(excess)
            }
            OverFlipMode::RubberBand => bound + damp(excess),
        }
    }

    /// Returns the signed attempted excess; negative values overflow the
    /// first-page boundary.
    #[must_use]
    pub fn total_over_flip(&self) -> f64 {
        self.total
    }

    /// Releases transient drag state once the interaction ends.
    ///
    /// For [`OverFlipMode::Glow`] this starts the indicator fade; callers
    /// should keep requesting frames until
    /// [`indicator`](Self::indicator) returns `None`.
    pub fn on_interaction_end(&mut self) {
        if self.mode == OverFlipMode::Glow && self.glow == GlowPhase::Held {
            self.glow = GlowPhase::Decaying {
                from: self.held_intensity(),
                previous_boundary: self.total < 0.0,
                start_ms: None,
            };
        }
        self.total = 0.0;
    }

    /// Returns the indicator to draw this frame, if any.
    ///
    /// Only [`OverFlipMode::Glow`] produces one. While the boundary is
    /// held, intensity tracks the damped excess; after release it fades
    /// to zero over [`GLOW_DECAY_MS`].
    pub fn indicator(&mut self, now_ms: u64) -> Option<OverFlipIndicator> {
        match self.glow {
            GlowPhase::Idle => None,
            GlowPhase::Held => Some(OverFlipIndicator {
                previous_boundary: self.total < 0.0,
                intensity: self.held_intensity(),
            }),
            GlowPhase::Decaying {
                from,
                previous_boundary,
                start_ms,
            } => {
                let start = match start_ms {
                    Some(start) => start,
                    None => {
                        self.glow = GlowPhase::Decaying {
                            from,
                            previous_boundary,
                            start_ms: Some(now_ms),
                        };
                        now_ms
                    }
                };
                let elapsed = now_ms.saturating_sub(start);
                if elapsed >= GLOW_DECAY_MS {
                    self.glow = GlowPhase::Idle;
                    return None;
                }
                let t = elapsed as f64 / GLOW_DECAY_MS as f64;
                Some(OverFlipIndicator {
                    previous_boundary,
                    intensity: from * (1.0 - t),
                })
            }
        }
    }

    /// Returns `true` while the indicator still needs frames.
    #[must_use]
    pub fn is_indicator_visible(&self) -> bool {
        self.glow != GlowPhase::Idle
    }

    fn held_intensity(&self) -> f64 {
        (damp(self.total).abs() / OVER_FLIP_ASYMPTOTE).min(1.0)
    }
}

/// Saturating damping curve, antisymmetric around zero.
fn damp(excess: f64) -> f64 {
    let x = excess.abs();
    let damped = OVER_FLIP_ASYMPTOTE * x / (x + OVER_FLIP_ASYMPTOTE);
    if excess < 0.0 { -damped } else { damped }
}
