// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Assembly of committed flip state into an ordered frame description.
//!
//! This module is the boundary between the engine's state and whatever
//! actually rasterizes pages. A frame is described as a sequence of
//! [`FrameOp`]s in paint order: page draws (clipped, optionally rotated
//! around the viewport center line) and region fills for the shading
//! overlays. Handles are opaque to this crate, in the spirit of an
//! imaging IR; the host resolves them to real views or textures.
//!
//! Four overlay families exist, each a linear function of
//! [`degrees_flipped`] within its half-range:
//!
//! - *shadow* on the non-turning halves, strongest away from the
//!   perpendicular (max 127/255);
//! - *shine* on the front half of the turning leaf over `[0°, 90°]`
//!   (max 100/255);
//! - *shade* on the back half over `[90°, 180°]`, zero at the
//!   perpendicular (max 130/255);
//! - a directional *gradient* across the turning leaf (max 255/255).
//!
//! When the distance rests on a page boundary (within
//! [`SETTLE_EPSILON`](crate::SETTLE_EPSILON)) the frame degenerates to a
//! single flat page draw with no transform, no overlays, and the layer
//! hint released.

use kurbo::{Rect, Size};
use peniko::Color;
use smallvec::SmallVec;

use crate::FlipAxis;
use crate::cascade::CascadeStrip;
use crate::distance::{degrees_flipped, is_settled};

/// Peak shadow alpha on the settled halves, out of 255.
pub const MAX_SHADOW_ALPHA: u8 = 127;
/// Peak gradient alpha across the turning leaf, out of 255.
pub const MAX_GRADIENT_ALPHA: u8 = 255;
/// Peak shade alpha on the back half of the turning leaf, out of 255.
pub const MAX_SHADE_ALPHA: u8 = 130;
/// Peak shine alpha on the front half of the turning leaf, out of 255.
pub const MAX_SHINE_ALPHA: u8 = 100;

bitflags::bitflags! {
    /// Which overlay families a frame may emit.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct RenderEffects: u8 {
        /// Shadows over the settled halves.
        const SHADOWS = 1 << 0;
        /// Shine and shade on the turning leaf.
        const SHADE_SHINE = 1 << 1;
        /// Directional gradient on the turning leaf.
        const GRADIENT = 1 << 2;
        /// The overflip glow indicator.
        const OVER_FLIP = 1 << 3;
    }
}

impl Default for RenderEffects {
    fn default() -> Self {
        Self::all()
    }
}

/// Overlay colors and effect toggles for frame building.
#[derive(Clone, Debug)]
pub struct RenderStyle {
    /// Enabled overlay families.
    pub effects: RenderEffects,
    /// Shadow fill over the settled halves.
    pub shadow_color: Color,
    /// Shade fill on the back half of the turning leaf.
    pub shade_color: Color,
    /// Shine fill on the front half of the turning leaf.
    pub shine_color: Color,
    /// Gradient color at the spine.
    pub gradient_start: Color,
    /// Gradient color at the outer edge.
    pub gradient_end: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            effects: RenderEffects::default(),
            shadow_color: Color::BLACK,
            shade_color: Color::BLACK,
            shine_color: Color::WHITE,
            gradient_start: Color::BLACK,
            gradient_end: Color::WHITE,
        }
    }
}

/// The overlay family a region fill belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OverlayKind {
    /// Darkening over a settled half.
    Shadow,
    /// Darkening on the back of the turning leaf.
    Shade,
    /// Highlight on the front of the turning leaf.
    Shine,
    /// Directional gradient across the turning leaf.
    Gradient,
}

/// A translucent region fill.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Overlay {
    /// Which family produced this fill.
    pub kind: OverlayKind,
    /// Region to fill, in viewport coordinates.
    pub region: Rect,
    /// Fill color with the computed opacity already applied.
    pub color: Color,
    /// The computed opacity, out of 255.
    pub alpha: u8,
}

/// One element of a frame, in paint order.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOp<H> {
    /// Paint a page view.
    Page {
        /// Opaque view handle, resolved by the host.
        handle: H,
        /// Clip region in viewport coordinates.
        clip: Rect,
        /// Rotation in signed degrees around the viewport center line of
        /// the flip axis, following the host camera convention; `None`
        /// paints the view flat.
        rotation: Option<f64>,
        /// Suggests keeping an accelerated layer for this view.
        layer_hint: bool,
        /// Fills painted after the view, inside its clip and transform.
        overlays: SmallVec<[Overlay; 2]>,
    },
    /// Fill a region with no associated view and no transform.
    Overlay(Overlay),
}

/// Everything a host needs to paint one frame.
#[derive(Clone, Debug)]
pub struct FrameDescriptor<H> {
    /// Elements in paint order, first element deepest.
    pub ops: SmallVec<[FrameOp<H>; 6]>,
}

impl<H> Default for FrameDescriptor<H> {
    fn default() -> Self {
        Self {
            ops: SmallVec::new(),
        }
    }
}

/// The three page slots surrounding the current position.
#[derive(Clone, Debug)]
pub struct PageWindow<H> {
    /// Page before the current one, if materialized.
    pub previous: Option<H>,
    /// The current page, if materialized.
    pub current: Option<H>,
    /// Page after the current one, if materialized.
    pub next: Option<H>,
}

impl<H> Default for PageWindow<H> {
    fn default() -> Self {
        Self {
            previous: None,
            current: None,
            next: None,
        }
    }
}

/// Returns the half-region behind the turning leaf (top or left).
#[must_use]
pub fn previous_half(axis: FlipAxis, size: Size) -> Rect {
    match axis {
        FlipAxis::Vertical => Rect::new(0.0, 0.0, size.width, size.height / 2.0),
        FlipAxis::Horizontal => Rect::new(0.0, 0.0, size.width / 2.0, size.height),
    }
}

/// Returns the half-region ahead of the turning leaf (bottom or right).
#[must_use]
pub fn next_half(axis: FlipAxis, size: Size) -> Rect {
    match axis {
        FlipAxis::Vertical => Rect::new(0.0, size.height / 2.0, size.width, size.height),
        FlipAxis::Horizontal => Rect::new(size.width / 2.0, 0.0, size.width, size.height),
    }
}

/// Signed camera rotation for a leaf at `degrees`, per axis.
///
/// Matches the usual 3-D camera convention: a vertical flip rotates about
/// the X axis (`degrees` on the front side, `degrees - 180` once past the
/// perpendicular), a horizontal flip about Y with mirrored signs.
#[must_use]
pub fn rotation_for(axis: FlipAxis, degrees: f64) -> f64 {
    match (axis, degrees > 90.0) {
        (FlipAxis::Vertical, false) => degrees,
        (FlipAxis::Vertical, true) => degrees - 180.0,
        (FlipAxis::Horizontal, false) => -degrees,
        (FlipAxis::Horizontal, true) => 180.0 - degrees,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "ratio is clamped to [0, 1] so the product fits in u8"
)]
fn scaled_alpha(ratio: f64, max: u8) -> u8 {
    (ratio.clamp(0.0, 1.0) * f64::from(max)) as u8
}

fn overlay(kind: OverlayKind, region: Rect, base: Color, ratio: f64, max: u8) -> Overlay {
    let alpha = scaled_alpha(ratio, max);
    Overlay {
        kind,
        region,
        color: base.with_alpha(f32::from(alpha) / 255.0),
        alpha,
    }
}

/// Builds the frame for the standard three-slot mode.
///
/// `distance` is the committed flip distance; `window` holds whichever of
/// the three surrounding pages are materialized. Missing pages simply
/// skip their draw (their half shows the host background), but shadows
/// still apply — that is what darkens the exposed half during an
/// overflip at the dataset edges.
#[must_use]
pub fn sequential_frame<H: Clone>(
    size: Size,
    axis: FlipAxis,
    distance: f64,
    window: &PageWindow<H>,
    style: &RenderStyle,
) -> FrameDescriptor<H> {
    let mut ops = SmallVec::new();

    if is_settled(distance) {
        if let Some(current) = &window.current {
            ops.push(FrameOp::Page {
                handle: current.clone(),
                clip: size.to_rect(),
                rotation: None,
                layer_hint: false,
                overlays: SmallVec::new(),
            });
        }
        return FrameDescriptor { ops };
    }

    let deg = degrees_flipped(distance);
    let prev_rect = previous_half(axis, size);
    let next_rect = next_half(axis, size);

    // Previous (top/left) half: already-turned side.
    let prev_page = if deg >= 90.0 {
        &window.previous
    } else {
        &window.current
    };
    if let Some(handle) = prev_page {
        ops.push(FrameOp::Page {
            handle: handle.clone(),
            clip: prev_rect,
            rotation: None,
            layer_hint: true,
            overlays: SmallVec::new(),
        });
    }
    if style.effects.contains(RenderEffects::SHADOWS) && deg > 90.0 {
        ops.push(FrameOp::Overlay(overlay(
            OverlayKind::Shadow,
            prev_rect,
            style.shadow_color,
            (deg - 90.0) / 90.0,
            MAX_SHADOW_ALPHA,
        )));
    }

    // Next (bottom/right) half: still-to-come side.
    let next_page = if deg >= 90.0 {
        &window.current
    } else {
        &window.next
    };
    if let Some(handle) = next_page {
        ops.push(FrameOp::Page {
            handle: handle.clone(),
            clip: next_rect,
            rotation: None,
            layer_hint: true,
            overlays: SmallVec::new(),
        });
    }
    if style.effects.contains(RenderEffects::SHADOWS) && deg > 0.0 && deg <= 90.0 {
        ops.push(FrameOp::Overlay(overlay(
            OverlayKind::Shadow,
            next_rect,
            style.shadow_color,
            (90.0 - deg) / 90.0,
            MAX_SHADOW_ALPHA,
        )));
    }

    // The turning leaf, clipped to whichever half it currently occupies.
    if let Some(current) = &window.current {
        let mut overlays = SmallVec::new();
        if style.effects.contains(RenderEffects::SHADE_SHINE) {
            if deg <= 90.0 {
                overlays.push(overlay(
                    OverlayKind::Shine,
                    next_rect,
                    style.shine_color,
                    deg / 90.0,
                    MAX_SHINE_ALPHA,
                ));
            }
            if deg >= 90.0 {
                overlays.push(overlay(
                    OverlayKind::Shade,
                    prev_rect,
                    style.shade_color,
                    (deg - 90.0) / 90.0,
                    MAX_SHADE_ALPHA,
                ));
            }
        }
        if style.effects.contains(RenderEffects::GRADIENT) {
            if deg > 0.0 && deg <= 90.0 {
                overlays.push(overlay(
                    OverlayKind::Gradient,
                    next_rect,
                    style.gradient_start,
                    deg / 90.0,
                    MAX_GRADIENT_ALPHA,
                ));
            } else if deg > 90.0 {
                overlays.push(overlay(
                    OverlayKind::Gradient,
                    prev_rect,
                    style.gradient_end,
                    (180.0 - deg) / 90.0,
                    MAX_GRADIENT_ALPHA,
                ));
            }
        }

        ops.push(FrameOp::Page {
            handle: current.clone(),
            clip: if deg > 90.0 { prev_rect } else { next_rect },
            rotation: Some(rotation_for(axis, deg)),
            layer_hint: true,
            overlays,
        });
    }

    FrameDescriptor { ops }
}

/// Builds the frame for cascade mode.
///
/// `views` is the materialized strip, `strip` its geometry, and
/// `distance` the strip-local distance. The two window-edge views paint
/// flat behind the fan; the turning slots then paint in the order
/// resolved by [`CascadeStrip::draw_order`].
#[must_use]
pub fn cascade_frame<H: Clone>(
    size: Size,
    axis: FlipAxis,
    distance: f64,
    views: &[H],
    strip: &CascadeStrip,
) -> FrameDescriptor<H> {
    debug_assert_eq!(views.len(), strip.len(), "strip geometry out of sync");

    let mut ops = SmallVec::new();
    if views.is_empty() {
        return FrameDescriptor { ops };
    }

    let prev_rect = previous_half(axis, size);
    let next_rect = next_half(axis, size);

    let prev_idx = strip.prev_visible_index(distance);
    if let Some(handle) = views.get(prev_idx) {
        ops.push(FrameOp::Page {
            handle: handle.clone(),
            clip: prev_rect,
            rotation: None,
            layer_hint: true,
            overlays: SmallVec::new(),
        });
    }

    let next_idx = strip.next_visible_index(distance);
    if let Some(handle) = views.get(next_idx) {
        ops.push(FrameOp::Page {
            handle: handle.clone(),
            clip: next_rect,
            rotation: None,
            layer_hint: true,
            overlays: SmallVec::new(),
        });
    }

    for entry in strip.draw_order(distance) {
        let Some(handle) = views.get(entry.view_index) else {
            continue;
        };
        ops.push(FrameOp::Page {
            handle: handle.clone(),
            clip: if entry.front_half { next_rect } else { prev_rect },
            rotation: Some(rotation_for(axis, entry.degrees)),
            layer_hint: true,
            overlays: SmallVec::new(),
        });
    }

    FrameDescriptor { ops }
}
