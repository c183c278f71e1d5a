// Copyright 2026 the Pageflip Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios driven through the public engine API only.

use kurbo::{Point, Size};
use pageflip_engine::{
    FLIP_DISTANCE_PER_PAGE, FlipAxis, FlipConfig, FlipEngine, FlipError, FlipEvent, OverFlipMode,
    PageAdapter, PointerEvent, PointerPhase,
};

#[derive(Debug, Default)]
struct RecordingAdapter {
    len: usize,
    materialized: Vec<usize>,
    fresh: u32,
}

impl RecordingAdapter {
    fn new(len: usize) -> Self {
        Self {
            len,
            ..Self::default()
        }
    }
}

impl PageAdapter for RecordingAdapter {
    type Handle = u32;

    fn len(&self) -> usize {
        self.len
    }

    fn materialize(&mut self, index: usize, recycled: Option<u32>) -> u32 {
        self.materialized.push(index);
        recycled.unwrap_or_else(|| {
            self.fresh += 1;
            self.fresh
        })
    }
}

fn engine(len: usize) -> FlipEngine<RecordingAdapter> {
    let mut engine = FlipEngine::new(FlipConfig::default());
    engine.set_viewport(Size::new(400.0, 600.0));
    engine.set_adapter(RecordingAdapter::new(len));
    engine.drain_events();
    engine
}

fn pointer(phase: PointerPhase, y: f64, time_ms: u64) -> PointerEvent {
    PointerEvent {
        phase,
        pointer: 1,
        position: Point::new(200.0, y),
        time_ms,
    }
}

#[test]
fn flip_to_materializes_the_surrounding_window() {
    let mut engine = engine(5);
    engine.flip_to(2).unwrap();

    assert_eq!(engine.current_page(), Some(2));
    assert_eq!(engine.flip_distance(), 2.0 * FLIP_DISTANCE_PER_PAGE);
    assert_eq!(engine.frame().ops.len(), 1, "settled frame is one flat page");

    // The jump rebuilt the window in previous, current, next order.
    let recorded = &engine.adapter().unwrap().materialized;
    assert!(recorded.ends_with(&[1, 2, 3]), "window fill was {recorded:?}");
}

#[test]
fn out_of_range_navigation_fails_without_side_effects() {
    let mut engine = engine(5);
    engine.flip_to(2).unwrap();
    engine.drain_events();

    assert_eq!(
        engine.flip_to(7),
        Err(FlipError::PageOutOfRange { page: 7, count: 5 })
    );
    assert_eq!(engine.current_page(), Some(2));
    assert_eq!(engine.flip_distance(), 360.0);
    assert!(engine.drain_events().is_empty());
}

#[test]
fn perpendicular_frame_hits_the_alpha_crossover() {
    let mut engine = engine(5);
    // 450 units: 90° into the turn from page 2 toward page 3.
    engine.set_flip_distance(450.0);
    engine.tick(0);

    let frame = engine.frame();
    let mut shine = None;
    let mut shade = None;
    for op in &frame.ops {
        if let pageflip_engine::FrameOp::Page { overlays, .. } = op {
            for overlay in overlays {
                match overlay.kind {
                    pageflip_engine::OverlayKind::Shine => shine = Some(overlay.alpha),
                    pageflip_engine::OverlayKind::Shade => shade = Some(overlay.alpha),
                    _ => {}
                }
            }
        }
    }
    assert_eq!(shine, Some(100), "front shine peaks at the perpendicular");
    assert_eq!(shade, Some(0), "back shade starts at zero there");
}

#[test]
fn fast_forward_release_floors_to_the_nearer_lower_page() {
    let mut engine = engine(5);
    engine.set_flip_distance(200.0);
    engine.drain_events();

    // Flick downward (positive velocity): slop move, one drag move, lift.
    engine.handle_pointer(pointer(PointerPhase::Down, 300.0, 0));
    assert!(engine.handle_pointer(pointer(PointerPhase::Move, 315.0, 10)));
    engine.handle_pointer(pointer(PointerPhase::Move, 330.0, 20));
    engine.handle_pointer(pointer(PointerPhase::Up, 345.0, 30));

    // Velocity is ~1500 units/s, well above the minimum: the target is
    // floor(distance / 180) = page 1, never the rounded page 1..2 choice.
    for t in (100..2_000).step_by(100) {
        engine.tick(t);
    }
    assert_eq!(engine.flip_distance(), 180.0);
    assert_eq!(engine.current_page(), Some(1));

    let events = engine.drain_events();
    assert!(
        events
            .iter()
            .any(|e| matches!(e, FlipEvent::FlippedToPage { page: 1, .. })),
        "missing landing event in {events:?}"
    );
}

#[test]
fn slow_release_rounds_to_the_nearest_page() {
    let mut engine = engine(5);
    engine.set_flip_distance(280.0);
    engine.drain_events();

    engine.handle_pointer(pointer(PointerPhase::Down, 300.0, 0));
    engine.handle_pointer(pointer(PointerPhase::Move, 312.0, 100));
    // Long pause: the release velocity decays to ~0.
    engine.handle_pointer(pointer(PointerPhase::Up, 313.0, 600));

    for t in (700..2_500).step_by(100) {
        engine.tick(t);
    }
    // 280 - the small drag lands near 270..280; round(…/180) = 2.
    assert_eq!(engine.current_page(), Some(2));
    assert_eq!(engine.flip_distance(), 360.0);
}

#[test]
fn orthogonal_gesture_is_never_claimed() {
    let mut engine = engine(5);
    engine.handle_pointer(pointer(PointerPhase::Down, 300.0, 0));
    let claimed = engine.handle_pointer(PointerEvent {
        phase: PointerPhase::Move,
        pointer: 1,
        position: Point::new(260.0, 302.0),
        time_ms: 16,
    });
    assert!(!claimed);
    // The rest of the gesture stays unclaimed.
    assert!(!engine.handle_pointer(pointer(PointerPhase::Move, 400.0, 32)));
    assert_eq!(engine.flip_distance(), 0.0);
}

#[test]
fn dragging_past_the_last_page_reports_and_damps_the_overflip() {
    let mut engine = engine(3);
    engine.flip_to(2).unwrap();
    engine.drain_events();
    let max = 2.0 * FLIP_DISTANCE_PER_PAGE;

    engine.handle_pointer(pointer(PointerPhase::Down, 500.0, 0));
    engine.handle_pointer(pointer(PointerPhase::Move, 480.0, 10));
    // Keep pulling upward, far past the boundary.
    engine.handle_pointer(pointer(PointerPhase::Move, 200.0, 60));

    assert!(engine.flip_distance() > max, "damped over-travel visible");
    assert!(
        engine.flip_distance() < max + 70.0,
        "over-travel saturates below the asymptote"
    );

    let events = engine.drain_events();
    let magnitudes: Vec<f64> = events
        .iter()
        .filter_map(|e| match e {
            FlipEvent::OverFlip {
                previous_boundary: false,
                magnitude,
                ..
            } => Some(*magnitude),
            _ => None,
        })
        .collect();
    assert!(!magnitudes.is_empty());
    assert!(magnitudes.iter().any(|&m| m > 0.0));

    // Release: terminal zero-magnitude notifications for both boundaries.
    engine.handle_pointer(pointer(PointerPhase::Up, 200.0, 80));
    let events = engine.drain_events();
    let terminal: Vec<bool> = events
        .iter()
        .filter_map(|e| match e {
            FlipEvent::OverFlip {
                magnitude,
                previous_boundary,
                ..
            } if *magnitude == 0.0 => Some(*previous_boundary),
            _ => None,
        })
        .collect();
    assert!(terminal.contains(&true) && terminal.contains(&false));

    // The fling settles back inside the dataset.
    for t in (100..2_000).step_by(100) {
        engine.tick(t);
    }
    assert_eq!(engine.flip_distance(), max);
}

#[test]
fn glow_indicator_decays_after_release() {
    let mut engine = engine(2);
    assert_eq!(engine.over_flip_mode(), OverFlipMode::Glow);
    engine.flip_to(1).unwrap();

    engine.handle_pointer(pointer(PointerPhase::Down, 500.0, 0));
    engine.handle_pointer(pointer(PointerPhase::Move, 480.0, 10));
    engine.handle_pointer(pointer(PointerPhase::Move, 300.0, 50));
    engine.tick(50);
    let held = engine.over_flip_indicator().expect("held glow");
    assert!(held.intensity > 0.0);
    assert!(!held.previous_boundary);

    engine.handle_pointer(pointer(PointerPhase::Up, 300.0, 60));
    engine.tick(100);
    assert!(engine.over_flip_indicator().is_some(), "still fading");
    assert!(engine.needs_frame());

    // Run the fling and the fade out completely.
    for t in (100..3_000).step_by(50) {
        engine.tick(t);
    }
    assert!(engine.over_flip_indicator().is_none());
    assert!(!engine.needs_frame());
}

#[test]
fn rubber_band_mode_has_no_indicator() {
    let mut engine = engine(2);
    engine.set_over_flip_mode(OverFlipMode::RubberBand);
    engine.flip_to(1).unwrap();

    engine.handle_pointer(pointer(PointerPhase::Down, 500.0, 0));
    engine.handle_pointer(pointer(PointerPhase::Move, 480.0, 10));
    engine.handle_pointer(pointer(PointerPhase::Move, 300.0, 50));
    engine.tick(50);
    assert!(engine.flip_distance() > 180.0, "damped travel still happens");
    assert!(engine.over_flip_indicator().is_none());
}

#[test]
fn horizontal_axis_flips_along_x() {
    let config = FlipConfig {
        axis: FlipAxis::Horizontal,
        ..FlipConfig::default()
    };
    let mut engine = FlipEngine::new(config);
    engine.set_viewport(Size::new(400.0, 600.0));
    engine.set_adapter(RecordingAdapter::new(5));
    engine.drain_events();

    engine.handle_pointer(PointerEvent {
        phase: PointerPhase::Down,
        pointer: 1,
        position: Point::new(300.0, 200.0),
        time_ms: 0,
    });
    // Leftward travel: forward flip on the horizontal axis.
    let claimed = engine.handle_pointer(PointerEvent {
        phase: PointerPhase::Move,
        pointer: 1,
        position: Point::new(280.0, 201.0),
        time_ms: 10,
    });
    assert!(claimed);
    engine.handle_pointer(PointerEvent {
        phase: PointerPhase::Move,
        pointer: 1,
        position: Point::new(250.0, 202.0),
        time_ms: 20,
    });
    assert!(engine.flip_distance() > 0.0);
}

#[test]
fn distance_events_follow_every_commit() {
    let mut engine = engine(5);
    engine.set_flip_distance(90.0);
    engine.set_flip_distance(135.0);
    let distances: Vec<f64> = engine
        .drain_events()
        .iter()
        .filter_map(|e| match e {
            FlipEvent::DistanceChanged { distance } => Some(*distance),
            _ => None,
        })
        .collect();
    assert_eq!(distances, vec![90.0, 135.0]);
}

#[test]
fn cascade_round_trip_lands_flat_on_the_target() {
    let mut engine = engine(8);
    engine.set_cascade_mode(true);
    engine.prepare_cascade_flip(6).unwrap();
    engine.smooth_flip_to(6, 0).unwrap();

    // Mid-flight frames fan several leaves at once.
    engine.tick(400);
    let frame = engine.frame();
    assert!(frame.ops.len() > 2, "fan-out draws more than the two edges");

    engine.tick(2_000);
    assert_eq!(engine.current_page(), Some(6));
    assert_eq!(engine.flip_distance(), 6.0 * FLIP_DISTANCE_PER_PAGE);
    let frame = engine.frame();
    assert_eq!(frame.ops.len(), 1, "settled again after the flight");
}

#[test]
fn touch_interrupts_a_fling_into_a_drag() {
    let mut engine = engine(5);
    engine.smooth_flip_to(4, 0).unwrap();
    engine.tick(100);
    let mid_flight = engine.flip_distance();
    assert!(mid_flight > 0.0 && mid_flight < 720.0);

    // Touch down mid-animation: the engine claims immediately, no slop.
    let claimed = engine.handle_pointer(pointer(PointerPhase::Down, 300.0, 110));
    assert!(claimed);
    engine.tick(200);
    assert_eq!(
        engine.flip_distance(),
        mid_flight,
        "fling stopped where the finger caught it"
    );
}
