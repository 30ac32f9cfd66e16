use digitpad::classifier::DigitLabel;
use digitpad::config::AppConfig;
use digitpad::features::{FeatureExtractor, GridSize};
use digitpad::session::{SketchSession, SubmitError};
use digitpad::stroke::PointerEvent;
use digitpad::surface::{BLACK, DrawingSurface, Point, StrokeStyle};
use image::RgbaImage;
use image::imageops::FilterType;

fn session() -> SketchSession {
    SketchSession::new(&AppConfig::default())
}

fn stroke(session: &mut SketchSession, points: &[(f32, f32)]) {
    let mut points = points.iter().map(|&(x, y)| Point::new(x, y));
    if let Some(first) = points.next() {
        session.handle(PointerEvent::Down(first));
    }
    for point in points {
        session.handle(PointerEvent::Move(point));
    }
    session.handle(PointerEvent::Up);
}

/// Deterministic pseudo-random points inside a `side`×`side` surface.
fn scribble(seed: u32, count: usize, side: f32) -> Vec<(f32, f32)> {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state % 10_000) as f32 / 10_000.0 * side
    };
    (0..count).map(|_| (next(), next())).collect()
}

#[test]
fn feature_vector_shape_and_range_hold_for_any_scribble() {
    for seed in 1..=25 {
        let mut session = session();
        stroke(&mut session, &scribble(seed, 12, 200.0));
        stroke(&mut session, &scribble(seed + 100, 5, 200.0));
        let features = session.features().unwrap();
        assert_eq!(features.len(), 400, "seed {seed}");
        assert!(
            features.values().iter().all(|v| (0.0..=1.0).contains(v)),
            "seed {seed} produced out-of-range values"
        );
    }
}

#[test]
fn shape_and_range_hold_for_every_filter_and_grid() {
    let filters = [
        FilterType::Nearest,
        FilterType::Triangle,
        FilterType::CatmullRom,
        FilterType::Gaussian,
        FilterType::Lanczos3,
    ];
    for filter in filters {
        for grid in [GridSize::new(20, 20), GridSize::new(8, 28), GridSize::new(1, 1)] {
            let mut surface = DrawingSurface::new(120, 90, StrokeStyle::default());
            for window in scribble(7, 9, 90.0).windows(2) {
                surface.draw_segment(
                    Point::new(window[0].0, window[0].1),
                    Point::new(window[1].0, window[1].1),
                );
            }
            let features = FeatureExtractor::new(grid, filter).extract(&surface).unwrap();
            assert_eq!(features.len(), grid.cells());
            assert!(features.values().iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
}

#[test]
fn untouched_surface_after_reset_is_all_background() {
    let mut session = session();
    stroke(&mut session, &[(20.0, 20.0), (180.0, 180.0)]);
    session.reset();
    let features = session.features().unwrap();
    assert!(features.values().iter().all(|v| *v < 0.01));
}

#[test]
fn fully_inked_surface_is_all_ink() {
    let mut session = session();
    session
        .surface_mut()
        .paint_image(&RgbaImage::from_pixel(1, 1, BLACK));
    let features = session.features().unwrap();
    assert!(features.values().iter().all(|v| *v > 0.99));
}

#[test]
fn dense_strokes_cover_the_surface_with_ink() {
    let mut session = session();
    for row in 0..=25 {
        let y = row as f32 * 8.0;
        stroke(&mut session, &[(-10.0, y), (210.0, y)]);
    }
    let features = session.features().unwrap();
    assert!(features.values().iter().all(|v| *v > 0.95));
}

#[test]
fn label_five_with_stroke_builds_train_request() {
    let mut session = session();
    stroke(&mut session, &[(100.0, 30.0), (60.0, 30.0), (60.0, 100.0), (140.0, 170.0)]);
    let request = session.train_request("5").unwrap();
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["trainArray"][0]["label"], serde_json::json!(5));
    assert_eq!(json["trainArray"][0]["y0"].as_array().unwrap().len(), 400);
    assert_eq!(request.samples()[0].label, DigitLabel::from_value(5).unwrap());
}

#[test]
fn label_ab_is_rejected() {
    let mut session = session();
    stroke(&mut session, &[(100.0, 30.0), (100.0, 170.0)]);
    assert!(matches!(
        session.train_request("ab"),
        Err(SubmitError::Label(_))
    ));
}

#[test]
fn double_reset_equals_single_reset() {
    let mut once = session();
    let mut twice = session();
    for session in [&mut once, &mut twice] {
        stroke(session, &[(10.0, 10.0), (190.0, 150.0), (30.0, 170.0)]);
    }
    once.reset();
    twice.reset();
    twice.reset();
    assert_eq!(once.surface().pixels(), twice.surface().pixels());
}
