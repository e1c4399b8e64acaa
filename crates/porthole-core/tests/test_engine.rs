mod common;

use std::io::Cursor;
use std::sync::atomic::Ordering;

use approx::assert_relative_eq;

use porthole_core::config::EngineConfig;
use porthole_core::engine::{CropEngine, CropResolution};
use porthole_core::error::PortholeError;
use porthole_core::gesture::{PointerPhase, TouchPoint};
use porthole_core::source::SourceImage;

fn p(x: f32, y: f32) -> TouchPoint {
    TouchPoint::new(x, y)
}

fn engine_300() -> CropEngine {
    CropEngine::new(EngineConfig {
        viewport_width: 300,
        viewport_height: 300,
        ..EngineConfig::default()
    })
    .unwrap()
}

fn load_gradient(engine: &mut CropEngine, width: u32, height: u32) {
    let decoder = porthole_core::source::MemoryRegionDecoder::new(common::gradient_image(
        width, height,
    ));
    engine
        .set_source(SourceImage::from_decoder(Box::new(decoder)).unwrap())
        .unwrap();
}

// ---------------------------------------------------------------------------
// Loading and the fitted view
// ---------------------------------------------------------------------------

#[test]
fn test_load_resets_to_fitted_geometry() {
    // 4000x3000 into a 300x300 viewport (radius 120).
    let mut engine = engine_300();
    load_gradient(&mut engine, 4000, 3000);

    let g = engine.geometry().unwrap();
    assert_relative_eq!(g.zoom, 0.08, epsilon = 1e-6);
    assert_relative_eq!(g.center_x, 2000.0);
    assert_relative_eq!(g.center_y, 1500.0);
    // Default quality 4/9 -> display scale 0.5 -> ideal 25 -> factor 16.
    assert_eq!(engine.sampling().sample_factor, 16);
    assert!(engine.preview().is_some());
}

#[test]
fn test_load_from_reader() {
    let mut bytes = Vec::new();
    common::gradient_image(640, 480)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    let mut engine = engine_300();
    engine.set_source_reader(Cursor::new(bytes)).unwrap();
    assert_eq!(engine.source_dimensions(), Some((640, 480)));
}

#[test]
fn test_load_replaces_previous_source() {
    let mut engine = engine_300();
    load_gradient(&mut engine, 4000, 3000);
    load_gradient(&mut engine, 800, 600);
    assert_eq!(engine.source_dimensions(), Some((800, 600)));
    let g = engine.geometry().unwrap();
    assert_relative_eq!(g.center_x, 400.0);
    assert_relative_eq!(g.zoom, 0.4, epsilon = 1e-6);
}

#[test]
fn test_resize_refits_view() {
    let mut engine = engine_300();
    load_gradient(&mut engine, 800, 600);
    engine.set_zoom(2.0).unwrap();

    engine.resize(100, 100).unwrap();
    let g = engine.geometry().unwrap();
    // Radius 40: fitted zoom is 80/600.
    assert_relative_eq!(g.zoom, 80.0 / 600.0, epsilon = 1e-6);
    assert_relative_eq!(g.center_x, 400.0);
}

#[test]
fn test_resize_rejects_degenerate_viewport() {
    let mut engine = engine_300();
    assert!(engine.resize(1, 1).is_err());
}

// ---------------------------------------------------------------------------
// Gestures
// ---------------------------------------------------------------------------

#[test]
fn test_drag_moves_center_against_delta() {
    let mut engine = engine_300();
    load_gradient(&mut engine, 800, 600);
    // Fitted zoom is 240/600 = 0.4.

    engine
        .pointer_event(PointerPhase::Down, 0, &[p(150.0, 150.0)])
        .unwrap();
    engine
        .pointer_event(PointerPhase::Move, 0, &[p(160.0, 150.0)])
        .unwrap();

    let g = engine.geometry().unwrap();
    assert_relative_eq!(g.center_x, 400.0 - 10.0 / 0.4, epsilon = 1e-3);
    assert_relative_eq!(g.center_y, 300.0);
}

#[test]
fn test_pinch_doubling_distance_doubles_zoom() {
    let mut engine = engine_300();
    load_gradient(&mut engine, 800, 600);

    engine
        .pointer_event(PointerPhase::Down, 0, &[p(100.0, 150.0)])
        .unwrap();
    engine
        .pointer_event(PointerPhase::Down, 1, &[p(100.0, 150.0), p(200.0, 150.0)])
        .unwrap();
    engine
        .pointer_event(PointerPhase::Move, 1, &[p(100.0, 150.0), p(300.0, 150.0)])
        .unwrap();

    assert_relative_eq!(engine.geometry().unwrap().zoom, 0.8, epsilon = 1e-6);
}

#[test]
fn test_pinch_cannot_zoom_below_coverage_floor() {
    let mut engine = engine_300();
    load_gradient(&mut engine, 800, 600);

    engine
        .pointer_event(PointerPhase::Down, 0, &[p(100.0, 150.0)])
        .unwrap();
    engine
        .pointer_event(PointerPhase::Down, 1, &[p(100.0, 150.0), p(200.0, 150.0)])
        .unwrap();
    // Fingers collapse to a tenth of the distance; the fitted zoom is
    // already the floor, so it must not move.
    engine
        .pointer_event(PointerPhase::Move, 1, &[p(100.0, 150.0), p(110.0, 150.0)])
        .unwrap();

    assert_relative_eq!(engine.geometry().unwrap().zoom, 0.4, epsilon = 1e-6);
}

#[test]
fn test_drag_toward_origin_stops_at_clamp() {
    let mut engine = engine_300();
    load_gradient(&mut engine, 800, 600);
    engine.set_zoom(1.0).unwrap();

    // Drag hard toward the bottom-right, pushing the center toward (0, 0).
    engine
        .pointer_event(PointerPhase::Down, 0, &[p(10.0, 10.0)])
        .unwrap();
    engine
        .pointer_event(PointerPhase::Move, 0, &[p(2000.0, 2000.0)])
        .unwrap();

    let g = engine.geometry().unwrap();
    assert_relative_eq!(g.center_x, 120.0);
    assert_relative_eq!(g.center_y, 120.0);
}

#[test]
fn test_gestures_before_load_are_harmless() {
    let mut engine = engine_300();
    engine
        .pointer_event(PointerPhase::Down, 0, &[p(10.0, 10.0)])
        .unwrap();
    engine
        .pointer_event(PointerPhase::Move, 0, &[p(50.0, 50.0)])
        .unwrap();
    assert!(engine.geometry().is_none());
    assert!(engine.preview().is_none());
}

// ---------------------------------------------------------------------------
// Preview decoding
// ---------------------------------------------------------------------------

#[test]
fn test_preview_decode_is_bounded_to_viewport() {
    let (decoder, _calls, last_request) =
        common::CountingDecoder::new(common::gradient_image(800, 600));
    let mut engine = engine_300();
    engine
        .set_source(SourceImage::from_decoder(Box::new(decoder)).unwrap())
        .unwrap();
    engine.set_zoom(2.0).unwrap();

    let (rect, factor) = last_request.lock().unwrap().unwrap();
    assert_eq!(factor, 1);
    // 300 display px at zoom 2 cover 150 source px, plus margins.
    assert!(rect.width <= 153, "decoded width {} too large", rect.width);
    assert!(rect.height <= 153);
}

#[test]
fn test_every_geometry_change_redecodes() {
    let (decoder, calls, _last) = common::CountingDecoder::new(common::gradient_image(800, 600));
    let mut engine = engine_300();
    engine
        .set_source(SourceImage::from_decoder(Box::new(decoder)).unwrap())
        .unwrap();
    let after_load = calls.load(Ordering::SeqCst);
    assert_eq!(after_load, 1);

    engine.set_center(300.0, 300.0).unwrap();
    engine.set_zoom(1.5).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_failed_decode_keeps_previous_preview() {
    // One successful decode (the load), then the decoder starts failing.
    let decoder = common::FailingDecoder::new(common::gradient_image(800, 600), 1);
    let mut engine = engine_300();
    engine
        .set_source(SourceImage::from_decoder(Box::new(decoder)).unwrap())
        .unwrap();
    let before = engine.preview().unwrap().bitmap.dimensions();

    let err = engine.set_center(300.0, 300.0).unwrap_err();
    assert!(matches!(err, PortholeError::DecodeRegionFailed(_)));
    assert_eq!(engine.preview().unwrap().bitmap.dimensions(), before);
}

#[test]
fn test_render_preview_matches_viewport_size() {
    let mut engine = engine_300();
    load_gradient(&mut engine, 800, 600);
    let frame = engine.render_preview();
    assert_eq!(frame.dimensions(), (300, 300));
}

#[test]
fn test_render_preview_without_source_is_masked_frame() {
    let engine = engine_300();
    let frame = engine.render_preview();
    assert_eq!(frame.dimensions(), (300, 300));
    // Corner outside the circle carries the default mask alpha.
    assert_eq!(frame.get_pixel(0, 0).0[3], 0x90);
}

#[test]
fn test_quality_change_redecodes_at_new_scale() {
    let mut engine = engine_300();
    load_gradient(&mut engine, 4000, 3000);
    assert_eq!(engine.sampling().sample_factor, 16);

    // Quality 1 -> display scale 1 -> ideal 12.5 -> factor 8.
    engine.set_preview_quality(1.0).unwrap();
    assert_relative_eq!(engine.display_scale(), 1.0);
    assert_eq!(engine.sampling().sample_factor, 8);
    assert_eq!(engine.preview().unwrap().sample_factor, 8);
}

// ---------------------------------------------------------------------------
// Cropping
// ---------------------------------------------------------------------------

#[test]
fn test_crop_before_load_reports_no_source() {
    let mut engine = engine_300();
    let err = engine.crop_image(CropResolution::Native).unwrap_err();
    assert!(matches!(err, PortholeError::NoSourceLoaded));
}

#[test]
fn test_native_crop_side_matches_preview_diameter_over_zoom() {
    // A fresh 400x300 load into a 100x100 viewport (radius 40) fits at
    // zoom 80/300, so the native crop square
    // spans 2*40/zoom = 300 source pixels, within 1px of rounding.
    let mut engine = CropEngine::new(EngineConfig {
        viewport_width: 100,
        viewport_height: 100,
        ..EngineConfig::default()
    })
    .unwrap();
    load_gradient(&mut engine, 400, 300);

    let image = engine.crop_image(CropResolution::Native).unwrap();
    let (w, h) = image.dimensions();
    assert!((299..=301).contains(&w), "crop width {w}");
    assert!((299..=301).contains(&h), "crop height {h}");
}

#[test]
fn test_crop_centers_on_view_center() {
    let mut engine = engine_300();
    load_gradient(&mut engine, 800, 600);
    engine.set_zoom(1.0).unwrap();
    engine.set_center(400.0, 300.0).unwrap();

    let image = engine.crop_image(CropResolution::Native).unwrap();
    assert_eq!(image.dimensions(), (240, 240));
    // Top-left of the crop square sits at (280, 180); the gradient wraps
    // its coordinates at 256.
    assert_eq!(image.get_pixel(0, 0).0, [24, 180, 204, 255]);
}

#[test]
fn test_targeted_crop_downsamples_toward_resolution() {
    let mut engine = CropEngine::new(EngineConfig {
        viewport_width: 100,
        viewport_height: 100,
        ..EngineConfig::default()
    })
    .unwrap();
    load_gradient(&mut engine, 400, 300);

    // Native side is ~300; a 100px target gives sample factor 3.
    let image = engine.crop_image(CropResolution::Target(100)).unwrap();
    let (w, h) = image.dimensions();
    assert!((99..=101).contains(&w), "crop width {w}");
    assert!((99..=101).contains(&h), "crop height {h}");
}

#[test]
fn test_oversized_target_decodes_native() {
    let mut engine = engine_300();
    load_gradient(&mut engine, 800, 600);
    engine.set_zoom(1.0).unwrap();

    let image = engine.crop_image(CropResolution::Target(100_000)).unwrap();
    assert_eq!(image.dimensions(), (240, 240));
}

#[test]
fn test_crop_resolution_raw_mapping() {
    assert_eq!(CropResolution::from_raw(-1), CropResolution::Native);
    assert_eq!(CropResolution::from_raw(0), CropResolution::Native);
    assert_eq!(CropResolution::from_raw(512), CropResolution::Target(512));
}

#[test]
fn test_crop_to_writer_emits_decodable_png() {
    let mut engine = engine_300();
    load_gradient(&mut engine, 800, 600);
    engine.set_zoom(1.0).unwrap();

    let mut bytes = Cursor::new(Vec::new());
    engine
        .crop_to_writer(&mut bytes, CropResolution::Native)
        .unwrap();

    let decoded = image::load_from_memory(bytes.get_ref()).unwrap();
    assert_eq!(decoded.width(), 240);
    assert_eq!(decoded.height(), 240);
}

#[test]
fn test_crop_leaves_preview_untouched() {
    let (decoder, calls, _last) = common::CountingDecoder::new(common::gradient_image(800, 600));
    let mut engine = engine_300();
    engine
        .set_source(SourceImage::from_decoder(Box::new(decoder)).unwrap())
        .unwrap();
    let before = engine.preview().unwrap().bitmap.clone();
    let before_calls = calls.load(Ordering::SeqCst);

    engine.crop_image(CropResolution::Native).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), before_calls + 1);
    assert_eq!(engine.preview().unwrap().bitmap, before);
}
