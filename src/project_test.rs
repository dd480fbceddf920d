use super::*;
use crate::canvas::Point;
use image::Rgba;

fn photo() -> PixelBuffer {
    PixelBuffer::from_pixel(200, 100, Rgba([30, 60, 90, 255]))
}

fn trace_square(p: &mut Project) {
    let ed = p.editor_mut().unwrap();
    for (x, y) in [(20.0, 20.0), (80.0, 20.0), (80.0, 80.0), (20.0, 80.0)] {
        ed.click(Point::new(x, y));
    }
}

#[test]
fn new_project_is_empty() {
    let p = Project::default();
    assert_eq!(p.stage(), Stage::Empty);
    assert!(p.render().is_none());
    assert!(p.export_png().is_none());
}

#[test]
fn open_source_starts_tracing_at_fitted_size() {
    let mut p = Project::default();
    p.open_source(PixelBuffer::from_pixel(1280, 960, Rgba([1, 1, 1, 255])));
    assert_eq!(p.stage(), Stage::Tracing);
    assert_eq!(p.editor().unwrap().canvas_size(), (640, 480));
}

#[test]
fn cut_without_tracing_reports_it() {
    let mut p = Project::default();
    assert_eq!(p.cut(), Ok(CutOutcome::NotTracing));
}

#[test]
fn short_polygon_keeps_tracing() {
    let mut p = Project::default();
    p.open_source(photo());
    p.editor_mut().unwrap().click(Point::new(1.0, 1.0));
    assert_eq!(p.cut(), Err(CutError::InsufficientPoints { have: 1 }));
    assert_eq!(p.stage(), Stage::Tracing);
    assert_eq!(p.editor().unwrap().points().len(), 1);
}

#[test]
fn empty_cut_keeps_tracing() {
    let mut p = Project::default();
    p.open_source(photo());
    let ed = p.editor_mut().unwrap();
    for x in [10.0, 20.0, 30.0] {
        ed.click(Point::new(x, x));
    }
    assert_eq!(p.cut(), Ok(CutOutcome::Empty));
    assert_eq!(p.stage(), Stage::Tracing);
}

#[test]
fn successful_cut_opens_composite() {
    let mut p = Project::default();
    p.open_source(photo());
    trace_square(&mut p);
    assert_eq!(p.cut(), Ok(CutOutcome::Composed { width: 64, height: 64 }));
    assert_eq!(p.stage(), Stage::Composing);
    assert!(p.editor().is_none());
    let stage = p.composite().unwrap();
    assert_eq!(stage.size(), (500, 500));
    assert_eq!(*stage.render().get_pixel(250, 250), Rgba([30, 60, 90, 255]));
}

#[test]
fn cancel_before_first_cut_drops_source() {
    let mut p = Project::default();
    p.open_source(photo());
    p.cancel_tracing();
    assert_eq!(p.stage(), Stage::Empty);
    assert!(p.source().is_none());
    assert!(!p.adjust_tracing());
}

#[test]
fn adjust_keeps_composite_until_next_cut() {
    let mut p = Project::default();
    p.open_source(photo());
    trace_square(&mut p);
    p.cut().unwrap();
    let glyph = p.composite_mut().unwrap().add_glyph("👑");

    assert!(p.adjust_tracing());
    assert_eq!(p.stage(), Stage::Tracing);
    assert!(p.editor().unwrap().points().is_empty());

    // Cancelling returns to the untouched composite.
    p.cancel_tracing();
    assert_eq!(p.stage(), Stage::Composing);
    assert!(p.source().is_some());
    assert!(p.composite().unwrap().glyph(glyph).is_some());

    // A new cut replaces it.
    p.adjust_tracing();
    trace_square(&mut p);
    p.cut().unwrap();
    assert!(p.composite().unwrap().glyphs().is_empty());
}

#[test]
fn reset_clears_everything() {
    let mut p = Project::default();
    p.open_source(photo());
    trace_square(&mut p);
    p.cut().unwrap();
    p.reset();
    assert_eq!(p.stage(), Stage::Empty);
    assert!(p.source().is_none());
}

#[test]
fn export_produces_png_of_composite_size() {
    let mut p = Project::default();
    p.settings.composite_width = 120;
    p.settings.composite_height = 80;
    p.open_source(photo());
    trace_square(&mut p);
    p.cut().unwrap();
    let bytes = p.export_png().unwrap().unwrap();
    let decoded = io::decode_source(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (120, 80));
}
