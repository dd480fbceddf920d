use super::*;

// =============================================================
// fit_canvas_size
// =============================================================

#[test]
fn landscape_is_limited_by_width() {
    assert_eq!(fit_canvas_size(1280, 960, 640), (640, 480));
}

#[test]
fn portrait_is_limited_by_height() {
    assert_eq!(fit_canvas_size(600, 1200, 640), (320, 640));
}

#[test]
fn square_uses_height_branch() {
    assert_eq!(fit_canvas_size(1000, 1000, 640), (640, 640));
}

#[test]
fn small_images_are_not_upscaled() {
    assert_eq!(fit_canvas_size(300, 200, 640), (300, 200));
}

#[test]
fn fractional_sizes_truncate() {
    // 1000 / (1000/667) = 426.88
    assert_eq!(fit_canvas_size(1000, 667, 640).0, 640);
    assert_eq!(fit_canvas_size(1000, 667, 640).1, 426);
}

#[test]
fn degenerate_sizes_never_reach_zero() {
    assert_eq!(fit_canvas_size(10_000, 1, 640), (640, 1));
    assert_eq!(fit_canvas_size(0, 0, 640), (1, 1));
}

// =============================================================
// Colours
// =============================================================

#[test]
fn parses_six_digit_hex() {
    assert_eq!(parse_hex_color("#0ea5e9"), Ok(Rgba([0x0e, 0xa5, 0xe9, 255])));
}

#[test]
fn parses_short_and_alpha_hex() {
    assert_eq!(parse_hex_color("#fff"), Ok(Rgba([255, 255, 255, 255])));
    assert_eq!(parse_hex_color("#00000080"), Ok(Rgba([0, 0, 0, 0x80])));
}

#[test]
fn rejects_malformed_colours() {
    assert!(parse_hex_color("ffffff").is_err());
    assert!(parse_hex_color("#12345").is_err());
    assert!(parse_hex_color("#gg0000").is_err());
    assert!(parse_hex_color("#ééé").is_err());
}

#[test]
fn hex_formatting_drops_opaque_alpha() {
    assert_eq!(color_to_hex(Rgba([255, 0, 16, 255])), "#ff0010");
    assert_eq!(color_to_hex(Rgba([255, 0, 16, 1])), "#ff001001");
}

// =============================================================
// Blending
// =============================================================

#[test]
fn opaque_source_replaces_destination() {
    let mut px = [10u8, 20, 30, 255];
    blend_pixel(&mut px, Rgba([200, 100, 50, 255]), 1.0);
    assert_eq!(px, [200, 100, 50, 255]);
}

#[test]
fn zero_coverage_leaves_destination() {
    let mut px = [10u8, 20, 30, 255];
    blend_pixel(&mut px, Rgba([200, 100, 50, 255]), 0.0);
    assert_eq!(px, [10, 20, 30, 255]);
}

#[test]
fn half_coverage_over_transparent_keeps_colour() {
    let mut px = [0u8, 0, 0, 0];
    blend_pixel(&mut px, Rgba([200, 100, 50, 255]), 0.5);
    assert_eq!(&px[..3], &[200, 100, 50]);
    assert_eq!(px[3], 128);
}

#[test]
fn point_distance_is_euclidean() {
    assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    assert_eq!(Point::new(1.0, 1.0) - Point::new(0.5, 2.0), Point::new(0.5, -1.0));
}
