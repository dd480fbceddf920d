use super::*;
use crate::ops::text::{GlyphBitmap, TofuRasterizer};
use std::sync::Arc;
use uuid::Uuid;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const SIZE: (u32, u32) = (500, 500);

/// Every symbol becomes a solid 40×10 bar; "b" is blue, anything else red.
struct BarRasterizer;

impl GlyphRasterizer for BarRasterizer {
    fn rasterize(&self, symbol: &str, _font_size: f32) -> Option<Arc<GlyphBitmap>> {
        let color = if symbol == "b" { BLUE } else { RED };
        Some(Arc::new(GlyphBitmap {
            pixels: PixelBuffer::from_pixel(40, 10, color),
            left: -20.0,
            top: -5.0,
            width: 40.0,
            height: 10.0,
        }))
    }

    fn name(&self) -> String {
        "bars".to_string()
    }
}

fn glyph(n: u128, symbol: &str, x: f32, y: f32) -> OverlayGlyph {
    OverlayGlyph {
        id: GlyphId(Uuid::from_u128(n)),
        symbol: symbol.to_string(),
        x,
        y,
        scale: 1.0,
        rotation_deg: 0.0,
    }
}

fn red_cutout() -> PixelBuffer {
    PixelBuffer::from_pixel(100, 50, RED)
}

fn render_cutout(params: &TransformParams) -> PixelBuffer {
    render(&red_cutout(), params, &[], None, SIZE, &TofuRasterizer)
}

// =============================================================
// Background and cutout placement
// =============================================================

#[test]
fn background_fills_everything() {
    let params = TransformParams { background: Rgba([10, 20, 30, 255]), ..TransformParams::default() };
    let out = render(&PixelBuffer::new(0, 0), &params, &[], None, (20, 10), &TofuRasterizer);
    assert_eq!(out.dimensions(), (20, 10));
    assert!(out.pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
}

#[test]
fn cutout_is_centred_at_natural_size() {
    let out = render_cutout(&TransformParams::default());
    assert_eq!(*out.get_pixel(250, 250), RED);
    assert_eq!(*out.get_pixel(200, 225), RED);
    assert_eq!(*out.get_pixel(299, 274), RED);
    assert_eq!(*out.get_pixel(199, 250), WHITE);
    assert_eq!(*out.get_pixel(300, 250), WHITE);
    assert_eq!(*out.get_pixel(250, 224), WHITE);
}

#[test]
fn rotation_turns_about_cutout_centre() {
    let params = TransformParams { rotation_deg: 90.0, ..TransformParams::default() };
    let out = render_cutout(&params);
    assert_eq!(*out.get_pixel(250, 210), RED);
    assert_eq!(*out.get_pixel(210, 250), WHITE);
}

#[test]
fn scale_grows_about_cutout_centre() {
    let params = TransformParams { scale: 2.0, ..TransformParams::default() };
    let out = render_cutout(&params);
    assert_eq!(*out.get_pixel(160, 250), RED);
    assert_eq!(*out.get_pixel(250, 205), RED);
    assert_eq!(*out.get_pixel(140, 250), WHITE);
}

#[test]
fn brightness_only_touches_the_cutout() {
    let params = TransformParams { brightness_pct: 50.0, ..TransformParams::default() };
    let out = render_cutout(&params);
    assert_eq!(*out.get_pixel(250, 250), Rgba([128, 0, 0, 255]));
    assert_eq!(*out.get_pixel(0, 0), WHITE);
}

#[test]
fn transparent_cutout_pixels_show_background() {
    let mut cutout = red_cutout();
    cutout.put_pixel(50, 25, Rgba([0, 255, 0, 0]));
    let out = render(&cutout, &TransformParams::default(), &[], None, SIZE, &TofuRasterizer);
    assert_eq!(*out.get_pixel(250, 250), WHITE);
}

// =============================================================
// Glyphs
// =============================================================

#[test]
fn glyphs_draw_in_list_order() {
    let blank = PixelBuffer::new(0, 0);
    let params = TransformParams::default();
    let red_then_blue = [glyph(1, "r", 100.0, 100.0), glyph(2, "b", 100.0, 100.0)];
    let out = render(&blank, &params, &red_then_blue, None, SIZE, &BarRasterizer);
    assert_eq!(*out.get_pixel(100, 100), BLUE);

    let blue_then_red = [glyph(2, "b", 100.0, 100.0), glyph(1, "r", 100.0, 100.0)];
    let out = render(&blank, &params, &blue_then_red, None, SIZE, &BarRasterizer);
    assert_eq!(*out.get_pixel(100, 100), RED);
}

#[test]
fn glyph_rotation_is_applied() {
    let blank = PixelBuffer::new(0, 0);
    let params = TransformParams::default();
    let mut g = glyph(1, "r", 100.0, 100.0);
    let out = render(&blank, &params, std::slice::from_ref(&g), None, SIZE, &BarRasterizer);
    assert_eq!(*out.get_pixel(115, 100), RED);
    assert_eq!(*out.get_pixel(100, 115), WHITE);

    g.rotation_deg = 90.0;
    let out = render(&blank, &params, &[g], None, SIZE, &BarRasterizer);
    assert_eq!(*out.get_pixel(115, 100), WHITE);
    assert_eq!(*out.get_pixel(100, 115), RED);
}

#[test]
fn glyph_is_drawn_over_cutout() {
    let params = TransformParams::default();
    let g = glyph(1, "b", 250.0, 250.0);
    let out = render(&red_cutout(), &params, &[g], None, SIZE, &BarRasterizer);
    assert_eq!(*out.get_pixel(250, 250), BLUE);
    assert_eq!(*out.get_pixel(290, 250), RED);
}

#[test]
fn only_selected_glyph_gets_a_frame() {
    let blank = PixelBuffer::new(0, 0);
    let params = TransformParams::default();
    let g = glyph(7, "👑", 100.0, 100.0);
    // Tofu extents are one em (48) square: frame half-size 24 + 5 = 29.
    let plain = render(&blank, &params, std::slice::from_ref(&g), None, SIZE, &TofuRasterizer);
    assert_eq!(*plain.get_pixel(72, 71), WHITE);

    let framed = render(&blank, &params, std::slice::from_ref(&g), Some(g.id), SIZE, &TofuRasterizer);
    assert_eq!(*framed.get_pixel(72, 71), SELECTION_COLOR);
    // The first gap of the dash pattern.
    assert_eq!(*framed.get_pixel(78, 71), WHITE);
    // The glyph itself is untouched by the frame.
    assert_eq!(framed.get_pixel(100, 100), plain.get_pixel(100, 100));
}

#[test]
fn render_is_idempotent() {
    let cutout = PixelBuffer::from_fn(37, 23, |x, y| Rgba([(x * 7) as u8, (y * 11) as u8, 90, 200]));
    let params = TransformParams {
        scale: 1.3,
        rotation_deg: 33.0,
        brightness_pct: 140.0,
        background: Rgba([12, 34, 56, 255]),
    };
    let mut a = glyph(1, "⭐", 120.0, 300.0);
    a.rotation_deg = -17.0;
    a.scale = 1.4;
    let b = glyph(2, "👑", 250.0, 240.0);
    let glyphs = [a, b];
    let first = render(&cutout, &params, &glyphs, Some(glyphs[0].id), SIZE, &TofuRasterizer);
    let second = render(&cutout, &params, &glyphs, Some(glyphs[0].id), SIZE, &TofuRasterizer);
    assert!(first == second);
}
