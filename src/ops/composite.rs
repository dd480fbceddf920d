// ============================================================================
// COMPOSITE RENDERER: cutout + background + overlay glyphs → final raster
// ============================================================================
//
// `render` is a pure function of its inputs: it allocates its own target,
// never exposes partially drawn states, and the same inputs always produce
// the same bytes.
// ============================================================================

#[cfg(test)]
#[path = "composite_test.rs"]
mod composite_test;

use image::Rgba;

use crate::canvas::{PixelBuffer, Point, WHITE};
use crate::components::glyphs::{GlyphId, OverlayGlyph};
use crate::ops::adjustments::{brightness, NEUTRAL_BRIGHTNESS};
use crate::ops::shapes::stroke_dashed_polyline;
use crate::ops::text::{GlyphRasterizer, GLYPH_BASE_FONT_SIZE};
use crate::ops::transform::{draw_image, draw_image_filtered, Affine};

pub const SELECTION_COLOR: Rgba<u8> = Rgba([0x0e, 0xa5, 0xe9, 255]);
/// Gap between a glyph's measured extents and its selection frame.
pub const SELECTION_MARGIN: f32 = 5.0;
pub const SELECTION_DASH: [f32; 2] = [5.0, 5.0];
pub const SELECTION_LINE_WIDTH: f32 = 2.0;

/// Adjustments applied to the cutout, plus the background it sits on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformParams {
    pub scale: f32,
    pub rotation_deg: f32,
    pub brightness_pct: f32,
    pub background: Rgba<u8>,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self { scale: 1.0, rotation_deg: 0.0, brightness_pct: NEUTRAL_BRIGHTNESS, background: WHITE }
    }
}

/// Cutout placement: centred on the target, rotated and scaled about the
/// cutout's own centre.
pub fn cutout_transform(cutout: (u32, u32), target: (u32, u32), params: &TransformParams) -> Affine {
    Affine::translate(target.0 as f32 * 0.5, target.1 as f32 * 0.5)
        * Affine::rotate_deg(params.rotation_deg)
        * Affine::scale(params.scale)
        * Affine::translate(-(cutout.0 as f32) * 0.5, -(cutout.1 as f32) * 0.5)
}

/// Glyph-local space: origin at the glyph position, rotated by the glyph.
pub fn glyph_transform(glyph: &OverlayGlyph) -> Affine {
    Affine::translate(glyph.x, glyph.y) * Affine::rotate_deg(glyph.rotation_deg)
}

pub fn glyph_font_size(glyph: &OverlayGlyph) -> f32 {
    GLYPH_BASE_FONT_SIZE * glyph.scale
}

/// Render the composite at `size`.
pub fn render(
    cutout: &PixelBuffer,
    params: &TransformParams,
    glyphs: &[OverlayGlyph],
    selected: Option<GlyphId>,
    size: (u32, u32),
    rasterizer: &dyn GlyphRasterizer,
) -> PixelBuffer {
    let (w, h) = size;
    let mut target = PixelBuffer::from_pixel(w, h, params.background);

    let placement = cutout_transform(cutout.dimensions(), size, params);
    if params.brightness_pct == NEUTRAL_BRIGHTNESS {
        draw_image(&mut target, cutout, placement);
    } else {
        draw_image_filtered(&mut target, cutout, placement, brightness(params.brightness_pct));
    }

    for glyph in glyphs {
        draw_glyph(&mut target, glyph, selected == Some(glyph.id), rasterizer);
    }
    target
}

fn draw_glyph(target: &mut PixelBuffer, glyph: &OverlayGlyph, selected: bool, rasterizer: &dyn GlyphRasterizer) {
    let Some(bitmap) = rasterizer.rasterize(&glyph.symbol, glyph_font_size(glyph)) else {
        return;
    };
    let local = glyph_transform(glyph);
    draw_image(target, &bitmap.pixels, local * Affine::translate(bitmap.left, bitmap.top));

    if selected {
        let hx = bitmap.width * 0.5 + SELECTION_MARGIN;
        let hy = bitmap.height * 0.5 + SELECTION_MARGIN;
        let frame: Vec<Point> = [(-hx, -hy), (hx, -hy), (hx, hy), (-hx, hy)]
            .into_iter()
            .map(|(x, y)| local.apply(Point::new(x, y)))
            .collect();
        stroke_dashed_polyline(target, &frame, true, SELECTION_LINE_WIDTH, SELECTION_DASH, SELECTION_COLOR);
    }
}
