// ============================================================================
// GLYPH TEXT: rasterize overlay symbols (emoji) into small RGBA bitmaps
// ============================================================================
//
// A symbol is laid out as a single line, centred horizontally on its advance
// width and vertically on the middle of the em box, then rasterized once per
// (symbol, font size) and cached. Outline fonts draw through ab_glyph's
// coverage rasterizer; colour-emoji fonts that ship PNG strikes (CBDT/sbix)
// are decoded with `image` and scaled to the requested size.
// ============================================================================

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;

use ab_glyph::{point, Font, FontArc, GlyphId, GlyphImageFormat, ScaleFont};
use image::imageops::{self, FilterType};
use image::Rgba;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::canvas::{PixelBuffer, Point};
use crate::ops::shapes::stroke_polyline;
use crate::settings::AppSettings;

/// Font size of an overlay glyph at scale 1.
pub const GLYPH_BASE_FONT_SIZE: f32 = 48.0;

/// Largest font size that is rasterized. Bigger glyphs are skipped rather
/// than allocating a bitmap that cannot exist.
pub const MAX_GLYPH_FONT_SIZE: f32 = 2048.0;

/// Fill colour for outline (monochrome) glyphs.
const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A rasterized symbol positioned around its anchor.
#[derive(Clone, Debug)]
pub struct GlyphBitmap {
    pub pixels: PixelBuffer,
    /// Top-left corner of `pixels` relative to the anchor.
    pub left: f32,
    pub top: f32,
    /// Measured text extents (advance width × font size), centred on the anchor.
    pub width: f32,
    pub height: f32,
}

/// Turns a symbol into a bitmap. Implementations must be deterministic so
/// that repeated renders are pixel-identical.
pub trait GlyphRasterizer: Send + Sync {
    /// `None` when the symbol is empty or cannot be laid out.
    fn rasterize(&self, symbol: &str, font_size: f32) -> Option<Arc<GlyphBitmap>>;

    fn name(&self) -> String;
}

fn drawable_font_size(font_size: f32) -> bool {
    font_size > 0.0 && font_size <= MAX_GLYPH_FONT_SIZE
}

type BitmapCache = HashMap<(String, u32), Option<Arc<GlyphBitmap>>>;

// ---------------------------------------------------------------------------
//  Font-backed rasterizer
// ---------------------------------------------------------------------------

pub struct FontGlyphRasterizer {
    font: FontArc,
    name: String,
    cache: Mutex<BitmapCache>,
}

impl FontGlyphRasterizer {
    pub fn new(font: FontArc, name: impl Into<String>) -> Self {
        Self { font, name: name.into(), cache: Mutex::new(HashMap::new()) }
    }

    fn render_uncached(&self, symbol: &str, font_size: f32) -> Option<GlyphBitmap> {
        let (glyphs, total_width, ascent, descent) = layout_line(&self.font, symbol, font_size);
        if glyphs.is_empty() {
            return None;
        }
        // Baseline sits below the anchor so the em box middle lands on it.
        let baseline = (ascent + descent) * 0.5;
        let left_edge = -total_width * 0.5;

        let mut parts: Vec<(i64, i64, PixelBuffer)> = Vec::new();
        for &(id, gx) in &glyphs {
            let x = left_edge + gx;
            if let Some(part) = self.outline_part(id, font_size, x, baseline) {
                parts.push(part);
            } else if let Some(part) = self.bitmap_part(id, font_size, x) {
                parts.push(part);
            }
        }

        let (min_x, min_y, max_x, max_y) = parts.iter().fold(
            (i64::MAX, i64::MAX, i64::MIN, i64::MIN),
            |(ax, ay, bx, by), (x, y, img)| {
                (
                    ax.min(*x),
                    ay.min(*y),
                    bx.max(*x + img.width() as i64),
                    by.max(*y + img.height() as i64),
                )
            },
        );

        let mut bitmap = GlyphBitmap {
            pixels: PixelBuffer::new(0, 0),
            left: 0.0,
            top: 0.0,
            width: total_width,
            height: font_size,
        };
        if parts.is_empty() || max_x <= min_x || max_y <= min_y {
            return Some(bitmap);
        }
        let mut pixels = PixelBuffer::new((max_x - min_x) as u32, (max_y - min_y) as u32);
        for (x, y, img) in &parts {
            imageops::overlay(&mut pixels, img, x - min_x, y - min_y);
        }
        bitmap.pixels = pixels;
        bitmap.left = min_x as f32;
        bitmap.top = min_y as f32;
        Some(bitmap)
    }

    /// Coverage-rasterized outline glyph, drawn in the text colour.
    fn outline_part(&self, id: GlyphId, font_size: f32, x: f32, baseline: f32) -> Option<(i64, i64, PixelBuffer)> {
        let glyph = id.with_scale_and_position(font_size, point(x, baseline));
        let outlined = self.font.outline_glyph(glyph)?;
        let bounds = outlined.px_bounds();
        let w = bounds.width().ceil() as u32;
        let h = bounds.height().ceil() as u32;
        if w == 0 || h == 0 {
            return None;
        }
        let mut img = PixelBuffer::new(w, h);
        outlined.draw(|px, py, cov| {
            if px < w && py < h && cov > 0.0 {
                let a = (TEXT_COLOR[3] as f32 * cov.min(1.0)).round() as u8;
                img.put_pixel(px, py, Rgba([TEXT_COLOR[0], TEXT_COLOR[1], TEXT_COLOR[2], a]));
            }
        });
        Some((bounds.min.x.floor() as i64, bounds.min.y.floor() as i64, img))
    }

    /// Embedded PNG strike (colour emoji), scaled to `font_size` and centred
    /// on the glyph's advance cell and the em box middle.
    fn bitmap_part(&self, id: GlyphId, font_size: f32, x: f32) -> Option<(i64, i64, PixelBuffer)> {
        let strike = font_size.ceil().clamp(1.0, u16::MAX as f32) as u16;
        let raster = self.font.glyph_raster_image2(id, strike)?;
        if !matches!(raster.format, GlyphImageFormat::Png) || raster.pixels_per_em == 0 {
            return None;
        }
        let decoded = image::load_from_memory(raster.data).ok()?.to_rgba8();
        let k = font_size / raster.pixels_per_em as f32;
        let w = ((decoded.width() as f32 * k).round() as u32).max(1);
        let h = ((decoded.height() as f32 * k).round() as u32).max(1);
        let img = imageops::resize(&decoded, w, h, FilterType::Triangle);
        let advance = self.font.as_scaled(font_size).h_advance(id);
        let left = x + (advance - w as f32) * 0.5;
        let top = -(h as f32) * 0.5;
        Some((left.round() as i64, top.round() as i64, img))
    }
}

impl GlyphRasterizer for FontGlyphRasterizer {
    fn rasterize(&self, symbol: &str, font_size: f32) -> Option<Arc<GlyphBitmap>> {
        if symbol.is_empty() || !drawable_font_size(font_size) {
            return None;
        }
        let key = (symbol.to_string(), font_size.to_bits());
        if let Ok(cache) = self.cache.lock()
            && let Some(hit) = cache.get(&key)
        {
            return hit.clone();
        }
        let rendered = self.render_uncached(symbol, font_size).map(Arc::new);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, rendered.clone());
        }
        rendered
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Lay out one line with kerning. Returns `(glyph, pen_x)` pairs, the advance
/// width, ascent and descent (negative).
fn layout_line(font: &FontArc, text: &str, font_size: f32) -> (Vec<(GlyphId, f32)>, f32, f32, f32) {
    let scaled = font.as_scaled(font_size);
    let mut glyphs = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        // Variation selectors and joiners map to .notdef in most fonts.
        if glyph_id.0 == 0 && is_invisible_modifier(ch) {
            continue;
        }
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);
    }
    (glyphs, cursor_x, scaled.ascent(), scaled.descent())
}

fn is_invisible_modifier(ch: char) -> bool {
    matches!(ch, '\u{200D}' | '\u{FE0E}' | '\u{FE0F}' | '\u{1F3FB}'..='\u{1F3FF}')
}

// ---------------------------------------------------------------------------
//  Placeholder rasterizer
// ---------------------------------------------------------------------------

/// Font-free rasterizer: every non-empty symbol becomes one outlined box
/// ("tofu"), one em wide. Used when no font can be loaded.
#[derive(Clone, Copy, Debug, Default)]
pub struct TofuRasterizer;

impl GlyphRasterizer for TofuRasterizer {
    fn rasterize(&self, symbol: &str, font_size: f32) -> Option<Arc<GlyphBitmap>> {
        if symbol.is_empty() || !drawable_font_size(font_size) {
            return None;
        }
        let side = (font_size * 0.8).round().max(2.0) as u32;
        let mut pixels = PixelBuffer::from_pixel(side, side, Rgba([230, 230, 230, 255]));
        let s = side as f32;
        let stroke = (font_size / 16.0).max(1.0);
        let inset = stroke * 0.5;
        stroke_polyline(
            &mut pixels,
            &[
                Point::new(inset, inset),
                Point::new(s - inset, inset),
                Point::new(s - inset, s - inset),
                Point::new(inset, s - inset),
            ],
            true,
            stroke,
            TEXT_COLOR,
        );
        Some(Arc::new(GlyphBitmap {
            pixels,
            left: -s * 0.5,
            top: -s * 0.5,
            width: font_size,
            height: font_size,
        }))
    }

    fn name(&self) -> String {
        "placeholder".to_string()
    }
}

// ---------------------------------------------------------------------------
//  Font loading
// ---------------------------------------------------------------------------

/// Load a font by family name from the system.
/// Returns None if the font cannot be found.
pub fn load_system_font(family: &str) -> Option<FontArc> {
    use font_kit::family_name::FamilyName;
    use font_kit::properties::Properties;
    use font_kit::source::SystemSource;

    let source = SystemSource::new();
    let handle = source
        .select_best_match(&[FamilyName::Title(family.to_string())], &Properties::new())
        .ok()?;

    let font_data = handle.load().ok()?;
    let font_data_copy = font_data.copy_font_data()?;
    let bytes: Vec<u8> = (*font_data_copy).clone();
    FontArc::try_from_vec(bytes).ok()
}

/// Load a TrueType/OpenType font file.
pub fn load_font_file(path: &Path) -> Option<FontArc> {
    let bytes = std::fs::read(path).ok()?;
    FontArc::try_from_vec(bytes).ok()
}

/// Pick the glyph rasterizer for the configured font: explicit file first,
/// then the system family, then the placeholder.
pub fn rasterizer_from_settings(settings: &AppSettings) -> Arc<dyn GlyphRasterizer> {
    let path = settings.glyph_font_path.trim();
    if !path.is_empty() {
        match load_font_file(Path::new(path)) {
            Some(font) => {
                crate::log_info!("Glyph font loaded from {}", path);
                return Arc::new(FontGlyphRasterizer::new(font, path));
            }
            None => crate::log_warn!("Could not load glyph font file {}", path),
        }
    }
    let family = settings.glyph_font_family.trim();
    if !family.is_empty() {
        match load_system_font(family) {
            Some(font) => {
                crate::log_info!("Glyph font family '{}' loaded", family);
                return Arc::new(FontGlyphRasterizer::new(font, family));
            }
            None => crate::log_warn!("System font family '{}' not found", family),
        }
    }
    crate::log_warn!("No glyph font available, drawing placeholder boxes");
    Arc::new(TofuRasterizer)
}
