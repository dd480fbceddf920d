// ============================================================================
// CANVAS PRIMITIVES: points, pixel buffers, colours and pixel blending
// ============================================================================
//
// Every raster exchanged between the tracing editor, the cut engine and the
// compositor is a plain `RgbaImage`: width × height, row-major, 4 bytes per
// pixel, straight (non-premultiplied) alpha.
// ============================================================================

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use image::{Rgba, RgbaImage};
use std::ops::{Add, Sub};

/// Canonical raster exchanged between subsystems.
pub type PixelBuffer = RgbaImage;

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A position in raster space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

/// Fit a natural image size into a square bound, preserving aspect ratio.
///
/// Landscape images are limited by width, portrait and square ones by height.
/// Fractional results are truncated, and neither side drops below one pixel.
pub fn fit_canvas_size(natural_w: u32, natural_h: u32, max_side: u32) -> (u32, u32) {
    if natural_w == 0 || natural_h == 0 {
        return (natural_w.max(1), natural_h.max(1));
    }
    let aspect = natural_w as f64 / natural_h as f64;
    let (w, h) = if aspect > 1.0 {
        let w = natural_w.min(max_side) as f64;
        (w, w / aspect)
    } else {
        let h = natural_h.min(max_side) as f64;
        (h * aspect, h)
    };
    ((w as u32).max(1), (h as u32).max(1))
}

// ---------------------------------------------------------------------------
//  Colours
// ---------------------------------------------------------------------------

/// Error for colour strings that are not `#rgb`, `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError(pub String);

impl std::fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid colour '{}': expected #rgb, #rrggbb or #rrggbbaa", self.0)
    }
}

impl std::error::Error for ColorParseError {}

/// Parse a CSS-style hex colour.
pub fn parse_hex_color(s: &str) -> Result<Rgba<u8>, ColorParseError> {
    let err = || ColorParseError(s.to_string());
    let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
    if !hex.is_ascii() {
        return Err(err());
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
    let nibble = |i: usize| {
        u8::from_str_radix(&hex[i..i + 1], 16)
            .map(|v| v * 17)
            .map_err(|_| err())
    };
    match hex.len() {
        3 => Ok(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
        6 => Ok(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Ok(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => Err(err()),
    }
}

/// Format a colour as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
pub fn color_to_hex(c: Rgba<u8>) -> String {
    if c[3] == 255 {
        format!("#{:02x}{:02x}{:02x}", c[0], c[1], c[2])
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", c[0], c[1], c[2], c[3])
    }
}

// ---------------------------------------------------------------------------
//  Blending
// ---------------------------------------------------------------------------

/// Source-over blend of a premultiplied colour (channels in 0..=255 scale)
/// onto a straight-alpha destination pixel.
#[inline]
pub fn blend_premultiplied(dst: &mut [u8], src: [f32; 4]) {
    let sa = (src[3] / 255.0).clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let keep = da * (1.0 - sa);
    let out_a = sa + keep;
    if out_a <= 0.0 {
        dst.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        let v = (src[c] + dst[c] as f32 * keep) / out_a;
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Source-over blend of a straight-alpha colour scaled by `coverage` (0..=1).
#[inline]
pub fn blend_pixel(dst: &mut [u8], color: Rgba<u8>, coverage: f32) {
    let a = color[3] as f32 * coverage.clamp(0.0, 1.0);
    let k = a / 255.0;
    blend_premultiplied(
        dst,
        [color[0] as f32 * k, color[1] as f32 * k, color[2] as f32 * k, a],
    );
}
