// ============================================================================
// TRANSFORM OPERATIONS: 2D affine matrices and affine raster drawing
// ============================================================================
//
// Matrices follow the 2D canvas convention: y grows downwards, so a positive
// rotation turns clockwise on screen, and `a * b` applies `b` first.
// Drawing maps every destination pixel centre back into the source and takes
// a bilinear sample of premultiplied colour against a transparent border.
// ============================================================================

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use image::imageops::{self, FilterType};
use rayon::prelude::*;
use std::ops::Mul;

use crate::canvas::{blend_premultiplied, PixelBuffer, Point};

/// `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    pub fn translate(tx: f32, ty: f32) -> Self {
        Affine { e: tx, f: ty, ..Self::IDENTITY }
    }

    pub fn scale(s: f32) -> Self {
        Affine { a: s, d: s, ..Self::IDENTITY }
    }

    /// Rotation in degrees, clockwise-positive on a y-down raster.
    pub fn rotate_deg(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Affine { a: cos, b: sin, c: -sin, d: cos, e: 0.0, f: 0.0 }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.a * self.d - self.b * self.c;
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }
}

impl Mul for Affine {
    type Output = Affine;

    fn mul(self, r: Affine) -> Affine {
        Affine {
            a: self.a * r.a + self.c * r.b,
            b: self.b * r.a + self.d * r.b,
            c: self.a * r.c + self.c * r.d,
            d: self.b * r.c + self.d * r.d,
            e: self.a * r.e + self.c * r.f + self.e,
            f: self.b * r.e + self.d * r.f + self.f,
        }
    }
}

/// Axis-aligned pixel bounds `(x0, y0, x1, y1)` covered by a `w × h` source
/// placed with `transform`, clipped to a `canvas_w × canvas_h` target.
fn transformed_bounds(
    transform: &Affine,
    w: u32,
    h: u32,
    canvas_w: u32,
    canvas_h: u32,
) -> Option<(usize, usize, usize, usize)> {
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(w as f32, 0.0),
        Point::new(w as f32, h as f32),
        Point::new(0.0, h as f32),
    ];
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for c in corners {
        let p = transform.apply(c);
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
        return None;
    }
    let x0 = min_x.floor().max(0.0) as usize;
    let y0 = min_y.floor().max(0.0) as usize;
    let x1 = (max_x.ceil().max(0.0) as usize).min(canvas_w as usize);
    let y1 = (max_y.ceil().max(0.0) as usize).min(canvas_h as usize);
    (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
}

/// Draw `src` onto `dst` through `transform`, blending source-over.
///
/// `filter` receives each sampled colour as straight RGBA in 0..=255 and may
/// adjust it (brightness, tinting) before blending.
pub fn draw_image_filtered<F>(dst: &mut PixelBuffer, src: &PixelBuffer, transform: Affine, filter: F)
where
    F: Fn(f32, f32, f32, f32) -> (f32, f32, f32, f32) + Sync,
{
    let (src_w, src_h) = src.dimensions();
    let (dst_w, dst_h) = dst.dimensions();
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return;
    }
    let Some(inv) = transform.invert() else { return };
    let Some((x0, y0, x1, y1)) = transformed_bounds(&transform, src_w, src_h, dst_w, dst_h) else {
        return;
    };

    let row_bytes = dst_w as usize * 4;
    dst.as_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .skip(y0)
        .take(y1 - y0)
        .for_each(|(dy, row)| {
            let py = dy as f32 + 0.5;
            for dx in x0..x1 {
                let s = inv.apply(Point::new(dx as f32 + 0.5, py));
                let premul = bilinear_premultiplied(src, s.x - 0.5, s.y - 0.5);
                if premul[3] <= 0.0 {
                    continue;
                }
                let k = 255.0 / premul[3];
                let (r, g, b, a) = filter(premul[0] * k, premul[1] * k, premul[2] * k, premul[3]);
                let a = a.clamp(0.0, 255.0);
                let m = a / 255.0;
                let out = [
                    r.clamp(0.0, 255.0) * m,
                    g.clamp(0.0, 255.0) * m,
                    b.clamp(0.0, 255.0) * m,
                    a,
                ];
                let pi = dx * 4;
                blend_premultiplied(&mut row[pi..pi + 4], out);
            }
        });
}

/// Draw `src` onto `dst` through `transform` without colour adjustment.
pub fn draw_image(dst: &mut PixelBuffer, src: &PixelBuffer, transform: Affine) {
    draw_image_filtered(dst, src, transform, |r, g, b, a| (r, g, b, a));
}

/// Bilinear sample of premultiplied colour at continuous pixel coordinates,
/// where `(0, 0)` is the centre of the top-left pixel.
fn bilinear_premultiplied(img: &PixelBuffer, x: f32, y: f32) -> [f32; 4] {
    let w = img.width() as i32;
    let h = img.height() as i32;
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    if x0 < -1 || y0 < -1 || x0 >= w || y0 >= h {
        return [0.0; 4];
    }
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;
    let raw = img.as_raw();
    let stride = w as usize * 4;

    let sample = |sx: i32, sy: i32| -> [f32; 4] {
        if sx < 0 || sy < 0 || sx >= w || sy >= h {
            [0.0; 4]
        } else {
            let idx = sy as usize * stride + sx as usize * 4;
            let a = raw[idx + 3] as f32;
            let k = a / 255.0;
            [raw[idx] as f32 * k, raw[idx + 1] as f32 * k, raw[idx + 2] as f32 * k, a]
        }
    };

    let tl = sample(x0, y0);
    let tr = sample(x0 + 1, y0);
    let bl = sample(x0, y0 + 1);
    let br = sample(x0 + 1, y0 + 1);

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = tl[c] + (tr[c] - tl[c]) * fx;
        let bot = bl[c] + (br[c] - bl[c]) * fx;
        out[c] = top + (bot - top) * fy;
    }
    out
}

/// Resample `src` to exactly `w × h` (bilinear). Returns a copy when the size
/// already matches.
pub fn resize_to(src: &PixelBuffer, w: u32, h: u32) -> PixelBuffer {
    if src.dimensions() == (w, h) {
        return src.clone();
    }
    imageops::resize(src, w, h, FilterType::Triangle)
}
