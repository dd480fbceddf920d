// ============================================================================
// CUT ENGINE: clip a raster to a closed polygon and crop to its content
// ============================================================================
//
// The polygon is closed implicitly (last point joins the first) and filled
// with the even-odd rule. Edges are anti-aliased: every pixel row is sampled
// with SUBSAMPLES sub-scanlines and each span contributes its exact horizontal
// overlap, so partially covered boundary pixels keep a partial alpha.
// Self-intersecting polygons are not resolved; they fill however even-odd
// fills them.
// ============================================================================

#[cfg(test)]
#[path = "cut_test.rs"]
mod cut_test;

use image::imageops;
use rayon::prelude::*;

use crate::canvas::{PixelBuffer, Point};

/// Transparent margin kept around the content when cropping.
pub const CROP_PADDING: u32 = 2;

/// Minimum number of points that encloses an area.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Sub-scanlines per pixel row.
const SUBSAMPLES: usize = 4;

/// Error returned when the polygon cannot be cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutError {
    InsufficientPoints { have: usize },
}

impl std::fmt::Display for CutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CutError::InsufficientPoints { have } => write!(
                f,
                "a cut needs at least {} points, the polygon has {}",
                MIN_POLYGON_POINTS, have
            ),
        }
    }
}

impl std::error::Error for CutError {}

/// Half-open pixel rectangle `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    /// Grow by `pad` on every side, clamped to `[0, w] × [0, h]`.
    pub fn padded(&self, pad: u32, w: u32, h: u32) -> PixelRect {
        PixelRect {
            x0: self.x0.saturating_sub(pad),
            y0: self.y0.saturating_sub(pad),
            x1: self.x1.saturating_add(pad).min(w),
            y1: self.y1.saturating_add(pad).min(h),
        }
    }
}

/// Outcome of a successful cut.
#[derive(Clone, Debug)]
pub enum CutResult {
    /// The cropped cutout.
    Region {
        pixels: PixelBuffer,
        /// Tight bounds of the non-transparent pixels, in source coordinates.
        content: PixelRect,
        /// The padded crop rectangle `pixels` was taken from.
        bounds: PixelRect,
    },
    /// The polygon enclosed no visible pixel (zero area, entirely off-canvas,
    /// or over fully transparent source pixels).
    Empty,
}

impl CutResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, CutResult::Empty)
    }

    /// The cutout raster, if any.
    pub fn into_pixels(self) -> Option<PixelBuffer> {
        match self {
            CutResult::Region { pixels, .. } => Some(pixels),
            CutResult::Empty => None,
        }
    }
}

/// Cut `polygon` out of `source` and crop the result to its padded content.
pub fn cut(source: &PixelBuffer, polygon: &[Point]) -> Result<CutResult, CutError> {
    if polygon.len() < MIN_POLYGON_POINTS {
        return Err(CutError::InsufficientPoints { have: polygon.len() });
    }
    let (w, h) = source.dimensions();
    let scratch = clip_to_polygon(source, polygon);

    let Some(content) = content_bounds(&scratch) else {
        return Ok(CutResult::Empty);
    };
    let bounds = content.padded(CROP_PADDING, w, h);
    let pixels =
        imageops::crop_imm(&scratch, bounds.x0, bounds.y0, bounds.width(), bounds.height())
            .to_image();
    Ok(CutResult::Region { pixels, content, bounds })
}

/// Copy `source` into a same-sized transparent raster, keeping only what lies
/// inside the polygon. Partially covered pixels get proportionally less alpha.
pub fn clip_to_polygon(source: &PixelBuffer, polygon: &[Point]) -> PixelBuffer {
    let (w, h) = source.dimensions();
    let mut out = PixelBuffer::new(w, h);
    if w == 0 || h == 0 || polygon.len() < MIN_POLYGON_POINTS {
        return out;
    }
    let coverage = polygon_coverage(polygon, w, h);
    let stride = w as usize * 4;
    let src_raw = source.as_raw();

    out.as_mut()
        .par_chunks_mut(stride)
        .zip(coverage.par_chunks(w as usize))
        .enumerate()
        .for_each(|(y, (row_out, row_cov))| {
            let row_in = &src_raw[y * stride..(y + 1) * stride];
            for (x, &cov) in row_cov.iter().enumerate() {
                if cov <= 0.0 {
                    continue;
                }
                let pi = x * 4;
                let a = (row_in[pi + 3] as f32 * cov).round().min(255.0) as u8;
                if a == 0 {
                    continue;
                }
                row_out[pi..pi + 3].copy_from_slice(&row_in[pi..pi + 3]);
                row_out[pi + 3] = a;
            }
        });
    out
}

/// Even-odd coverage (0..=1) of every pixel, row-major, `w * h` entries.
pub fn polygon_coverage(polygon: &[Point], w: u32, h: u32) -> Vec<f32> {
    let width = w as usize;
    let mut coverage = vec![0.0f32; width * h as usize];
    if width == 0 {
        return coverage;
    }
    let weight = 1.0 / SUBSAMPLES as f32;
    let n = polygon.len();

    coverage
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let mut nodes: Vec<f32> = Vec::with_capacity(n);
            for s in 0..SUBSAMPLES {
                let yf = y as f32 + (s as f32 + 0.5) * weight;
                nodes.clear();
                // Walk polygon edges (including closing edge n-1 → 0)
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (pi, pj) = (polygon[i], polygon[j]);
                    if (pi.y < yf && pj.y >= yf) || (pj.y < yf && pi.y >= yf) {
                        let t = (yf - pi.y) / (pj.y - pi.y);
                        nodes.push(pi.x + t * (pj.x - pi.x));
                    }
                }
                nodes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                for pair in nodes.chunks_exact(2) {
                    add_span(row, pair[0], pair[1], weight);
                }
            }
            for c in row.iter_mut() {
                *c = c.min(1.0);
            }
        });
    coverage
}

/// Accumulate the exact overlap of `[xa, xb)` with each pixel of `row`.
fn add_span(row: &mut [f32], xa: f32, xb: f32, weight: f32) {
    let w = row.len() as f32;
    let xa = xa.clamp(0.0, w);
    let xb = xb.clamp(0.0, w);
    if xa.is_nan() || xb.is_nan() || xb <= xa {
        return;
    }
    let first = xa.floor() as usize;
    let last = (xb.ceil() as usize).min(row.len());
    for (x, cell) in row.iter_mut().enumerate().take(last).skip(first) {
        let left = xa.max(x as f32);
        let right = xb.min(x as f32 + 1.0);
        if right > left {
            *cell += (right - left) * weight;
        }
    }
}

/// Tight bounds of all pixels with non-zero alpha, or `None` if there are none.
///
/// Scans the whole raster; disjoint regions all count.
pub fn content_bounds(img: &PixelBuffer) -> Option<PixelRect> {
    let (w, _) = img.dimensions();
    if w == 0 {
        return None;
    }
    let stride = w as usize * 4;
    img.as_raw()
        .par_chunks(stride)
        .enumerate()
        .filter_map(|(y, row)| {
            let mut xs = row
                .chunks_exact(4)
                .enumerate()
                .filter(|(_, px)| px[3] != 0)
                .map(|(x, _)| x as u32);
            let first = xs.next()?;
            let last = xs.last().unwrap_or(first);
            let y = y as u32;
            Some(PixelRect { x0: first, y0: y, x1: last + 1, y1: y + 1 })
        })
        .reduce_with(|a, b| PixelRect {
            x0: a.x0.min(b.x0),
            y0: a.y0.min(b.y0),
            x1: a.x1.max(b.x1),
            y1: a.y1.max(b.y1),
        })
}
