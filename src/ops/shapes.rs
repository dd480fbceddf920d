// ============================================================================
// SHAPES: anti-aliased circles, strokes and dashed outlines
// ============================================================================
//
// Every primitive is a signed distance field evaluated at pixel centres inside
// its padded bounding box; coverage comes from a one-pixel smoothstep across
// the zero crossing and is blended source-over onto the target.
// ============================================================================

#[cfg(test)]
#[path = "shapes_test.rs"]
mod shapes_test;

use image::Rgba;
use rayon::prelude::*;

use crate::canvas::{blend_pixel, PixelBuffer, Point};

/// Rasterize an SDF over the box `[min, max]` (canvas coordinates), padded
/// for anti-aliasing and clamped to the canvas.
fn rasterize_sdf<F>(img: &mut PixelBuffer, min: Point, max: Point, color: Rgba<u8>, sdf: F)
where
    F: Fn(f32, f32) -> f32 + Sync,
{
    let (canvas_w, canvas_h) = img.dimensions();
    if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
        return;
    }
    let x0 = ((min.x - 1.0).floor() as i64).max(0) as usize;
    let y0 = ((min.y - 1.0).floor() as i64).max(0) as usize;
    let x1 = ((max.x + 1.0).ceil() as i64).clamp(0, canvas_w as i64) as usize;
    let y1 = ((max.y + 1.0).ceil() as i64).clamp(0, canvas_h as i64) as usize;
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let row_bytes = canvas_w as usize * 4;
    img.as_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .skip(y0)
        .take(y1 - y0)
        .for_each(|(y, row)| {
            let py = y as f32 + 0.5;
            for x in x0..x1 {
                let d = sdf(x as f32 + 0.5, py);
                let coverage = smoothstep(0.5, -0.5, d);
                if coverage > 0.001 {
                    let idx = x * 4;
                    blend_pixel(&mut row[idx..idx + 4], color, coverage);
                }
            }
        });
}

/// Filled disc.
pub fn fill_circle(img: &mut PixelBuffer, center: Point, radius: f32, color: Rgba<u8>) {
    let r = Point::new(radius, radius);
    rasterize_sdf(img, center - r, center + r, color, |px, py| {
        Point::new(px, py).distance(center) - radius
    });
}

/// Circle outline of `width`, centred on the radius.
pub fn stroke_circle(img: &mut PixelBuffer, center: Point, radius: f32, width: f32, color: Rgba<u8>) {
    let half = width * 0.5;
    let r = Point::new(radius + half, radius + half);
    rasterize_sdf(img, center - r, center + r, color, |px, py| {
        (Point::new(px, py).distance(center) - radius).abs() - half
    });
}

/// Stroke a set of independent segments as one shape, so overlapping joints
/// are covered once rather than blended twice.
pub fn stroke_segments(img: &mut PixelBuffer, segments: &[(Point, Point)], width: f32, color: Rgba<u8>) {
    if segments.is_empty() {
        return;
    }
    let half = width * 0.5;
    let mut min = Point::new(f32::MAX, f32::MAX);
    let mut max = Point::new(f32::MIN, f32::MIN);
    for &(a, b) in segments {
        min = Point::new(min.x.min(a.x).min(b.x), min.y.min(a.y).min(b.y));
        max = Point::new(max.x.max(a.x).max(b.x), max.y.max(a.y).max(b.y));
    }
    let pad = Point::new(half, half);
    rasterize_sdf(img, min - pad, max + pad, color, |px, py| {
        let p = Point::new(px, py);
        segments
            .iter()
            .map(|&(a, b)| sdf_line_segment(p, a, b))
            .fold(f32::MAX, f32::min)
            - half
    });
}

/// Stroke the path through `points`, joining the last point back to the
/// first when `closed` is set.
pub fn stroke_polyline(img: &mut PixelBuffer, points: &[Point], closed: bool, width: f32, color: Rgba<u8>) {
    stroke_segments(img, &polyline_segments(points, closed), width, color);
}

/// Stroke a path with a repeating `[on, off]` dash pattern. The dash phase
/// runs continuously around corners.
pub fn stroke_dashed_polyline(
    img: &mut PixelBuffer,
    points: &[Point],
    closed: bool,
    width: f32,
    dash: [f32; 2],
    color: Rgba<u8>,
) {
    let dashes = dash_segments(&polyline_segments(points, closed), dash);
    stroke_segments(img, &dashes, width, color);
}

fn polyline_segments(points: &[Point], closed: bool) -> Vec<(Point, Point)> {
    let mut segments: Vec<(Point, Point)> = points.windows(2).map(|w| (w[0], w[1])).collect();
    if closed
        && points.len() >= 3
        && let (Some(&first), Some(&last)) = (points.first(), points.last())
    {
        segments.push((last, first));
    }
    segments
}

/// Split a path into the "on" pieces of a dash pattern.
fn dash_segments(segments: &[(Point, Point)], dash: [f32; 2]) -> Vec<(Point, Point)> {
    let [on, off] = dash;
    let period = on + off;
    if !(on > 0.0 && off >= 0.0 && period.is_finite()) {
        return segments.to_vec();
    }
    let mut out = Vec::new();
    let mut phase = 0.0f32;
    for &(a, b) in segments {
        let len = a.distance(b);
        if len <= 0.0 {
            continue;
        }
        let dir = Point::new((b.x - a.x) / len, (b.y - a.y) / len);
        let at = |t: f32| Point::new(a.x + dir.x * t, a.y + dir.y * t);
        let mut t = 0.0f32;
        while t < len {
            let in_dash = phase < on;
            let remaining = if in_dash { on - phase } else { period - phase };
            let step = remaining.min(len - t);
            if in_dash {
                out.push((at(t), at(t + step)));
            }
            t += step;
            phase = (phase + step) % period;
        }
    }
    out
}

/// Distance from `p` to the segment `a`–`b`.
fn sdf_line_segment(p: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
