// ============================================================================
// GEOMETRY: proximity hit testing shared by the tracing and composite stages
// ============================================================================

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::canvas::Point;

/// Hit radius for polygon points, in raster units.
pub const POINT_HIT_RADIUS: f32 = 8.0;

/// Hit radius of an overlay glyph at scale 1; grows linearly with glyph scale.
pub const GLYPH_HIT_RADIUS: f32 = 24.0;

/// Index of the first candidate strictly closer than `radius` to `target`.
///
/// Sequence order breaks ties: when several candidates are in range the
/// earliest one wins, regardless of which is nearest.
pub fn hit_test(candidates: &[Point], target: Point, radius: f32) -> Option<usize> {
    hit_test_by(candidates.iter().map(|&p| (p, radius)), target)
}

/// Like [`hit_test`], but every candidate carries its own radius.
pub fn hit_test_by<I>(candidates: I, target: Point) -> Option<usize>
where
    I: IntoIterator<Item = (Point, f32)>,
{
    candidates
        .into_iter()
        .position(|(p, radius)| p.distance(target) < radius)
}

/// Hit radius for a glyph drawn at `scale`.
#[inline]
pub fn glyph_hit_radius(scale: f32) -> f32 {
    GLYPH_HIT_RADIUS * scale
}
