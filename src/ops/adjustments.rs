// ============================================================================
// COLOR ADJUSTMENTS: per-pixel filters applied while drawing the cutout
// ============================================================================

#[cfg(test)]
#[path = "adjustments_test.rs"]
mod adjustments_test;

/// Brightness at which the filter is the identity.
pub const NEUTRAL_BRIGHTNESS: f32 = 100.0;

/// Multiplicative brightness: RGB channels scale by `percent / 100`,
/// alpha is untouched. Negative percentages act as zero.
pub fn brightness(percent: f32) -> impl Fn(f32, f32, f32, f32) -> (f32, f32, f32, f32) + Sync + Copy {
    let factor = (percent / 100.0).max(0.0);
    move |r, g, b, a| (r * factor, g * factor, b * factor, a)
}
