// ============================================================================
// OPS: raster operations behind the editor and the composite stage
// ============================================================================
//
//   geometry.rs: point hit-testing
//   cut.rs: polygon clip + padded crop
//   transform.rs: 2×3 affine matrices, bilinear affine drawing, resize
//   adjustments.rs: per-pixel colour filters (brightness)
//   shapes.rs: anti-aliased circles, polylines, dashed outlines
//   text.rs: overlay glyph rasterizers
//   composite.rs: the final composite render
//   scripting.rs: rhai engine driving a Project headlessly

pub mod adjustments;
pub mod composite;
pub mod cut;
pub mod geometry;
pub mod scripting;
pub mod shapes;
pub mod text;
pub mod transform;
