// ============================================================================
// COMPOSITE STAGE: adjust the cutout and place overlay glyphs over it
// ============================================================================

#[cfg(test)]
#[path = "composite_stage_test.rs"]
mod composite_stage_test;

use image::Rgba;
use std::sync::Arc;

use crate::canvas::{PixelBuffer, Point};
use crate::components::glyphs::{GlyphId, IdAllocator, OverlayGlyph, OverlayGlyphStore, UuidAllocator};
use crate::ops::composite::{self, TransformParams};
use crate::ops::text::GlyphRasterizer;

/// Glyph being dragged and the grab point relative to its position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphDrag {
    pub id: GlyphId,
    pub offset: Point,
}

pub struct CompositeStage {
    cutout: PixelBuffer,
    params: TransformParams,
    glyphs: OverlayGlyphStore,
    drag: Option<GlyphDrag>,
    size: (u32, u32),
    rasterizer: Arc<dyn GlyphRasterizer>,
}

impl std::fmt::Debug for CompositeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeStage")
            .field("cutout", &self.cutout.dimensions())
            .field("params", &self.params)
            .field("glyphs", &self.glyphs)
            .field("drag", &self.drag)
            .field("size", &self.size)
            .field("rasterizer", &self.rasterizer.name())
            .finish()
    }
}

impl CompositeStage {
    pub fn new(
        cutout: PixelBuffer,
        size: (u32, u32),
        background: Rgba<u8>,
        rasterizer: Arc<dyn GlyphRasterizer>,
    ) -> Self {
        Self::with_allocator(cutout, size, background, rasterizer, Box::new(UuidAllocator))
    }

    pub fn with_allocator(
        cutout: PixelBuffer,
        size: (u32, u32),
        background: Rgba<u8>,
        rasterizer: Arc<dyn GlyphRasterizer>,
        ids: Box<dyn IdAllocator>,
    ) -> Self {
        let center = Point::new(size.0 as f32 * 0.5, size.1 as f32 * 0.5);
        Self {
            cutout,
            params: TransformParams { background, ..TransformParams::default() },
            glyphs: OverlayGlyphStore::with_allocator(center, ids),
            drag: None,
            size,
            rasterizer,
        }
    }

    // ---- Cutout adjustments -----------------------------------------------

    /// Uniform scale; must be finite and > 0.
    pub fn set_scale(&mut self, scale: f32) -> bool {
        if !(scale.is_finite() && scale > 0.0) {
            return false;
        }
        self.params.scale = scale;
        true
    }

    pub fn set_rotation(&mut self, degrees: f32) -> bool {
        if !degrees.is_finite() {
            return false;
        }
        self.params.rotation_deg = degrees;
        true
    }

    pub fn reset_rotation(&mut self) {
        self.params.rotation_deg = 0.0;
    }

    /// Brightness in percent; must be finite and >= 0.
    pub fn set_brightness(&mut self, percent: f32) -> bool {
        if !(percent.is_finite() && percent >= 0.0) {
            return false;
        }
        self.params.brightness_pct = percent;
        true
    }

    pub fn set_background(&mut self, color: Rgba<u8>) {
        self.params.background = color;
    }

    // ---- Glyph pointer contract --------------------------------------------

    /// Select the top-most glyph under `p`, or clear the selection.
    pub fn click(&mut self, p: Point) -> Option<GlyphId> {
        let hit = self.glyphs.glyph_at(p);
        self.glyphs.select(hit);
        hit
    }

    /// Start dragging the selected glyph, remembering where it was grabbed.
    /// Needs a selection; the press itself does not have to hit the glyph.
    pub fn begin_drag(&mut self, p: Point) -> bool {
        let Some(glyph) = self.glyphs.selected_glyph() else { return false };
        self.drag = Some(GlyphDrag { id: glyph.id, offset: p - glyph.position() });
        true
    }

    pub fn update_drag(&mut self, p: Point) -> bool {
        let Some(drag) = self.drag else { return false };
        let target = p - drag.offset;
        self.glyphs.move_to(drag.id, target.x, target.y)
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    // ---- Glyph store ------------------------------------------------------

    pub fn add_glyph(&mut self, symbol: &str) -> GlyphId {
        let id = self.glyphs.add(symbol);
        crate::log_info!("Glyph '{}' added ({} total)", symbol, self.glyphs.len());
        id
    }

    pub fn remove_glyph(&mut self, id: GlyphId) -> bool {
        if self.drag.is_some_and(|d| d.id == id) {
            self.drag = None;
        }
        self.glyphs.remove(id)
    }

    pub fn remove_selected_glyph(&mut self) -> bool {
        match self.glyphs.selected() {
            Some(id) => self.remove_glyph(id),
            None => false,
        }
    }

    pub fn set_glyph_scale(&mut self, id: GlyphId, scale: f32) -> bool {
        self.glyphs.set_scale(id, scale)
    }

    pub fn set_glyph_rotation(&mut self, id: GlyphId, degrees: f32) -> bool {
        self.glyphs.set_rotation(id, degrees)
    }

    pub fn move_glyph(&mut self, id: GlyphId, x: f32, y: f32) -> bool {
        self.glyphs.move_to(id, x, y)
    }

    pub fn select_glyph(&mut self, id: Option<GlyphId>) {
        self.glyphs.select(id);
    }

    pub fn clear_glyphs(&mut self) {
        self.drag = None;
        self.glyphs.clear();
    }

    // ---- Rendering ----------------------------------------------------------

    pub fn render(&self) -> PixelBuffer {
        composite::render(
            &self.cutout,
            &self.params,
            self.glyphs.glyphs(),
            self.glyphs.selected(),
            self.size,
            self.rasterizer.as_ref(),
        )
    }

    // ---- Accessors ----------------------------------------------------------

    pub fn params(&self) -> &TransformParams {
        &self.params
    }

    pub fn glyphs(&self) -> &[OverlayGlyph] {
        self.glyphs.glyphs()
    }

    pub fn glyph(&self, id: GlyphId) -> Option<&OverlayGlyph> {
        self.glyphs.get(id)
    }

    pub fn selected_glyph(&self) -> Option<GlyphId> {
        self.glyphs.selected()
    }

    pub fn drag(&self) -> Option<GlyphDrag> {
        self.drag
    }

    pub fn cutout(&self) -> &PixelBuffer {
        &self.cutout
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}
