// ============================================================================
// OVERLAY GLYPHS: emoji stickers placed on the composite, with selection
// ============================================================================
//
// The list order is the z-order: later glyphs draw on top. Selecting a glyph
// never reorders the list. At most one glyph is selected at a time.
// ============================================================================

#[cfg(test)]
#[path = "glyphs_test.rs"]
mod glyphs_test;

use uuid::Uuid;

use crate::canvas::Point;
use crate::ops::geometry::{glyph_hit_radius, hit_test_by};

/// Opaque unique glyph identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphId(pub Uuid);

impl std::fmt::Display for GlyphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GlyphId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(GlyphId)
    }
}

/// Source of fresh glyph ids. Only uniqueness within one store matters.
pub trait IdAllocator: Send {
    fn next_id(&mut self) -> GlyphId;
}

/// Random (v4) UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidAllocator;

impl IdAllocator for UuidAllocator {
    fn next_id(&mut self) -> GlyphId {
        GlyphId(Uuid::new_v4())
    }
}

/// Monotonic ids `1, 2, 3, …` packed into UUIDs; deterministic across runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialIds {
    next: u128,
}

impl IdAllocator for SequentialIds {
    fn next_id(&mut self) -> GlyphId {
        self.next += 1;
        GlyphId(Uuid::from_u128(self.next))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OverlayGlyph {
    pub id: GlyphId,
    /// A single grapheme, usually an emoji.
    pub symbol: String,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rotation_deg: f32,
}

impl OverlayGlyph {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

pub struct OverlayGlyphStore {
    glyphs: Vec<OverlayGlyph>,
    selected: Option<GlyphId>,
    /// Where new glyphs are placed (the composite centre).
    default_position: Point,
    ids: Box<dyn IdAllocator>,
}

impl std::fmt::Debug for OverlayGlyphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayGlyphStore")
            .field("glyphs", &self.glyphs)
            .field("selected", &self.selected)
            .field("default_position", &self.default_position)
            .finish_non_exhaustive()
    }
}

impl OverlayGlyphStore {
    pub fn new(default_position: Point) -> Self {
        Self::with_allocator(default_position, Box::new(UuidAllocator))
    }

    pub fn with_allocator(default_position: Point, ids: Box<dyn IdAllocator>) -> Self {
        Self { glyphs: Vec::new(), selected: None, default_position, ids }
    }

    /// Create a glyph at the default position with scale 1 and no rotation,
    /// and select it.
    pub fn add(&mut self, symbol: &str) -> GlyphId {
        let mut id = self.ids.next_id();
        // Allocators only promise uniqueness in principle; enforce set semantics.
        while self.contains(id) {
            id = self.ids.next_id();
        }
        self.glyphs.push(OverlayGlyph {
            id,
            symbol: symbol.to_string(),
            x: self.default_position.x,
            y: self.default_position.y,
            scale: 1.0,
            rotation_deg: 0.0,
        });
        self.selected = Some(id);
        id
    }

    /// Delete a glyph, clearing the selection if it was selected.
    /// Returns false when the id is unknown.
    pub fn remove(&mut self, id: GlyphId) -> bool {
        let Some(idx) = self.index_of(id) else { return false };
        self.glyphs.remove(idx);
        if self.selected == Some(id) {
            self.selected = None;
        }
        true
    }

    /// Only the selected glyph can be resized; `scale` must be finite and > 0.
    pub fn set_scale(&mut self, id: GlyphId, scale: f32) -> bool {
        if !(scale.is_finite() && scale > 0.0) {
            return false;
        }
        match self.selected_glyph_mut(id) {
            Some(g) => {
                g.scale = scale;
                true
            }
            None => false,
        }
    }

    /// Only the selected glyph can be rotated.
    pub fn set_rotation(&mut self, id: GlyphId, degrees: f32) -> bool {
        if !degrees.is_finite() {
            return false;
        }
        match self.selected_glyph_mut(id) {
            Some(g) => {
                g.rotation_deg = degrees;
                true
            }
            None => false,
        }
    }

    /// Absolute repositioning.
    pub fn move_to(&mut self, id: GlyphId, x: f32, y: f32) -> bool {
        match self.index_of(id) {
            Some(idx) => {
                let g = &mut self.glyphs[idx];
                g.x = x;
                g.y = y;
                true
            }
            None => false,
        }
    }

    /// Select `id`, or clear the selection with `None`. Unknown ids clear it.
    pub fn select(&mut self, id: Option<GlyphId>) {
        self.selected = id.filter(|id| self.contains(*id));
    }

    pub fn selected(&self) -> Option<GlyphId> {
        self.selected
    }

    pub fn selected_glyph(&self) -> Option<&OverlayGlyph> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Top-most glyph whose hit circle (`24 × scale`) contains `p`.
    pub fn glyph_at(&self, p: Point) -> Option<GlyphId> {
        let topmost_first = self.glyphs.iter().rev();
        hit_test_by(topmost_first.clone().map(|g| (g.position(), glyph_hit_radius(g.scale))), p)
            .and_then(|i| topmost_first.clone().nth(i))
            .map(|g| g.id)
    }

    pub fn get(&self, id: GlyphId) -> Option<&OverlayGlyph> {
        self.glyphs.iter().find(|g| g.id == id)
    }

    pub fn contains(&self, id: GlyphId) -> bool {
        self.index_of(id).is_some()
    }

    /// Glyphs in z-order, back to front.
    pub fn glyphs(&self) -> &[OverlayGlyph] {
        &self.glyphs
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn clear(&mut self) {
        self.glyphs.clear();
        self.selected = None;
    }

    fn index_of(&self, id: GlyphId) -> Option<usize> {
        self.glyphs.iter().position(|g| g.id == id)
    }

    fn selected_glyph_mut(&mut self, id: GlyphId) -> Option<&mut OverlayGlyph> {
        if self.selected != Some(id) {
            return None;
        }
        self.glyphs.iter_mut().find(|g| g.id == id)
    }
}
