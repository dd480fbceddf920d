use super::*;

fn store() -> OverlayGlyphStore {
    OverlayGlyphStore::with_allocator(Point::new(250.0, 250.0), Box::new(SequentialIds::default()))
}

// =============================================================
// Ids
// =============================================================

#[test]
fn sequential_ids_are_distinct_and_deterministic() {
    let mut a = SequentialIds::default();
    let mut b = SequentialIds::default();
    let first = a.next_id();
    assert_ne!(first, a.next_id());
    assert_eq!(first, b.next_id());
}

#[test]
fn glyph_id_parses_its_display_form() {
    let id = UuidAllocator.next_id();
    assert_eq!(id.to_string().parse::<GlyphId>().unwrap(), id);
    assert!("not-a-uuid".parse::<GlyphId>().is_err());
}

struct StuckAllocator(u128);

impl IdAllocator for StuckAllocator {
    fn next_id(&mut self) -> GlyphId {
        // Repeats every id once.
        self.0 += 1;
        GlyphId(Uuid::from_u128(self.0 / 2))
    }
}

#[test]
fn duplicate_ids_from_allocator_are_skipped() {
    let mut s = OverlayGlyphStore::with_allocator(Point::default(), Box::new(StuckAllocator(1)));
    let a = s.add("⭐");
    let b = s.add("⭐");
    assert_ne!(a, b);
    assert_eq!(s.len(), 2);
}

// =============================================================
// Add / remove
// =============================================================

#[test]
fn add_places_at_default_and_selects() {
    let mut s = store();
    let id = s.add("👑");
    let g = s.get(id).unwrap();
    assert_eq!((g.x, g.y, g.scale, g.rotation_deg), (250.0, 250.0, 1.0, 0.0));
    assert_eq!(g.symbol, "👑");
    assert_eq!(s.selected(), Some(id));
}

#[test]
fn remove_clears_selection_only_for_selected() {
    let mut s = store();
    let a = s.add("A");
    let b = s.add("B");
    assert!(s.remove(a));
    assert_eq!(s.selected(), Some(b));
    assert!(s.remove(b));
    assert_eq!(s.selected(), None);
}

#[test]
fn remove_unknown_is_noop() {
    let mut s = store();
    let a = s.add("A");
    assert!(s.remove(a));
    assert!(!s.remove(a));
    assert!(s.is_empty());
}

// =============================================================
// Mutation guards
// =============================================================

#[test]
fn scale_and_rotation_require_selection() {
    let mut s = store();
    let a = s.add("A");
    let b = s.add("B");
    assert!(!s.set_scale(a, 2.0));
    assert!(!s.set_rotation(a, 45.0));
    assert!(s.set_scale(b, 2.0));
    assert!(s.set_rotation(b, 45.0));
    assert_eq!(s.get(a).unwrap().scale, 1.0);
    assert_eq!(s.get(b).unwrap().scale, 2.0);
    assert_eq!(s.get(b).unwrap().rotation_deg, 45.0);
}

#[test]
fn invalid_scale_is_rejected() {
    let mut s = store();
    let a = s.add("A");
    assert!(!s.set_scale(a, 0.0));
    assert!(!s.set_scale(a, -1.0));
    assert!(!s.set_scale(a, f32::NAN));
    assert!(!s.set_rotation(a, f32::INFINITY));
    assert_eq!(s.get(a).unwrap().scale, 1.0);
}

#[test]
fn move_does_not_need_selection() {
    let mut s = store();
    let a = s.add("A");
    s.select(None);
    assert!(s.move_to(a, 10.0, 20.0));
    assert_eq!(s.get(a).unwrap().position(), Point::new(10.0, 20.0));
}

#[test]
fn selecting_unknown_id_clears() {
    let mut s = store();
    let a = s.add("A");
    s.remove(a);
    s.add("B");
    s.select(Some(a));
    assert_eq!(s.selected(), None);
}

// =============================================================
// Hit testing
// =============================================================

#[test]
fn topmost_overlapping_glyph_wins() {
    let mut s = store();
    let bottom = s.add("A");
    let top = s.add("B");
    assert_eq!(s.glyph_at(Point::new(255.0, 255.0)), Some(top));
    s.move_to(top, 400.0, 400.0);
    assert_eq!(s.glyph_at(Point::new(255.0, 255.0)), Some(bottom));
    assert_eq!(s.glyph_at(Point::new(100.0, 100.0)), None);
}

#[test]
fn hit_radius_grows_with_scale() {
    let mut s = store();
    let a = s.add("A");
    let probe = Point::new(250.0 + 30.0, 250.0);
    assert_eq!(s.glyph_at(probe), None);
    s.set_scale(a, 1.5);
    assert_eq!(s.glyph_at(probe), Some(a));
}

#[test]
fn selection_does_not_reorder() {
    let mut s = store();
    let a = s.add("A");
    let b = s.add("B");
    s.select(Some(a));
    let order: Vec<GlyphId> = s.glyphs().iter().map(|g| g.id).collect();
    assert_eq!(order, vec![a, b]);
}
