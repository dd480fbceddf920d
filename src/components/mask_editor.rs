// ============================================================================
// POLYGON MASK EDITOR: trace a cut boundary by placing and dragging points
// ============================================================================
//
// Pointer handling is an explicit state machine:
//
//   Idle     --click-->            Idle (point appended)
//   Selected --click-->            Idle (selection cleared, no point added)
//   any      --press on point-->   Dragging
//   Dragging --move-->             Dragging (point follows cursor)
//   Dragging --release-->          Selected
//
// All coordinates handed to the editor are raster coordinates of the fitted
// source; hosts convert pointer positions with `view_to_raster` first.
// ============================================================================

#[cfg(test)]
#[path = "mask_editor_test.rs"]
mod mask_editor_test;

use image::Rgba;

use crate::canvas::{fit_canvas_size, PixelBuffer, Point, TRANSPARENT};
use crate::ops::cut::{self, CutError, CutResult};
use crate::ops::geometry::{hit_test, POINT_HIT_RADIUS};
use crate::ops::shapes::{fill_circle, stroke_circle, stroke_polyline};
use crate::ops::transform::{draw_image, resize_to, Affine};

pub const BOUNDARY_COLOR: Rgba<u8> = Rgba([0x0e, 0xa5, 0xe9, 255]);
pub const HOVER_FILL: Rgba<u8> = Rgba([0x7d, 0xd3, 0xfc, 255]);
pub const POINT_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const LINE_WIDTH: f32 = 2.0;
pub const POINT_RADIUS: f32 = 4.0;
pub const MIN_ZOOM: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerState {
    Idle,
    Selected { index: usize },
    Dragging { index: usize },
}

impl PointerState {
    pub fn selected_index(self) -> Option<usize> {
        match self {
            PointerState::Idle => None,
            PointerState::Selected { index } | PointerState::Dragging { index } => Some(index),
        }
    }
}

/// What a plain click did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    PointAdded(usize),
    /// A point was selected; the click only cleared the selection.
    Deselected,
    /// Non-finite coordinates.
    Ignored,
}

/// Pointer shape a host should show over the tracing view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorHint {
    Crosshair,
    Move,
}

#[derive(Clone, Debug)]
pub struct PolygonMaskEditor {
    source: PixelBuffer,
    points: Vec<Point>,
    state: PointerState,
    hovered: Option<usize>,
    zoom: f32,
    zoom_max: f32,
}

impl PolygonMaskEditor {
    /// Start tracing over `source`, resampled to fit `max_side`.
    pub fn new(source: &PixelBuffer, max_side: u32, zoom_max: f32) -> Self {
        let (w, h) = fit_canvas_size(source.width(), source.height(), max_side);
        Self::from_fitted(resize_to(source, w, h), zoom_max)
    }

    /// Start tracing over a raster that is already at canvas size.
    pub fn from_fitted(source: PixelBuffer, zoom_max: f32) -> Self {
        Self {
            source,
            points: Vec::new(),
            state: PointerState::Idle,
            hovered: None,
            zoom: MIN_ZOOM,
            zoom_max: zoom_max.max(MIN_ZOOM),
        }
    }

    // ---- Pointer operations ------------------------------------------------

    /// Plain click: appends a point, unless a point is selected, in which case
    /// the click is absorbed as a deselect.
    pub fn click(&mut self, p: Point) -> ClickOutcome {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return ClickOutcome::Ignored;
        }
        if self.state.selected_index().is_some() {
            self.state = PointerState::Idle;
            return ClickOutcome::Deselected;
        }
        self.points.push(p);
        ClickOutcome::PointAdded(self.points.len() - 1)
    }

    /// Press: grabs the first point within the hit radius. A press that misses
    /// changes nothing.
    pub fn begin_drag(&mut self, p: Point) -> bool {
        match hit_test(&self.points, p, POINT_HIT_RADIUS) {
            Some(index) => {
                self.state = PointerState::Dragging { index };
                true
            }
            None => false,
        }
    }

    pub fn update_drag(&mut self, p: Point) -> bool {
        match self.state {
            PointerState::Dragging { index } if p.x.is_finite() && p.y.is_finite() => {
                self.points[index] = p;
                true
            }
            _ => false,
        }
    }

    /// Release: the dragged point stays selected.
    pub fn end_drag(&mut self) {
        if let PointerState::Dragging { index } = self.state {
            self.state = PointerState::Selected { index };
        }
    }

    pub fn update_hover(&mut self, p: Point) -> Option<usize> {
        self.hovered = hit_test(&self.points, p, POINT_HIT_RADIUS);
        self.hovered
    }

    /// Remove the most recently placed point.
    pub fn undo_last_point(&mut self) -> Option<Point> {
        let removed = self.points.pop()?;
        let len = self.points.len();
        if self.state.selected_index() == Some(len) {
            self.state = PointerState::Idle;
        }
        if self.hovered == Some(len) {
            self.hovered = None;
        }
        Some(removed)
    }

    pub fn remove_selected_point(&mut self) -> Option<Point> {
        let index = self.state.selected_index()?;
        self.state = PointerState::Idle;
        // Indices after `index` shift; hover is recomputed on the next move.
        self.hovered = None;
        Some(self.points.remove(index))
    }

    // ---- Cut --------------------------------------------------------------

    /// Cut the traced polygon out of the source. Fails without touching the
    /// polygon when fewer than three points exist.
    pub fn cut(&self) -> Result<CutResult, CutError> {
        let result = cut::cut(&self.source, &self.points)?;
        match &result {
            CutResult::Region { bounds, .. } => crate::log_info!(
                "Cut {} points -> {}x{} at ({}, {})",
                self.points.len(),
                bounds.width(),
                bounds.height(),
                bounds.x0,
                bounds.y0
            ),
            CutResult::Empty => crate::log_warn!("Cut of {} points enclosed no pixels", self.points.len()),
        }
        Ok(result)
    }

    // ---- View -------------------------------------------------------------

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, self.zoom_max);
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn view_transform(&self) -> Affine {
        let c = self.center();
        Affine::translate(c.x, c.y) * Affine::scale(self.zoom) * Affine::translate(-c.x, -c.y)
    }

    fn center(&self) -> Point {
        Point::new(self.source.width() as f32 * 0.5, self.source.height() as f32 * 0.5)
    }

    /// Map a position on the (zoomed) view to raster coordinates.
    pub fn view_to_raster(&self, p: Point) -> Point {
        let c = self.center();
        Point::new(c.x + (p.x - c.x) / self.zoom, c.y + (p.y - c.y) / self.zoom)
    }

    pub fn raster_to_view(&self, p: Point) -> Point {
        self.view_transform().apply(p)
    }

    pub fn cursor(&self) -> CursorHint {
        if self.hovered.is_some() { CursorHint::Move } else { CursorHint::Crosshair }
    }

    /// Draw the tracing view: zoomed source, boundary path (closed from three
    /// points on), then the point handles coloured selected > hovered > plain.
    pub fn render(&self) -> PixelBuffer {
        let (w, h) = self.source.dimensions();
        let mut view = PixelBuffer::from_pixel(w, h, TRANSPARENT);
        let t = self.view_transform();
        draw_image(&mut view, &self.source, t);

        if self.points.is_empty() {
            return view;
        }
        let pts: Vec<Point> = self.points.iter().map(|&p| t.apply(p)).collect();
        let z = self.zoom;
        stroke_polyline(&mut view, &pts, pts.len() >= 3, LINE_WIDTH * z, BOUNDARY_COLOR);

        let selected = self.state.selected_index();
        for (i, &p) in pts.iter().enumerate() {
            let fill = if selected == Some(i) {
                BOUNDARY_COLOR
            } else if self.hovered == Some(i) {
                HOVER_FILL
            } else {
                POINT_FILL
            };
            fill_circle(&mut view, p, POINT_RADIUS * z, fill);
            stroke_circle(&mut view, p, POINT_RADIUS * z, LINE_WIDTH * z, BOUNDARY_COLOR);
        }
        view
    }

    // ---- Accessors ----------------------------------------------------------

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected_index()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, PointerState::Dragging { .. })
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.source.dimensions()
    }
}
