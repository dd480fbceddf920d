// ============================================================================
// PROJECT: the load → trace → cut → compose → export workflow
// ============================================================================
//
// A project owns at most one source raster, at most one tracing editor and at
// most one composite stage. A successful cut replaces the composite stage;
// cancelling tracing never touches an existing composite.
// ============================================================================

#[cfg(test)]
#[path = "project_test.rs"]
mod project_test;

use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::canvas::PixelBuffer;
use crate::components::composite_stage::CompositeStage;
use crate::components::mask_editor::PolygonMaskEditor;
use crate::io::{self, IoError};
use crate::ops::cut::{CutError, CutResult};
use crate::ops::text::{rasterizer_from_settings, GlyphRasterizer, TofuRasterizer};
use crate::settings::AppSettings;

/// Which stage a host should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Nothing loaded.
    Empty,
    /// A source is being traced.
    Tracing,
    /// A cutout exists and is being composed.
    Composing,
}

/// Result of [`Project::cut`] when the polygon was valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CutOutcome {
    /// The composite stage now holds the new cutout.
    Composed { width: u32, height: u32 },
    /// The polygon enclosed nothing; tracing continues.
    Empty,
    /// No tracing session is open.
    NotTracing,
}

pub struct Project {
    pub id: Uuid,
    pub settings: AppSettings,
    source: Option<PixelBuffer>,
    editor: Option<PolygonMaskEditor>,
    composite: Option<CompositeStage>,
    rasterizer: Arc<dyn GlyphRasterizer>,
}

impl Default for Project {
    fn default() -> Self {
        Self::with_rasterizer(AppSettings::default(), Arc::new(TofuRasterizer))
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("id", &self.id)
            .field("stage", &self.stage())
            .field("source", &self.source.as_ref().map(|s| s.dimensions()))
            .field("editor", &self.editor)
            .field("composite", &self.composite)
            .finish()
    }
}

impl Project {
    /// New project whose glyph font comes from `settings`.
    pub fn new(settings: AppSettings) -> Self {
        let rasterizer = rasterizer_from_settings(&settings);
        Self::with_rasterizer(settings, rasterizer)
    }

    pub fn with_rasterizer(settings: AppSettings, rasterizer: Arc<dyn GlyphRasterizer>) -> Self {
        Self { id: Uuid::new_v4(), settings, source: None, editor: None, composite: None, rasterizer }
    }

    pub fn stage(&self) -> Stage {
        if self.editor.is_some() {
            Stage::Tracing
        } else if self.composite.is_some() {
            Stage::Composing
        } else {
            Stage::Empty
        }
    }

    /// Load a decoded source and start tracing it. Any previous work is dropped.
    pub fn open_source(&mut self, source: PixelBuffer) {
        crate::log_info!("Source opened: {}x{}", source.width(), source.height());
        self.composite = None;
        self.editor = Some(self.new_editor(&source));
        self.source = Some(source);
    }

    pub fn open_path(&mut self, path: &Path) -> Result<(), IoError> {
        let source = io::load_source(path)?;
        self.open_source(source);
        Ok(())
    }

    /// Leave tracing without cutting. Without a composite to return to, the
    /// source is dropped as well.
    pub fn cancel_tracing(&mut self) {
        if self.editor.take().is_none() {
            return;
        }
        if self.composite.is_none() {
            self.source = None;
        }
        crate::log_info!("Tracing cancelled");
    }

    /// Re-open tracing on the current source with a fresh polygon. The
    /// composite stays until the next successful cut.
    pub fn adjust_tracing(&mut self) -> bool {
        let Some(source) = self.source.as_ref() else { return false };
        self.editor = Some(self.new_editor(source));
        true
    }

    /// Cut the traced polygon. On success the editor closes and a new
    /// composite stage opens; an empty cut keeps tracing.
    pub fn cut(&mut self) -> Result<CutOutcome, CutError> {
        let Some(editor) = self.editor.as_ref() else { return Ok(CutOutcome::NotTracing) };
        match editor.cut()? {
            CutResult::Region { pixels, .. } => {
                let (width, height) = pixels.dimensions();
                let size = (self.settings.composite_width, self.settings.composite_height);
                self.composite =
                    Some(CompositeStage::new(pixels, size, self.settings.background, self.rasterizer.clone()));
                self.editor = None;
                crate::log_info!("Composite stage opened with {}x{} cutout", width, height);
                Ok(CutOutcome::Composed { width, height })
            }
            CutResult::Empty => Ok(CutOutcome::Empty),
        }
    }

    /// Back to an empty project.
    pub fn reset(&mut self) {
        self.source = None;
        self.editor = None;
        self.composite = None;
        crate::log_info!("Project reset");
    }

    /// Final composite raster, if a composite stage exists.
    pub fn render(&self) -> Option<PixelBuffer> {
        self.composite.as_ref().map(CompositeStage::render)
    }

    /// Render the composite and encode it as PNG.
    pub fn export_png(&self) -> Option<Result<Vec<u8>, IoError>> {
        self.render().map(|img| io::encode_png(&img))
    }

    /// Render the composite and write it to `path`. Returns false when there
    /// is nothing to export.
    pub fn export_to(&self, path: &Path) -> Result<bool, IoError> {
        let Some(img) = self.render() else { return Ok(false) };
        io::save_png(&img, path)?;
        crate::log_info!("Exported {}x{} composite to {}", img.width(), img.height(), path.display());
        Ok(true)
    }

    fn new_editor(&self, source: &PixelBuffer) -> PolygonMaskEditor {
        PolygonMaskEditor::new(source, self.settings.max_canvas_side, self.settings.editor_zoom_max)
    }

    pub fn source(&self) -> Option<&PixelBuffer> {
        self.source.as_ref()
    }

    pub fn editor(&self) -> Option<&PolygonMaskEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut PolygonMaskEditor> {
        self.editor.as_mut()
    }

    pub fn composite(&self) -> Option<&CompositeStage> {
        self.composite.as_ref()
    }

    pub fn composite_mut(&mut self) -> Option<&mut CompositeStage> {
        self.composite.as_mut()
    }
}
