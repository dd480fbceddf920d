pub mod composite_stage;
pub mod glyphs;
pub mod mask_editor;
