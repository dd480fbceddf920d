//! Headfloat: trace a polygon over a photo, cut the region out and compose
//! it over a background together with emoji overlay glyphs.
//!
//! The crate is UI-agnostic: [`components::mask_editor::PolygonMaskEditor`]
//! and [`components::composite_stage::CompositeStage`] take pointer events
//! in canvas coordinates and render into plain RGBA rasters, and
//! [`project::Project`] ties them into the load → trace → cut → compose →
//! export workflow.

#[macro_use]
pub mod logger;
pub mod canvas;
pub mod cli;
pub mod components;
pub mod io;
pub mod ops;
pub mod project;
pub mod settings;
