// ============================================================================
// Headfloat Scripting System: Rhai-based sandboxed scripting engine
// ============================================================================
//
// Scripts drive a project headlessly with the same operations a pointer-driven
// host would perform: clicks and drags on the tracing canvas, the cut, the
// composite sliders and the overlay glyph buttons. Coordinates accept either
// integers or floats.

#[cfg(test)]
#[path = "scripting_test.rs"]
mod scripting_test;

use rhai::{AST, Engine, ImmutableString, Position, Scope};
use std::sync::{Arc, Mutex};

use crate::canvas::{parse_hex_color, Point};
use crate::components::glyphs::GlyphId;
use crate::components::mask_editor::ClickOutcome;
use crate::project::{CutOutcome, Project, Stage};

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, Clone)]
pub struct ScriptError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl ScriptError {
    fn at(message: String, pos: Position) -> Self {
        ScriptError {
            message,
            line: pos.line().filter(|l| *l > 0),
            column: pos.position().filter(|c| *c > 0),
        }
    }

    /// Error explanation with line/column context and suggestions.
    pub fn friendly_message(&self) -> String {
        let raw = &self.message;
        let cleaned = raw.split(" (line ").next().unwrap_or(raw);
        let mut parts = Vec::new();

        match (self.line, self.column) {
            (Some(line), Some(col)) => parts.push(format!("Error on line {}, column {}:", line, col)),
            (Some(line), None) => parts.push(format!("Error on line {}:", line)),
            _ => parts.push("Script error:".to_string()),
        }

        if let Some(fn_part) = raw.strip_prefix("Function not found: ") {
            let fn_desc = fn_part.split(" (line ").next().unwrap_or(fn_part);
            parts.push(format!("  Could not find function: {}", fn_desc.trim()));
            parts.push(String::new());
            parts.push("  Tip: check the spelling and argument count. Glyph ids are".to_string());
            parts.push("  strings returned by add_glyph(), e.g.:".to_string());
            parts.push("    let crown = add_glyph(\"👑\");".to_string());
            parts.push("    glyph_scale(crown, 1.5);".to_string());
        } else if let Some(var_part) = raw.split("Variable not found:").nth(1) {
            let var_name = var_part.split('(').next().unwrap_or(var_part).trim();
            parts.push(format!("  Variable '{}' is not defined.", var_name));
            parts.push(String::new());
            parts.push("  Tip: Make sure you declared it with 'let' before using it:".to_string());
            parts.push(format!("    let {} = 0;", var_name));
        } else if raw.contains("Syntax error") || raw.contains("Expected") {
            parts.push(format!("  Syntax error: {}", cleaned));
            parts.push(String::new());
            parts.push("  Tip: Check for missing semicolons, brackets, or typos near this line.".to_string());
        } else if raw.contains("Too many operations") {
            parts.push("  Script exceeded the maximum operation limit.".to_string());
            parts.push(String::new());
            parts.push("  Tip: Your script may have an infinite loop.".to_string());
        } else {
            parts.push(format!("  {}", cleaned));
        }

        parts.join("\n")
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, "Line {}, Col {}: {}", line, col, self.message)
        } else if let Some(line) = self.line {
            write!(f, "Line {}: {}", line, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ScriptError {}

// ============================================================================
// Script context: shared mutable state between engine and host functions
// ============================================================================

struct ScriptContext {
    project: Project,
    console_output: Vec<String>,
}

type SharedContext = Arc<Mutex<ScriptContext>>;

fn with_ctx<R>(ctx: &SharedContext, f: impl FnOnce(&mut ScriptContext) -> R) -> R {
    let mut lock = ctx.lock().unwrap_or_else(|e| e.into_inner());
    f(&mut lock)
}

// ============================================================================
// Engine construction with full sandbox + API registration
// ============================================================================

/// Create a new sandboxed Rhai engine with all Headfloat host functions registered.
fn create_engine(ctx: SharedContext) -> Engine {
    let mut engine = Engine::new();

    // ── Sandbox limits ──
    engine.set_max_operations(5_000_000);
    engine.set_max_call_levels(64);
    engine.set_max_expr_depths(64, 64);
    engine.set_max_string_size(10_000);
    engine.set_max_array_size(10_000);
    engine.set_max_map_size(1_000);

    // ── Register APIs ──
    register_canvas_api(&mut engine, ctx.clone());
    register_pointer_api(&mut engine, ctx.clone());
    register_tracing_api(&mut engine, ctx.clone());
    register_composite_api(&mut engine, ctx.clone());
    register_glyph_api(&mut engine, ctx.clone());
    register_utility_api(&mut engine, ctx);

    engine
}

/// Register `name(x, y)` for both integer and float coordinates.
fn register_point_fn<R, F>(engine: &mut Engine, name: &str, ctx: &SharedContext, f: F)
where
    R: Clone + Send + Sync + 'static,
    F: Fn(&mut ScriptContext, Point) -> R + Clone + Send + Sync + 'static,
{
    let (c, g) = (ctx.clone(), f.clone());
    engine.register_fn(name, move |x: i64, y: i64| -> R {
        with_ctx(&c, |s| g(s, Point::new(x as f32, y as f32)))
    });
    let c = ctx.clone();
    engine.register_fn(name, move |x: f64, y: f64| -> R {
        with_ctx(&c, |s| f(s, Point::new(x as f32, y as f32)))
    });
}

/// Register `name(value)` for both integer and float values.
fn register_value_fn<F>(engine: &mut Engine, name: &str, ctx: &SharedContext, f: F)
where
    F: Fn(&mut ScriptContext, f32) -> bool + Clone + Send + Sync + 'static,
{
    let (c, g) = (ctx.clone(), f.clone());
    engine.register_fn(name, move |v: i64| -> bool { with_ctx(&c, |s| g(s, v as f32)) });
    let c = ctx.clone();
    engine.register_fn(name, move |v: f64| -> bool { with_ctx(&c, |s| f(s, v as f32)) });
}

/// Register `name(glyph_id, value)` for both integer and float values.
fn register_glyph_value_fn<F>(engine: &mut Engine, name: &str, ctx: &SharedContext, f: F)
where
    F: Fn(&mut ScriptContext, GlyphId, f32) -> bool + Clone + Send + Sync + 'static,
{
    let (c, g) = (ctx.clone(), f.clone());
    engine.register_fn(name, move |id: ImmutableString, v: i64| -> bool {
        parse_id(&id).is_some_and(|id| with_ctx(&c, |s| g(s, id, v as f32)))
    });
    let c = ctx.clone();
    engine.register_fn(name, move |id: ImmutableString, v: f64| -> bool {
        parse_id(&id).is_some_and(|id| with_ctx(&c, |s| f(s, id, v as f32)))
    });
}

fn parse_id(s: &str) -> Option<GlyphId> {
    s.parse().ok()
}

// ============================================================================
// Canvas info API
// ============================================================================

fn register_canvas_api(engine: &mut Engine, ctx: SharedContext) {
    // width()/height(): tracing canvas while tracing, composite target otherwise
    let c = ctx.clone();
    engine.register_fn("width", move || -> i64 {
        with_ctx(&c, |s| canvas_size(&s.project).0 as i64)
    });

    let c = ctx.clone();
    engine.register_fn("height", move || -> i64 {
        with_ctx(&c, |s| canvas_size(&s.project).1 as i64)
    });

    let c = ctx;
    engine.register_fn("stage", move || -> ImmutableString {
        with_ctx(&c, |s| match s.project.stage() {
            Stage::Empty => "empty",
            Stage::Tracing => "tracing",
            Stage::Composing => "composing",
        })
        .into()
    });
}

fn canvas_size(project: &Project) -> (u32, u32) {
    if let Some(ed) = project.editor() {
        ed.canvas_size()
    } else if let Some(stage) = project.composite() {
        stage.size()
    } else {
        (0, 0)
    }
}

// ============================================================================
// Pointer API: routed to whichever stage is active
// ============================================================================

fn register_pointer_api(engine: &mut Engine, ctx: SharedContext) {
    // click(x, y): tracing: add point / deselect; composing: select glyph
    register_point_fn(engine, "click", &ctx, |s, p| {
        if let Some(ed) = s.project.editor_mut() {
            matches!(ed.click(p), ClickOutcome::PointAdded(_))
        } else if let Some(stage) = s.project.composite_mut() {
            stage.click(p).is_some()
        } else {
            false
        }
    });

    register_point_fn(engine, "press", &ctx, |s, p| {
        if let Some(ed) = s.project.editor_mut() {
            ed.begin_drag(p)
        } else if let Some(stage) = s.project.composite_mut() {
            stage.begin_drag(p)
        } else {
            false
        }
    });

    register_point_fn(engine, "drag_to", &ctx, |s, p| {
        if let Some(ed) = s.project.editor_mut() {
            ed.update_drag(p)
        } else if let Some(stage) = s.project.composite_mut() {
            stage.update_drag(p)
        } else {
            false
        }
    });

    let c = ctx.clone();
    engine.register_fn("release", move || {
        with_ctx(&c, |s| {
            if let Some(ed) = s.project.editor_mut() {
                ed.end_drag();
            } else if let Some(stage) = s.project.composite_mut() {
                stage.end_drag();
            }
        })
    });

    // hover(x, y) -> hovered point index or -1
    register_point_fn(engine, "hover", &ctx, |s, p| -> i64 {
        s.project
            .editor_mut()
            .and_then(|ed| ed.update_hover(p))
            .map_or(-1, |i| i as i64)
    });
}

// ============================================================================
// Tracing API
// ============================================================================

fn register_tracing_api(engine: &mut Engine, ctx: SharedContext) {
    register_point_fn(engine, "add_point", &ctx, |s, p| {
        s.project
            .editor_mut()
            .is_some_and(|ed| matches!(ed.click(p), ClickOutcome::PointAdded(_)))
    });

    let c = ctx.clone();
    engine.register_fn("undo_point", move || -> bool {
        with_ctx(&c, |s| s.project.editor_mut().and_then(|ed| ed.undo_last_point()).is_some())
    });

    let c = ctx.clone();
    engine.register_fn("remove_point", move || -> bool {
        with_ctx(&c, |s| s.project.editor_mut().and_then(|ed| ed.remove_selected_point()).is_some())
    });

    let c = ctx.clone();
    engine.register_fn("point_count", move || -> i64 {
        with_ctx(&c, |s| s.project.editor().map_or(0, |ed| ed.points().len() as i64))
    });

    let c = ctx.clone();
    engine.register_fn("selected_point", move || -> i64 {
        with_ctx(&c, |s| s.project.editor().and_then(|ed| ed.selected()).map_or(-1, |i| i as i64))
    });

    register_value_fn(engine, "set_zoom", &ctx, |s, z| {
        s.project.editor_mut().map(|ed| ed.set_zoom(z)).is_some()
    });

    // cut() -> "composed" | "empty" | "insufficient" | "not_tracing"
    let c = ctx.clone();
    engine.register_fn("cut", move || -> ImmutableString {
        with_ctx(&c, |s| match s.project.cut() {
            Ok(CutOutcome::Composed { .. }) => "composed",
            Ok(CutOutcome::Empty) => "empty",
            Ok(CutOutcome::NotTracing) => "not_tracing",
            Err(_) => "insufficient",
        })
        .into()
    });

    let c = ctx.clone();
    engine.register_fn("adjust_tracing", move || -> bool {
        with_ctx(&c, |s| s.project.adjust_tracing())
    });

    let c = ctx.clone();
    engine.register_fn("cancel_tracing", move || {
        with_ctx(&c, |s| s.project.cancel_tracing())
    });

    let c = ctx;
    engine.register_fn("reset", move || with_ctx(&c, |s| s.project.reset()));
}

// ============================================================================
// Composite adjustment API
// ============================================================================

fn register_composite_api(engine: &mut Engine, ctx: SharedContext) {
    register_value_fn(engine, "set_scale", &ctx, |s, v| {
        s.project.composite_mut().is_some_and(|st| st.set_scale(v))
    });
    register_value_fn(engine, "set_rotation", &ctx, |s, v| {
        s.project.composite_mut().is_some_and(|st| st.set_rotation(v))
    });
    register_value_fn(engine, "set_brightness", &ctx, |s, v| {
        s.project.composite_mut().is_some_and(|st| st.set_brightness(v))
    });

    let c = ctx.clone();
    engine.register_fn("reset_rotation", move || -> bool {
        with_ctx(&c, |s| s.project.composite_mut().map(|st| st.reset_rotation()).is_some())
    });

    // set_background("#rrggbb"): false on a bad colour or outside composing
    let c = ctx;
    engine.register_fn("set_background", move |hex: ImmutableString| -> bool {
        let Ok(color) = parse_hex_color(&hex) else { return false };
        with_ctx(&c, |s| s.project.composite_mut().map(|st| st.set_background(color)).is_some())
    });
}

// ============================================================================
// Overlay glyph API
// ============================================================================

fn register_glyph_api(engine: &mut Engine, ctx: SharedContext) {
    // add_glyph(symbol) -> id string, "" when not composing
    let c = ctx.clone();
    engine.register_fn("add_glyph", move |symbol: ImmutableString| -> ImmutableString {
        with_ctx(&c, |s| {
            s.project
                .composite_mut()
                .map(|st| st.add_glyph(&symbol).to_string())
                .unwrap_or_default()
        })
        .into()
    });

    let c = ctx.clone();
    engine.register_fn("remove_glyph", move |id: ImmutableString| -> bool {
        let Some(id) = parse_id(&id) else { return false };
        with_ctx(&c, |s| s.project.composite_mut().is_some_and(|st| st.remove_glyph(id)))
    });

    let c = ctx.clone();
    engine.register_fn("remove_selected_glyph", move || -> bool {
        with_ctx(&c, |s| s.project.composite_mut().is_some_and(|st| st.remove_selected_glyph()))
    });

    let c = ctx.clone();
    engine.register_fn("select_glyph", move |id: ImmutableString| -> bool {
        with_ctx(&c, |s| {
            let Some(st) = s.project.composite_mut() else { return false };
            st.select_glyph(parse_id(&id));
            st.selected_glyph().is_some()
        })
    });

    let c = ctx.clone();
    engine.register_fn("selected_glyph", move || -> ImmutableString {
        with_ctx(&c, |s| {
            s.project
                .composite()
                .and_then(|st| st.selected_glyph())
                .map(|id| id.to_string())
                .unwrap_or_default()
        })
        .into()
    });

    let c = ctx.clone();
    engine.register_fn("glyph_count", move || -> i64 {
        with_ctx(&c, |s| s.project.composite().map_or(0, |st| st.glyphs().len() as i64))
    });

    register_glyph_value_fn(engine, "glyph_scale", &ctx, |s, id, v| {
        s.project.composite_mut().is_some_and(|st| st.set_glyph_scale(id, v))
    });
    register_glyph_value_fn(engine, "glyph_rotation", &ctx, |s, id, v| {
        s.project.composite_mut().is_some_and(|st| st.set_glyph_rotation(id, v))
    });

    let c = ctx.clone();
    engine.register_fn("move_glyph", move |id: ImmutableString, x: i64, y: i64| -> bool {
        let Some(id) = parse_id(&id) else { return false };
        with_ctx(&c, |s| s.project.composite_mut().is_some_and(|st| st.move_glyph(id, x as f32, y as f32)))
    });
    let c = ctx.clone();
    engine.register_fn("move_glyph", move |id: ImmutableString, x: f64, y: f64| -> bool {
        let Some(id) = parse_id(&id) else { return false };
        with_ctx(&c, |s| s.project.composite_mut().is_some_and(|st| st.move_glyph(id, x as f32, y as f32)))
    });

    // glyph_x(id)/glyph_y(id): position, or -1.0 for an unknown id
    let c = ctx.clone();
    engine.register_fn("glyph_x", move |id: ImmutableString| -> f64 {
        glyph_field(&c, &id, |g| g.x)
    });
    let c = ctx;
    engine.register_fn("glyph_y", move |id: ImmutableString| -> f64 {
        glyph_field(&c, &id, |g| g.y)
    });
}

fn glyph_field(
    ctx: &SharedContext,
    id: &str,
    field: impl FnOnce(&crate::components::glyphs::OverlayGlyph) -> f32,
) -> f64 {
    let Some(id) = parse_id(id) else { return -1.0 };
    with_ctx(ctx, |s| {
        s.project
            .composite()
            .and_then(|st| st.glyph(id))
            .map_or(-1.0, |g| field(g) as f64)
    })
}

// ============================================================================
// Utility API
// ============================================================================

fn register_utility_api(engine: &mut Engine, ctx: SharedContext) {
    // print_line(msg): output to script console
    let c = ctx.clone();
    engine.register_fn("print_line", move |msg: ImmutableString| {
        with_ctx(&c, |s| s.console_output.push(msg.to_string()));
    });
    // Also override built-in print
    let c = ctx;
    engine.on_print(move |msg| {
        with_ctx(&c, |s| s.console_output.push(msg.to_string()));
    });
}

// ============================================================================
// Public execution API
// ============================================================================

/// Compile a script and return the AST, or a ScriptError.
pub fn compile_script(source: &str) -> Result<AST, ScriptError> {
    // Use a temp engine just for compilation (no context needed)
    let engine = Engine::new();
    engine
        .compile(source)
        .map_err(|e| ScriptError::at(e.to_string(), e.position()))
}

/// Execute a script synchronously against `project`.
///
/// The project is updated in place even when the script fails part-way.
/// Returns the console output.
pub fn execute_script_sync(source: &str, project: &mut Project) -> Result<Vec<String>, ScriptError> {
    let ctx = Arc::new(Mutex::new(ScriptContext {
        project: std::mem::take(project),
        console_output: Vec::new(),
    }));

    let result = {
        let engine = create_engine(ctx.clone());
        let mut scope = Scope::new();
        engine
            .compile(source)
            .map_err(|e| ScriptError::at(e.to_string(), e.position()))
            .and_then(|ast| {
                engine
                    .run_ast_with_scope(&mut scope, &ast)
                    .map_err(|e| ScriptError::at(e.to_string(), e.position()))
            })
    };

    let mut lock = ctx.lock().unwrap_or_else(|e| e.into_inner());
    *project = std::mem::take(&mut lock.project);
    for line in &lock.console_output {
        crate::log_info!("[script] {}", line);
    }
    result.map(|_| std::mem::take(&mut lock.console_output))
}
