// ============================================================================
// Headfloat CLI: headless trace/cut/compose via command-line arguments
// ============================================================================
//
// Usage examples:
//   headfloat -i photo.jpg --points "120,80 300,70 320,260 110,280"
//   headfloat -i photo.jpg --script crown.rhai -o result.png
//   headfloat -i shots/*.jpg --points "0,0 200,0 200,200 0,200" --output-dir out/
//   headfloat -i photo.png --script edit.rhai --settings my_settings.cfg -v
//
// Points are in tracing-canvas pixels, i.e. after the source has been fitted
// to `max_canvas_side`. They are placed before the script runs; if the
// project is still tracing afterwards it is cut automatically.

#[cfg(test)]
#[path = "cli_test.rs"]
mod cli_test;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::canvas::Point;
use crate::io::export_path;
use crate::ops::scripting::{compile_script, execute_script_sync};
use crate::ops::text::rasterizer_from_settings;
use crate::project::{CutOutcome, Project, Stage};
use crate::settings::AppSettings;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Headfloat headless cutout compositor.
///
/// Trace a polygon over each input, cut it out and export the composite.
#[derive(Parser, Debug)]
#[command(
    name = "headfloat",
    about = "Cut a polygon out of a photo and compose it with emoji overlays",
    long_about = "Trace a polygon over each input image, cut the enclosed region out,\n\
                  compose it over a background with optional emoji overlays and\n\
                  export the result as PNG.\n\n\
                  Example:\n  \
                  headfloat -i photo.jpg --points \"120,80 300,70 320,260 110,280\"\n  \
                  headfloat -i *.jpg --script crown.rhai --output-dir out/"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Polygon vertices as space-separated "x,y" pairs in tracing-canvas pixels.
    #[arg(short, long, value_name = "\"X,Y X,Y ...\"")]
    pub points: Option<String>,

    /// Rhai script run against each project after the points are placed.
    #[arg(short, long, value_name = "SCRIPT.rhai")]
    pub script: Option<PathBuf>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Settings file to use instead of the per-user one.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Print script console output and per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = every input exported, `1` = one or more failed.
pub fn run(args: CliArgs) -> ExitCode {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    if args.points.is_none() && args.script.is_none() {
        eprintln!("error: nothing to cut. Pass --points, --script, or both.");
        return ExitCode::FAILURE;
    }

    let points = match args.points.as_deref().map(parse_points).transpose() {
        Ok(p) => p.unwrap_or_default(),
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Load and pre-compile the script so a syntax error fails before any work.
    let script_source: Option<String> = match &args.script {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(src) => {
                if let Err(e) = compile_script(&src) {
                    eprintln!("error: script '{}':\n{}", path.display(), e.friendly_message());
                    return ExitCode::FAILURE;
                }
                Some(src)
            }
            Err(e) => {
                eprintln!("error: could not read script '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let settings = match &args.settings {
        Some(path) => AppSettings::load_from(path),
        None => AppSettings::load(),
    };
    let rasterizer = rasterizer_from_settings(&settings);

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("error: could not create output directory '{}': {}", dir.display(), e);
        return ExitCode::FAILURE;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let Some(output_path) =
            build_output_path(input_path, args.output.as_deref(), args.output_dir.as_deref(), multi)
        else {
            eprintln!("  error: cannot determine output path for '{}'.", input_path.display());
            any_failure = true;
            continue;
        };

        let mut project = Project::with_rasterizer(settings.clone(), rasterizer.clone());
        match run_one(&mut project, input_path, &output_path, &points, script_source.as_deref(), args.verbose) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                crate::log_err!("CLI: {} failed: {}", input_path.display(), e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

fn run_one(
    project: &mut Project,
    input: &Path,
    output: &Path,
    points: &[Point],
    script: Option<&str>,
    verbose: bool,
) -> Result<(), String> {
    // -- Step 1: Load ----------------------------------------------------
    project.open_path(input).map_err(|e| format!("load failed: {}", e))?;

    // -- Step 2: Trace ---------------------------------------------------
    if let Some(editor) = project.editor_mut() {
        for &p in points {
            editor.click(p);
        }
    }

    // -- Step 3: Script (optional) ---------------------------------------
    if let Some(src) = script {
        let console = execute_script_sync(src, project)
            .map_err(|e| format!("script error:\n{}", e.friendly_message()))?;
        if verbose {
            for line in &console {
                println!("  [script] {}", line);
            }
        }
    }

    // -- Step 4: Cut if the script left the project tracing --------------
    if project.stage() == Stage::Tracing {
        match project.cut() {
            Ok(CutOutcome::Composed { .. }) => {}
            Ok(_) => return Err("the polygon encloses no pixels".to_string()),
            Err(e) => return Err(format!("cut failed: {}", e)),
        }
    }

    // -- Step 5: Export --------------------------------------------------
    match project.export_to(output) {
        Ok(true) => Ok(()),
        Ok(false) => Err("nothing to export (no cutout was composed)".to_string()),
        Err(e) => Err(format!("save failed: {}", e)),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse `"x,y x,y ..."` into points. Pairs may also be separated by `;`.
fn parse_points(s: &str) -> Result<Vec<Point>, String> {
    s.split(|c: char| c.is_whitespace() || c == ';')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| format!("point '{}' is not of the form x,y", pair))?;
            let coord = |v: &str| {
                v.trim()
                    .parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| format!("invalid coordinate '{}' in point '{}'", v, pair))
            };
            Ok(Point::new(coord(x)?, coord(y)?))
        })
        .collect()
}

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir`: `headfloat.png`, or `<stem>_headfloat.png` in batch mode
/// 3. Fallback: `<stem>_headfloat.png` next to the input
fn build_output_path(input: &Path, output: Option<&Path>, output_dir: Option<&Path>, batch: bool) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(export_path(dir, batch.then_some(stem.as_str())));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    Some(export_path(parent, Some(&stem)))
}
