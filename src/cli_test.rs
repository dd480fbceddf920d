use super::*;
use crate::canvas::PixelBuffer;
use crate::io::{load_source, save_png};
use image::Rgba;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("headfloat-cli-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn args(input: &Path) -> CliArgs {
    CliArgs::parse_from([
        "headfloat",
        "-i",
        input.to_str().unwrap(),
        "--settings",
        "/definitely/not/a/settings.cfg",
    ])
}

// ============================================================================
// Point parsing
// ============================================================================

#[test]
fn points_parse_with_spaces_or_semicolons() {
    let pts = parse_points(" 1,2  3.5,4;5,-6 ").unwrap();
    assert_eq!(pts, vec![Point::new(1.0, 2.0), Point::new(3.5, 4.0), Point::new(5.0, -6.0)]);
    assert!(parse_points("").unwrap().is_empty());
}

#[test]
fn malformed_points_are_rejected() {
    assert!(parse_points("1,2 3").is_err());
    assert!(parse_points("1,x").is_err());
    assert!(parse_points("1,inf").is_err());
}

// ============================================================================
// Output paths
// ============================================================================

#[test]
fn output_path_priority() {
    let input = Path::new("/photos/me.jpg");
    assert_eq!(
        build_output_path(input, Some(Path::new("/tmp/x.png")), Some(Path::new("/out")), false),
        Some(PathBuf::from("/tmp/x.png"))
    );
    assert_eq!(
        build_output_path(input, None, Some(Path::new("/out")), false),
        Some(PathBuf::from("/out/headfloat.png"))
    );
    assert_eq!(
        build_output_path(input, None, Some(Path::new("/out")), true),
        Some(PathBuf::from("/out/me_headfloat.png"))
    );
    assert_eq!(build_output_path(input, None, None, false), Some(PathBuf::from("/photos/me_headfloat.png")));
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn points_only_run_exports_composite() {
    let dir = temp_dir("points");
    let input = dir.join("photo.png");
    save_png(&PixelBuffer::from_pixel(200, 100, Rgba([30, 60, 90, 255])), &input).unwrap();

    let mut a = args(&input);
    a.points = Some("20,20 80,20 80,80 20,80".to_string());
    assert_eq!(run(a), ExitCode::SUCCESS);

    let out = load_source(&dir.join("photo_headfloat.png")).unwrap();
    assert_eq!(out.dimensions(), (500, 500));
    assert_eq!(*out.get_pixel(250, 250), Rgba([30, 60, 90, 255]));
    assert_eq!(*out.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn script_can_cut_and_adjust() {
    let dir = temp_dir("script");
    let input = dir.join("photo.png");
    save_png(&PixelBuffer::from_pixel(200, 100, Rgba([30, 60, 90, 255])), &input).unwrap();
    let script = dir.join("edit.rhai");
    std::fs::write(&script, "cut(); set_background(\"#000\");").unwrap();

    let mut a = args(&input);
    a.points = Some("20,20 80,20 80,80 20,80".to_string());
    a.script = Some(script);
    a.output = Some(dir.join("result.png"));
    assert_eq!(run(a), ExitCode::SUCCESS);

    let out = load_source(&dir.join("result.png")).unwrap();
    assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn degenerate_polygon_fails() {
    let dir = temp_dir("fail");
    let input = dir.join("photo.png");
    save_png(&PixelBuffer::from_pixel(50, 50, Rgba([1, 2, 3, 255])), &input).unwrap();

    let mut a = args(&input);
    a.points = Some("1,1 2,2".to_string());
    assert_eq!(run(a), ExitCode::FAILURE);
    assert!(!dir.join("photo_headfloat.png").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_inputs_fail() {
    let a = args(Path::new("/definitely/not/here/*.png"));
    assert_eq!(run(a), ExitCode::FAILURE);
}
