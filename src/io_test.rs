use super::*;
use image::Rgba;

fn sample() -> PixelBuffer {
    PixelBuffer::from_fn(7, 5, |x, y| Rgba([x as u8 * 30, y as u8 * 40, 99, if x == 0 { 0 } else { 255 }]))
}

#[test]
fn png_bytes_decode_back_losslessly() {
    let img = sample();
    let bytes = encode_png(&img).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(decode_source(&bytes).unwrap(), img);
}

#[test]
fn empty_raster_is_not_encoded() {
    assert!(matches!(encode_png(&PixelBuffer::new(0, 0)), Err(IoError::EmptyImage)));
}

#[test]
fn garbage_bytes_fail_to_decode() {
    assert!(matches!(decode_source(b"definitely not an image"), Err(IoError::Decode(_))));
}

#[test]
fn missing_file_is_io_error() {
    let err = load_source(Path::new("/definitely/not/here.png")).unwrap_err();
    assert!(matches!(err, IoError::Io(_)), "{err}");
}

#[test]
fn save_then_load_file() {
    let dir = std::env::temp_dir().join(format!("headfloat-io-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = export_path(&dir, None);
    assert!(path.ends_with(EXPORT_FILE_NAME));
    save_png(&sample(), &path).unwrap();
    assert_eq!(load_source(&path).unwrap(), sample());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn export_path_prefixes_input_stem() {
    let p = export_path(Path::new("/out"), Some("photo"));
    assert_eq!(p, Path::new("/out/photo_headfloat.png"));
    assert_eq!(export_path(Path::new("/out"), Some("")), Path::new("/out/headfloat.png"));
}
