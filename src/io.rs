// ============================================================================
// IO: source image decoding and PNG export
// ============================================================================

#[cfg(test)]
#[path = "io_test.rs"]
mod io_test;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::canvas::PixelBuffer;

/// File name used when exporting into a directory.
pub const EXPORT_FILE_NAME: &str = "headfloat.png";

/// Error type for loading sources and exporting composites
#[derive(Debug)]
pub enum IoError {
    Io(std::io::Error),
    Decode(String),
    Encode(String),
    /// Decoded fine but has no pixels.
    EmptyImage,
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::Io(e) => write!(f, "I/O error: {}", e),
            IoError::Decode(e) => write!(f, "Decode error: {}", e),
            IoError::Encode(e) => write!(f, "Encode error: {}", e),
            IoError::EmptyImage => write!(f, "Image has no pixels"),
        }
    }
}

impl std::error::Error for IoError {}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Io(e)
    }
}

impl From<ImageError> for IoError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::IoError(e) => IoError::Io(e),
            ImageError::Encoding(e) => IoError::Encode(e.to_string()),
            other => IoError::Decode(other.to_string()),
        }
    }
}

/// Decode any raster format the `image` crate understands to RGBA8.
pub fn load_source(path: &Path) -> Result<PixelBuffer, IoError> {
    let img = image::open(path)?.to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        return Err(IoError::EmptyImage);
    }
    Ok(img)
}

/// Decode an in-memory image (e.g. an upload) to RGBA8.
pub fn decode_source(bytes: &[u8]) -> Result<PixelBuffer, IoError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        return Err(IoError::EmptyImage);
    }
    Ok(img)
}

/// Encode a raster as PNG into any writer.
pub fn write_png<W: Write>(image: &PixelBuffer, writer: W) -> Result<(), IoError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(IoError::EmptyImage);
    }
    PngEncoder::new(writer).write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)?;
    Ok(())
}

/// PNG bytes of `image`.
pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>, IoError> {
    let mut bytes = Vec::new();
    write_png(image, &mut bytes)?;
    Ok(bytes)
}

/// Write `image` as PNG to `path`.
pub fn save_png(image: &PixelBuffer, path: &Path) -> Result<(), IoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_png(image, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// `dir/headfloat.png`, or `dir/<stem>_headfloat.png` when several inputs
/// share one output directory.
pub fn export_path(dir: &Path, input_stem: Option<&str>) -> PathBuf {
    match input_stem {
        Some(stem) if !stem.is_empty() => dir.join(format!("{}_{}", stem, EXPORT_FILE_NAME)),
        _ => dir.join(EXPORT_FILE_NAME),
    }
}
