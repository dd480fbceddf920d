// ============================================================================
// APPLICATION SETTINGS: persisted as a plain key=value file
// ============================================================================

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use image::Rgba;
use std::path::{Path, PathBuf};

use crate::canvas::{color_to_hex, parse_hex_color, WHITE};

#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Longest side of the tracing canvas; larger sources are scaled down.
    pub max_canvas_side: u32,
    pub composite_width: u32,
    pub composite_height: u32,
    /// Initial background colour of a new composite.
    pub background: Rgba<u8>,
    /// Font file used for overlay glyphs; empty means "look up the family".
    pub glyph_font_path: String,
    pub glyph_font_family: String,
    pub editor_zoom_max: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            max_canvas_side: 640,
            composite_width: 500,
            composite_height: 500,
            background: WHITE,
            glyph_font_path: String::new(),
            glyph_font_family: "Noto Color Emoji".to_string(),
            editor_zoom_max: 3.0,
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/headfloat/headfloat_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\Headfloat\headfloat_settings.cfg
    /// On macOS:   ~/Library/Application Support/Headfloat/headfloat_settings.cfg
    /// Fallback:   same directory as the executable.
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("headfloat");
            return Some(config_dir.join("headfloat_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").or_else(|_| std::env::var("USERPROFILE")).ok()?;
            return Some(PathBuf::from(appdata).join("Headfloat").join("headfloat_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("Headfloat")
                    .join("headfloat_settings.cfg"),
            );
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe().ok().and_then(|p| p.parent().map(|d| d.join("headfloat_settings.cfg")))
        }
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "max_canvas_side={}\n\
             composite_width={}\n\
             composite_height={}\n\
             background={}\n\
             glyph_font_path={}\n\
             glyph_font_family={}\n\
             editor_zoom_max={}\n",
            self.max_canvas_side,
            self.composite_width,
            self.composite_height,
            color_to_hex(self.background),
            self.glyph_font_path,
            self.glyph_font_family,
            self.editor_zoom_max,
        )
    }

    /// Parse settings text. Unknown keys are ignored, malformed values keep
    /// their defaults.
    pub fn from_config_str(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "max_canvas_side" => {
                    s.max_canvas_side = val.parse().ok().filter(|v| *v > 0).unwrap_or(s.max_canvas_side);
                }
                "composite_width" => {
                    s.composite_width = val.parse().ok().filter(|v| *v > 0).unwrap_or(s.composite_width);
                }
                "composite_height" => {
                    s.composite_height = val.parse().ok().filter(|v| *v > 0).unwrap_or(s.composite_height);
                }
                "background" => {
                    if let Ok(c) = parse_hex_color(val) {
                        s.background = c;
                    }
                }
                "glyph_font_path" => {
                    s.glyph_font_path = val.to_string();
                }
                "glyph_font_family" => {
                    s.glyph_font_family = val.to_string();
                }
                "editor_zoom_max" => {
                    s.editor_zoom_max = val
                        .parse::<f32>()
                        .ok()
                        .filter(|v| v.is_finite() && *v >= 1.0)
                        .unwrap_or(s.editor_zoom_max);
                }
                _ => {}
            }
        }
        s
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_config_str(&content),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = self.save_to(&path) {
            crate::log_warn!("Could not save settings to {}: {}", path.display(), e);
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_config_string())
    }
}
