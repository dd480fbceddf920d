use super::*;

#[test]
fn defaults_match_the_documented_values() {
    let s = AppSettings::default();
    assert_eq!(s.max_canvas_side, 640);
    assert_eq!((s.composite_width, s.composite_height), (500, 500));
    assert_eq!(s.background, WHITE);
    assert_eq!(s.editor_zoom_max, 3.0);
}

#[test]
fn config_text_round_trips() {
    let s = AppSettings {
        max_canvas_side: 800,
        composite_width: 320,
        composite_height: 240,
        background: Rgba([0x12, 0x34, 0x56, 0x80]),
        glyph_font_path: "/usr/share/fonts/emoji.ttf".to_string(),
        glyph_font_family: "Twemoji".to_string(),
        editor_zoom_max: 4.5,
    };
    assert_eq!(AppSettings::from_config_str(&s.to_config_string()), s);
}

#[test]
fn malformed_values_keep_defaults() {
    let s = AppSettings::from_config_str(
        "max_canvas_side=zero\n\
         composite_width=0\n\
         background=blue\n\
         editor_zoom_max=0.5\n\
         no_equals_sign\n\
         unknown_key=1\n",
    );
    assert_eq!(s, AppSettings::default());
}

#[test]
fn comments_and_whitespace_are_tolerated() {
    let s = AppSettings::from_config_str("# headfloat\n  composite_width = 640 \n\nbackground=#000\n");
    assert_eq!(s.composite_width, 640);
    assert_eq!(s.background, Rgba([0, 0, 0, 255]));
}

#[test]
fn missing_file_loads_defaults() {
    let s = AppSettings::load_from(Path::new("/definitely/not/here/headfloat_settings.cfg"));
    assert_eq!(s, AppSettings::default());
}

#[test]
fn save_then_load_from_file() {
    let dir = std::env::temp_dir().join(format!("headfloat-settings-{}", std::process::id()));
    let path = dir.join("headfloat_settings.cfg");
    let s = AppSettings { composite_width: 777, ..AppSettings::default() };
    s.save_to(&path).unwrap();
    assert_eq!(AppSettings::load_from(&path), s);
    let _ = std::fs::remove_dir_all(&dir);
}
