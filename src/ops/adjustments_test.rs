use super::*;

#[test]
fn neutral_brightness_is_identity() {
    let f = brightness(NEUTRAL_BRIGHTNESS);
    assert_eq!(f(10.0, 128.0, 255.0, 77.0), (10.0, 128.0, 255.0, 77.0));
}

#[test]
fn brightness_scales_rgb_only() {
    let f = brightness(50.0);
    assert_eq!(f(200.0, 100.0, 40.0, 255.0), (100.0, 50.0, 20.0, 255.0));
    let f = brightness(0.0);
    assert_eq!(f(200.0, 100.0, 40.0, 90.0), (0.0, 0.0, 0.0, 90.0));
}

#[test]
fn negative_brightness_acts_as_zero() {
    let f = brightness(-30.0);
    assert_eq!(f(200.0, 100.0, 40.0, 255.0), (0.0, 0.0, 0.0, 255.0));
}
