use super::*;

#[test]
fn size_clamps_to_one_pixel() {
    assert_eq!(Size2::new(0, 0), Size2::new(1, 1));
    assert_eq!(Size2::new(0, 7).height, 7);
    assert_eq!(Size2::from_device_px(-3.0, f64::NAN), Size2::new(1, 1));
}

#[test]
fn device_px_floors_fractional_sizes() {
    let s = Size2::from_device_px(800.0 * 1.5, 600.75);
    assert_eq!(s, Size2::new(1200, 600));
    assert_eq!(s.to_string(), "1200x600");
}

#[test]
fn target_ids_are_unique() {
    let a = TargetId::next();
    let b = TargetId::next();
    assert_ne!(a, b);
}

#[test]
fn premul_conversion_matches_expected_rounding() {
    let p = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(p.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8Premul::opaque_hex(0xF06565).to_array(), [0xF0, 0x65, 0x65, 255]);
}
