use super::*;

#[test]
fn new_target_is_cleared_to_far_depth() {
    let t = RenderTarget::new(TargetDesc::color_depth("t"), Size2::new(4, 3));
    assert_eq!(t.color().len(), 4 * 3 * 4);
    assert!(t.depth().unwrap().iter().all(|&d| d == FAR_DEPTH));
    assert_eq!(t.allocations(), 1);
    assert_eq!(t.filter(), TextureFilter::Nearest);
}

#[test]
fn identical_resize_is_a_noop() {
    let mut t = RenderTarget::new(TargetDesc::color_depth("t"), Size2::new(8, 8));
    let id = t.id();
    assert!(!t.set_size(Size2::new(8, 8)));
    assert_eq!(t.allocations(), 1);
    assert!(t.set_size(Size2::new(16, 4)));
    assert_eq!(t.allocations(), 2);
    assert_eq!(t.id(), id);
    assert_eq!(t.color().len(), 16 * 4 * 4);
}

#[test]
fn resize_discards_contents() {
    let mut t = RenderTarget::new(TargetDesc::color_depth("t"), Size2::new(2, 2));
    t.write(1, 1, [9, 9, 9, 255], 0.25);
    t.set_size(Size2::new(3, 3));
    assert_eq!(t.pixel(1, 1), [0, 0, 0, 0]);
    assert_eq!(t.depth_at(1, 1), FAR_DEPTH);
}

#[test]
fn unorm16_depth_is_quantized() {
    let mut t = RenderTarget::new(TargetDesc::color_depth("t"), Size2::new(1, 1));
    t.write(0, 0, [1, 2, 3, 4], 0.123_456_7);
    let d = t.depth_at(0, 0);
    assert_eq!(d, (0.123_456_7f32 * 65535.0).round() / 65535.0);
    assert_eq!(t.pixel(0, 0), [1, 2, 3, 4]);
}

#[test]
fn color_only_targets_report_far_depth() {
    let mut t = RenderTarget::new(TargetDesc::color_only("screen"), Size2::new(2, 1));
    t.write(0, 0, [5, 5, 5, 255], 0.1);
    assert_eq!(t.depth_at(0, 0), FAR_DEPTH);
    assert!(t.depth().is_none());
}
