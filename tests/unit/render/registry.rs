use super::*;
use crate::render::target::TextureFilter;

fn registry() -> RenderTargetRegistry {
    RenderTargetRegistry::new(Size2::new(1920, 1080), None)
}

#[test]
fn resize_sizes_all_three_targets() {
    let mut r = registry();
    r.resize(Size2::new(800, 600));
    assert_eq!(r.local().size(), Size2::new(800, 600));
    assert_eq!(r.remote().size(), Size2::new(800, 600));
    assert_eq!(r.scratch().size(), Size2::new(800, 600));
}

#[test]
fn identical_resize_keeps_identity_and_allocations() {
    let mut r = registry();
    assert!(r.resize(Size2::new(640, 480)));
    let ids = r.ids();
    let allocs = r.allocations();

    assert!(!r.resize(Size2::new(640, 480)));
    assert_eq!(r.ids(), ids);
    assert_eq!(r.allocations(), allocs);
    assert_eq!(r.local().filter(), TextureFilter::Nearest);
    assert_eq!(r.remote().filter(), TextureFilter::Nearest);
}

#[test]
fn zero_sized_resize_clamps_to_one_pixel() {
    let mut r = registry();
    r.resize(Size2::new(0, 0));
    assert_eq!(r.local().size(), Size2::new(1, 1));
}

#[test]
fn downscale_only_touches_remote_target() {
    let mut r = registry();
    r.resize(Size2::new(1000, 500));
    let size = r.decrease_resolution(4.0);
    assert_eq!(size, Size2::new(480, 270));
    assert_eq!(r.remote().size(), Size2::new(480, 270));
    assert_eq!(r.local().size(), Size2::new(1000, 500));

    r.resize(Size2::new(1200, 600));
    assert_eq!(r.remote().size(), Size2::new(480, 270));
    assert_eq!(r.scratch().size(), Size2::new(1200, 600));

    r.track_native_remote();
    assert_eq!(r.remote().size(), Size2::new(1200, 600));
}

#[test]
fn downscale_factor_is_clamped() {
    let mut r = registry();
    assert_eq!(r.decrease_resolution(100.0), Size2::new(120, 67));
    assert_eq!(r.decrease_resolution(0.0), Size2::new(1920, 1080));
    assert_eq!(r.remote_divisor(), Some(1.0));
}
