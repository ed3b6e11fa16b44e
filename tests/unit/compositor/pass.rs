use super::*;
use crate::camera::Camera;
use crate::config::CompositorConfig;
use crate::foundation::core::Mat4;
use crate::render::registry::RenderTargetRegistry;
use crate::render::target::TargetDesc;

const GRAY: [u8; 4] = [90, 90, 90, 255];
const EDGE: [u8; 4] = [0, 200, 0, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

fn target(label: &'static str, w: u32, h: u32) -> RenderTarget {
    RenderTarget::new(TargetDesc::color_depth(label), Size2::new(w, h))
}

fn fill(t: &mut RenderTarget, f: impl Fn(u32, u32) -> [u8; 4]) {
    for y in 0..t.height() {
        for x in 0..t.width() {
            t.write(x, y, f(x, y), 0.99);
        }
    }
}

fn yawed(deg: f32) -> CameraMats {
    Camera::perspective(60.0, 1.0, 0.1, 100.0)
        .with_world(Mat4::from_rotation_y(deg.to_radians()))
        .snapshot()
}

fn pass_with(cfg: CompositorConfig, size: Size2) -> CompositorPass {
    let mut pass = CompositorPass::new(&cfg);
    pass.set_size(size);
    pass
}

fn compose(pass: &CompositorPass, local: &RenderTarget, remote: &RenderTarget) -> RenderTarget {
    let mut scratch = target("scratch", local.width(), local.height());
    let mut dest = RenderTarget::new(TargetDesc::color_only("dest"), local.size());
    pass.reproject_remote(remote, &mut scratch).unwrap();
    pass.present(local, &scratch, &mut dest).unwrap();
    dest
}

#[test]
fn direct_merge_uses_local_depth_as_cutout() {
    let cfg = CompositorConfig {
        do_async_time_warp: false,
        ..CompositorConfig::default()
    };
    let pass = pass_with(cfg, Size2::new(4, 2));
    let mut remote = target("remote", 4, 2);
    fill(&mut remote, |_, _| GRAY);
    let mut local = target("local", 4, 2);
    local.write(1, 0, RED, 0.5);

    let dest = compose(&pass, &local, &remote);
    assert_eq!(dest.pixel(1, 0), RED);
    assert_eq!(dest.pixel(0, 0), GRAY);
    assert_eq!(dest.pixel(3, 1), GRAY);
}

#[test]
fn identical_poses_reproduce_the_remote_frame() {
    let pass_cfg = CompositorConfig::default();
    let mut pass = pass_with(pass_cfg, Size2::new(16, 8));
    let m = Camera::perspective(60.0, 2.0, 0.1, 100.0).snapshot();
    pass.set_camera_mats(m, None);
    pass.set_camera_mats_remote(m, None);

    let mut remote = target("remote", 16, 8);
    fill(&mut remote, |x, y| [x as u8 * 10, y as u8 * 20, 7, 255]);
    let local = target("local", 16, 8);

    let dest = compose(&pass, &local, &remote);
    for y in 0..8 {
        for x in 0..16 {
            assert_eq!(dest.pixel(x, y), remote.pixel(x, y), "pixel {x},{y}");
        }
    }
}

#[test]
fn stretched_borders_repeat_the_nearest_edge_texel() {
    let mut pass = pass_with(CompositorConfig::default(), Size2::new(16, 16));
    // Current view looks 20 degrees further left than the remote frame was rendered.
    pass.set_camera_mats(yawed(20.0), None);
    pass.set_camera_mats_remote(yawed(0.0), None);

    let mut remote = target("remote", 16, 16);
    fill(&mut remote, |x, _| if x == 0 { EDGE } else { GRAY });
    let local = target("local", 16, 16);

    let mut scratch = target("scratch", 16, 16);
    let counts = pass.reproject_remote(&remote, &mut scratch).unwrap();
    assert!(counts.out_of_bounds > 0);
    assert_eq!(counts.stretched, counts.out_of_bounds);

    let mut dest = RenderTarget::new(TargetDesc::color_only("dest"), Size2::new(16, 16));
    pass.present(&local, &scratch, &mut dest).unwrap();
    assert_eq!(dest.pixel(0, 8), EDGE);
    assert_eq!(dest.pixel(15, 8), GRAY);
}

#[test]
fn unstretched_borders_are_blank() {
    let cfg = CompositorConfig {
        stretch_borders: false,
        background_rgba: [1, 2, 3, 255],
        ..CompositorConfig::default()
    };
    let mut pass = pass_with(cfg, Size2::new(16, 16));
    pass.set_camera_mats(yawed(20.0), None);
    pass.set_camera_mats_remote(yawed(0.0), None);

    let mut remote = target("remote", 16, 16);
    fill(&mut remote, |x, _| if x == 0 { EDGE } else { GRAY });
    let local = target("local", 16, 16);

    let mut scratch = target("scratch", 16, 16);
    let counts = pass.reproject_remote(&remote, &mut scratch).unwrap();
    assert!(counts.out_of_bounds > 0);
    assert_eq!(counts.stretched, 0);

    let mut dest = RenderTarget::new(TargetDesc::color_only("dest"), Size2::new(16, 16));
    pass.present(&local, &scratch, &mut dest).unwrap();
    assert_eq!(dest.pixel(0, 8), [1, 2, 3, 255]);
    assert_eq!(dest.pixel(15, 8), GRAY);
}

#[test]
fn stereo_eyes_sample_their_own_half() {
    let cfg = CompositorConfig {
        do_async_time_warp: false,
        ..CompositorConfig::default()
    };
    let mut pass = pass_with(cfg, Size2::new(8, 4));
    pass.set_has_dual_cameras(true);

    // Remote frame at half resolution: left half EDGE, right half GRAY.
    let mut remote = target("remote", 4, 2);
    fill(&mut remote, |x, _| if x < 2 { EDGE } else { GRAY });
    let local = target("local", 8, 4);

    let dest = compose(&pass, &local, &remote);
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(dest.pixel(x, y), EDGE);
            assert_eq!(dest.pixel(x + 4, y), GRAY);
        }
    }
}

#[test]
fn stereo_stretch_never_crosses_into_the_other_eye() {
    let mut pass = pass_with(CompositorConfig::default(), Size2::new(32, 16));
    pass.set_has_dual_cameras(true);
    // Looking right: the left eye's right border falls outside its half of the remote frame.
    pass.set_camera_mats(yawed(-20.0), Some(yawed(-20.0)));
    pass.set_camera_mats_remote(yawed(0.0), Some(yawed(0.0)));

    let mut remote = target("remote", 32, 16);
    fill(&mut remote, |x, _| if x < 16 { EDGE } else { GRAY });
    let local = target("local", 32, 16);

    let dest = compose(&pass, &local, &remote);
    assert_eq!(dest.pixel(15, 8), EDGE);
    assert_eq!(dest.pixel(31, 8), GRAY);
}

struct FillRenderer {
    calls: Vec<SceneId>,
}

impl SceneRenderer for FillRenderer {
    fn render(
        &mut self,
        scene: SceneId,
        _rig: &CameraRig,
        target: &mut RenderTarget,
    ) -> SplitResult<()> {
        self.calls.push(scene);
        target.clear(Rgba8Premul::from_array(GRAY));
        Ok(())
    }
}

#[test]
fn render_draws_remote_once_and_consumes_matrices() {
    let mut registry = RenderTargetRegistry::new(Size2::new(1920, 1080), None);
    registry.resize(Size2::new(8, 8));
    let mut pass = pass_with(CompositorConfig::default(), Size2::new(8, 8));
    let m = Camera::perspective(60.0, 1.0, 0.1, 100.0);
    pass.set_camera_mats(m.snapshot(), None);
    pass.set_camera_mats_remote(m.snapshot(), None);

    let mut renderer = FillRenderer { calls: Vec::new() };
    let mut dest = RenderTarget::new(TargetDesc::color_only("dest"), Size2::new(8, 8));
    let stats = pass
        .render(
            &mut renderer,
            &CameraRig::Single(m),
            registry.split_mut(),
            &mut dest,
        )
        .unwrap();

    assert_eq!(renderer.calls, vec![SceneId::Remote]);
    assert_eq!(stats.remote_renders, 1);
    assert_eq!(stats.presents, 1);
    assert_eq!(stats.reprojected_eyes, 1);
    assert!(pass.camera_mats().is_none());
    assert!(pass.camera_mats_remote().is_none());
    assert_eq!(dest.pixel(4, 4), GRAY);
}

#[test]
fn render_rejects_a_destination_of_the_wrong_size() {
    let mut registry = RenderTargetRegistry::new(Size2::new(1920, 1080), None);
    registry.resize(Size2::new(8, 8));
    let mut pass = pass_with(CompositorConfig::default(), Size2::new(8, 8));
    let mut renderer = FillRenderer { calls: Vec::new() };
    let mut dest = RenderTarget::new(TargetDesc::color_only("dest"), Size2::new(9, 8));
    let err = pass
        .render(
            &mut renderer,
            &CameraRig::Single(Camera::perspective(60.0, 1.0, 0.1, 100.0)),
            registry.split_mut(),
            &mut dest,
        )
        .unwrap_err();
    assert!(err.to_string().contains("compositor error:"));
    assert!(renderer.calls.is_empty());
}
