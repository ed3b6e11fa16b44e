use super::*;
use crate::camera::Camera;
use glam::{Mat4, Vec3};

fn cam_at(x: f32) -> CameraMats {
    Camera::perspective(60.0, 1.0, 0.1, 100.0)
        .with_world(Mat4::from_translation(Vec3::new(x, 0.0, 0.0)))
        .snapshot()
}

/// A remote frame that is empty (far) everywhere.
fn empty(_: Vec2) -> Option<f32> {
    Some(FAR_DEPTH)
}

#[test]
fn identical_cameras_map_pixels_onto_themselves() {
    let m = cam_at(0.0);
    let warp = EyeWarp::new(&m, &m, 16);
    for uv in [Vec2::new(0.5, 0.5), Vec2::new(0.1, 0.9), Vec2::new(0.77, 0.2)] {
        let hit = warp.trace(uv, empty);
        assert!((hit.uv - uv).abs().max_element() < 1e-3, "{uv:?} -> {hit:?}");
    }
}

#[test]
fn pure_rotation_is_depth_independent() {
    let current = cam_at(0.0);
    let remote = Camera::perspective(60.0, 1.0, 0.1, 100.0)
        .with_world(Mat4::from_rotation_y(10f32.to_radians()))
        .snapshot();
    let near_surface = |_: Vec2| Some(0.5);
    let a = EyeWarp::new(&current, &remote, 32)
        .trace(Vec2::new(0.5, 0.5), empty);
    let b = EyeWarp::new(&current, &remote, 32)
        .trace(Vec2::new(0.5, 0.5), near_surface);
    assert!((a.uv - b.uv).abs().max_element() < 1e-3);
    // Remote looks 10 degrees to the left, so the current centre is right of remote centre.
    assert!(a.uv.x > 0.5);
}

#[test]
fn translation_finds_near_surface_with_parallax() {
    // Remote frame: a flat wall at distance 3 across the whole view.
    let current = cam_at(0.5);
    let remote = cam_at(0.0);
    let wall_depth = {
        let clip = remote.projection * Vec4::new(0.0, 0.0, -3.0, 1.0);
        ndc_z_to_depth(clip.z / clip.w)
    };
    let wall = move |uv: Vec2| in_bounds(uv).then_some(wall_depth);

    let warp = EyeWarp::new(&current, &remote, 32);
    let hit = warp.trace(Vec2::new(0.5, 0.5), wall);

    // The current centre ray meets the wall at x = 0.5, which the remote camera sees at
    // ndc x = 0.5 / (3 * tan 30deg).
    let expected_u = ndc_to_uv(Vec2::new(0.5 / (3.0 * 30f32.to_radians().tan()), 0.0)).x;
    assert!((hit.uv.x - expected_u).abs() < 5e-3, "{hit:?} vs {expected_u}");
    assert!((hit.uv.y - 0.5).abs() < 1e-3);
    assert!(hit.depth < FAR_DEPTH);

    // Planar reprojection (no depth search) lands at the far plane instead.
    let planar = EyeWarp::new(&current, &remote, 0).trace(Vec2::new(0.5, 0.5), wall);
    assert!((planar.uv.x - 0.5).abs() < 0.01);
    assert_eq!(planar.depth, FAR_DEPTH);
}

#[test]
fn points_behind_the_remote_camera_land_past_the_facing_edge() {
    let current = Camera::perspective(90.0, 1.0, 0.1, 100.0)
        .with_world(Mat4::from_rotation_y(120f32.to_radians()))
        .snapshot();
    let remote = Camera::perspective(90.0, 1.0, 0.1, 100.0).snapshot();
    let warp = EyeWarp::new(&current, &remote, 16);

    let hit = warp.trace(Vec2::new(0.5, 0.5), empty);
    assert!(hit.uv.is_finite());
    assert!(!in_bounds(hit.uv));
    assert_eq!(hit.depth, FAR_DEPTH);
    // Turned left past the remote view: the left edge is the nearest content.
    assert!(hit.uv.x < 0.0, "{hit:?}");
    assert!(texel_for(hit.uv, (0, 8), 8, true).is_some());
}

#[test]
fn texel_lookup_applies_border_policy() {
    let span = (10, 20);
    assert_eq!(texel_for(Vec2::new(0.0, 0.0), span, 5, false), Some((10, 0)));
    assert_eq!(texel_for(Vec2::new(1.0, 1.0), span, 5, false), Some((29, 4)));
    assert_eq!(texel_for(Vec2::new(-0.2, 0.5), span, 5, false), None);
    assert_eq!(texel_for(Vec2::new(-0.2, 0.5), span, 5, true), Some((10, 2)));
    assert_eq!(texel_for(Vec2::new(1.7, -3.0), span, 5, true), Some((29, 0)));
    assert_eq!(texel_for(Vec2::new(f32::NAN, 0.5), span, 5, true), None);
}
