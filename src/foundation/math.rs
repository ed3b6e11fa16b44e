//! Shared pixel and projection math.
//!
//! Screen conventions used across the crate:
//! - `uv` is in `[0, 1]^2` with `v` growing downwards (row 0 is the top row).
//! - NDC follows the OpenGL clip volume (`z` in `[-1, 1]`), matching `glam`'s `*_gl` projections.
//! - Stored depth is window depth in `[0, 1]`; `1.0` is the far plane and the clear value.

use glam::{Mat4, Vec2, Vec3, Vec4};

pub(crate) const FAR_DEPTH: f32 = 1.0;

const MIN_CLIP_W: f32 = 1e-6;

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

pub(crate) fn uv_to_ndc(uv: Vec2) -> Vec2 {
    Vec2::new(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0)
}

pub(crate) fn ndc_to_uv(ndc: Vec2) -> Vec2 {
    Vec2::new((ndc.x + 1.0) * 0.5, (1.0 - ndc.y) * 0.5)
}

pub(crate) fn depth_to_ndc_z(depth: f32) -> f32 {
    depth * 2.0 - 1.0
}

pub(crate) fn ndc_z_to_depth(z: f32) -> f32 {
    z * 0.5 + 0.5
}

/// Reconstruct a world-space point from a screen sample.
pub(crate) fn unproject(inv_view_proj: Mat4, uv: Vec2, depth: f32) -> Vec3 {
    let ndc = uv_to_ndc(uv);
    let clip = inv_view_proj * Vec4::new(ndc.x, ndc.y, depth_to_ndc_z(depth), 1.0);
    clip.truncate() / clip.w
}

/// Project a world-space point to `(uv, depth)`.
///
/// Returns `None` for points on or behind the camera plane.
pub(crate) fn project(view_proj: Mat4, world: Vec3) -> Option<(Vec2, f32)> {
    let clip = view_proj * world.extend(1.0);
    if clip.w <= MIN_CLIP_W {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some((ndc_to_uv(ndc.truncate()), ndc_z_to_depth(ndc.z)))
}

/// Centre of pixel `(x, y)` in uv space of a `w x h` grid.
pub(crate) fn pixel_center_uv(x: u32, y: u32, w: u32, h: u32) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / w.max(1) as f32,
        (y as f32 + 0.5) / h.max(1) as f32,
    )
}
