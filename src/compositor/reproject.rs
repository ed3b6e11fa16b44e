//! Depth-aware reprojection of a remote frame into the current camera.
//!
//! For every output pixel the current camera's view ray is marched in the remote frame's screen
//! space. Because both projections are linear in homogeneous coordinates, the ray is a straight
//! line in remote clip space when parameterized by current NDC depth, so each sample costs one
//! matrix-vector product. The first sample that lies at or behind the remote depth surface is
//! refined by bisection; rays that never meet a surface resolve to their far-plane point. A
//! far-plane point behind the remote camera resolves to a uv beyond the frame edge it faces.

use glam::{Mat4, Vec2, Vec4};

use crate::camera::CameraMats;
use crate::foundation::math::{FAR_DEPTH, depth_to_ndc_z, ndc_to_uv, ndc_z_to_depth, uv_to_ndc};

const MIN_CLIP_W: f32 = 1e-6;
/// How far outside the frame, in ndc, an unprojectable sample is placed.
const OUTSIDE_NDC: f32 = 4.0;
const REFINE_STEPS: u32 = 8;
/// Two 16-bit depth quanta.
const DEPTH_EPS: f32 = 2.0 / 65535.0;

/// Where the current camera's pixel finds its content in the remote frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct WarpHit {
    /// Remote-frame uv (eye-local), possibly outside `[0, 1]`.
    pub(crate) uv: Vec2,
    /// Window depth of the hit as seen from the current camera.
    pub(crate) depth: f32,
}

/// Per-eye reprojection from current-camera screen space into remote screen space.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EyeWarp {
    current_to_remote: Mat4,
    steps: u32,
}

impl EyeWarp {
    pub(crate) fn new(current: &CameraMats, remote: &CameraMats, steps: u32) -> Self {
        Self {
            current_to_remote: remote.view_projection() * current.view_projection().inverse(),
            steps,
        }
    }

    /// Project the point at current window depth `depth` on the ray through `ndc` into the
    /// remote frame: `(remote uv, remote window depth)`.
    fn remote_at(&self, ndc: Vec2, depth: f32) -> Option<(Vec2, f32)> {
        let clip = self.current_to_remote * Vec4::new(ndc.x, ndc.y, depth_to_ndc_z(depth), 1.0);
        if clip.w <= MIN_CLIP_W {
            return None;
        }
        let n = clip.truncate() / clip.w;
        Some((ndc_to_uv(n.truncate()), ndc_z_to_depth(n.z)))
    }

    fn behind_surface<F>(&self, ndc: Vec2, depth: f32, remote_depth: &F) -> bool
    where
        F: Fn(Vec2) -> Option<f32>,
    {
        let Some((uv, ray_depth)) = self.remote_at(ndc, depth) else {
            return false;
        };
        remote_depth(uv).is_some_and(|surface| ray_depth >= surface - DEPTH_EPS)
    }

    /// Find the remote sample for the current-camera pixel at `uv`.
    ///
    /// `remote_depth` answers the remote depth at an eye-local uv, or `None` outside the remote
    /// frame (such samples never count as a surface).
    pub(crate) fn trace<F>(&self, uv: Vec2, remote_depth: F) -> WarpHit
    where
        F: Fn(Vec2) -> Option<f32>,
    {
        let ndc = uv_to_ndc(uv);
        if self.steps > 0 {
            let mut prev = 0.0f32;
            for i in 0..=self.steps {
                let d = i as f32 / self.steps as f32;
                if !self.behind_surface(ndc, d, &remote_depth) {
                    prev = d;
                    continue;
                }
                let (mut lo, mut hi) = (prev, d);
                for _ in 0..REFINE_STEPS {
                    let mid = 0.5 * (lo + hi);
                    if self.behind_surface(ndc, mid, &remote_depth) {
                        hi = mid;
                    } else {
                        lo = mid;
                    }
                }
                if let Some((uv, _)) = self.remote_at(ndc, hi) {
                    return WarpHit { uv, depth: hi };
                }
                break;
            }
        }
        let uv = match self.remote_at(ndc, FAR_DEPTH) {
            Some((uv, _)) => uv,
            None => self.outside_toward(ndc),
        };
        WarpHit {
            uv,
            depth: FAR_DEPTH,
        }
    }

    /// Uv outside the remote frame on the side the far-plane point at `ndc` lies toward, for
    /// points the remote camera cannot project (behind it).
    fn outside_toward(&self, ndc: Vec2) -> Vec2 {
        let clip = self.current_to_remote * Vec4::new(ndc.x, ndc.y, depth_to_ndc_z(FAR_DEPTH), 1.0);
        let dir = clip.truncate().truncate();
        let reach = dir.abs().max_element();
        let dir = if reach.is_finite() && reach > 0.0 {
            dir / reach
        } else {
            Vec2::X
        };
        ndc_to_uv(dir * OUTSIDE_NDC)
    }
}

/// Resolve an eye-local uv to a texel of an eye span `(x0, width)` in a target `height` rows
/// tall.
///
/// In-bounds samples map to their nearest texel. Out-of-bounds samples clamp to the nearest edge
/// texel when `stretch` is set and yield `None` otherwise. Non-finite uvs always yield `None`.
pub(crate) fn texel_for(uv: Vec2, span: (u32, u32), height: u32, stretch: bool) -> Option<(u32, u32)> {
    if !uv.is_finite() {
        return None;
    }
    if !in_bounds(uv) && !stretch {
        return None;
    }
    let (x0, width) = span;
    let tx = (uv.x * width as f32).floor().clamp(0.0, (width.max(1) - 1) as f32) as u32;
    let ty = (uv.y * height as f32).floor().clamp(0.0, (height.max(1) - 1) as f32) as u32;
    Some((x0 + tx, ty))
}

pub(crate) fn in_bounds(uv: Vec2) -> bool {
    (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/reproject.rs"]
mod tests;
