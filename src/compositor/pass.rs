//! The compositor pass: merges the local frame with a reprojected remote frame.
//!
//! One invocation of [`CompositorPass::render`] does three things in order:
//! 1. renders the remote scene at the remote camera into the remote-capture target,
//! 2. reprojects it eye by eye into the composite-scratch target (asynchronous timewarp),
//! 3. presents: local over scratch, cut out by local depth, into the destination.

use rayon::prelude::*;

use crate::camera::{CameraMats, CameraRig, EyeMats, eye_viewport};
use crate::compositor::blend::cutout_over_row;
use crate::compositor::reproject::{EyeWarp, in_bounds, texel_for};
use crate::config::{CompositorConfig, MAX_REPROJECTION_STEPS};
use crate::foundation::core::{Rgba8Premul, Size2, Vec2};
use crate::foundation::error::{SplitError, SplitResult};
use crate::foundation::math::{FAR_DEPTH, pixel_center_uv};
use crate::render::backend::{SceneId, SceneRenderer};
use crate::render::registry::TargetsMut;
use crate::render::target::RenderTarget;

/// Counters for one compositor invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Remote scene renders performed (always 1 per invocation).
    pub remote_renders: u32,
    /// Writes to the destination (always 1 per invocation).
    pub presents: u32,
    /// Eyes that were reprojected rather than merged at the stale pose.
    pub reprojected_eyes: u32,
    /// Output pixels whose remote sample fell outside the remote frame.
    pub out_of_bounds_px: u64,
    /// Out-of-bounds pixels filled from the nearest edge texel.
    pub stretched_px: u64,
}

/// Out-of-bounds counters from [`CompositorPass::reproject_remote`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WarpCounts {
    /// Pixels whose sample fell outside the remote frame.
    pub out_of_bounds: u64,
    /// Of those, pixels filled from the nearest edge texel.
    pub stretched: u64,
}

struct EyeJob {
    span: (u32, u32),
    remote_span: (u32, u32),
    warp: Option<EyeWarp>,
}

struct EyeSample {
    color: [u8; 4],
    depth: f32,
    outside: bool,
    stretched: bool,
}

impl EyeJob {
    /// Remote colour and current-camera depth for the eye-local output `uv`.
    fn sample(
        &self,
        remote: &RenderTarget,
        uv: Vec2,
        stretch: bool,
        background: [u8; 4],
    ) -> EyeSample {
        let (src_uv, warped_depth) = match &self.warp {
            Some(warp) => {
                let hit = warp.trace(uv, |u| remote_depth_at(remote, self.remote_span, u));
                (hit.uv, Some(hit.depth))
            }
            None => (uv, None),
        };
        let outside = !in_bounds(src_uv);
        match texel_for(src_uv, self.remote_span, remote.height(), stretch) {
            Some((tx, ty)) => EyeSample {
                color: remote.pixel(tx, ty),
                depth: warped_depth.unwrap_or_else(|| remote.depth_at(tx, ty)),
                outside,
                stretched: outside,
            },
            None => EyeSample {
                color: background,
                depth: FAR_DEPTH,
                outside,
                stretched: false,
            },
        }
    }
}

/// Local/remote merge with asynchronous timewarp and border policy.
///
/// Flags and camera matrices are set before each [`CompositorPass::render`]; camera matrices are
/// consumed by the invocation and must be supplied again for the next frame.
#[derive(Clone, Debug)]
pub struct CompositorPass {
    size: Size2,
    has_dual_cameras: bool,
    stretch_borders: bool,
    do_async_time_warp: bool,
    background: Rgba8Premul,
    reprojection_steps: u32,
    local_mats: Option<EyeMats>,
    remote_mats: Option<EyeMats>,
}

impl CompositorPass {
    /// New pass at 1x1; call [`CompositorPass::set_size`] before rendering.
    pub fn new(cfg: &CompositorConfig) -> Self {
        let mut pass = Self {
            size: Size2::new(1, 1),
            has_dual_cameras: false,
            stretch_borders: true,
            do_async_time_warp: true,
            background: Rgba8Premul::TRANSPARENT,
            reprojection_steps: 0,
            local_mats: None,
            remote_mats: None,
        };
        pass.apply_config(cfg);
        pass
    }

    /// Copy the per-frame flags from `cfg`.
    pub fn apply_config(&mut self, cfg: &CompositorConfig) {
        self.stretch_borders = cfg.stretch_borders;
        self.do_async_time_warp = cfg.do_async_time_warp;
        self.background = cfg.background();
        self.reprojection_steps = cfg.reprojection_steps.min(MAX_REPROJECTION_STEPS);
    }

    /// Output size; must equal the destination's size at render time.
    pub fn set_size(&mut self, size: Size2) {
        self.size = size;
    }

    /// Current output size.
    pub fn size(&self) -> Size2 {
        self.size
    }

    /// Compose two side-by-side eyes instead of one.
    pub fn set_has_dual_cameras(&mut self, on: bool) {
        self.has_dual_cameras = on;
    }

    /// Clamp out-of-bounds samples to the edge instead of blanking them.
    pub fn set_stretch_borders(&mut self, on: bool) {
        self.stretch_borders = on;
    }

    /// Reproject the remote frame to the current pose.
    pub fn set_do_async_time_warp(&mut self, on: bool) {
        self.do_async_time_warp = on;
    }

    /// Whether two eyes are composed.
    pub fn has_dual_cameras(&self) -> bool {
        self.has_dual_cameras
    }

    /// Whether borders are stretched.
    pub fn stretch_borders(&self) -> bool {
        self.stretch_borders
    }

    /// Whether timewarp is on.
    pub fn do_async_time_warp(&self) -> bool {
        self.do_async_time_warp
    }

    /// Current (local) camera matrices: one view, or left then right.
    pub fn set_camera_mats(&mut self, left: CameraMats, right: Option<CameraMats>) {
        self.local_mats = Some(EyeMats::from_pair(left, right));
    }

    /// Matrices the remote frame was rendered with: one view, or left then right.
    pub fn set_camera_mats_remote(&mut self, left: CameraMats, right: Option<CameraMats>) {
        self.remote_mats = Some(EyeMats::from_pair(left, right));
    }

    /// Local matrices set for the pending invocation.
    pub fn camera_mats(&self) -> Option<&EyeMats> {
        self.local_mats.as_ref()
    }

    /// Remote matrices set for the pending invocation.
    pub fn camera_mats_remote(&self) -> Option<&EyeMats> {
        self.remote_mats.as_ref()
    }

    /// Run the full pass: remote render, reprojection, presentation into `destination`.
    #[tracing::instrument(level = "debug", skip_all, fields(size = %self.size, dual = self.has_dual_cameras))]
    pub fn render<R>(
        &mut self,
        renderer: &mut R,
        remote_rig: &CameraRig,
        targets: TargetsMut<'_>,
        destination: &mut RenderTarget,
    ) -> SplitResult<PassStats>
    where
        R: SceneRenderer + ?Sized,
    {
        self.check_size("destination", destination.size())?;
        self.check_size("local-capture", targets.local.size())?;
        self.check_size("composite-scratch", targets.scratch.size())?;

        let mut stats = PassStats::default();
        let result = (|| -> SplitResult<PassStats> {
            renderer.render(SceneId::Remote, remote_rig, targets.remote)?;
            stats.remote_renders += 1;

            let counts = self.reproject_remote(targets.remote, targets.scratch)?;
            stats.out_of_bounds_px = counts.out_of_bounds;
            stats.stretched_px = counts.stretched;
            stats.reprojected_eyes = self.reprojected_eye_count();

            self.present(targets.local, targets.scratch, destination)?;
            stats.presents += 1;
            Ok(stats)
        })();

        self.local_mats = None;
        self.remote_mats = None;
        result
    }

    fn check_size(&self, what: &str, size: Size2) -> SplitResult<()> {
        if size != self.size {
            return Err(SplitError::compositor(format!(
                "{what} is {size} but the pass is sized {}; call set_size first",
                self.size
            )));
        }
        Ok(())
    }

    fn eye_count(&self) -> u32 {
        if self.has_dual_cameras { 2 } else { 1 }
    }

    fn eye_warp(&self, eye: usize) -> Option<EyeWarp> {
        if !self.do_async_time_warp {
            return None;
        }
        let (local, remote) = (self.local_mats.as_ref()?, self.remote_mats.as_ref()?);
        Some(EyeWarp::new(
            &local.eye(eye),
            &remote.eye(eye),
            self.reprojection_steps,
        ))
    }

    fn reprojected_eye_count(&self) -> u32 {
        (0..self.eye_count() as usize)
            .filter(|&i| self.eye_warp(i).is_some())
            .count() as u32
    }

    /// Reproject `remote` into `scratch` (both colour and current-camera depth).
    ///
    /// Without timewarp, or without both matrix sets, each eye copies the remote frame at its
    /// stale pose (resampled to the scratch size).
    pub fn reproject_remote(
        &self,
        remote: &RenderTarget,
        scratch: &mut RenderTarget,
    ) -> SplitResult<WarpCounts> {
        let size = scratch.size();
        let eye_count = self.eye_count();
        if self.do_async_time_warp && (self.local_mats.is_none() || self.remote_mats.is_none()) {
            tracing::warn!("time warp requested without camera matrices; merging at stale pose");
        }
        let eyes: Vec<EyeJob> = (0..eye_count)
            .map(|i| EyeJob {
                span: eye_viewport(i, eye_count, size.width),
                remote_span: eye_viewport(i, eye_count, remote.width()),
                warp: self.eye_warp(i as usize),
            })
            .collect();

        let background = self.background.to_array();
        let stretch = self.stretch_borders;
        let row_px = size.width as usize;

        let (color, depth) = scratch.planes_mut();
        let depth = depth.ok_or_else(|| {
            SplitError::compositor("composite-scratch target has no depth plane")
        })?;

        let counts = color
            .par_chunks_mut(row_px * 4)
            .zip(depth.par_chunks_mut(row_px))
            .enumerate()
            .map(|(y, (crow, drow))| {
                let mut counts = WarpCounts::default();
                for eye in &eyes {
                    let (x0, w) = eye.span;
                    for x in x0..(x0 + w).min(size.width) {
                        let uv = pixel_center_uv(x - x0, y as u32, w, size.height);
                        let sample = eye.sample(remote, uv, stretch, background);
                        counts.out_of_bounds += u64::from(sample.outside);
                        counts.stretched += u64::from(sample.stretched);
                        let xi = x as usize;
                        crow[xi * 4..xi * 4 + 4].copy_from_slice(&sample.color);
                        drow[xi] = sample.depth;
                    }
                }
                counts
            })
            .reduce(WarpCounts::default, |a, b| WarpCounts {
                out_of_bounds: a.out_of_bounds + b.out_of_bounds,
                stretched: a.stretched + b.stretched,
            });

        Ok(counts)
    }

    /// Final merge: `local` over `scratch` wherever local depth is nearer than the far plane.
    ///
    /// Only the destination's colour plane is written.
    pub fn present(
        &self,
        local: &RenderTarget,
        scratch: &RenderTarget,
        destination: &mut RenderTarget,
    ) -> SplitResult<()> {
        if local.size() != destination.size() || scratch.size() != destination.size() {
            return Err(SplitError::compositor(format!(
                "present expects equal sizes: local {}, scratch {}, destination {}",
                local.size(),
                scratch.size(),
                destination.size()
            )));
        }
        let local_depth = local
            .depth()
            .ok_or_else(|| SplitError::compositor("local-capture target has no depth plane"))?;
        let row_px = destination.width() as usize;

        destination
            .color_mut()
            .par_chunks_mut(row_px * 4)
            .zip(scratch.color().par_chunks(row_px * 4))
            .zip(local.color().par_chunks(row_px * 4))
            .zip(local_depth.par_chunks(row_px))
            .try_for_each(|(((dst, remote), local), z)| {
                cutout_over_row(dst, remote, local, z, FAR_DEPTH)
            })
    }
}

fn remote_depth_at(remote: &RenderTarget, span: (u32, u32), uv: Vec2) -> Option<f32> {
    if !in_bounds(uv) {
        return None;
    }
    texel_for(uv, span, remote.height(), false).map(|(x, y)| remote.depth_at(x, y))
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/pass.rs"]
mod tests;
