use crate::config::clamp_resolution_divisor;
use crate::foundation::core::{Size2, TargetId};
use crate::render::target::{DepthFormat, RenderTarget, TargetDesc};

const LOCAL_CAPTURE: TargetDesc = TargetDesc::color_depth("local-capture");
const REMOTE_CAPTURE: TargetDesc = TargetDesc::color_depth("remote-capture");
const COMPOSITE_SCRATCH: TargetDesc = TargetDesc {
    depth: Some(DepthFormat::Float32),
    ..TargetDesc::color_depth("composite-scratch")
};

/// Disjoint mutable borrows of the three registry targets for one frame.
pub struct TargetsMut<'a> {
    /// Local frame captured off-screen.
    pub local: &'a mut RenderTarget,
    /// Remote frame (colour + depth at the remote camera pose).
    pub remote: &'a mut RenderTarget,
    /// Reprojected remote layer, produced by the compositor before the final merge.
    pub scratch: &'a mut RenderTarget,
}

/// Owner of the local-capture, remote-capture and composite-scratch targets.
///
/// Local-capture and composite-scratch always follow the native size. Remote-capture follows it
/// too unless a downscale override is active, in which case it is sized from the reference
/// resolution instead.
pub struct RenderTargetRegistry {
    local: RenderTarget,
    remote: RenderTarget,
    scratch: RenderTarget,
    native: Size2,
    base_resolution: Size2,
    remote_divisor: Option<f32>,
}

impl RenderTargetRegistry {
    /// Create the registry. Local and scratch start at 1x1 until the first resize; remote starts
    /// at the reference resolution (or its downscaled size).
    pub fn new(base_resolution: Size2, remote_divisor: Option<f32>) -> Self {
        let remote_divisor = remote_divisor.map(clamp_resolution_divisor);
        let remote_size = match remote_divisor {
            Some(div) => divided(base_resolution, div),
            None => base_resolution,
        };
        Self {
            local: RenderTarget::new(LOCAL_CAPTURE, Size2::new(1, 1)),
            remote: RenderTarget::new(REMOTE_CAPTURE, remote_size),
            scratch: RenderTarget::new(COMPOSITE_SCRATCH, Size2::new(1, 1)),
            native: Size2::new(1, 1),
            base_resolution,
            remote_divisor,
        }
    }

    /// Resize every target to `size` (device pixels, already clamped to 1x1 by [`Size2`]).
    ///
    /// Repeating the current size costs nothing and keeps every allocation. Returns `true` when
    /// any target was reallocated.
    pub fn resize(&mut self, size: Size2) -> bool {
        self.native = size;
        let mut changed = self.local.set_size(size);
        changed |= self.scratch.set_size(size);
        let remote_size = self.remote_target_size();
        changed |= self.remote.set_size(remote_size);
        if changed {
            tracing::debug!(native = %size, remote = %remote_size, "render targets resized");
        }
        changed
    }

    /// Downscale the remote-capture target to `base_resolution / factor`.
    ///
    /// `factor` is clamped to `1..=16`. Local-capture and destination sizing are unaffected.
    pub fn decrease_resolution(&mut self, factor: f32) -> Size2 {
        let div = clamp_resolution_divisor(factor);
        self.remote_divisor = Some(div);
        let size = self.remote_target_size();
        self.remote.set_size(size);
        tracing::debug!(factor = div, remote = %size, "remote resolution override");
        size
    }

    /// Drop the downscale override so remote-capture tracks the native size again.
    pub fn track_native_remote(&mut self) {
        self.remote_divisor = None;
        let size = self.remote_target_size();
        self.remote.set_size(size);
        tracing::debug!(remote = %size, "remote resolution tracks native size");
    }

    /// Active downscale factor, if any.
    pub fn remote_divisor(&self) -> Option<f32> {
        self.remote_divisor
    }

    fn remote_target_size(&self) -> Size2 {
        match self.remote_divisor {
            Some(div) => divided(self.base_resolution, div),
            None => self.native,
        }
    }

    /// Size the local-capture and composite-scratch targets currently track.
    pub fn native_size(&self) -> Size2 {
        self.native
    }

    /// Local-capture target.
    pub fn local(&self) -> &RenderTarget {
        &self.local
    }

    /// Remote-capture target.
    pub fn remote(&self) -> &RenderTarget {
        &self.remote
    }

    /// Composite-scratch target.
    pub fn scratch(&self) -> &RenderTarget {
        &self.scratch
    }

    /// Borrow all three targets mutably at once.
    pub fn split_mut(&mut self) -> TargetsMut<'_> {
        TargetsMut {
            local: &mut self.local,
            remote: &mut self.remote,
            scratch: &mut self.scratch,
        }
    }

    /// Identities in `[local, remote, scratch]` order.
    pub fn ids(&self) -> [TargetId; 3] {
        [self.local.id(), self.remote.id(), self.scratch.id()]
    }

    /// Total allocations across all three targets.
    pub fn allocations(&self) -> u64 {
        self.local.allocations() + self.remote.allocations() + self.scratch.allocations()
    }
}

fn divided(base: Size2, div: f32) -> Size2 {
    Size2::from_device_px(
        f64::from(base.width) / f64::from(div),
        f64::from(base.height) / f64::from(div),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/registry.rs"]
mod tests;
