//! Runtime configuration.
//!
//! Every field has a default, so `{}` is a valid configuration document. All values can also be
//! changed at runtime through the session setters.

use std::path::Path;

use crate::foundation::core::{Rgba8Premul, Size2};
use crate::foundation::error::{SplitError, SplitResult};

/// Upper bound for [`CompositorConfig::reprojection_steps`].
pub const MAX_REPROJECTION_STEPS: u32 = 256;
/// Allowed remote frame rate range (frames per second).
pub const REMOTE_FPS_RANGE: std::ops::RangeInclusive<f64> = 1.0..=240.0;
/// Allowed remote downscale factors.
pub const RESOLUTION_DIVISOR_RANGE: std::ops::RangeInclusive<f32> = 1.0..=16.0;

/// Top-level configuration document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    /// Compositor pass settings.
    pub compositor: CompositorConfig,
    /// Remote path simulation settings.
    pub remote: RemoteConfig,
    /// Host capability flags.
    pub quirks: Quirks,
}

/// Settings read by the compositor pass every frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositorConfig {
    /// Reproject the remote frame to the current camera pose.
    pub do_async_time_warp: bool,
    /// Clamp out-of-bounds reprojection samples to the nearest edge texel.
    pub stretch_borders: bool,
    /// Straight-alpha RGBA written where a sample falls outside the remote frame and borders are
    /// not stretched.
    pub background_rgba: [u8; 4],
    /// Depth-search samples along each reprojected ray (0 = planar reprojection at the far
    /// plane, no parallax correction).
    pub reprojection_steps: u32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            do_async_time_warp: true,
            stretch_borders: true,
            background_rgba: [0, 0, 0, 0],
            reprojection_steps: 32,
        }
    }
}

impl CompositorConfig {
    /// Background as premultiplied colour.
    pub fn background(&self) -> Rgba8Premul {
        let [r, g, b, a] = self.background_rgba;
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }
}

/// What the remote camera does with poses released by the latency buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemotePosePolicy {
    /// Delayed poses are produced but the remote camera keeps its pose.
    #[default]
    Static,
    /// The remote camera is moved to each delayed pose as it is released.
    FollowDelayed,
}

/// Remote path simulation settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// Remote scene tick rate (frames per second).
    pub fps: f64,
    /// Simulated round-trip latency in milliseconds; zero or negative releases immediately.
    pub latency_ms: f64,
    /// Reference resolution that [`RemoteConfig::resolution_divisor`] divides.
    pub base_resolution: Size2,
    /// When set, the remote-capture target is `base_resolution / divisor` instead of tracking
    /// the native size.
    pub resolution_divisor: Option<f32>,
    /// Delayed-pose consumer policy.
    pub pose_policy: RemotePosePolicy,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            fps: 60.0,
            latency_ms: 150.0,
            base_resolution: Size2::new(1920, 1080),
            resolution_divisor: None,
            pose_policy: RemotePosePolicy::Static,
        }
    }
}

/// Host capability flags.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Quirks {
    /// The host reports two cameras for single-view capture; force mono composition.
    pub over_reports_camera_count: bool,
}

impl SplitConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> SplitResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| SplitError::config(format!("parse: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> SplitResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| SplitError::config(format!("read '{}': {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Check value ranges that a configuration file could get wrong.
    pub fn validate(&self) -> SplitResult<()> {
        if !self.remote.fps.is_finite() || !REMOTE_FPS_RANGE.contains(&self.remote.fps) {
            return Err(SplitError::config(format!(
                "remote.fps must be within {}..={}, got {}",
                REMOTE_FPS_RANGE.start(),
                REMOTE_FPS_RANGE.end(),
                self.remote.fps
            )));
        }
        if !self.remote.latency_ms.is_finite() {
            return Err(SplitError::config("remote.latency_ms must be finite"));
        }
        if self.compositor.reprojection_steps > MAX_REPROJECTION_STEPS {
            return Err(SplitError::config(format!(
                "compositor.reprojection_steps must be <= {MAX_REPROJECTION_STEPS}"
            )));
        }
        Ok(())
    }
}

/// Clamp a remote downscale factor into [`RESOLUTION_DIVISOR_RANGE`]; non-finite values become 1.
pub fn clamp_resolution_divisor(factor: f32) -> f32 {
    if !factor.is_finite() {
        return 1.0;
    }
    factor.clamp(*RESOLUTION_DIVISOR_RANGE.start(), *RESOLUTION_DIVISOR_RANGE.end())
}
