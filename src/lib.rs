//! splitwarp composes a locally rendered frame with a lagging "remote" frame for stereo VR/AR
//! displays, hiding the remote path's latency with depth-aware asynchronous timewarp.
//!
//! The public API is session-oriented:
//!
//! - Implement [`SceneRenderer`] for the host renderer (or use the [`SoftwareRenderer`])
//! - [`SplitSession::bind`] it together with a [`SplitConfig`] and the remote camera
//! - Call [`SplitSession::tick`] and [`SplitSession::render_frame`] once per host frame
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Cameras, matrix snapshots and stereo detection.
pub mod camera;
/// Compositor pass: merge, reprojection and border policy.
pub mod compositor;
/// Configuration document and validation.
pub mod config;
/// Pose latency simulation for the remote path.
pub mod pose;
/// Render targets, their registry and the host renderer seam.
pub mod render;
/// Session-oriented frame API.
pub mod session;

pub use crate::camera::{Camera, CameraMats, CameraRig, EyeMats, StereoMode, eye_viewport};
pub use crate::compositor::pass::{CompositorPass, PassStats, WarpCounts};
pub use crate::config::{CompositorConfig, Quirks, RemoteConfig, RemotePosePolicy, SplitConfig};
pub use crate::foundation::core::{Mat4, Rgba8Premul, Size2, TargetId, Vec2, Vec3, Vec4};
pub use crate::foundation::error::{SplitError, SplitResult};
pub use crate::pose::latency::{PoseLatencyBuffer, PoseRecord, REFERENCE_HZ, queue_capacity};
pub use crate::pose::remote::RemoteSimulator;
pub use crate::pose::throttle::TickThrottle;
pub use crate::render::backend::{SceneId, SceneRenderer};
pub use crate::render::registry::{RenderTargetRegistry, TargetsMut};
pub use crate::render::software::{Paint, Quad, QuadScene, SoftwareRenderer, rasterize};
pub use crate::render::target::{
    ColorFormat, DepthFormat, RenderTarget, TargetDesc, TextureFilter,
};
pub use crate::session::interceptor::{FrameInput, FrameStats, SplitSession};
pub use crate::session::surface::DisplaySurface;
