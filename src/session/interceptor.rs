//! The explicit two-phase frame function.
//!
//! A host calls [`SplitSession::render_frame`] once per frame instead of its own render entry
//! point. The session renders the local scene off-screen, then runs the compositor pass, whose
//! nested remote render and final presentation are plain calls made while the session is
//! mutably borrowed, so a frame can never re-enter itself.

use crate::camera::{Camera, CameraRig, StereoMode};
use crate::compositor::pass::{CompositorPass, PassStats};
use crate::config::{RemotePosePolicy, SplitConfig};
use crate::foundation::core::{Mat4, Size2};
use crate::foundation::error::{SplitError, SplitResult};
use crate::pose::latency::PoseRecord;
use crate::pose::remote::RemoteSimulator;
use crate::render::backend::{SceneId, SceneRenderer};
use crate::render::registry::RenderTargetRegistry;
use crate::render::target::{RenderTarget, TargetDesc};
use crate::session::surface::DisplaySurface;

const BACKBUFFER: TargetDesc = TargetDesc::color_only("backbuffer");

/// Per-frame input.
pub struct FrameInput<'a> {
    /// Camera(s) the host renders the local scene with. A composite rig's eyes are the camera
    /// list used for stereo detection.
    pub rig: &'a CameraRig,
    /// True output target (e.g. an XR swapchain image). `None` presents into the session's
    /// backbuffer, sized from the display surface.
    pub destination: Option<&'a mut RenderTarget>,
}

/// What one [`SplitSession::render_frame`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStats {
    /// Zero-based frame number.
    pub frame: u64,
    /// Composition mode selected for this frame.
    pub mode: StereoMode,
    /// Whether the render targets were reallocated for this frame.
    pub resized: bool,
    /// Local scene renders (always 1).
    pub local_renders: u32,
    /// Remote scene renders (always 1).
    pub remote_renders: u32,
    /// Presentations into the true destination (always 1).
    pub presents: u32,
    /// Eyes reprojected to the current pose.
    pub reprojected_eyes: u32,
    /// Output pixels whose remote sample fell outside the remote frame.
    pub out_of_bounds_px: u64,
    /// Out-of-bounds pixels filled from the nearest edge texel.
    pub stretched_px: u64,
}

impl FrameStats {
    fn from_pass(frame: u64, mode: StereoMode, resized: bool, pass: PassStats) -> Self {
        Self {
            frame,
            mode,
            resized,
            local_renders: 1,
            remote_renders: pass.remote_renders,
            presents: pass.presents,
            reprojected_eyes: pass.reprojected_eyes,
            out_of_bounds_px: pass.out_of_bounds_px,
            stretched_px: pass.stretched_px,
        }
    }
}

/// A bound split-rendering session: host renderer, render targets, compositor and remote path.
///
/// [`SplitSession::bind`] installs the session and [`SplitSession::unbind`] hands the renderer
/// back untouched.
pub struct SplitSession<R: SceneRenderer> {
    renderer: R,
    config: SplitConfig,
    surface: DisplaySurface,
    registry: RenderTargetRegistry,
    pass: CompositorPass,
    remote: RemoteSimulator,
    backbuffer: RenderTarget,
    remote_resync: bool,
    frames: u64,
}

impl<R: SceneRenderer> SplitSession<R> {
    /// Bind to `renderer`.
    ///
    /// Fails with an init error when there is no remote camera or the renderer has no remote
    /// scene; nothing meaningful can be composed without both.
    pub fn bind(
        renderer: R,
        config: SplitConfig,
        surface: DisplaySurface,
        remote_camera: Option<Camera>,
    ) -> SplitResult<Self> {
        config.validate()?;
        let remote_camera =
            remote_camera.ok_or_else(|| SplitError::init("remote camera is missing"))?;
        if !renderer.has_scene(SceneId::Remote) {
            return Err(SplitError::init("remote scene is missing"));
        }

        let size = surface.target_size();
        let mut session = Self {
            registry: RenderTargetRegistry::new(
                config.remote.base_resolution,
                config.remote.resolution_divisor,
            ),
            pass: CompositorPass::new(&config.compositor),
            remote: RemoteSimulator::new(&config.remote, remote_camera),
            backbuffer: RenderTarget::new(BACKBUFFER, size),
            renderer,
            config,
            surface,
            remote_resync: false,
            frames: 0,
        };
        session.resize_targets(size);
        tracing::debug!(size = %size, "split session bound");
        Ok(session)
    }

    /// Tear the session down and return the host renderer.
    pub fn unbind(self) -> R {
        tracing::debug!(frames = self.frames, "split session unbound");
        self.renderer
    }

    fn resize_targets(&mut self, size: Size2) -> bool {
        let changed = self.registry.resize(size);
        self.pass.set_size(size);
        self.backbuffer.set_size(size);
        changed
    }

    fn resize_cascade(&mut self) -> Size2 {
        let size = self.surface.target_size();
        self.resize_targets(size);
        size
    }

    /// Surface resize in css pixels; the device pixel ratio is applied here.
    ///
    /// The remote camera is re-cloned from the local camera at the start of the next frame.
    pub fn resize(&mut self, css_width: f64, css_height: f64) -> Size2 {
        self.surface.set_css_size(css_width, css_height);
        self.remote_resync = true;
        self.resize_cascade()
    }

    /// Change the device pixel ratio and resize.
    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) -> Size2 {
        self.surface.set_pixel_ratio(pixel_ratio);
        self.resize_cascade()
    }

    /// Enter a stereo/XR presentation session, optionally with a known surface size.
    pub fn start_presentation(&mut self, size: Option<Size2>) -> Size2 {
        self.surface.begin_presentation(size);
        let size = self.resize_cascade();
        tracing::debug!(size = %size, "presentation session started");
        size
    }

    /// Leave the presentation session.
    pub fn end_presentation(&mut self) -> Size2 {
        self.surface.end_presentation();
        let size = self.resize_cascade();
        tracing::debug!(size = %size, "presentation session ended");
        size
    }

    /// Downscale the remote-capture target to `base_resolution / factor` (clamped to 1..=16).
    pub fn decrease_resolution(&mut self, factor: f32) -> Size2 {
        let size = self.registry.decrease_resolution(factor);
        self.config.remote.resolution_divisor = self.registry.remote_divisor();
        size
    }

    /// Drop a [`SplitSession::decrease_resolution`] override; remote-capture tracks the native
    /// size again.
    pub fn restore_resolution(&mut self) -> Size2 {
        self.registry.track_native_remote();
        self.config.remote.resolution_divisor = None;
        self.registry.remote().size()
    }

    /// Toggle asynchronous timewarp.
    pub fn set_do_async_time_warp(&mut self, on: bool) {
        self.config.compositor.do_async_time_warp = on;
    }

    /// Toggle border stretching.
    pub fn set_stretch_borders(&mut self, on: bool) {
        self.config.compositor.stretch_borders = on;
    }

    /// Change the remote tick rate.
    pub fn set_remote_fps(&mut self, fps: f64) {
        self.remote.set_fps(fps);
        self.config.remote.fps = self.remote.fps();
    }

    /// Change the simulated remote latency.
    pub fn set_remote_latency_ms(&mut self, latency_ms: f64) {
        self.remote.set_latency_ms(latency_ms);
        self.config.remote.latency_ms = latency_ms;
    }

    /// Change what the remote camera does with delayed poses.
    pub fn set_remote_pose_policy(&mut self, policy: RemotePosePolicy) {
        self.remote.set_policy(policy);
        self.config.remote.pose_policy = policy;
    }

    /// Per-frame tick at host time `t_ms` with the local camera at `local_world`.
    pub fn tick(&mut self, t_ms: f64, local_world: Mat4) -> Option<PoseRecord> {
        self.remote.tick(t_ms, local_world)
    }

    /// Render one frame: local capture, then the compositor pass into the true destination.
    #[tracing::instrument(level = "debug", skip_all, fields(frame = self.frames))]
    pub fn render_frame(&mut self, input: FrameInput<'_>) -> SplitResult<FrameStats> {
        let FrameInput { rig, destination } = input;

        if self.remote_resync {
            self.remote.sync_from_local(rig.head());
            self.remote_resync = false;
        }

        let size = match destination.as_deref() {
            Some(dest) => dest.size(),
            None => self.surface.target_size(),
        };
        let resized = self.resize_targets(size);

        let mode = StereoMode::detect(
            rig.cameras().len(),
            self.config.quirks.over_reports_camera_count,
        );
        let mono_rig;
        let local_rig = match mode {
            StereoMode::Stereo => rig,
            StereoMode::Mono => {
                mono_rig = CameraRig::Single(mono_camera(rig));
                &mono_rig
            }
        };

        let targets = self.registry.split_mut();
        self.renderer.render(SceneId::Local, local_rig, targets.local)?;

        self.pass.apply_config(&self.config.compositor);
        self.pass.set_has_dual_cameras(mode.is_stereo());

        let remote_rig = match mode {
            StereoMode::Stereo => {
                let remote_rig = rig.rebased(self.remote.camera().world);
                let (local, remote) = (rig.cameras(), remote_rig.cameras());
                self.pass
                    .set_camera_mats(local[0].snapshot(), Some(local[1].snapshot()));
                self.pass
                    .set_camera_mats_remote(remote[0].snapshot(), Some(remote[1].snapshot()));
                remote_rig
            }
            StereoMode::Mono => {
                let remote_camera = *self.remote.camera();
                self.pass.set_camera_mats(local_rig.head().snapshot(), None);
                self.pass.set_camera_mats_remote(remote_camera.snapshot(), None);
                CameraRig::Single(remote_camera)
            }
        };

        let destination = match destination {
            Some(dest) => dest,
            None => &mut self.backbuffer,
        };
        let pass = self.pass.render(
            &mut self.renderer,
            &remote_rig,
            self.registry.split_mut(),
            destination,
        )?;

        let stats = FrameStats::from_pass(self.frames, mode, resized, pass);
        self.frames += 1;
        Ok(stats)
    }

    /// Default destination used when a frame names none.
    pub fn backbuffer(&self) -> &RenderTarget {
        &self.backbuffer
    }

    /// The render-target registry.
    pub fn registry(&self) -> &RenderTargetRegistry {
        &self.registry
    }

    /// The compositor pass.
    pub fn pass(&self) -> &CompositorPass {
        &self.pass
    }

    /// Remote camera and pose path.
    pub fn remote(&self) -> &RemoteSimulator {
        &self.remote
    }

    /// Display surface state.
    pub fn surface(&self) -> &DisplaySurface {
        &self.surface
    }

    /// Live configuration, including runtime changes.
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// The host renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// The one view a mono frame is rendered and composed with: a rig's only camera, or its head
/// when it holds several (hosts that over-report their camera count).
fn mono_camera(rig: &CameraRig) -> Camera {
    match rig.cameras() {
        [only] => *only,
        _ => *rig.head(),
    }
}
