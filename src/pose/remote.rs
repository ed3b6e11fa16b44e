//! Stand-in for the remote renderer's side of the pose path.

use crate::camera::Camera;
use crate::config::{RemoteConfig, RemotePosePolicy};
use crate::foundation::core::Mat4;
use crate::pose::latency::{PoseLatencyBuffer, PoseRecord};
use crate::pose::throttle::TickThrottle;

/// Remote camera plus the throttled latency buffer that feeds it delayed local poses.
#[derive(Clone, Debug)]
pub struct RemoteSimulator {
    camera: Camera,
    throttle: TickThrottle,
    buffer: PoseLatencyBuffer,
    policy: RemotePosePolicy,
    fired_ticks: u64,
    last_released: Option<PoseRecord>,
}

impl RemoteSimulator {
    /// Simulator for `camera` (the remote camera as first cloned from the local one).
    pub fn new(cfg: &RemoteConfig, camera: Camera) -> Self {
        Self {
            camera,
            throttle: TickThrottle::new(cfg.fps),
            buffer: PoseLatencyBuffer::new(cfg.latency_ms),
            policy: cfg.pose_policy,
            fired_ticks: 0,
            last_released: None,
        }
    }

    /// The remote camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Re-clone the remote camera from the local camera after a surface resize.
    ///
    /// With [`RemotePosePolicy::FollowDelayed`] the pose belongs to the delayed poses and only the
    /// projection is taken over.
    pub fn sync_from_local(&mut self, local: &Camera) {
        match self.policy {
            RemotePosePolicy::Static => self.camera = *local,
            RemotePosePolicy::FollowDelayed => self.camera.projection = local.projection,
        }
    }

    /// Delayed-pose policy in effect.
    pub fn policy(&self) -> RemotePosePolicy {
        self.policy
    }

    /// Change the delayed-pose policy.
    pub fn set_policy(&mut self, policy: RemotePosePolicy) {
        self.policy = policy;
    }

    /// Remote tick rate.
    pub fn fps(&self) -> f64 {
        self.throttle.fps()
    }

    /// Change the remote tick rate.
    pub fn set_fps(&mut self, fps: f64) {
        self.throttle.set_fps(fps);
    }

    /// Simulated latency.
    pub fn latency_ms(&self) -> f64 {
        self.buffer.latency_ms()
    }

    /// Change the simulated latency for subsequent ticks.
    pub fn set_latency_ms(&mut self, latency_ms: f64) {
        self.buffer.set_latency_ms(latency_ms);
    }

    /// The underlying delay line.
    pub fn buffer(&self) -> &PoseLatencyBuffer {
        &self.buffer
    }

    /// Remote ticks that passed the throttle.
    pub fn fired_ticks(&self) -> u64 {
        self.fired_ticks
    }

    /// Most recent delayed pose, if any has been released.
    pub fn last_released(&self) -> Option<&PoseRecord> {
        self.last_released.as_ref()
    }

    /// Host per-frame tick at time `t_ms` with the local camera at `local_world`.
    ///
    /// Returns the delayed pose released by this tick. Throttled ticks capture nothing.
    pub fn tick(&mut self, t_ms: f64, local_world: Mat4) -> Option<PoseRecord> {
        if !self.throttle.should_fire(t_ms) {
            return None;
        }
        self.fired_ticks += 1;
        let released = self.buffer.tick(local_world)?;
        if self.policy == RemotePosePolicy::FollowDelayed {
            self.camera.world = released.world;
        }
        self.last_released = Some(released);
        Some(released)
    }
}
