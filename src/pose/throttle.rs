use crate::config::REMOTE_FPS_RANGE;

// Hosts stepping their clock by exactly one interval must not be throttled by float rounding.
const SLACK_MS: f64 = 1e-6;

/// Gate that lets a per-frame callback run at most `fps` times per second.
///
/// The first tick always fires. Later ticks fire once at least `1000 / fps` ms have elapsed since
/// the last fired tick; elapsed time is measured from that tick, so slow host frames never cause
/// catch-up bursts.
#[derive(Clone, Debug)]
pub struct TickThrottle {
    fps: f64,
    interval_ms: f64,
    last_fired_ms: Option<f64>,
}

impl TickThrottle {
    /// Throttle at `fps`, clamped to the supported remote rate range.
    pub fn new(fps: f64) -> Self {
        let fps = clamp_fps(fps);
        Self {
            fps,
            interval_ms: 1000.0 / fps,
            last_fired_ms: None,
        }
    }

    /// Change the rate. The next tick fires unconditionally.
    pub fn set_fps(&mut self, fps: f64) {
        *self = Self::new(fps);
    }

    /// Current rate.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Minimum time between fired ticks.
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    /// Whether the callback should run at host time `t_ms`.
    pub fn should_fire(&mut self, t_ms: f64) -> bool {
        let fire = match self.last_fired_ms {
            None => true,
            Some(last) => t_ms - last >= self.interval_ms - SLACK_MS,
        };
        if fire {
            self.last_fired_ms = Some(t_ms);
        }
        fire
    }
}

fn clamp_fps(fps: f64) -> f64 {
    if fps.is_finite() {
        fps.clamp(*REMOTE_FPS_RANGE.start(), *REMOTE_FPS_RANGE.end())
    } else {
        *REMOTE_FPS_RANGE.end()
    }
}
