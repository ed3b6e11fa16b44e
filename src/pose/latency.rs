//! FIFO delay line over captured camera poses.
//!
//! The delay is counted in frames of a fixed reference rate ([`REFERENCE_HZ`]), not in the host's
//! actual frame delta, so tick jitter never changes how many poses are held back.

use std::collections::VecDeque;

use crate::foundation::core::Mat4;

/// Reference rate the configured latency is converted at.
pub const REFERENCE_HZ: f64 = 60.0;

/// One captured local-camera pose.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseRecord {
    /// Capture index, starting at 0 for the first pose ever pushed.
    pub seq: u64,
    /// Camera-to-world transform at capture time.
    pub world: Mat4,
}

/// Number of poses held back for `latency_ms`: `ceil(latency_ms / reference frame period)`.
///
/// Zero, negative and non-finite latencies hold nothing back.
pub fn queue_capacity(latency_ms: f64) -> usize {
    if !latency_ms.is_finite() || latency_ms <= 0.0 {
        return 0;
    }
    (latency_ms * REFERENCE_HZ / 1000.0).ceil() as usize
}

/// Delay line releasing at most one pose per tick, oldest first.
#[derive(Clone, Debug)]
pub struct PoseLatencyBuffer {
    queue: VecDeque<PoseRecord>,
    latency_ms: f64,
    capacity: usize,
    captured: u64,
}

impl PoseLatencyBuffer {
    /// Empty buffer for `latency_ms` of simulated round trip.
    pub fn new(latency_ms: f64) -> Self {
        Self {
            queue: VecDeque::with_capacity(queue_capacity(latency_ms) + 1),
            latency_ms,
            capacity: queue_capacity(latency_ms),
            captured: 0,
        }
    }

    /// Configured latency in milliseconds.
    pub fn latency_ms(&self) -> f64 {
        self.latency_ms
    }

    /// Change the latency for subsequent ticks.
    ///
    /// Queued poses stay queued. At most one pose leaves per tick, so a queue that grew under a
    /// higher latency keeps its length after the latency is lowered.
    pub fn set_latency_ms(&mut self, latency_ms: f64) {
        self.latency_ms = latency_ms;
        self.capacity = queue_capacity(latency_ms);
    }

    /// Steady-state queue length for the current latency.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Poses currently held.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// `true` when nothing is held.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Total poses captured so far.
    pub fn captured(&self) -> u64 {
        self.captured
    }

    /// Oldest held pose, the next to be released.
    pub fn peek(&self) -> Option<&PoseRecord> {
        self.queue.front()
    }

    /// Capture `world`, then release the oldest pose if the queue is longer than
    /// [`PoseLatencyBuffer::capacity`].
    pub fn tick(&mut self, world: Mat4) -> Option<PoseRecord> {
        self.queue.push_back(PoseRecord {
            seq: self.captured,
            world,
        });
        self.captured += 1;

        if self.queue.len() <= self.capacity {
            return None;
        }
        let released = self.queue.pop_front()?;
        tracing::trace!(
            seq = released.seq,
            held = self.queue.len(),
            capacity = self.capacity,
            "released delayed pose"
        );
        Some(released)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/latency.rs"]
mod tests;
