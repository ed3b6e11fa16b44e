/// Reference-rate pose delay line.
pub mod latency;
/// Remote camera plus its throttled pose path.
pub mod remote;
/// Fixed-rate tick gating.
pub mod throttle;
