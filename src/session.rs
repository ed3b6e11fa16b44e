/// The per-frame capture-then-composite function.
pub mod interceptor;
/// Display surface and presentation-session sizing.
pub mod surface;
