/// Host renderer seam.
pub mod backend;
/// Owner of the three frame targets.
pub mod registry;
/// Reference CPU renderer for plane-based scenes.
pub mod software;
/// CPU render targets.
pub mod target;
