pub(crate) mod blend;
/// The compositor pass.
pub mod pass;
pub(crate) mod reproject;
