use crate::camera::CameraRig;
use crate::foundation::error::SplitResult;
use crate::render::target::RenderTarget;

/// Which scene a render call draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneId {
    /// On-device content, rendered every frame at the current pose.
    Local,
    /// Stand-in for server-rendered content, drawn at the remote camera pose.
    Remote,
}

/// The host renderer seam.
///
/// Implementations draw a scene into a target, replacing its colour and depth. A composite rig
/// is drawn side by side, one eye per equal-width column span (see [`crate::eye_viewport`]).
/// Local scenes must clear to transparent colour and far depth so the local depth plane works as
/// a cutout mask.
pub trait SceneRenderer {
    /// Draw `scene` as seen from `rig` into `target`.
    fn render(
        &mut self,
        scene: SceneId,
        rig: &CameraRig,
        target: &mut RenderTarget,
    ) -> SplitResult<()>;

    /// Whether `scene` exists. Binding a session requires the remote scene.
    fn has_scene(&self, _scene: SceneId) -> bool {
        true
    }
}

impl<R: SceneRenderer + ?Sized> SceneRenderer for Box<R> {
    fn render(
        &mut self,
        scene: SceneId,
        rig: &CameraRig,
        target: &mut RenderTarget,
    ) -> SplitResult<()> {
        (**self).render(scene, rig, target)
    }

    fn has_scene(&self, scene: SceneId) -> bool {
        (**self).has_scene(scene)
    }
}
