//! Cameras, per-frame matrix snapshots and stereo detection.

use smallvec::SmallVec;

use crate::foundation::core::{Mat4, Vec3};

/// A single view: camera-to-world transform plus projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Camera-to-world transform (the camera's pose).
    pub world: Mat4,
    /// Clip-from-view projection (OpenGL depth range).
    pub projection: Mat4,
}

impl Camera {
    /// Right-handed perspective camera at the origin looking down `-Z`.
    pub fn perspective(fovy_deg: f32, aspect: f32, near: f32, far: f32) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        Self {
            world: Mat4::IDENTITY,
            projection: Mat4::perspective_rh_gl(fovy_deg.to_radians(), aspect, near, far),
        }
    }

    /// Return the camera with its pose replaced.
    pub fn with_world(mut self, world: Mat4) -> Self {
        self.world = world;
        self
    }

    /// Return the camera placed at `eye` looking at `target` (`+Y` up).
    pub fn looking_at(self, eye: Vec3, target: Vec3) -> Self {
        self.with_world(Mat4::look_at_rh(eye, target, Vec3::Y).inverse())
    }

    /// World-to-camera transform.
    pub fn view(&self) -> Mat4 {
        self.world.inverse()
    }

    /// Capture this camera's matrices for the current frame.
    pub fn snapshot(&self) -> CameraMats {
        CameraMats {
            view: self.view(),
            projection: self.projection,
        }
    }
}

/// View and projection matrices captured once per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMats {
    /// World-to-camera transform.
    pub view: Mat4,
    /// Clip-from-view projection.
    pub projection: Mat4,
}

impl CameraMats {
    /// `projection * view`.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Matrices for every eye of one side (local or remote) of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EyeMats {
    /// One view covering the whole target.
    Mono(CameraMats),
    /// Left and right views, side by side.
    Stereo {
        /// Left eye.
        left: CameraMats,
        /// Right eye.
        right: CameraMats,
    },
}

impl EyeMats {
    /// Build from one or two snapshots (left then right).
    pub fn from_pair(left: CameraMats, right: Option<CameraMats>) -> Self {
        match right {
            Some(right) => Self::Stereo { left, right },
            None => Self::Mono(left),
        }
    }

    /// Matrices for eye `index`; a mono set answers every index with its single view.
    pub fn eye(&self, index: usize) -> CameraMats {
        match *self {
            Self::Mono(m) => m,
            Self::Stereo { left, right } => {
                if index == 0 {
                    left
                } else {
                    right
                }
            }
        }
    }

    /// Number of distinct views held.
    pub fn len(&self) -> usize {
        match self {
            Self::Mono(_) => 1,
            Self::Stereo { .. } => 2,
        }
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// The camera object a host renders with: a plain camera or a composite per-eye array.
#[derive(Clone, Debug, PartialEq)]
pub enum CameraRig {
    /// A single flat camera.
    Single(Camera),
    /// A composite (multi-view) camera: head pose plus its per-eye sub-cameras.
    Array {
        /// Head pose; eyes are expressed relative to it by [`CameraRig::rebased`].
        head: Camera,
        /// Per-eye cameras in left-then-right order.
        eyes: SmallVec<[Camera; 2]>,
    },
}

impl CameraRig {
    /// Composite rig from a head camera and its eyes.
    pub fn array(head: Camera, eyes: impl IntoIterator<Item = Camera>) -> Self {
        Self::Array {
            head,
            eyes: eyes.into_iter().collect(),
        }
    }

    /// Cameras actually used for rendering: the sub-cameras of a composite rig, or the single
    /// camera itself.
    pub fn cameras(&self) -> &[Camera] {
        match self {
            Self::Single(c) => std::slice::from_ref(c),
            Self::Array { eyes, .. } => eyes.as_slice(),
        }
    }

    /// Pose of the rig as a whole.
    pub fn head(&self) -> &Camera {
        match self {
            Self::Single(c) => c,
            Self::Array { head, .. } => head,
        }
    }

    /// Move the rig so its head sits at `head_world`, keeping each eye's offset from the head.
    pub fn rebased(&self, head_world: Mat4) -> Self {
        match self {
            Self::Single(c) => Self::Single(c.with_world(head_world)),
            Self::Array { head, eyes } => {
                let to_head = head.world.inverse();
                Self::Array {
                    head: head.with_world(head_world),
                    eyes: eyes
                        .iter()
                        .map(|e| e.with_world(head_world * to_head * e.world))
                        .collect(),
                }
            }
        }
    }
}

/// Mono or stereo composition, recomputed every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StereoMode {
    /// One eye covering the whole target.
    Mono,
    /// Two eyes, left half then right half.
    Stereo,
}

impl StereoMode {
    /// Decide from the number of cameras the host rendered with.
    ///
    /// `over_reports_camera_count` marks hosts that report two cameras for a single-view capture;
    /// for them the result is always mono.
    pub fn detect(camera_count: usize, over_reports_camera_count: bool) -> Self {
        if camera_count > 1 && !over_reports_camera_count {
            Self::Stereo
        } else {
            Self::Mono
        }
    }

    /// `true` for [`StereoMode::Stereo`].
    pub fn is_stereo(self) -> bool {
        self == Self::Stereo
    }
}

/// Horizontal span `(x0, width)` of eye `eye` in a target `target_width` pixels wide.
///
/// Eyes are laid out side by side; with an odd width the right eye gets the extra column.
pub fn eye_viewport(eye: u32, eye_count: u32, target_width: u32) -> (u32, u32) {
    if eye_count <= 1 {
        return (0, target_width);
    }
    let left = target_width / 2;
    if eye == 0 {
        (0, left.max(1))
    } else {
        (left, (target_width - left).max(1))
    }
}
