//! Reference CPU scene renderer.
//!
//! Scenes are lists of axis-aligned rectangles facing `+Z`, ray-cast per pixel. This is enough to
//! exercise the split pipeline headless (parallax, occlusion, depth cutouts) without a GPU.

use rayon::prelude::*;

use crate::camera::{CameraRig, eye_viewport};
use crate::foundation::core::{Mat4, Rgba8Premul, Vec2, Vec3};
use crate::foundation::error::{SplitError, SplitResult};
use crate::foundation::math::{FAR_DEPTH, pixel_center_uv, project, unproject};
use crate::render::backend::{SceneId, SceneRenderer};
use crate::render::target::RenderTarget;

/// Surface colouring of a [`Quad`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    /// One colour.
    Solid(Rgba8Premul),
    /// Two-colour checkerboard with square cells of `cell` world units.
    Checker {
        /// Colour of even cells.
        a: Rgba8Premul,
        /// Colour of odd cells.
        b: Rgba8Premul,
        /// Cell edge length.
        cell: f32,
    },
}

impl Paint {
    fn at(&self, local: Vec2) -> Rgba8Premul {
        match *self {
            Self::Solid(c) => c,
            Self::Checker { a, b, cell } => {
                let cell = cell.max(1e-3);
                let ix = (local.x / cell).floor() as i64;
                let iy = (local.y / cell).floor() as i64;
                if (ix + iy).rem_euclid(2) == 0 { a } else { b }
            }
        }
    }
}

/// Rectangle in the plane `z = center.z`, facing `+Z`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    /// Centre in world space.
    pub center: Vec3,
    /// Half width and half height.
    pub half_extent: Vec2,
    /// Colouring.
    pub paint: Paint,
}

impl Quad {
    /// Solid rectangle of full size `size`.
    pub fn solid(center: Vec3, size: Vec2, color: Rgba8Premul) -> Self {
        Self {
            center,
            half_extent: size * 0.5,
            paint: Paint::Solid(color),
        }
    }

    fn hit(&self, origin: Vec3, dir: Vec3) -> Option<(f32, Rgba8Premul)> {
        if dir.z.abs() < 1e-9 {
            return None;
        }
        let t = (self.center.z - origin.z) / dir.z;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        let p = origin + dir * t;
        let local = Vec2::new(p.x - self.center.x, p.y - self.center.y);
        if local.x.abs() > self.half_extent.x || local.y.abs() > self.half_extent.y {
            return None;
        }
        Some((t, self.paint.at(local + self.half_extent)))
    }
}

/// A plane-based scene.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadScene {
    /// Clear colour; leave transparent for local scenes.
    pub background: Rgba8Premul,
    /// Scene content.
    pub quads: Vec<Quad>,
}

impl QuadScene {
    /// Empty scene.
    pub fn new(background: Rgba8Premul) -> Self {
        Self {
            background,
            quads: Vec::new(),
        }
    }

    /// Builder-style quad insertion.
    pub fn with_quad(mut self, quad: Quad) -> Self {
        self.quads.push(quad);
        self
    }

    /// Nearest hit along the segment `origin + dir * t`, `t` in `[0, 1]`.
    fn trace(&self, origin: Vec3, dir: Vec3) -> Option<(Vec3, Rgba8Premul)> {
        self.quads
            .iter()
            .filter_map(|q| q.hit(origin, dir))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, c)| (origin + dir * t, c))
    }

    /// Local demo content: one red box face in front of the viewer.
    pub fn demo_local() -> Self {
        Self::new(Rgba8Premul::TRANSPARENT).with_quad(Quad::solid(
            Vec3::new(0.0, 1.6, -10.0),
            Vec2::splat(5.0),
            Rgba8Premul::opaque_hex(0xFF0000),
        ))
    }

    /// Remote demo content: two boxes flanking the local box and a checkered backdrop.
    pub fn demo_remote() -> Self {
        let box_color = Rgba8Premul::opaque_hex(0x7074FF);
        Self::new(Rgba8Premul::opaque_hex(0xF06565))
            .with_quad(Quad::solid(
                Vec3::new(10.0, 1.6, -10.0),
                Vec2::splat(5.0),
                box_color,
            ))
            .with_quad(Quad::solid(
                Vec3::new(-10.0, 1.6, -10.0),
                Vec2::splat(5.0),
                box_color,
            ))
            .with_quad(Quad {
                center: Vec3::new(-6.0, 1.6, -50.0),
                half_extent: Vec2::new(96.0, 54.0),
                paint: Paint::Checker {
                    a: Rgba8Premul::opaque_hex(0xE8E8E8),
                    b: Rgba8Premul::opaque_hex(0x303040),
                    cell: 4.0,
                },
            })
    }
}

struct EyeRaster {
    x0: u32,
    width: u32,
    view_proj: Mat4,
    inv_view_proj: Mat4,
}

/// [`SceneRenderer`] over two [`QuadScene`]s.
#[derive(Clone, Debug)]
pub struct SoftwareRenderer {
    /// Scene drawn for [`SceneId::Local`].
    pub local: QuadScene,
    /// Scene drawn for [`SceneId::Remote`]; `None` models a host without a remote scene.
    pub remote: Option<QuadScene>,
}

impl SoftwareRenderer {
    /// Renderer with both scenes present.
    pub fn new(local: QuadScene, remote: QuadScene) -> Self {
        Self {
            local,
            remote: Some(remote),
        }
    }

    /// The demo scenes used by the CLI.
    pub fn demo() -> Self {
        Self::new(QuadScene::demo_local(), QuadScene::demo_remote())
    }

    fn scene(&self, scene: SceneId) -> Option<&QuadScene> {
        match scene {
            SceneId::Local => Some(&self.local),
            SceneId::Remote => self.remote.as_ref(),
        }
    }
}

impl SceneRenderer for SoftwareRenderer {
    fn render(
        &mut self,
        scene_id: SceneId,
        rig: &CameraRig,
        target: &mut RenderTarget,
    ) -> SplitResult<()> {
        let scene = self
            .scene(scene_id)
            .ok_or_else(|| SplitError::render(format!("no {scene_id:?} scene to render")))?;
        rasterize(scene, rig, target);
        Ok(())
    }

    fn has_scene(&self, scene: SceneId) -> bool {
        self.scene(scene).is_some()
    }
}

/// Draw `scene` from every camera of `rig` into `target`, side by side.
pub fn rasterize(scene: &QuadScene, rig: &CameraRig, target: &mut RenderTarget) {
    let size = target.size();
    let cameras = rig.cameras();
    let eye_count = cameras.len().max(1) as u32;
    let eyes: Vec<EyeRaster> = cameras
        .iter()
        .enumerate()
        .map(|(i, cam)| {
            let (x0, width) = eye_viewport(i as u32, eye_count, size.width);
            let view_proj = cam.snapshot().view_projection();
            EyeRaster {
                x0,
                width,
                view_proj,
                inv_view_proj: view_proj.inverse(),
            }
        })
        .collect();

    target.clear(scene.background);
    let depth_fmt = target.desc().depth;
    let background = scene.background.to_array();
    let row_px = size.width as usize;

    let shade_row = |y: usize, crow: &mut [u8], mut drow: Option<&mut [f32]>| {
        for eye in &eyes {
            for x in eye.x0..(eye.x0 + eye.width).min(size.width) {
                let uv = pixel_center_uv(x - eye.x0, y as u32, eye.width, size.height);
                let near = unproject(eye.inv_view_proj, uv, 0.0);
                let far = unproject(eye.inv_view_proj, uv, FAR_DEPTH);
                let (color, depth) = match scene.trace(near, far - near) {
                    Some((p, c)) => {
                        let d = project(eye.view_proj, p).map_or(FAR_DEPTH, |(_, d)| d);
                        (c.to_array(), d)
                    }
                    None => (background, FAR_DEPTH),
                };
                let xi = x as usize;
                crow[xi * 4..xi * 4 + 4].copy_from_slice(&color);
                if let (Some(d), Some(fmt)) = (drow.as_deref_mut(), depth_fmt) {
                    d[xi] = fmt.quantize(depth);
                }
            }
        }
    };

    let (color, depth) = target.planes_mut();
    match depth {
        Some(depth) => color
            .par_chunks_mut(row_px * 4)
            .zip(depth.par_chunks_mut(row_px))
            .enumerate()
            .for_each(|(y, (crow, drow))| shade_row(y, crow, Some(drow))),
        None => color
            .par_chunks_mut(row_px * 4)
            .enumerate()
            .for_each(|(y, crow)| shade_row(y, crow, None)),
    }
}
