use crate::foundation::core::{Rgba8Premul, Size2, TargetId};
use crate::foundation::error::{SplitError, SplitResult};
use crate::foundation::math::FAR_DEPTH;

/// Sampling filter recorded on a target.
///
/// Only nearest sampling exists; filtering across texels would bleed between side-by-side eyes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    /// Nearest texel.
    Nearest,
}

/// Colour attachment format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorFormat {
    /// 8-bit premultiplied RGBA, tightly packed, row-major.
    Rgba8Premul,
}

/// Depth attachment format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DepthFormat {
    /// 16-bit normalized depth; written values are quantized to 1/65535 steps.
    Unorm16,
    /// Full precision depth.
    Float32,
}

impl DepthFormat {
    pub(crate) fn quantize(self, depth: f32) -> f32 {
        let d = if depth.is_nan() {
            FAR_DEPTH
        } else {
            depth.clamp(0.0, 1.0)
        };
        match self {
            Self::Unorm16 => (d * 65535.0).round() / 65535.0,
            Self::Float32 => d,
        }
    }
}

/// Static description of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetDesc {
    /// Debug name, used in logs.
    pub label: &'static str,
    /// Colour format.
    pub color: ColorFormat,
    /// Depth format, `None` for colour-only targets (e.g. a presentation surface).
    pub depth: Option<DepthFormat>,
    /// Sampling filter.
    pub filter: TextureFilter,
}

impl TargetDesc {
    /// Colour + 16-bit depth with nearest filtering.
    pub const fn color_depth(label: &'static str) -> Self {
        Self {
            label,
            color: ColorFormat::Rgba8Premul,
            depth: Some(DepthFormat::Unorm16),
            filter: TextureFilter::Nearest,
        }
    }

    /// Colour-only target.
    pub const fn color_only(label: &'static str) -> Self {
        Self {
            label,
            color: ColorFormat::Rgba8Premul,
            depth: None,
            filter: TextureFilter::Nearest,
        }
    }
}

/// CPU render target: premultiplied RGBA8 colour plus an optional depth plane.
///
/// Resizing discards the previous contents. Identity ([`RenderTarget::id`]) is stable across
/// resizes.
#[derive(Clone, Debug)]
pub struct RenderTarget {
    id: TargetId,
    desc: TargetDesc,
    size: Size2,
    color: Vec<u8>,
    depth: Option<Vec<f32>>,
    allocations: u64,
}

impl RenderTarget {
    /// Allocate a cleared target.
    pub fn new(desc: TargetDesc, size: Size2) -> Self {
        let mut target = Self {
            id: TargetId::next(),
            desc,
            size,
            color: Vec::new(),
            depth: None,
            allocations: 0,
        };
        target.allocate();
        target
    }

    fn allocate(&mut self) {
        let px = self.size.area();
        self.color = vec![0u8; px.saturating_mul(4)];
        self.depth = self.desc.depth.map(|_| vec![FAR_DEPTH; px]);
        self.allocations = self.allocations.saturating_add(1);
        tracing::debug!(
            label = self.desc.label,
            id = self.id.0,
            size = %self.size,
            "allocated render target"
        );
    }

    /// Resize to `size`. Returns `true` when storage was reallocated; identical sizes are a no-op.
    pub fn set_size(&mut self, size: Size2) -> bool {
        if size == self.size {
            return false;
        }
        self.size = size;
        self.allocate();
        true
    }

    /// Stable identity.
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Static description.
    pub fn desc(&self) -> TargetDesc {
        self.desc
    }

    /// Current pixel size.
    pub fn size(&self) -> Size2 {
        self.size
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Sampling filter.
    pub fn filter(&self) -> TextureFilter {
        self.desc.filter
    }

    /// Number of storage allocations made over the target's lifetime (1 after creation).
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Colour bytes, premultiplied RGBA8, row-major.
    pub fn color(&self) -> &[u8] {
        &self.color
    }

    /// Mutable colour bytes.
    pub fn color_mut(&mut self) -> &mut [u8] {
        &mut self.color
    }

    /// Depth plane, if the target has one.
    pub fn depth(&self) -> Option<&[f32]> {
        self.depth.as_deref()
    }

    /// Colour and depth planes borrowed mutably together.
    pub fn planes_mut(&mut self) -> (&mut [u8], Option<&mut [f32]>) {
        (&mut self.color, self.depth.as_deref_mut())
    }

    /// Fill colour with `clear` and depth with the far plane.
    pub fn clear(&mut self, clear: Rgba8Premul) {
        let px = clear.to_array();
        for c in self.color.chunks_exact_mut(4) {
            c.copy_from_slice(&px);
        }
        if let Some(depth) = self.depth.as_mut() {
            depth.fill(FAR_DEPTH);
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.size.width as usize) + (x as usize)
    }

    /// Colour at `(x, y)`. Coordinates must be in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y) * 4;
        [
            self.color[i],
            self.color[i + 1],
            self.color[i + 2],
            self.color[i + 3],
        ]
    }

    /// Depth at `(x, y)`; colour-only targets report the far plane.
    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        let i = self.index(x, y);
        self.depth.as_ref().map_or(FAR_DEPTH, |d| d[i])
    }

    /// Write colour (and depth, when present) at `(x, y)`.
    pub fn write(&mut self, x: u32, y: u32, color: [u8; 4], depth: f32) {
        let i = self.index(x, y);
        self.color[i * 4..i * 4 + 4].copy_from_slice(&color);
        if let (Some(fmt), Some(d)) = (self.desc.depth, self.depth.as_mut()) {
            d[i] = fmt.quantize(depth);
        }
    }

    /// Colour plane as an `image` buffer (premultiplied bytes, as stored).
    pub fn to_rgba_image(&self) -> SplitResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.size.width, self.size.height, self.color.clone())
            .ok_or_else(|| SplitError::render("colour plane does not match target size"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/target.rs"]
mod tests;
