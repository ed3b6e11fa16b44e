use crate::foundation::core::Size2;

/// Display surface and presentation-session state the render targets are sized from.
///
/// Outside a presentation session the size is the css size times the device pixel ratio. While
/// presenting, the presentation surface's size wins when it is known up front; otherwise it is
/// only discovered from the frame's destination target.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplaySurface {
    css_width: f64,
    css_height: f64,
    pixel_ratio: f64,
    presenting: bool,
    presentation_size: Option<Size2>,
}

impl DisplaySurface {
    /// Surface of `css_width` x `css_height` logical pixels at `pixel_ratio`.
    pub fn new(css_width: f64, css_height: f64, pixel_ratio: f64) -> Self {
        Self {
            css_width,
            css_height,
            pixel_ratio: sanitize_ratio(pixel_ratio),
            presenting: false,
            presentation_size: None,
        }
    }

    /// Change the logical size.
    pub fn set_css_size(&mut self, css_width: f64, css_height: f64) {
        self.css_width = css_width;
        self.css_height = css_height;
    }

    /// Change the device pixel ratio; non-positive or non-finite ratios become 1.
    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.pixel_ratio = sanitize_ratio(pixel_ratio);
    }

    /// Device pixel ratio.
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Size in device pixels, clamped to at least 1x1.
    pub fn device_size(&self) -> Size2 {
        Size2::from_device_px(
            self.css_width * self.pixel_ratio,
            self.css_height * self.pixel_ratio,
        )
    }

    /// Enter a stereo/XR presentation session. `size` is the presentation surface size when the
    /// host knows it in advance.
    pub fn begin_presentation(&mut self, size: Option<Size2>) {
        self.presenting = true;
        self.presentation_size = size;
    }

    /// Leave the presentation session.
    pub fn end_presentation(&mut self) {
        self.presenting = false;
        self.presentation_size = None;
    }

    /// Whether a presentation session is active.
    pub fn is_presenting(&self) -> bool {
        self.presenting
    }

    /// Size render targets should have before any destination is known.
    pub fn target_size(&self) -> Size2 {
        match (self.presenting, self.presentation_size) {
            (true, Some(size)) => size,
            _ => self.device_size(),
        }
    }
}

fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}
