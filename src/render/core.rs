use image::RgbaImage;

use crate::color::Argb;
use crate::error::Result;
use crate::geometry::{Size, Vector3};
use crate::layout::AspectCorrection;

/// Frame-level capability surface of a rendering backend.
///
/// The engine drives a backend exclusively from the tick thread: handle
/// creation during a reload, then clear/render/present once per tick.
/// Backends are not expected to be reentrant.
pub trait RenderBackend {
    /// Current output surface resolution in pixels.
    fn resolution(&self) -> Size;

    /// Surface-global aspect policy, applied by the backend when the
    /// window shape diverges from the reference shape.
    fn set_aspect_policy(&mut self, mode: AspectCorrection);

    fn create_element(&mut self, name: &str) -> Box<dyn ElementHandle>;

    fn create_text(&mut self, name: &str) -> Box<dyn TextHandle>;

    fn clear(&mut self, color: Argb) -> Result<()>;

    /// Draw the given handles in order.
    fn render(&mut self, handles: &[&dyn ElementHandle]) -> Result<()>;

    fn present(&mut self) -> Result<()>;
}

/// Per-element capability surface: one handle per live element instance.
///
/// Position and scale are in the backend's device space; the engine feeds
/// them from the fit calculus. `scale_from_size_norm` is the one query the
/// fit step needs back from the backend, because only the backend knows the
/// element's natural content size.
pub trait ElementHandle {
    fn set_position(&mut self, position: Vector3);

    fn set_scale(&mut self, scale: Vector3);

    fn scale(&self) -> Vector3;

    fn set_alpha(&mut self, alpha: f32);

    fn set_visible(&mut self, visible: bool);

    fn set_tint(&mut self, tint: Argb);

    fn set_center(&mut self, center: Vector3);

    /// Scale that fits the element's natural size into the normalized
    /// `max_x`×`max_y` box under the requested aspect policy.
    fn scale_from_size_norm(&self, max_x: f32, max_y: f32, mode: AspectCorrection) -> Vector3;

    fn load_texture(&mut self, pixels: &RgbaImage) -> Result<()>;

    /// Release the GPU-side resources. Must be safe to call repeatedly.
    fn delete_texture(&mut self);
}

/// Additional capabilities of text-rendering handles.
pub trait TextHandle: ElementHandle {
    fn set_font_name(&mut self, name: &str);

    /// Effective font size in device pixels.
    fn set_font_size(&mut self, device_px: f32);

    fn set_fore_color(&mut self, color: Argb);

    fn set_back_color(&mut self, color: Argb);

    fn set_text(&mut self, text: &str);

    fn text(&self) -> String;

    /// Re-layout the text into a pixel box.
    fn reflow(&mut self, px_width: u32, px_height: u32);
}
