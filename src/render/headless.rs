use std::sync::{Arc, Mutex};

use image::RgbaImage;

use crate::color::Argb;
use crate::error::Result;
use crate::geometry::{Size, Vector3};
use crate::layout::AspectCorrection;

use super::{ElementHandle, RenderBackend, TextHandle};

/// Recorded state of a headless handle, inspectable from tests and hosts.
#[derive(Debug, Clone)]
pub struct HandleState {
    pub position: Vector3,
    pub scale: Vector3,
    pub alpha: f32,
    pub visible: bool,
    pub tint: Option<Argb>,
    pub center: Vector3,
    /// Natural content size in normalized units, used by the scale query.
    pub natural_size: (f32, f32),
    /// Dimensions of the last uploaded texture.
    pub texture: Option<(u32, u32)>,
    pub texture_deletes: u32,
    pub font_name: String,
    pub font_size: f32,
    pub fore_color: Option<Argb>,
    pub back_color: Option<Argb>,
    pub text: String,
    /// Pixel box of the last reflow.
    pub reflow: Option<(u32, u32)>,
}

impl HandleState {
    fn new(natural_size: (f32, f32)) -> Self {
        Self {
            position: Vector3::ZERO,
            scale: Vector3::ONE,
            alpha: 1.0,
            visible: true,
            tint: None,
            center: Vector3::ZERO,
            natural_size,
            texture: None,
            texture_deletes: 0,
            font_name: String::new(),
            font_size: 0.0,
            fore_color: None,
            back_color: None,
            text: String::new(),
            reflow: None,
        }
    }
}

type SharedState = Arc<Mutex<HandleState>>;

/// In-memory backend that records every handle mutation.
///
/// Stands in for a real surface in tests, benches, and headless hosts; the
/// resolution is whatever the caller says it is.
pub struct HeadlessBackend {
    resolution: Size,
    aspect_policy: AspectCorrection,
    natural_size: (f32, f32),
    states: Vec<(String, SharedState)>,
    clears: Vec<Argb>,
    rendered: Vec<usize>,
    presents: u64,
}

impl HeadlessBackend {
    pub fn new(resolution: Size) -> Self {
        Self {
            resolution,
            aspect_policy: AspectCorrection::None,
            natural_size: (1.0, 1.0),
            states: Vec::new(),
            clears: Vec::new(),
            rendered: Vec::new(),
            presents: 0,
        }
    }

    /// Simulate a surface resize. The host still has to raise the resize
    /// signal; the backend only answers `resolution()`.
    pub fn set_resolution(&mut self, resolution: Size) {
        self.resolution = resolution;
    }

    /// Natural size assigned to handles created after this call.
    pub fn set_natural_size(&mut self, width: f32, height: f32) {
        self.natural_size = (width, height);
    }

    pub fn aspect_policy(&self) -> AspectCorrection {
        self.aspect_policy
    }

    pub fn created_count(&self) -> usize {
        self.states.len()
    }

    pub fn created_names(&self) -> Vec<String> {
        self.states.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Snapshot of the most recently created handle with the given name.
    pub fn state_of(&self, name: &str) -> Option<HandleState> {
        self.states
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, state)| state.lock().expect("handle state mutex poisoned").clone())
    }

    pub fn clears(&self) -> &[Argb] {
        &self.clears
    }

    /// Handle counts of each `render` call, in order.
    pub fn rendered(&self) -> &[usize] {
        &self.rendered
    }

    pub fn presents(&self) -> u64 {
        self.presents
    }

    fn new_handle(&mut self, name: &str) -> HeadlessHandle {
        let state = Arc::new(Mutex::new(HandleState::new(self.natural_size)));
        self.states.push((name.to_string(), Arc::clone(&state)));
        HeadlessHandle { state }
    }
}

impl RenderBackend for HeadlessBackend {
    fn resolution(&self) -> Size {
        self.resolution
    }

    fn set_aspect_policy(&mut self, mode: AspectCorrection) {
        self.aspect_policy = mode;
    }

    fn create_element(&mut self, name: &str) -> Box<dyn ElementHandle> {
        Box::new(self.new_handle(name))
    }

    fn create_text(&mut self, name: &str) -> Box<dyn TextHandle> {
        Box::new(self.new_handle(name))
    }

    fn clear(&mut self, color: Argb) -> Result<()> {
        self.clears.push(color);
        Ok(())
    }

    fn render(&mut self, handles: &[&dyn ElementHandle]) -> Result<()> {
        self.rendered.push(handles.len());
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.presents += 1;
        Ok(())
    }
}

struct HeadlessHandle {
    state: SharedState,
}

impl HeadlessHandle {
    fn with<T>(&self, f: impl FnOnce(&mut HandleState) -> T) -> T {
        f(&mut self.state.lock().expect("handle state mutex poisoned"))
    }
}

impl ElementHandle for HeadlessHandle {
    fn set_position(&mut self, position: Vector3) {
        self.with(|s| s.position = position);
    }

    fn set_scale(&mut self, scale: Vector3) {
        self.with(|s| s.scale = scale);
    }

    fn scale(&self) -> Vector3 {
        self.with(|s| s.scale)
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.with(|s| s.alpha = alpha);
    }

    fn set_visible(&mut self, visible: bool) {
        self.with(|s| s.visible = visible);
    }

    fn set_tint(&mut self, tint: Argb) {
        self.with(|s| s.tint = Some(tint));
    }

    fn set_center(&mut self, center: Vector3) {
        self.with(|s| s.center = center);
    }

    fn scale_from_size_norm(&self, max_x: f32, max_y: f32, mode: AspectCorrection) -> Vector3 {
        let (nat_w, nat_h) = self.with(|s| s.natural_size);
        if nat_w <= f32::EPSILON || nat_h <= f32::EPSILON {
            return Vector3::new(max_x, max_y, 1.0);
        }
        match mode {
            AspectCorrection::None => Vector3::new(max_x, max_y, 1.0),
            AspectCorrection::TouchFromInside => {
                let factor = (max_x / nat_w).min(max_y / nat_h);
                Vector3::new(nat_w * factor, nat_h * factor, 1.0)
            }
            AspectCorrection::TouchFromOutside => {
                let factor = (max_x / nat_w).max(max_y / nat_h);
                Vector3::new(nat_w * factor, nat_h * factor, 1.0)
            }
        }
    }

    fn load_texture(&mut self, pixels: &RgbaImage) -> Result<()> {
        self.with(|s| s.texture = Some(pixels.dimensions()));
        Ok(())
    }

    fn delete_texture(&mut self) {
        self.with(|s| {
            s.texture = None;
            s.texture_deletes += 1;
        });
    }
}

impl TextHandle for HeadlessHandle {
    fn set_font_name(&mut self, name: &str) {
        self.with(|s| s.font_name = name.to_string());
    }

    fn set_font_size(&mut self, device_px: f32) {
        self.with(|s| s.font_size = device_px);
    }

    fn set_fore_color(&mut self, color: Argb) {
        self.with(|s| s.fore_color = Some(color));
    }

    fn set_back_color(&mut self, color: Argb) {
        self.with(|s| s.back_color = Some(color));
    }

    fn set_text(&mut self, text: &str) {
        self.with(|s| s.text = text.to_string());
    }

    fn text(&self) -> String {
        self.with(|s| s.text.clone())
    }

    fn reflow(&mut self, px_width: u32, px_height: u32) {
        self.with(|s| s.reflow = Some((px_width, px_height)));
    }
}
