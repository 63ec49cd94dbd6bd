use std::path::{Path, PathBuf};

use serde_json::json;

use crate::color::Argb;
use crate::geometry::{Size, Vector3};
use crate::layout::{
    AlignmentError, AspectCorrection, BoxAlignment, alignment_translate, position_transform,
};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::render::{ElementHandle, TextHandle};

/// Default normalized font height of text elements, relative to output height.
const DEFAULT_FONT_SIZE: f32 = 0.1;

enum ElementKind {
    Image {
        handle: Box<dyn ElementHandle>,
        /// Last successfully loaded file; repeated applies of the same path
        /// skip the decode/upload.
        image_path: Option<PathBuf>,
        /// Stored but never rendered for image elements.
        text: String,
    },
    Text {
        handle: Box<dyn TextHandle>,
        /// Normalized font height, relative to output height.
        font_size: f32,
        font_correction: f32,
    },
}

/// One live visual element: the mutable attribute bag plus its renderer
/// handle. Instances live for exactly one reload generation.
pub struct ElementInstance {
    name: String,
    pub position: Vector3,
    pub max_size: Vector3,
    pub alignment: BoxAlignment,
    pub aspect: AspectCorrection,
    tag_color: Argb,
    kind: ElementKind,
}

impl ElementInstance {
    pub fn image(name: impl Into<String>, handle: Box<dyn ElementHandle>) -> Self {
        Self {
            name: name.into(),
            position: Vector3::new(0.5, 0.5, 0.0),
            max_size: Vector3::ONE,
            alignment: BoxAlignment::empty(),
            aspect: AspectCorrection::None,
            tag_color: Argb::random_tag(),
            kind: ElementKind::Image {
                handle,
                image_path: None,
                text: String::new(),
            },
        }
    }

    pub fn new_text(
        name: impl Into<String>,
        handle: Box<dyn TextHandle>,
        font_correction: f32,
    ) -> Self {
        Self {
            name: name.into(),
            position: Vector3::new(0.5, 0.5, 0.0),
            max_size: Vector3::ONE,
            alignment: BoxAlignment::empty(),
            aspect: AspectCorrection::TouchFromInside,
            tag_color: Argb::random_tag(),
            kind: ElementKind::Text {
                handle,
                font_size: DEFAULT_FONT_SIZE,
                font_correction,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag_color(&self) -> Argb {
        self.tag_color
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text { .. })
    }

    pub fn handle(&self) -> &dyn ElementHandle {
        match &self.kind {
            ElementKind::Image { handle, .. } => handle.as_ref(),
            ElementKind::Text { handle, .. } => handle.as_ref(),
        }
    }

    pub fn handle_mut(&mut self) -> &mut dyn ElementHandle {
        match &mut self.kind {
            ElementKind::Image { handle, .. } => handle.as_mut(),
            ElementKind::Text { handle, .. } => handle.as_mut(),
        }
    }

    pub fn text_handle_mut(&mut self) -> Option<&mut dyn TextHandle> {
        match &mut self.kind {
            ElementKind::Text { handle, .. } => Some(handle.as_mut()),
            ElementKind::Image { .. } => None,
        }
    }

    pub fn set_text(&mut self, text: &str) {
        match &mut self.kind {
            ElementKind::Image { text: stored, .. } => *stored = text.to_string(),
            ElementKind::Text { handle, .. } => handle.set_text(text),
        }
    }

    pub fn text(&self) -> String {
        match &self.kind {
            ElementKind::Image { text, .. } => text.clone(),
            ElementKind::Text { handle, .. } => handle.text(),
        }
    }

    /// Normalized font height; ignored by image elements.
    pub fn set_font_size_norm(&mut self, value: f32) {
        if let ElementKind::Text { font_size, .. } = &mut self.kind {
            *font_size = value;
        }
    }

    /// Re-layout a text element against the output resolution. Image
    /// elements have nothing to reflow.
    pub fn reflow(&mut self, resolution: Size) {
        if let ElementKind::Text {
            handle,
            font_size,
            font_correction,
        } = &mut self.kind
        {
            let px_width = (resolution.width as f32 * self.max_size.x) as u32;
            let px_height = (resolution.height as f32 * self.max_size.y) as u32;
            handle.set_font_size(resolution.height as f32 * *font_size * *font_correction);
            handle.reflow(px_width, px_height);
        }
    }

    /// Compute and apply scale and device position for the current
    /// attributes. Idempotent for unchanged attributes and resolution.
    pub fn fit(&mut self, resolution: Size) -> Result<(), AlignmentError> {
        self.reflow(resolution);
        let scale = self
            .handle()
            .scale_from_size_norm(self.max_size.x, self.max_size.y, self.aspect);
        let translate = alignment_translate(self.alignment, scale, self.max_size)?;
        let device = position_transform(self.position + translate);
        let handle = self.handle_mut();
        handle.set_scale(scale);
        handle.set_position(device);
        Ok(())
    }

    /// Decode an image file and upload it to the handle. Failures are
    /// logged and leave the previous texture in place; a reload never stops
    /// because one asset is missing.
    pub fn load_image(&mut self, file: &Path, logger: Option<&Logger>) {
        let ElementKind::Image {
            handle, image_path, ..
        } = &mut self.kind
        else {
            return;
        };
        if image_path.as_deref() == Some(file) {
            return;
        }
        let upload = image::open(file)
            .map_err(|err| err.to_string())
            .and_then(|decoded| {
                handle
                    .load_texture(&decoded.to_rgba8())
                    .map_err(|err| err.to_string())
            });
        match upload {
            Ok(()) => *image_path = Some(file.to_path_buf()),
            Err(err) => {
                if let Some(logger) = logger {
                    let _ = logger.log_event(event_with_fields(
                        LogLevel::Error,
                        "veneer::element",
                        "image_load_failed",
                        [
                            json_kv("element", json!(self.name)),
                            json_kv("file", json!(file.display().to_string())),
                            json_kv("error", json!(err)),
                        ],
                    ));
                }
            }
        }
    }

    /// Release the handle's GPU-side resources. Called for every instance
    /// of a generation before the registry is rebuilt.
    pub fn release(&mut self) {
        self.handle_mut().delete_texture();
    }
}
