use std::path::PathBuf;

use serde_json::{Value, json};

use crate::breakpoint::{Breakpoint, select_breakpoint};
use crate::color::Argb;
use crate::document::{Document, parse_size};
use crate::element::ElementInstance;
use crate::error::Result;
use crate::geometry::{Size, Vector3};
use crate::layout::AspectCorrection;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::render::{ElementHandle, RenderBackend};

/// Globals read from the `[Init]` section. This is the explicit reload
/// context: nothing here is ambient, it travels with the skin state.
#[derive(Debug, Clone)]
pub struct SkinGlobals {
    pub asset_dir: PathBuf,
    pub use_placeholders: bool,
    pub global_font_correction: f32,
    pub background: Argb,
}

impl Default for SkinGlobals {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::new(),
            use_placeholders: false,
            global_font_correction: 1.0,
            background: Argb::TRANSPARENT,
        }
    }
}

/// The live element registry and its document-driven lifecycle.
///
/// A full reload destroys every instance and handle and rebuilds the
/// registry from the freshly parsed document; a re-fit mutates instances in
/// place. All mutation happens on the tick thread.
pub struct SkinState {
    globals: SkinGlobals,
    document: Option<Document>,
    breakpoints: Vec<Breakpoint>,
    elements: Vec<ElementInstance>,
    current_breakpoint: String,
    resolution: Size,
    logger: Option<Logger>,
}

impl Default for SkinState {
    fn default() -> Self {
        Self {
            globals: SkinGlobals::default(),
            document: None,
            breakpoints: Vec::new(),
            elements: Vec::new(),
            current_breakpoint: String::new(),
            resolution: Size::default(),
            logger: None,
        }
    }
}

impl SkinState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_logger(&mut self, logger: Option<Logger>) {
        self.logger = logger;
    }

    pub fn globals(&self) -> &SkinGlobals {
        &self.globals
    }

    pub fn background(&self) -> Argb {
        self.globals.background
    }

    pub fn current_breakpoint(&self) -> &str {
        &self.current_breakpoint
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, name: &str) -> Option<&ElementInstance> {
        self.elements.iter().find(|e| e.name() == name)
    }

    pub fn element_names(&self) -> Vec<&str> {
        self.elements.iter().map(|e| e.name()).collect()
    }

    /// Handles in declaration order, for the frame's render call.
    pub fn handles(&self) -> Vec<&dyn ElementHandle> {
        self.elements.iter().map(|e| e.handle()).collect()
    }

    /// Rebuild the whole registry from a freshly parsed document.
    ///
    /// The previous generation is released first; the caller is expected to
    /// parse (and therefore validate) the document before getting here, so a
    /// rebuild only starts once there is something to rebuild from.
    pub fn load_from_document(
        &mut self,
        doc: Document,
        backend: &mut dyn RenderBackend,
    ) -> Result<()> {
        self.log(LogLevel::Info, "skin_reloading", std::iter::empty());
        self.clear();
        self.read_globals(&doc, backend);
        self.read_breakpoints(&doc);
        self.read_elements(&doc, backend);
        self.document = Some(doc);
        self.apply_attribute_sections(backend)
    }

    /// Re-select the breakpoint and re-apply attribute sections for the
    /// backend's current resolution, without destroying handles.
    pub fn refit(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        self.apply_attribute_sections(backend)
    }

    /// Push live text into a text element, reflowing immediately. Ignored
    /// in placeholder mode; unknown names are an error.
    pub fn set_text(&mut self, name: &str, text: &str) -> Result<()> {
        if self.globals.use_placeholders {
            return Ok(());
        }
        let resolution = self.resolution;
        let element = self
            .elements
            .iter_mut()
            .find(|e| e.name() == name)
            .ok_or_else(|| crate::error::SkinError::ElementNotFound(name.to_string()))?;
        if element.is_text() {
            element.set_text(text);
            element.reflow(resolution);
        }
        Ok(())
    }

    fn clear(&mut self) {
        for element in &mut self.elements {
            element.release();
        }
        self.elements.clear();
        self.breakpoints.clear();
    }

    fn read_globals(&mut self, doc: &Document, backend: &mut dyn RenderBackend) {
        self.globals.asset_dir = PathBuf::from(doc.read_string("Init", "AssetDir", ""));
        let policy = doc
            .read_enum("Init", "GlobalAspectCorrection")
            .unwrap_or(AspectCorrection::None);
        backend.set_aspect_policy(policy);
        // Background and font correction persist across reloads unless the
        // document successfully overrides them.
        if let Some(color) = doc.read_color("Init", "BGColor") {
            self.globals.background = color;
        }
        self.globals.use_placeholders = doc.read_bool("Init", "UsePlaceHolders").unwrap_or(false);
        if let Some(correction) = doc.read_float("Init", "GlobalFontCorrection") {
            self.globals.global_font_correction = correction;
        }
    }

    fn read_breakpoints(&mut self, doc: &Document) {
        for (name, value) in doc.section_entries("Sizes") {
            if let Some(size) = parse_size(value) {
                self.breakpoints
                    .push(Breakpoint::new(name.clone(), size.width, size.height));
            }
        }
    }

    fn read_elements(&mut self, doc: &Document, backend: &mut dyn RenderBackend) {
        for (name, kind) in doc.section_entries("Sprites") {
            if let Some(existing) = self.elements.iter().position(|e| e.name() == name) {
                self.log(
                    LogLevel::Warn,
                    "duplicate_element",
                    [json_kv("element", json!(name))],
                );
                let mut replaced = self.elements.remove(existing);
                replaced.release();
            }
            // Placeholder mode renders every element as a labeled text box.
            let as_text =
                self.globals.use_placeholders || kind.eq_ignore_ascii_case("text");
            let element = if as_text {
                ElementInstance::new_text(
                    name.clone(),
                    backend.create_text(name),
                    self.globals.global_font_correction,
                )
            } else {
                ElementInstance::image(name.clone(), backend.create_element(name))
            };
            self.elements.push(element);
        }
    }

    /// Apply `[name]` then `[name@breakpoint]` to every element and fit it.
    fn apply_attribute_sections(&mut self, backend: &mut dyn RenderBackend) -> Result<()> {
        self.resolution = backend.resolution();
        self.current_breakpoint =
            select_breakpoint(&self.breakpoints, self.resolution).to_string();
        self.log(
            LogLevel::Debug,
            "breakpoint_selected",
            [
                json_kv("breakpoint", json!(self.current_breakpoint)),
                json_kv("width", json!(self.resolution.width)),
                json_kv("height", json!(self.resolution.height)),
            ],
        );

        let Some(doc) = self.document.as_ref() else {
            return Ok(());
        };
        let globals = &self.globals;
        let logger = self.logger.as_ref();
        let resolution = self.resolution;
        let breakpoint = self.current_breakpoint.as_str();
        for element in &mut self.elements {
            let default_section = element.name().to_string();
            let override_section = format!("{default_section}@{breakpoint}");
            apply_section(doc, globals, logger, &default_section, element);
            apply_section(doc, globals, logger, &override_section, element);
            element.fit(resolution)?;
        }
        Ok(())
    }

    fn log(
        &self,
        level: LogLevel,
        message: &str,
        fields: impl IntoIterator<Item = (String, Value)>,
    ) {
        if let Some(logger) = self.logger.as_ref() {
            let _ = logger.log_event(event_with_fields(level, "veneer::skin", message, fields));
        }
    }
}

/// Apply one attribute section onto an element. Every attribute is
/// independent: a malformed or absent value leaves the current one in place.
fn apply_section(
    doc: &Document,
    globals: &SkinGlobals,
    logger: Option<&Logger>,
    section: &str,
    element: &mut ElementInstance,
) {
    if !doc.has_section(section) {
        return;
    }
    if let Some(logger) = logger {
        let _ = logger.log_event(event_with_fields(
            LogLevel::Debug,
            "veneer::skin",
            "section_applied",
            [
                json_kv("element", json!(element.name())),
                json_kv("section", json!(section)),
            ],
        ));
    }

    if let Some(v) = doc.read_vector3(section, "Position") {
        element.position = v;
    }
    if let Some(v) = doc.read_vector3(section, "Center") {
        element.handle_mut().set_center(v);
    }
    if let Some(v) = doc.read_float(section, "Alpha") {
        element.handle_mut().set_alpha(v);
    }
    if let Some(v) = doc.read_bool(section, "Visible") {
        element.handle_mut().set_visible(v);
    }
    if let Some(v) = doc.read_vector3(section, "MaxSize") {
        element.max_size = clamp_non_negative(v);
    }
    if let Some(v) = doc.read_enum(section, "Alignment") {
        element.alignment = v;
    }

    if globals.use_placeholders {
        // Labeled colored boxes, nothing read from the asset keys.
        let tag = element.tag_color();
        element.handle_mut().set_tint(tag);
        element.set_text(section);
        element.aspect = AspectCorrection::None;
        return;
    }

    if let Some(v) = doc.read_color(section, "Tint") {
        element.handle_mut().set_tint(v);
    }
    if let Some(v) = doc.read_enum(section, "AspectCorrection") {
        element.aspect = v;
    }

    if element.is_text() {
        if let Some(v) = doc.read_float(section, "FontSize") {
            element.set_font_size_norm(v);
        }
        if let Some(handle) = element.text_handle_mut() {
            if let Some(v) = doc.get(section, "FontName") {
                handle.set_font_name(v);
            }
            if let Some(v) = doc.get(section, "Text") {
                handle.set_text(v);
            }
            if let Some(v) = doc.read_color(section, "TextFColor") {
                handle.set_fore_color(v);
            }
            if let Some(v) = doc.read_color(section, "TextBColor") {
                handle.set_back_color(v);
            }
        }
    } else {
        let file = doc.read_string(section, "Image", "");
        if !file.is_empty() {
            let path = globals.asset_dir.join(file);
            element.load_image(&path, logger);
        }
    }
}

fn clamp_non_negative(v: Vector3) -> Vector3 {
    Vector3::new(v.x.max(0.0), v.y.max(0.0), v.z.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BoxAlignment;
    use crate::render::HeadlessBackend;

    const DOCUMENT: &str = "\
[Init]
AssetDir = assets
BGColor = #102030
GlobalFontCorrection = 1.5

[Sizes]
small=800;600
large=1920;1080

[Sprites]
logo=image
caption=text

[logo]
Position = 0.25;0.25;0
MaxSize = 0.5;0.5;1
Alignment = TopLeft

[logo@small]
Position = 0.5;0.5;0
Alignment = Center

[caption]
Text = hello
FontSize = 0.2
MaxSize = 1;0.2;1
";

    fn load(backend: &mut HeadlessBackend) -> SkinState {
        let mut skin = SkinState::new();
        skin.load_from_document(Document::parse(DOCUMENT).unwrap(), backend)
            .unwrap();
        skin
    }

    #[test]
    fn registry_builds_in_declaration_order() {
        let mut backend = HeadlessBackend::new(Size::new(2000, 1200));
        let skin = load(&mut backend);
        assert_eq!(skin.element_names(), vec!["logo", "caption"]);
        assert_eq!(skin.handles().len(), 2);
        assert!(!skin.element("logo").unwrap().is_text());
        assert!(skin.element("caption").unwrap().is_text());
    }

    #[test]
    fn init_globals_are_read() {
        let mut backend = HeadlessBackend::new(Size::new(2000, 1200));
        let skin = load(&mut backend);
        assert_eq!(skin.globals().asset_dir, PathBuf::from("assets"));
        assert_eq!(skin.background(), Argb::new(255, 16, 32, 48));
        assert!((skin.globals().global_font_correction - 1.5).abs() < 1e-6);
    }

    #[test]
    fn default_section_applies_above_defaults() {
        let mut backend = HeadlessBackend::new(Size::new(2000, 1200));
        let skin = load(&mut backend);
        let logo = skin.element("logo").unwrap();
        assert_eq!(logo.position, Vector3::new(0.25, 0.25, 0.0));
        assert_eq!(logo.alignment, BoxAlignment::TOP | BoxAlignment::LEFT);
        assert_eq!(skin.current_breakpoint(), "");
    }

    #[test]
    fn breakpoint_section_wins_over_default() {
        let mut backend = HeadlessBackend::new(Size::new(640, 480));
        let skin = load(&mut backend);
        assert_eq!(skin.current_breakpoint(), "small");
        let logo = skin.element("logo").unwrap();
        assert_eq!(logo.position, Vector3::new(0.5, 0.5, 0.0));
        assert_eq!(logo.alignment, BoxAlignment::empty());
    }

    #[test]
    fn refit_reselects_breakpoint_without_recreating_handles() {
        let mut backend = HeadlessBackend::new(Size::new(2000, 1200));
        let mut skin = load(&mut backend);
        assert_eq!(skin.current_breakpoint(), "");
        let created = backend.created_count();

        backend.set_resolution(Size::new(640, 480));
        skin.refit(&mut backend).unwrap();

        assert_eq!(skin.current_breakpoint(), "small");
        assert_eq!(backend.created_count(), created);
        assert_eq!(
            skin.element("logo").unwrap().position,
            Vector3::new(0.5, 0.5, 0.0)
        );
    }

    #[test]
    fn text_attributes_reach_the_text_handle() {
        let mut backend = HeadlessBackend::new(Size::new(1000, 500));
        let skin = load(&mut backend);
        let state = backend.state_of("caption").unwrap();
        assert_eq!(state.text, "hello");
        // height 500 × FontSize 0.2 × correction 1.5
        assert!((state.font_size - 150.0).abs() < 1e-3);
        assert_eq!(state.reflow, Some((1000, 100)));
        assert_eq!(skin.element("caption").unwrap().text(), "hello");
    }

    #[test]
    fn placeholder_mode_forces_labeled_text_boxes() {
        let doc = "\
[Init]
UsePlaceHolders = yes

[Sprites]
logo=image

[logo]
Tint = red
Image = logo.png
";
        let mut backend = HeadlessBackend::new(Size::new(1000, 500));
        let mut skin = SkinState::new();
        skin.load_from_document(Document::parse(doc).unwrap(), &mut backend)
            .unwrap();

        let logo = skin.element("logo").unwrap();
        assert!(logo.is_text());
        assert_eq!(logo.text(), "logo");
        assert_eq!(logo.aspect, AspectCorrection::None);

        let state = backend.state_of("logo").unwrap();
        // The tag color wins over the document tint, and no texture loads.
        assert_eq!(state.tint, Some(logo.tag_color()));
        assert_ne!(state.tint, Some(Argb::new(255, 255, 0, 0)));
        assert_eq!(state.texture, None);
    }

    #[test]
    fn duplicate_sprites_last_declaration_wins() {
        let doc = "\
[Sprites]
logo=image
logo=text
";
        let mut backend = HeadlessBackend::new(Size::new(1000, 500));
        let mut skin = SkinState::new();
        skin.load_from_document(Document::parse(doc).unwrap(), &mut backend)
            .unwrap();

        assert_eq!(skin.len(), 1);
        assert!(skin.element("logo").unwrap().is_text());
        // The replaced instance released its texture before dropping.
        assert_eq!(backend.created_count(), 2);
    }

    #[test]
    fn reload_releases_the_previous_generation() {
        let mut backend = HeadlessBackend::new(Size::new(1000, 500));
        let mut skin = load(&mut backend);
        skin.load_from_document(
            Document::parse("[Sprites]\nsolo=image\n").unwrap(),
            &mut backend,
        )
        .unwrap();

        assert_eq!(skin.element_names(), vec!["solo"]);
        // Old handles saw a delete before the registry dropped them.
        assert_eq!(backend.state_of("logo").unwrap().texture_deletes, 1);
    }

    #[test]
    fn malformed_fields_leave_attributes_untouched() {
        let doc = "\
[Sprites]
logo=image

[logo]
Position = 0.1;0.1;0
MaxSize = nope
Alpha = not-a-float
";
        let mut backend = HeadlessBackend::new(Size::new(1000, 500));
        let mut skin = SkinState::new();
        skin.load_from_document(Document::parse(doc).unwrap(), &mut backend)
            .unwrap();

        let logo = skin.element("logo").unwrap();
        assert_eq!(logo.position, Vector3::new(0.1, 0.1, 0.0));
        assert_eq!(logo.max_size, Vector3::ONE);
        assert!((backend.state_of("logo").unwrap().alpha - 1.0).abs() < 1e-6);
    }

    #[test]
    fn set_text_updates_and_reflows() {
        let mut backend = HeadlessBackend::new(Size::new(1000, 500));
        let mut skin = load(&mut backend);
        skin.set_text("caption", "frame 42").unwrap();
        assert_eq!(backend.state_of("caption").unwrap().text, "frame 42");
        assert!(skin.set_text("nope", "x").is_err());
        // Non-text targets are accepted and ignored.
        skin.set_text("logo", "x").unwrap();
    }

    #[test]
    fn negative_max_size_is_clamped() {
        let doc = "\
[Sprites]
logo=image

[logo]
MaxSize = -0.5;0.5;1
";
        let mut backend = HeadlessBackend::new(Size::new(1000, 500));
        let mut skin = SkinState::new();
        skin.load_from_document(Document::parse(doc).unwrap(), &mut backend)
            .unwrap();
        assert_eq!(
            skin.element("logo").unwrap().max_size,
            Vector3::new(0.0, 0.5, 1.0)
        );
    }
}
