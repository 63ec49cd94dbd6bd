use std::str::FromStr;

use blake3::Hash;
use thiserror::Error;

use crate::color::Argb;
use crate::geometry::{Size, Vector3};

/// Structural failure while parsing a skin document.
///
/// Malformed *values* are never structural: the typed readers report those
/// per field by returning `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated section header at line {line}")]
    UnterminatedSectionHeader { line: usize },
}

#[derive(Debug, Clone)]
struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

/// A parsed skin definition document.
///
/// Sections and their entries keep declaration order; `[Sizes]` and
/// `[Sprites]` rely on it. Names and keys are case-sensitive. Unknown
/// sections and keys are kept but inert. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct Document {
    sections: Vec<Section>,
    content_hash: Hash,
}

impl Document {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut sections: Vec<Section> = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(rest) = line.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .ok_or(ParseError::UnterminatedSectionHeader { line: idx + 1 })?;
                sections.push(Section {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                continue;
            }
            let (key, value) = match line.split_once('=') {
                Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
                None => (line.to_string(), String::new()),
            };
            if sections.is_empty() {
                // Entries before the first header land in an unnamed section.
                sections.push(Section {
                    name: String::new(),
                    entries: Vec::new(),
                });
            }
            if let Some(section) = sections.last_mut() {
                section.entries.push((key, value));
            }
        }
        Ok(Self {
            sections,
            content_hash: blake3::hash(text.as_bytes()),
        })
    }

    /// Hash of the source text, used to suppress no-op reloads.
    pub fn content_hash(&self) -> Hash {
        self.content_hash
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s.name == name)
    }

    /// Key/value pairs of a section in declaration order; empty when the
    /// section is absent.
    pub fn section_entries(&self, name: &str) -> &[(String, String)] {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.entries.as_slice())
            .unwrap_or(&[])
    }

    /// Raw value lookup. The last occurrence of a duplicated key wins.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let section = self.sections.iter().find(|s| s.name == section)?;
        section
            .entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn read_string(&self, section: &str, key: &str, default: &str) -> String {
        self.get(section, key).unwrap_or(default).to_string()
    }

    pub fn read_float(&self, section: &str, key: &str) -> Option<f32> {
        self.get(section, key)?.parse().ok()
    }

    pub fn read_bool(&self, section: &str, key: &str) -> Option<bool> {
        parse_bool(self.get(section, key)?)
    }

    pub fn read_vector3(&self, section: &str, key: &str) -> Option<Vector3> {
        parse_vector3(self.get(section, key)?)
    }

    pub fn read_size(&self, section: &str, key: &str) -> Option<Size> {
        parse_size(self.get(section, key)?)
    }

    pub fn read_color(&self, section: &str, key: &str) -> Option<Argb> {
        Argb::from_css(self.get(section, key)?)
    }

    pub fn read_enum<T: FromStr>(&self, section: &str, key: &str) -> Option<T> {
        self.get(section, key)?.parse().ok()
    }
}

/// `x;y;z` with exactly three components; empty components read as `0`.
pub fn parse_vector3(value: &str) -> Option<Vector3> {
    let parts: Vec<&str> = value.split(';').collect();
    if parts.len() != 3 {
        return None;
    }
    let mut components = [0f32; 3];
    for (slot, part) in components.iter_mut().zip(&parts) {
        let part = part.trim();
        if !part.is_empty() {
            *slot = part.parse().ok()?;
        }
    }
    Some(Vector3::new(components[0], components[1], components[2]))
}

/// `width;height` with exactly two integer components.
pub fn parse_size(value: &str) -> Option<Size> {
    let (width, height) = value.split_once(';')?;
    if height.contains(';') {
        return None;
    }
    Some(Size::new(
        width.trim().parse().ok()?,
        height.trim().parse().ok()?,
    ))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
; skin definition
[Init]
AssetDir = assets
UsePlaceHolders = false

[Sizes]
small=800;600
large=1920;1080

[logo]
Position = 0.25;0.5;0
MaxSize = 0.5;0.4;1
";

    #[test]
    fn sections_and_keys_parse_in_order() {
        let doc = Document::parse(SAMPLE).unwrap();
        assert!(doc.has_section("Init"));
        assert!(doc.has_section("logo"));
        let sizes = doc.section_entries("Sizes");
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[0].0, "small");
        assert_eq!(sizes[1].0, "large");
    }

    #[test]
    fn read_string_falls_back_to_default() {
        let doc = Document::parse(SAMPLE).unwrap();
        assert_eq!(doc.read_string("Init", "AssetDir", ""), "assets");
        assert_eq!(doc.read_string("Init", "Missing", "fallback"), "fallback");
        assert_eq!(doc.read_string("NoSuchSection", "Key", "d"), "d");
    }

    #[test]
    fn section_names_are_case_sensitive() {
        let doc = Document::parse(SAMPLE).unwrap();
        assert!(!doc.has_section("init"));
    }

    #[test]
    fn unterminated_header_is_structural() {
        let err = Document::parse("[Init]\nA=1\n[broken\nB=2\n").unwrap_err();
        assert_eq!(err, ParseError::UnterminatedSectionHeader { line: 3 });
    }

    #[test]
    fn vector3_requires_three_components() {
        assert_eq!(
            parse_vector3("0.25;0.5;0"),
            Some(Vector3::new(0.25, 0.5, 0.0))
        );
        assert_eq!(parse_vector3("1;2"), None);
        assert_eq!(parse_vector3("1;2;3;4"), None);
        assert_eq!(parse_vector3(""), None);
        assert_eq!(parse_vector3("1;;3"), Some(Vector3::new(1.0, 0.0, 3.0)));
        assert_eq!(parse_vector3("a;b;c"), None);
    }

    #[test]
    fn size_requires_two_integers() {
        assert_eq!(parse_size("800;600"), Some(Size::new(800, 600)));
        assert_eq!(parse_size("800"), None);
        assert_eq!(parse_size("800;600;1"), None);
        assert_eq!(parse_size("800;six hundred"), None);
    }

    #[test]
    fn duplicate_keys_last_write_wins() {
        let doc = Document::parse("[s]\nk=1\nk=2\n").unwrap();
        assert_eq!(doc.read_string("s", "k", ""), "2");
    }

    #[test]
    fn malformed_typed_values_read_as_none() {
        let doc = Document::parse("[s]\nf=abc\nb=maybe\nv=1;2\n").unwrap();
        assert_eq!(doc.read_float("s", "f"), None);
        assert_eq!(doc.read_bool("s", "b"), None);
        assert_eq!(doc.read_vector3("s", "v"), None);
    }

    #[test]
    fn content_hash_tracks_text() {
        let a = Document::parse(SAMPLE).unwrap();
        let b = Document::parse(SAMPLE).unwrap();
        let c = Document::parse("[Init]\n").unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
    }
}
