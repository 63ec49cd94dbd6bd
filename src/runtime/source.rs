use std::fs;
use std::path::PathBuf;

use crate::document::Document;
use crate::error::Result;

/// Where reloads read the definition document from.
///
/// Loading re-reads the origin every time; the engine holds no cached copy
/// beyond the currently applied document.
pub trait DocumentSource {
    /// Human-readable origin for log events.
    fn describe(&self) -> String;

    fn load(&mut self) -> Result<Document>;
}

/// Reads the document from a file path.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&mut self) -> Result<Document> {
        let text = fs::read_to_string(&self.path)?;
        Ok(Document::parse(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_source_reads_and_parses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[Sprites]\nlogo=image").unwrap();
        let mut source = FileSource::new(file.path());
        let doc = source.load().unwrap();
        assert_eq!(doc.section_entries("Sprites").len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut source = FileSource::new("/definitely/not/here.skin");
        assert!(source.load().is_err());
    }
}
