//! Read-only document abstraction consumed by validators.
//!
//! The host owns its buffers; validation code only needs a path, the current text, and
//! conversions between linear offsets and [`Position`]s. [`TextDocument`] is an owned snapshot
//! implementing that contract on top of [`LineIndex`].

use crate::line_index::LineIndex;
use crate::position::{Position, TextRange};
use crate::uri::path_to_file_uri;
use std::path::{Path, PathBuf};

/// A source buffer under validation.
///
/// Offsets are character offsets (Unicode scalar values). Conversions clamp out-of-range input
/// instead of failing, so callers can feed them unchecked tool output.
pub trait Document: Send + Sync {
    /// Filesystem path of the document.
    fn path(&self) -> &Path;

    /// Full document text.
    fn text(&self) -> String;

    /// Number of lines (a trailing newline starts a final empty line).
    fn line_count(&self) -> usize;

    /// Length of `line` in characters, excluding its terminator.
    fn line_len(&self, line: usize) -> usize;

    /// Convert a position to a character offset.
    fn offset_at(&self, position: Position) -> usize;

    /// Convert a character offset to a position.
    fn position_at(&self, offset: usize) -> Position;

    /// Stable identity used to key diagnostic collections.
    fn uri(&self) -> String {
        path_to_file_uri(self.path())
    }

    /// Whether the file name ends with `.{extension}`.
    fn has_extension(&self, extension: &str) -> bool {
        self.path()
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.rsplit_once('.'))
            .is_some_and(|(stem, ext)| !stem.is_empty() && ext == extension)
    }

    /// The range spanning the whole document: `(0, 0)` to the start of the last line.
    fn full_range(&self) -> TextRange {
        let last_line = self.line_count().saturating_sub(1);
        TextRange::new(Position::new(0, 0), Position::new(last_line, 0))
    }

    /// The range between two character offsets.
    fn range_between(&self, start: usize, end: usize) -> TextRange {
        TextRange::new(self.position_at(start), self.position_at(end))
    }
}

/// An owned, immutable text snapshot of a document.
#[derive(Debug, Clone)]
pub struct TextDocument {
    path: PathBuf,
    version: u64,
    line_index: LineIndex,
}

impl TextDocument {
    /// Create a snapshot of `text` for `path` at version 0.
    pub fn new(path: impl Into<PathBuf>, text: &str) -> Self {
        Self::with_version(path, text, 0)
    }

    /// Create a snapshot with an explicit host version.
    pub fn with_version(path: impl Into<PathBuf>, text: &str, version: u64) -> Self {
        Self {
            path: path.into(),
            version,
            line_index: LineIndex::from_text(text),
        }
    }

    /// Read a snapshot from disk.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let text = std::fs::read_to_string(&path)?;
        Ok(Self::new(path, &text))
    }

    /// Host-provided version of this snapshot.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Produce the next snapshot of this document with new text.
    pub fn with_text(&self, text: &str) -> Self {
        Self::with_version(self.path.clone(), text, self.version.saturating_add(1))
    }
}

impl Document for TextDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn text(&self) -> String {
        self.line_index.get_text()
    }

    fn line_count(&self) -> usize {
        self.line_index.line_count()
    }

    fn line_len(&self, line: usize) -> usize {
        self.line_index.line_len_chars(line)
    }

    fn offset_at(&self, position: Position) -> usize {
        self.line_index
            .position_to_char_offset(position.line, position.column)
    }

    fn position_at(&self, offset: usize) -> Position {
        let (line, column) = self.line_index.char_offset_to_position(offset);
        Position::new(line, column)
    }
}
