//! Document identity.
//!
//! Diagnostic collections are keyed by the `file://` URI of the document path, so the same file
//! reached through different relative paths maps to one entry.

use std::fmt::Write as _;
use std::fs;
use std::path::{self, Path};

/// Build the `file://` URI identifying `path`.
///
/// Existing files are canonicalized; other paths are made absolute against the current
/// directory without touching the filesystem. The URI authority is always empty.
pub fn path_to_file_uri(path: &Path) -> String {
    let absolute = fs::canonicalize(path)
        .or_else(|_| path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf());

    let mut text = absolute.to_string_lossy().into_owned();
    if cfg!(windows) {
        text = text.replace('\\', "/");
    }

    let mut uri = String::with_capacity(text.len() + 8);
    uri.push_str("file://");
    if !text.starts_with('/') {
        uri.push('/');
    }
    for byte in text.bytes() {
        if is_path_safe(byte) {
            uri.push(char::from(byte));
        } else {
            let _ = write!(uri, "%{byte:02X}");
        }
    }
    uri
}

fn is_path_safe(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~' | b'/')
}
