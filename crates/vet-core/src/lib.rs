#![warn(missing_docs)]
//! `vet-core` - headless document and diagnostics model for external validators.
//!
//! # Overview
//!
//! Command-line validators such as `cue vet` report problems as free text. The
//! `vet-core-validators` crate turns that text into position-anchored diagnostics; this crate
//! holds the pieces both sides agree on:
//!
//! - [`Document`] - read-only access to a buffer (path, text, offset/position conversion)
//! - [`TextDocument`] - an owned snapshot backed by a rope [`LineIndex`]
//! - [`Diagnostic`] - a published record (message, range, severity, source, related info)
//! - [`DiagnosticCollection`] - per-validator mapping from document URI to its diagnostics
//!
//! # Quick Start
//!
//! ```rust
//! use vet_core::{Diagnostic, DiagnosticCollection, Document, Position, TextDocument};
//!
//! let doc = TextDocument::new("/defs/webservice.cue", "parameter: {\n\timage: string\n}\n");
//! assert_eq!(doc.position_at(14), Position::new(1, 1));
//!
//! let mut collection = DiagnosticCollection::new("cue vet");
//! let range = doc.full_range();
//! collection.set(doc.uri(), vec![Diagnostic::error(doc.uri(), range, "cue vet", "boom")]);
//! assert_eq!(collection.get(&doc.uri()).len(), 1);
//! ```
//!
//! # Coordinates
//!
//! Lines and columns are zero-based; columns and offsets count Unicode scalar values.

pub mod collection;
pub mod diagnostics;
pub mod document;
pub mod line_index;
pub mod position;
pub mod uri;

pub use collection::{
    CollectionChange, CollectionChangeCallback, CollectionChangeType, DiagnosticCollection,
};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, RelatedInformation};
pub use document::{Document, TextDocument};
pub use line_index::LineIndex;
pub use position::{Position, TextRange};
pub use uri::path_to_file_uri;
