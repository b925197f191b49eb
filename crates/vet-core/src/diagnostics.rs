//! Diagnostic records.
//!
//! A record is what a validator run publishes for a document: a short message anchored to a
//! [`TextRange`], plus related information pointing back at the same location. Renderers can
//! use it for problems panels, gutter markers and underlines.

use crate::position::TextRange;
use serde::Serialize;

/// Diagnostic severity. Validator failures are always errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Error diagnostics.
    Error,
}

/// A location related to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedInformation {
    /// URI of the document the location belongs to.
    pub uri: String,
    /// Range inside that document.
    pub range: TextRange,
    /// Message attached to the location.
    pub message: String,
}

/// A single diagnostic for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Anchor range in document coordinates.
    pub range: TextRange,
    /// Diagnostic severity.
    pub severity: DiagnosticSeverity,
    /// Label of the validator that produced the diagnostic (e.g. `"cue vet"`).
    pub source: String,
    /// Display message.
    pub message: String,
    /// Related locations.
    pub related_information: Vec<RelatedInformation>,
}

impl Diagnostic {
    /// Build an error diagnostic whose related information repeats its own location.
    pub fn error(
        uri: impl Into<String>,
        range: TextRange,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self {
            range,
            severity: DiagnosticSeverity::Error,
            source: source.into(),
            related_information: vec![RelatedInformation {
                uri: uri.into(),
                range,
                message: message.clone(),
            }],
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn test_error_repeats_location_in_related_information() {
        let range = TextRange::new(Position::new(31, 7), Position::new(31, 20));
        let diag = Diagnostic::error("file:///x/a.cue", range, "cue vet", "boom");

        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.related_information.len(), 1);
        assert_eq!(diag.related_information[0].range, range);
        assert_eq!(diag.related_information[0].message, "boom");
        assert_eq!(diag.related_information[0].uri, "file:///x/a.cue");
    }
}
