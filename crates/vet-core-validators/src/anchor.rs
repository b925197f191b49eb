//! Anchor ranges: where in the document a problem should be drawn.
//!
//! Two strategies exist because the validators report locations differently. `cue vet` ends
//! its report with `path:line:column`; `vela def vet` carries no coordinates, so a keyword
//! taken from the message is searched in the document text instead. Both fall back to
//! [`Document::full_range`] when nothing can be extracted.

use crate::patterns::{PatternList, PatternRule};
use regex::Regex;
use std::sync::LazyLock;
use vet_core::{Document, Position, TextRange};

static COORDINATE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(.+):(\d+):(\d+)\r?\n?$").expect("valid coordinate suffix regex")
});

/// Keyword rules for `vela def vet` messages, in priority order.
pub static VELA_KEYWORDS: LazyLock<PatternList> = LazyLock::new(|| {
    let rules = [
        // invalid type trit
        ("invalid-type", r"invalid type (.+)"),
        // Go struct field TraitDefinitionSpec.podDisruptive of type bool
        ("field-of-type", r"field [\w\.]+\.+(\w+) of type"),
        // test2.attributes.podDisruptive: reference "tru" not found
        ("reference-not-found", r#"reference "(.+)" not found"#),
        // json: unknown field "podDisruptive"
        ("unknown-field", r#"unknown field "(.+)""#),
    ];
    PatternList::new(
        rules
            .into_iter()
            .map(|(name, pattern)| PatternRule::new(name, pattern).expect("valid keyword regex"))
            .collect(),
    )
});

/// Parse a trailing `:<line>:<column>` (1-based) into a zero-based `(line, column)`.
pub fn coordinate_suffix(problem: &str) -> Option<(usize, usize)> {
    let caps = COORDINATE_SUFFIX.captures(problem)?;
    let line: usize = caps.get(2)?.as_str().parse().ok()?;
    let column: usize = caps.get(3)?.as_str().parse().ok()?;
    Some((line.saturating_sub(1), column.saturating_sub(1)))
}

/// The range from `(line, column)` to the end of that line's content.
///
/// The start is kept as reported even when it lies outside the document; the end never
/// precedes it.
pub fn line_tail_range(document: &dyn Document, line: usize, column: usize) -> TextRange {
    let end_column = document.line_len(line).max(column);
    TextRange::new(
        Position::new(line, column),
        Position::new(line, end_column),
    )
}

/// The span of the first textual occurrence of `keyword`.
///
/// When the keyword does not occur, the result is an empty range at `(0, 0)`.
pub fn keyword_range(document: &dyn Document, keyword: &str) -> TextRange {
    let text = document.text();
    let Some(byte_start) = text.find(keyword) else {
        return TextRange::empty(Position::new(0, 0));
    };

    let start = text[..byte_start].chars().count();
    let end = start + keyword.chars().count();
    document.range_between(start, end)
}

/// Coordinate-suffix strategy with whole-document fallback.
pub fn resolve_by_coordinates(document: &dyn Document, problem: &str) -> TextRange {
    match coordinate_suffix(problem) {
        Some((line, column)) => {
            tracing::trace!(line, column, "anchored by coordinate suffix");
            line_tail_range(document, line, column)
        }
        None => {
            tracing::trace!("no coordinate suffix, using whole document");
            document.full_range()
        }
    }
}

/// Keyword-locate strategy with whole-document fallback.
pub fn resolve_by_keyword(
    document: &dyn Document,
    problem: &str,
    keywords: &PatternList,
) -> TextRange {
    match keywords.first_match(problem) {
        Some(found) => {
            tracing::trace!(rule = found.rule, keyword = found.text, "anchored by keyword");
            keyword_range(document, found.text.trim_end())
        }
        None => {
            tracing::trace!("no keyword rule matched, using whole document");
            document.full_range()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vet_core::TextDocument;

    #[test]
    fn test_coordinate_suffix_is_one_based() {
        assert_eq!(coordinate_suffix("x:\n./dummy.cue:32:8"), Some((31, 7)));
        assert_eq!(coordinate_suffix("x:\n./dummy.cue:32:8\n"), Some((31, 7)));
        assert_eq!(coordinate_suffix("x:\n./dummy.cue:1:0"), Some((0, 0)));
    }

    #[test]
    fn test_coordinate_suffix_must_be_trailing() {
        assert_eq!(coordinate_suffix("./dummy.cue:32:8: trailing text"), None);
        assert_eq!(coordinate_suffix("no coordinates at all"), None);
    }

    #[test]
    fn test_line_tail_range_ends_at_line_content() {
        let doc = TextDocument::new("/x/a.cue", "a: 1\nfoo: bar\nz");
        let range = line_tail_range(&doc, 1, 5);
        assert_eq!(range.start, Position::new(1, 5));
        assert_eq!(range.end, Position::new(1, 8));
    }

    #[test]
    fn test_keyword_range_first_occurrence() {
        let doc = TextDocument::new("/x/a.cue", "tru: 1\nx: tru\n");
        let range = keyword_range(&doc, "tru");
        assert_eq!(range.start, Position::new(0, 0));
        assert_eq!(range.end, Position::new(0, 3));
    }

    #[test]
    fn test_keyword_range_counts_chars() {
        let doc = TextDocument::new("/x/a.cue", "// 注释\nkind: trit\n");
        let range = keyword_range(&doc, "trit");
        assert_eq!(range.start, Position::new(1, 6));
        assert_eq!(range.end, Position::new(1, 10));
    }

    #[test]
    fn test_keyword_priority_order() {
        let found = VELA_KEYWORDS
            .first_match(r#"a.b: reference "tru" not found; unknown field "zzz""#)
            .unwrap();
        assert_eq!(found.rule, "reference-not-found");
        assert_eq!(found.text, "tru");

        let found = VELA_KEYWORDS
            .first_match(
                "json: cannot unmarshal number into Go struct field \
                 WorkloadTypeDescriptor.workload.type of type string",
            )
            .unwrap();
        assert_eq!(found.rule, "field-of-type");
        assert_eq!(found.text, "type");
    }
}
