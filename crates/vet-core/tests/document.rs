use pretty_assertions::assert_eq;
use std::io::Write;
use vet_core::{Diagnostic, DiagnosticCollection, Document, Position, TextDocument, TextRange};

#[test]
fn test_open_reads_text_from_disk() {
    let mut file = tempfile::Builder::new().suffix(".cue").tempfile().unwrap();
    write!(file, "a: 1\nb: 2\n").unwrap();

    let doc = TextDocument::open(file.path()).unwrap();
    assert_eq!(doc.text(), "a: 1\nb: 2\n");
    assert_eq!(doc.line_count(), 3);
    assert!(doc.has_extension("cue"));
    assert!(doc.uri().starts_with("file://"));
    assert!(doc.uri().ends_with(".cue"));
}

#[test]
fn test_positions_count_chars_not_bytes() {
    let doc = TextDocument::new("/x/a.cue", "名前: \"x\"\nkind: 1");

    // "名前: \"x\"\n" is 8 chars
    assert_eq!(doc.position_at(8), Position::new(1, 0));
    assert_eq!(doc.offset_at(Position::new(1, 4)), 12);
    assert_eq!(doc.line_len(0), 7);
}

#[test]
fn test_range_between_clamps_past_end() {
    let doc = TextDocument::new("/x/a.cue", "abc\ndef");
    let range = doc.range_between(5, 500);

    assert_eq!(
        range,
        TextRange::new(Position::new(1, 1), Position::new(1, 3))
    );
}

#[cfg(unix)]
#[test]
fn test_collection_is_keyed_by_document_uri() {
    let first = TextDocument::new("/x/a.cue", "a");
    let second = TextDocument::new("/x/b.cue", "b");
    let mut collection = DiagnosticCollection::new("cue vet");

    collection.set(
        first.uri(),
        vec![Diagnostic::error(
            first.uri(),
            first.full_range(),
            "cue vet",
            "bad a",
        )],
    );
    collection.set(
        second.uri(),
        vec![Diagnostic::error(
            second.uri(),
            second.full_range(),
            "cue vet",
            "bad b",
        )],
    );
    collection.delete(&first.uri());

    let remaining: Vec<&str> = collection.iter().map(|(uri, _)| uri).collect();
    assert_eq!(remaining, vec!["file:///x/b.cue"]);
    assert_eq!(collection.get(&second.uri())[0].message, "bad b");
}
