use pretty_assertions::assert_eq;
use vet_core::{Document, Position, TextDocument, TextRange};
use vet_core_validators::{CueVetProvider, ValidatorProvider, VelaVetProvider};

fn cue_document(lines: usize) -> TextDocument {
    let text: String = (0..lines)
        .map(|i| format!("field{i}: \"value number {i}\"\n"))
        .collect();
    TextDocument::new("/defs/dummy.cue", &text)
}

#[test]
fn test_cue_reference_not_found_end_to_end() {
    let provider = CueVetProvider::default();
    let doc = cue_document(40);
    let problem = "template.parameter.foo: reference \"boo\" not found:\n./dummy.cue:32:8";

    assert!(!provider.is_suppressed(problem));
    assert_eq!(
        provider.reduce_message(problem),
        "template.parameter.foo: reference \"boo\" not found"
    );

    let range = provider.resolve_range(&doc, problem);
    assert_eq!(range.start, Position::new(31, 7));
    assert_eq!(range.end, Position::new(31, doc.line_len(31)));
}

#[test]
fn test_cue_coordinates_map_to_zero_based_start() {
    let provider = CueVetProvider::default();
    let doc = cue_document(20);

    for (line, column) in [(1, 1), (5, 3), (12, 20), (20, 1)] {
        let problem = format!("a.b: incomplete value:\n    ./dummy.cue:{line}:{column}\n");
        let range = provider.resolve_range(&doc, &problem);
        assert_eq!(range.start, Position::new(line - 1, column - 1), "{problem}");
        assert!(range.start <= range.end);
    }
}

#[test]
fn test_cue_without_coordinates_uses_whole_document() {
    let provider = CueVetProvider::default();
    let doc = cue_document(10);
    let range = provider.resolve_range(&doc, "could not find a CUE module");

    // 10 lines plus the empty line after the trailing newline
    assert_eq!(
        range,
        TextRange::new(Position::new(0, 0), Position::new(10, 0))
    );
}

#[test]
fn test_cue_coordinates_ignore_non_newline_breaks() {
    let provider = CueVetProvider::default();
    let doc = TextDocument::new("/defs/a.cue", "a: \"x\u{0C}y\"\nb: 2\nc: 3\n");
    let range = provider.resolve_range(&doc, "c: conflicting values:\n    ./a.cue:3:1\n");

    assert_eq!(doc.line_count(), 4);
    assert_eq!(
        range,
        TextRange::new(Position::new(2, 0), Position::new(2, 4))
    );
}

#[test]
fn test_whole_document_range_counts_only_line_feeds() {
    let provider = CueVetProvider::default();
    let doc = TextDocument::new("/defs/a.cue", "a: \"x\u{2028}y\"\nb: 2\n");
    let range = provider.resolve_range(&doc, "could not find a CUE module");
    assert_eq!(range.end, Position::new(2, 0));
}

#[test]
fn test_vela_unknown_field_end_to_end() {
    let provider = VelaVetProvider::default();

    let mut text = "x".repeat(119);
    text.push('\n');
    text.push_str("podDisruptive: 1\n");
    let doc = TextDocument::new("/defs/dummy.cue", &text);

    let problem = "Error: failed to parse CUE: /x/dummy.cue: unknown field \"podDisruptive\"";

    assert_eq!(
        provider.reduce_message(problem),
        "unknown field \"podDisruptive\""
    );
    assert_eq!(
        provider.resolve_range(&doc, problem),
        TextRange::new(doc.position_at(120), doc.position_at(120 + 13))
    );
    assert_eq!(doc.position_at(120), Position::new(1, 0));
}

#[test]
fn test_vela_unknown_field_uses_first_occurrence() {
    let provider = VelaVetProvider::default();
    let doc = TextDocument::new(
        "/defs/dummy.cue",
        "attributes: {\n\tpodDisruptive: 1\n}\nother: podDisruptive\n",
    );
    let range = provider.resolve_range(
        &doc,
        "Error: failed to parse CUE: /defs/dummy.cue: invalid definition spec: json: unknown field \"podDisruptive\"",
    );
    assert_eq!(range.start, Position::new(1, 1));
    assert_eq!(range.end, Position::new(1, 14));
}

#[test]
fn test_vela_keyword_missing_from_text_is_empty_range_at_origin() {
    let provider = VelaVetProvider::default();
    let doc = TextDocument::new("/defs/dummy.cue", "a: 1\nb: 2\n");
    let range = provider.resolve_range(
        &doc,
        "Error: failed to parse CUE: /defs/dummy.cue: json: unknown field \"nowhere\"",
    );
    assert!(range.is_empty());
    assert_eq!(range.start, Position::new(0, 0));
}

#[test]
fn test_vela_struct_field_type_mismatch() {
    let provider = VelaVetProvider::default();
    let doc = TextDocument::new(
        "/defs/dummy.cue",
        "spec: {\n\tpodDisruptive: 3\n\tappliesToWorkloads: [\"*\"]\n}\n",
    );
    let problem = "Error: failed to parse CUE: /defs/dummy.cue: invalid definition spec: json: \
                   cannot unmarshal number into Go struct field TraitDefinitionSpec.podDisruptive of type bool";

    assert_eq!(
        provider.reduce_message(problem),
        "invalid definition spec: json: cannot unmarshal number into Go struct field \
         TraitDefinitionSpec.podDisruptive of type bool"
    );
    let range = provider.resolve_range(&doc, problem);
    assert_eq!(range.start, Position::new(1, 1));
    assert_eq!(range.end, Position::new(1, 14));
}

#[test]
fn test_reducers_are_idempotent() {
    let cue = CueVetProvider::default();
    let vela = VelaVetProvider::default();

    let problems = [
        "template.parameter.foo: reference \"boo\" not found:\n./dummy.cue:32:8",
        "Error: failed to parse CUE: /x/dummy.cue: unknown field \"podDisruptive\"",
        "plain message",
    ];
    for problem in problems {
        let reduced = cue.reduce_message(problem);
        assert_eq!(cue.reduce_message(&reduced), reduced);

        let reduced = vela.reduce_message(problem);
        assert_eq!(vela.reduce_message(&reduced), reduced);
    }
}

#[test]
fn test_only_cue_suppresses_incomplete_instances() {
    let advisory = "some instances are incomplete; use the -c flag to show errors or suppress this message";
    assert!(CueVetProvider::default().is_suppressed(advisory));
    assert!(!VelaVetProvider::default().is_suppressed(advisory));
}
