//! Targeted spec-compliance tests for behaviour the encoder/decoder/roundtrip suites don't
//! already exercise: header grammar edge cases, delimiter scoping, strict-vs-non-strict
//! divergence, and dotted-path expansion's merge/collision rules.

use toon_core::{decode, encode, Delimiter, Options, PathExpansion, ToonObject, Value};

fn obj(pairs: &[(&str, Value)]) -> Value {
    Value::Object(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
}

fn s(text: &str) -> Value {
    Value::String(text.to_string())
}

// ============================================================================
// Header grammar (§4B)
// ============================================================================

#[test]
fn header_with_quoted_key() {
    let toon = "\"my key\"[2]: 1,2";
    let expected = obj(&[("my key", Value::Array(vec![Value::Int(1), Value::Int(2)]))]);
    assert_eq!(decode(toon, &Options::default()).unwrap(), expected);
}

#[test]
fn header_with_quoted_field_names() {
    let toon = "rows[1]{\"first name\",age}:\n  Ada,36";
    let expected = obj(&[(
        "rows",
        Value::Array(vec![obj(&[("first name", s("Ada")), ("age", Value::Int(36))])]),
    )]);
    assert_eq!(decode(toon, &Options::default()).unwrap(), expected);
}

#[test]
fn header_tab_delimiter_marker() {
    let toon = "items[2\t]: a\tb";
    let expected = obj(&[("items", Value::Array(vec![s("a"), s("b")]))]);
    assert_eq!(decode(toon, &Options::default()).unwrap(), expected);
}

#[test]
fn header_pipe_delimiter_scopes_quoting_to_the_override() {
    // §8 seed scenario 7: a comma inside the value is no longer special once the header
    // declares pipe as the active delimiter.
    let toon = "[2|]: Hello, World|Coordinates: 1,2\n";
    let options = Options::default().with_delimiter(Delimiter::Pipe);
    let expected = Value::Array(vec![s("Hello, World"), s("Coordinates: 1,2")]);
    assert_eq!(decode(toon, &options).unwrap(), expected);
}

#[test]
fn line_without_brackets_is_not_a_header() {
    // "key: value" must not be mistaken for a header just because it ends in other text.
    let toon = "note: see item[3] above";
    let expected = obj(&[("note", s("see item[3] above"))]);
    assert_eq!(decode(toon, &Options::default()).unwrap(), expected);
}

#[test]
fn colon_inside_quoted_key_does_not_end_the_header_early() {
    let toon = "\"a:b\"[1]: x";
    let expected = obj(&[("a:b", Value::Array(vec![s("x")]))]);
    assert_eq!(decode(toon, &Options::default()).unwrap(), expected);
}

// ============================================================================
// Strict vs. non-strict structural validation (§7)
// ============================================================================

#[test]
fn strict_rejects_tab_in_indent() {
    let toon = "a:\n\tb: 1";
    assert!(decode(toon, &Options::default()).is_err());
}

#[test]
fn strict_rejects_non_multiple_indent() {
    let toon = "a:\n b: 1";
    assert!(decode(toon, &Options::default()).is_err());
}

#[test]
fn strict_rejects_list_item_without_hyphen_space() {
    let toon = "items[1]:\n  not-a-hyphen-item";
    assert!(decode(toon, &Options::default()).is_err());
}

#[test]
fn strict_rejects_blank_line_inside_tabular_body() {
    let toon = "rows[2]{a}:\n  1\n\n  2";
    assert!(decode(toon, &Options::default()).is_err());
}

#[test]
fn non_strict_truncates_short_tabular_row() {
    let toon = "rows[1]{a,b,c}:\n  1,2";
    let options = Options::default().with_strict(false);
    let value = decode(toon, &options).unwrap();
    let row = value.as_object().unwrap().get("rows").unwrap().as_array().unwrap()[0]
        .as_object()
        .unwrap();
    assert_eq!(row.get("c").unwrap(), &s(""));
}

#[test]
fn non_strict_accepts_tab_in_indent() {
    let toon = "a:\n\tb: 1";
    let options = Options::default().with_strict(false);
    assert!(decode(toon, &options).is_ok());
}

#[test]
fn error_reports_one_based_line_number() {
    let toon = "a: 1\nb: 2\nc[2]: 1";
    let err = decode(toon, &Options::default()).unwrap_err();
    assert_eq!(err.line(), 3);
}

// ============================================================================
// Dotted-path expansion: merges and conflicts (§4D)
// ============================================================================

#[test]
fn expand_paths_deep_merges_nested_objects() {
    let toon = "a.b.x: 1\na.b.y: 2\na.c: 3";
    let options = Options::default().with_expand_paths(PathExpansion::Safe);
    let expected = obj(&[(
        "a",
        obj(&[
            ("b", obj(&[("x", Value::Int(1)), ("y", Value::Int(2))])),
            ("c", Value::Int(3)),
        ]),
    )]);
    assert_eq!(decode(toon, &options).unwrap(), expected);
}

#[test]
fn expand_paths_tabular_field_names_expand_too() {
    let toon = "rows[1]{a.b,a.c}:\n  1,2";
    let options = Options::default().with_expand_paths(PathExpansion::Safe);
    let expected = obj(&[(
        "rows",
        Value::Array(vec![obj(&[("a", obj(&[("b", Value::Int(1)), ("c", Value::Int(2))]))])]),
    )]);
    assert_eq!(decode(toon, &options).unwrap(), expected);
}

#[test]
fn expand_paths_off_ignores_dots_even_when_identifier_shaped() {
    let toon = "a.b: 1";
    assert_eq!(
        decode(toon, &Options::default()).unwrap(),
        obj(&[("a.b", Value::Int(1))])
    );
}

#[test]
fn expand_paths_quoted_tabular_field_name_is_never_expanded() {
    // A quoted field name containing dots passes through verbatim, even under
    // `expand_paths=safe` — same rule as an ordinary quoted object-field key.
    let toon = "rows[1]{\"a.b\",c}:\n  1,2";
    let options = Options::default().with_expand_paths(PathExpansion::Safe);
    let expected = obj(&[(
        "rows",
        Value::Array(vec![obj(&[("a.b", Value::Int(1)), ("c", Value::Int(2))])]),
    )]);
    assert_eq!(decode(toon, &options).unwrap(), expected);
}

#[test]
fn expand_paths_primitive_then_object_conflict_fails_strict() {
    let toon = "a.b: 1\na: 2";
    let options = Options::default().with_expand_paths(PathExpansion::Safe);
    assert!(decode(toon, &options).is_err());
}

// ============================================================================
// Key folding: collision guard and flatten_depth (§4E)
// ============================================================================

#[test]
fn key_folding_multi_hop_chain() {
    let value = obj(&[(
        "config",
        obj(&[("database", obj(&[("host", s("db.internal"))]))]),
    )]);
    let options = Options::default().with_key_folding(toon_core::KeyFolding::Safe);
    assert_eq!(encode(&value, &options), "config.database.host: db.internal\n");
}

#[test]
fn key_folding_stops_at_multi_key_object() {
    let value = obj(&[(
        "a",
        obj(&[("b", Value::Int(1)), ("c", Value::Int(2))]),
    )]);
    let options = Options::default().with_key_folding(toon_core::KeyFolding::Safe);
    // `a`'s child has two keys, so `a` itself can't fold away — but it has only one
    // child from the root's perspective, so it still folds one hop before it must stop:
    // actually `a` is a single top-level key whose value is a 2-key object, so folding
    // requires that value to be a single-key object, which it isn't.
    assert_eq!(encode(&value, &options), "a:\n  b: 1\n  c: 2\n");
}

#[test]
fn key_folding_requires_foldable_segment() {
    let value = obj(&[("my-key", obj(&[("child", Value::Int(1))]))]);
    let options = Options::default().with_key_folding(toon_core::KeyFolding::Safe);
    // `my-key` isn't a foldable segment (hyphen), so it's emitted normally.
    assert_eq!(encode(&value, &options), "\"my-key\":\n  child: 1\n");
}

// ============================================================================
// Array shapes: combined structural cases
// ============================================================================

#[test]
fn tabular_requires_identical_key_order_not_just_key_set() {
    let value = obj(&[(
        "items",
        Value::Array(vec![
            obj(&[("a", Value::Int(1)), ("b", Value::Int(2))]),
            obj(&[("b", Value::Int(3)), ("a", Value::Int(4))]),
        ]),
    )]);
    // Second row's keys are in a different order, so this can't be tabular.
    let toon = encode(&value, &Options::default());
    assert!(toon.contains("- a: 1"));
    assert!(toon.contains("- b: 3"));
}

#[test]
fn tabular_requires_all_primitive_values() {
    let value = obj(&[(
        "items",
        Value::Array(vec![
            obj(&[("a", Value::Int(1))]),
            obj(&[("a", Value::Array(vec![Value::Int(1)]))]),
        ]),
    )]);
    let toon = encode(&value, &Options::default());
    assert!(!toon.starts_with("items[2]{"));
}

#[test]
fn nested_tabular_array_as_first_field_of_list_item() {
    let value = obj(&[(
        "groups",
        Value::Array(vec![obj(&[
            ("members", Value::Array(vec![
                obj(&[("id", Value::Int(1)), ("name", s("Alice"))]),
                obj(&[("id", Value::Int(2)), ("name", s("Bob"))]),
            ])),
        ])]),
    )]);
    let toon = encode(&value, &Options::default());
    let expected = "groups[1]:\n  - members[2]{id,name}:\n    1,Alice\n    2,Bob\n";
    assert_eq!(toon, expected);
    assert_eq!(decode(&toon, &Options::default()).unwrap(), value);
}

// ============================================================================
// Array count invariants (§8.4)
// ============================================================================

#[test]
fn encoded_array_header_count_matches_element_count() {
    for len in [0usize, 1, 5, 12] {
        let value = obj(&[("xs", Value::Array((0..len as i64).map(Value::Int).collect()))]);
        let toon = encode(&value, &Options::default());
        let header = toon.lines().next().unwrap();
        assert!(header.starts_with(&format!("xs[{}]", len)), "header was {:?}", header);
    }
}

#[test]
fn array_count_mismatch_message_names_declared_and_found() {
    let err = decode("items[5]: 1,2,3", &Options::default()).unwrap_err();
    assert!(err.message().contains('5') && err.message().contains('3'));
}

// ============================================================================
// Misc encode/decode symmetry
// ============================================================================

#[test]
fn empty_array_has_no_trailing_space_after_colon() {
    let value = obj(&[("items", Value::Array(vec![]))]);
    assert_eq!(encode(&value, &Options::default()), "items[0]:\n");
}

#[test]
fn key_requiring_quoting_roundtrips() {
    let value = obj(&[("123", s("v")), ("has space", s("v2"))]);
    let toon = encode(&value, &Options::default());
    assert_eq!(decode(&toon, &Options::default()).unwrap(), value);
}

#[test]
fn empty_root_object_encodes_to_empty_document() {
    assert_eq!(encode(&Value::Object(ToonObject::new()), &Options::default()), "");
}

#[test]
fn empty_document_decodes_to_empty_object() {
    assert_eq!(
        decode("", &Options::default()).unwrap(),
        Value::Object(ToonObject::new())
    );
}
