//! Value-kind-dispatched encoder: [`Value`] to TOON text.
//!
//! Chooses among the three array shapes by introspecting each array's elements, folds
//! single-key object chains into dotted keys when `key_folding = safe`, and defers every
//! number/string/key canonicalisation decision to `options.rs` so the encoder and decoder
//! agree on what "needs quoting" means. Encoding never fails: every `Value` is already in
//! the supported domain by construction.

use crate::options::{
    encode_key, escape_string, format_float, format_int, is_foldable_segment, needs_quoting,
    Delimiter, KeyFolding, Options,
};
use crate::value::{ToonObject, Value};

/// Encodes `value` to its canonical TOON text under `options`.
pub fn encode(value: &Value, options: &Options) -> String {
    let mut out = String::new();
    match value {
        Value::Object(obj) => {
            if !obj.is_empty() {
                encode_object_fields(obj, 0, options, &mut out);
            }
        }
        Value::Array(arr) => encode_array_with_prefix("", arr, 0, options, &mut out),
        primitive => {
            out.push_str(&encode_primitive(primitive, options.delimiter.as_char()));
            out.push('\n');
        }
    }
    out
}

fn make_indent(depth: usize, indent_size: usize) -> String {
    " ".repeat(depth * indent_size)
}

/// Emits every field of `obj` at indentation `depth`, folding object-valued fields into
/// dotted keys first when `options.key_folding` allows it.
fn encode_object_fields(obj: &ToonObject, depth: usize, options: &Options, out: &mut String) {
    let siblings: Vec<&String> = obj.keys().collect();
    let indent = make_indent(depth, options.indent_size);
    for (key, value) in obj.iter() {
        if let Some((folded_key, folded_value)) = try_fold(key, value, &siblings, options) {
            encode_keyed_value_with_prefix(
                &indent, &folded_key, &folded_value, depth, depth + 1, options, out,
            );
        } else {
            encode_keyed_value_with_prefix(&indent, key, value, depth, depth + 1, options, out);
        }
    }
}

/// Emits `key: value` (or its array/object/folded forms), with `first_line_prefix` standing
/// in for the usual `depth`-computed indent on the first emitted line — this is what lets a
/// list item's first field share its line with the `- ` marker instead of getting its own.
/// `nested_object_depth` is where a nested (non-empty) object's own fields land: ordinary
/// fields use `depth + 1`, but a list item's first field uses `depth + 2` (see
/// `encode_list_item`) so its nested body doesn't land on the same line depth as the list
/// item's own sibling fields.
fn encode_keyed_value_with_prefix(
    first_line_prefix: &str,
    key: &str,
    value: &Value,
    depth: usize,
    nested_object_depth: usize,
    options: &Options,
    out: &mut String,
) {
    let key_enc = encode_key(key);
    match value {
        Value::Array(arr) => {
            let prefix = format!("{}{}", first_line_prefix, key_enc);
            encode_array_with_prefix(&prefix, arr, depth, options, out);
        }
        Value::Object(child) => {
            out.push_str(first_line_prefix);
            out.push_str(&key_enc);
            out.push_str(":\n");
            if !child.is_empty() {
                encode_object_fields(child, nested_object_depth, options, out);
            }
        }
        primitive => {
            out.push_str(first_line_prefix);
            out.push_str(&key_enc);
            out.push_str(": ");
            out.push_str(&encode_primitive(primitive, options.delimiter.as_char()));
            out.push('\n');
        }
    }
}

/// Tries to fold `(key, value)` into a single dotted-key line: `key` must be a foldable
/// segment, `value` a single-key object, and no sibling of `key` in the enclosing object may
/// start with `key + "."` (the collision guard — any such sibling would make the folded key
/// ambiguous with a literal dotted key under expansion). Walks further single-key hops while
/// `flatten_depth` allows, stopping at the first non-object, multi-key, non-foldable, or
/// depth-limited node and returning that node as the folded line's value.
fn try_fold(
    key: &str,
    value: &Value,
    siblings: &[&String],
    options: &Options,
) -> Option<(String, Value)> {
    if options.key_folding != KeyFolding::Safe {
        return None;
    }
    if !is_foldable_segment(key) {
        return None;
    }
    let Value::Object(obj) = value else {
        return None;
    };
    if obj.len() != 1 {
        return None;
    }
    let marker = format!("{}.", key);
    if siblings
        .iter()
        .any(|s| s.as_str() != key && s.starts_with(&marker))
    {
        return None;
    }

    let mut path = vec![key.to_string()];
    let mut current = value;
    loop {
        let Value::Object(cur_obj) = current else {
            break;
        };
        if cur_obj.len() != 1 {
            break;
        }
        let (child_key, child_value) = cur_obj.iter().next().expect("len checked above");
        if !is_foldable_segment(child_key) {
            break;
        }
        if path.len() + 1 > options.flatten_depth {
            break;
        }
        path.push(child_key.clone());
        current = child_value;
    }
    Some((path.join("."), current.clone()))
}

fn encode_primitive(value: &Value, active_delimiter: char) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Int(n) => format_int(*n),
        Value::Float(f) => {
            if f.is_finite() {
                format_float(*f)
            } else {
                "null".to_string()
            }
        }
        Value::String(s) => {
            if needs_quoting(s, active_delimiter, active_delimiter) {
                format!("\"{}\"", escape_string(s))
            } else {
                s.clone()
            }
        }
        Value::Array(_) | Value::Object(_) => {
            unreachable!("encode_primitive called on a non-primitive value")
        }
    }
}

enum Shape {
    Tabular(Vec<String>),
    InlinePrimitive,
    ExpandedList,
}

/// Array shape choice in priority order: tabular (homogeneous objects, identical key order,
/// all-primitive values) beats inline-primitive (every element a primitive) beats the
/// expanded-list fallback.
fn classify(arr: &[Value]) -> Shape {
    if let Value::Object(first) = &arr[0] {
        let field_names: Vec<&String> = first.keys().collect();
        // An empty key set can't produce a round-trippable tabular header (`[N]{}:` followed
        // by blank rows decodes back to zero rows) — fall through to the expanded-list form.
        let all_match = !field_names.is_empty()
            && arr.iter().all(|v| match v {
                Value::Object(o) => {
                    let keys: Vec<&String> = o.keys().collect();
                    keys == field_names && o.iter().all(|(_, val)| val.is_primitive())
                }
                _ => false,
            });
        if all_match {
            return Shape::Tabular(field_names.into_iter().cloned().collect());
        }
    }
    if arr.iter().all(Value::is_primitive) {
        return Shape::InlinePrimitive;
    }
    Shape::ExpandedList
}

fn header_text(count: usize, delimiter: Delimiter, fields: Option<&[String]>) -> String {
    let mut s = String::new();
    s.push('[');
    s.push_str(&count.to_string());
    if let Some(marker) = delimiter.header_marker() {
        s.push(marker);
    }
    s.push(']');
    if let Some(fields) = fields {
        s.push('{');
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                s.push(delimiter.as_char());
            }
            s.push_str(&encode_key(field));
        }
        s.push('}');
    }
    s
}

/// Emits a complete array (header plus body) with `prefix` standing in for whatever comes
/// before the header on its line: an indent, an indent plus encoded key, or an indent plus
/// `- ` for a bare nested array as a list item. `depth` is the header line's own depth; body
/// rows/items are written at `depth + 1`.
fn encode_array_with_prefix(
    prefix: &str,
    arr: &[Value],
    depth: usize,
    options: &Options,
    out: &mut String,
) {
    if arr.is_empty() {
        out.push_str(prefix);
        out.push_str(&header_text(0, options.delimiter, None));
        out.push_str(":\n");
        return;
    }

    match classify(arr) {
        Shape::Tabular(fields) => {
            out.push_str(prefix);
            out.push_str(&header_text(arr.len(), options.delimiter, Some(&fields)));
            out.push_str(":\n");
            let row_indent = make_indent(depth + 1, options.indent_size);
            for item in arr {
                let Value::Object(row) = item else {
                    unreachable!("classify guarantees every element is an Object")
                };
                out.push_str(&row_indent);
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push(options.delimiter.as_char());
                    }
                    let cell = row.get(field).expect("tabular row missing a header field");
                    out.push_str(&encode_primitive(cell, options.delimiter.as_char()));
                }
                out.push('\n');
            }
        }
        Shape::InlinePrimitive => {
            out.push_str(prefix);
            out.push_str(&header_text(arr.len(), options.delimiter, None));
            out.push_str(": ");
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(options.delimiter.as_char());
                }
                out.push_str(&encode_primitive(item, options.delimiter.as_char()));
            }
            out.push('\n');
        }
        Shape::ExpandedList => {
            out.push_str(prefix);
            out.push_str(&header_text(arr.len(), options.delimiter, None));
            out.push_str(":\n");
            let item_depth = depth + 1;
            let item_indent = make_indent(item_depth, options.indent_size);
            for item in arr {
                encode_list_item(&item_indent, item, item_depth, options, out);
            }
        }
    }
}

/// Emits one `- `-prefixed expanded-list item. An object item whose *first* field is itself
/// an array gets that array's header placed on the hyphen line (the tabular case the
/// reference behaviour specifies exactly; inline/list arrays follow the same placement here
/// for uniformity, the open-question resolution recorded in `DESIGN.md`). A first field whose
/// value is a nested *object* has its body indented one level deeper than usual (`depth + 2`
/// instead of `depth + 1`) so it doesn't land at the same depth as the item's own sibling
/// fields (emitted below at `depth + 1`) — the `- ` marker already claims one indent level
/// that an ordinary object field doesn't have to account for.
fn encode_list_item(indent: &str, item: &Value, depth: usize, options: &Options, out: &mut String) {
    match item {
        Value::Object(obj) if !obj.is_empty() => {
            let siblings: Vec<&String> = obj.keys().collect();
            let mut fields = obj.iter();
            let (first_key, first_value) = fields.next().expect("obj is non-empty");
            let hyphen_prefix = format!("{}- ", indent);

            if let Some((folded_key, folded_value)) = try_fold(first_key, first_value, &siblings, options)
            {
                encode_keyed_value_with_prefix(
                    &hyphen_prefix, &folded_key, &folded_value, depth, depth + 2, options, out,
                );
            } else {
                encode_keyed_value_with_prefix(
                    &hyphen_prefix, first_key, first_value, depth, depth + 2, options, out,
                );
            }

            let rest: ToonObject = fields.map(|(k, v)| (k.clone(), v.clone())).collect();
            if !rest.is_empty() {
                encode_object_fields(&rest, depth + 1, options, out);
            }
        }
        Value::Object(_) => {
            out.push_str(indent);
            out.push_str("-\n");
        }
        Value::Array(arr) => {
            let prefix = format!("{}- ", indent);
            encode_array_with_prefix(&prefix, arr, depth, options, out);
        }
        primitive => {
            out.push_str(indent);
            out.push_str("- ");
            out.push_str(&encode_primitive(primitive, options.delimiter.as_char()));
            out.push('\n');
        }
    }
}
