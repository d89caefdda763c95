//! Recursive-descent decoder: TOON text to [`Value`].
//!
//! Root-form dispatch tries, in order, a pure array header, a header carrying inline values,
//! an object line (split-colon found), then falls back to a single primitive line. Object and
//! array bodies are driven by indentation depth read off the [`line_framer`] stream; the
//! split-colon scanner from `options.rs` is reused everywhere a line might be `key: value`.

use crate::error::{Result, ToonError};
use crate::header::{self, Header};
use crate::line_framer::{self, LineStream};
use crate::options::{
    find_closing_quote, find_split_colon, has_leading_zero, is_identifier, is_integer_token,
    looks_like_number_token, unescape_string, Delimiter, Options, PathExpansion,
};
use crate::value::{ToonObject, Value};

/// Decodes a full TOON document under `options`.
pub fn decode(input: &str, options: &Options) -> Result<Value> {
    let lines = line_framer::frame(input, options)?;
    let mut stream = LineStream::new(lines);
    stream.skip_blank();

    let first = match stream.peek() {
        Some(line) => line.clone(),
        None => return Ok(Value::Object(ToonObject::new())),
    };

    if let Some((header, rest)) = header::parse_header(&first.content) {
        stream.advance();
        let array = parse_array_value(&header, rest, &mut stream, 0, options, first.line_number)?;
        return Ok(match header.key {
            Some(key) => {
                let mut obj = ToonObject::new();
                assign_with_path(
                    &mut obj,
                    &key,
                    header.key_was_quoted,
                    Value::Array(array),
                    first.line_number,
                    options,
                )?;
                Value::Object(obj)
            }
            None => Value::Array(array),
        });
    }

    if find_split_colon(&first.content).is_some() {
        let obj = parse_object(&mut stream, 0, options)?;
        return Ok(Value::Object(obj));
    }

    let has_more = stream.any_non_blank_after_current();
    stream.advance();
    if has_more && options.strict {
        return Err(ToonError::new(first.line_number, "Missing colon after key."));
    }
    parse_primitive(first.content.trim(), first.line_number)
}

/// Parses an object whose fields sit at indentation depth `depth`, stopping at the first
/// line shallower than `depth` (or end of input).
fn parse_object(stream: &mut LineStream, depth: usize, options: &Options) -> Result<ToonObject> {
    let mut obj = ToonObject::new();
    loop {
        stream.skip_blank();
        let d = match stream.peek() {
            None => break,
            Some(line) => line.depth.expect("blank lines filtered by skip_blank"),
        };
        if d < depth {
            break;
        }
        if d > depth && options.strict {
            return Err(ToonError::new(
                stream.current_line_number(),
                "Invalid indentation",
            ));
        }
        // Non-strict: tolerate the stray indentation and treat the line as if it sat at
        // `depth`.

        let line = stream.advance().expect("peeked above");

        if let Some((header, rest)) = header::parse_header(&line.content) {
            if let Some(key) = header.key.clone() {
                let array =
                    parse_array_value(&header, rest, stream, d, options, line.line_number)?;
                assign_with_path(
                    &mut obj,
                    &key,
                    header.key_was_quoted,
                    Value::Array(array),
                    line.line_number,
                    options,
                )?;
                continue;
            }
        }

        let colon_idx = match find_split_colon(&line.content) {
            Some(i) => i,
            None => {
                if options.strict {
                    return Err(ToonError::new(line.line_number, "Missing colon after key."));
                }
                continue;
            }
        };

        let key_text = &line.content[..colon_idx];
        let value_text = line.content[colon_idx + 1..].trim();
        let (key, was_quoted) = decode_key(key_text, line.line_number)?;

        let value = if value_text.is_empty() {
            match stream.peek() {
                Some(next) if next.depth.is_some_and(|nd| nd > d) => {
                    Value::Object(parse_object(stream, d + 1, options)?)
                }
                _ => Value::Object(ToonObject::new()),
            }
        } else {
            parse_primitive(value_text, line.line_number)?
        };

        assign_with_path(&mut obj, &key, was_quoted, value, line.line_number, options)?;
    }
    Ok(obj)
}

/// Splits `key_text` into `(key, was_quoted)`, unescaping a quoted key.
fn decode_key(key_text: &str, line_number: usize) -> Result<(String, bool)> {
    let trimmed = key_text.trim();
    if let Some(b'"') = trimmed.as_bytes().first() {
        let close = find_closing_quote(trimmed, 0)
            .ok_or_else(|| ToonError::new(line_number, "Unterminated string"))?;
        if close != trimmed.len() - 1 {
            return Err(ToonError::new(line_number, "Invalid token after quoted key"));
        }
        let unescaped =
            unescape_string(&trimmed[1..close]).map_err(|msg| ToonError::new(line_number, msg))?;
        Ok((unescaped, true))
    } else {
        Ok((trimmed.to_string(), false))
    }
}

/// Assigns `(key, value)` into `obj` via set-with-path: always the merge semantics of
/// [`merge_leaf`], additionally splitting `key` on `.` first when dotted-path expansion
/// applies (unquoted, identifier-with-dots key, `expand_paths = safe`).
fn assign_with_path(
    obj: &mut ToonObject,
    key: &str,
    was_quoted: bool,
    value: Value,
    line_number: usize,
    options: &Options,
) -> Result<()> {
    let expandable = options.expand_paths == PathExpansion::Safe
        && !was_quoted
        && key.contains('.')
        && is_identifier(key);
    if expandable {
        let segments: Vec<&str> = key.split('.').collect();
        set_with_path(obj, &segments, value, line_number, options)
    } else {
        merge_leaf(obj, key.to_string(), value, line_number, options)
    }
}

fn set_with_path(
    obj: &mut ToonObject,
    segments: &[&str],
    value: Value,
    line_number: usize,
    options: &Options,
) -> Result<()> {
    let (head, rest) = segments
        .split_first()
        .expect("segments is never empty: key.split('.') on a key containing '.'");
    if rest.is_empty() {
        return merge_leaf(obj, (*head).to_string(), value, line_number, options);
    }
    match obj.get_mut(head) {
        Some(Value::Object(child)) => set_with_path(child, rest, value, line_number, options),
        Some(_) => {
            if options.strict {
                Err(ToonError::new(
                    line_number,
                    format!("Expansion conflict at path '{}' (object vs primitive)", head),
                ))
            } else {
                let mut child = ToonObject::new();
                set_with_path(&mut child, rest, value, line_number, options)?;
                obj.insert((*head).to_string(), Value::Object(child));
                Ok(())
            }
        }
        None => {
            let mut child = ToonObject::new();
            set_with_path(&mut child, rest, value, line_number, options)?;
            obj.insert((*head).to_string(), Value::Object(child));
            Ok(())
        }
    }
}

/// Collision rules for assigning `value` at `key` in `obj`: object-vs-object deep-merges;
/// object-vs-primitive fails in strict mode and replaces otherwise; anything else replaces.
fn merge_leaf(
    obj: &mut ToonObject,
    key: String,
    value: Value,
    line_number: usize,
    options: &Options,
) -> Result<()> {
    if let Some(existing) = obj.get(&key) {
        match (existing, &value) {
            (Value::Object(e), Value::Object(v)) => {
                let merged = deep_merge(e.clone(), v.clone());
                obj.insert(key, Value::Object(merged));
                return Ok(());
            }
            (Value::Object(_), _) | (_, Value::Object(_)) => {
                if options.strict {
                    return Err(ToonError::new(
                        line_number,
                        format!("Expansion conflict at path '{}' (object vs primitive)", key),
                    ));
                }
                obj.insert(key, value);
                return Ok(());
            }
            _ => {}
        }
    }
    obj.insert(key, value);
    Ok(())
}

/// Deep-merge: same key with both sides objects recurses; otherwise the incoming value wins.
fn deep_merge(mut base: ToonObject, incoming: ToonObject) -> ToonObject {
    for (key, value) in incoming {
        match (base.get(&key).cloned(), value) {
            (Some(Value::Object(b)), Value::Object(i)) => {
                base.insert(key, Value::Object(deep_merge(b, i)));
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
    base
}

/// Dispatches a parsed header to the shape its trailing text/body implies: tabular (has
/// `{fields}`), inline primitive (no fields, non-empty trailing text), or expanded list
/// (no fields, empty trailing text — body follows at `header_depth + 1`).
fn parse_array_value(
    header: &Header,
    rest: String,
    stream: &mut LineStream,
    header_depth: usize,
    options: &Options,
    header_line: usize,
) -> Result<Vec<Value>> {
    if let Some(fields) = &header.fields {
        let fields_quoted = header
            .fields_quoted
            .as_deref()
            .expect("fields_quoted is Some whenever fields is Some");
        parse_tabular_body(
            fields,
            fields_quoted,
            header.count,
            header.delimiter,
            stream,
            header_depth,
            options,
            header_line,
        )
    } else if !rest.trim().is_empty() {
        parse_inline_values(&rest, header.count, header.delimiter, options, header_line)
    } else {
        parse_list_body(header.count, stream, header_depth, options, header_line)
    }
}

fn parse_inline_values(
    rest: &str,
    count: usize,
    delimiter: Delimiter,
    options: &Options,
    header_line: usize,
) -> Result<Vec<Value>> {
    let trimmed = rest.trim();
    let tokens: Vec<String> = if trimmed.is_empty() {
        Vec::new()
    } else {
        split_delimited(trimmed, delimiter.as_char())
            .into_iter()
            .map(|t| t.trim().to_string())
            .collect()
    };
    if tokens.len() != count && options.strict {
        return Err(ToonError::new(
            header_line,
            format!(
                "Inline array length mismatch. Header declared {}, found {}.",
                count,
                tokens.len()
            ),
        ));
    }
    tokens
        .iter()
        .map(|t| parse_primitive(t, header_line))
        .collect()
}

fn parse_tabular_body(
    fields: &[String],
    fields_quoted: &[bool],
    count: usize,
    delimiter: Delimiter,
    stream: &mut LineStream,
    header_depth: usize,
    options: &Options,
    header_line: usize,
) -> Result<Vec<Value>> {
    let body_depth = header_depth + 1;
    let mut rows = Vec::new();
    loop {
        if !consume_body_blank_lines(stream, body_depth, options)? {
            break;
        }
        let at_body_depth = matches!(stream.peek(), Some(l) if l.depth == Some(body_depth));
        if !at_body_depth {
            break;
        }
        let line = stream.advance().expect("peeked above");
        let mut tokens: Vec<String> = split_delimited(line.content.trim(), delimiter.as_char())
            .into_iter()
            .map(|t| t.trim().to_string())
            .collect();
        if tokens.len() != fields.len() {
            if options.strict {
                return Err(ToonError::new(
                    line.line_number,
                    format!(
                        "Tabular row width mismatch. Expected {} fields, found {}.",
                        fields.len(),
                        tokens.len()
                    ),
                ));
            }
            tokens.resize(fields.len(), String::new());
        }
        let mut row = ToonObject::new();
        for ((field, was_quoted), token) in fields.iter().zip(fields_quoted.iter()).zip(tokens.iter()) {
            let value = parse_primitive(token, line.line_number)?;
            assign_with_path(&mut row, field, *was_quoted, value, line.line_number, options)?;
        }
        rows.push(Value::Object(row));
    }
    if rows.len() != count && options.strict {
        return Err(ToonError::new(
            header_line,
            format!(
                "Array count mismatch. Header declared {}, found {}.",
                count,
                rows.len()
            ),
        ));
    }
    Ok(rows)
}

fn parse_list_body(
    count: usize,
    stream: &mut LineStream,
    header_depth: usize,
    options: &Options,
    header_line: usize,
) -> Result<Vec<Value>> {
    let item_depth = header_depth + 1;
    let mut items = Vec::new();
    loop {
        if !consume_body_blank_lines(stream, item_depth, options)? {
            break;
        }
        let at_item_depth = matches!(stream.peek(), Some(l) if l.depth == Some(item_depth));
        if !at_item_depth {
            break;
        }
        let line = stream.advance().expect("peeked above");
        let remainder: &str = if let Some(stripped) = line.content.strip_prefix("- ") {
            stripped
        } else if line.content == "-" {
            ""
        } else if options.strict {
            return Err(ToonError::new(
                line.line_number,
                "Array item must start with '- '",
            ));
        } else {
            line.content.as_str()
        };
        let item = parse_list_item(remainder, stream, item_depth, options, line.line_number)?;
        items.push(item);
    }
    if items.len() != count && options.strict {
        return Err(ToonError::new(
            header_line,
            format!(
                "Array count mismatch. Header declared {}, found {}.",
                count,
                items.len()
            ),
        ));
    }
    Ok(items)
}

/// Interprets the text after a list item's `- ` prefix, per §4D's ordered list of cases.
fn parse_list_item(
    remainder: &str,
    stream: &mut LineStream,
    item_depth: usize,
    options: &Options,
    line_number: usize,
) -> Result<Value> {
    if let Some((header, rest)) = header::parse_header(remainder) {
        let array = parse_array_value(&header, rest, stream, item_depth, options, line_number)?;
        return match header.key {
            None => Ok(Value::Array(array)),
            Some(key) => {
                let mut obj = ToonObject::new();
                assign_with_path(
                    &mut obj,
                    &key,
                    header.key_was_quoted,
                    Value::Array(array),
                    line_number,
                    options,
                )?;
                merge_siblings_if_present(&mut obj, stream, item_depth, options)?;
                Ok(Value::Object(obj))
            }
        };
    }

    if remainder.is_empty() {
        if matches!(stream.peek(), Some(l) if l.depth == Some(item_depth + 1)) {
            return Ok(Value::Object(parse_object(stream, item_depth + 1, options)?));
        }
        return Ok(Value::Object(ToonObject::new()));
    }

    if let Some(colon_idx) = find_split_colon(remainder) {
        let key_text = &remainder[..colon_idx];
        let value_text = remainder[colon_idx + 1..].trim();
        let (key, was_quoted) = decode_key(key_text, line_number)?;
        let value = if value_text.is_empty() {
            // The first field's own nested object sits one level deeper than a list item's
            // true sibling fields (`item_depth + 1`, read below by `merge_siblings_if_present`)
            // — otherwise the two would be indistinguishable and this object's nested body
            // would swallow its own siblings. Mirrors `encode_list_item`'s `depth + 2`.
            match stream.peek() {
                Some(next) if next.depth == Some(item_depth + 2) => {
                    Value::Object(parse_object(stream, item_depth + 2, options)?)
                }
                _ => Value::Object(ToonObject::new()),
            }
        } else {
            parse_primitive(value_text, line_number)?
        };
        let mut obj = ToonObject::new();
        assign_with_path(&mut obj, &key, was_quoted, value, line_number, options)?;
        merge_siblings_if_present(&mut obj, stream, item_depth, options)?;
        return Ok(Value::Object(obj));
    }

    parse_primitive(remainder, line_number)
}

fn merge_siblings_if_present(
    obj: &mut ToonObject,
    stream: &mut LineStream,
    item_depth: usize,
    options: &Options,
) -> Result<()> {
    if matches!(stream.peek(), Some(l) if l.depth == Some(item_depth + 1)) {
        let siblings = parse_object(stream, item_depth + 1, options)?;
        let merged = deep_merge(std::mem::take(obj), siblings);
        *obj = merged;
    }
    Ok(())
}

/// Decides whether a run of blank lines at the cursor is "inside" the array body at
/// `body_depth` (an error in strict mode) or trailing padding that ends it. Returns `true`
/// if the caller should keep collecting body lines, `false` if the body has ended.
fn consume_body_blank_lines(
    stream: &mut LineStream,
    body_depth: usize,
    options: &Options,
) -> Result<bool> {
    if !matches!(stream.peek(), Some(l) if l.depth.is_none()) {
        return Ok(true);
    }
    let next_real_depth = stream.peek_non_blank().and_then(|l| l.depth);
    if next_real_depth.is_some_and(|d| d >= body_depth) {
        if options.strict {
            return Err(ToonError::new(
                stream.current_line_number(),
                "Blank line inside array",
            ));
        }
        stream.skip_blank();
        return Ok(true);
    }
    stream.skip_blank();
    Ok(false)
}

/// Splits `s` on `delim`, honouring quoted substrings (a delimiter byte inside a quoted
/// token is not a split point).
fn split_delimited(s: &str, delim: char) -> Vec<String> {
    let bytes = s.as_bytes();
    let delim_byte = delim as u8;
    let mut out = Vec::new();
    let mut in_quotes = false;
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_quotes => {
                i += 2;
                continue;
            }
            b'"' => in_quotes = !in_quotes,
            b if !in_quotes && b == delim_byte => {
                out.push(s[start..i].to_string());
                i += 1;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    out.push(s[start..].to_string());
    out
}

/// Parses a single primitive token under the decode precedence of §3: leading-zero integer
/// text is a String; else an unquoted integer shape is an Int; else a finite decimal shape
/// is a Float; else (including a quoted string) the result is a String.
fn parse_primitive(token: &str, line_number: usize) -> Result<Value> {
    if token.is_empty() {
        return Ok(Value::String(String::new()));
    }
    if token.as_bytes()[0] == b'"' {
        let close = find_closing_quote(token, 0)
            .ok_or_else(|| ToonError::new(line_number, "Unterminated string"))?;
        if close != token.len() - 1 {
            return Err(ToonError::new(line_number, "Invalid token after quoted string"));
        }
        let content =
            unescape_string(&token[1..close]).map_err(|msg| ToonError::new(line_number, msg))?;
        return Ok(Value::String(content));
    }
    if token == "true" {
        return Ok(Value::Bool(true));
    }
    if token == "false" {
        return Ok(Value::Bool(false));
    }
    if token == "null" {
        return Ok(Value::Null);
    }
    if has_leading_zero(token) {
        return Ok(Value::String(token.to_string()));
    }
    if is_integer_token(token) {
        if let Ok(n) = token.parse::<i64>() {
            return Ok(Value::Int(n));
        }
    }
    if looks_like_number_token(token) {
        if let Ok(n) = token.parse::<f64>() {
            if n.is_finite() {
                return Ok(Value::Float(n));
            }
        }
    }
    Ok(Value::String(token.to_string()))
}
