//! Recognises and decomposes an array header: `key?[N][delim?]{fields?}:`.
//!
//! A header is identified, not guessed: any line matching this grammar — by construction,
//! not by a following heuristic — is a header, everything else is object-style `key: value`.
//! Quoted keys/fields may contain brackets, braces or colons; the scanning below is
//! quote-aware throughout so those never get mistaken for grammar punctuation.

use crate::options::{find_closing_quote, is_identifier, unescape_string};
use crate::Delimiter;

/// A decomposed header. `fields` is `Some` only for a tabular header (`{f1,f2,...}`);
/// `None` means the header introduces an inline-primitive or expanded-list array instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub key: Option<String>,
    /// Whether `key` came from a quoted key token — disables dotted-path expansion on it,
    /// same as for an ordinary object field key.
    pub key_was_quoted: bool,
    pub count: usize,
    pub delimiter: Delimiter,
    pub fields: Option<Vec<String>>,
    /// Parallel to `fields`: whether each field name came from a quoted token — disables
    /// dotted-path expansion on that field, same as for an ordinary object field key.
    pub fields_quoted: Option<Vec<bool>>,
}

/// Tries to parse `line` as a header. On success, returns the header and whatever text
/// trails the terminating `:` (empty for a pure header, non-empty for a
/// header-with-inline-values line such as `items[3]: 1,2,3`).
pub fn parse_header(line: &str) -> Option<(Header, String)> {
    let bytes = line.as_bytes();
    let mut idx = 0usize;

    let mut key_was_quoted = false;
    let key = match bytes.first() {
        Some(b'"') => {
            let close = find_closing_quote(line, idx)?;
            let raw = &line[idx + 1..close];
            let unescaped = unescape_string(raw).ok()?;
            idx = close + 1;
            key_was_quoted = true;
            Some(unescaped)
        }
        Some(b'[') => None,
        Some(_) => {
            let bracket_offset = line[idx..].find('[')?;
            let key_text = &line[idx..idx + bracket_offset];
            if key_text.is_empty() || !is_identifier(key_text) {
                return None;
            }
            idx += bracket_offset;
            Some(key_text.to_string())
        }
        None => return None,
    };

    if bytes.get(idx) != Some(&b'[') {
        return None;
    }
    idx += 1;

    let digits_start = idx;
    while bytes.get(idx).is_some_and(u8::is_ascii_digit) {
        idx += 1;
    }
    if idx == digits_start {
        return None;
    }
    let count: usize = line[digits_start..idx].parse().ok()?;

    let marker = match bytes.get(idx) {
        Some(b'\t') => {
            idx += 1;
            Some('\t')
        }
        Some(b'|') => {
            idx += 1;
            Some('|')
        }
        _ => None,
    };
    let delimiter = Delimiter::from_marker(marker);

    if bytes.get(idx) != Some(&b']') {
        return None;
    }
    idx += 1;

    let (fields, fields_quoted) = if bytes.get(idx) == Some(&b'{') {
        idx += 1;
        let close = find_matching_brace(line, idx)?;
        let parsed = split_field_list(&line[idx..close], delimiter.as_char())?;
        idx = close + 1;
        let (names, quoted): (Vec<String>, Vec<bool>) = parsed.into_iter().unzip();
        (Some(names), Some(quoted))
    } else {
        (None, None)
    };

    if bytes.get(idx) != Some(&b':') {
        return None;
    }
    idx += 1;

    let rest = line[idx..].trim_start().to_string();

    Some((
        Header {
            key,
            key_was_quoted,
            count,
            delimiter,
            fields,
            fields_quoted,
        },
        rest,
    ))
}

/// Finds the `}` closing a `{` opened at `start - 1`, skipping over quoted field names.
fn find_matching_brace(s: &str, start: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = start;
    let mut in_quotes = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_quotes => {
                i += 2;
                continue;
            }
            b'"' => in_quotes = !in_quotes,
            b'}' if !in_quotes => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Splits a `{...}` field list on `delim`, unescaping any quoted field names and recording,
/// per field, whether its token was quoted (see [`Header::fields_quoted`]).
fn split_field_list(text: &str, delim: char) -> Option<Vec<(String, bool)>> {
    if text.is_empty() {
        return Some(Vec::new());
    }
    let bytes = text.as_bytes();
    let mut fields = Vec::new();
    let mut i = 0usize;
    loop {
        if bytes.get(i) == Some(&b'"') {
            let close = find_closing_quote(text, i)?;
            fields.push((unescape_string(&text[i + 1..close]).ok()?, true));
            i = close + 1;
        } else {
            let start = i;
            while i < bytes.len() && bytes[i] != delim as u8 {
                i += 1;
            }
            fields.push((text[start..i].to_string(), false));
        }
        if i >= bytes.len() {
            break;
        }
        if bytes[i] != delim as u8 {
            return None;
        }
        i += 1;
    }
    Some(fields)
}
