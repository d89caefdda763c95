//! Configuration shared by the encoder and decoder.
//!
//! `Options` is an immutable bundle: one value is built (usually via [`Options::default`]
//! and a handful of `with_*` calls) and handed to `decode`/`encode` by reference. There is
//! no mutation after construction and no global state — two calls with different `Options`
//! never interfere with each other.

/// Separator used inside inline and tabular array bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Pipe,
}

impl Delimiter {
    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// The character written inside `[...]` to mark a non-default delimiter, or `None` for
    /// the document default (comma never needs marking).
    pub fn header_marker(&self) -> Option<char> {
        match self {
            Delimiter::Comma => None,
            Delimiter::Tab => Some('\t'),
            Delimiter::Pipe => Some('|'),
        }
    }

    /// Parses the one-byte marker that may trail an array header's `[N...]` count, if any.
    pub fn from_marker(marker: Option<char>) -> Self {
        match marker {
            Some('\t') => Delimiter::Tab,
            Some('|') => Delimiter::Pipe,
            _ => Delimiter::Comma,
        }
    }
}

/// Whether the encoder may collapse chains of single-child objects into dotted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFolding {
    #[default]
    Off,
    Safe,
}

/// Whether the decoder may expand dotted keys into nested objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathExpansion {
    #[default]
    Off,
    Safe,
}

/// Immutable configuration for `decode`/`encode`.
///
/// See the module and field docs for defaults; `Options::default()` matches the TOON v3.0
/// reference defaults (2-space indent, comma delimiter, strict decoding, no folding/
/// expansion).
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Spaces per indentation level. Default `2`.
    pub indent_size: usize,
    /// Document (default) delimiter for inline/tabular array bodies. Default `Comma`.
    pub delimiter: Delimiter,
    /// Enables the decoder validations in the crate's error table. Default `true`.
    pub strict: bool,
    /// Encoder-side dotted-key folding. Default `Off`.
    pub key_folding: KeyFolding,
    /// Maximum number of dotted segments a folded key may accumulate. Default `usize::MAX`
    /// (read as +infinity).
    pub flatten_depth: usize,
    /// Decoder-side dotted-key expansion. Default `Off`.
    pub expand_paths: PathExpansion,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            indent_size: 2,
            delimiter: Delimiter::Comma,
            strict: true,
            key_folding: KeyFolding::Off,
            flatten_depth: usize::MAX,
            expand_paths: PathExpansion::Off,
        }
    }
}

impl Options {
    /// Starts from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent_size(mut self, indent_size: usize) -> Self {
        self.indent_size = indent_size;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_key_folding(mut self, key_folding: KeyFolding) -> Self {
        self.key_folding = key_folding;
        self
    }

    pub fn with_flatten_depth(mut self, flatten_depth: usize) -> Self {
        self.flatten_depth = flatten_depth;
        self
    }

    pub fn with_expand_paths(mut self, expand_paths: PathExpansion) -> Self {
        self.expand_paths = expand_paths;
        self
    }
}

// --- Canonical primitives -------------------------------------------------
//
// Quoting, escaping, number formatting and identifier rules, shared verbatim by the header
// parser, the decoder's primitive/string reader and the encoder.

/// `true` if `s` may be used as an unquoted object key: `^[A-Za-z_][A-Za-z0-9_.]*$`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// `true` if `s` is a single foldable path segment: `^[A-Za-z_][A-Za-z0-9_]*$` (no dots —
/// unlike [`is_identifier`], a foldable segment can never itself introduce ambiguity with
/// the dots the folder is about to add).
pub fn is_foldable_segment(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Scans `s` left to right for the first unescaped, unquoted `:`, tracking a quoted-string
/// state toggled by `"` (with `\` consuming the following byte). Used both to split a header
/// line at its terminating colon and to split an object line into `key_text` / `value_text`.
pub fn find_split_colon(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut in_quotes = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_quotes => {
                i += 2;
                continue;
            }
            b'"' => in_quotes = !in_quotes,
            b':' if !in_quotes => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Given the byte index of an opening `"` in `s`, returns the byte index of the matching
/// closing `"`, honouring `\`-escapes. `None` if the string is unterminated.
pub fn find_closing_quote(s: &str, open: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Unescapes the contents of a quoted string (the slice *between* the quotes). Recognises
/// only `\\ \" \n \r \t`; any other escape is an error, in strict mode and otherwise alike —
/// the strict/non-strict relaxation table never lists string-escape handling as relaxable.
pub fn unescape_string(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => return Err(format!("Invalid escape sequence '\\{}'", other)),
            None => return Err("Unterminated string".to_string()),
        }
    }
    Ok(out)
}

/// Escapes `s` for placement between quotes, emitting only the five recognised escapes.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn looks_like_number_token(s: &str) -> bool {
    let mut chars = s.char_indices().peekable();
    if let Some((_, '-')) = chars.peek() {
        chars.next();
    }
    let digits_start = match chars.peek() {
        Some((i, c)) if c.is_ascii_digit() => *i,
        _ => return false,
    };
    let _ = digits_start;
    let mut saw_digit = false;
    let mut saw_dot = false;
    let mut saw_exp = false;
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_digit() {
            saw_digit = true;
            chars.next();
        } else if c == '.' && !saw_dot && !saw_exp {
            saw_dot = true;
            chars.next();
        } else if (c == 'e' || c == 'E') && saw_digit && !saw_exp {
            saw_exp = true;
            chars.next();
            if let Some(&(_, sign)) = chars.peek() {
                if sign == '+' || sign == '-' {
                    chars.next();
                }
            }
        } else {
            return false;
        }
    }
    saw_digit
}

/// `true` if `s` matches `^-?\d+$` — an integer token with no fraction or exponent.
pub(crate) fn is_integer_token(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit())
}

/// `true` if `s` is a leading-zero integer token (`^-?0\d+$`) — such tokens decode as
/// strings, not numbers, and must be quoted on encode for the same reason.
pub fn has_leading_zero(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    body.len() > 1 && body.starts_with('0') && body[1..].chars().all(|c| c.is_ascii_digit())
}

/// `true` if `s` must be quoted under §4A's rule set, given the delimiters in force.
pub fn needs_quoting(s: &str, active_delimiter: char, document_delimiter: char) -> bool {
    if s.is_empty() {
        return true;
    }
    if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
        return true;
    }
    if s == "true" || s == "false" || s == "null" {
        return true;
    }
    if looks_like_number_token(s) || has_leading_zero(s) {
        return true;
    }
    if s.starts_with('-') {
        return true;
    }
    if s.chars().any(|c| {
        matches!(c, ':' | '"' | '\\' | '[' | ']' | '{' | '}') || c.is_ascii_control()
    }) {
        return true;
    }
    if s.contains(active_delimiter) || s.contains(document_delimiter) {
        return true;
    }
    false
}

/// Formats an `i64` per §4A: decimal, no leading zero except `0` itself, `-` only if negative.
pub fn format_int(n: i64) -> String {
    n.to_string()
}

/// Formats an `f64` per §4A: `0` for ±0, otherwise the shortest decimal with no exponent, no
/// trailing fractional zeros and no trailing `.`. Callers must route non-finite values to the
/// `null` literal themselves — this function assumes a finite input.
pub fn format_float(n: f64) -> String {
    debug_assert!(n.is_finite(), "format_float called with a non-finite value");
    if n == 0.0 {
        return "0".to_string();
    }
    let mut s = format!("{}", n);
    // Rust's `Display` for f64 never emits an exponent for values in the range TOON documents
    // realistically carry and already omits trailing zeros/dot, but guard both anyway so the
    // canonical form stays exact if the formatting behaviour ever changes.
    if let Some(exp_pos) = s.find(['e', 'E']) {
        s = format_without_exponent(n, exp_pos);
    }
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

fn format_without_exponent(n: f64, _exp_pos: usize) -> String {
    format!("{:.17}", n)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Encodes an object key: bare if it is a valid identifier, quoted-escaped otherwise.
pub fn encode_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        format!("\"{}\"", escape_string(key))
    }
}
