//! Splits a raw TOON document into an indentation-tagged line stream for the decoder.
//!
//! Normalises CRLF/CR to LF, drops a single trailing empty line, and measures each line's
//! leading-space indentation against `options.indent_size`. Blank lines carry `depth: None`
//! so the decoder can tell "padding between/after array bodies" apart from a real line at
//! depth zero — both cases matter for the blank-line-inside-array rule in `decoder.rs`.

use crate::error::{Result, ToonError};
use crate::options::Options;

/// One physical line of the document, indentation already measured and stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Indentation level (`leading_spaces / indent_size`), or `None` for a blank line.
    pub depth: Option<usize>,
    /// The line with leading indentation removed. Empty for blank lines. Inner whitespace
    /// and any trailing spaces are preserved untouched.
    pub content: String,
    /// 1-based source line number, threaded into `ToonError` for diagnostics.
    pub line_number: usize,
}

impl Line {
    fn is_blank(&self) -> bool {
        self.depth.is_none()
    }
}

/// Tokenizes `input` into a sequence of [`Line`]s under `options`.
pub fn frame(input: &str, options: &Options) -> Result<Vec<Line>> {
    let normalized = normalize_newlines(input);
    let mut raw_lines: Vec<&str> = normalized.split('\n').collect();
    // `split('\n')` on a string ending in '\n' yields one trailing empty element; drop it
    // so a document's final newline doesn't register as a blank line of its own.
    if raw_lines.last() == Some(&"") {
        raw_lines.pop();
    }

    let mut lines = Vec::with_capacity(raw_lines.len());
    for (idx, raw) in raw_lines.into_iter().enumerate() {
        let line_number = idx + 1;
        let leading_spaces = raw.chars().take_while(|&c| c == ' ').count();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            lines.push(Line {
                depth: None,
                content: String::new(),
                line_number,
            });
            continue;
        }

        if options.strict {
            let leading_ws: String = raw.chars().take_while(|c| c.is_whitespace()).collect();
            if leading_ws.contains('\t') {
                return Err(ToonError::new(
                    line_number,
                    "Invalid indentation: tabs are not allowed",
                ));
            }
            if leading_spaces % options.indent_size != 0 {
                return Err(ToonError::new(
                    line_number,
                    format!(
                        "Invalid indentation: {} spaces is not a multiple of {}",
                        leading_spaces, options.indent_size
                    ),
                ));
            }
        }

        let depth = if options.indent_size == 0 {
            0
        } else {
            leading_spaces / options.indent_size
        };
        let byte_pos = raw
            .char_indices()
            .nth(leading_spaces)
            .map(|(pos, _)| pos)
            .unwrap_or(raw.len());
        let content = raw[byte_pos..].trim_end_matches('\r').to_string();

        lines.push(Line {
            depth: Some(depth),
            content,
            line_number,
        });
    }

    Ok(lines)
}

fn normalize_newlines(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

/// A cursor over a framed line sequence, with the peek/advance/skip-blank primitives the
/// decoder's recursive descent is built on.
pub struct LineStream {
    lines: Vec<Line>,
    pos: usize,
}

impl LineStream {
    pub fn new(lines: Vec<Line>) -> Self {
        LineStream { lines, pos: 0 }
    }

    pub fn peek(&self) -> Option<&Line> {
        self.lines.get(self.pos)
    }

    pub fn advance(&mut self) -> Option<Line> {
        let line = self.lines.get(self.pos).cloned();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    /// Consumes consecutive blank lines at the cursor.
    pub fn skip_blank(&mut self) {
        while matches!(self.peek(), Some(l) if l.is_blank()) {
            self.pos += 1;
        }
    }

    /// Looks past any blank lines at the cursor (without consuming) and returns the next
    /// non-blank line, if any.
    pub fn peek_non_blank(&self) -> Option<&Line> {
        let mut i = self.pos;
        while let Some(l) = self.lines.get(i) {
            if !l.is_blank() {
                return Some(l);
            }
            i += 1;
        }
        None
    }

    /// `true` if any line strictly after the cursor is non-blank. Used by the root-form
    /// dispatch to decide whether a lone unstructured line is really the whole document or
    /// just the first of several (the latter is a strict-mode "missing colon" error).
    pub fn any_non_blank_after_current(&self) -> bool {
        self.lines
            .get(self.pos + 1..)
            .is_some_and(|rest| rest.iter().any(|l| l.depth.is_some()))
    }

    /// The 1-based line number of the next unconsumed line, or the document's last line
    /// number if the stream is exhausted — used for "position unavailable" fallbacks.
    pub fn current_line_number(&self) -> usize {
        self.lines
            .get(self.pos)
            .or_else(|| self.lines.last())
            .map(|l| l.line_number)
            .unwrap_or(0)
    }
}
