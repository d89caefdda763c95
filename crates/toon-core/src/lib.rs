//! # toon-core
//!
//! Pure-Rust encoder and decoder for **TOON (Token-Oriented Object Notation)** v3.0.
//!
//! TOON is a compact, human-readable serialization format designed to reduce LLM token
//! consumption when processing structured data. It achieves this through key folding
//! (dotted paths instead of nested braces), tabular compression for uniform arrays, and
//! context-dependent quoting that eliminates unnecessary quote tokens.
//!
//! ## Quick start
//!
//! ```rust
//! use toon_core::{decode, encode, Options, Value};
//!
//! let doc = "items[3]: 1,2,3\n";
//! let value = decode(doc, &Options::default()).unwrap();
//! assert_eq!(value.as_object().unwrap().get("items").unwrap().as_array().unwrap().len(), 3);
//!
//! assert_eq!(encode(&value, &Options::default()), doc);
//! ```
//!
//! ## Modules
//!
//! - [`value`] — the `Value`/`ToonObject` tree documents decode into and encode from.
//! - [`options`] — configuration (`Options`, `Delimiter`, `KeyFolding`, `PathExpansion`) and
//!   the canonical-primitive rules (quoting, escaping, number formatting) shared by both
//!   directions.
//! - [`header`] — array header grammar (`key?[N][delim?]{fields?}:`).
//! - [`line_framer`] — indentation tokenizer feeding the decoder.
//! - [`decoder`] — TOON text → [`Value`].
//! - [`encoder`] — [`Value`] → TOON text.
//! - [`error`] — the decoder's error type.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod header;
pub mod line_framer;
pub mod options;
pub mod value;

pub use error::ToonError;
pub use options::{Delimiter, KeyFolding, Options, PathExpansion};
pub use value::{ToonObject, Value};

/// Decodes a TOON document into a [`Value`] tree under `options`.
pub fn decode(input: &str, options: &Options) -> error::Result<Value> {
    decoder::decode(input, options)
}

/// Encodes a [`Value`] tree to its canonical TOON text under `options`. Infallible: every
/// `Value` is already in the supported domain by construction.
pub fn encode(value: &Value, options: &Options) -> String {
    encoder::encode(value, options)
}

/// The TOON grammar version this crate implements.
pub fn spec_version() -> &'static str {
    "3.0"
}
