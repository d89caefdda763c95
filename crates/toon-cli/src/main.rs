//! `toon` CLI — encode, decode, and analyze TOON documents from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Encode JSON to TOON (stdin -> stdout)
//! echo '{"name":"Alice","age":30}' | toon encode
//!
//! # Encode from file to file, with pipe-delimited arrays and key folding
//! toon encode -i data.json -o data.toon --delimiter pipe --key-folding
//!
//! # Decode TOON back to pretty-printed JSON
//! toon decode -i data.toon
//!
//! # Show compression statistics
//! toon stats -i data.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use toon_core::{Delimiter, KeyFolding, Options, PathExpansion};

#[derive(Parser)]
#[command(
    name = "toon",
    version,
    about = "TOON (Token-Oriented Object Notation) CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode JSON to TOON format
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        #[command(flatten)]
        opts: OptionArgs,
    },
    /// Decode TOON back to JSON format
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        #[command(flatten)]
        opts: OptionArgs,
    },
    /// Show encoding statistics (byte counts, compression ratio)
    Stats {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[command(flatten)]
        opts: OptionArgs,
    },
}

#[derive(clap::Args)]
struct OptionArgs {
    /// Spaces per indentation level
    #[arg(long, default_value_t = 2)]
    indent_size: usize,
    /// Delimiter used inside inline and tabular array bodies
    #[arg(long, value_enum, default_value_t = DelimiterArg::Comma)]
    delimiter: DelimiterArg,
    /// Relax the decoder's structural validations (count/width/indentation/expansion checks)
    #[arg(long)]
    no_strict: bool,
    /// Fold single-key object chains into dotted keys when encoding
    #[arg(long)]
    key_folding: bool,
    /// Maximum number of dotted segments a folded key may accumulate
    #[arg(long)]
    flatten_depth: Option<usize>,
    /// Expand dotted keys into nested objects when decoding
    #[arg(long)]
    expand_paths: bool,
}

#[derive(Copy, Clone, ValueEnum)]
enum DelimiterArg {
    Comma,
    Tab,
    Pipe,
}

impl From<DelimiterArg> for Delimiter {
    fn from(d: DelimiterArg) -> Self {
        match d {
            DelimiterArg::Comma => Delimiter::Comma,
            DelimiterArg::Tab => Delimiter::Tab,
            DelimiterArg::Pipe => Delimiter::Pipe,
        }
    }
}

impl OptionArgs {
    fn into_options(self) -> Options {
        let mut options = Options::new()
            .with_indent_size(self.indent_size)
            .with_delimiter(self.delimiter.into())
            .with_strict(!self.no_strict);
        if self.key_folding {
            options = options.with_key_folding(KeyFolding::Safe);
        }
        if let Some(depth) = self.flatten_depth {
            options = options.with_flatten_depth(depth);
        }
        if self.expand_paths {
            options = options.with_expand_paths(PathExpansion::Safe);
        }
        options
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { input, output, opts } => {
            let json_text = read_input(input.as_deref())?;
            let json: serde_json::Value =
                serde_json::from_str(&json_text).context("Failed to parse JSON input")?;
            let value = json_to_value(json);
            let toon = toon_core::encode(&value, &opts.into_options());
            write_output(output.as_deref(), &toon)?;
        }
        Commands::Decode { input, output, opts } => {
            let toon = read_input(input.as_deref())?;
            let value = toon_core::decode(&toon, &opts.into_options())
                .context("Failed to decode TOON document")?;
            let json = value_to_json(value);
            let pretty = serde_json::to_string_pretty(&json)?;
            write_output(output.as_deref(), &pretty)?;
        }
        Commands::Stats { input, opts } => {
            let json_text = read_input(input.as_deref())?;
            let json: serde_json::Value =
                serde_json::from_str(&json_text).context("Failed to parse JSON input")?;
            let value = json_to_value(json);
            let toon = toon_core::encode(&value, &opts.into_options());
            let json_bytes = json_text.len();
            let toon_bytes = toon.len();
            let ratio = if json_bytes > 0 {
                (1.0 - (toon_bytes as f64 / json_bytes as f64)) * 100.0
            } else {
                0.0
            };
            println!("JSON size:  {} bytes", json_bytes);
            println!("TOON size:  {} bytes", toon_bytes);
            println!("Reduction:  {:.1}%", ratio);
        }
    }

    Ok(())
}

/// Converts a `serde_json::Value` into this crate's `Value`. `serde_json::Number` always
/// carries enough information to tell an integer apart from a float; values that are neither
/// (arbitrary-precision numbers under the `arbitrary_precision` feature) never appear here
/// since that feature isn't enabled.
fn json_to_value(json: serde_json::Value) -> toon_core::Value {
    match json {
        serde_json::Value::Null => toon_core::Value::Null,
        serde_json::Value::Bool(b) => toon_core::Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                toon_core::Value::Int(i)
            } else {
                toon_core::Value::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => toon_core::Value::String(s),
        serde_json::Value::Array(arr) => {
            toon_core::Value::Array(arr.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(map) => {
            let obj: toon_core::ToonObject = map
                .into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect();
            toon_core::Value::Object(obj)
        }
    }
}

fn value_to_json(value: toon_core::Value) -> serde_json::Value {
    match value {
        toon_core::Value::Null => serde_json::Value::Null,
        toon_core::Value::Bool(b) => serde_json::Value::Bool(b),
        toon_core::Value::Int(n) => serde_json::Value::Number(n.into()),
        toon_core::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        toon_core::Value::String(s) => serde_json::Value::String(s),
        toon_core::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(value_to_json).collect())
        }
        toon_core::Value::Object(obj) => {
            let map = obj.into_iter().map(|(k, v)| (k, value_to_json(v))).collect();
            serde_json::Value::Object(map)
        }
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
