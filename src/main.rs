//! Purpose: `json2md` CLI entry point.
//! Role: Binary crate root; opens the input, runs the conversion, prints the table.
//! Invariants: The Markdown table is the only stdout output on success.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `core::error::to_exit_code`.
use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{Parser, ValueHint};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

use json2md::core::decode::decode_array;
use json2md::core::error::{Error, ErrorKind, to_exit_code};
use json2md::core::render::encode_markdown;
use json2md::core::token::TokenStream;

#[derive(Parser, Debug)]
#[command(
    name = "json2md",
    version,
    about = "Render a JSON array of flat objects as a Markdown table"
)]
struct Cli {
    /// JSON file to read; stdin when omitted
    #[arg(short = 'f', long = "file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    file: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(()) => 0,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    let markdown = match &cli.file {
        Some(path) => {
            let file = File::open(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to open input file")
                    .with_path(path)
                    .with_source(err)
            })?;
            convert(file)?
        }
        None => convert(io::stdin().lock())?,
    };
    println!("{markdown}");
    Ok(())
}

fn convert<R: Read>(reader: R) -> Result<String, Error> {
    let mut stream = TokenStream::new(reader);
    let table = decode_array(&mut stream)?;
    tracing::debug!(records = table.len(), "decoded table");
    encode_markdown(&table)
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {err}");
        if let Some(hint) = err.hint() {
            eprintln!("hint: {hint}");
        }
        return;
    }

    let value = error_json(err);
    let text = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{text}");
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(err.to_string()));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(offset) = err.offset() {
        inner.insert("offset".to_string(), json!(offset));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
