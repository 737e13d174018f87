//! Purpose: Render a decoded table as Markdown table text.
//! Exports: `encode_markdown`.
//! Role: Pure single-pass transformation; the whole table is built in memory.
//! Invariants: The first record fixes the header and delimiter column count.
//! Invariants: Body rows emit values positionally with a trailing `|` per cell.
//! Invariants: Later records with a different pair count render as-is, no padding.

use crate::core::error::{Error, ErrorKind};
use crate::core::table::{Record, Table};

/// Renders header, delimiter, and body lines as one string. A table with
/// zero records has no schema to derive a header from and is an error.
pub fn encode_markdown(table: &Table) -> Result<String, Error> {
    let Some(first) = table.first() else {
        return Err(Error::new(ErrorKind::EmptyTable)
            .with_message("cannot derive a header from a table with no records")
            .with_hint("the array must contain at least one object"));
    };
    let mut out = String::new();
    out.push_str(&header_line(first));
    out.push_str(&delimiter_line(first));
    out.push_str(&body_lines(table));
    Ok(out)
}

fn header_line(first: &Record) -> String {
    let keys: Vec<&str> = first.keys().collect();
    format!("{}\n", keys.join("|"))
}

fn delimiter_line(first: &Record) -> String {
    let cells = vec!["---"; first.pairs.len()];
    format!("{}\n", cells.join("|"))
}

fn body_lines(table: &Table) -> String {
    let mut out = String::new();
    for record in &table.records {
        for pair in &record.pairs {
            out.push_str(&pair.value.to_string());
            out.push('|');
        }
        out.push('\n');
    }
    out
}
