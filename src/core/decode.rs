//! Purpose: Decode a token stream into the ordered table model.
//! Exports: `decode_array`.
//! Role: Enforces the top-level array-of-objects shape; all-or-nothing.
//! Invariants: Pair order and record order are exactly encounter order.
//! Invariants: Duplicate keys within an object are preserved, never merged.
//! Invariants: The first error aborts the decode; no partial tables escape.

use std::io::Read;

use crate::core::error::{Error, ErrorKind};
use crate::core::table::{Record, Table, Value};
use crate::core::token::{Token, TokenStream};

/// Reads one JSON array of flat objects from the stream and materializes it.
/// An array with zero objects is a successful empty table.
pub fn decode_array<R: Read>(stream: &mut TokenStream<R>) -> Result<Table, Error> {
    match stream.next_token()? {
        Token::ArrayOpen => {}
        other => {
            return Err(Error::new(ErrorKind::Structure)
                .with_message(format!("expected `[` to open the top-level array, got {other}"))
                .with_hint("the input must be a JSON array of flat objects"));
        }
    }

    let mut table = Table::default();
    while let Some(record) = decode_record(stream)? {
        table.records.push(record);
    }
    Ok(table)
}

// One object entry, or None when the array close is reached instead.
fn decode_record<R: Read>(stream: &mut TokenStream<R>) -> Result<Option<Record>, Error> {
    match stream.next_token()? {
        Token::ObjectOpen => {}
        Token::ArrayClose => return Ok(None),
        other => {
            return Err(Error::new(ErrorKind::Structure)
                .with_message(format!("expected `{{` to open an object, got {other}")));
        }
    }

    let mut record = Record::default();
    loop {
        let key = match stream.next_token()? {
            Token::ObjectClose => break,
            Token::Str(key) => key,
            // Reached when an opaque nested value leaves the stream in value
            // position while this loop expects a key.
            other => {
                return Err(Error::new(ErrorKind::KeyType)
                    .with_message(format!("object key must be a string, got {other}")));
            }
        };
        let value = Value::from_token(stream.next_token()?);
        record.push(key, value);
    }
    Ok(Some(record))
}
