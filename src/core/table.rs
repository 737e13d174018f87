// Ordered data model for decoded JSON arrays of flat objects.
//
// Objects are kept as pair sequences rather than maps: a map would collapse
// duplicate keys and lose encounter order, both of which are observable in
// the rendered table.
use std::fmt;

use crate::core::token::Token;

/// One scalar cell value, or an opaque structural delimiter when the source
/// nests a value the decoder does not descend into.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    Number(f64),
    Bool(bool),
    Null,
    Opaque(&'static str),
}

impl Value {
    /// Maps any token appearing in value position to a cell value. Structural
    /// delimiters are stored as-is without deep decoding.
    pub fn from_token(token: Token) -> Self {
        match token {
            Token::Str(text) => Value::Str(text),
            Token::Number(number) => Value::Number(number),
            Token::Bool(flag) => Value::Bool(flag),
            Token::Null => Value::Null,
            Token::ArrayOpen => Value::Opaque("["),
            Token::ArrayClose => Value::Opaque("]"),
            Token::ObjectOpen => Value::Opaque("{"),
            Token::ObjectClose => Value::Opaque("}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(text) => write!(f, "{text}"),
            Value::Number(number) => write!(f, "{number}"),
            Value::Bool(flag) => write!(f, "{flag}"),
            Value::Null => write!(f, "null"),
            Value::Opaque(delim) => write!(f, "{delim}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pair {
    pub key: String,
    pub value: Value,
}

/// One decoded object: pairs in encounter order, duplicates preserved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub pairs: Vec<Pair>,
}

impl Record {
    pub fn push(&mut self, key: impl Into<String>, value: Value) {
        self.pairs.push(Pair {
            key: key.into(),
            value,
        });
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|pair| pair.key.as_str())
    }
}

/// One decoded array: records in encounter order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub records: Vec<Record>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }
}
