//! Purpose: Pull-based JSON tokenizer shared by the decoder.
//! Exports: `Token`, `TokenStream`.
//! Role: Single seam between raw bytes and the decoder; one token per call.
//! Invariants: Commas and colons are validated and consumed internally, never surfaced.
//! Invariants: End of input where a token is required is a `TokenRead` error.
//! Invariants: Errors carry the byte offset of the failing read.

use std::fmt;
use std::io::{BufReader, Bytes, Read};

use crate::core::error::{Error, ErrorKind};

/// One lexical JSON unit: a structural delimiter or a scalar.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    ArrayOpen,
    ArrayClose,
    ObjectOpen,
    ObjectClose,
    Str(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::ArrayOpen => write!(f, "`[`"),
            Token::ArrayClose => write!(f, "`]`"),
            Token::ObjectOpen => write!(f, "`{{`"),
            Token::ObjectClose => write!(f, "`}}`"),
            Token::Str(text) => write!(f, "string \"{text}\""),
            Token::Number(number) => write!(f, "number {number}"),
            Token::Bool(flag) => write!(f, "{flag}"),
            Token::Null => write!(f, "null"),
        }
    }
}

// Raw lexemes include the separators the stream swallows.
enum Lexeme {
    Token(Token),
    Comma,
    Colon,
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lexeme::Token(token) => token.fmt(f),
            Lexeme::Comma => write!(f, "`,`"),
            Lexeme::Colon => write!(f, "`:`"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Scope {
    Array,
    Object,
}

// What the grammar allows at the current position. Separator placement is
// validated here so the decoder only ever sees well-ordered tokens.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Expect {
    Value,
    ValueOrClose,
    Key,
    KeyOrClose,
    Colon,
    CommaOrClose,
    Done,
}

/// Forward-only token source over any reader. Blocks on the underlying
/// reader; no lookahead beyond one byte.
pub struct TokenStream<R: Read> {
    bytes: Bytes<BufReader<R>>,
    peeked: Option<u8>,
    offset: u64,
    stack: Vec<Scope>,
    expect: Expect,
}

impl<R: Read> TokenStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
            peeked: None,
            offset: 0,
            stack: Vec::new(),
            expect: Expect::Value,
        }
    }

    /// Returns the next delimiter or scalar token, or an error when the
    /// input is malformed, misordered, or exhausted.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        loop {
            let Some(lexeme) = self.next_lexeme()? else {
                return Err(self.syntax_error("unexpected end of input"));
            };
            match (self.expect, lexeme) {
                (Expect::Colon, Lexeme::Colon) => {
                    self.expect = Expect::Value;
                }
                (Expect::Colon, other) => {
                    return Err(
                        self.syntax_error(format!("expected `:` after object key, got {other}"))
                    );
                }

                (Expect::CommaOrClose, Lexeme::Comma) => {
                    self.expect = match self.stack.last() {
                        Some(Scope::Array) => Expect::Value,
                        Some(Scope::Object) => Expect::Key,
                        None => {
                            return Err(Error::new(ErrorKind::Internal)
                                .with_message("separator outside any scope"));
                        }
                    };
                }
                (Expect::CommaOrClose, Lexeme::Token(Token::ArrayClose))
                    if self.stack.last() == Some(&Scope::Array) =>
                {
                    return Ok(self.close_scope(Token::ArrayClose));
                }
                (Expect::CommaOrClose, Lexeme::Token(Token::ObjectClose))
                    if self.stack.last() == Some(&Scope::Object) =>
                {
                    return Ok(self.close_scope(Token::ObjectClose));
                }
                (Expect::CommaOrClose, other) => {
                    return Err(self.syntax_error(format!(
                        "expected `,` or a closing delimiter, got {other}"
                    )));
                }

                (Expect::Value | Expect::ValueOrClose, Lexeme::Token(Token::ArrayOpen)) => {
                    self.stack.push(Scope::Array);
                    self.expect = Expect::ValueOrClose;
                    return Ok(Token::ArrayOpen);
                }
                (Expect::Value | Expect::ValueOrClose, Lexeme::Token(Token::ObjectOpen)) => {
                    self.stack.push(Scope::Object);
                    self.expect = Expect::KeyOrClose;
                    return Ok(Token::ObjectOpen);
                }
                (Expect::ValueOrClose, Lexeme::Token(Token::ArrayClose)) => {
                    return Ok(self.close_scope(Token::ArrayClose));
                }
                (
                    Expect::Value | Expect::ValueOrClose,
                    Lexeme::Token(
                        token @ (Token::Str(_) | Token::Number(_) | Token::Bool(_) | Token::Null),
                    ),
                ) => {
                    self.expect = self.after_value();
                    return Ok(token);
                }
                (Expect::Value | Expect::ValueOrClose, other) => {
                    return Err(self.syntax_error(format!("expected a value, got {other}")));
                }

                (Expect::Key | Expect::KeyOrClose, Lexeme::Token(Token::Str(key))) => {
                    self.expect = Expect::Colon;
                    return Ok(Token::Str(key));
                }
                (Expect::KeyOrClose, Lexeme::Token(Token::ObjectClose)) => {
                    return Ok(self.close_scope(Token::ObjectClose));
                }
                (
                    Expect::Key | Expect::KeyOrClose,
                    Lexeme::Token(token @ (Token::Number(_) | Token::Bool(_) | Token::Null)),
                ) => {
                    return Err(Error::new(ErrorKind::KeyType)
                        .with_message(format!("object key must be a string, got {token}"))
                        .with_offset(self.offset));
                }
                (Expect::Key | Expect::KeyOrClose, other) => {
                    return Err(self.syntax_error(format!("expected an object key, got {other}")));
                }

                (Expect::Done, other) => {
                    return Err(self.syntax_error(format!(
                        "unexpected {other} after the top-level value"
                    )));
                }
            }
        }
    }

    fn after_value(&self) -> Expect {
        if self.stack.is_empty() {
            Expect::Done
        } else {
            Expect::CommaOrClose
        }
    }

    fn close_scope(&mut self, token: Token) -> Token {
        self.stack.pop();
        self.expect = self.after_value();
        token
    }

    fn next_lexeme(&mut self) -> Result<Option<Lexeme>, Error> {
        let byte = loop {
            match self.read_byte()? {
                None => return Ok(None),
                Some(byte) if byte.is_ascii_whitespace() => continue,
                Some(byte) => break byte,
            }
        };

        let lexeme = match byte {
            b'[' => Lexeme::Token(Token::ArrayOpen),
            b']' => Lexeme::Token(Token::ArrayClose),
            b'{' => Lexeme::Token(Token::ObjectOpen),
            b'}' => Lexeme::Token(Token::ObjectClose),
            b',' => Lexeme::Comma,
            b':' => Lexeme::Colon,
            b'"' => Lexeme::Token(Token::Str(self.lex_string()?)),
            b't' => Lexeme::Token(self.lex_literal(b"rue", Token::Bool(true))?),
            b'f' => Lexeme::Token(self.lex_literal(b"alse", Token::Bool(false))?),
            b'n' => Lexeme::Token(self.lex_literal(b"ull", Token::Null)?),
            b'-' | b'0'..=b'9' => Lexeme::Token(Token::Number(self.lex_number(byte)?)),
            other => {
                return Err(self.syntax_error(format!(
                    "unexpected character `{}`",
                    other.escape_ascii()
                )));
            }
        };
        Ok(Some(lexeme))
    }

    fn lex_string(&mut self) -> Result<String, Error> {
        let mut buf = Vec::new();
        loop {
            let byte = self.require_byte("unterminated string")?;
            match byte {
                b'"' => break,
                b'\\' => {
                    let ch = self.lex_escape()?;
                    let mut encoded = [0u8; 4];
                    buf.extend_from_slice(ch.encode_utf8(&mut encoded).as_bytes());
                }
                0x00..=0x1f => {
                    return Err(self.syntax_error("control character in string"));
                }
                other => buf.push(other),
            }
        }
        String::from_utf8(buf).map_err(|err| {
            Error::new(ErrorKind::TokenRead)
                .with_message("invalid UTF-8 in string")
                .with_offset(self.offset)
                .with_source(err)
        })
    }

    fn lex_escape(&mut self) -> Result<char, Error> {
        let byte = self.require_byte("truncated escape sequence")?;
        let ch = match byte {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{0008}',
            b'f' => '\u{000c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => return self.lex_unicode_escape(),
            other => {
                return Err(self.syntax_error(format!(
                    "invalid escape character `{}`",
                    other.escape_ascii()
                )));
            }
        };
        Ok(ch)
    }

    fn lex_unicode_escape(&mut self) -> Result<char, Error> {
        let first = self.lex_hex4()?;
        let code = match first {
            // High surrogate: a low surrogate escape must follow.
            0xd800..=0xdbff => {
                if self.require_byte("truncated surrogate pair")? != b'\\'
                    || self.require_byte("truncated surrogate pair")? != b'u'
                {
                    return Err(self.syntax_error("unpaired surrogate in string"));
                }
                let second = self.lex_hex4()?;
                if !(0xdc00..=0xdfff).contains(&second) {
                    return Err(self.syntax_error("unpaired surrogate in string"));
                }
                0x10000 + ((first - 0xd800) << 10) + (second - 0xdc00)
            }
            0xdc00..=0xdfff => {
                return Err(self.syntax_error("unpaired surrogate in string"));
            }
            code => code,
        };
        char::from_u32(code)
            .ok_or_else(|| self.syntax_error(format!("invalid unicode escape U+{code:04X}")))
    }

    fn lex_hex4(&mut self) -> Result<u32, Error> {
        let mut code = 0u32;
        for _ in 0..4 {
            let byte = self.require_byte("truncated unicode escape")?;
            let digit = (byte as char).to_digit(16).ok_or_else(|| {
                self.syntax_error(format!(
                    "invalid hex digit `{}` in unicode escape",
                    byte.escape_ascii()
                ))
            })?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn lex_number(&mut self, first: u8) -> Result<f64, Error> {
        let mut text = String::new();
        text.push(first as char);
        loop {
            match self.read_byte()? {
                Some(byte)
                    if byte.is_ascii_digit()
                        || matches!(byte, b'.' | b'e' | b'E' | b'+' | b'-') =>
                {
                    text.push(byte as char);
                }
                Some(byte) => {
                    self.unread_byte(byte);
                    break;
                }
                None => break,
            }
        }
        // f64::parse is laxer than JSON (`01`, `1.`, bare `-`); gate on the
        // JSON number grammar first.
        if !is_json_number(&text) {
            return Err(self.syntax_error(format!("invalid number literal `{text}`")));
        }
        text.parse::<f64>().map_err(|err| {
            Error::new(ErrorKind::TokenRead)
                .with_message(format!("invalid number literal `{text}`"))
                .with_offset(self.offset)
                .with_source(err)
        })
    }

    fn lex_literal(&mut self, rest: &'static [u8], token: Token) -> Result<Token, Error> {
        for expected in rest {
            let byte = self.require_byte("truncated literal")?;
            if byte != *expected {
                return Err(self.syntax_error("invalid literal"));
            }
        }
        Ok(token)
    }

    fn read_byte(&mut self) -> Result<Option<u8>, Error> {
        if let Some(byte) = self.peeked.take() {
            self.offset += 1;
            return Ok(Some(byte));
        }
        match self.bytes.next() {
            None => Ok(None),
            Some(Ok(byte)) => {
                self.offset += 1;
                Ok(Some(byte))
            }
            Some(Err(err)) => Err(Error::new(ErrorKind::TokenRead)
                .with_message("failed to read from input")
                .with_offset(self.offset)
                .with_source(err)),
        }
    }

    // Offset counts consumed bytes only, so a push-back uncounts the byte.
    fn unread_byte(&mut self, byte: u8) {
        self.peeked = Some(byte);
        self.offset -= 1;
    }

    fn require_byte(&mut self, context: &str) -> Result<u8, Error> {
        self.read_byte()?
            .ok_or_else(|| self.syntax_error(context.to_string()))
    }

    fn syntax_error(&self, message: impl Into<String>) -> Error {
        Error::new(ErrorKind::TokenRead)
            .with_message(message)
            .with_offset(self.offset)
    }
}

// JSON number grammar: `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`.
fn is_json_number(text: &str) -> bool {
    let mut rest = text.as_bytes();
    if let Some((&b'-', tail)) = rest.split_first() {
        rest = tail;
    }
    match rest.split_first() {
        Some((&b'0', tail)) => rest = tail,
        Some((&(b'1'..=b'9'), _)) => rest = skip_digits(rest),
        _ => return false,
    }
    if let Some((&b'.', tail)) = rest.split_first() {
        if !tail.first().is_some_and(u8::is_ascii_digit) {
            return false;
        }
        rest = skip_digits(tail);
    }
    if let Some((&(b'e' | b'E'), tail)) = rest.split_first() {
        let digits = match tail.split_first() {
            Some((&(b'+' | b'-'), signed)) => signed,
            _ => tail,
        };
        if !digits.first().is_some_and(u8::is_ascii_digit) {
            return false;
        }
        rest = skip_digits(digits);
    }
    rest.is_empty()
}

fn skip_digits(bytes: &[u8]) -> &[u8] {
    let count = bytes
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    &bytes[count..]
}
