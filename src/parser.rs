//! JSON text parsing.
//!
//! [`Parser`] is a single-character-lookahead recursive descent parser over any
//! `Iterator<Item = char>`. Each [`Parser::parse`] call consumes exactly one value
//! and leaves the stream positioned right after it; trailing content is neither
//! consumed nor validated. [`Parser::parse_all`] keeps parsing values separated by
//! whitespace until the stream runs out.
//!
//! ## Usage
//!
//! ```rust
//! use jsonbind::{parse, parse_all, Value};
//!
//! assert_eq!(parse("42").unwrap(), Value::Int(42));
//! assert_eq!(parse("4.2e1").unwrap(), Value::Float(42.0));
//!
//! let values = parse_all("1 \"two\"\n[3]").unwrap();
//! assert_eq!(values.len(), 3);
//! ```
//!
//! ## Errors
//!
//! A syntax error ends the call. The error reports the offending character, the
//! last characters consumed before it and the 0-based character offset:
//!
//! ```rust
//! use jsonbind::{parse, Error};
//!
//! match parse(r#"{"a": 1 "b": 2}"#) {
//!     Err(Error::Syntax { offset, found, context }) => {
//!         assert_eq!(offset, 8);
//!         assert_eq!(found, '"');
//!         assert_eq!(context, r#"{"a": 1 "#);
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use crate::{Error, Map, ParseOptions, Result, Value};
use std::collections::VecDeque;
use std::iter::Peekable;

/// Number of recently consumed characters kept for error context.
const CONTEXT_LEN: usize = 25;

/// A JSON parser over a character stream.
///
/// # Examples
///
/// ```rust
/// use jsonbind::{Parser, Value};
///
/// let mut parser = Parser::new("[1] tail".chars());
/// assert_eq!(parser.parse().unwrap(), Value::Array(vec![Value::Int(1)]));
/// assert_eq!(parser.offset(), 3);
///
/// let rest: String = parser.into_inner().collect();
/// assert_eq!(rest, " tail");
/// ```
pub struct Parser<I: Iterator<Item = char>> {
    chars: Peekable<I>,
    offset: usize,
    recent: VecDeque<char>,
    options: ParseOptions,
    depth: usize,
}

impl<I: Iterator<Item = char>> Parser<I> {
    pub fn new(chars: I) -> Self {
        Self::with_options(chars, ParseOptions::default())
    }

    pub fn with_options(chars: I, options: ParseOptions) -> Self {
        Parser {
            chars: chars.peekable(),
            offset: 0,
            recent: VecDeque::with_capacity(CONTEXT_LEN),
            options,
            depth: 0,
        }
    }

    /// Number of characters consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the unconsumed remainder of the stream.
    pub fn into_inner(self) -> Peekable<I> {
        self.chars
    }

    /// Parses exactly one value, skipping leading whitespace.
    ///
    /// # Errors
    ///
    /// Returns a syntax error if the stream does not start with a well-formed value.
    pub fn parse(&mut self) -> Result<Value> {
        self.depth = 0;
        self.skip_whitespace();
        self.parse_value()
    }

    /// Parses whitespace-separated values until the stream is exhausted.
    ///
    /// # Errors
    ///
    /// The first failing value aborts the whole call; values parsed before it are
    /// discarded.
    pub fn parse_all(&mut self) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek().is_none() {
                return Ok(values);
            }
            values.push(self.parse()?);
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.offset += 1;
        if self.recent.len() == CONTEXT_LEN {
            self.recent.pop_front();
        }
        self.recent.push_back(ch);
        Some(ch)
    }

    fn context(&self) -> String {
        self.recent.iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\n' | '\r') = self.peek() {
            self.next_char();
        }
    }

    /// Error for the character under the cursor, which is left unconsumed.
    fn unexpected(&self, found: char) -> Error {
        Error::syntax(self.offset, found, &self.context())
    }

    fn eof(&self, expected: &str) -> Error {
        Error::unexpected_eof(self.offset, expected, &self.context())
    }

    fn expect(&mut self, wanted: char, expected: &str) -> Result<()> {
        match self.peek() {
            Some(ch) if ch == wanted => {
                self.next_char();
                Ok(())
            }
            Some(ch) => Err(self.unexpected(ch)),
            None => Err(self.eof(expected)),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(Error::DepthLimit {
                offset: self.offset,
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.peek() {
            Some('"') => self.parse_string().map(Value::String),
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('t') => self.parse_literal("true", Value::Bool(true)),
            Some('f') => self.parse_literal("false", Value::Bool(false)),
            Some('n') => self.parse_literal("null", Value::Null),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_number(),
            Some(ch) => Err(self.unexpected(ch)),
            None => Err(self.eof("a value")),
        }
    }

    fn parse_literal(&mut self, word: &str, value: Value) -> Result<Value> {
        for wanted in word.chars() {
            self.expect(wanted, word)?;
        }
        Ok(value)
    }

    /// Appends a run of ASCII digits, returning whether any were found.
    fn take_digits(&mut self, literal: &mut String) -> bool {
        let before = literal.len();
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            literal.push(ch);
            self.next_char();
        }
        literal.len() > before
    }

    fn require_digits(&mut self, literal: &mut String) -> Result<()> {
        if self.take_digits(literal) {
            return Ok(());
        }
        match self.peek() {
            Some(ch) => Err(self.unexpected(ch)),
            None => Err(self.eof("a digit")),
        }
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.offset;
        let mut literal = String::new();
        let mut is_float = false;

        if self.peek() == Some('-') {
            literal.push('-');
            self.next_char();
        }

        // A leading zero stands alone; anything after it is left for the caller.
        if self.peek() == Some('0') {
            literal.push('0');
            self.next_char();
        } else {
            self.require_digits(&mut literal)?;
        }

        if self.peek() == Some('.') {
            is_float = true;
            literal.push('.');
            self.next_char();
            self.require_digits(&mut literal)?;
        }

        if let Some(marker @ ('e' | 'E')) = self.peek() {
            is_float = true;
            literal.push(marker);
            self.next_char();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                literal.push(sign);
                self.next_char();
            }
            self.require_digits(&mut literal)?;
        }

        let invalid = || Error::InvalidNumber {
            offset: start,
            literal: literal.clone(),
        };

        if is_float {
            match literal.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                _ => Err(invalid()),
            }
        } else {
            literal.parse::<i64>().map(Value::Int).map_err(|_| invalid())
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        self.expect('"', "`\"`")?;
        let mut result = String::new();

        loop {
            match self.next_char() {
                Some('"') => return Ok(result),
                Some('\\') => {
                    let ch = self.parse_escape()?;
                    result.push(ch);
                }
                Some(ch) if self.options.strict_control && ch < ' ' => {
                    return Err(Error::syntax(self.offset - 1, ch, &self.context()));
                }
                Some(ch) => result.push(ch),
                None => return Err(self.eof("closing `\"`")),
            }
        }
    }

    /// Decodes the escape following a consumed backslash.
    fn parse_escape(&mut self) -> Result<char> {
        let start = self.offset - 1;
        match self.next_char() {
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('/') => Ok('/'),
            Some('b') => Ok('\u{0008}'),
            Some('f') => Ok('\u{000C}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => self.parse_unicode_escape(start),
            Some(other) => Err(Error::invalid_escape(
                start,
                &format!("unknown escape `\\{}`", other),
                &self.context(),
            )),
            None => Err(self.eof("an escape character")),
        }
    }

    fn parse_unicode_escape(&mut self, start: usize) -> Result<char> {
        let unit = self.read_hex4()?;
        let lone = Error::LoneSurrogate {
            offset: start,
            unit,
        };

        match unit {
            0xD800..=0xDBFF => {
                // A high surrogate must be followed immediately by `\u` and a low one.
                if self.peek() != Some('\\') {
                    return Err(lone);
                }
                self.next_char();
                if self.peek() != Some('u') {
                    return Err(lone);
                }
                self.next_char();
                let low = self.read_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(lone);
                }
                let code = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                char::from_u32(code).ok_or(lone)
            }
            0xDC00..=0xDFFF => Err(lone),
            _ => char::from_u32(u32::from(unit)).ok_or(lone),
        }
    }

    fn read_hex4(&mut self) -> Result<u16> {
        let mut unit: u16 = 0;
        for _ in 0..4 {
            let digit = match self.peek() {
                Some(ch) => ch.to_digit(16),
                None => return Err(self.eof("a hex digit")),
            };
            match digit {
                Some(d) => {
                    self.next_char();
                    unit = (unit << 4) | d as u16;
                }
                None => {
                    return Err(Error::invalid_escape(
                        self.offset,
                        "expected 4 hex digits after `\\u`",
                        &self.context(),
                    ))
                }
            }
        }
        Ok(unit)
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.expect('[', "`[`")?;
        self.enter()?;
        self.skip_whitespace();

        let mut items = Vec::new();
        if self.peek() == Some(']') {
            self.next_char();
            self.depth -= 1;
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.next_char();
                    self.skip_whitespace();
                }
                Some(']') => {
                    self.next_char();
                    break;
                }
                Some(ch) => return Err(self.unexpected(ch)),
                None => return Err(self.eof("`,` or `]`")),
            }
        }

        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn parse_object(&mut self) -> Result<Value> {
        self.expect('{', "`{`")?;
        self.enter()?;
        self.skip_whitespace();

        let mut members = Map::new();
        if self.peek() == Some('}') {
            self.next_char();
            self.depth -= 1;
            return Ok(Value::Object(members));
        }

        loop {
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(':', "`:`")?;
            self.skip_whitespace();
            let value = self.parse_value()?;
            members.insert(key, value);

            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.next_char();
                    self.skip_whitespace();
                }
                Some('}') => {
                    self.next_char();
                    break;
                }
                Some(ch) => return Err(self.unexpected(ch)),
                None => return Err(self.eof("`,` or `}`")),
            }
        }

        self.depth -= 1;
        Ok(Value::Object(members))
    }
}

/// Parses the first JSON value in `input`.
///
/// Content after the value is ignored.
///
/// # Errors
///
/// Returns a syntax error if `input` does not start with a well-formed value.
pub fn parse(input: &str) -> Result<Value> {
    Parser::new(input.chars()).parse()
}

/// Parses the first JSON value in `input` with custom options.
pub fn parse_with_options(input: &str, options: ParseOptions) -> Result<Value> {
    Parser::with_options(input.chars(), options).parse()
}

/// Parses every whitespace-separated JSON value in `input`.
///
/// # Errors
///
/// Fails on the first malformed value; nothing parsed so far is returned.
pub fn parse_all(input: &str) -> Result<Vec<Value>> {
    Parser::new(input.chars()).parse_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_last_25_chars() {
        let input = format!("[{}x]", "1,".repeat(20));
        match parse(&input) {
            Err(Error::Syntax {
                offset,
                found,
                context,
            }) => {
                assert_eq!(found, 'x');
                assert_eq!(offset, 41);
                assert_eq!(context.chars().count(), 25);
                assert!(context.ends_with("1,1,"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_offset_after_value() {
        let mut parser = Parser::new("  true  false".chars());
        assert_eq!(parser.parse().unwrap(), Value::Bool(true));
        assert_eq!(parser.offset(), 6);
        assert_eq!(parser.parse().unwrap(), Value::Bool(false));
        assert_eq!(parser.offset(), 13);
    }

    #[test]
    fn test_number_leaves_following_char() {
        let mut parser = Parser::new("01".chars());
        assert_eq!(parser.parse().unwrap(), Value::Int(0));
        assert_eq!(parser.into_inner().collect::<String>(), "1");
    }

    #[test]
    fn test_depth_resets_between_values() {
        let options = ParseOptions::new().with_max_depth(2);
        let mut parser = Parser::with_options("[[1]] [[2]]".chars(), options);
        assert_eq!(parser.parse_all().unwrap().len(), 2);
    }

    #[test]
    fn test_depth_limit() {
        let options = ParseOptions::new().with_max_depth(2);
        let err = parse_with_options("[[[1]]]", options).unwrap_err();
        assert_eq!(err, Error::DepthLimit { offset: 3, limit: 2 });
    }

    #[test]
    fn test_strict_control() {
        assert_eq!(parse("\"a\tb\"").unwrap(), Value::from("a\tb"));
        let strict = ParseOptions::new().with_strict_control(true);
        let err = parse_with_options("\"a\tb\"", strict).unwrap_err();
        assert!(matches!(err, Error::Syntax { found: '\t', offset: 2, .. }));
    }
}
