//! Error types for parsing, building and marshalling JSON.
//!
//! ## Error Categories
//!
//! - **Syntax errors**: the parser cannot continue at the current position. Every
//!   syntax error carries the 0-based character offset and the last characters
//!   consumed before the failure.
//! - **Registration errors**: a duplicate or ambiguous converter registration.
//! - **Type-resolution errors**: no converter exists for a type, or the type's kind
//!   cannot be represented as JSON at all.
//! - **Field/element errors**: a nested conversion failed. The failing field, index
//!   or key wraps the root cause, so the full path is recoverable with [`Error::path`].
//!
//! ## Examples
//!
//! ```rust
//! use jsonbind::parse;
//!
//! let err = parse("[1, 2 3]").unwrap_err();
//! assert!(err.to_string().contains("offset 6"));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents every failure the crate can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error while reading input
    #[error("IO error: {0}")]
    Io(String),

    /// An unexpected character at a structural position
    #[error("syntax error at offset {offset}: unexpected {found:?} after `{context}`")]
    Syntax {
        offset: usize,
        found: char,
        context: String,
    },

    /// Input ended in the middle of a value
    #[error("unexpected end of input at offset {offset}: expected {expected} after `{context}`")]
    UnexpectedEof {
        offset: usize,
        expected: String,
        context: String,
    },

    /// Malformed or out-of-range number literal
    #[error("invalid number `{literal}` at offset {offset}")]
    InvalidNumber { offset: usize, literal: String },

    /// Unknown backslash escape or malformed `\u` sequence
    #[error("invalid escape at offset {offset}: {msg} after `{context}`")]
    InvalidEscape {
        offset: usize,
        msg: String,
        context: String,
    },

    /// A UTF-16 surrogate without its partner
    #[error("unpaired surrogate \\u{unit:04x} at offset {offset}")]
    LoneSurrogate { offset: usize, unit: u16 },

    /// Arrays and objects nested beyond the configured limit
    #[error("nesting deeper than {limit} levels at offset {offset}")]
    DepthLimit { offset: usize, limit: usize },

    /// A converter for this concrete type already exists
    #[error("converter already registered for `{type_name}`")]
    DuplicateConverter { type_name: String },

    /// An interface converter for the identical capability set already exists
    #[error("interface converter already registered for {capabilities}")]
    DuplicateInterface { capabilities: String },

    /// Two interface converters whose capability sets do not refine one another
    #[error("interface converter for {new} is ambiguous with {existing}")]
    AmbiguousInterface { new: String, existing: String },

    /// Nothing registered and no structural shape known for the type
    #[error("no converter for `{type_name}`")]
    NoConverter { type_name: String },

    /// The type's kind has no JSON representation
    #[error("cannot convert `{type_name}`: unsupported {kind}")]
    Unsupported { type_name: String, kind: String },

    /// Value kind does not match the target type
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Numeric value does not fit the target type
    #[error("value {value} out of range for {target}")]
    OutOfRange { target: String, value: String },

    /// A struct field failed to convert
    #[error("field `{name}`: {source}")]
    Field { name: String, source: Box<Error> },

    /// A slice element failed to convert
    #[error("index {index}: {source}")]
    Index { index: usize, source: Box<Error> },

    /// A map member failed to convert
    #[error("key `{key}`: {source}")]
    Key { key: String, source: Box<Error> },

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error for an unexpected character.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsonbind::Error;
    ///
    /// let err = Error::syntax(7, 'x', "[1, 2, ");
    /// assert!(err.to_string().contains("offset 7"));
    /// ```
    pub fn syntax(offset: usize, found: char, context: &str) -> Self {
        Error::Syntax {
            offset,
            found,
            context: context.to_string(),
        }
    }

    /// Creates an end-of-input error.
    pub fn unexpected_eof(offset: usize, expected: &str, context: &str) -> Self {
        Error::UnexpectedEof {
            offset,
            expected: expected.to_string(),
            context: context.to_string(),
        }
    }

    pub fn invalid_escape(offset: usize, msg: &str, context: &str) -> Self {
        Error::InvalidEscape {
            offset,
            msg: msg.to_string(),
            context: context.to_string(),
        }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsonbind::Error;
    ///
    /// let err = Error::type_mismatch("int", "string");
    /// assert!(err.to_string().contains("expected int"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn out_of_range(target: &str, value: impl fmt::Display) -> Self {
        Error::OutOfRange {
            target: target.to_string(),
            value: value.to_string(),
        }
    }

    pub fn no_converter(type_name: &str) -> Self {
        Error::NoConverter {
            type_name: type_name.to_string(),
        }
    }

    pub fn unsupported(type_name: &str, kind: &str) -> Self {
        Error::Unsupported {
            type_name: type_name.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Wraps this error with the struct field it occurred in.
    pub fn in_field(self, name: &str) -> Self {
        Error::Field {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// Wraps this error with the slice index it occurred at.
    pub fn at_index(self, index: usize) -> Self {
        Error::Index {
            index,
            source: Box::new(self),
        }
    }

    /// Wraps this error with the map key it occurred under.
    pub fn under_key(self, key: &str) -> Self {
        Error::Key {
            key: key.to_string(),
            source: Box::new(self),
        }
    }

    /// Reconstructs the path of fields, indices and keys leading to the root cause.
    ///
    /// Keys containing `.` or `[` are escaped the way [`crate::Builder`] paths are.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsonbind::Error;
    ///
    /// let err = Error::type_mismatch("int", "string")
    ///     .at_index(2)
    ///     .in_field("ports")
    ///     .in_field("server");
    /// assert_eq!(err.path(), "server.ports[2]");
    /// ```
    pub fn path(&self) -> String {
        let mut path = String::new();
        let mut current = self;
        loop {
            match current {
                Error::Field { name, source } => {
                    push_key(&mut path, name);
                    current = source;
                }
                Error::Key { key, source } => {
                    push_key(&mut path, key);
                    current = source;
                }
                Error::Index { index, source } => {
                    path.push_str(&format!("[{}]", index));
                    current = source;
                }
                _ => return path,
            }
        }
    }

    /// Returns the innermost error, skipping field/index/key wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Field { source, .. } | Error::Index { source, .. } | Error::Key { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Returns `true` for errors raised by the parser.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Error::Syntax { .. }
                | Error::UnexpectedEof { .. }
                | Error::InvalidNumber { .. }
                | Error::InvalidEscape { .. }
                | Error::LoneSurrogate { .. }
                | Error::DepthLimit { .. }
        )
    }
}

fn push_key(path: &mut String, key: &str) {
    if !path.is_empty() {
        path.push('.');
    }
    path.push_str(&crate::path::escape(key));
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_mixes_fields_keys_and_indices() {
        let err = Error::type_mismatch("bool", "int")
            .in_field("enabled")
            .under_key("a.b")
            .at_index(0)
            .in_field("plugins");
        assert_eq!(err.path(), "plugins[0].a\\.b.enabled");
        assert_eq!(err.root_cause(), &Error::type_mismatch("bool", "int"));
    }

    #[test]
    fn test_display_keeps_root_cause() {
        let err = Error::out_of_range("u8", 300).in_field("level");
        let text = err.to_string();
        assert!(text.contains("field `level`"));
        assert!(text.contains("300 out of range for u8"));
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;
        let err = Error::type_mismatch("int", "null").at_index(3);
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("type mismatch: expected int, found null"));
    }

    #[test]
    fn test_is_syntax() {
        assert!(Error::syntax(0, 'x', "").is_syntax());
        assert!(!Error::no_converter("Foo").is_syntax());
    }
}
