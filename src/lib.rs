//! # jsonbind
//!
//! A JSON value model, parser and path builder, plus a registry that binds Rust
//! types to JSON without per-type boilerplate.
//!
//! ## Key Features
//!
//! - **Value model**: [`Value`] with kind predicates, total accessors that never
//!   panic, and canonical compact rendering through `Display`
//! - **Streaming parser**: [`Parser`] reads one value at a time from any `char`
//!   iterator and reports offsets with a short context window on errors
//! - **Path builder**: [`Builder`] assembles values from `a.b[0].c` style paths
//! - **Converter registry**: [`Registry`] resolves converters by exact type,
//!   then by capability set, then by structural synthesis, and caches the result
//! - **Serde bridge**: [`to_value`] / [`from_value`] for any serde type
//!
//! ## Quick Start
//!
//! ### Parsing and rendering
//!
//! ```rust
//! use jsonbind::{parse, Value};
//!
//! let value = parse(r#"{"name": "jsonbind", "tags": ["json", "bind"], "stars": 4.5}"#).unwrap();
//! assert_eq!(value.member("name").as_string(), "jsonbind");
//! assert_eq!(value.member("tags").element(1), &Value::from("bind"));
//! assert_eq!(value.member("missing"), &Value::Null);
//! assert_eq!(value.to_string(), r#"{"name":"jsonbind","tags":["json","bind"],"stars":4.5}"#);
//! ```
//!
//! ### Building from paths
//!
//! ```rust
//! use jsonbind::Builder;
//!
//! let mut builder = Builder::new();
//! builder
//!     .set("server.host", "localhost")
//!     .set("server.ports[0]", 80)
//!     .set("server.ports[1]", 443);
//! assert_eq!(
//!     builder.build().to_string(),
//!     r#"{"server":{"host":"localhost","ports":[80,443]}}"#
//! );
//! ```
//!
//! ### Binding structs
//!
//! ```rust
//! use jsonbind::{record, Registry};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Server {
//!     host: String,
//!     ports: Vec<u16>,
//! }
//!
//! record!(Server { host, ports });
//!
//! let registry = Registry::new();
//! let server: Server = registry
//!     .unmarshal_str(r#"{"host": "example.org", "ports": [8080]}"#)
//!     .unwrap();
//! assert_eq!(server.ports, vec![8080]);
//! assert_eq!(
//!     registry.marshal_to_string(&server).unwrap(),
//!     r#"{"host":"example.org","ports":[8080]}"#
//! );
//! ```
//!
//! ### Serde types
//!
//! ```rust
//! use jsonbind::{from_str, to_string};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Point { x: i32, y: i32 }
//!
//! let text = to_string(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(text, r#"{"x":1,"y":2}"#);
//! let point: Point = from_str(&text).unwrap();
//! assert_eq!(point, Point { x: 1, y: 2 });
//! ```
//!
//! ## Logging
//!
//! Converter registration and synthesis are reported through [`tracing`] at
//! `debug` level, and interface selection at `trace` level. Nothing is logged
//! on the parse or render paths.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Nesting depth is bounded while parsing, see [`ParseOptions`]
//! - Accessors on [`Value`] return zero values instead of panicking

pub mod bind;
pub mod builder;
pub mod capability;
pub mod de;
pub mod error;
pub mod macros;
pub mod map;
pub mod options;
pub mod parser;
pub mod path;
pub mod record;
pub mod registry;
pub mod ser;
pub mod value;

pub use bind::Bind;
pub use builder::Builder;
pub use capability::{Capability, CapabilitySet, Facets};
pub use de::{from_value, ValueDeserializer};
pub use error::{Error, Result};
pub use map::Map;
pub use options::ParseOptions;
pub use parser::{parse, parse_all, parse_with_options, Parser};
pub use record::{Field, Record};
pub use registry::{InterfaceMarshaller, Marshaller, Registry, Unmarshaller};
pub use ser::{to_value, ValueSerializer};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Serialize any `T: Serialize` to compact JSON text.
///
/// # Examples
///
/// ```rust
/// use jsonbind::to_string;
///
/// assert_eq!(to_string(&vec![Some(1), None]).unwrap(), "[1,null]");
/// ```
///
/// # Errors
///
/// Returns an error if the value has no JSON representation (for example a
/// `u64` above `i64::MAX`).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Ok(to_value(value)?.to_string())
}

/// Serialize any `T: Serialize` as compact JSON into a writer.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string(value)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))
}

/// Deserialize an instance of type `T` from JSON text.
///
/// The text must hold exactly one value, optionally surrounded by whitespace.
///
/// # Examples
///
/// ```rust
/// use jsonbind::from_str;
/// use std::collections::BTreeMap;
///
/// let map: BTreeMap<String, bool> = from_str(r#"{"on": true}"#).unwrap();
/// assert!(map["on"]);
/// ```
///
/// # Errors
///
/// Returns an error if the text is not a single JSON value or cannot be
/// deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut parser = Parser::new(s.chars());
    let value = parser.parse()?;
    let mut rest = parser.into_inner();
    if let Some(ch) = rest.find(|&c| !matches!(c, ' ' | '\t' | '\n' | '\r')) {
        return Err(Error::custom(format!("trailing character `{}` after value", ch)));
    }
    from_value(value)
}

/// Deserialize an instance of type `T` from an I/O stream of JSON.
///
/// # Examples
///
/// ```rust
/// use jsonbind::{from_reader, Value};
/// use std::io::Cursor;
///
/// let value: Value = from_reader(Cursor::new(b"[1, 2]")).unwrap();
/// assert_eq!(value.len(), 2);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not valid JSON, or the data
/// cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of JSON text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid JSON, or
/// cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}
