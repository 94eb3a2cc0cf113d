//! Struct-shaped converters.
//!
//! A [`Record`] lists its fields; each field knows its wire key and how to read
//! and write itself on the struct. Field converters are resolved through the
//! registry on every call rather than at synthesis, so a record may contain
//! itself behind an `Option<Box<_>>` or a `Vec`.
//!
//! The [`crate::record!`] macro writes the `Record` and [`Bind`] impls:
//!
//! ```rust
//! use jsonbind::{record, Registry};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Listener {
//!     host: String,
//!     port: u16,
//!     tls: bool,
//! }
//!
//! record!(Listener { host, port => "listen_port", tls });
//!
//! let registry = Registry::new();
//! let listener = Listener { host: "::1".to_string(), port: 8443, tls: true };
//! let text = registry.marshal_to_string(&listener).unwrap();
//! assert_eq!(text, r#"{"host":"::1","listen_port":8443,"tls":true}"#);
//!
//! let partial: Listener = registry.unmarshal_str(r#"{"host":"localhost"}"#).unwrap();
//! assert_eq!(partial, Listener { host: "localhost".to_string(), ..Listener::default() });
//! ```
//!
//! [`Bind`]: crate::Bind

use crate::bind::Bind;
use crate::builder::Builder;
use crate::error::{Error, Result};
use crate::path;
use crate::registry::{Marshaller, Registry, Unmarshaller};
use crate::{Map, Value};
use std::fmt;
use std::sync::Arc;

type FieldMarshal<S> = Box<dyn Fn(&S, &Registry) -> Result<Value> + Send + Sync>;
type FieldUnmarshal<S> = Box<dyn Fn(&mut S, &Value, &Registry) -> Result<()> + Send + Sync>;

/// One field of a record.
pub struct Field<S> {
    name: &'static str,
    key: &'static str,
    marshal: FieldMarshal<S>,
    unmarshal: FieldUnmarshal<S>,
}

impl<S: 'static> Field<S> {
    /// Describes field `name`, reached through `get` and `get_mut`.
    ///
    /// The wire key defaults to the field name.
    pub fn new<T: Bind>(name: &'static str, get: fn(&S) -> &T, get_mut: fn(&mut S) -> &mut T) -> Self {
        Field {
            name,
            key: name,
            marshal: Box::new(move |record: &S, registry: &Registry| registry.marshal(get(record))),
            unmarshal: Box::new(move |record: &mut S, value: &Value, registry: &Registry| {
                *get_mut(record) = registry.unmarshal::<T>(value)?;
                Ok(())
            }),
        }
    }

    /// Overrides the wire key.
    #[must_use]
    pub fn tag(mut self, key: &'static str) -> Self {
        self.key = key;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self) -> &'static str {
        self.key
    }
}

impl<S> fmt::Debug for Field<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("key", &self.key)
            .finish()
    }
}

/// A struct that binds as a JSON object, one member per field.
pub trait Record: Default + 'static {
    fn fields() -> Vec<Field<Self>>;
}

/// Builds the object marshaller for a record.
///
/// A record with no fields marshals to `{}`.
pub fn record_marshaller<S: Record>() -> Marshaller<S> {
    let fields = S::fields();
    Arc::new(move |record: &S, registry: &Registry| {
        if fields.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        let mut builder = Builder::new();
        for field in &fields {
            let value = (field.marshal)(record, registry).map_err(|e| e.in_field(field.key))?;
            builder.set(&path::escape(field.key), value);
        }
        Ok(builder.build())
    })
}

/// Builds the object unmarshaller for a record.
///
/// `null` gives the default record, and members missing from the object leave
/// their fields at the zero value of the field type.
pub fn record_unmarshaller<S: Record>() -> Unmarshaller<S> {
    let fields = S::fields();
    Arc::new(move |value: &Value, registry: &Registry| {
        let mut record = S::default();
        match value {
            Value::Null => return Ok(record),
            Value::Object(_) => {}
            other => return Err(Error::type_mismatch("object", other.kind())),
        }
        for field in &fields {
            (field.unmarshal)(&mut record, value.member(field.key), registry)
                .map_err(|e| e.in_field(field.key))?;
        }
        Ok(record)
    })
}
