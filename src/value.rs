//! The JSON value model.
//!
//! [`Value`] is an immutable tagged variant with exactly one active case. `Int` and
//! `Float` are distinct: `42` parses as `Int`, `42.0` and `4.2e1` parse as `Float`.
//!
//! ## Forgiving accessors
//!
//! Every accessor is defined on every variant. Asking the wrong kind returns that
//! accessor's empty answer instead of failing:
//!
//! ```rust
//! use jsonbind::Value;
//!
//! let value = Value::Bool(true);
//! assert_eq!(value.as_string(), "");
//! assert_eq!(value.as_int(), 0);
//! assert!(value.keys().is_empty());
//! assert!(value.member("missing").is_null());
//! assert!(value.element(3).is_null());
//! ```
//!
//! ## Canonical text
//!
//! `Display` renders compact JSON with no whitespace, object members in insertion
//! order, and every character outside printable ASCII escaped as `\uXXXX`:
//!
//! ```rust
//! use jsonbind::{json, Value};
//!
//! let value = json!({"name": "Zoë", "tags": [1, 2.5, null]});
//! assert_eq!(value.to_string(), r#"{"name":"Zo\u00eb","tags":[1,2.5,null]}"#);
//! ```

use crate::Map;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Write};

static NULL: Value = Value::Null;

/// A JSON value.
///
/// # Examples
///
/// ```rust
/// use jsonbind::Value;
///
/// let int = Value::Int(42);
/// let float = Value::Float(42.0);
/// assert!(int.is_int());
/// assert!(float.is_float());
/// assert_ne!(int, float);
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// The boolean, or `false` for any other kind.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            _ => false,
        }
    }

    /// The integer, or `0` for any other kind (floats included).
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(i) => *i,
            _ => 0,
        }
    }

    /// The float, or `0.0` for any other kind (integers included).
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Float(f) => *f,
            _ => 0.0,
        }
    }

    /// The string contents, or `""` for any other kind.
    #[inline]
    #[must_use]
    pub fn as_string(&self) -> &str {
        match self {
            Value::String(s) => s,
            _ => "",
        }
    }

    /// Object keys in insertion order; empty for any other kind.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Value::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// The member under `key`, or `Null` when absent or not an object.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsonbind::json;
    ///
    /// let value = json!({"port": 8080});
    /// assert_eq!(value.member("port").as_int(), 8080);
    /// assert!(value.member("host").is_null());
    /// ```
    #[must_use]
    pub fn member(&self, key: &str) -> &Value {
        match self {
            Value::Object(map) => map.get(key).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Array length; `0` for any other kind.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Value::Array(items) => items.len(),
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at `index`, or `Null` when out of range or not an array.
    #[must_use]
    pub fn element(&self, index: usize) -> &Value {
        match self {
            Value::Array(items) => items.get(index).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Kind name used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

/// Writes `s` as a quoted JSON string.
///
/// Printable ASCII passes through except `"` and `\`. Control characters use the
/// two-letter escapes where one exists; everything else becomes `\uXXXX`, split into
/// a surrogate pair above the Basic Multilingual Plane.
pub(crate) fn write_quoted<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\u{0008}' => out.write_str("\\b")?,
            '\u{000C}' => out.write_str("\\f")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            ' '..='~' => out.write_char(ch)?,
            _ => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(out, "\\u{:04x}", unit)?;
                }
            }
        }
    }
    out.write_char('"')
}

fn write_float<W: Write>(out: &mut W, f: f64) -> fmt::Result {
    if f.is_finite() {
        // Debug keeps a `.0` or exponent, so the text reparses as a float.
        write!(out, "{:?}", f)
    } else {
        out.write_str("null")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write_float(f, *fl),
            Value::String(s) => write_quoted(f, s),
            Value::Array(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                f.write_char(']')
            }
            Value::Object(map) => {
                f.write_char('{')?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write_quoted(f, key)?;
                    f.write_char(':')?;
                    fmt::Display::fmt(value, f)?;
                }
                f.write_char('}')
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                use serde::ser::SerializeMap;
                let mut members = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    members.serialize_entry(k, v)?;
                }
                members.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid JSON value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Value, E> {
                Ok(Value::Int(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Value, E> {
                match i64::try_from(value) {
                    Ok(i) => Ok(Value::Int(i)),
                    Err(_) => Ok(Value::Float(value as f64)),
                }
            }

            fn visit_f64<E>(self, value: f64) -> Result<Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::Array(items))
            }

            fn visit_map<A>(self, mut access: A) -> Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut members = Map::new();
                while let Some((key, value)) = access.next_entry()? {
                    members.insert(key, value);
                }
                Ok(Value::Object(members))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(crate::Error::type_mismatch("int", other.kind())),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            other => Err(crate::Error::type_mismatch("float", other.kind())),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(crate::Error::type_mismatch("bool", other.kind())),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(crate::Error::type_mismatch("string", other.kind())),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(members: &[(&str, Value)]) -> Value {
        Value::Object(
            members
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_wrong_kind_accessors_return_empty_answers() {
        let values = [
            Value::Null,
            Value::Bool(true),
            Value::Int(7),
            Value::Float(1.5),
            Value::from("x"),
            Value::Array(vec![Value::Int(1)]),
            object(&[("a", Value::Int(1))]),
        ];
        for value in &values {
            if !value.is_string() {
                assert_eq!(value.as_string(), "");
            }
            if !value.is_int() {
                assert_eq!(value.as_int(), 0);
            }
            if !value.is_float() {
                assert_eq!(value.as_float(), 0.0);
            }
            if !value.is_bool() {
                assert!(!value.as_bool());
            }
            if !value.is_object() {
                assert!(value.keys().is_empty());
                assert!(value.member("a").is_null());
            }
            if !value.is_array() {
                assert_eq!(value.len(), 0);
                assert!(value.element(0).is_null());
            }
        }
    }

    #[test]
    fn test_member_and_element_lookup() {
        let value = object(&[
            ("b", Value::Int(2)),
            ("a", Value::Array(vec![Value::from("x"), Value::Null])),
        ]);
        assert_eq!(value.keys(), vec!["b", "a"]);
        assert_eq!(value.member("b").as_int(), 2);
        assert_eq!(value.member("a").element(0).as_string(), "x");
        assert!(value.member("a").element(5).is_null());
        assert_eq!(value.member("a").len(), 2);
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Int(-12).to_string(), "-12");
        assert_eq!(Value::Float(42.0).to_string(), "42.0");
        assert_eq!(Value::Float(0.1).to_string(), "0.1");
        assert_eq!(Value::Float(1e21).to_string(), "1e21");
        assert_eq!(Value::Float(f64::NAN).to_string(), "null");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "null");
    }

    #[test]
    fn test_render_string_escapes() {
        let value = Value::from("a\"b\\c/\u{8}\u{c}\n\r\t\u{1}\u{7f}é\u{1F920}");
        assert_eq!(
            value.to_string(),
            r#""a\"b\\c/\b\f\n\r\t\u0001\u007f\u00e9\ud83e\udd20""#
        );
    }

    #[test]
    fn test_render_containers_in_insertion_order() {
        let value = object(&[
            ("z", Value::Array(vec![])),
            ("a.b", object(&[])),
            ("m", Value::Array(vec![Value::Int(1), Value::Bool(true)])),
        ]);
        assert_eq!(value.to_string(), r#"{"z":[],"a.b":{},"m":[1,true]}"#);
    }

    #[test]
    fn test_tryfrom() {
        assert_eq!(i64::try_from(Value::Int(4)).unwrap(), 4);
        assert!(i64::try_from(Value::Float(4.0)).is_err());
        assert_eq!(f64::try_from(Value::Int(4)).unwrap(), 4.0);
        assert!(bool::try_from(Value::Int(1)).is_err());
        assert_eq!(String::try_from(Value::from("s")).unwrap(), "s");
    }

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42u8), Value::Int(42));
        assert_eq!(Value::from(3.5f32), Value::Float(3.5));
        assert_eq!(Value::from("s".to_string()), Value::String("s".to_string()));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::Int(0).kind(), "int");
        assert_eq!(Value::Float(0.0).kind(), "float");
        assert_eq!(object(&[]).kind(), "object");
    }
}
