//! Structural converter synthesis.
//!
//! [`Bind`] tells a [`Registry`] how to build converters for a type from its
//! shape when nothing more specific is registered. Composite shapes resolve the
//! converters of their parts through the registry when they are synthesized, so
//! registering a converter for `u8` changes how `Vec<u8>` marshals too.
//!
//! | Shape | Marshals to | Unmarshals from |
//! |-------|-------------|-----------------|
//! | `bool`, integers, floats, `char`, `String` | the matching scalar | the matching scalar, `null` gives the zero value |
//! | `Option<T>`, `Box<T>`, `Arc<T>` | the pointee, `None` as `null` | `null` as `None`, otherwise the pointee |
//! | `Vec<T>` | array | array, `null` gives an empty vector |
//! | `HashMap`/`BTreeMap`/`IndexMap` with `String` keys | object | object, `null` gives an empty map |
//! | records (see [`crate::record!`]) | object keyed by field tag | object, absent members keep their zero value |
//! | channels, function pointers | unsupported | unsupported |
//!
//! Types that implement `Bind` without overriding anything have no structural
//! converter; they can still marshal through an explicit registration or an
//! interface converter.

use crate::error::{Error, Result};
use crate::registry::{Marshaller, Registry, Unmarshaller};
use crate::{Map, Value};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use num_bigint::BigInt;
use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::{mpsc, Arc};

/// A type the registry can synthesize converters for.
pub trait Bind: Sized + 'static {
    /// Builds the structural marshaller.
    fn marshaller(_registry: &Registry) -> Result<Marshaller<Self>> {
        Err(Error::no_converter(type_name::<Self>()))
    }

    /// Builds the structural unmarshaller.
    fn unmarshaller(_registry: &Registry) -> Result<Unmarshaller<Self>> {
        Err(Error::no_converter(type_name::<Self>()))
    }
}

macro_rules! bind_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Bind for $ty {
                fn marshaller(_: &Registry) -> Result<Marshaller<Self>> {
                    Ok(Arc::new(|value: &$ty, _: &Registry| {
                        i64::try_from(*value)
                            .map(Value::Int)
                            .map_err(|_| Error::out_of_range("i64", value))
                    }))
                }

                fn unmarshaller(_: &Registry) -> Result<Unmarshaller<Self>> {
                    Ok(Arc::new(|value: &Value, _: &Registry| match value {
                        Value::Null => Ok(0),
                        Value::Int(i) => {
                            <$ty>::try_from(*i).map_err(|_| Error::out_of_range(stringify!($ty), i))
                        }
                        other => Err(Error::type_mismatch("integer", other.kind())),
                    }))
                }
            }
        )*
    };
}

bind_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! bind_float {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Bind for $ty {
                fn marshaller(_: &Registry) -> Result<Marshaller<Self>> {
                    Ok(Arc::new(|value: &$ty, _: &Registry| {
                        if value.is_finite() {
                            Ok(Value::Float(f64::from(*value)))
                        } else {
                            Err(Error::out_of_range("finite number", value))
                        }
                    }))
                }

                fn unmarshaller(_: &Registry) -> Result<Unmarshaller<Self>> {
                    Ok(Arc::new(|value: &Value, _: &Registry| match value {
                        Value::Null => Ok(0.0),
                        Value::Float(f) => Ok(*f as $ty),
                        Value::Int(i) => Ok(*i as $ty),
                        other => Err(Error::type_mismatch("number", other.kind())),
                    }))
                }
            }
        )*
    };
}

bind_float!(f32, f64);

impl Bind for bool {
    fn marshaller(_: &Registry) -> Result<Marshaller<Self>> {
        Ok(Arc::new(|value: &bool, _: &Registry| Ok(Value::Bool(*value))))
    }

    fn unmarshaller(_: &Registry) -> Result<Unmarshaller<Self>> {
        Ok(Arc::new(|value: &Value, _: &Registry| match value {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(*b),
            other => Err(Error::type_mismatch("bool", other.kind())),
        }))
    }
}

impl Bind for String {
    fn marshaller(_: &Registry) -> Result<Marshaller<Self>> {
        Ok(Arc::new(|value: &String, _: &Registry| Ok(Value::String(value.clone()))))
    }

    fn unmarshaller(_: &Registry) -> Result<Unmarshaller<Self>> {
        Ok(Arc::new(|value: &Value, _: &Registry| match value {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s.clone()),
            other => Err(Error::type_mismatch("string", other.kind())),
        }))
    }
}

impl Bind for char {
    fn marshaller(_: &Registry) -> Result<Marshaller<Self>> {
        Ok(Arc::new(|value: &char, _: &Registry| Ok(Value::String(value.to_string()))))
    }

    fn unmarshaller(_: &Registry) -> Result<Unmarshaller<Self>> {
        Ok(Arc::new(|value: &Value, _: &Registry| match value {
            Value::Null => Ok('\0'),
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Ok(ch),
                    _ => Err(Error::type_mismatch("single-character string", "string")),
                }
            }
            other => Err(Error::type_mismatch("string", other.kind())),
        }))
    }
}

impl Bind for Value {
    fn marshaller(_: &Registry) -> Result<Marshaller<Self>> {
        Ok(Arc::new(|value: &Value, _: &Registry| Ok(value.clone())))
    }

    fn unmarshaller(_: &Registry) -> Result<Unmarshaller<Self>> {
        Ok(Arc::new(|value: &Value, _: &Registry| Ok(value.clone())))
    }
}

impl Bind for Map {
    fn marshaller(_: &Registry) -> Result<Marshaller<Self>> {
        Ok(Arc::new(|map: &Map, _: &Registry| Ok(Value::Object(map.clone()))))
    }

    fn unmarshaller(_: &Registry) -> Result<Unmarshaller<Self>> {
        Ok(Arc::new(|value: &Value, _: &Registry| match value {
            Value::Null => Ok(Map::new()),
            Value::Object(map) => Ok(map.clone()),
            other => Err(Error::type_mismatch("object", other.kind())),
        }))
    }
}

impl<T: Bind> Bind for Option<T> {
    fn marshaller(registry: &Registry) -> Result<Marshaller<Self>> {
        let inner = registry.marshaller::<T>()?;
        Ok(Arc::new(move |value: &Option<T>, registry: &Registry| match value {
            Some(value) => inner(value, registry),
            None => Ok(Value::Null),
        }))
    }

    fn unmarshaller(registry: &Registry) -> Result<Unmarshaller<Self>> {
        let inner = registry.unmarshaller::<T>()?;
        Ok(Arc::new(move |value: &Value, registry: &Registry| match value {
            Value::Null => Ok(None),
            value => inner(value, registry).map(Some),
        }))
    }
}

impl<T: Bind> Bind for Box<T> {
    fn marshaller(registry: &Registry) -> Result<Marshaller<Self>> {
        let inner = registry.marshaller::<T>()?;
        Ok(Arc::new(move |value: &Box<T>, registry: &Registry| inner(&**value, registry)))
    }

    fn unmarshaller(registry: &Registry) -> Result<Unmarshaller<Self>> {
        let inner = registry.unmarshaller::<T>()?;
        Ok(Arc::new(move |value: &Value, registry: &Registry| {
            inner(value, registry).map(Box::new)
        }))
    }
}

impl<T: Bind> Bind for Arc<T> {
    fn marshaller(registry: &Registry) -> Result<Marshaller<Self>> {
        let inner = registry.marshaller::<T>()?;
        Ok(Arc::new(move |value: &Arc<T>, registry: &Registry| inner(&**value, registry)))
    }

    fn unmarshaller(registry: &Registry) -> Result<Unmarshaller<Self>> {
        let inner = registry.unmarshaller::<T>()?;
        Ok(Arc::new(move |value: &Value, registry: &Registry| {
            inner(value, registry).map(Arc::new)
        }))
    }
}

impl<T: Bind> Bind for Vec<T> {
    fn marshaller(registry: &Registry) -> Result<Marshaller<Self>> {
        let inner = registry.marshaller::<T>()?;
        Ok(Arc::new(move |items: &Vec<T>, registry: &Registry| {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| inner(item, registry).map_err(|e| e.at_index(i)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }))
    }

    fn unmarshaller(registry: &Registry) -> Result<Unmarshaller<Self>> {
        let inner = registry.unmarshaller::<T>()?;
        Ok(Arc::new(move |value: &Value, registry: &Registry| -> Result<Vec<T>> {
            match value {
                Value::Null => Ok(Vec::new()),
                Value::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| inner(item, registry).map_err(|e| e.at_index(i)))
                    .collect(),
                other => Err(Error::type_mismatch("array", other.kind())),
            }
        }))
    }
}

/// Map keys are carried as JSON member names, so only `String` keys bind.
fn require_string_keys<K: 'static, M>() -> Result<()> {
    if TypeId::of::<K>() == TypeId::of::<String>() {
        Ok(())
    } else {
        Err(Error::unsupported(type_name::<M>(), "map with non-string keys"))
    }
}

fn key_text<K: 'static>(key: &K) -> Result<&str> {
    (key as &dyn Any)
        .downcast_ref::<String>()
        .map(String::as_str)
        .ok_or_else(|| Error::unsupported(type_name::<K>(), "map key"))
}

fn key_from_text<K: 'static>(text: &str) -> Result<K> {
    let boxed: Box<dyn Any> = Box::new(text.to_string());
    boxed
        .downcast::<K>()
        .map(|key| *key)
        .map_err(|_| Error::unsupported(type_name::<K>(), "map key"))
}

fn marshal_members<'a, K, V>(
    members: impl Iterator<Item = (&'a K, &'a V)>,
    inner: &Marshaller<V>,
    registry: &Registry,
    sort: bool,
) -> Result<Value>
where
    K: 'static,
    V: 'static,
{
    let mut pairs = members
        .map(|(key, value)| -> Result<(&str, &V)> { Ok((key_text(key)?, value)) })
        .collect::<Result<Vec<_>>>()?;
    if sort {
        pairs.sort_by(|a, b| a.0.cmp(b.0));
    }

    let mut map = Map::with_capacity(pairs.len());
    for (key, value) in pairs {
        let value = inner(value, registry).map_err(|e| e.under_key(key))?;
        map.insert(key.to_string(), value);
    }
    Ok(Value::Object(map))
}

fn unmarshal_members<K, V, M>(value: &Value, inner: &Unmarshaller<V>, registry: &Registry) -> Result<M>
where
    K: 'static,
    M: FromIterator<(K, V)>,
{
    match value {
        Value::Null => Ok(std::iter::empty::<(K, V)>().collect()),
        Value::Object(map) => map
            .iter()
            .map(|(key, member)| -> Result<(K, V)> {
                let member = inner(member, registry).map_err(|e| e.under_key(key))?;
                Ok((key_from_text::<K>(key)?, member))
            })
            .collect(),
        other => Err(Error::type_mismatch("object", other.kind())),
    }
}

macro_rules! bind_map {
    ($map:ident, $sorted:expr, $($bound:path),+) => {
        impl<K, V> Bind for $map<K, V>
        where
            K: $($bound +)+ 'static,
            V: Bind,
        {
            fn marshaller(registry: &Registry) -> Result<Marshaller<Self>> {
                require_string_keys::<K, Self>()?;
                let inner = registry.marshaller::<V>()?;
                Ok(Arc::new(move |map: &$map<K, V>, registry: &Registry| {
                    marshal_members(map.iter(), &inner, registry, $sorted)
                }))
            }

            fn unmarshaller(registry: &Registry) -> Result<Unmarshaller<Self>> {
                require_string_keys::<K, Self>()?;
                let inner = registry.unmarshaller::<V>()?;
                Ok(Arc::new(move |value: &Value, registry: &Registry| {
                    unmarshal_members::<K, V, Self>(value, &inner, registry)
                }))
            }
        }
    };
}

// HashMap iteration order is unspecified, so its output is sorted by key.
bind_map!(HashMap, true, Eq, Hash);
bind_map!(BTreeMap, false, Ord);
bind_map!(IndexMap, false, Eq, Hash);

impl Bind for DateTime<Utc> {
    fn marshaller(_: &Registry) -> Result<Marshaller<Self>> {
        Ok(Arc::new(|value: &DateTime<Utc>, _: &Registry| {
            Ok(Value::String(value.to_rfc3339()))
        }))
    }

    fn unmarshaller(_: &Registry) -> Result<Unmarshaller<Self>> {
        Ok(Arc::new(|value: &Value, _: &Registry| match value {
            Value::Null => Ok(DateTime::<Utc>::default()),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|time| time.with_timezone(&Utc))
                .map_err(|e| Error::custom(format!("invalid RFC 3339 timestamp `{}`: {}", s, e))),
            other => Err(Error::type_mismatch("string", other.kind())),
        }))
    }
}

impl Bind for BigInt {
    fn marshaller(_: &Registry) -> Result<Marshaller<Self>> {
        Ok(Arc::new(|value: &BigInt, _: &Registry| {
            Ok(match i64::try_from(value) {
                Ok(small) => Value::Int(small),
                Err(_) => Value::String(value.to_string()),
            })
        }))
    }

    fn unmarshaller(_: &Registry) -> Result<Unmarshaller<Self>> {
        Ok(Arc::new(|value: &Value, _: &Registry| match value {
            Value::Null => Ok(BigInt::default()),
            Value::Int(i) => Ok(BigInt::from(*i)),
            Value::String(s) => s
                .parse::<BigInt>()
                .map_err(|_| Error::type_mismatch("integer text", "string")),
            other => Err(Error::type_mismatch("integer", other.kind())),
        }))
    }
}

macro_rules! bind_unsupported {
    ($kind:literal, $($ty:ty),+ $(,)?) => {
        $(
            impl<T: 'static> Bind for $ty {
                fn marshaller(_: &Registry) -> Result<Marshaller<Self>> {
                    Err(Error::unsupported(type_name::<Self>(), $kind))
                }

                fn unmarshaller(_: &Registry) -> Result<Unmarshaller<Self>> {
                    Err(Error::unsupported(type_name::<Self>(), $kind))
                }
            }
        )+
    };
}

bind_unsupported!("channel", mpsc::Sender<T>, mpsc::SyncSender<T>, mpsc::Receiver<T>);
bind_unsupported!("function", fn() -> T);
