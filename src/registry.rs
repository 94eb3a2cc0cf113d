//! Converter registry: maps Rust types to marshal/unmarshal functions.
//!
//! Lookup for a type `T` goes, in order:
//!
//! 1. the exact converter cache (explicit registrations and earlier syntheses),
//! 2. interface converters, most specific capability set first (marshal only),
//! 3. structural synthesis through [`Bind`],
//!
//! and fails with [`Error::NoConverter`] when none applies. Synthesized converters
//! are cached, so each type is synthesized at most once per registry even under
//! concurrent first use.
//!
//! Register converters before the registry is shared; registrations that race
//! with lookups of the same type are not ordered against them.

use crate::bind::Bind;
use crate::capability::{CapabilitySet, Facets, Provided};
use crate::error::{Error, Result};
use crate::parser;
use crate::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{type_name, Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Converts a `T` into a [`Value`].
pub type Marshaller<T> = Arc<dyn Fn(&T, &Registry) -> Result<Value> + Send + Sync>;

/// Converts a [`Value`] into a `T`.
pub type Unmarshaller<T> = Arc<dyn Fn(&Value, &Registry) -> Result<T> + Send + Sync>;

/// Converts any value whose type provides a capability set.
pub type InterfaceMarshaller = Arc<dyn Fn(&Facets<'_>, &Registry) -> Result<Value> + Send + Sync>;

type Erased = Arc<dyn Any + Send + Sync>;
type Cache = RwLock<HashMap<TypeId, Erased>>;

struct Interface {
    capabilities: CapabilitySet,
    marshal: InterfaceMarshaller,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn cached<C: Clone + 'static>(cache: &Cache, id: TypeId) -> Option<C> {
    read(cache).get(&id)?.downcast_ref::<C>().cloned()
}

/// Stores `built` unless another thread got there first; returns the winner.
fn insert_if_absent<C: Clone + Send + Sync + 'static>(
    cache: &Cache,
    id: TypeId,
    built: C,
    type_name: &str,
) -> C {
    let mut map = write(cache);
    match map.entry(id) {
        Entry::Occupied(entry) => match entry.get().downcast_ref::<C>() {
            Some(existing) => {
                debug!("Converter for {} already cached, discarding duplicate", type_name);
                existing.clone()
            }
            None => built,
        },
        Entry::Vacant(entry) => {
            entry.insert(Arc::new(built.clone()));
            built
        }
    }
}

/// The set of known converters.
///
/// A registry is `Send + Sync`; share it behind a reference or an [`Arc`].
///
/// # Examples
///
/// ```rust
/// use jsonbind::{Registry, Value};
/// use std::collections::BTreeMap;
///
/// let registry = Registry::new();
/// let mut ports = BTreeMap::new();
/// ports.insert("http".to_string(), 80u16);
/// ports.insert("https".to_string(), 443u16);
///
/// let value = registry.marshal(&ports).unwrap();
/// assert_eq!(value.to_string(), r#"{"http":80,"https":443}"#);
///
/// let back: BTreeMap<String, u16> = registry.unmarshal(&value).unwrap();
/// assert_eq!(back, ports);
/// ```
#[derive(Default)]
pub struct Registry {
    marshallers: Cache,
    unmarshallers: Cache,
    interfaces: RwLock<Vec<Interface>>,
    provided: RwLock<HashMap<TypeId, Arc<Provided>>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an exact marshaller for `T`.
    ///
    /// Fails with [`Error::DuplicateConverter`] if `T` already has one.
    pub fn register_marshaller<T, F>(&self, marshal: F) -> Result<()>
    where
        T: 'static,
        F: Fn(&T, &Registry) -> Result<Value> + Send + Sync + 'static,
    {
        let marshaller: Marshaller<T> = Arc::new(marshal);
        let mut map = write(&self.marshallers);
        match map.entry(TypeId::of::<T>()) {
            Entry::Occupied(_) => Err(Error::DuplicateConverter {
                type_name: type_name::<T>().to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(marshaller));
                debug!("Registered marshaller for {}", type_name::<T>());
                Ok(())
            }
        }
    }

    /// Registers an exact unmarshaller for `T`.
    ///
    /// Fails with [`Error::DuplicateConverter`] if `T` already has one.
    pub fn register_unmarshaller<T, F>(&self, unmarshal: F) -> Result<()>
    where
        T: 'static,
        F: Fn(&Value, &Registry) -> Result<T> + Send + Sync + 'static,
    {
        let unmarshaller: Unmarshaller<T> = Arc::new(unmarshal);
        let mut map = write(&self.unmarshallers);
        match map.entry(TypeId::of::<T>()) {
            Entry::Occupied(_) => Err(Error::DuplicateConverter {
                type_name: type_name::<T>().to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(unmarshaller));
                debug!("Registered unmarshaller for {}", type_name::<T>());
                Ok(())
            }
        }
    }

    /// Registers both directions for `T`; registers neither if either exists.
    pub fn register<T, M, U>(&self, marshal: M, unmarshal: U) -> Result<()>
    where
        T: 'static,
        M: Fn(&T, &Registry) -> Result<Value> + Send + Sync + 'static,
        U: Fn(&Value, &Registry) -> Result<T> + Send + Sync + 'static,
    {
        let id = TypeId::of::<T>();
        let mut marshallers = write(&self.marshallers);
        let mut unmarshallers = write(&self.unmarshallers);
        if marshallers.contains_key(&id) || unmarshallers.contains_key(&id) {
            return Err(Error::DuplicateConverter {
                type_name: type_name::<T>().to_string(),
            });
        }

        let marshaller: Marshaller<T> = Arc::new(marshal);
        let unmarshaller: Unmarshaller<T> = Arc::new(unmarshal);
        marshallers.insert(id, Arc::new(marshaller));
        unmarshallers.insert(id, Arc::new(unmarshaller));
        debug!("Registered converters for {}", type_name::<T>());
        Ok(())
    }

    /// Registers converters for `T` that go through its serde implementations.
    pub fn register_serde<T>(&self) -> Result<()>
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        self.register(
            |value: &T, _: &Registry| crate::to_value(value),
            |value: &Value, _: &Registry| crate::from_value(value.clone()),
        )
    }

    /// Declares that `T` provides capability `C`, viewed through `cast`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsonbind::Registry;
    /// use std::fmt;
    ///
    /// #[derive(Debug)]
    /// struct Token(u32);
    /// impl jsonbind::Bind for Token {}
    ///
    /// let registry = Registry::new();
    /// registry.implement::<Token, dyn fmt::Debug>(|t| t);
    /// ```
    pub fn implement<T: 'static, C: ?Sized + 'static>(&self, cast: fn(&T) -> &C) {
        let mut provided = write(&self.provided);
        let entry = provided.entry(TypeId::of::<T>()).or_default();
        Arc::make_mut(entry).add(cast);
        debug!("{} provides {}", type_name::<T>(), type_name::<C>());
    }

    /// Registers a marshaller for every type providing `capabilities`.
    ///
    /// Sets are kept ordered so that a set is consulted before any set it
    /// refines. Registering a set equal to an existing one fails with
    /// [`Error::DuplicateInterface`]; registering a set that neither refines nor
    /// is refined by an existing one fails with [`Error::AmbiguousInterface`].
    pub fn register_interface<F>(&self, capabilities: CapabilitySet, marshal: F) -> Result<()>
    where
        F: Fn(&Facets<'_>, &Registry) -> Result<Value> + Send + Sync + 'static,
    {
        let mut interfaces = write(&self.interfaces);
        let mut position = None;
        for (i, existing) in interfaces.iter().enumerate() {
            if existing.capabilities == capabilities {
                return Err(Error::DuplicateInterface {
                    capabilities: capabilities.to_string(),
                });
            }
            if capabilities.refines(&existing.capabilities) {
                position.get_or_insert(i);
            } else if !existing.capabilities.refines(&capabilities) {
                return Err(Error::AmbiguousInterface {
                    new: capabilities.to_string(),
                    existing: existing.capabilities.to_string(),
                });
            }
        }

        let position = position.unwrap_or(interfaces.len());
        debug!("Registered interface marshaller for {} at {}", capabilities, position);
        interfaces.insert(
            position,
            Interface {
                capabilities,
                marshal: Arc::new(marshal),
            },
        );
        Ok(())
    }

    /// Finds or synthesizes the marshaller for `T`.
    pub fn marshaller<T: Bind>(&self) -> Result<Marshaller<T>> {
        let id = TypeId::of::<T>();
        if let Some(found) = cached::<Marshaller<T>>(&self.marshallers, id) {
            return Ok(found);
        }

        let built = match self.interface_marshaller::<T>() {
            Some(found) => found,
            None => {
                let built = T::marshaller(self)?;
                debug!("Synthesized marshaller for {}", type_name::<T>());
                built
            }
        };
        Ok(insert_if_absent(&self.marshallers, id, built, type_name::<T>()))
    }

    /// Finds or synthesizes the unmarshaller for `T`.
    pub fn unmarshaller<T: Bind>(&self) -> Result<Unmarshaller<T>> {
        let id = TypeId::of::<T>();
        if let Some(found) = cached::<Unmarshaller<T>>(&self.unmarshallers, id) {
            return Ok(found);
        }

        let built = T::unmarshaller(self)?;
        debug!("Synthesized unmarshaller for {}", type_name::<T>());
        Ok(insert_if_absent(&self.unmarshallers, id, built, type_name::<T>()))
    }

    fn interface_marshaller<T: 'static>(&self) -> Option<Marshaller<T>> {
        let provided = read(&self.provided).get(&TypeId::of::<T>()).cloned()?;
        let marshal = {
            let interfaces = read(&self.interfaces);
            let chosen = interfaces
                .iter()
                .find(|interface| interface.capabilities.is_satisfied_by(provided.set()))?;
            trace!(
                "Using interface marshaller {} for {}",
                chosen.capabilities,
                type_name::<T>()
            );
            chosen.marshal.clone()
        };

        Some(Arc::new(move |value: &T, registry: &Registry| {
            marshal(&Facets::new(value, &provided), registry)
        }))
    }

    /// Converts `value` into a [`Value`].
    pub fn marshal<T: Bind>(&self, value: &T) -> Result<Value> {
        let marshal = self.marshaller::<T>()?;
        marshal(value, self)
    }

    /// Converts `value` into a `T`.
    pub fn unmarshal<T: Bind>(&self, value: &Value) -> Result<T> {
        let unmarshal = self.unmarshaller::<T>()?;
        unmarshal(value, self)
    }

    /// Marshals `value` and renders it as compact JSON text.
    pub fn marshal_to_string<T: Bind>(&self, value: &T) -> Result<String> {
        Ok(self.marshal(value)?.to_string())
    }

    /// Parses `text` and unmarshals the result into a `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jsonbind::Registry;
    ///
    /// let registry = Registry::new();
    /// let ports: Vec<u16> = registry.unmarshal_str("[80, 443]").unwrap();
    /// assert_eq!(ports, vec![80, 443]);
    /// ```
    pub fn unmarshal_str<T: Bind>(&self, text: &str) -> Result<T> {
        self.unmarshal(&parser::parse(text)?)
    }

    /// Returns `true` if a marshaller for `T` is registered or cached.
    #[must_use]
    pub fn has_marshaller<T: 'static>(&self) -> bool {
        read(&self.marshallers).contains_key(&TypeId::of::<T>())
    }

    /// Returns `true` if an unmarshaller for `T` is registered or cached.
    #[must_use]
    pub fn has_unmarshaller<T: 'static>(&self) -> bool {
        read(&self.unmarshallers).contains_key(&TypeId::of::<T>())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("marshallers", &read(&self.marshallers).len())
            .field("unmarshallers", &read(&self.unmarshallers).len())
            .field("interfaces", &read(&self.interfaces).len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_converters_are_cached() {
        let registry = Registry::new();
        assert!(!registry.has_marshaller::<Vec<i32>>());

        registry.marshal(&vec![1, 2, 3]).unwrap();
        assert!(registry.has_marshaller::<Vec<i32>>());
        assert!(registry.has_marshaller::<i32>());
        assert!(!registry.has_unmarshaller::<Vec<i32>>());
    }

    #[test]
    fn test_explicit_registration_wins_over_synthesis() {
        let registry = Registry::new();
        registry
            .register_marshaller(|v: &u8, _: &Registry| Ok(Value::from(format!("0x{:02x}", v))))
            .unwrap();
        assert_eq!(registry.marshal(&255u8).unwrap(), Value::from("0xff"));
        assert_eq!(registry.marshal(&vec![1u8]).unwrap().to_string(), r#"["0x01"]"#);
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = Registry::new();
        registry.register_unmarshaller(|_: &Value, _: &Registry| Ok(1i32)).unwrap();
        let err = registry
            .register_unmarshaller(|_: &Value, _: &Registry| Ok(2i32))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateConverter { .. }));

        let err = registry
            .register(
                |_: &i32, _: &Registry| Ok(Value::Null),
                |_: &Value, _: &Registry| Ok(3i32),
            )
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateConverter { .. }));
        assert!(!registry.has_marshaller::<i32>());
    }

    #[test]
    fn test_synthesized_then_registered_is_duplicate() {
        let registry = Registry::new();
        registry.marshal(&true).unwrap();
        let err = registry
            .register_marshaller(|_: &bool, _: &Registry| Ok(Value::Null))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateConverter { .. }));
    }

    #[test]
    fn test_debug_counts() {
        let registry = Registry::new();
        registry.marshal(&1i64).unwrap();
        let text = format!("{:?}", registry);
        assert!(text.contains("marshallers: 1"));
    }
}
