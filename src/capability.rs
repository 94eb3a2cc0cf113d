//! Capability sets for interface converters.
//!
//! A capability is a trait-object type such as `dyn fmt::Display`. Concrete types
//! declare the capabilities they provide with [`crate::Registry::implement`],
//! handing over a cast from the concrete type to the trait object. Interface
//! converters are registered against a [`CapabilitySet`] and receive the value as
//! [`Facets`], from which they pull the views they need.
//!
//! A set `A` *refines* a set `B` when `A` requires everything `B` requires and
//! more: every value satisfying `A` satisfies `B`, but not the other way round.
//!
//! ```rust
//! use jsonbind::CapabilitySet;
//! use std::fmt;
//!
//! let display = CapabilitySet::new().with::<dyn fmt::Display>();
//! let both = display.clone().with::<dyn fmt::Debug>();
//!
//! assert!(both.refines(&display));
//! assert!(!display.refines(&both));
//! assert!(!display.refines(&display));
//! ```

use std::any::{type_name, Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// One capability: the identity of a trait-object type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Capability {
    name: &'static str,
    id: TypeId,
}

impl Capability {
    /// The capability of viewing a value as `C`.
    pub fn of<C: ?Sized + 'static>() -> Self {
        Capability {
            name: type_name::<C>(),
            id: TypeId::of::<C>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A set of capabilities a value must provide.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the capability of viewing a value as `C`.
    #[must_use]
    pub fn with<C: ?Sized + 'static>(mut self) -> Self {
        self.0.insert(Capability::of::<C>());
        self
    }

    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    #[must_use]
    pub fn contains(&self, capability: &Capability) -> bool {
        self.0.contains(capability)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }

    /// Returns `true` if `provided` includes every capability in this set.
    #[must_use]
    pub fn is_satisfied_by(&self, provided: &CapabilitySet) -> bool {
        self.0.is_subset(&provided.0)
    }

    /// Returns `true` if this set is a strict refinement of `other`.
    #[must_use]
    pub fn refines(&self, other: &CapabilitySet) -> bool {
        self.0.len() > other.0.len() && self.0.is_superset(&other.0)
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, capability) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            f.write_str(capability.name)?;
        }
        f.write_str("}")
    }
}

/// Type-erased cast from some concrete type to `C`.
type Cast<C> = Box<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a C> + Send + Sync>;

fn cast_hint<C: ?Sized, F>(f: F) -> F
where
    F: for<'a> Fn(&'a dyn Any) -> Option<&'a C>,
{
    f
}

/// Capabilities one concrete type has declared, with their casts.
#[derive(Clone, Default)]
pub(crate) struct Provided {
    set: CapabilitySet,
    casts: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Provided {
    pub(crate) fn add<T: 'static, C: ?Sized + 'static>(&mut self, cast: fn(&T) -> &C) {
        let erased: Cast<C> = Box::new(cast_hint::<C, _>(move |any| {
            any.downcast_ref::<T>().map(cast)
        }));
        self.set.insert(Capability::of::<C>());
        self.casts.insert(TypeId::of::<C>(), Arc::new(erased));
    }

    pub(crate) fn set(&self) -> &CapabilitySet {
        &self.set
    }
}

/// A value seen through the capabilities its type declared.
///
/// # Examples
///
/// ```rust
/// use jsonbind::{CapabilitySet, Registry, Value};
/// use std::fmt;
///
/// struct Celsius(f64);
///
/// impl fmt::Display for Celsius {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "{}C", self.0)
///     }
/// }
///
/// impl jsonbind::Bind for Celsius {}
///
/// let registry = Registry::new();
/// registry.implement::<Celsius, dyn fmt::Display>(|c| c);
/// registry
///     .register_interface(
///         CapabilitySet::new().with::<dyn fmt::Display>(),
///         |facets, _| {
///             let text = facets.get::<dyn fmt::Display>().map(|d| d.to_string());
///             Ok(Value::from(text.unwrap_or_default()))
///         },
///     )
///     .unwrap();
///
/// assert_eq!(registry.marshal(&Celsius(21.5)).unwrap(), Value::from("21.5C"));
/// ```
pub struct Facets<'a> {
    value: &'a dyn Any,
    type_name: &'static str,
    provided: &'a Provided,
}

impl<'a> Facets<'a> {
    pub(crate) fn new<T: 'static>(value: &'a T, provided: &'a Provided) -> Self {
        Facets {
            value,
            type_name: type_name::<T>(),
            provided,
        }
    }

    /// Views the value as `C`, if its type declared that capability.
    pub fn get<C: ?Sized + 'static>(&self) -> Option<&'a C> {
        let cast = self
            .provided
            .casts
            .get(&TypeId::of::<C>())?
            .downcast_ref::<Cast<C>>()?;
        cast(self.value)
    }

    /// Recovers the concrete value.
    pub fn downcast<T: 'static>(&self) -> Option<&'a T> {
        self.value.downcast_ref()
    }

    /// Name of the concrete type behind the facets.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.provided.set
    }
}
