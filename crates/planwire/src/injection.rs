//! The injection mapping: pre-built instances that replace whole subtrees.
//!
//! Environment objects such as the planning cluster or the catalog cannot be
//! serialized. Instead, the serializing engine writes a marker wherever a
//! value of an injected type appears, and the deserializing engine puts its
//! own instance of that type back in place.
//!
//! ```ignore
//! let mapping = InjectionMapping::new([
//!     Injection::of(Arc::clone(&cluster)),
//!     Injection::of(DefaultCollation::default()),
//! ])?;
//!
//! assert!(mapping.contains(<Arc<dyn PlanEnvironment>>::TYPE_KEY));
//! ```

use std::{
    any::{Any, type_name},
    collections::hash_map::Entry,
    fmt,
};

use fxhash::FxHashMap;

use crate::{Result, error::Error, payload::Payload, type_key::TypeKey};

type Instance = Box<dyn Any + Send + Sync>;

/// One pre-built instance, keyed by the key of its type.
pub struct Injection {
    key: TypeKey,
    type_name: &'static str,
    instance: Instance,
    produce: fn(&(dyn Any + Send + Sync)) -> Option<Instance>,
}

impl Injection {
    /// Wraps `value` as the instance injected for `T`.
    ///
    /// Every injected occurrence decodes to a clone of `value`; for
    /// reference-counted values that is the very same allocation.
    #[must_use]
    pub fn of<T: Payload + Clone>(value: T) -> Self {
        Self {
            key: T::TYPE_KEY,
            type_name: type_name::<T>(),
            instance: Box::new(value),
            produce: |instance| {
                instance
                    .downcast_ref::<T>()
                    .map(|value| Box::new(value.clone()) as Instance)
            },
        }
    }

    /// Returns the key of the injected type.
    #[must_use]
    pub const fn key(&self) -> TypeKey { self.key }

    /// Returns the name of the injected type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str { self.type_name }

    /// Produces a copy of the injected instance as a `T`.
    ///
    /// Returns `None` if the instance is not a `T`.
    #[must_use]
    pub fn instantiate<T: Payload>(&self) -> Option<T> {
        (self.produce)(self.instance.as_ref())
            .and_then(|instance| instance.downcast::<T>().ok())
            .map(|instance| *instance)
    }
}

impl fmt::Debug for Injection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injection")
            .field("key", &self.key)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// An immutable map from type key to the instance injected for that type.
#[derive(Debug, Default)]
pub struct InjectionMapping {
    entries: FxHashMap<TypeKey, Injection>,
}

impl InjectionMapping {
    /// Builds the mapping, rejecting two injections for the same type.
    pub fn new(
        injections: impl IntoIterator<Item = Injection>,
    ) -> Result<Self> {
        let mut entries = FxHashMap::default();

        for injection in injections {
            match entries.entry(injection.key) {
                Entry::Occupied(_) => {
                    return Err(Error::DuplicateInjection {
                        type_name: injection.type_name,
                        key: injection.key,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(injection);
                }
            }
        }

        tracing::debug!(count = entries.len(), "built injection mapping");

        Ok(Self { entries })
    }

    /// Returns the injection for `key`, if any.
    #[must_use]
    pub fn lookup(&self, key: TypeKey) -> Option<&Injection> {
        self.entries.get(&key)
    }

    /// Returns `true` if an instance is injected for `key`.
    #[must_use]
    pub fn contains(&self, key: TypeKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Returns the number of injected types.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Returns `true` if nothing is injected.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Iterates over the injections in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Injection> {
        self.entries.values()
    }
}
