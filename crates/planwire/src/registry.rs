//! The serializer registry: which strategy handles which type.

use std::collections::hash_map::Entry;

use fxhash::FxHashMap;

use crate::{
    strategy::{ExactKind, Strategy},
    type_info::{Category, TypeInfo},
    type_key::{Identifiable, TypeKey},
};

#[derive(Debug, Clone, Copy)]
struct ExactEntry {
    kind: ExactKind,
    type_name: &'static str,
}

/// Maps every payload type to the [`Strategy`] that serializes it.
///
/// Resolution checks, in order:
///
/// 1. exact registrations, matched by the type's family so that one
///    registration covers every instantiation of a generic type;
/// 2. the categories in [`Category::PRIORITY`], the first one the type
///    declares wins;
/// 3. [`Strategy::Injecting`] for everything else.
///
/// The registry is filled once while the engine is set up and only read
/// afterwards, so resolution of a type never changes during the lifetime
/// of an engine.
#[derive(Debug, Default)]
pub struct Registry {
    exact: FxHashMap<TypeKey, ExactEntry>,
}

impl Registry {
    /// Creates a registry without exact registrations.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registers the family of `T` as exactly handled.
    ///
    /// Returns `false`, leaving the first registration in place, if the
    /// family is already registered.
    pub fn register_exact<T: Identifiable + ?Sized>(
        &mut self,
        kind: ExactKind,
    ) -> bool {
        let type_name = std::any::type_name::<T>();

        match self.exact.entry(T::FAMILY) {
            Entry::Occupied(existing) => {
                tracing::warn!(
                    type_name,
                    existing = existing.get().type_name,
                    "family is already registered"
                );
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(ExactEntry { kind, type_name });
                true
            }
        }
    }

    /// Resolves the strategy for a type.
    #[must_use]
    pub fn resolve(&self, info: &TypeInfo) -> Strategy {
        if let Some(entry) = self.exact.get(&info.family) {
            return Strategy::Exact(entry.kind);
        }

        Category::PRIORITY
            .into_iter()
            .find(|category| info.belongs_to(*category))
            .map_or(Strategy::Injecting, Strategy::Category)
    }

    /// Returns the exact registration of `family`, if any.
    #[must_use]
    pub fn exact_kind(&self, family: TypeKey) -> Option<ExactKind> {
        self.exact.get(&family).map(|entry| entry.kind)
    }

    /// Returns the number of exact registrations.
    #[must_use]
    pub fn len(&self) -> usize { self.exact.len() }

    /// Returns `true` if nothing is registered exactly.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.exact.is_empty() }
}

#[cfg(test)]
mod test;
