//! Per-call state shared by everything written or read in one call.
//!
//! A [`Session`] lives exactly as long as one
//! [`Engine::serialize`](crate::Engine::serialize) or
//! [`Engine::deserialize`](crate::Engine::deserialize) call, so nothing stored
//! in it can leak between calls or threads. The engine keeps its shared-node
//! identity maps here, and payload implementations may keep their own state
//! under their own keys.
//!
//! ```ignore
//! struct SeenNames;
//!
//! impl SessionKey for SeenNames {
//!     type Value = FxHashSet<String>;
//! }
//!
//! let seen = output.session().get_mut_or_default::<SeenNames>();
//! seen.insert(name.clone());
//! ```

use std::any::{Any, TypeId};

use fxhash::FxHashMap;

/// A type-safe key into a [`Session`].
///
/// Each key type maps to exactly one value type.
pub trait SessionKey: 'static + Send + Sync {
    /// The type of value stored under this key.
    type Value: 'static + Send + Sync;
}

/// Heterogeneous, type-keyed storage for the state of one call.
#[derive(Debug, Default)]
pub struct Session {
    states: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Session {
    pub(crate) fn new() -> Self { Self::default() }

    /// Returns the value stored under `K`, inserting its default first if
    /// the key is not present yet.
    pub fn get_mut_or_default<K: SessionKey>(&mut self) -> &mut K::Value
    where
        K::Value: Default,
    {
        self.states
            .entry(TypeId::of::<K>())
            .or_insert_with(|| Box::new(K::Value::default()))
            .downcast_mut::<K::Value>()
            .expect("session state is keyed by its own type")
    }

    /// Returns the value stored under `K`, if any.
    #[must_use]
    pub fn get<K: SessionKey>(&self) -> Option<&K::Value> {
        self.states
            .get(&TypeId::of::<K>())
            .and_then(|state| state.downcast_ref())
    }
}
