//! The serialization engine.

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    sync::Arc,
    time::Duration,
};

use crate::{
    Result,
    config::Configuration,
    context::SerializerContext,
    data_type::{TypeDescription, TypeKind},
    envelope,
    environment::TableRef,
    injection::InjectionMapping,
    input::Input,
    output::Output,
    payload::Payload,
    registry::Registry,
    strategy::ExactKind,
    trait_def::{PlanTrait, TraitDef},
};

/// Serializes plan graphs against one environment.
///
/// An engine is immutable once built and can be shared between threads;
/// every call keeps its own buffers and identity maps.
///
/// ```ignore
/// let engine = Builder::new(cluster, catalog, plugins)
///     .with_injection(default_collation)
///     .build()?;
///
/// let bytes = engine.serialize(&plan)?;
/// let plan: Arc<PlanNode> = other_engine.deserialize(&bytes)?;
/// ```
#[derive(Debug)]
pub struct Engine {
    context: SerializerContext,
    injections: InjectionMapping,
    registry: Registry,
    max_depth: usize,
}

macro_rules! register {
    ($registry:ident, $kind:ident: $($ty:ty),+ $(,)?) => {
        $(
            $registry.register_exact::<$ty>(ExactKind::$kind);
        )+
    };
}

impl Engine {
    /// Fills the registry and assembles the engine.
    pub(crate) fn setup(
        context: SerializerContext,
        injections: InjectionMapping,
        configuration: Configuration,
    ) -> Self {
        let mut registry = Registry::new();

        register!(registry, Platform:
            u8, u16, u32, u64, u128, usize,
            i8, i16, i32, i64, i128, isize,
            bool, char, f32, f64, (),
            String, Arc<str>, Duration,
            TypeDescription, TypeKind,
        );
        register!(registry, Collection:
            Vec<()>, VecDeque<()>, Box<[()]>, Arc<[()]>,
            BTreeSet<()>, BTreeMap<(), ()>,
        );
        register!(registry, Reference:
            Option<()>, Box<()>,
            ((),), ((), ()), ((), (), ()), ((), (), (), ()),
            ((), (), (), (), ()), ((), (), (), (), (), ()),
        );
        register!(registry, TraitDef: TraitDef, PlanTrait);
        register!(registry, Table: TableRef);

        tracing::debug!(
            exact = registry.len(),
            injected = injections.len(),
            buffer_size = context.buffer_size(),
            max_depth = configuration.max_depth,
            "engine set up"
        );

        Self {
            context,
            injections,
            registry,
            max_depth: configuration.max_depth,
        }
    }

    /// Serializes `root` and everything reachable from it.
    #[tracing::instrument(
        skip_all,
        level = "debug",
        fields(root = std::any::type_name::<T>())
    )]
    pub fn serialize<T: Payload>(&self, root: &T) -> Result<Vec<u8>> {
        let mut output = Output::new(self);
        envelope::write_root(root, &mut output)?;

        let bytes = output.into_bytes();
        tracing::debug!(len = bytes.len(), "serialized");

        Ok(bytes)
    }

    /// Deserializes a root of type `T` from `bytes`.
    ///
    /// Fails if `bytes` was written for another root type, and if any bytes
    /// are left after the root.
    #[tracing::instrument(
        skip_all,
        level = "debug",
        fields(root = std::any::type_name::<T>(), len = bytes.len())
    )]
    pub fn deserialize<T: Payload>(&self, bytes: &[u8]) -> Result<T> {
        let mut input = Input::new(self, bytes);
        envelope::read_root(&mut input)
    }

    /// The environment this engine serializes against.
    #[must_use]
    pub const fn context(&self) -> &SerializerContext { &self.context }

    /// The instances this engine injects.
    #[must_use]
    pub const fn injections(&self) -> &InjectionMapping { &self.injections }

    /// The registry this engine dispatches through.
    #[must_use]
    pub const fn registry(&self) -> &Registry { &self.registry }

    /// How deeply values may nest.
    #[must_use]
    pub const fn max_depth(&self) -> usize { self.max_depth }
}

#[cfg(test)]
mod test;
