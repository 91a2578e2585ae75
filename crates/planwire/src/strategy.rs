//! Serialization strategies and dispatch.

use enum_as_inner::EnumAsInner;

use crate::{
    Result, input::Input, output::Output, payload::Payload,
    type_info::{Category, TypeInfo},
};

pub mod category;
pub mod injecting;

/// The kind of an exact registration.
///
/// Exactly registered types write their own fields with no extra framing
/// and can never be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExactKind {
    /// Primitives, strings, durations and other value types of the platform.
    Platform,

    /// Sequences, sets and maps.
    Collection,

    /// Option-like wrappers and tuples that forward to their contents.
    Reference,

    /// Trait definitions and trait instances of the planner.
    TraitDef,

    /// Table handles, resolved through the catalog by qualified name.
    Table,
}

/// How values of a type reach the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumAsInner)]
pub enum Strategy {
    /// The type is registered by exact family.
    Exact(ExactKind),

    /// The type is written through the given category.
    Category(Category),

    /// The type is injected when the mapping holds an instance and written
    /// structurally otherwise.
    Injecting,
}

impl From<ExactKind> for Strategy {
    fn from(kind: ExactKind) -> Self { Self::Exact(kind) }
}

impl From<Category> for Strategy {
    fn from(category: Category) -> Self { Self::Category(category) }
}

pub(crate) fn write<T: Payload>(
    output: &mut Output<'_>,
    value: &T,
) -> Result<()> {
    match output.engine().registry().resolve(&TypeInfo::of::<T>()) {
        Strategy::Exact(_) => value.write_fields(output),
        Strategy::Category(category) => {
            category::write(category, value, output)
        }
        Strategy::Injecting => injecting::write(value, output),
    }
}

pub(crate) fn read<T: Payload>(input: &mut Input<'_>) -> Result<T> {
    match input.engine().registry().resolve(&TypeInfo::of::<T>()) {
        Strategy::Exact(_) => T::read_fields(input),
        Strategy::Category(category) => category::read(category, input),
        Strategy::Injecting => injecting::read(input),
    }
}
