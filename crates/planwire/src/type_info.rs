//! Runtime descriptions of payload types used for strategy dispatch.

use std::fmt;

use crate::{payload::Payload, type_key::TypeKey};

/// A family of environment-bound types that is serialized by reference to
/// the environment instead of by structure.
///
/// A payload type lists the categories it belongs to in
/// [`Payload::CATEGORIES`]. When a type belongs to more than one category the
/// registry picks the first one in [`Category::PRIORITY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// A SQL operator, written by name and resolved through the catalog.
    Operator,

    /// A relational data type, written as a structural description and
    /// rebuilt by the type factory.
    DataType,

    /// A storage plugin handle, written by name and resolved through the
    /// plugin registry.
    Plugin,

    /// A value with its own native binary form.
    Writable,
}

impl Category {
    /// The fixed order in which categories are tested.
    pub const PRIORITY: [Self; 4] =
        [Self::Operator, Self::DataType, Self::Plugin, Self::Writable];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Operator => "operator",
            Self::DataType => "data type",
            Self::Plugin => "storage plugin",
            Self::Writable => "writable",
        })
    }
}

/// Everything the registry needs to know about a type to pick a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    /// The key of the concrete type.
    pub key: TypeKey,

    /// The key of the generic type the concrete type instantiates.
    pub family: TypeKey,

    /// The compiler-provided name, for diagnostics only.
    pub name: &'static str,

    /// The categories the type belongs to.
    pub categories: &'static [Category],
}

impl TypeInfo {
    /// Describes the payload type `T`.
    #[must_use]
    pub fn of<T: Payload>() -> Self {
        Self {
            key: T::TYPE_KEY,
            family: T::FAMILY,
            name: std::any::type_name::<T>(),
            categories: T::CATEGORIES,
        }
    }

    /// Returns `true` if the type declares `category`.
    #[must_use]
    pub fn belongs_to(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}
