//! The [`Payload`] trait implemented by every serializable type.
//!
//! A payload type says *what* it is made of; the
//! [`Registry`](crate::Registry) decides *how* it reaches the stream. Plain
//! plan nodes are written field by field, environment-bound values are
//! replaced by a marker or a name, and category members are reduced to the
//! form their category understands.
//!
//! Implement it with `#[derive(Identifiable, Payload)]`:
//!
//! ```ignore
//! #[derive(Identifiable, Payload)]
//! struct Filter {
//!     input: Arc<PlanNode>,
//!     condition: Expression,
//!     row_type: DataTypeRef,
//!     #[payload(skip)]
//!     cost: Option<Cost>, // recomputed after decoding
//! }
//! ```

use std::{io, sync::Arc};

use crate::{
    Result,
    data_type::TypeDescription,
    environment::{DataType, Operator, StoragePlugin},
    error::Error,
    input::Input,
    output::Output,
    type_info::Category,
    type_key::Identifiable,
};

mod builtin;
mod shared;

/// A type that can be part of a serialized plan graph.
///
/// Both field methods default to [`Error::NotStructural`]; types that are
/// only ever injected or written through a category do not need them.
pub trait Payload: Identifiable + Sized + Send + Sync + 'static {
    /// The categories this type belongs to, in any order.
    const CATEGORIES: &'static [Category] = &[];

    /// Writes the fields of this value, each through [`Output::write`].
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        let _ = output;
        Err(Error::NotStructural { type_name: std::any::type_name::<Self>() })
    }

    /// Reads a value written by [`Payload::write_fields`].
    ///
    /// The value is assembled directly from its decoded fields; no
    /// constructor runs, and skipped fields take their default.
    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        let _ = input;
        Err(Error::NotStructural { type_name: std::any::type_name::<Self>() })
    }

    /// A cheap stand-in used while a shared instance is being decoded.
    ///
    /// Types that return `Some` are allocated before their fields are read,
    /// which lets [`std::sync::Weak`] back-edges inside the value point at
    /// the allocation that is still being populated.
    fn placeholder() -> Option<Self> { None }

    /// Reduces this value to the form `category` writes.
    fn category_form(&self, category: Category) -> Result<CategoryForm<'_>> {
        Err(Error::CategoryMismatch {
            type_name: std::any::type_name::<Self>(),
            category,
        })
    }

    /// Rebuilds a value from what the environment resolved for its
    /// category.
    fn from_category_value(value: CategoryValue) -> Result<Self> {
        Err(Error::CategoryMismatch {
            type_name: std::any::type_name::<Self>(),
            category: value.category(),
        })
    }
}

/// What a category member is reduced to on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryForm<'a> {
    /// The canonical name of an operator.
    Operator(&'a str),

    /// The structural description of a data type.
    DataType(TypeDescription),

    /// The name of a storage plugin.
    Plugin(&'a str),

    /// The native bytes of a writable value.
    Writable(Vec<u8>),
}

impl CategoryForm<'_> {
    /// Returns the category this form belongs to.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Operator(_) => Category::Operator,
            Self::DataType(_) => Category::DataType,
            Self::Plugin(_) => Category::Plugin,
            Self::Writable(_) => Category::Writable,
        }
    }

    /// Captures the native form of a writable value.
    pub fn native<T: Writable + Payload>(value: &T) -> Result<Self> {
        let mut bytes = Vec::new();
        value.write_native(&mut bytes).map_err(|source| Error::Native {
            type_name: std::any::type_name::<T>(),
            source,
        })?;
        Ok(Self::Writable(bytes))
    }
}

/// What the decoding environment resolved for a category member.
#[derive(Debug, Clone)]
pub enum CategoryValue {
    /// The operator the catalog returned for the encoded name.
    Operator(Arc<dyn Operator>),

    /// The data type the type factory rebuilt.
    DataType(Arc<dyn DataType>),

    /// The plugin the plugin registry returned for the encoded name.
    Plugin(Arc<dyn StoragePlugin>),

    /// The native bytes of a writable value.
    Writable(Vec<u8>),
}

impl CategoryValue {
    /// Returns the category this value belongs to.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Operator(_) => Category::Operator,
            Self::DataType(_) => Category::DataType,
            Self::Plugin(_) => Category::Plugin,
            Self::Writable(_) => Category::Writable,
        }
    }

    /// Parses the native form of a writable value.
    pub fn into_native<T: Writable + Payload>(self) -> Result<T> {
        let type_name = std::any::type_name::<T>();
        match self {
            Self::Writable(bytes) => T::read_native(&bytes)
                .map_err(|source| Error::Native { type_name, source }),
            other => Err(Error::CategoryMismatch {
                type_name,
                category: other.category(),
            }),
        }
    }
}

/// A value with its own native binary form, in the manner of Hadoop's
/// `Writable`.
///
/// Types deriving `Payload` with `#[payload(writable)]` join the
/// [`Category::Writable`] category and travel as a length-prefixed blob of
/// these bytes.
pub trait Writable: Sized {
    /// Appends the native form of this value to `out`.
    fn write_native(&self, out: &mut Vec<u8>) -> io::Result<()>;

    /// Parses a value from exactly the bytes [`Writable::write_native`]
    /// produced.
    fn read_native(bytes: &[u8]) -> io::Result<Self>;
}
