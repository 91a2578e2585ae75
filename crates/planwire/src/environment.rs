//! The planning environment the engine serializes against.
//!
//! None of the objects behind these traits are ever written to a stream.
//! The environment, the catalog and the plugin registry are injected by
//! reference; operators, data types, plugins and tables are reduced to a
//! name or description and looked up again in the decoding environment.

use std::{fmt, ops::Deref, sync::Arc};

use crate::{
    Identifiable, Result,
    data_type::TypeDescription,
    error::{BoxError, Error},
    input::Input,
    output::Output,
    payload::{CategoryForm, CategoryValue, Payload},
    type_info::Category,
    type_key::TypeKey,
};

/// The planning cluster: the root of everything a plan is bound to.
pub trait PlanEnvironment: fmt::Debug + Send + Sync {
    /// Returns the factory that canonicalizes data types.
    fn type_factory(&self) -> &dyn TypeFactory;
}

/// Builds data type instances from their structural description.
pub trait TypeFactory: fmt::Debug + Send + Sync {
    /// Creates, or returns the canonical instance of, the described type.
    fn create(
        &self,
        description: &TypeDescription,
    ) -> Result<Arc<dyn DataType>, BoxError>;
}

/// Resolves names found in a plan against the catalog.
pub trait CatalogResolver: fmt::Debug + Send + Sync {
    /// Looks up an operator by its canonical name.
    fn lookup_operator(&self, name: &str) -> Option<Arc<dyn Operator>>;

    /// Looks up a table by its qualified path.
    fn resolve_table(&self, path: &[String]) -> Option<Arc<dyn Table>>;
}

/// Resolves storage plugins by name.
pub trait PluginRegistry: fmt::Debug + Send + Sync {
    /// Looks up a plugin by name.
    fn plugin(&self, name: &str) -> Option<Arc<dyn StoragePlugin>>;
}

/// A SQL operator known to the catalog.
pub trait Operator: fmt::Debug + Send + Sync {
    /// The canonical name the catalog resolves.
    fn name(&self) -> &str;
}

/// A relational data type produced by a [`TypeFactory`].
pub trait DataType: fmt::Debug + Send + Sync {
    /// Describes the type in enough detail for a factory to rebuild it.
    fn describe(&self) -> TypeDescription;
}

/// A storage plugin registered with the [`PluginRegistry`].
pub trait StoragePlugin: fmt::Debug + Send + Sync {
    /// The name the plugin is registered under.
    fn name(&self) -> &str;
}

/// A table known to the catalog.
pub trait Table: fmt::Debug + Send + Sync {
    /// The path of the table, from the outermost namespace inward.
    fn qualified_name(&self) -> &[String];
}

// =============================================================================
// Injected environment references
// =============================================================================

macro_rules! environment_reference {
    ($($trait:ident => $name:literal),* $(,)?) => {
        $(
            impl Identifiable for Arc<dyn $trait> {
                const TYPE_KEY: TypeKey = TypeKey::of_name($name);
            }

            impl Payload for Arc<dyn $trait> {}
        )*
    };
}

environment_reference! {
    PlanEnvironment => "planwire::environment::PlanEnvironment",
    CatalogResolver => "planwire::environment::CatalogResolver",
    PluginRegistry => "planwire::environment::PluginRegistry",
}

// =============================================================================
// Category handles
// =============================================================================

macro_rules! category_handle {
    (
        $(#[$meta:meta])*
        $handle:ident($trait:ident) => $category:ident, $name:literal,
        eq: |$lhs:ident, $rhs:ident| $eq:expr,
        form: |$value:ident| $form:expr $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $handle(pub Arc<dyn $trait>);

        impl $handle {
            /// Wraps a shared instance.
            #[must_use]
            pub fn new(inner: Arc<dyn $trait>) -> Self { Self(inner) }
        }

        impl Deref for $handle {
            type Target = dyn $trait;

            fn deref(&self) -> &Self::Target { &*self.0 }
        }

        impl PartialEq for $handle {
            fn eq(&self, other: &Self) -> bool {
                let ($lhs, $rhs) = (&*self.0, &*other.0);
                $eq
            }
        }

        impl Eq for $handle {}

        impl Identifiable for $handle {
            const TYPE_KEY: TypeKey = TypeKey::of_name($name);
        }

        impl Payload for $handle {
            const CATEGORIES: &'static [Category] = &[Category::$category];

            fn category_form(
                &self,
                category: Category,
            ) -> Result<CategoryForm<'_>> {
                if category != Category::$category {
                    return Err(Error::CategoryMismatch {
                        type_name: std::any::type_name::<Self>(),
                        category,
                    });
                }
                let $value = &*self.0;
                Ok($form)
            }

            fn from_category_value(value: CategoryValue) -> Result<Self> {
                match value {
                    CategoryValue::$category(inner) => Ok(Self(inner)),
                    other => Err(Error::CategoryMismatch {
                        type_name: std::any::type_name::<Self>(),
                        category: other.category(),
                    }),
                }
            }
        }
    };
}

category_handle! {
    /// A plan's reference to an operator, written by name.
    OperatorRef(Operator) => Operator, "planwire::environment::OperatorRef",
    eq: |lhs, rhs| lhs.name() == rhs.name(),
    form: |operator| CategoryForm::Operator(operator.name()),
}

category_handle! {
    /// A plan's reference to a data type, written as its description.
    DataTypeRef(DataType) => DataType, "planwire::environment::DataTypeRef",
    eq: |lhs, rhs| lhs.describe() == rhs.describe(),
    form: |data_type| CategoryForm::DataType(data_type.describe()),
}

category_handle! {
    /// A plan's reference to a storage plugin, written by name.
    PluginRef(StoragePlugin) => Plugin, "planwire::environment::PluginRef",
    eq: |lhs, rhs| lhs.name() == rhs.name(),
    form: |plugin| CategoryForm::Plugin(plugin.name()),
}

/// A plan's reference to a table, written as its qualified path and
/// resolved through the catalog.
#[derive(Debug, Clone)]
pub struct TableRef(pub Arc<dyn Table>);

impl TableRef {
    /// Wraps a shared table.
    #[must_use]
    pub fn new(table: Arc<dyn Table>) -> Self { Self(table) }
}

impl Deref for TableRef {
    type Target = dyn Table;

    fn deref(&self) -> &Self::Target { &*self.0 }
}

impl PartialEq for TableRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.qualified_name() == other.0.qualified_name()
    }
}

impl Eq for TableRef {}

impl Identifiable for TableRef {
    const TYPE_KEY: TypeKey =
        TypeKey::of_name("planwire::environment::TableRef");
}

impl Payload for TableRef {
    fn write_fields(&self, output: &mut Output<'_>) -> Result<()> {
        output.write(&self.0.qualified_name().to_vec())
    }

    fn read_fields(input: &mut Input<'_>) -> Result<Self> {
        let path = input.read::<Vec<String>>()?;

        match input.context().catalog().resolve_table(&path) {
            Some(table) => Ok(Self(table)),
            None => Err(Error::UnknownTable(path)),
        }
    }
}
