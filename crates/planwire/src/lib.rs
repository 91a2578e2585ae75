//! Serialization of query plan graphs with dependency injection.
//!
//! A plan graph mixes plain data (expressions, row counts, field names) with
//! references into the environment it was planned in: the planning cluster,
//! catalog operators, canonical data types and storage plugins. None of the
//! latter can travel in a byte stream. This crate writes the plain data
//! structurally and replaces every environment reference with something the
//! decoding environment can resolve again:
//!
//! - types with an injected instance become a marker, and decode to the
//!   instance of the decoding [`Engine`];
//! - operators and storage plugins become their name;
//! - data types become a [`TypeDescription`] rebuilt by the type factory;
//! - [`Writable`] values carry their own native bytes.
//!
//! Shared nodes (`Arc`, `Weak`) keep their identity across a round trip,
//! including weak back-edges to ancestors.
//!
//! # Example
//!
//! ```ignore
//! use planwire::{Builder, Identifiable, Payload};
//!
//! #[derive(Identifiable, Payload)]
//! struct Scan {
//!     cluster: Arc<dyn PlanEnvironment>,
//!     table: TableRef,
//!     row_type: DataTypeRef,
//! }
//!
//! let engine = Builder::new(cluster, catalog, plugins).build()?;
//! let bytes = engine.serialize(&Arc::new(scan))?;
//! let scan: Arc<Scan> = engine.deserialize(&bytes)?;
//! ```

extern crate self as planwire;

pub use planwire_serialize as serialize;

pub mod builder;
pub mod config;
pub mod context;
pub mod data_type;
pub mod engine;
pub mod envelope;
pub mod environment;
pub mod error;
pub mod injection;
pub mod input;
pub mod output;
pub mod payload;
pub mod registry;
pub mod session;
pub mod strategy;
pub mod trait_def;
pub mod type_info;
pub mod type_key;

pub use builder::Builder;
pub use config::{Configuration, DEFAULT_MAX_DEPTH, MAX_BUFFER_SIZE};
pub use context::SerializerContext;
pub use data_type::{TypeDescription, TypeKind};
pub use engine::Engine;
pub use environment::{
    CatalogResolver, DataType, DataTypeRef, Operator, OperatorRef,
    PlanEnvironment, PluginRef, PluginRegistry, StoragePlugin, Table,
    TableRef, TypeFactory,
};
pub use error::{BoxError, Error, ErrorKind, Result};
pub use injection::{Injection, InjectionMapping};
pub use input::Input;
pub use output::Output;
pub use payload::{CategoryForm, CategoryValue, Payload, Writable};
pub use planwire_derive::{Identifiable, Payload};
pub use registry::Registry;
pub use session::{Session, SessionKey};
pub use strategy::{ExactKind, Strategy};
pub use trait_def::{
    Direction, DistributionKind, FieldCollation, NullOrdering, PlanTrait,
    TraitDef,
};
pub use type_info::{Category, TypeInfo};
pub use type_key::{Identifiable, TypeKey};

#[cfg(test)]
mod test_support;
