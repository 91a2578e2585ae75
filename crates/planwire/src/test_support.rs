//! A minimal environment for unit tests.

use std::sync::Arc;

use crate::{
    Builder, CatalogResolver, DataType, Engine, Operator, PlanEnvironment,
    PluginRegistry, StoragePlugin, Table, TypeDescription, TypeFactory,
    error::BoxError,
};

#[derive(Debug)]
pub struct Named(pub &'static str);

impl Operator for Named {
    fn name(&self) -> &str { self.0 }
}

impl StoragePlugin for Named {
    fn name(&self) -> &str { self.0 }
}

#[derive(Debug)]
pub struct Described(pub TypeDescription);

impl DataType for Described {
    fn describe(&self) -> TypeDescription { self.0.clone() }
}

#[derive(Debug)]
pub struct Path(pub Vec<String>);

impl Table for Path {
    fn qualified_name(&self) -> &[String] { &self.0 }
}

#[derive(Debug, Default)]
pub struct Factory;

impl TypeFactory for Factory {
    fn create(
        &self,
        description: &TypeDescription,
    ) -> Result<Arc<dyn DataType>, BoxError> {
        Ok(Arc::new(Described(description.clone())))
    }
}

#[derive(Debug, Default)]
pub struct Cluster(Factory);

impl PlanEnvironment for Cluster {
    fn type_factory(&self) -> &dyn TypeFactory { &self.0 }
}

/// Knows the operators `=` and `AND`, the plugin `dfs` and the table
/// `sys.nodes`.
#[derive(Debug, Default)]
pub struct Catalog;

impl CatalogResolver for Catalog {
    fn lookup_operator(&self, name: &str) -> Option<Arc<dyn Operator>> {
        match name {
            "=" => Some(Arc::new(Named("="))),
            "AND" => Some(Arc::new(Named("AND"))),
            _ => None,
        }
    }

    fn resolve_table(&self, path: &[String]) -> Option<Arc<dyn Table>> {
        (*path == ["sys", "nodes"])
            .then(|| Arc::new(Path(path.to_vec())) as Arc<dyn Table>)
    }
}

impl PluginRegistry for Catalog {
    fn plugin(&self, name: &str) -> Option<Arc<dyn StoragePlugin>> {
        (name == "dfs")
            .then(|| Arc::new(Named("dfs")) as Arc<dyn StoragePlugin>)
    }
}

pub fn builder() -> Builder {
    Builder::new(
        Arc::new(Cluster::default()),
        Arc::new(Catalog),
        Arc::new(Catalog),
    )
}

pub fn engine() -> Engine { builder().build().unwrap() }
