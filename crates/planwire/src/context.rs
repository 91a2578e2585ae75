//! The environment an engine serializes against.

use std::sync::Arc;

use crate::environment::{CatalogResolver, PlanEnvironment, PluginRegistry};

/// Everything an engine needs from its surroundings.
///
/// Fixed when the engine is built.
#[derive(Debug, Clone)]
pub struct SerializerContext {
    environment: Arc<dyn PlanEnvironment>,
    catalog: Arc<dyn CatalogResolver>,
    plugins: Arc<dyn PluginRegistry>,
    buffer_size: usize,
}

impl SerializerContext {
    pub(crate) fn new(
        environment: Arc<dyn PlanEnvironment>,
        catalog: Arc<dyn CatalogResolver>,
        plugins: Arc<dyn PluginRegistry>,
        buffer_size: usize,
    ) -> Self {
        Self { environment, catalog, plugins, buffer_size }
    }

    /// The planning environment plans are bound to.
    #[must_use]
    pub fn environment(&self) -> &Arc<dyn PlanEnvironment> {
        &self.environment
    }

    /// The catalog operators and tables are resolved through.
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogResolver> { &self.catalog }

    /// The registry storage plugins are resolved through.
    #[must_use]
    pub fn plugins(&self) -> &Arc<dyn PluginRegistry> { &self.plugins }

    /// The initial capacity of each output buffer, already clamped to
    /// [`MAX_BUFFER_SIZE`](crate::MAX_BUFFER_SIZE).
    #[must_use]
    pub const fn buffer_size(&self) -> usize { self.buffer_size }
}
