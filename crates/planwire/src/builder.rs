//! Assembles an [`Engine`].

use std::sync::Arc;

use crate::{
    Result,
    config::{Configuration, MAX_BUFFER_SIZE},
    context::SerializerContext,
    engine::Engine,
    environment::{CatalogResolver, PlanEnvironment, PluginRegistry},
    error::Error,
    injection::{Injection, InjectionMapping},
    payload::Payload,
};

/// Collects injections and tunables, then builds an [`Engine`].
///
/// The environment, the catalog and the plugin registry are always
/// injected; registering another instance of any of them makes
/// [`Builder::build`] fail.
#[derive(Debug)]
pub struct Builder {
    environment: Arc<dyn PlanEnvironment>,
    catalog: Arc<dyn CatalogResolver>,
    plugins: Arc<dyn PluginRegistry>,
    injections: Vec<Injection>,
    configuration: Configuration,
}

impl Builder {
    /// Starts a builder for the given environment.
    #[must_use]
    pub fn new(
        environment: Arc<dyn PlanEnvironment>,
        catalog: Arc<dyn CatalogResolver>,
        plugins: Arc<dyn PluginRegistry>,
    ) -> Self {
        Self {
            environment,
            catalog,
            plugins,
            injections: Vec::new(),
            configuration: Configuration::default(),
        }
    }

    /// Injects `value` wherever a `T` appears in a serialized graph.
    ///
    /// Duplicates are only reported by [`Builder::build`].
    #[must_use]
    pub fn with_injection<T: Payload + Clone>(mut self, value: T) -> Self {
        self.injections.push(Injection::of(value));
        self
    }

    /// Sets the initial capacity of each output buffer.
    ///
    /// Must be greater than zero; values above [`MAX_BUFFER_SIZE`] are
    /// clamped when the engine is built.
    #[must_use]
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.configuration.buffer_size = buffer_size;
        self
    }

    /// Sets how deeply values may nest.
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.configuration.max_depth = max_depth;
        self
    }

    /// Replaces all tunables at once.
    #[must_use]
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Validates the configuration and builds the engine.
    #[tracing::instrument(skip_all, level = "debug")]
    pub fn build(self) -> Result<Engine> {
        let Self { environment, catalog, plugins, injections, configuration } =
            self;

        if configuration.buffer_size == 0 {
            return Err(Error::InvalidBufferSize);
        }
        if configuration.max_depth == 0 {
            return Err(Error::InvalidMaxDepth);
        }

        let buffer_size = if configuration.buffer_size > MAX_BUFFER_SIZE {
            tracing::warn!(
                requested = configuration.buffer_size,
                max = MAX_BUFFER_SIZE,
                "clamping buffer size"
            );
            MAX_BUFFER_SIZE
        } else {
            configuration.buffer_size
        };

        let environment_refs = [
            Injection::of(Arc::clone(&environment)),
            Injection::of(Arc::clone(&catalog)),
            Injection::of(Arc::clone(&plugins)),
        ];
        let injections = InjectionMapping::new(
            environment_refs.into_iter().chain(injections),
        )?;

        let context =
            SerializerContext::new(environment, catalog, plugins, buffer_size);

        Ok(Engine::setup(context, injections, Configuration {
            buffer_size,
            ..configuration
        }))
    }
}

#[cfg(test)]
mod test;
