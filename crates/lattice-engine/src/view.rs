//! Compiling view definitions into frozen graphs.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use lattice_traits::config::{BuildOptions, ViewDefinition};
use lattice_traits::exclusion::ExclusionGroups;
use lattice_traits::market_data::MarketDataAvailability;
use lattice_traits::output::FailureListener;
use lattice_traits::resolver::FunctionResolver;

use crate::builder::GraphBuilder;
use crate::compiled::CompiledGraph;
use crate::error::EngineError;

/// The frozen output of compiling a view: one graph per calculation
/// configuration.
pub struct CompiledView {
    name: String,
    graphs: BTreeMap<String, CompiledGraph>,
}

impl CompiledView {
    /// The view name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The graph for a configuration, if it was part of the view.
    pub fn graph(&self, config_name: &str) -> Option<&CompiledGraph> {
        self.graphs.get(config_name)
    }

    /// Iterate the configuration names and their graphs.
    pub fn graphs(&self) -> impl Iterator<Item = (&str, &CompiledGraph)> {
        self.graphs.iter().map(|(name, graph)| (name.as_str(), graph))
    }

    /// Number of compiled configurations.
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Whether the view has no configurations.
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

/// Compiles every configuration of a view definition with one shared set of
/// collaborators.
///
/// The catalog, availability and exclusion policies are read-only for the
/// duration and shared across the per-configuration builds.
pub struct ViewCompiler {
    resolver: Arc<dyn FunctionResolver>,
    availability: Arc<dyn MarketDataAvailability>,
    exclusions: Arc<dyn ExclusionGroups>,
    options: BuildOptions,
    listener: Option<Arc<dyn FailureListener>>,
}

impl ViewCompiler {
    /// Create a compiler with default options.
    pub fn new(
        resolver: Arc<dyn FunctionResolver>,
        availability: Arc<dyn MarketDataAvailability>,
        exclusions: Arc<dyn ExclusionGroups>,
    ) -> Self {
        Self {
            resolver,
            availability,
            exclusions,
            options: BuildOptions::default(),
            listener: None,
        }
    }

    /// Set the build options used for every configuration.
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the failure listener passed to every build.
    pub fn with_failure_listener(mut self, listener: Arc<dyn FailureListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Compile every configuration in the definition.
    ///
    /// Fails on the first configuration whose build fails; already-compiled
    /// graphs are discarded in that case.
    pub fn compile(&self, definition: &ViewDefinition) -> Result<CompiledView, EngineError> {
        info!(view = %definition.name, configs = definition.configs.len(), "compiling view");
        let mut graphs = BTreeMap::new();
        for config in &definition.configs {
            let mut builder = GraphBuilder::new(
                config.name.clone(),
                self.resolver.clone(),
                self.availability.clone(),
                self.exclusions.clone(),
            )
            .with_options(self.options.clone());
            if let Some(listener) = &self.listener {
                builder = builder.with_failure_listener(listener.clone());
            }
            builder.add_targets(config.requirements.iter().cloned());
            let graph = builder.build()?;
            graphs.insert(config.name.clone(), graph);
        }
        Ok(CompiledView {
            name: definition.name.clone(),
            graphs,
        })
    }
}
