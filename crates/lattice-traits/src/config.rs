//! Build options and calculation configurations.

use serde::{Deserialize, Serialize};

use lattice_core::ValueRequirement;

/// Which run-queue strategy feeds the graph-building workers.
///
/// The strategies are behaviourally interchangeable: graph content is
/// independent of the choice. They trade latency, peak memory and
/// reproducibility of construction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueueStrategy {
    /// Strict FIFO under one lock; single-threaded semantics for debugging.
    Ordered,
    /// Lock-free multi-producer/multi-consumer FIFO.
    #[default]
    ConcurrentQueue,
    /// LIFO; favours depth-first completion of a branch before siblings,
    /// reducing peak in-flight state.
    ConcurrentStack,
}

/// Options controlling one graph build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Number of worker threads; 0 means one per CPU core.
    pub max_workers: usize,
    /// Run-queue strategy.
    pub queue: QueueStrategy,
    /// Fail the whole build if any terminal requirement fails.
    pub strict: bool,
    /// Forward terminal failures to the registered failure listener.
    pub enable_failure_reporting: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_workers: 0,
            queue: QueueStrategy::default(),
            strict: false,
            enable_failure_reporting: false,
        }
    }
}

/// A named calculation configuration: the terminal requirements to resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationConfig {
    /// Configuration name; keys the resulting graph in the compiled view.
    pub name: String,
    /// The requested (terminal) requirements.
    pub requirements: Vec<ValueRequirement>,
}

impl CalculationConfig {
    /// Create an empty configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requirements: Vec::new(),
        }
    }

    /// Add a terminal requirement.
    pub fn with_requirement(mut self, requirement: ValueRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }
}

/// A named set of calculation configurations compiled together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewDefinition {
    /// View name.
    pub name: String,
    /// The configurations to compile, one graph each.
    pub configs: Vec<CalculationConfig>,
}

impl ViewDefinition {
    /// Create an empty view definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configs: Vec::new(),
        }
    }

    /// Add a calculation configuration.
    pub fn with_config(mut self, config: CalculationConfig) -> Self {
        self.configs.push(config);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::Target;

    #[test]
    fn default_options() {
        let options = BuildOptions::default();
        assert_eq!(options.max_workers, 0);
        assert_eq!(options.queue, QueueStrategy::ConcurrentQueue);
        assert!(!options.strict);
        assert!(!options.enable_failure_reporting);
    }

    #[test]
    fn config_round_trips_as_json() {
        let config = CalculationConfig::new("Default")
            .with_requirement(ValueRequirement::new("Present Value", Target::security("42")));
        let json = serde_json::to_string(&config).unwrap();
        let back: CalculationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "Default");
        assert_eq!(back.requirements.len(), 1);
    }
}
