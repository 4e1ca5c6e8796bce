//! In-memory function catalog and a declarative function implementation.

use std::sync::Arc;

use lattice_core::{
    FunctionId, Target, TargetKind, ValueName, ValueProperties, ValueRequirement,
    ValueSpecification,
};
use lattice_traits::function::{CalculationFunction, FunctionCatalog};

/// A calculation function declared by data rather than code.
///
/// Outputs and inputs are declared as (value name, properties) pairs against
/// the function's own target; the numeric implementation behind the
/// declaration is outside the resolver's concern. Functions needing
/// cross-target inputs or input sets that depend on the resolved output
/// implement [`CalculationFunction`] directly instead.
pub struct DeclaredFunction {
    id: FunctionId,
    target_kind: TargetKind,
    outputs: Vec<(ValueName, ValueProperties)>,
    inputs: Vec<(ValueName, ValueProperties)>,
}

impl DeclaredFunction {
    /// Create a function with no declared outputs or inputs.
    pub fn new(id: impl Into<FunctionId>, target_kind: TargetKind) -> Self {
        Self {
            id: id.into(),
            target_kind,
            outputs: Vec::new(),
            inputs: Vec::new(),
        }
    }

    /// Declare an output with properties.
    pub fn producing(
        mut self,
        value_name: impl Into<ValueName>,
        properties: ValueProperties,
    ) -> Self {
        self.outputs.push((value_name.into(), properties));
        self
    }

    /// Declare an input requirement with constraints, on the same target.
    pub fn requiring(
        mut self,
        value_name: impl Into<ValueName>,
        constraints: ValueProperties,
    ) -> Self {
        self.inputs.push((value_name.into(), constraints));
        self
    }
}

impl CalculationFunction for DeclaredFunction {
    fn id(&self) -> &FunctionId {
        &self.id
    }

    fn target_kind(&self) -> TargetKind {
        self.target_kind
    }

    fn outputs(&self, target: &Target) -> Vec<ValueSpecification> {
        self.outputs
            .iter()
            .map(|(name, properties)| {
                ValueSpecification::new(
                    name.clone(),
                    target.clone(),
                    properties.clone(),
                    self.id.clone(),
                )
            })
            .collect()
    }

    fn inputs(&self, target: &Target, _output: &ValueSpecification) -> Vec<ValueRequirement> {
        self.inputs
            .iter()
            .map(|(name, constraints)| {
                ValueRequirement::with_constraints(name.clone(), target.clone(), constraints.clone())
            })
            .collect()
    }
}

/// A catalog backed by a plain vector of functions.
#[derive(Default)]
pub struct InMemoryFunctionCatalog {
    functions: Vec<Arc<dyn CalculationFunction>>,
}

impl InMemoryFunctionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function.
    pub fn register(&mut self, function: Arc<dyn CalculationFunction>) {
        self.functions.push(function);
    }

    /// Register a function, builder style.
    pub fn with(mut self, function: Arc<dyn CalculationFunction>) -> Self {
        self.register(function);
        self
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl FunctionCatalog for InMemoryFunctionCatalog {
    fn functions(&self) -> Vec<Arc<dyn CalculationFunction>> {
        self.functions.clone()
    }
}
