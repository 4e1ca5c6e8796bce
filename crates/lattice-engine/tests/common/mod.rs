//! Shared helpers for graph-building tests.

#![allow(dead_code)]

use std::sync::Arc;

use lattice_core::{
    FunctionId, Target, TargetKind, ValueName, ValueProperties, ValueRequirement,
    ValueSpecification,
};
use lattice_engine::{
    DeclaredFunction, DefaultFunctionResolver, FixedMarketDataAvailability, GraphBuilder,
    InMemoryFunctionCatalog,
};
use lattice_traits::exclusion::{ExclusionGroups, NoExclusions};
use lattice_traits::function::CalculationFunction;
use lattice_traits::market_data::MarketDataAvailability;

/// The security most tests compute against.
pub fn security() -> Target {
    Target::security("42")
}

/// An unconstrained requirement on [`security`].
pub fn req(name: &str) -> ValueRequirement {
    ValueRequirement::new(name, security())
}

/// A leaf function: produces one value on its target, needs nothing.
pub fn producing(id: &str, output: &str) -> Arc<DeclaredFunction> {
    Arc::new(
        DeclaredFunction::new(id, TargetKind::Security)
            .producing(output, ValueProperties::none()),
    )
}

/// A function producing one value from one same-target input.
pub fn requiring_producing(id: &str, input: &str, output: &str) -> Arc<DeclaredFunction> {
    Arc::new(
        DeclaredFunction::new(id, TargetKind::Security)
            .producing(output, ValueProperties::none())
            .requiring(input, ValueProperties::none()),
    )
}

/// A function whose inputs live on other targets.
pub struct CrossTargetFunction {
    id: FunctionId,
    target_kind: TargetKind,
    output: ValueName,
    inputs: Vec<ValueRequirement>,
}

impl CrossTargetFunction {
    pub fn new(
        id: &str,
        target_kind: TargetKind,
        output: &str,
        inputs: Vec<ValueRequirement>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: FunctionId::new(id),
            target_kind,
            output: ValueName::new(output),
            inputs,
        })
    }
}

impl CalculationFunction for CrossTargetFunction {
    fn id(&self) -> &FunctionId {
        &self.id
    }

    fn target_kind(&self) -> TargetKind {
        self.target_kind
    }

    fn outputs(&self, target: &Target) -> Vec<ValueSpecification> {
        vec![ValueSpecification::new(
            self.output.clone(),
            target.clone(),
            ValueProperties::none(),
            self.id.clone(),
        )]
    }

    fn inputs(&self, _target: &Target, _output: &ValueSpecification) -> Vec<ValueRequirement> {
        self.inputs.clone()
    }
}

/// A builder over a catalog with no market data and no exclusions.
pub fn builder(catalog: InMemoryFunctionCatalog) -> GraphBuilder {
    builder_with(
        catalog,
        Arc::new(FixedMarketDataAvailability::empty()),
        Arc::new(NoExclusions),
    )
}

/// A builder with explicit availability and exclusion policies.
pub fn builder_with(
    catalog: InMemoryFunctionCatalog,
    availability: Arc<dyn MarketDataAvailability>,
    exclusions: Arc<dyn ExclusionGroups>,
) -> GraphBuilder {
    GraphBuilder::new(
        "Default",
        Arc::new(DefaultFunctionResolver::new(Arc::new(catalog))),
        availability,
        exclusions,
    )
}
