//! Value specifications.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{FunctionId, ValueName};
use crate::properties::ValueProperties;
use crate::target::Target;

/// A concrete, fully-constrained value identity produced by one node.
///
/// Unlike a [`ValueRequirement`](crate::ValueRequirement), whose constraints
/// may be partial or wildcarded, a specification carries the resolved
/// properties and the identity of the function that produces it.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ValueSpecification {
    value_name: ValueName,
    target: Target,
    properties: ValueProperties,
    function: FunctionId,
}

impl ValueSpecification {
    /// Create a specification.
    pub fn new(
        value_name: impl Into<ValueName>,
        target: Target,
        properties: ValueProperties,
        function: FunctionId,
    ) -> Self {
        Self {
            value_name: value_name.into(),
            target,
            properties,
            function,
        }
    }

    /// A market-data leaf specification for a requested value.
    ///
    /// Carries the reserved [`FunctionId::market_data`] identity; no
    /// dependency node produces it.
    pub fn market_data(
        value_name: impl Into<ValueName>,
        target: Target,
        properties: ValueProperties,
    ) -> Self {
        Self::new(value_name, target, properties, FunctionId::market_data())
    }

    /// The produced value name.
    pub fn value_name(&self) -> &ValueName {
        &self.value_name
    }

    /// The target the value is produced for.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The resolved properties.
    pub fn properties(&self) -> &ValueProperties {
        &self.properties
    }

    /// The identity of the producing function.
    pub fn function(&self) -> &FunctionId {
        &self.function
    }

    /// Whether this specification is a market-data leaf.
    pub fn is_market_data(&self) -> bool {
        self.function.is_market_data()
    }

    /// A copy with properties narrowed against a requirement's constraints.
    pub fn compose(&self, constraints: &ValueProperties) -> Self {
        Self {
            value_name: self.value_name.clone(),
            target: self.target.clone(),
            properties: self.properties.compose(constraints),
            function: self.function.clone(),
        }
    }
}

impl fmt::Display for ValueSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]{}<-{}",
            self.value_name, self.target, self.properties, self.function
        )
    }
}
