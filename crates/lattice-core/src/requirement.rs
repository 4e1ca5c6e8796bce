//! Value requirements.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::ValueName;
use crate::properties::ValueProperties;
use crate::specification::ValueSpecification;
use crate::target::Target;

/// A request for a named value on a target under constraints.
///
/// Created by the caller per compute cycle and immutable for its duration.
/// Equality is structural; requirements are the memoization key for
/// resolution, so identical sub-requirements share one result.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ValueRequirement {
    value_name: ValueName,
    target: Target,
    constraints: ValueProperties,
}

impl ValueRequirement {
    /// Create an unconstrained requirement.
    pub fn new(value_name: impl Into<ValueName>, target: Target) -> Self {
        Self {
            value_name: value_name.into(),
            target,
            constraints: ValueProperties::none(),
        }
    }

    /// Create a requirement with constraints.
    pub fn with_constraints(
        value_name: impl Into<ValueName>,
        target: Target,
        constraints: ValueProperties,
    ) -> Self {
        Self {
            value_name: value_name.into(),
            target,
            constraints,
        }
    }

    /// The requested value name.
    pub fn value_name(&self) -> &ValueName {
        &self.value_name
    }

    /// The target the value is requested for.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The constraints on acceptable specifications.
    pub fn constraints(&self) -> &ValueProperties {
        &self.constraints
    }

    /// Whether a specification satisfies this requirement.
    ///
    /// Names and targets must match exactly and every constraint must be
    /// present in the specification with a compatible (or wildcard) value.
    pub fn is_satisfied_by(&self, spec: &ValueSpecification) -> bool {
        self.value_name == *spec.value_name()
            && self.target == *spec.target()
            && self.constraints.is_satisfied_by(spec.properties())
    }
}

impl fmt::Display for ValueRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]{}", self.value_name, self.target, self.constraints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::FunctionId;

    fn spec(props: ValueProperties) -> ValueSpecification {
        ValueSpecification::new(
            "Present Value",
            Target::security("42"),
            props,
            FunctionId::new("DiscountingPv"),
        )
    }

    #[test]
    fn unconstrained_requirement_matches_name_and_target() {
        let req = ValueRequirement::new("Present Value", Target::security("42"));
        assert!(req.is_satisfied_by(&spec(ValueProperties::none())));
    }

    #[test]
    fn target_mismatch_fails() {
        let req = ValueRequirement::new("Present Value", Target::security("43"));
        assert!(!req.is_satisfied_by(&spec(ValueProperties::none())));
    }

    #[test]
    fn constraint_must_be_offered() {
        let req = ValueRequirement::with_constraints(
            "Present Value",
            Target::security("42"),
            ValueProperties::builder().with("Currency", "USD").build(),
        );
        assert!(!req.is_satisfied_by(&spec(ValueProperties::none())));
        let offered = ValueProperties::builder().with("Currency", "USD").build();
        assert!(req.is_satisfied_by(&spec(offered)));
    }

    #[test]
    fn round_trips_as_json() {
        let req = ValueRequirement::with_constraints(
            "Present Value",
            Target::security("42"),
            ValueProperties::builder().with("Currency", "USD").build(),
        );
        let json = serde_json::to_string(&req).unwrap();
        let back: ValueRequirement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
