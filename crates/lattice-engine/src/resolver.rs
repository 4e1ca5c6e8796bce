//! Default candidate resolution.

use std::sync::Arc;

use lattice_core::ValueRequirement;
use lattice_traits::function::{CalculationFunction, FunctionCatalog};
use lattice_traits::resolver::{FunctionPriority, FunctionResolver};

/// Resolves candidates from a catalog in priority order.
///
/// Candidates are the catalog functions declaring the requested value name
/// for the target's kind, sorted by descending priority with function
/// identity as tiebreak. The order depends only on the catalog and the
/// priority policy, never on scheduling, which is what makes graph content
/// deterministic under concurrency.
pub struct DefaultFunctionResolver {
    catalog: Arc<dyn FunctionCatalog>,
    priority: Option<Arc<dyn FunctionPriority>>,
}

impl DefaultFunctionResolver {
    /// Create a resolver over a catalog with default (zero) priorities.
    pub fn new(catalog: Arc<dyn FunctionCatalog>) -> Self {
        Self {
            catalog,
            priority: None,
        }
    }

    /// Set the priority policy.
    pub fn with_priority(mut self, priority: Arc<dyn FunctionPriority>) -> Self {
        self.priority = Some(priority);
        self
    }

    fn priority_of(&self, function: &dyn CalculationFunction) -> i32 {
        self.priority.as_ref().map_or(0, |p| p.priority(function))
    }
}

impl FunctionResolver for DefaultFunctionResolver {
    fn resolve(&self, requirement: &ValueRequirement) -> Vec<Arc<dyn CalculationFunction>> {
        let mut candidates = self
            .catalog
            .candidates(requirement.value_name(), requirement.target());
        candidates.sort_by(|a, b| {
            self.priority_of(b.as_ref())
                .cmp(&self.priority_of(a.as_ref()))
                .then_with(|| a.id().cmp(b.id()))
        });
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DeclaredFunction, InMemoryFunctionCatalog};
    use lattice_core::{Target, TargetKind, ValueProperties};

    struct PreferBeta;

    impl FunctionPriority for PreferBeta {
        fn priority(&self, function: &dyn CalculationFunction) -> i32 {
            if function.id().as_str() == "PvBeta" {
                1
            } else {
                0
            }
        }
    }

    fn catalog() -> Arc<InMemoryFunctionCatalog> {
        Arc::new(
            InMemoryFunctionCatalog::new()
                .with(Arc::new(
                    DeclaredFunction::new("PvBeta", TargetKind::Security)
                        .producing("Present Value", ValueProperties::none()),
                ))
                .with(Arc::new(
                    DeclaredFunction::new("PvAlpha", TargetKind::Security)
                        .producing("Present Value", ValueProperties::none()),
                )),
        )
    }

    #[test]
    fn equal_priority_orders_by_identity() {
        let resolver = DefaultFunctionResolver::new(catalog());
        let requirement = ValueRequirement::new("Present Value", Target::security("42"));
        let resolved = resolver.resolve(&requirement);
        let ids: Vec<&str> = resolved.iter().map(|f| f.id().as_str()).collect();
        assert_eq!(ids, ["PvAlpha", "PvBeta"]);
    }

    #[test]
    fn priority_overrides_identity_order() {
        let resolver = DefaultFunctionResolver::new(catalog()).with_priority(Arc::new(PreferBeta));
        let requirement = ValueRequirement::new("Present Value", Target::security("42"));
        let resolved = resolver.resolve(&requirement);
        let ids: Vec<&str> = resolved.iter().map(|f| f.id().as_str()).collect();
        assert_eq!(ids, ["PvBeta", "PvAlpha"]);
    }

    #[test]
    fn unknown_name_resolves_to_nothing() {
        let resolver = DefaultFunctionResolver::new(catalog());
        let requirement = ValueRequirement::new("Vega", Target::security("42"));
        assert!(resolver.resolve(&requirement).is_empty());
    }
}
