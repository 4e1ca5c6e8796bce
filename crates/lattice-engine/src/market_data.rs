//! Market data availability policies.

use std::collections::HashSet;

use lattice_core::{Target, ValueName, ValueRequirement};
use lattice_traits::market_data::MarketDataAvailability;

/// Strict policy: only explicitly registered (value name, target) pairs are
/// available.
#[derive(Default)]
pub struct FixedMarketDataAvailability {
    available: HashSet<(ValueName, Target)>,
}

impl FixedMarketDataAvailability {
    /// A policy under which nothing is available.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register an available value on a target.
    pub fn add(&mut self, value_name: impl Into<ValueName>, target: Target) {
        self.available.insert((value_name.into(), target));
    }

    /// Register an available value, builder style.
    pub fn with(mut self, value_name: impl Into<ValueName>, target: Target) -> Self {
        self.add(value_name, target);
        self
    }
}

impl MarketDataAvailability for FixedMarketDataAvailability {
    fn is_available(&self, requirement: &ValueRequirement) -> bool {
        self.available
            .contains(&(requirement.value_name().clone(), requirement.target().clone()))
    }
}

/// Optimistic policy: any requirement whose value name is registered is
/// assumed available, regardless of target or constraints.
///
/// Cheap to configure and never blocks resolution on missing subscriptions;
/// the cost is that wrong optimism only surfaces at execution time, outside
/// the builder.
#[derive(Default)]
pub struct OptimisticMarketDataAvailability {
    names: HashSet<ValueName>,
}

impl OptimisticMarketDataAvailability {
    /// A policy with no registered names.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a value name as assumed available.
    pub fn add(&mut self, value_name: impl Into<ValueName>) {
        self.names.insert(value_name.into());
    }

    /// Register a value name, builder style.
    pub fn with(mut self, value_name: impl Into<ValueName>) -> Self {
        self.add(value_name);
        self
    }
}

impl MarketDataAvailability for OptimisticMarketDataAvailability {
    fn is_available(&self, requirement: &ValueRequirement) -> bool {
        self.names.contains(requirement.value_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_policy_matches_exact_pairs() {
        let policy =
            FixedMarketDataAvailability::empty().with("Discount Curve", Target::currency("USD"));
        assert!(policy.is_available(&ValueRequirement::new(
            "Discount Curve",
            Target::currency("USD")
        )));
        assert!(!policy.is_available(&ValueRequirement::new(
            "Discount Curve",
            Target::currency("GBP")
        )));
    }

    #[test]
    fn optimistic_policy_ignores_target() {
        let policy = OptimisticMarketDataAvailability::empty().with("Discount Curve");
        assert!(policy.is_available(&ValueRequirement::new(
            "Discount Curve",
            Target::currency("USD")
        )));
        assert!(policy.is_available(&ValueRequirement::new(
            "Discount Curve",
            Target::currency("JPY")
        )));
        assert!(!policy.is_available(&ValueRequirement::new("Vega", Target::currency("USD"))));
    }
}
