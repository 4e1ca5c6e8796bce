//! Exclusion group assignment backed by a map.

use std::collections::HashMap;

use lattice_core::FunctionId;
use lattice_traits::exclusion::ExclusionGroups;

/// Explicit function-to-group assignment.
#[derive(Default)]
pub struct MapExclusionGroups {
    groups: HashMap<FunctionId, String>,
}

impl MapExclusionGroups {
    /// A policy with no assignments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a function to a group.
    pub fn assign(&mut self, function: impl Into<FunctionId>, group: impl Into<String>) {
        self.groups.insert(function.into(), group.into());
    }

    /// Assign a function to a group, builder style.
    pub fn with(mut self, function: impl Into<FunctionId>, group: impl Into<String>) -> Self {
        self.assign(function, group);
        self
    }
}

impl ExclusionGroups for MapExclusionGroups {
    fn group_of(&self, function: &FunctionId) -> Option<&str> {
        self.groups.get(function).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn functions_in_one_group_exclude_each_other() {
        let policy = MapExclusionGroups::new()
            .with("DiscountingPv", "pricing")
            .with("BlackPv", "pricing")
            .with("CurveFn", "curves");
        assert!(policy.excludes(&FunctionId::new("DiscountingPv"), &FunctionId::new("BlackPv")));
        assert!(!policy.excludes(&FunctionId::new("DiscountingPv"), &FunctionId::new("CurveFn")));
        assert!(!policy.excludes(
            &FunctionId::new("DiscountingPv"),
            &FunctionId::new("Unassigned")
        ));
    }
}
