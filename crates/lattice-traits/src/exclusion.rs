//! Mutually-exclusive function policies.

use lattice_core::FunctionId;

/// Groups of functions that must not coexist in one graph for a target.
///
/// When a node is about to be added to a branch whose ancestors already
/// contain, for the same target, a node whose function shares an exclusion
/// group with it, the candidate is rejected and resolution moves on to the
/// next candidate. This prevents, for example, two discounting
/// methodologies being silently mixed within one plan.
pub trait ExclusionGroups: Send + Sync {
    /// The exclusion group the function belongs to, if any.
    fn group_of(&self, function: &FunctionId) -> Option<&str>;

    /// Whether two distinct functions are mutually exclusive.
    fn excludes(&self, a: &FunctionId, b: &FunctionId) -> bool {
        if a == b {
            return false;
        }
        match (self.group_of(a), self.group_of(b)) {
            (Some(ga), Some(gb)) => ga == gb,
            _ => false,
        }
    }
}

/// The policy under which nothing is excluded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExclusions;

impl ExclusionGroups for NoExclusions {
    fn group_of(&self, _function: &FunctionId) -> Option<&str> {
        None
    }
}
