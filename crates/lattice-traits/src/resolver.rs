//! Candidate resolution contracts.

use std::sync::Arc;

use lattice_core::ValueRequirement;

use crate::function::CalculationFunction;

/// Resolves a requirement to an ordered sequence of candidate functions.
///
/// The order is a total preference order, most-preferred first, and must be
/// a pure function of the catalog and priority policy so that graph
/// construction is deterministic regardless of worker scheduling. Returns an
/// empty sequence when nothing in the catalog claims the value name for the
/// target.
pub trait FunctionResolver: Send + Sync {
    /// The ordered candidates able to produce the requirement.
    fn resolve(&self, requirement: &ValueRequirement) -> Vec<Arc<dyn CalculationFunction>>;
}

/// Injectable priority for ordering competing candidates.
///
/// Higher values are preferred. Ties are broken by function identity, so
/// any priority assignment still yields a total order.
pub trait FunctionPriority: Send + Sync {
    /// The priority of a function; the default is 0.
    fn priority(&self, function: &dyn CalculationFunction) -> i32;
}
