//! Calculation function and catalog contracts.

use std::sync::Arc;

use lattice_core::{
    FunctionId, Target, TargetKind, ValueName, ValueRequirement, ValueSpecification,
};

/// A calculation function as the resolver sees it.
///
/// The numeric formula behind a function is opaque here; the contract is the
/// two-pass declaration used during graph construction:
///
/// 1. [`outputs`](CalculationFunction::outputs) declares what the function
///    can produce for a target, before any commitment is made;
/// 2. [`inputs`](CalculationFunction::inputs) is asked only once the
///    function has been tentatively selected for one of those outputs, and
///    may depend on the resolved output properties.
///
/// Implementations must be side-effect free: both methods are pure,
/// in-memory operations, called concurrently from many workers.
pub trait CalculationFunction: Send + Sync {
    /// The unique identity of this function.
    fn id(&self) -> &FunctionId;

    /// The kind of target this function applies to.
    fn target_kind(&self) -> TargetKind;

    /// Whether this function can apply to a concrete target.
    fn can_apply(&self, target: &Target) -> bool {
        target.kind() == self.target_kind()
    }

    /// The specifications this function can produce for a target.
    ///
    /// Properties may contain wildcards; they are narrowed against the
    /// requirement's constraints when the function is selected.
    fn outputs(&self, target: &Target) -> Vec<ValueSpecification>;

    /// The inputs required to produce `output` for `target`.
    ///
    /// Called once the function is tentatively selected; `output` carries
    /// the properties as narrowed by the requirement being satisfied.
    fn inputs(&self, target: &Target, output: &ValueSpecification) -> Vec<ValueRequirement>;
}

/// An enumerable set of calculation functions.
///
/// Read-only for the duration of a build and safely shareable across
/// concurrent builds.
pub trait FunctionCatalog: Send + Sync {
    /// All functions in the catalog.
    fn functions(&self) -> Vec<Arc<dyn CalculationFunction>>;

    /// Functions declaring `value_name` among their outputs for `target`.
    ///
    /// The default implementation scans [`functions`](FunctionCatalog::functions);
    /// catalogs with an index can override it.
    fn candidates(&self, value_name: &ValueName, target: &Target) -> Vec<Arc<dyn CalculationFunction>> {
        self.functions()
            .into_iter()
            .filter(|f| f.can_apply(target))
            .filter(|f| {
                f.outputs(target)
                    .iter()
                    .any(|spec| spec.value_name() == value_name)
            })
            .collect()
    }
}
