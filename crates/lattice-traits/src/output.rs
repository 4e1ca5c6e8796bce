//! Failure reporting contract.

use lattice_core::ResolutionFailure;

/// Receives resolution failures for terminal requirements.
///
/// Invoked by the graph builder when failure reporting is enabled in
/// [`BuildOptions`](crate::config::BuildOptions); used by operators to
/// understand why a requested output could not be produced. Listeners are
/// called from worker threads and must be cheap and non-blocking.
pub trait FailureListener: Send + Sync {
    /// Called once per failed terminal requirement.
    fn on_failure(&self, failure: &ResolutionFailure);
}
