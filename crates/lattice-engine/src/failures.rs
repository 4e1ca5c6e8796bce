//! Failure listeners.

use parking_lot::Mutex;
use tracing::warn;

use lattice_core::ResolutionFailure;
use lattice_traits::output::FailureListener;

/// Collects failures for later inspection; useful in tests and operator
/// tooling.
#[derive(Default)]
pub struct CollectingFailureListener {
    failures: Mutex<Vec<ResolutionFailure>>,
}

impl CollectingFailureListener {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the failures collected so far.
    pub fn failures(&self) -> Vec<ResolutionFailure> {
        self.failures.lock().clone()
    }

    /// Number of failures collected so far.
    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

impl FailureListener for CollectingFailureListener {
    fn on_failure(&self, failure: &ResolutionFailure) {
        self.failures.lock().push(failure.clone());
    }
}

/// Logs each failure chain at `warn` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingFailureListener;

impl FailureListener for LoggingFailureListener {
    fn on_failure(&self, failure: &ResolutionFailure) {
        warn!(requirement = %failure.requirement, "resolution failed:\n{}", failure.explain());
    }
}
