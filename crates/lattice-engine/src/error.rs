//! Engine error types.

use thiserror::Error;

/// Build-level error type.
///
/// Per-requirement resolution failures are data
/// ([`ResolutionFailure`](lattice_core::ResolutionFailure)), recorded in the
/// compiled graph; this type covers faults of the build itself.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The build was started with no terminal requirements.
    #[error("no requirements registered")]
    NoRequirements,

    /// The build was cancelled; no graph was published.
    #[error("build cancelled")]
    Cancelled,

    /// Terminal requirements failed under strict mode, or every terminal
    /// failed.
    #[error("unsatisfied terminal requirements: {failed} of {total} failed")]
    UnsatisfiedTerminals {
        /// Number of failed terminals.
        failed: usize,
        /// Total number of terminals.
        total: usize,
    },

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}
