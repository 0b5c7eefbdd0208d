//! Error kinds surfaced at the crate boundary.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All failures the optimization core can surface.
///
/// Constraint checks are not errors: the rules in [`crate::constraints`]
/// return `(bool, reason)` pairs and solvers fold infeasible orders into the
/// unassigned set. `ConstraintViolation` exists for diagnostic replay only.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed time string, coordinate, solver name, or scenario name.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No available couriers or no pending orders to optimize.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// The road-network oracle returned a non-OK response or was unreachable.
    #[error("oracle error: {0}")]
    Oracle(String),

    /// Branch-and-bound exceeded its deadline. The orchestrator retries with
    /// the greedy fallback unless that is disabled in configuration.
    #[error("solver exceeded its deadline of {deadline_secs}s")]
    SolverTimeout {
        /// Configured deadline that was exceeded.
        deadline_secs: u64,
    },

    /// A finished solution violated a rule during diagnostic replay.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}
