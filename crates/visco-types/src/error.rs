//! Error types for the visco controller and its engines.
//!
//! All crates return `ViscoResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the controller and every collaborator.
#[derive(Debug, Error)]
pub enum ViscoError {
    /// A required parameter is missing, has the wrong shape, or is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// A delegated solve (assembly, linear system) failed.
    #[error("Solver failure: {0}")]
    SolverFailure(String),

    /// An iterative solve failed to converge.
    #[error("Solver did not converge after {iterations} iterations (residual: {residual:.2e})")]
    SolverDivergence {
        iterations: u32,
        residual: f64,
    },

    /// Mesh adaptation failed.
    #[error("Refinement failed: {0}")]
    Refinement(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A sequencing invariant was violated (e.g. stale solver, double switch).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience alias for `Result<T, ViscoError>`.
pub type ViscoResult<T> = Result<T, ViscoError>;
