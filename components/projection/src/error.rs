//! Projection errors and contract violations.

use thiserror::Error;

/// Errors raised while setting up a projection session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// The calling thread already has a session.
    #[error("a projection session is already initialized on this thread")]
    AlreadyInitialized,
    /// The configuration could not be parsed or is out of range.
    #[error("invalid projection configuration: {0}")]
    InvalidConfig(String),
}

/// Reports a broken programming contract and aborts the current operation.
///
/// Contract violations are bugs in the embedding or in generated code, never
/// script errors, so they are not recoverable.
#[track_caller]
pub fn contract_violation(message: &str) -> ! {
    tracing::error!(message, "projection contract violated");
    panic!("projection contract violated: {}", message);
}
