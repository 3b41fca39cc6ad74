use std::io;
use thiserror::Error;

/// Errors that can occur while querying a [`crate::Solver`].
///
/// These are query-time errors raised by this crate's own API surface;
/// internal invariant violations (a solver bug, not a property of the
/// input) are asserted with `assert!`/`expect` instead of being
/// represented here, per the core's failure semantics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    /// `get_result` was called before `solve` returned `true`.
    #[error("solver has not reached a satisfying assignment")]
    NoModel,
}

/// Errors raised by the DIMACS front end, a collaborator of the core: never
/// surfaced through [`SolverError`].
#[derive(Debug, Error)]
pub enum DimacsError {
    /// The input was not valid DIMACS CNF.
    #[error("malformed DIMACS input: {0}")]
    Parse(String),

    /// Reading the input failed.
    #[error("failed to read DIMACS input: {0}")]
    Io(#[from] io::Error),
}

impl From<&'static str> for DimacsError {
    fn from(message: &'static str) -> Self {
        Self::Parse(message.to_string())
    }
}
