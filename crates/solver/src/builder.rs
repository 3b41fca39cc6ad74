use crate::{
    error::DimacsError,
    Solver,
};
use cnf_parser::{
    Input,
    Output,
};

/// Accumulates DIMACS clauses streamed in by `cnf_parser::parse_cnf` and
/// feeds each finished clause straight into a [`Solver`].
///
/// Variables are registered with the solver lazily, on first appearance,
/// exactly as `Solver::initiate` documents; the `p cnf <nvars> <nclauses>`
/// header is read for its informational value only (the driver logs it)
/// and is not required to size anything ahead of time.
#[derive(Debug, Default)]
pub struct DimacsBuilder {
    solver: Solver,
    num_variables: Option<usize>,
    num_clauses: Option<usize>,
    current_clause: Vec<(bool, u64)>,
}

impl DimacsBuilder {
    /// Starts a builder that feeds the given (possibly non-default) solver,
    /// for callers that need to pick a [`crate::DecisionPolicy`] before
    /// parsing begins.
    pub fn with_solver(solver: Solver) -> Self {
        Self {
            solver,
            num_variables: None,
            num_clauses: None,
            current_clause: Vec::new(),
        }
    }

    /// The variable count from the `p cnf` header, if one was present.
    pub fn num_variables(&self) -> Option<usize> {
        self.num_variables
    }

    /// The clause count from the `p cnf` header, if one was present.
    pub fn num_clauses(&self) -> Option<usize> {
        self.num_clauses
    }

    /// Consumes the builder, returning the solver it fed.
    pub fn finalize(self) -> Solver {
        self.solver
    }

    fn finalize_current_clause(&mut self) {
        let clause = core::mem::take(&mut self.current_clause);
        self.solver.add_clause(clause);
    }
}

impl Output for DimacsBuilder {
    type Error = DimacsError;

    fn problem(&mut self, num_variables: u32, num_clauses: u32) -> Result<(), Self::Error> {
        self.num_variables = Some(num_variables as usize);
        self.num_clauses = Some(num_clauses as usize);
        Ok(())
    }

    fn literal(&mut self, literal: cnf_parser::Literal) -> Result<(), Self::Error> {
        let value = literal.into_value().get();
        self.current_clause.push((value > 0, value.unsigned_abs() as u64));
        Ok(())
    }

    fn finalize_clause(&mut self) -> Result<(), Self::Error> {
        self.finalize_current_clause();
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        if !self.current_clause.is_empty() {
            self.finalize_current_clause();
        }
        Ok(())
    }
}

/// Parses DIMACS CNF from `input`, returning a builder holding the solver it
/// was loaded into (ready for `solve`) together with the header counts.
pub fn parse_dimacs<I>(input: &mut I) -> Result<DimacsBuilder, cnf_parser::Error<DimacsError>>
where
    I: Input,
{
    parse_dimacs_with_solver(input, Solver::default())
}

/// Like [`parse_dimacs`], but feeds a caller-supplied solver instead of one
/// constructed with the baseline decision policy.
pub fn parse_dimacs_with_solver<I>(
    input: &mut I,
    solver: Solver,
) -> Result<DimacsBuilder, cnf_parser::Error<DimacsError>>
where
    I: Input,
{
    let mut builder = DimacsBuilder::with_solver(solver);
    cnf_parser::parse_cnf(input, &mut builder)?;
    Ok(builder)
}
