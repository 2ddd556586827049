use crate::{
    errors::{Diagnostic, SolverResult},
    typing::{constraints::Constraint, subst::Subst},
};

use super::Solver;

/// Outcome of a [`Session`]
#[derive(Clone, Debug)]
pub struct SessionResult {
    pub subst: Subst,
    pub diagnostics: Vec<Diagnostic>,
    /// Constraints that could not be satisfied
    pub failed: Vec<Constraint>,
}

impl SessionResult {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty() && self.diagnostics.is_empty()
    }
}

/// Type-checks a compilation unit one expression at a time.
///
/// All expressions share one substitution, so a variable constrained in one
/// place can be resolved by another. Expressions that fail are held back and
/// retried by [`Session::finish`] once everything else is known.
pub struct Session<'s> {
    solver: &'s Solver<'s>,
    subst: Subst,
    failing: Vec<Constraint>,
}

impl<'s> Session<'s> {
    pub fn new(solver: &'s Solver<'s>) -> Session<'s> {
        Session::with_subst(solver, Subst::new())
    }

    pub fn with_subst(solver: &'s Solver<'s>, subst: Subst) -> Session<'s> {
        Session {
            solver,
            subst,
            failing: vec![],
        }
    }

    pub fn subst(&self) -> &Subst {
        &self.subst
    }

    pub fn pending(&self) -> &[Constraint] {
        &self.failing
    }

    /// Solves the constraints of one expression. Failures are queued instead
    /// of reported.
    pub fn solve(&mut self, constraints: Vec<Constraint>) -> SolverResult<bool> {
        let mut ignored = vec![];
        let solved = self
            .solver
            .try_solve(constraints.clone(), &mut ignored, &mut self.subst)?;
        if !solved {
            log::debug!(
                "[session] deferring {} constraint(s) ({} diagnostic(s))",
                constraints.len(),
                ignored.len()
            );
            self.failing.extend(constraints);
        }
        Ok(solved)
    }

    pub fn finish(mut self) -> SolverResult<SessionResult> {
        let mut diagnostics = vec![];
        let failing = std::mem::take(&mut self.failing);
        let failed = self
            .solver
            .resolve_failing(failing, &mut diagnostics, &mut self.subst)?;
        Ok(SessionResult {
            subst: self.subst,
            diagnostics,
            failed,
        })
    }
}
