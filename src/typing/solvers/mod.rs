mod session;

pub use session::*;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{Diagnostic, SolverError, SolverResult},
    typing::{
        constraints::{clauses, Clause, Constraint, ConstraintKind},
        registry::TypeRegistry,
        subst::{Subst, Substitutable},
        unify::unify,
    },
    utils::dedup_stable,
};

/// Options controlling how much work a solve may do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Largest number of alternatives a single solve tries before giving up.
    /// `None` removes the limit.
    pub max_clauses: Option<usize>,
    /// Wall-clock budget for re-solving failed constraints one at a time
    pub time_limit: Option<Duration>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            max_clauses: Some(4096),
            time_limit: Some(Duration::from_secs(10)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Solver<'r> {
    registry: &'r TypeRegistry,
    options: SolverOptions,
}

/// Solves `constraints` with the default options. See [`Solver::try_solve`].
pub fn try_solve<I>(
    constraints: I,
    registry: &TypeRegistry,
    diagnostics: &mut Vec<Diagnostic>,
    subst: &mut Subst,
) -> SolverResult<bool>
where
    I: IntoIterator<Item = Constraint>,
{
    Solver::new(registry).try_solve(constraints, diagnostics, subst)
}

impl<'r> Solver<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Solver<'r> {
        Solver::with_options(registry, SolverOptions::default())
    }

    pub fn with_options(registry: &'r TypeRegistry, options: SolverOptions) -> Solver<'r> {
        Solver { registry, options }
    }

    /// Finds bindings that satisfy every constraint.
    ///
    /// On success the bindings are added to `subst` and `true` is returned.
    /// Otherwise `subst` is left as it was and the reasons are appended to
    /// `diagnostics`. An `Err` means the solver itself is broken, never that
    /// the constraints are unsatisfiable.
    pub fn try_solve<I>(
        &self,
        constraints: I,
        diagnostics: &mut Vec<Diagnostic>,
        subst: &mut Subst,
    ) -> SolverResult<bool>
    where
        I: IntoIterator<Item = Constraint>,
    {
        let constraints = constraints
            .into_iter()
            .filter(|c| !c.is_tautological(self.registry))
            .collect::<Vec<_>>();
        if constraints.is_empty() {
            return Ok(true);
        }

        log::debug!("[try_solve] {} constraint(s)", constraints.len());
        let info = constraints[0].info.clone();
        let constraint = if constraints.len() == 1 {
            constraints[0].clone()
        } else {
            Constraint::and(constraints.clone(), info)?
        };
        let simplified = constraint.simplify(subst, self.registry);
        log::debug!("[try_solve] simplified: {}", simplified);

        let mut failures = vec![];
        for (i, clause) in clauses(&simplified).enumerate() {
            if let Some(limit) = self.options.max_clauses {
                if i >= limit {
                    log::warn!("[try_solve] giving up after {} alternative(s)", limit);
                    self.too_complex(&constraints, limit, diagnostics);
                    return Ok(false);
                }
            }

            match self.solve_clause(&clause, subst, &mut failures)? {
                Some(solution) => {
                    log::debug!("[try_solve] alternative {} holds: {}", i, clause);
                    *subst = solution;
                    return Ok(true);
                }
                None => log::trace!("[try_solve] alternative {} fails: {}", i, clause),
            }
        }

        if failures.is_empty() {
            // no alternatives at all
            failures.push(Diagnostic::error(
                simplified.info.src.clone(),
                simplified.failure_message(subst, None),
            ));
        }
        dedup_stable(&mut failures);
        diagnostics.extend(failures);
        Ok(false)
    }

    /// Tries every atom of `clause` against a copy of `subst`. Returns the
    /// extended copy if all of them hold; otherwise records one diagnostic per
    /// failing atom.
    fn solve_clause(
        &self,
        clause: &Clause,
        subst: &Subst,
        failures: &mut Vec<Diagnostic>,
    ) -> SolverResult<Option<Subst>> {
        let mut candidate = subst.clone();
        let mut holds = true;
        for atom in clause.iter() {
            match &atom.kind {
                ConstraintKind::Eq(lhs, rhs) => match unify(lhs, rhs, &candidate) {
                    Ok(s) => candidate = s,
                    Err(err) => {
                        holds = false;
                        let msg = atom.failure_message(&candidate, Some(&err));
                        failures.push(Diagnostic::error(atom.info.src.clone(), msg));
                    }
                },
                ConstraintKind::False => {
                    holds = false;
                    let msg = atom.failure_message(&candidate, None);
                    failures.push(Diagnostic::error(atom.info.src.clone(), msg));
                }
                _ => {
                    return Err(SolverError::internal(format!(
                        "unexpected constraint after expansion: {}",
                        atom
                    )))
                }
            }
        }

        Ok(if holds { Some(candidate) } else { None })
    }

    fn too_complex(
        &self,
        constraints: &[Constraint],
        tried: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let mut reported = constraints
            .iter()
            .map(|c| {
                Diagnostic::error(
                    c.info.src.clone(),
                    format!(
                        "Expression is too complex to type-check (no solution among the first {} \
                         alternatives). Try simplifying this expression.",
                        tried
                    ),
                )
            })
            .collect::<Vec<_>>();
        dedup_stable(&mut reported);
        diagnostics.extend(reported);
    }

    /// Re-solves constraints that failed as part of a larger solve, one at a
    /// time against the shared `subst`, for as long as some of them make
    /// progress. Whatever still fails is reported to `diagnostics` and
    /// returned.
    pub fn resolve_failing(
        &self,
        failing: Vec<Constraint>,
        diagnostics: &mut Vec<Diagnostic>,
        subst: &mut Subst,
    ) -> SolverResult<Vec<Constraint>> {
        let start = Instant::now();
        let mut remaining = failing;
        let mut timed_out = false;

        while !remaining.is_empty() {
            if let Some(limit) = self.options.time_limit {
                if start.elapsed() >= limit {
                    timed_out = true;
                    break;
                }
            }

            let mut progress = false;
            let mut still_failing = vec![];
            for c in remaining {
                let mut ignored = vec![];
                if self.try_solve(vec![c.clone()], &mut ignored, subst)? {
                    progress = true;
                } else {
                    still_failing.push(c);
                }
            }

            still_failing.apply_subst(subst);
            remaining = still_failing;
            log::debug!(
                "[resolve_failing] {} constraint(s) left, progress = {}",
                remaining.len(),
                progress
            );

            if !progress {
                break;
            }
        }

        let mut reported = vec![];
        for c in remaining.iter() {
            if timed_out {
                let secs = self.options.time_limit.unwrap_or_default().as_secs_f64();
                reported.push(Diagnostic::error(
                    c.info.src.clone(),
                    format!(
                        "Expression failed to resolve in a reasonable time ({} seconds). \
                         Try simplifying this expression.",
                        secs
                    ),
                ));
            } else {
                reported.extend(
                    c.failure_messages(subst)
                        .into_iter()
                        .map(|(src, msg)| Diagnostic::error(src, msg)),
                );
            }
        }
        dedup_stable(&mut reported);
        diagnostics.extend(reported);
        Ok(remaining)
    }
}
