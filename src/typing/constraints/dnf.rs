use std::{fmt, iter};

use fnv::FnvHashSet;

use crate::utils::{dedup_stable, join};

use super::{Constraint, ConstraintInfo, ConstraintKind};

/// A conjunction of atomic constraints
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Clause(pub Vec<Constraint>);

impl Clause {
    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "true")
        } else {
            write!(f, "({})", join(&self.0, " ∧ "))
        }
    }
}

/// A constraint in disjunctive normal form: it holds if any clause holds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dnf {
    pub clauses: Vec<Clause>,
}

impl fmt::Display for Dnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            write!(f, "false")
        } else {
            write!(f, "{}", join(&self.clauses, " ∨ "))
        }
    }
}

impl Dnf {
    /// Rebuilds the expansion as an `Or` of `And`s
    pub fn into_constraint(self, info: ConstraintInfo) -> Constraint {
        let children = self
            .clauses
            .into_iter()
            .map(|clause| {
                if clause.is_empty() {
                    Constraint::truth(info.clone())
                } else {
                    Constraint::new(ConstraintKind::And(clause.0), info.clone())
                }
            })
            .collect();
        Constraint::or(children, info)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DnfError {
    TooManyClauses { limit: usize, needed: usize },
}

impl fmt::Display for DnfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnfError::TooManyClauses { limit, needed } => write!(
                f,
                "expansion needs {} alternatives, more than the limit of {}",
                needed, limit
            ),
        }
    }
}

impl std::error::Error for DnfError {}

/// Expands `c` into disjunctive normal form.
///
/// Alternatives keep the order of the input: for a conjunction the first
/// child's alternatives vary slowest. With `max_clauses` set, an expansion
/// that could produce more clauses than the limit is refused up front.
pub fn to_dnf(c: &Constraint, max_clauses: Option<usize>) -> Result<Dnf, DnfError> {
    if let Some(limit) = max_clauses {
        let needed = clause_count(c);
        if needed > limit {
            return Err(DnfError::TooManyClauses { limit, needed });
        }
    }

    let clauses = clauses(c).collect::<Vec<_>>();
    log::trace!("[dnf] {} clause(s) for {}", clauses.len(), c);
    Ok(Dnf { clauses })
}

/// Number of clauses `c` expands into before duplicates are removed
pub fn clause_count(c: &Constraint) -> usize {
    match &c.kind {
        ConstraintKind::And(children) => children
            .iter()
            .fold(1usize, |n, child| n.saturating_mul(clause_count(child))),
        ConstraintKind::Or(children) => children
            .iter()
            .fold(0usize, |n, child| n.saturating_add(clause_count(child))),
        _ => 1,
    }
}

type Alternatives<'c> = Box<dyn Iterator<Item = Vec<Constraint>> + 'c>;

/// The clauses of a DNF expansion, produced one at a time in the same order
/// as [`to_dnf`]. A clause is only built when it is asked for.
pub struct Clauses<'c> {
    alternatives: Alternatives<'c>,
    seen: FnvHashSet<Vec<Constraint>>,
}

impl Iterator for Clauses<'_> {
    type Item = Clause;

    fn next(&mut self) -> Option<Clause> {
        loop {
            let mut atoms = self.alternatives.next()?;
            dedup_stable(&mut atoms);
            if self.seen.insert(atoms.clone()) {
                return Some(Clause(atoms));
            }
        }
    }
}

pub fn clauses(c: &Constraint) -> Clauses<'_> {
    Clauses {
        alternatives: alternatives(c),
        seen: FnvHashSet::default(),
    }
}

fn alternatives<'c>(c: &'c Constraint) -> Alternatives<'c> {
    match &c.kind {
        ConstraintKind::And(children) => children.iter().fold(
            Box::new(iter::once(vec![])) as Alternatives<'c>,
            |prefixes: Alternatives<'c>, child| -> Alternatives<'c> {
                Box::new(prefixes.flat_map(move |prefix| {
                    alternatives(child).map(move |alt| {
                        let mut clause = prefix.clone();
                        clause.extend(alt);
                        clause
                    })
                }))
            },
        ),
        ConstraintKind::Or(children) => Box::new(children.iter().flat_map(alternatives)),
        ConstraintKind::True => Box::new(iter::once(vec![])),
        _ => Box::new(iter::once(vec![c.clone()])),
    }
}
