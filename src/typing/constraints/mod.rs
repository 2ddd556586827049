mod dnf;
mod simplify;

pub use dnf::*;

use std::{fmt, hash::Hash, sync::Arc};

use crate::{
    errors::{SolverError, SolverResult},
    span::Source,
    typing::{
        registry::TypeRegistry,
        subst::{Subst, Substitutable},
        ty::{Ty, TyVar},
        unify::UnifyError,
    },
    utils::join,
};

/// Produces a diagnostic message from the substitution in effect when the
/// constraint failed.
///
/// Two messages are equal only if they share the same closure, which keeps
/// constraint equality cheap and value-based for everything else.
#[derive(Clone)]
pub struct FailureMessage(Arc<dyn Fn(&Subst) -> String + Send + Sync>);

impl FailureMessage {
    pub fn new<F>(f: F) -> FailureMessage
    where
        F: Fn(&Subst) -> String + Send + Sync + 'static,
    {
        FailureMessage(Arc::new(f))
    }

    pub fn call(&self, subst: &Subst) -> String {
        (self.0)(subst)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const u8 as usize
    }
}

impl PartialEq for FailureMessage {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for FailureMessage {}

impl Hash for FailureMessage {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.addr().hash(state)
    }
}

impl fmt::Debug for FailureMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FailureMessage({:#x})", self.addr())
    }
}

/// Where a constraint came from
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ConstraintInfo {
    pub src: Source,
    /// Source text of the expression the constraint was generated for
    pub expr: String,
    pub failure: Option<FailureMessage>,
}

impl ConstraintInfo {
    pub fn new<S: Into<String>>(src: Source, expr: S) -> ConstraintInfo {
        ConstraintInfo {
            src,
            expr: expr.into(),
            failure: None,
        }
    }

    pub fn with_failure<F>(mut self, f: F) -> ConstraintInfo
    where
        F: Fn(&Subst) -> String + Send + Sync + 'static,
    {
        self.failure = Some(FailureMessage::new(f));
        self
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Eq(Ty, Ty),
    Convertible(Ty, Ty),
    HasName(Ty, String),
    HasMember(Ty, String),
    And(Vec<Constraint>),
    Or(Vec<Constraint>),
    True,
    False,
}

impl fmt::Debug for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Eq(a, b) => write!(f, "{} ≡ {}", a, b),
            ConstraintKind::Convertible(a, b) => write!(f, "{} <: {}", a, b),
            ConstraintKind::HasName(t, n) => write!(f, "name({}) ≡ {}", t, n),
            ConstraintKind::HasMember(t, m) => write!(f, "{} ∈ members({})", m, t),
            ConstraintKind::And(cs) => write!(f, "({})", join(cs, " ∧ ")),
            ConstraintKind::Or(cs) => write!(f, "({})", join(cs, " ∨ ")),
            ConstraintKind::True => write!(f, "true"),
            ConstraintKind::False => write!(f, "false"),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub info: ConstraintInfo,
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:?} @ {}", self.kind, self.info.src)
        } else {
            write!(f, "{:?}", self.kind)
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)
    }
}

impl Constraint {
    pub fn new(kind: ConstraintKind, info: ConstraintInfo) -> Constraint {
        Constraint { kind, info }
    }

    pub fn eq(lhs: Ty, rhs: Ty, info: ConstraintInfo) -> Constraint {
        Constraint::new(ConstraintKind::Eq(lhs, rhs), info)
    }

    pub fn convertible(from: Ty, to: Ty, info: ConstraintInfo) -> Constraint {
        Constraint::new(ConstraintKind::Convertible(from, to), info)
    }

    pub fn has_name<S: Into<String>>(ty: Ty, name: S, info: ConstraintInfo) -> Constraint {
        Constraint::new(ConstraintKind::HasName(ty, name.into()), info)
    }

    pub fn has_member<S: Into<String>>(ty: Ty, member: S, info: ConstraintInfo) -> Constraint {
        Constraint::new(ConstraintKind::HasMember(ty, member.into()), info)
    }

    /// All of `children` must hold. At least one child is required.
    pub fn and(children: Vec<Constraint>, info: ConstraintInfo) -> SolverResult<Constraint> {
        if children.is_empty() {
            return Err(SolverError::empty_conjunction());
        }
        Ok(Constraint::new(ConstraintKind::And(children), info))
    }

    /// At least one of `children` must hold
    pub fn or(children: Vec<Constraint>, info: ConstraintInfo) -> Constraint {
        Constraint::new(ConstraintKind::Or(children), info)
    }

    pub(crate) fn truth(info: ConstraintInfo) -> Constraint {
        Constraint::new(ConstraintKind::True, info)
    }

    pub(crate) fn falsity(info: ConstraintInfo) -> Constraint {
        Constraint::new(ConstraintKind::False, info)
    }

    pub fn with_failure<F>(mut self, f: F) -> Constraint
    where
        F: Fn(&Subst) -> String + Send + Sync + 'static,
    {
        self.info.failure = Some(FailureMessage::new(f));
        self
    }

    pub fn is_true(&self) -> bool {
        matches!(self.kind, ConstraintKind::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self.kind, ConstraintKind::False)
    }

    /// True if the constraint holds under every substitution
    pub fn is_tautological(&self, registry: &TypeRegistry) -> bool {
        match &self.kind {
            ConstraintKind::Eq(a, b) => a == b,
            ConstraintKind::Convertible(a, b) => {
                a == b
                    || match (a, b) {
                        (Ty::Const(from), Ty::Const(to)) => {
                            registry.is_convertible_named(from, to)
                        }
                        _ => false,
                    }
            }
            ConstraintKind::And(cs) | ConstraintKind::Or(cs) => {
                !cs.is_empty() && cs.iter().all(|c| c.is_tautological(registry))
            }
            ConstraintKind::True => true,
            ConstraintKind::HasName(..) | ConstraintKind::HasMember(..) | ConstraintKind::False => {
                false
            }
        }
    }

    /// The message reported when this constraint fails under `subst`.
    /// `cause` is the unification error that made an equality fail, if any.
    pub fn failure_message(&self, subst: &Subst, cause: Option<&UnifyError>) -> String {
        if let Some(failure) = &self.info.failure {
            return failure.call(subst);
        }

        match &self.kind {
            ConstraintKind::Eq(a, b) => match cause {
                Some(err) => err.message(subst),
                None => UnifyError::Mismatch(a.clone(), b.clone()).message(subst),
            },
            ConstraintKind::Convertible(a, b) => format!(
                "`{}` can't be converted to `{}`",
                subst.resolve(a),
                subst.resolve(b)
            ),
            ConstraintKind::HasName(_, name) => format!("no type named `{}` is known", name),
            ConstraintKind::HasMember(_, member) => {
                format!("no type has a member named `{}`", member)
            }
            ConstraintKind::And(cs) => {
                join(cs.iter().map(|c| c.failure_message(subst, None)), "\n")
            }
            ConstraintKind::Or(_) | ConstraintKind::True | ConstraintKind::False => {
                if self.info.expr.is_empty() {
                    str!("type constraints can't be satisfied")
                } else {
                    format!("no valid type for `{}`", self.info.expr)
                }
            }
        }
    }

    /// One message per failing part. Conjunctions without their own message
    /// report each child separately.
    pub fn failure_messages(&self, subst: &Subst) -> Vec<(Source, String)> {
        match &self.kind {
            ConstraintKind::And(cs) if self.info.failure.is_none() => {
                cs.iter().flat_map(|c| c.failure_messages(subst)).collect()
            }
            _ => vec![(self.info.src.clone(), self.failure_message(subst, None))],
        }
    }
}

impl Substitutable for Constraint {
    fn apply_subst(&mut self, subst: &Subst) {
        match &mut self.kind {
            ConstraintKind::Eq(a, b) | ConstraintKind::Convertible(a, b) => {
                a.apply_subst(subst);
                b.apply_subst(subst);
            }
            ConstraintKind::HasName(t, _) | ConstraintKind::HasMember(t, _) => {
                t.apply_subst(subst);
            }
            ConstraintKind::And(cs) | ConstraintKind::Or(cs) => cs.apply_subst(subst),
            ConstraintKind::True | ConstraintKind::False => {}
        }
    }

    fn free_vars(&self) -> Vec<&TyVar> {
        match &self.kind {
            ConstraintKind::Eq(a, b) | ConstraintKind::Convertible(a, b) => {
                let mut vars = a.free_vars();
                for v in b.free_vars() {
                    if !vars.contains(&v) {
                        vars.push(v);
                    }
                }
                vars
            }
            ConstraintKind::HasName(t, _) | ConstraintKind::HasMember(t, _) => t.free_vars(),
            ConstraintKind::And(cs) | ConstraintKind::Or(cs) => cs.free_vars(),
            ConstraintKind::True | ConstraintKind::False => vec![],
        }
    }
}
