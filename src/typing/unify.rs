//! Structural unification of type terms against a [`Subst`].
use std::fmt;

use super::{
    subst::Subst,
    ty::{Ty, TyVar},
};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnifyError {
    /// Two terms with different shapes or different concrete types
    Mismatch(Ty, Ty),
    /// Two function types with a different number of parameters
    Arity(Ty, Ty),
    /// Binding the variable would make the term contain itself
    Occurs(TyVar, Ty),
}

impl UnifyError {
    /// Default diagnostic text, with every term resolved through `subst`
    pub fn message(&self, subst: &Subst) -> String {
        match self {
            UnifyError::Mismatch(a, b) => format!(
                "`{}` and `{}` can't be unified",
                subst.resolve(a),
                subst.resolve(b)
            ),
            UnifyError::Arity(a, b) => format!(
                "`{}` and `{}` have different parameters",
                subst.resolve(a),
                subst.resolve(b)
            ),
            UnifyError::Occurs(v, t) => {
                format!("`{}` occurs in `{}`: cyclic type", v, subst.resolve(t))
            }
        }
    }
}

impl fmt::Display for UnifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message(&Subst::new()))
    }
}

impl std::error::Error for UnifyError {}

/// Unifies `lhs` and `rhs`, returning `subst` extended with the bindings that
/// make them equal. `subst` itself is never modified.
pub fn unify(lhs: &Ty, rhs: &Ty, subst: &Subst) -> Result<Subst, UnifyError> {
    let mut subst = subst.clone();
    unify_in_place(lhs, rhs, &mut subst)?;
    Ok(subst)
}

/// Like [`unify`], but commits into `subst` only when unification succeeds
pub fn try_unify(lhs: &Ty, rhs: &Ty, subst: &mut Subst) -> bool {
    match unify(lhs, rhs, subst) {
        Ok(s) => {
            *subst = s;
            true
        }
        Err(err) => {
            log::trace!("[try_unify] {}", err.message(subst));
            false
        }
    }
}

/// Unifies directly into `subst`. On failure `subst` may hold bindings made
/// before the failing step, so callers that need to keep it intact should
/// work on a clone.
pub fn unify_in_place(lhs: &Ty, rhs: &Ty, subst: &mut Subst) -> Result<(), UnifyError> {
    log::trace!("[unify] {} ~ {}", lhs, rhs);
    if lhs == rhs {
        return Ok(());
    }

    match (lhs, rhs) {
        (Ty::Var(v), ty) | (ty, Ty::Var(v)) => unify_var(v, ty, subst),
        (Ty::Func(ps1, r1), Ty::Func(ps2, r2)) => {
            if ps1.len() != ps2.len() {
                return Err(UnifyError::Arity(lhs.clone(), rhs.clone()));
            }
            for (a, b) in ps1.iter().zip(ps2.iter()) {
                unify_in_place(a, b, subst)?;
            }
            unify_in_place(r1, r2, subst)
        }
        _ => Err(UnifyError::Mismatch(lhs.clone(), rhs.clone())),
    }
}

/// Binds `var` to `ty`, unifying against existing bindings of either side
/// first so that each variable keeps a single binding.
pub fn unify_var(var: &TyVar, ty: &Ty, subst: &mut Subst) -> Result<(), UnifyError> {
    if let Some(bound) = subst.get(var).cloned() {
        return unify_in_place(&bound, ty, subst);
    }

    if let Ty::Var(other) = ty {
        if let Some(bound) = subst.get(other).cloned() {
            return unify_in_place(&Ty::Var(var.clone()), &bound, subst);
        }
    }

    if occurs_in(var, ty, subst) {
        return Err(UnifyError::Occurs(var.clone(), ty.clone()));
    }

    subst.add(var.clone(), ty.clone());
    Ok(())
}

/// True if `var` appears in `ty` once existing bindings are followed
pub fn occurs_in(var: &TyVar, ty: &Ty, subst: &Subst) -> bool {
    subst.resolve(ty).mentions(var)
}
