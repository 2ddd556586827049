use std::{
    collections::{HashMap, HashSet},
    iter::FromIterator,
    ops::Deref,
};

use super::ty::{Ty, TyVar};

pub trait Substitutable {
    fn apply_subst(&mut self, subst: &Subst);

    fn free_vars(&self) -> Vec<&TyVar> {
        vec![]
    }
}

impl<T> Substitutable for Vec<T>
where
    T: Substitutable,
{
    fn apply_subst(&mut self, subst: &Subst) {
        for t in self.iter_mut() {
            t.apply_subst(subst);
        }
    }

    fn free_vars(&self) -> Vec<&TyVar> {
        let mut vars = vec![];
        for v in self.iter().flat_map(|t| t.free_vars()) {
            if !vars.contains(&v) {
                vars.push(v);
            }
        }
        vars
    }
}

/// Bindings from type variables to type terms.
///
/// Bindings may chain through other variables (`A -> B -> Number`). The
/// unifier never creates a cycle, but every lookup that follows a chain is
/// still guarded against one.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Subst(HashMap<TyVar, Ty>);

impl Deref for Subst {
    type Target = HashMap<TyVar, Ty>;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for Subst {
    type Item = (TyVar, Ty);

    type IntoIter = std::collections::hash_map::IntoIter<TyVar, Ty>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(TyVar, Ty)> for Subst {
    fn from_iter<T: IntoIterator<Item = (TyVar, Ty)>>(iter: T) -> Self {
        Subst(iter.into_iter().collect())
    }
}

impl std::fmt::Debug for Subst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.sorted().into_iter().map(|(k, v)| (k.to_string(), v.to_string())))
            .finish()
    }
}

impl std::fmt::Display for Subst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "{{}}");
        }

        writeln!(f, "{{")?;
        for (var, ty) in self.sorted() {
            writeln!(f, "  {}: {}", var, ty)?;
        }
        write!(f, "}}")
    }
}

impl Subst {
    pub fn new() -> Subst {
        Subst(HashMap::new())
    }

    /// Binds `var` to `ty`. The variable must not already be bound; use
    /// [`unify`](super::unify::unify) to extend a substitution safely.
    pub fn add(&mut self, var: TyVar, ty: Ty) {
        debug_assert!(
            !self.0.contains_key(&var),
            "type variable `{}` is already bound",
            var
        );
        log::trace!("[subst] {} := {}", var, ty);
        self.0.insert(var, ty);
    }

    /// Follows the chain of bindings starting at `var`.
    ///
    /// Returns the first non-variable term found, or the last variable of the
    /// chain when it ends at an unbound variable. An unbound `var` or a chain
    /// that loops back on itself yields `None`.
    pub fn try_resolve(&self, var: &TyVar) -> Option<&Ty> {
        let mut checked = HashSet::new();
        checked.insert(var);
        let mut ty = self.0.get(var)?;
        loop {
            match ty {
                Ty::Var(next) => {
                    if !checked.insert(next) {
                        log::debug!("[subst] cycle while resolving `{}`", var);
                        return None;
                    }
                    match self.0.get(next) {
                        Some(t) => ty = t,
                        None => return Some(ty),
                    }
                }
                _ => return Some(ty),
            }
        }
    }

    /// Returns `ty` with every bound variable replaced by its binding, all the
    /// way down. Applying the result again changes nothing.
    pub fn resolve(&self, ty: &Ty) -> Ty {
        let mut visiting = vec![];
        self.resolve_inner(ty, &mut visiting)
    }

    fn resolve_inner<'a>(&'a self, ty: &'a Ty, visiting: &mut Vec<&'a TyVar>) -> Ty {
        match ty {
            Ty::Var(v) => {
                if visiting.contains(&v) {
                    return ty.clone();
                }
                match self.0.get(v) {
                    Some(bound) => {
                        visiting.push(v);
                        let resolved = self.resolve_inner(bound, visiting);
                        visiting.pop();
                        resolved
                    }
                    None => ty.clone(),
                }
            }
            Ty::Const(_) => ty.clone(),
            Ty::Func(params, ret) => Ty::Func(
                params
                    .iter()
                    .map(|p| self.resolve_inner(p, visiting))
                    .collect(),
                Box::new(self.resolve_inner(ret, visiting)),
            ),
        }
    }

    /// Bindings ordered by variable name
    pub fn sorted(&self) -> Vec<(&TyVar, &Ty)> {
        let mut entries = self.0.iter().collect::<Vec<_>>();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
    }
}
