use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::join;

use super::subst::{Subst, Substitutable};

/// A named placeholder for a type that is not known yet
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TyVar(pub String);

impl TyVar {
    pub fn new<S: Into<String>>(name: S) -> TyVar {
        TyVar(name.into())
    }
}

impl From<&str> for TyVar {
    fn from(s: &str) -> Self {
        TyVar::new(s)
    }
}

impl From<String> for TyVar {
    fn from(s: String) -> Self {
        TyVar(s)
    }
}

impl fmt::Display for TyVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A type term. Concrete types are nominal and refer to an entry of the
/// [`TypeRegistry`](super::registry::TypeRegistry) by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ty {
    Var(TyVar),
    Const(String),
    Func(Vec<Ty>, Box<Ty>),
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Var(v) => write!(f, "{}", v),
            Ty::Const(s) => write!(f, "{}", s),
            Ty::Func(a, r) => write!(f, "({}) -> {}", join(a, ", "), r),
        }
    }
}

impl From<TyVar> for Ty {
    fn from(v: TyVar) -> Self {
        Ty::Var(v)
    }
}

impl Ty {
    #[inline(always)]
    pub fn var<S: Into<String>>(name: S) -> Ty {
        Ty::Var(TyVar::new(name))
    }

    #[inline(always)]
    pub fn con<S: Into<String>>(name: S) -> Ty {
        Ty::Const(name.into())
    }

    pub fn func(params: Vec<Ty>, ret: Ty) -> Ty {
        Ty::Func(params, Box::new(ret))
    }

    /// True if `var` appears syntactically in this term (bindings are not followed)
    pub fn mentions(&self, var: &TyVar) -> bool {
        match self {
            Ty::Var(v) => v == var,
            Ty::Const(_) => false,
            Ty::Func(params, ret) => params.iter().any(|p| p.mentions(var)) || ret.mentions(var),
        }
    }
}

impl Substitutable for Ty {
    fn apply_subst(&mut self, subst: &Subst) {
        match self {
            Ty::Const(_) => {}
            _ => *self = subst.resolve(self),
        }
    }

    fn free_vars(&self) -> Vec<&TyVar> {
        match self {
            Ty::Var(v) => vec![v],
            Ty::Const(_) => vec![],
            Ty::Func(params, ret) => {
                let mut vars = params.free_vars();
                for v in ret.free_vars() {
                    if !vars.contains(&v) {
                        vars.push(v);
                    }
                }
                vars
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_function_types() {
        let ty = Ty::func(vec![Ty::con("Number"), Ty::var("T")], Ty::con("Bool"));
        assert_eq!(ty.to_string(), "(Number, T) -> Bool");
    }

    #[test]
    fn function_equality_is_structural() {
        let a = Ty::func(vec![Ty::con("Number")], Ty::con("Bool"));
        let b = Ty::func(vec![Ty::con("Number")], Ty::con("Bool"));
        let c = Ty::func(vec![Ty::con("Number"), Ty::con("Number")], Ty::con("Bool"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(Ty::var("Number"), Ty::con("Number"));
    }

    #[test]
    fn free_vars_are_unique_and_ordered() {
        let ty = Ty::func(vec![Ty::var("A"), Ty::var("B")], Ty::var("A"));
        assert_eq!(ty.free_vars(), vec![&tvar!(A), &tvar!(B)]);
        assert!(ty.mentions(&tvar!(B)));
        assert!(!ty.mentions(&tvar!(C)));
    }

    #[test]
    fn applying_to_a_concrete_type_is_a_no_op() {
        let subst = vec![(tvar!(Number), Ty::con("String"))]
            .into_iter()
            .collect::<Subst>();
        let mut ty = Ty::con("Number");
        ty.apply_subst(&subst);
        assert_eq!(ty, Ty::con("Number"));
    }
}
