//! JSON problem files: a set of concrete types plus the constraints to solve.
//!
//! ```json
//! {
//!   "types": [{ "name": "Food", "parent": "Any", "members": ["Apple", "Pie"] }],
//!   "constraints": [
//!     {
//!       "file": "start.yarn",
//!       "span": { "start": { "lineno": 2, "col": 4 }, "end": { "lineno": 2, "col": 9 } },
//!       "expr": "$food",
//!       "message": "$food is {F}, not a Food",
//!       "kind": { "has_member": [{ "Var": "F" }, "Apple"] }
//!     }
//!   ]
//! }
//! ```
use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{SolverError, SolverResult},
    span::{Source, Span},
    typing::{Constraint, ConstraintInfo, Substitutable, Ty, TypeRegistry},
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub constraints: Vec<ConstraintDecl>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub convertible_to: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDecl {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub span: Span,
    #[serde(default)]
    pub expr: String,
    /// Failure message. `{X}` is replaced by whatever type variable `X`
    /// resolved to.
    #[serde(default)]
    pub message: Option<String>,
    pub kind: ConstraintDeclKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintDeclKind {
    Eq(Ty, Ty),
    Convertible(Ty, Ty),
    HasName(Ty, String),
    HasMember(Ty, String),
    All(Vec<ConstraintDecl>),
    Any(Vec<ConstraintDecl>),
}

impl std::str::FromStr for Problem {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Problem {
    pub fn load<P: AsRef<Path>>(path: P) -> SolverResult<Problem> {
        let path = path.as_ref();
        log::debug!("[problem] loading {}", path.display());
        fs::read_to_string(path)?.parse()
    }

    /// The builtin types extended with the declared ones
    pub fn registry(&self) -> SolverResult<TypeRegistry> {
        let mut registry = TypeRegistry::with_builtins();
        let ids = self
            .types
            .iter()
            .map(|decl| {
                let id = registry.register(decl.name.clone(), None);
                for member in decl.members.iter() {
                    registry.add_member(id, member.clone());
                }
                if let Some(description) = &decl.description {
                    registry.describe(id, description.clone());
                }
                id
            })
            .collect::<Vec<_>>();

        let resolve = |registry: &TypeRegistry, name: &str, decl: &TypeDecl| {
            registry.lookup(name).ok_or_else(|| {
                SolverError::parse(format!(
                    "type `{}` refers to unknown type `{}`",
                    decl.name, name
                ))
            })
        };

        for (decl, id) in self.types.iter().zip(ids) {
            if let Some(parent) = &decl.parent {
                let parent = resolve(&registry, parent.as_str(), decl)?;
                registry.set_parent(id, Some(parent));
            }
            for target in decl.convertible_to.iter() {
                let target = resolve(&registry, target.as_str(), decl)?;
                registry.add_convertible(id, target);
            }
        }

        Ok(registry)
    }

    pub fn constraints(&self) -> SolverResult<Vec<Constraint>> {
        self.constraints.iter().map(ConstraintDecl::build).collect()
    }
}

impl ConstraintDecl {
    pub fn build(&self) -> SolverResult<Constraint> {
        let mut info = ConstraintInfo::new(
            Source::new(self.file.clone(), self.span),
            self.expr.clone(),
        );
        let constraint = match &self.kind {
            ConstraintDeclKind::Eq(a, b) => Constraint::eq(a.clone(), b.clone(), info.clone()),
            ConstraintDeclKind::Convertible(a, b) => {
                Constraint::convertible(a.clone(), b.clone(), info.clone())
            }
            ConstraintDeclKind::HasName(t, n) => {
                Constraint::has_name(t.clone(), n.clone(), info.clone())
            }
            ConstraintDeclKind::HasMember(t, m) => {
                Constraint::has_member(t.clone(), m.clone(), info.clone())
            }
            ConstraintDeclKind::All(children) => Constraint::and(
                children.iter().map(ConstraintDecl::build).collect::<SolverResult<_>>()?,
                info.clone(),
            )?,
            ConstraintDeclKind::Any(children) => Constraint::or(
                children.iter().map(ConstraintDecl::build).collect::<SolverResult<_>>()?,
                info.clone(),
            ),
        };

        if let Some(template) = self.message.clone() {
            let vars = constraint
                .free_vars()
                .into_iter()
                .cloned()
                .collect::<Vec<_>>();
            info = info.with_failure(move |subst| {
                vars.iter().fold(template.clone(), |msg, var| {
                    msg.replace(
                        &format!("{{{}}}", var),
                        &subst.resolve(&Ty::Var(var.clone())).to_string(),
                    )
                })
            });
            return Ok(Constraint::new(constraint.kind, info));
        }

        Ok(constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typing::{ConstraintKind, Subst};

    const FOOD: &str = r#"{
        "types": [
            { "name": "Food", "parent": "Any", "members": ["Apple", "Pie"] },
            { "name": "Snack", "parent": "Food", "convertible_to": ["String"] }
        ],
        "constraints": [
            {
                "file": "a.yarn",
                "expr": "$x",
                "kind": { "eq": [{ "Var": "X" }, { "Const": "Number" }] }
            },
            {
                "file": "a.yarn",
                "expr": "$y",
                "message": "$y is {Y}",
                "kind": { "any": [
                    { "kind": { "has_name": [{ "Var": "Y" }, "Bool"] } },
                    { "kind": { "has_member": [{ "Var": "Y" }, "Pie"] } }
                ] }
            }
        ]
    }"#;

    #[test]
    fn builds_registry_with_declared_types() {
        let problem: Problem = FOOD.parse().unwrap();
        let registry = problem.registry().unwrap();
        let food = registry.lookup("Food").unwrap();
        let snack = registry.lookup("Snack").unwrap();
        let string = registry.lookup("String").unwrap();
        assert_eq!(registry.get(snack).parent, Some(food));
        assert_eq!(registry.depth(snack), 2);
        assert!(registry.is_convertible(snack, string));
        assert!(registry.get(food).has_member("Pie"));
    }

    #[test]
    fn unknown_parent_is_a_parse_error() {
        let problem: Problem = r#"{ "types": [{ "name": "A", "parent": "Nope" }] }"#
            .parse()
            .unwrap();
        let err = problem.registry().unwrap_err();
        assert_eq!(err.kind, crate::errors::SolverErrorKind::Parse);
    }

    #[test]
    fn builds_constraints_with_message_templates() {
        let problem: Problem = FOOD.parse().unwrap();
        let constraints = problem.constraints().unwrap();
        assert_eq!(constraints.len(), 2);
        assert_eq!(
            constraints[0].kind,
            ConstraintKind::Eq(Ty::var("X"), Ty::con("Number"))
        );

        let mut subst = Subst::new();
        subst.add(tvar!(Y), Ty::con("String"));
        assert_eq!(constraints[1].failure_message(&subst, None), "$y is String");
    }

    #[test]
    fn empty_all_is_rejected() {
        let problem: Problem = r#"{ "constraints": [{ "kind": { "all": [] } }] }"#
            .parse()
            .unwrap();
        assert!(problem.constraints().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = "{ nope".parse::<Problem>().unwrap_err();
        assert_eq!(err.kind, crate::errors::SolverErrorKind::Parse);
    }
}
