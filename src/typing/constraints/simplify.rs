use crate::{
    typing::{
        registry::{TypeId, TypeRegistry},
        subst::Subst,
        ty::Ty,
    },
    utils::dedup_stable,
};

use super::{Constraint, ConstraintKind, FailureMessage};

impl Constraint {
    /// Rewrites the constraint into equalities, conjunctions, and disjunctions
    /// using what `subst` and `registry` currently know. Every constraint
    /// produced carries the provenance of the one it was derived from.
    pub fn simplify(&self, subst: &Subst, registry: &TypeRegistry) -> Constraint {
        let simplified = match &self.kind {
            ConstraintKind::Eq(..) | ConstraintKind::True | ConstraintKind::False => self.clone(),
            ConstraintKind::Convertible(from, to) => {
                self.simplify_convertible(from, to, subst, registry)
            }
            ConstraintKind::HasName(ty, name) => {
                let ids = registry.with_name(name).collect();
                self.one_of(ty, ids, subst, registry)
            }
            ConstraintKind::HasMember(ty, member) => {
                let ids = registry.with_member(member).collect();
                self.one_of(ty, ids, subst, registry)
            }
            ConstraintKind::And(children) => {
                let mut children = children.clone();
                dedup_stable(&mut children);
                let mut children = children
                    .iter()
                    .map(|c| c.simplify(subst, registry))
                    .filter(|c| !c.is_true())
                    .collect::<Vec<_>>();
                dedup_stable(&mut children);
                if children.is_empty() {
                    Constraint::truth(self.info.clone())
                } else {
                    Constraint::new(ConstraintKind::And(children), self.info.clone())
                }
            }
            ConstraintKind::Or(children) => {
                if children.len() == 1 {
                    return children[0].simplify(subst, registry);
                }

                let mut children = children.clone();
                dedup_stable(&mut children);
                let mut children = children
                    .iter()
                    .map(|c| c.simplify(subst, registry))
                    .filter(|c| !c.is_false())
                    .collect::<Vec<_>>();
                dedup_stable(&mut children);
                if children.iter().any(|c| c.is_true()) {
                    Constraint::truth(self.info.clone())
                } else if children.len() == 1 {
                    children.remove(0)
                } else if children.is_empty() {
                    Constraint::falsity(self.info.clone())
                } else {
                    Constraint::or(children, self.info.clone())
                }
            }
        };

        log::trace!("[simplify] {} => {}", self, simplified);
        simplified
    }

    fn simplify_convertible(
        &self,
        from: &Ty,
        to: &Ty,
        subst: &Subst,
        registry: &TypeRegistry,
    ) -> Constraint {
        if from == to {
            return Constraint::truth(self.info.clone());
        }

        let from = subst.resolve(from);
        let to = subst.resolve(to);
        match (&from, &to) {
            (Ty::Const(a), Ty::Const(b)) => {
                if registry.is_convertible_named(a, b) {
                    Constraint::truth(self.info.clone())
                } else {
                    // the concrete types are known to differ, so this fails
                    Constraint::eq(from.clone(), to.clone(), self.info.clone())
                }
            }
            (Ty::Const(a), _) => {
                let candidates = candidates(registry, a, |id| registry.convertible_from(id));
                self.conversions(&from, &to, candidates.into_iter().map(|c| (from.clone(), c)))
                    .simplify(subst, registry)
            }
            (_, Ty::Const(b)) => {
                let candidates = candidates(registry, b, |id| registry.convertible_to(id));
                self.conversions(&from, &to, candidates.into_iter().map(|c| (c, to.clone())))
                    .simplify(subst, registry)
            }
            _ => Constraint::eq(from.clone(), to.clone(), self.info.clone()),
        }
    }

    /// `ty` is one of the types in `ids`. Without candidates this is `False`
    /// and keeps reporting the message of the lookup that found nothing.
    fn one_of(
        &self,
        ty: &Ty,
        ids: Vec<TypeId>,
        subst: &Subst,
        registry: &TypeRegistry,
    ) -> Constraint {
        if ids.is_empty() {
            let mut info = self.info.clone();
            if info.failure.is_none() {
                let msg = self.failure_message(subst, None);
                info.failure = Some(FailureMessage::new(move |_| msg.clone()));
            }
            return Constraint::falsity(info);
        }

        let branches = ids
            .into_iter()
            .map(|id| Constraint::eq(ty.clone(), registry.get(id).ty(), self.info.clone()))
            .collect();
        Constraint::or(branches, self.info.clone()).simplify(subst, registry)
    }

    /// One branch per `(from, to)` pair, each asserting both sides
    fn conversions<I>(&self, from: &Ty, to: &Ty, pairs: I) -> Constraint
    where
        I: Iterator<Item = (Ty, Ty)>,
    {
        let branches = pairs
            .map(|(f, t)| {
                let mut atoms = vec![
                    Constraint::eq(f, from.clone(), self.info.clone()),
                    Constraint::eq(t, to.clone(), self.info.clone()),
                ];
                atoms.retain(|c| !matches!(&c.kind, ConstraintKind::Eq(a, b) if a == b));
                match atoms.len() {
                    0 => Constraint::truth(self.info.clone()),
                    1 => atoms.remove(0),
                    _ => Constraint::new(ConstraintKind::And(atoms), self.info.clone()),
                }
            })
            .collect::<Vec<_>>();
        Constraint::or(branches, self.info.clone())
    }
}

/// Concrete types related to `name`, most specific first. A name missing from
/// the registry is only related to itself.
fn candidates<F>(registry: &TypeRegistry, name: &str, related: F) -> Vec<Ty>
where
    F: Fn(TypeId) -> Vec<TypeId>,
{
    match registry.lookup(name) {
        Some(id) => related(id)
            .into_iter()
            .map(|id| registry.get(id).ty())
            .collect(),
        None => vec![Ty::con(name)],
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        span::{Source, Span},
        typing::{
            constraints::{Constraint, ConstraintInfo, ConstraintKind},
            registry::TypeRegistry,
            subst::Subst,
            ty::Ty,
        },
    };

    fn info() -> ConstraintInfo {
        ConstraintInfo::new(Source::new("test.yarn", Span::at(3, 1, 4)), "$foo")
    }

    fn eq(a: Ty, b: Ty) -> Constraint {
        Constraint::eq(a, b, info())
    }

    #[test]
    fn equality_is_already_simple() {
        let registry = TypeRegistry::with_builtins();
        let c = eq(Ty::var("X"), Ty::con("Number"));
        assert_eq!(c.simplify(&Subst::new(), &registry), c);
    }

    #[test]
    fn convertible_to_itself_is_true() {
        let registry = TypeRegistry::with_builtins();
        let c = Constraint::convertible(Ty::var("X"), Ty::var("X"), info());
        assert!(c.simplify(&Subst::new(), &registry).is_true());
    }

    #[test]
    fn convertible_between_unrelated_concrete_types_fails() {
        let registry = TypeRegistry::with_builtins();
        let c = Constraint::convertible(Ty::con("Number"), Ty::con("String"), info());
        let simplified = c.simplify(&Subst::new(), &registry);
        assert_eq!(simplified, eq(Ty::con("Number"), Ty::con("String")));
        assert_eq!(simplified.info, info());
    }

    #[test]
    fn convertible_uses_the_substitution() {
        let registry = TypeRegistry::with_builtins();
        let mut subst = Subst::new();
        subst.add(tvar!(X), Ty::con("Number"));
        let c = Constraint::convertible(Ty::var("X"), Ty::con("Any"), info());
        assert!(c.simplify(&subst, &registry).is_true());
    }

    #[test]
    fn convertible_from_known_type_enumerates_targets() {
        let registry = TypeRegistry::with_builtins();
        let c = Constraint::convertible(Ty::con("Number"), Ty::var("T"), info());
        let simplified = c.simplify(&Subst::new(), &registry);
        assert_eq!(
            simplified.kind,
            ConstraintKind::Or(vec![
                eq(Ty::con("Number"), Ty::var("T")),
                eq(Ty::con("Any"), Ty::var("T")),
            ])
        );
    }

    #[test]
    fn convertible_to_known_type_enumerates_sources() {
        let mut registry = TypeRegistry::with_builtins();
        registry.register_enum("Food", vec!["Apple"]);
        let c = Constraint::convertible(Ty::var("T"), Ty::con("Any"), info());
        let simplified = c.simplify(&Subst::new(), &registry);
        match &simplified.kind {
            ConstraintKind::Or(branches) => {
                assert_eq!(branches.len(), 5);
                assert_eq!(branches[0], eq(Ty::con("Number"), Ty::var("T")));
                assert_eq!(branches[4], eq(Ty::con("Any"), Ty::var("T")));
            }
            other => panic!("expected a disjunction, got {:?}", other),
        }
    }

    #[test]
    fn convertible_between_variables_is_equality() {
        let registry = TypeRegistry::with_builtins();
        let c = Constraint::convertible(Ty::var("A"), Ty::var("B"), info());
        assert_eq!(c.simplify(&Subst::new(), &registry), eq(Ty::var("A"), Ty::var("B")));
    }

    #[test]
    fn has_name_with_single_match_collapses() {
        let registry = TypeRegistry::with_builtins();
        let c = Constraint::has_name(Ty::var("Y"), "Bool", info());
        assert_eq!(c.simplify(&Subst::new(), &registry), eq(Ty::var("Y"), Ty::con("Bool")));
    }

    #[test]
    fn has_name_without_matches_is_false() {
        let registry = TypeRegistry::new();
        let c = Constraint::has_name(Ty::var("Y"), "Bool", info());
        let simplified = c.simplify(&Subst::new(), &registry);
        assert!(simplified.is_false());
        assert_eq!(simplified.info.src, info().src);
        assert_eq!(simplified.info.expr, "$foo");
        assert_eq!(
            simplified.failure_message(&Subst::new(), None),
            "no type named `Bool` is known"
        );
    }

    #[test]
    fn has_member_without_matches_keeps_custom_message() {
        let registry = TypeRegistry::with_builtins();
        let c = Constraint::has_member(Ty::var("E"), "Cake", info())
            .with_failure(|_| str!("there is no `.Cake`"));
        let simplified = c.simplify(&Subst::new(), &registry);
        assert!(simplified.is_false());
        assert_eq!(simplified.info, c.info);
        assert_eq!(
            simplified.failure_message(&Subst::new(), None),
            "there is no `.Cake`"
        );
    }

    #[test]
    fn has_member_matches_enum_cases() {
        let mut registry = TypeRegistry::with_builtins();
        registry.register_enum("Food", vec!["Apple", "Pie"]);
        registry.register_enum("Fruit", vec!["Apple"]);
        let c = Constraint::has_member(Ty::var("E"), "Apple", info());
        assert_eq!(
            c.simplify(&Subst::new(), &registry).kind,
            ConstraintKind::Or(vec![
                eq(Ty::var("E"), Ty::con("Food")),
                eq(Ty::var("E"), Ty::con("Fruit")),
            ])
        );
    }

    #[test]
    fn conjunction_of_tautologies_is_true() {
        let registry = TypeRegistry::with_builtins();
        let c = Constraint::and(
            vec![
                Constraint::convertible(Ty::con("Bool"), Ty::con("Any"), info()),
                Constraint::convertible(Ty::var("Q"), Ty::var("Q"), info()),
            ],
            info(),
        )
        .unwrap();
        assert!(c.simplify(&Subst::new(), &registry).is_true());
    }

    #[test]
    fn conjunction_deduplicates_children() {
        let registry = TypeRegistry::with_builtins();
        let a = eq(Ty::var("X"), Ty::con("Number"));
        let c = Constraint::and(vec![a.clone(), a.clone()], info()).unwrap();
        assert_eq!(
            c.simplify(&Subst::new(), &registry).kind,
            ConstraintKind::And(vec![a])
        );
    }

    #[test]
    fn disjunction_with_one_child_collapses() {
        let registry = TypeRegistry::with_builtins();
        let a = eq(Ty::var("X"), Ty::con("Number"));
        let c = Constraint::or(vec![a.clone()], info());
        assert_eq!(c.simplify(&Subst::new(), &registry), a);
    }

    #[test]
    fn disjunction_drops_false_children_then_collapses() {
        let registry = TypeRegistry::new();
        let a = eq(Ty::var("X"), Ty::con("Number"));
        let missing = Constraint::has_name(Ty::var("X"), "Nope", info());
        let c = Constraint::or(vec![missing, a.clone()], info());
        assert_eq!(c.simplify(&Subst::new(), &registry), a);
    }
}
