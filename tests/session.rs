mod utils;

use std::time::Duration;

use tysolve::typing::{Constraint, ConstraintKind, Session, Solver, SolverOptions, TypeRegistry};
use utils::*;

#[test]
fn shares_bindings_between_expressions() {
    let registry = TypeRegistry::with_builtins();
    let solver = Solver::new(&registry);
    let mut session = Session::new(&solver);

    assert!(session.solve(vec![eq(0, var("X"), con("Number"))]).unwrap());
    assert!(session
        .solve(vec![convertible(1, var("X"), var("Y"))])
        .unwrap());
    assert_eq!(session.subst().resolve(&var("Y")), con("Number"));

    let result = session.finish().unwrap();
    assert!(result.is_ok());
    assert!(result.diagnostics.is_empty());
}

#[test]
fn failing_expressions_are_retried_one_constraint_at_a_time() {
    let registry = TypeRegistry::with_builtins();
    let solver = Solver::new(&registry);
    let mut session = Session::new(&solver);

    let solved = session
        .solve(vec![
            eq(3, var("X"), con("Number")),
            eq(4, var("X"), con("String")),
        ])
        .unwrap();
    assert!(!solved);
    assert!(session.subst().is_empty());
    assert_eq!(session.pending().len(), 2);

    let result = session.finish().unwrap();
    assert_eq!(result.subst.resolve(&var("X")), con("Number"));
    assert_eq!(result.failed.len(), 1);
    assert_eq!(
        result.failed[0].kind,
        ConstraintKind::Eq(con("Number"), con("String"))
    );
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].src.span.start.lineno, 4);
    assert_eq!(
        result.diagnostics[0].message,
        "`Number` and `String` can't be unified"
    );
}

#[test]
fn later_expressions_do_not_see_failed_ones() {
    let registry = TypeRegistry::with_builtins();
    let solver = Solver::new(&registry);
    let mut session = Session::new(&solver);

    assert!(!session
        .solve(vec![Constraint::has_name(var("A"), "Missing", info(0, "$a"))])
        .unwrap());
    assert!(session.solve(vec![eq(1, var("A"), con("Bool"))]).unwrap());

    let result = session.finish().unwrap();
    assert!(!result.is_ok());
    assert_eq!(result.subst.resolve(&var("A")), con("Bool"));
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].src.span.start.lineno, 0);
    assert_eq!(
        result.diagnostics[0].message,
        "no type named `Missing` is known"
    );
}

#[test]
fn time_limit_reports_unresolved_expressions() {
    let registry = TypeRegistry::with_builtins();
    let solver = Solver::with_options(
        &registry,
        SolverOptions {
            time_limit: Some(Duration::from_secs(0)),
            ..SolverOptions::default()
        },
    );
    let mut session = Session::new(&solver);
    assert!(!session
        .solve(vec![
            eq(0, var("X"), con("Number")),
            eq(1, var("X"), con("Bool")),
        ])
        .unwrap());

    let result = session.finish().unwrap();
    assert_eq!(result.failed.len(), 2);
    assert_eq!(result.diagnostics.len(), 2);
    let timeout = "Expression failed to resolve in a reasonable time (0 seconds)";
    assert!(result
        .diagnostics
        .iter()
        .all(|d| d.message.starts_with(timeout)));
}
