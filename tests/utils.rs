#![cfg(test)]

use tysolve::{
    span::{Source, Span},
    typing::{Constraint, ConstraintInfo, Ty},
};

#[allow(dead_code)]
pub fn enable_debug_logs() {
    fern::Dispatch::new()
        .level(log::LevelFilter::Debug)
        .chain(std::io::stderr())
        .apply()
        .unwrap();
}

#[allow(dead_code)]
pub fn info(line: usize, expr: &str) -> ConstraintInfo {
    ConstraintInfo::new(
        Source::new("test.yarn", Span::at(line, 0, expr.len())),
        expr,
    )
}

#[allow(dead_code)]
pub fn var(name: &str) -> Ty {
    Ty::var(name)
}

#[allow(dead_code)]
pub fn con(name: &str) -> Ty {
    Ty::con(name)
}

#[allow(dead_code)]
pub fn eq(line: usize, lhs: Ty, rhs: Ty) -> Constraint {
    let expr = format!("{} == {}", lhs, rhs);
    Constraint::eq(lhs, rhs, info(line, &expr))
}

#[allow(dead_code)]
pub fn convertible(line: usize, from: Ty, to: Ty) -> Constraint {
    let expr = format!("{} as {}", from, to);
    Constraint::convertible(from, to, info(line, &expr))
}
