//! A constraint solver for the static type checker of a small scripting
//! language.
//!
//! Callers describe what they know about an expression as [`Constraint`]s
//! over [`Ty`] terms, hand them to a [`Solver`] together with the
//! [`TypeRegistry`] of concrete types, and get back either bindings for every
//! type variable or located [`Diagnostic`]s.
//!
//! [`Constraint`]: typing::Constraint
//! [`Ty`]: typing::Ty
//! [`Solver`]: typing::Solver
//! [`TypeRegistry`]: typing::TypeRegistry
//! [`Diagnostic`]: errors::Diagnostic

#[macro_use]
mod macros;

pub mod cli;
pub mod errors;
pub mod logger;
pub mod problem;
pub mod span;
pub mod typing;
pub mod utils;
