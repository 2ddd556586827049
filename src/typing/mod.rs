pub mod constraints;
pub mod registry;
pub mod solvers;
pub mod subst;
pub mod ty;
pub mod unify;

pub use constraints::{Constraint, ConstraintInfo, ConstraintKind, FailureMessage};
pub use registry::{TypeDef, TypeId, TypeRegistry};
pub use solvers::{try_solve, Session, SessionResult, Solver, SolverOptions};
pub use subst::{Subst, Substitutable};
pub use ty::{Ty, TyVar};
pub use unify::{try_unify, unify, unify_var, UnifyError};
